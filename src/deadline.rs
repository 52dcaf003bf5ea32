//! Deadlines for bounded waits.

use std::time::Duration;
use tokio::time::Instant;

/// About thirty years; every platform clock can represent this offset.
const FAR_FUTURE_SECS: u64 = 86_400 * 365 * 30;

/// `now + timeout`, saturating at a far-future instant when the clock cannot
/// represent the sum.
pub(crate) fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECS))
}
