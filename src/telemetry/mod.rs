//! Logging setup.
//!
//! The binary installs one global subscriber at startup through
//! [`LoggingBuilder`]. Library code only emits `tracing` events.

pub mod logging;

pub use logging::{LogFormat, LoggingBuilder, SeverityTag, TaggedFormat};
