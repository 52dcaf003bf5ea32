//! Line-oriented logging built on the tracing crate.
//!
//! Every event becomes one line prefixed by a severity tag:
//!
//! ```text
//! [STATUS] Created resource group: sample-rg0d5c...
//! [DEBUG] PUT https://management.azure.com/subscriptions/...
//! [ERROR] could not authenticate: the device code expired
//! ```
//!
//! `[WARN]` and `[ERROR]` lines go to stderr, everything else to stdout.
//! The JSON format keeps the same stream split for machine consumption.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `[TAG] message` lines
    #[default]
    Tagged,
    /// One JSON object per line
    Json,
}

/// Severity tag written in front of each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTag {
    Error,
    Warn,
    Status,
    Debug,
}

impl SeverityTag {
    /// Map a tracing level onto a tag.
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Status,
            _ => Self::Debug,
        }
    }

    /// Plain tag text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "[ERROR]",
            Self::Warn => "[WARN]",
            Self::Status => "[STATUS]",
            Self::Debug => "[DEBUG]",
        }
    }

    fn colored(&self) -> String {
        match self {
            Self::Error => self.as_str().red().bold().to_string(),
            Self::Warn => self.as_str().yellow().bold().to_string(),
            Self::Status => self.as_str().green().to_string(),
            Self::Debug => self.as_str().bright_black().to_string(),
        }
    }
}

impl fmt::Display for SeverityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event formatter producing `[TAG] message key=value` lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaggedFormat;

impl<S, N> FormatEvent<S, N> for TaggedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let tag = SeverityTag::from_level(*event.metadata().level());
        if writer.has_ansi_escapes() {
            write!(writer, "{} ", tag.colored())?;
        } else {
            write!(writer, "{} ", tag)?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Builder for the process-wide subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    debug: bool,
    format: LogFormat,
    ansi: bool,
}

impl LoggingBuilder {
    /// Create a builder with status-level output in the tagged format.
    pub fn new() -> Self {
        Self {
            debug: false,
            format: LogFormat::Tagged,
            ansi: false,
        }
    }

    /// Include `[DEBUG]` lines.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Colour the severity tags.
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.ansi = enabled;
        self
    }

    /// Default filter directive. `RUST_LOG` takes precedence over it.
    pub fn default_directive(&self) -> &'static str {
        if self.debug {
            "arm_vm_sample=debug,warn"
        } else {
            "arm_vm_sample=info,warn"
        }
    }

    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }

    /// Install the subscriber globally.
    pub fn init(self) -> Result<(), TryInitError> {
        let env_filter = self.build_filter();
        let writer = std::io::stderr
            .with_max_level(Level::WARN)
            .or_else(std::io::stdout);

        match self.format {
            LogFormat::Tagged => {
                let layer = tracing_subscriber::fmt::layer()
                    .event_format(TaggedFormat)
                    .with_ansi(self.ansi)
                    .with_writer(writer);
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(layer)
                    .try_init()
            }
            LogFormat::Json => {
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(writer);
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(layer)
                    .try_init()
            }
        }
    }
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}
