//! Log Output
//!
//! `TigerStyle`: Opt-in. Library code only emits `tracing` events; the host
//! application decides whether and how to print them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pokedex::telemetry::{init_telemetry, TelemetryConfig};
//!
//! // Filter from POKEDEX_LOG, default "info"
//! init_telemetry(TelemetryConfig::default()).expect("telemetry init");
//!
//! // Or configure explicitly
//! let config = TelemetryConfig::builder()
//!     .filter("pokedex=debug")
//!     .ansi(false)
//!     .build();
//! # let _ = config;
//! ```
//!
//! ## Environment Variables
//!
//! - `POKEDEX_LOG` - `EnvFilter` directives (default: "info")

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const TELEMETRY_FILTER_ENV: &str = "POKEDEX_LOG";

/// Filter used when `POKEDEX_LOG` is unset.
pub const TELEMETRY_FILTER_DEFAULT: &str = "info";

/// Telemetry configuration errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber could not be installed
    #[error("telemetry initialization failed: {reason}")]
    InitFailed {
        /// The reason for the failure
        reason: String,
    },

    /// Filter directives did not parse
    #[error("invalid filter {filter:?}: {reason}")]
    InvalidFilter {
        /// The rejected directives
        filter: String,
        /// Parser message
        reason: String,
    },
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Configuration for the log subscriber
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives, e.g. `"info,pokedex=debug"`
    pub filter: String,

    /// Print the event target (module path)
    pub with_target: bool,

    /// Colorize output
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: std::env::var(TELEMETRY_FILTER_ENV)
                .unwrap_or_else(|_| TELEMETRY_FILTER_DEFAULT.to_string()),
            with_target: true,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Create a new builder for `TelemetryConfig`
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::default()
    }

    /// Parse the filter directives.
    fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|e| TelemetryError::InvalidFilter {
            filter: self.filter.clone(),
            reason: e.to_string(),
        })
    }
}

/// Builder for `TelemetryConfig`
#[derive(Default)]
pub struct TelemetryConfigBuilder {
    filter: Option<String>,
    with_target: Option<bool>,
    ansi: Option<bool>,
}

impl TelemetryConfigBuilder {
    /// Set the filter directives
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Print or hide event targets
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = Some(with_target);
        self
    }

    /// Enable or disable colors
    #[must_use]
    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = Some(ansi);
        self
    }

    /// Build the `TelemetryConfig`
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        let default = TelemetryConfig::default();
        TelemetryConfig {
            filter: self.filter.unwrap_or(default.filter),
            with_target: self.with_target.unwrap_or(default.with_target),
            ansi: self.ansi.unwrap_or(default.ansi),
        }
    }
}

/// Install a global `fmt` subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the directives do not parse.
/// Returns `TelemetryError::InitFailed` if a global subscriber is already set.
pub fn init_telemetry(config: TelemetryConfig) -> Result<()> {
    let filter = config.env_filter()?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|e| TelemetryError::InitFailed {
            reason: e.to_string(),
        })?;

    tracing::debug!(filter = %config.filter, "telemetry initialized");
    Ok(())
}
