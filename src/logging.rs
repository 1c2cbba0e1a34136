//! Tracing initialization.
//!
//! Logs always go to stderr: stdout carries MCP frames and CLI output.
//! `RUST_LOG` filters as usual; `MODULE_TRACKER_LOG_FORMAT=json` switches to
//! line-delimited JSON for log shippers.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

/// Environment variable selecting the log line format.
pub const LOG_FORMAT_ENV: &str = "MODULE_TRACKER_LOG_FORMAT";

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Parse a format name. Anything but `json` is compact.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Compact
        }
    }

    fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|value| Self::from_name(&value))
            .unwrap_or_default()
    }
}

fn under_test_runner() -> bool {
    std::env::var("NEXTEST").is_ok() || std::env::var("CARGO_TARGET_TMPDIR").is_ok()
}

/// Initialize tracing. Safe to call multiple times.
pub fn init() {
    INIT.call_once(|| {
        let is_test = under_test_runner();
        let level = if is_test {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        let filter = EnvFilter::from_default_env().add_directive(level.into());

        if is_test {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_test_writer()
                .compact()
                .finish();
            // The default stays installed for the life of the test binary
            std::mem::forget(subscriber.set_default());
            return;
        }

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true)
            .with_writer(std::io::stderr);

        let result = match LogFormat::from_env() {
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        if let Err(e) = result {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });
}
