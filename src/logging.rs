//! # Structured Logging Module
//!
//! Environment-aware structured logging for tracing resolution and fetch
//! activity across concurrent loads.

use crate::config::ConfigManager;
use crate::constants::env;
use crate::error::ErrorKind;
use crate::task::TaskOutcome;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` wins over the environment default when set. Output is JSON when
/// `DLOAD_LOG_FORMAT=json`.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let log_level = get_log_level(&environment);
        let json = std::env::var(env::LOG_FORMAT)
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let filter =
            || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let result = if json {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_filter(filter()),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .with_filter(filter()),
                )
                .try_init()
        };

        // Use try_init to avoid panic if global subscriber already set
        if result.is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized, keeping the existing one"
            );
        }

        tracing::info!(
            environment = %environment,
            level = log_level,
            json = json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log the settlement of a resolution for `key`
pub fn log_resolution(key: &str, outcome: &TaskOutcome) {
    match outcome {
        Ok(status) => tracing::info!(
            key = %key,
            status = ?status.map(|status| status.as_str()),
            "✅ RESOLUTION: Resolved"
        ),
        Err(kind) => log_rejection(key, *kind),
    }
}

fn log_rejection(key: &str, kind: ErrorKind) {
    tracing::warn!(
        key = %key,
        error_kind = kind.code(),
        message = %kind,
        "❌ RESOLUTION: Rejected"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels_per_environment() {
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_structured_logging();
        log_resolution("jquery", &Ok(None));
        log_resolution("ui", &Err(ErrorKind::BadRequirement));
    }
}
