//! Process-wide logging initialisation.
//!
//! Logging is installed once, explicitly, at program start. Failing to
//! install it never stops the program: the process simply continues with
//! logging unconfigured.

use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_LEVEL;

/// Outcome of [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingState {
    /// A subscriber was installed by this call.
    Configured,
    /// No subscriber was installed (one already existed, or setup failed).
    Unconfigured,
}

/// Pick the filter directives to use.
///
/// `RUST_LOG` wins when it parses; otherwise the configured default level;
/// otherwise the built-in default.
#[must_use]
pub fn resolve_directives(env_value: Option<&str>, default_level: &str) -> String {
    [env_value, Some(default_level)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty() && EnvFilter::try_new(candidate).is_ok())
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string()
}

/// Install a `tracing` subscriber writing to stderr.
///
/// # Arguments
/// * `default_level` - Filter used when `RUST_LOG` is unset or invalid
pub fn init_logging(default_level: &str) -> LoggingState {
    let env_value = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = resolve_directives(env_value.as_deref(), default_level);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&directives))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    match installed {
        Ok(()) => {
            tracing::debug!(directives = %directives, "Logging initialised");
            LoggingState::Configured
        }
        Err(_) => LoggingState::Unconfigured,
    }
}
