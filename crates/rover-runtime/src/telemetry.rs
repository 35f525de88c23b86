//! `tracing` subscriber bootstrap.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `ROVER_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |

use tracing_subscriber::EnvFilter;

/// Initialise the global `tracing` subscriber.
///
/// Honors `RUST_LOG` for filtering and `ROVER_LOG_FORMAT=json` for log
/// aggregators. Safe to call more than once: later calls are a no-op, so
/// tests and embedding binaries cannot trip over double initialisation.
pub fn init_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let result = if std::env::var("ROVER_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .try_init()
    };

    // A subscriber installed by the embedding process wins.
    let _ = result;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_safe() {
        init_tracing();
        init_tracing();
    }
}
