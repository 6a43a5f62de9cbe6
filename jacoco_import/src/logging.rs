use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "JACOCO_IMPORT_LOG";

/// `JACOCO_IMPORT_LOG` takes precedence; otherwise `info`, or `debug` when
/// verbose. Diagnostics go to stderr so stdout stays parseable.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
