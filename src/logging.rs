use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable that overrides the configured log level.
pub const LOG_ENV_VAR: &str = "YTCAPTIONS_LOG";

/// Initialize human-readable logging on stderr.
///
/// `level` comes from the run configuration; `YTCAPTIONS_LOG` (an `EnvFilter` directive)
/// takes precedence when set. Safe to call more than once.
pub fn init(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init();
}
