use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEBUG_LEVEL: &str = "debug";

use crate::config::LogFormat;

pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Set by `--debug`; takes precedence over `RUST_LOG`
    pub force_debug: bool,
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>, format: LogFormat) -> Self {
        Self {
            level: level.into(),
            format,
            force_debug: false,
        }
    }

    /// `--debug` forces the `debug` level over `RUST_LOG` and the configured level
    pub fn with_debug(mut self, debug: bool) -> Self {
        if debug {
            self.level = DEBUG_LEVEL.to_string();
            self.force_debug = true;
        }
        self
    }
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    if config.force_debug {
        return EnvFilter::new(DEBUG_LEVEL);
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

pub fn init_logging(config: &LoggingConfig) {
    let filter = env_filter(config);

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false))
                .init();
        }
    }

    tracing::debug!("Logging initialized with level: {}", config.level);
}
