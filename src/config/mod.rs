mod app_config;

pub use app_config::{
    AppConfig, AwsConfig, CleanupSettings, LogFormat, LoggingConfig, ProvisionSettings,
};
