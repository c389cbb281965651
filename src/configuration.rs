use secrecy::SecretString;
use serde::Deserialize;

use crate::schemas::CurrencyType;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub mollie: MollieApiSettings,
    pub secret: SecretSetting,
    pub plugin: PluginDefaultSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Public base URL of the store, used to build redirect and webhook URLs.
    pub base_url: String,
    /// Primary store currency every gateway amount is expressed in.
    pub currency: CurrencyType,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MollieApiSettings {
    pub base_url: String,
    pub timeout_milliseconds: u64,
}

impl MollieApiSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSetting {
    pub admin_api_token: SecretString,
}

/// Values the plugin settings record is seeded with on install.
#[derive(Debug, Deserialize, Clone)]
pub struct PluginDefaultSettings {
    pub use_sandbox: bool,
    pub api_live_key: SecretString,
    pub api_test_key: SecretString,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");
    let builder = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("configuration.yaml"),
        ))
        .add_source(config::Environment::default().separator("__"))
        .build()?;
    builder.try_deserialize::<Settings>()
}
