use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the PMS backend API (e.g., http://pms-backend:8080).
    pub url: String,
    /// Cookie name under which the session credential is forwarded.
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    /// Base URL of the authentication provider.
    pub url: String,
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Browser session cookie issued by this service.
#[derive(Deserialize, Clone)]
pub struct SessionSettings {
    /// Set to true in production with HTTPS.
    #[serde(default)]
    pub secure_cookie: bool,
    #[serde(default = "default_inactivity_hours")]
    pub inactivity_hours: i64,
    /// How often permission stores of expired sessions are evicted.
    #[serde(default = "default_store_sweep_secs")]
    pub store_sweep_secs: u64,
}

impl SessionSettings {
    pub fn inactivity(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.inactivity_hours.max(0) as u64 * 3600)
    }

    pub fn store_sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.store_sweep_secs.max(1))
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            secure_cookie: false,
            inactivity_hours: default_inactivity_hours(),
            store_sweep_secs: default_store_sweep_secs(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct ObservabilitySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC endpoint (e.g., http://tempo:4317). Spans are not exported when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_session_cookie() -> String {
    "session_token".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_inactivity_hours() -> i64 {
    24
}

fn default_store_sweep_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;

    // Check if we're already in pms-admin directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("pms-admin") {
        base_path.join("config")
    } else {
        base_path.join("pms-admin").join("config")
    };

    load_from(&configuration_directory)
}

/// Read `base.yaml` from `directory`, overlaid with `APP_`-prefixed environment variables
/// (e.g., `APP_BACKEND__URL`).
pub fn load_from(directory: &Path) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
