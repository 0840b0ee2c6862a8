use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Process-wide configuration, resolved once at startup.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub loglevel: String,
    pub pool_size: u32,
    pub admin_username: String,
    pub admin_password: String,
    pub session_token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: "sqlite:signbook.sqlite".to_string(),
            loglevel: "info".to_string(),
            pool_size: 10,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            session_token: "signbook-static-session-token".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `SIGNBOOK_`-prefixed environment variables.
    pub fn load() -> Self {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("SIGNBOOK_"))
            .extract()
            .expect("invalid SIGNBOOK_* configuration")
    }
}
