use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

const ENV_PREFIX: &str = "INKWELL_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub comments: CommentSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    pub admin_token: String,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct CommentSettings {
    /// Maximum number of ancestors a reply may have.
    pub max_depth: usize,
    pub page_size: u32,
    pub max_page_size: u32,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            max_depth: domain::DEFAULT_MAX_DEPTH,
            page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars();
        let env_json =
            serde_json::to_string(&env_map).map_err(|e| ConfigError::Message(e.to_string()))?;
        let defaults = CommentSettings::default();

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/inkwell.db")?
            .set_default("security.admin_token", "admin_secret_change_me")?
            .set_default("comments.max_depth", defaults.max_depth as i64)?
            .set_default("comments.page_size", defaults.page_size as i64)?
            .set_default("comments.max_page_size", defaults.max_page_size as i64)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?;

        s.try_deserialize()
    }
}

/// `INKWELL_COMMENTS__MAX_DEPTH=3` becomes `comments.max_depth = "3"`.
fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
