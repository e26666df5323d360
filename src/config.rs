use std::{env, time::Duration};

use serde::Deserialize;

/// Environment variable holding the generative-text service credential.
pub const API_KEY_ENV: &str = "API_KEY";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: String,
    pub model: String,
    pub api_base_url: String,
    pub draft_timeout_secs: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Config {
    /// Loads `.env`, then merges defaults, an optional `lumina.toml` and
    /// `LUMINA_*` environment variables.
    pub fn load() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_sources(
            config::File::with_name("lumina").required(false),
            config::Environment::with_prefix("LUMINA"),
            env::var(API_KEY_ENV).ok(),
        )
    }

    fn from_sources<F>(
        file: F,
        environment: config::Environment,
        api_key: Option<String>,
    ) -> crate::Result<Self>
    where
        F: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("data_dir", "./data")?
            .set_default("model", "gemini-3-flash-preview")?
            .set_default("api_base_url", "https://generativelanguage.googleapis.com")?
            .set_default("draft_timeout_secs", 30)?
            .add_source(file)
            .add_source(environment)
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(config)
    }

    pub fn web_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn draft_timeout(&self) -> Duration {
        Duration::from_secs(self.draft_timeout_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            data_dir: "./data".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            draft_timeout_secs: 30,
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Tests touching process environment variables run one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 4] = [
        "LUMINA_PORT",
        "LUMINA_DRAFT_TIMEOUT_SECS",
        "LUMINA_DATA_DIR",
        API_KEY_ENV,
    ];

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = f();
        for key in ENV_VARS {
            env::remove_var(key);
        }
        result
    }

    fn toml(contents: &str) -> config::File<config::FileSourceString, config::FileFormat> {
        config::File::from_str(contents, config::FileFormat::Toml)
    }

    fn env_map(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        config::Environment::with_prefix("LUMINA").source(Some(map))
    }

    #[test]
    fn test_web_addr() {
        let config = Config {
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.web_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_draft_timeout_has_floor() {
        let config = Config {
            draft_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.draft_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = Config::from_sources(toml(""), env_map(&[]), None).unwrap();
        assert_eq!(config.web_addr(), "127.0.0.1:3000");
        assert_eq!(config.data_dir, "./data");
        assert_eq!(config.model, "gemini-3-flash-preview");
        assert_eq!(config.draft_timeout_secs, 30);
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_env_overrides_file_overrides_defaults() {
        let config = Config::from_sources(
            toml("port = 4000\ndata_dir = \"/srv/lumina\"\nmodel = \"file-model\""),
            env_map(&[("LUMINA_PORT", "5000"), ("LUMINA_MODEL", "env-model")]),
            Some("secret".to_string()),
        )
        .unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.model, "env-model");
        assert_eq!(config.data_dir, "/srv/lumina");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_file_value_is_config_error() {
        let result = Config::from_sources(toml("port = \"high\""), env_map(&[]), None);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_reads_process_env() {
        let config = with_env(
            &[
                ("LUMINA_PORT", "8080"),
                ("LUMINA_DRAFT_TIMEOUT_SECS", "5"),
                ("LUMINA_DATA_DIR", "/tmp/lumina-test"),
            ],
            Config::load,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.draft_timeout(), Duration::from_secs(5));
        assert_eq!(config.data_dir, "/tmp/lumina-test");
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = with_env(&[(API_KEY_ENV, "   ")], Config::load).unwrap();
        assert_eq!(config.api_key, None);

        let config = with_env(&[(API_KEY_ENV, " key-123 ")], Config::load).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("key-123"));
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = with_env(&[("LUMINA_PORT", "notaport")], Config::load);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
