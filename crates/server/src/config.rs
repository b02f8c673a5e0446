//! Server configuration: TOML file, then environment, then CLI flags.

use std::path::{Path, PathBuf};

use scholar_service::Locale;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8080;

pub const ENV_API_KEY: &str = "SCHOLAR_API_KEY";
pub const ENV_MAX_PAGE_LIMIT: &str = "SCHOLAR_MAX_PAGE_LIMIT";
pub const ENV_LOCALE: &str = "SCHOLAR_LOCALE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    /// JSON file backing the store. `None` keeps everything in memory.
    pub data_file: Option<PathBuf>,
    /// When set, POST, PUT and DELETE require this key.
    pub api_key: Option<String>,
    /// Upper bound applied to the `limit` of list requests.
    pub max_page_limit: Option<u64>,
    pub locale: Locale,
    pub cors_allow_any: bool,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            data_file: None,
            api_key: None,
            max_page_limit: None,
            locale: Locale::default(),
            cors_allow_any: true,
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl ServerConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, overlaid by `path` when given, then by the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_env(|var| std::env::var(var).ok())
    }

    /// Apply `SCHOLAR_*` overrides read through `lookup`. Empty values are
    /// ignored.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(raw) = get(ENV_MAX_PAGE_LIMIT) {
            let max = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| ConfigError::InvalidEnv {
                    var: ENV_MAX_PAGE_LIMIT,
                    reason: format!("'{raw}' is not a positive integer"),
                })?;
            self.max_page_limit = Some(max);
        }
        if let Some(raw) = get(ENV_LOCALE) {
            self.locale = raw.parse().map_err(|reason| ConfigError::InvalidEnv {
                var: ENV_LOCALE,
                reason,
            })?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.locale, Locale::Bn);
        assert!(cfg.cors_allow_any);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scholar.toml");
        std::fs::write(
            &path,
            "port = 9000\nlocale = \"en\"\nmax_page_limit = 50\ndata_file = \"data.json\"\n",
        )
        .unwrap();
        let cfg = ServerConfig::from_file(&path).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.locale, Locale::En);
        assert_eq!(cfg.max_page_limit, Some(50));
        assert_eq!(cfg.data_file, Some(PathBuf::from("data.json")));
        assert!(cfg.cors_allow_any);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scholar.toml");
        std::fs::write(&path, "prot = 1\n").unwrap();
        assert!(matches!(
            ServerConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides_file() {
        let cfg = ServerConfig {
            api_key: Some("from-file".into()),
            ..Default::default()
        }
        .with_env(env(&[
            (ENV_API_KEY, "from-env"),
            (ENV_MAX_PAGE_LIMIT, "25"),
            (ENV_LOCALE, "en"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("from-env"));
        assert_eq!(cfg.max_page_limit, Some(25));
        assert_eq!(cfg.locale, Locale::En);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let cfg = ServerConfig::default()
            .with_env(env(&[(ENV_API_KEY, ""), (ENV_LOCALE, "  ")]))
            .unwrap();
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.locale, Locale::Bn);
    }

    #[test]
    fn bad_env_values_are_errors() {
        let err = ServerConfig::default()
            .with_env(env(&[(ENV_MAX_PAGE_LIMIT, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_PAGE_LIMIT));
        assert!(ServerConfig::default()
            .with_env(env(&[(ENV_LOCALE, "fr")]))
            .is_err());
    }
}
