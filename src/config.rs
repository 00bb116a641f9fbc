//! Generator configuration
//!
//! Layered: YAML file, then `HEPHORA_*` environment variables, then whatever
//! the CLI overrides on the loaded value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::ConfigError;

pub const ENV_BASE_URL: &str = "HEPHORA_BASE_URL";
pub const ENV_TOKEN: &str = "HEPHORA_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "HEPHORA_TIMEOUT_SECS";
pub const ENV_DOCS_DIR: &str = "HEPHORA_DOCS_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocgenConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub docs_dir: PathBuf,
    pub class_diagrams_dir: PathBuf,
    pub block_diagram_dir: PathBuf,
    pub templates_dir: Option<PathBuf>,
    pub fetch_concurrency: usize,
    pub bootstrap: bool,
}

impl Default for DocgenConfig {
    fn default() -> Self {
        Self {
            base_url: "http://http_server:8080".to_string(),
            token: None,
            timeout_secs: 20,
            docs_dir: PathBuf::from("docs/source"),
            class_diagrams_dir: PathBuf::from("out/class_diagrams"),
            block_diagram_dir: PathBuf::from("out/block_diagram"),
            templates_dir: None,
            fetch_concurrency: 1,
            bootstrap: true,
        }
    }
}

impl DocgenConfig {
    /// Reads the optional YAML file and applies the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Overrides from `HEPHORA_*` variables; `lookup` is the environment
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(token) = non_empty(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(secs) = non_empty(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_TIMEOUT_SECS,
                message: format!("'{}' is not a number of seconds", secs),
            })?;
        }
        if let Some(dir) = non_empty(ENV_DOCS_DIR) {
            self.docs_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "fetch_concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            value: self.base_url.clone(),
            source,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DocgenConfig::default();
        assert_eq!(config.base_url, "http://http_server:8080");
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.fetch_concurrency, 1);
        assert!(config.bootstrap);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = DocgenConfig::from_yaml("docs_dir: site/src\nfetch_concurrency: 4\n").unwrap();
        assert_eq!(config.docs_dir, PathBuf::from("site/src"));
        assert_eq!(config.fetch_concurrency, 4);
        assert_eq!(config.class_diagrams_dir, PathBuf::from("out/class_diagrams"));
        assert_eq!(DocgenConfig::from_yaml("").unwrap(), DocgenConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = DocgenConfig::from_yaml("base_url: http://file:1\ntoken: a\n").unwrap();
        config
            .apply_env(env(&[
                (ENV_BASE_URL, "http://env:2"),
                (ENV_TIMEOUT_SECS, "5"),
                (ENV_TOKEN, ""),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "http://env:2");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.token.as_deref(), Some("a"));
    }

    #[test]
    fn test_bad_timeout_env() {
        let mut config = DocgenConfig::default();
        let err = config
            .apply_env(env(&[(ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_TIMEOUT_SECS, .. }));
    }

    #[test]
    fn test_validation() {
        let config = DocgenConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BaseUrl { .. })));

        let config = DocgenConfig {
            fetch_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "fetch_concurrency", .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docgen.yaml");
        std::fs::write(&path, "bootstrap: false\ntemplates_dir: tpl\n").unwrap();
        let config = DocgenConfig::from_file(&path).unwrap();
        assert!(!config.bootstrap);
        assert_eq!(config.templates_dir, Some(PathBuf::from("tpl")));

        let err = DocgenConfig::from_file(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
