use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::endpoints::DEFAULT_HOST;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API host; the scheme is fixed per endpoint.
    pub host: String,
    pub region: String,
    /// Response cache database. `None` picks a SQLite file in the cache dir.
    pub database_url: Option<String>,
    pub cache_enabled: bool,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            region: "us".to_string(),
            database_url: None,
            cache_enabled: true,
            request_timeout_secs: 30,
            user_agent: concat!("tubi-addon/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, `$TUBI_CONFIG`, or the default config file, then
    /// apply `TUBI_*` environment overrides. A missing default file is fine;
    /// a missing explicit one is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("TUBI_CONFIG").map(PathBuf::from));
        let mut cfg = match explicit {
            Some(p) => Self::from_file(&p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config: {}", path.display()))
    }

    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("TUBI_HOST").filter(|s| !s.trim().is_empty()) { self.host = v.trim().to_string(); }
        if let Some(v) = var("TUBI_REGION").filter(|s| !s.trim().is_empty()) { self.region = v.trim().to_ascii_lowercase(); }
        if let Some(v) = var("TUBI_DATABASE_URL").filter(|s| !s.trim().is_empty()) { self.database_url = Some(v); }
        if let Some(v) = var("TUBI_CACHE") {
            self.cache_enabled = !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no");
        }
        if let Some(secs) = var("TUBI_REQUEST_TIMEOUT_SECS").and_then(|s| s.parse().ok()) { self.request_timeout_secs = secs; }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "tubitv", "tubi-addon").map(|p| p.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "region = \"ca\"\ncache_enabled = false\n").unwrap();
        let cfg = Config::from_file(&path).unwrap();
        assert_eq!(cfg.region, "ca");
        assert!(!cfg.cache_enabled);
        assert_eq!(cfg.host, "tubitv.com");
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("TUBI_HOST", "staging.tubitv.com"),
            ("TUBI_REGION", " CA "),
            ("TUBI_CACHE", "off"),
            ("TUBI_REQUEST_TIMEOUT_SECS", "5"),
            ("TUBI_DATABASE_URL", "sqlite::memory:"),
        ]
        .into_iter()
        .collect();
        let mut cfg = Config::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.host, "staging.tubitv.com");
        assert_eq!(cfg.region, "ca");
        assert!(!cfg.cache_enabled);
        assert_eq!(cfg.request_timeout_secs, 5);
        assert_eq!(cfg.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn unparsable_timeout_is_ignored() {
        let mut cfg = Config::default();
        cfg.apply_env(|k| (k == "TUBI_REQUEST_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(cfg.request_timeout_secs, 30);
    }
}
