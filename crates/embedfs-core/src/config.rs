use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which filesystem serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Host,
    #[default]
    Embedded,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Host => f.write_str("host"),
            BackendKind::Embedded => f.write_str("embedded"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "host" => Ok(BackendKind::Host),
            "embedded" => Ok(BackendKind::Embedded),
            other => Err(format!("unknown backend '{}' (expected host or embedded)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Backend to serve from
    #[serde(default)]
    pub backend: BackendKind,

    /// Read size used when streaming file content, in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Directory prepended to paths on the host backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_root: Option<PathBuf>,
}

fn default_chunk_size() -> usize {
    64 * 1024
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            chunk_size: default_chunk_size(),
            host_root: None,
        }
    }
}

impl EmbedConfig {
    /// Default config file path for this platform
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("dev", "embedfs", "embedfs") {
            dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("embedfs-config.json")
        }
    }

    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&data).with_context(|| "failed to parse config JSON")?;
        if config.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }
        Ok(config)
    }

    /// Save config to a file path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Path handed to the backend for a user-supplied path.
    ///
    /// Host paths are joined onto `host_root` when one is set; embedded
    /// paths are always used verbatim since lookup is by exact key.
    pub fn resolve_path(&self, path: &str) -> String {
        match (self.backend, &self.host_root) {
            (BackendKind::Host, Some(root)) => root
                .join(path.trim_start_matches('/'))
                .to_string_lossy()
                .to_string(),
            _ => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: EmbedConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.backend, BackendKind::Embedded);
        assert_eq!(config.chunk_size, 64 * 1024);
        assert!(config.host_root.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");

        let config = EmbedConfig {
            backend: BackendKind::Host,
            chunk_size: 512,
            host_root: Some(PathBuf::from("/srv/www")),
        };
        config.save(&path).unwrap();

        let loaded = EmbedConfig::load(&path).unwrap();
        assert_eq!(loaded.backend, BackendKind::Host);
        assert_eq!(loaded.chunk_size, 512);
        assert_eq!(loaded.host_root, Some(PathBuf::from("/srv/www")));
    }

    #[test]
    fn test_load_rejects_zero_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"chunk_size": 0}"#).unwrap();
        assert!(EmbedConfig::load(&path).is_err());
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("host".parse::<BackendKind>().unwrap(), BackendKind::Host);
        assert_eq!("Embedded".parse::<BackendKind>().unwrap(), BackendKind::Embedded);
        assert!("disk".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::Host.to_string(), "host");
    }

    #[test]
    fn test_resolve_path() {
        let mut config = EmbedConfig::default();
        assert_eq!(config.resolve_path("/index.html"), "/index.html");

        config.host_root = Some(PathBuf::from("/srv/www"));
        assert_eq!(config.resolve_path("/index.html"), "/index.html");

        config.backend = BackendKind::Host;
        assert_eq!(config.resolve_path("/index.html"), "/srv/www/index.html");

        config.host_root = None;
        assert_eq!(config.resolve_path("/index.html"), "/index.html");
    }
}
