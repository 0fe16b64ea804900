use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Progress is logged every this many imported lines unless configured
pub const DEFAULT_LOG_INTERVAL: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexqConfig {
    pub database: Option<String>,
    pub log_interval: Option<usize>,
}

impl IndexqConfig {
    /// Database path: CLI flag, then config file, then `indexq.db`
    pub fn database_path(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_database_path)
    }

    pub fn log_interval(&self) -> usize {
        match self.log_interval {
            Some(n) if n > 0 => n,
            _ => DEFAULT_LOG_INTERVAL,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("indexq.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("indexq.db")
}

/// Load the config file, falling back to defaults when it does not exist
pub fn load_config(path: Option<&Path>) -> anyhow::Result<IndexqConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(IndexqConfig::default());
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: IndexqConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(config)
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();

        assert_eq!(config.database_path(None), default_database_path());
        assert_eq!(config.log_interval(), DEFAULT_LOG_INTERVAL);
    }

    #[test]
    fn test_config_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexq.toml");
        std::fs::write(&path, "database = \"data/urls.sqlite3\"\nlog_interval = 25\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.database_path(None), PathBuf::from("data/urls.sqlite3"));
        assert_eq!(config.log_interval(), 25);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = IndexqConfig {
            database: Some("from-config.db".to_string()),
            log_interval: Some(0),
        };
        assert_eq!(
            config.database_path(Some(Path::new("from-cli.db"))),
            PathBuf::from("from-cli.db")
        );
        assert_eq!(config.log_interval(), DEFAULT_LOG_INTERVAL);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexq.toml");
        std::fs::write(&path, "log_interval = \"often\"\n").unwrap();

        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("indexq.db");

        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
