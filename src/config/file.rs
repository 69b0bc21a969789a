//! File-based Configuration Provider

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::ConfigResult;
use super::provider::ConfigProvider;

/// A JSON object read once from disk. A missing file behaves as empty.
#[derive(Debug, Clone, Default)]
pub struct FileConfigProvider {
    path: PathBuf,
    data: Map<String, Value>,
}

impl FileConfigProvider {
    pub async fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Ok(Self {
                path,
                data: Map::new(),
            });
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let data: Map<String, Value> = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), keys = data.len(), "Loaded bridge config file");
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(match self.data.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(v) => Some(v.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_provider() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        std::fs::write(
            &path,
            r#"{"plugins_dir": "/opt/plugins", "user_scope": true, "hook_timeout_secs": 45, "inline_timeout_secs": null}"#,
        )
        .unwrap();

        let provider = FileConfigProvider::open(&path).await.unwrap();
        assert_eq!(provider.path(), path.as_path());
        assert_eq!(provider.get_raw("plugins_dir").unwrap().as_deref(), Some("/opt/plugins"));
        assert_eq!(provider.get_raw("user_scope").unwrap().as_deref(), Some("true"));
        assert_eq!(provider.get_raw("hook_timeout_secs").unwrap().as_deref(), Some("45"));
        assert_eq!(provider.get_raw("inline_timeout_secs").unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::open(dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(provider.get_raw("user_scope").unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(FileConfigProvider::open(&path).await.is_err());
    }
}
