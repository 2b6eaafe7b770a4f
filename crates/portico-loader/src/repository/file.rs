use super::Repository;
use crate::error::RepositoryError;
use async_trait::async_trait;
use portico_core::ApiDefinition;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Repository backed by a directory of JSON files.
///
/// Every `*.json` file in the directory (not recursive) holds either one
/// definition object or an array of them. Files are read in sorted path
/// order, so the definition order is stable across reloads.
///
/// Any unreadable or malformed file fails the whole listing.
#[derive(Debug, Clone)]
pub struct FileSystemRepository {
    dir: PathBuf,
}

impl FileSystemRepository {
    /// Creates a repository reading from `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory being read.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn definition_files(&self) -> Result<Vec<PathBuf>, RepositoryError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| RepositoryError::read(&self.dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepositoryError::read(&self.dir, e))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| RepositoryError::read(&path, e))?
                .is_file();
            if is_file && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn parse_definitions(path: &Path, bytes: &[u8]) -> Result<Vec<ApiDefinition>, RepositoryError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| RepositoryError::parse(path, e))?;
    match value {
        Value::Array(_) => serde_json::from_value(value),
        other => serde_json::from_value(other).map(|definition| vec![definition]),
    }
    .map_err(|e| RepositoryError::parse(path, e))
}

#[async_trait]
impl Repository for FileSystemRepository {
    async fn find_all(&self) -> Result<Vec<ApiDefinition>, RepositoryError> {
        let mut definitions = Vec::new();
        for path in self.definition_files().await? {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| RepositoryError::read(&path, e))?;
            let parsed = parse_definitions(&path, &bytes)?;
            tracing::debug!(path = %path.display(), definitions = parsed.len(), "definition file read");
            definitions.extend(parsed);
        }
        Ok(definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const POSTS: &str = r#"{
        "name": "posts",
        "proxy": {
            "listen_path": "/posts/*",
            "upstream_url": "http://posts.internal:8080",
            "hosts": ["api.example.com"]
        },
        "plugins": [{"name": "stats", "enabled": true}]
    }"#;

    const PAIR: &str = r#"[
        {"name": "users", "proxy": {"listen_path": "/users", "upstream_url": "http://users:8080"}},
        {"name": "legacy", "active": false, "proxy": {"listen_path": "/legacy", "upstream_url": "http://legacy:8080"}}
    ]"#;

    #[tokio::test]
    async fn test_reads_objects_and_arrays_in_path_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b-users.json"), PAIR).unwrap();
        fs::write(dir.path().join("a-posts.json"), POSTS).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let repo = FileSystemRepository::new(dir.path());
        let definitions = repo.find_all().await.unwrap();

        let names: Vec<_> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["posts", "users", "legacy"]);
        assert!(definitions[0].active);
        assert!(definitions[0].plugins[0].enabled);
        assert!(!definitions[2].active);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let repo = FileSystemRepository::new(dir.path());
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let repo = FileSystemRepository::new(dir.path().join("nope"));
        assert!(matches!(
            repo.find_all().await,
            Err(RepositoryError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_file_fails_listing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), POSTS).unwrap();
        fs::write(dir.path().join("b.json"), "{ not json").unwrap();

        let repo = FileSystemRepository::new(dir.path());
        match repo.find_all().await {
            Err(RepositoryError::Parse { path, .. }) => assert!(path.ends_with("b.json")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_shape_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"name": "no-proxy"}"#).unwrap();

        let repo = FileSystemRepository::new(dir.path());
        assert!(matches!(
            repo.find_all().await,
            Err(RepositoryError::Parse { .. })
        ));
    }
}
