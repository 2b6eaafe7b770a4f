use super::Repository;
use crate::error::RepositoryError;
use async_trait::async_trait;
use parking_lot::RwLock;
use portico_core::ApiDefinition;

/// Repository held in memory, for tests and embedding.
///
/// Definitions keep insertion order. Adding a definition whose name is
/// already stored replaces it in place.
///
/// # Example
///
/// ```
/// use portico_core::{ApiDefinition, ProxyDefinition};
/// use portico_loader::{InMemoryRepository, Repository};
///
/// # tokio_test::block_on(async {
/// let repo = InMemoryRepository::new();
/// repo.add(ApiDefinition::new("posts", ProxyDefinition::new("/posts", "http://posts:8080")));
///
/// assert_eq!(repo.find_all().await.unwrap().len(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    definitions: RwLock<Vec<ApiDefinition>>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding `definitions`.
    #[must_use]
    pub fn with_definitions(definitions: impl IntoIterator<Item = ApiDefinition>) -> Self {
        let repo = Self::new();
        for definition in definitions {
            repo.add(definition);
        }
        repo
    }

    /// Adds or replaces a definition.
    pub fn add(&self, definition: ApiDefinition) {
        let mut definitions = self.definitions.write();
        match definitions.iter_mut().find(|d| d.name == definition.name) {
            Some(existing) => *existing = definition,
            None => definitions.push(definition),
        }
    }

    /// Removes the definition named `name`. Returns `true` if it existed.
    pub fn remove(&self, name: &str) -> bool {
        let mut definitions = self.definitions.write();
        let before = definitions.len();
        definitions.retain(|d| d.name != name);
        definitions.len() != before
    }

    /// Returns the number of stored definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_all(&self) -> Result<Vec<ApiDefinition>, RepositoryError> {
        Ok(self.definitions.read().clone())
    }
}
