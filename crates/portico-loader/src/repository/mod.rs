//! API definition repositories.
//!
//! A [`Repository`] lists every API definition the gateway should know
//! about. The loader treats a repository failure as fatal to the load cycle.

mod file;
mod memory;

pub use file::FileSystemRepository;
pub use memory::InMemoryRepository;

use crate::error::RepositoryError;
use async_trait::async_trait;
use portico_core::ApiDefinition;

/// Source of API definitions.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Returns every stored definition, in a stable order.
    async fn find_all(&self) -> Result<Vec<ApiDefinition>, RepositoryError>;
}
