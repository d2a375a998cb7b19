//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for document access.
//! Implementations can use SQLite, in-memory, a remote store, etc.

use async_trait::async_trait;
use checkmarket::{Entity, SortKey};

use crate::error::StoreResult;

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Store a new entity and return the id the store assigned to it
    async fn create(&self, entity: &T) -> StoreResult<T::Id>;

    /// Find entity by ID
    async fn find_by_id(&self, id: &T::Id) -> StoreResult<Option<T>>;

    /// List all entities
    async fn list(&self) -> StoreResult<Vec<T>>;

    /// Write the whole entity under its id, creating it when absent
    async fn replace(&self, entity: &T) -> StoreResult<()>;

    /// Delete entity by ID. Deleting a missing id is not an error.
    async fn delete(&self, id: &T::Id) -> StoreResult<()>;
}

/// Extension for repositories that can list in a requested order
#[async_trait]
pub trait OrderedRepository<T: Entity>: Repository<T> {
    /// Full listing ordered by the key's field, then by id
    async fn list_ordered(&self, key: SortKey) -> StoreResult<Vec<T>>;
}
