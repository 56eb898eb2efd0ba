//! Base repository trait for storage operations.

/// Contains the Repository trait.
///
/// A repository is a data access layer for one kind of record. It provides methods for creating,
/// reading, updating, and deleting entities, as well as listing them with simple filters.
///
/// Implementations own their backing resource (a connection pool, an in-memory map) and are shared
/// between request handlers, so every method takes `&self`.
use crate::db::errors::Result;

/// Base repository trait providing common storage operations
///
/// This trait has separate associated types for create requests, update requests, and responses.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// The request type for creating entities
    type CreateRequest: Send + Sync;

    /// The request type for updating entities
    type UpdateRequest: Send + Sync;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities with filtering and pagination
    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Delete an entity by ID
    async fn delete(&self, id: Self::Id) -> Result<bool>;

    /// Update an entity by ID
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}
