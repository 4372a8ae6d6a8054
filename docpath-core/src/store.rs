//! Main document store interface.
//!
//! [`DocumentStore`] owns a backend and hands out typed handles for schema-described
//! documents and collections.
//!
//! # Example
//!
//! ```ignore
//! use docpath::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! let limits = store.collection::<RateLimits>();
//! let id = limits.add(&"client-1".to_string(), &attempt).await?;
//! ```

use crate::{
    backend::StoreBackend,
    error::DocumentStoreResult,
    event::{DeleteEvent, EventChannel, WriteEvent},
    schema::{CollectionSchema, DocumentSchema, TypedCollection, TypedDocuments},
};

/// A document store bound to a specific backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend, for untyped path-level access.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gets a typed handle for the documents described by `S`.
    pub fn documents<S: DocumentSchema>(&self) -> TypedDocuments<'_, B, S> {
        TypedDocuments::new(&self.backend)
    }

    /// Gets a typed handle for the collections described by `S`.
    pub fn collection<S: CollectionSchema>(&self) -> TypedCollection<'_, B, S> {
        TypedCollection::new(&self.backend)
    }

    pub fn on_write(&self) -> &EventChannel<WriteEvent> {
        self.backend.on_write()
    }

    pub fn on_delete(&self) -> &EventChannel<DeleteEvent> {
        self.backend.on_delete()
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown operation fails.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await?;

        Ok(())
    }
}
