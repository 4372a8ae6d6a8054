//! Storage backend abstraction for the document store.
//!
//! This module defines the contract every backend fulfills: path-addressed document and
//! collection operations plus two change-notification channels. Real database adapters
//! and the in-memory test double implement the same trait, so application code written
//! against [`StoreBackend`] can be tested without a real backing store.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use docpath::backend::StoreBackend;
//! use docpath::path::CollectionPath;
//! use bson::{Bson, doc};
//!
//! let users = CollectionPath::root("users");
//! backend.write_document(&users.doc("alice"), Bson::Document(doc! { "age": 30 })).await?;
//! let alice = backend.read_document(&users.doc("alice")).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Bson;
use std::{fmt::Debug, sync::Arc};

use crate::{
    document::Entry,
    error::DocumentStoreResult,
    event::{DeleteEvent, EventChannel, WriteEvent},
    path::{CollectionPath, DocumentPath},
    query::Query,
};

/// Abstract interface for path-addressed document storage backends.
///
/// # Error Handling
///
/// Reads of missing documents or collections return
/// [`DocumentStoreError::NotFound`](crate::error::DocumentStoreError::NotFound).
/// Deleting something that does not exist succeeds and emits nothing. Backends never
/// retry internally.
///
/// # Events
///
/// Every successful write emits exactly one [`WriteEvent`] on [`StoreBackend::on_write`];
/// every removed document emits one [`DeleteEvent`] on [`StoreBackend::on_delete`].
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Writes document data at `path`, creating intermediate levels as needed.
    ///
    /// If a document already exists and both the stored and the new data are BSON
    /// documents, the new data is deep-merged into the stored data. Otherwise the new
    /// data replaces the stored data. Arrays are always replaced, never merged.
    async fn write_document(&self, path: &DocumentPath, data: Bson) -> DocumentStoreResult<()>;

    /// Reads a copy of the document data at `path`.
    ///
    /// # Returns
    ///
    /// Returns [`DocumentStoreError::NotFound`](crate::error::DocumentStoreError::NotFound)
    /// if no document exists there.
    async fn read_document(&self, path: &DocumentPath) -> DocumentStoreResult<Bson>;

    /// Deletes the document at `path`. A missing document is not an error.
    async fn delete_document(&self, path: &DocumentPath) -> DocumentStoreResult<()>;

    /// Reads the documents of a collection, applying the query constraints in order.
    ///
    /// # Returns
    ///
    /// Returns entries in the collection's insertion order, or
    /// [`DocumentStoreError::NotFound`](crate::error::DocumentStoreError::NotFound) if the
    /// collection does not exist.
    async fn read_collection(
        &self,
        path: &CollectionPath,
        query: Query,
    ) -> DocumentStoreResult<Vec<Entry>>;

    /// Adds a document under a freshly generated id and returns that id.
    async fn add_to_collection(
        &self,
        path: &CollectionPath,
        data: Bson,
    ) -> DocumentStoreResult<String>;

    /// Deletes a collection with everything beneath it. A missing collection is not an
    /// error.
    async fn delete_collection(&self, path: &CollectionPath) -> DocumentStoreResult<()>;

    /// Channel receiving one event per document write.
    fn on_write(&self) -> &EventChannel<WriteEvent>;

    /// Channel receiving one event per deleted document.
    fn on_delete(&self) -> &EventChannel<DeleteEvent>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn write_document(&self, path: &DocumentPath, data: Bson) -> DocumentStoreResult<()> {
        (*self).write_document(path, data).await
    }

    async fn read_document(&self, path: &DocumentPath) -> DocumentStoreResult<Bson> {
        (*self).read_document(path).await
    }

    async fn delete_document(&self, path: &DocumentPath) -> DocumentStoreResult<()> {
        (*self).delete_document(path).await
    }

    async fn read_collection(
        &self,
        path: &CollectionPath,
        query: Query,
    ) -> DocumentStoreResult<Vec<Entry>> {
        (*self).read_collection(path, query).await
    }

    async fn add_to_collection(
        &self,
        path: &CollectionPath,
        data: Bson,
    ) -> DocumentStoreResult<String> {
        (*self).add_to_collection(path, data).await
    }

    async fn delete_collection(&self, path: &CollectionPath) -> DocumentStoreResult<()> {
        (*self).delete_collection(path).await
    }

    fn on_write(&self) -> &EventChannel<WriteEvent> {
        (**self).on_write()
    }

    fn on_delete(&self) -> &EventChannel<DeleteEvent> {
        (**self).on_delete()
    }
}

#[async_trait]
impl<B> StoreBackend for Arc<B>
where
    B: StoreBackend,
{
    async fn write_document(&self, path: &DocumentPath, data: Bson) -> DocumentStoreResult<()> {
        (**self).write_document(path, data).await
    }

    async fn read_document(&self, path: &DocumentPath) -> DocumentStoreResult<Bson> {
        (**self).read_document(path).await
    }

    async fn delete_document(&self, path: &DocumentPath) -> DocumentStoreResult<()> {
        (**self).delete_document(path).await
    }

    async fn read_collection(
        &self,
        path: &CollectionPath,
        query: Query,
    ) -> DocumentStoreResult<Vec<Entry>> {
        (**self).read_collection(path, query).await
    }

    async fn add_to_collection(
        &self,
        path: &CollectionPath,
        data: Bson,
    ) -> DocumentStoreResult<String> {
        (**self).add_to_collection(path, data).await
    }

    async fn delete_collection(&self, path: &CollectionPath) -> DocumentStoreResult<()> {
        (**self).delete_collection(path).await
    }

    fn on_write(&self) -> &EventChannel<WriteEvent> {
        (**self).on_write()
    }

    fn on_delete(&self) -> &EventChannel<DeleteEvent> {
        (**self).on_delete()
    }
}

/// Factory for backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
