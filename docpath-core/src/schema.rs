//! Typed access to specific document and collection kinds.
//!
//! A schema maps a strongly-typed identifier to a concrete path and fixes the data type
//! stored there. The handles in this module only translate calls into
//! [`StoreBackend`] operations; they never change the backend's semantics.
//!
//! # Schemas
//!
//! - [`DocumentSchema`] - A single document kind, e.g. a user's public profile
//! - [`CollectionSchema`] - A collection kind, e.g. the VR instances of a portal page
//!
//! # Handles
//!
//! - [`TypedDocuments`] - create/read/update/delete of schema documents
//! - [`TypedCollection`] - add/read/query/write/delete within schema collections
//!
//! # Example
//!
//! ```ignore
//! use docpath::prelude::*;
//!
//! pub struct UserPublicProfile;
//!
//! impl DocumentSchema for UserPublicProfile {
//!     type Identifier = String;
//!     type Data = Profile;
//!
//!     fn path(uid: &String) -> DocumentPath {
//!         CollectionPath::root("users").doc(uid).collection("profile").doc("public")
//!     }
//! }
//!
//! let profiles = store.documents::<UserPublicProfile>();
//! profiles.create(&"u1".to_string(), &profile).await?;
//! ```

use serde::Serialize;
use std::marker::PhantomData;

use crate::{
    backend::StoreBackend,
    document::{DocumentData, DocumentExt, Entry},
    error::DocumentStoreResult,
    path::{CollectionPath, DocumentPath},
    query::Query,
};

/// Describes one kind of document addressed by an identifier.
pub trait DocumentSchema {
    type Identifier: Send + Sync;
    type Data: DocumentData;

    fn path(identifier: &Self::Identifier) -> DocumentPath;
}

/// Describes one kind of collection addressed by an identifier.
pub trait CollectionSchema {
    type Identifier: Send + Sync;
    type Data: DocumentData;

    fn path(identifier: &Self::Identifier) -> CollectionPath;
}

/// Handle for the documents described by schema `S`.
#[derive(Debug)]
pub struct TypedDocuments<'a, B: StoreBackend, S: DocumentSchema> {
    backend: &'a B,
    _marker: PhantomData<S>,
}

impl<'a, B: StoreBackend, S: DocumentSchema> TypedDocuments<'a, B, S> {
    pub(crate) fn new(backend: &'a B) -> Self {
        Self {
            backend,
            _marker: PhantomData,
        }
    }

    /// Writes the full document data.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the data
    /// cannot be serialized or the backend fails.
    pub async fn create(&self, identifier: &S::Identifier, data: &S::Data) -> DocumentStoreResult<()> {
        self.backend
            .write_document(&S::path(identifier), data.to_bson()?)
            .await
    }

    /// Reads the document, mapping a missing document to `None`.
    pub async fn read(&self, identifier: &S::Identifier) -> DocumentStoreResult<Option<S::Data>> {
        match self.backend.read_document(&S::path(identifier)).await {
            Ok(data) => Ok(Some(S::Data::from_bson(data)?)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Deep-merges partial data into the document, creating it if needed.
    pub async fn update<P>(&self, identifier: &S::Identifier, partial: &P) -> DocumentStoreResult<()>
    where
        P: Serialize + Sync,
    {
        self.backend
            .write_document(&S::path(identifier), bson::ser::serialize_to_bson(partial)?)
            .await
    }

    pub async fn delete(&self, identifier: &S::Identifier) -> DocumentStoreResult<()> {
        self.backend
            .delete_document(&S::path(identifier))
            .await
    }
}

/// Handle for the collections described by schema `S`.
#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, S: CollectionSchema> {
    backend: &'a B,
    _marker: PhantomData<S>,
}

impl<'a, B: StoreBackend, S: CollectionSchema> TypedCollection<'a, B, S> {
    pub(crate) fn new(backend: &'a B) -> Self {
        Self {
            backend,
            _marker: PhantomData,
        }
    }

    /// Adds a document under a generated id.
    ///
    /// # Returns
    ///
    /// The id of the new document.
    pub async fn add(&self, identifier: &S::Identifier, data: &S::Data) -> DocumentStoreResult<String> {
        self.backend
            .add_to_collection(&S::path(identifier), data.to_bson()?)
            .await
    }

    /// Reads one document of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::NotFound`](crate::error::DocumentStoreError::NotFound)
    /// if the document does not exist.
    pub async fn read(&self, identifier: &S::Identifier, id: &str) -> DocumentStoreResult<S::Data> {
        let data = self
            .backend
            .read_document(&S::path(identifier).doc(id))
            .await?;

        S::Data::from_bson(data)
    }

    /// Reads the documents of the collection matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::NotFound`](crate::error::DocumentStoreError::NotFound)
    /// if the collection does not exist.
    pub async fn read_all(
        &self,
        identifier: &S::Identifier,
        query: Query,
    ) -> DocumentStoreResult<Vec<Entry<S::Data>>> {
        self.backend
            .read_collection(&S::path(identifier), query)
            .await?
            .into_iter()
            .map(Entry::into_typed)
            .collect()
    }

    /// Deep-merges partial data into the document `id`, creating it if needed.
    pub async fn write<P>(&self, identifier: &S::Identifier, id: &str, partial: &P) -> DocumentStoreResult<()>
    where
        P: Serialize + Sync,
    {
        self.backend
            .write_document(
                &S::path(identifier).doc(id),
                bson::ser::serialize_to_bson(partial)?,
            )
            .await
    }

    pub async fn delete(&self, identifier: &S::Identifier, id: &str) -> DocumentStoreResult<()> {
        self.backend
            .delete_document(&S::path(identifier).doc(id))
            .await
    }

    /// Deletes the whole collection.
    pub async fn delete_all(&self, identifier: &S::Identifier) -> DocumentStoreResult<()> {
        self.backend
            .delete_collection(&S::path(identifier))
            .await
    }
}
