//! Typed addresses into the document tree.
//!
//! Paths alternate between collection and document segments:
//! `collection/id/collection/id/...`. A [`DocumentPath`] always has an even number
//! of segments and a [`CollectionPath`] an odd number. Both types can only be
//! constructed in a valid shape, so backends never have to re-check parity.
//!
//! # Example
//!
//! ```ignore
//! use docpath::path::{CollectionPath, DocumentPath};
//!
//! let instances = CollectionPath::root("portalPages")
//!     .doc("page-1")
//!     .collection("instances");
//! assert_eq!(instances.to_string(), "portalPages/page-1/instances");
//!
//! let profile = DocumentPath::new(["users", "u1", "profile", "public"])?;
//! assert_eq!(profile.id(), "public");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DocumentStoreError, DocumentStoreResult};

fn collect_segments<I, S>(segments: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    segments
        .into_iter()
        .map(Into::into)
        .collect()
}

fn fmt_segments(segments: &[String], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&segments.join("/"))
}

/// Address of a single document: `collection/id(/collection/id)*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DocumentPath(Vec<String>);

impl DocumentPath {
    /// Builds a document path from raw segments.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidPath`] if the sequence is empty or has an
    /// odd number of segments.
    pub fn new<I, S>(segments: I) -> DocumentStoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_from(collect_segments(segments))
    }

    /// All segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments (always even and non-zero).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The document id, i.e. the last segment.
    pub fn id(&self) -> &str {
        &self.0[self.0.len() - 1]
    }

    /// The collection this document lives in.
    pub fn parent(&self) -> CollectionPath {
        CollectionPath(self.0[..self.0.len() - 1].to_vec())
    }

    /// Addresses a subcollection nested beneath this document.
    pub fn collection(&self, name: impl Into<String>) -> CollectionPath {
        let mut segments = self.0.clone();
        segments.push(name.into());
        CollectionPath(segments)
    }
}

impl TryFrom<Vec<String>> for DocumentPath {
    type Error = DocumentStoreError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        if segments.is_empty() || segments.len() % 2 != 0 {
            return Err(DocumentStoreError::InvalidPath(format!(
                "document path needs an even, non-zero number of segments, got {:?}",
                segments
            )));
        }

        Ok(DocumentPath(segments))
    }
}

impl From<DocumentPath> for Vec<String> {
    fn from(path: DocumentPath) -> Self {
        path.0
    }
}

impl AsRef<[String]> for DocumentPath {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_segments(&self.0, f)
    }
}

/// Address of a collection: `collection(/id/collection)*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CollectionPath(Vec<String>);

impl CollectionPath {
    /// Builds a collection path from raw segments.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidPath`] if the number of segments is even.
    pub fn new<I, S>(segments: I) -> DocumentStoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_from(collect_segments(segments))
    }

    /// A top-level collection.
    pub fn root(name: impl Into<String>) -> Self {
        CollectionPath(vec![name.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The collection name, i.e. the last segment.
    pub fn id(&self) -> &str {
        &self.0[self.0.len() - 1]
    }

    /// The document owning this collection, or `None` for a top-level collection.
    pub fn parent(&self) -> Option<DocumentPath> {
        match self.0.len() {
            1 => None,
            len => Some(DocumentPath(self.0[..len - 1].to_vec())),
        }
    }

    /// Addresses the document `id` inside this collection.
    pub fn doc(&self, id: impl Into<String>) -> DocumentPath {
        let mut segments = self.0.clone();
        segments.push(id.into());
        DocumentPath(segments)
    }
}

impl TryFrom<Vec<String>> for CollectionPath {
    type Error = DocumentStoreError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        if segments.len() % 2 == 0 {
            return Err(DocumentStoreError::InvalidPath(format!(
                "collection path needs an odd number of segments, got {:?}",
                segments
            )));
        }

        Ok(CollectionPath(segments))
    }
}

impl From<CollectionPath> for Vec<String> {
    fn from(path: CollectionPath) -> Self {
        path.0
    }
}

impl AsRef<[String]> for CollectionPath {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_segments(&self.0, f)
    }
}
