//! Convenient re-exports of commonly used types from docpath.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docpath::prelude::*;
//! ```

pub use docpath_core::{
    store::DocumentStore,
    document::{DocumentData, DocumentExt, Entry},
    backend::{StoreBackend, StoreBackendBuilder},
    path::{DocumentPath, CollectionPath},
    query::{Query, QueryBuilder, QueryVisitor, Constraint, WhereOp},
    event::{WriteEvent, DeleteEvent, EventChannel, SubscriptionId},
    schema::{DocumentSchema, CollectionSchema, TypedDocuments, TypedCollection},
    error::{DocumentStoreError, DocumentStoreResult},
};
