//! Main docpath crate providing a unified interface for path-addressed document storage.
//!
//! This crate is the primary entry point for users of docpath. It re-exports the core
//! types from `docpath-core` and provides access to the bundled storage backend.
//!
//! # Features
//!
//! - **Typed paths** - Document and collection addresses that cannot have the wrong shape
//! - **Deep-merge writes** - Partial updates merge into stored documents
//! - **Composable queries** - `where`, `array-contains` and `limit`, applied in order
//! - **Change events** - Subscribe to every write and delete
//! - **Typed schemas** - Map identifiers to paths and serde types
//!
//! # Quick Start
//!
//! ```ignore
//! use docpath::{prelude::*, memory::InMemoryStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Instance {
//!     pub region: String,
//!     pub players: u32,
//! }
//!
//! pub struct PageInstances;
//!
//! impl CollectionSchema for PageInstances {
//!     type Identifier = String;
//!     type Data = Instance;
//!
//!     fn path(page: &String) -> CollectionPath {
//!         CollectionPath::root("portalPages").doc(page).collection("instances")
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());
//!     let instances = store.collection::<PageInstances>();
//!     let page = "landing".to_string();
//!
//!     instances
//!         .add(&page, &Instance { region: "eu".into(), players: 4 })
//!         .await
//!         .unwrap();
//!
//!     let crowded = instances
//!         .read_all(&page, Query::builder().where_field("players", WhereOp::Gt, 2).build())
//!         .await
//!         .unwrap();
//!
//!     println!("Crowded instances: {:?}", crowded);
//!
//!     store.shutdown().await.unwrap();
//! }
//! ```
//!
//! # Change Events
//!
//! ```ignore
//! let subscription = store.on_write().subscribe(|event: &WriteEvent| {
//!     println!("{} written", event.path);
//! });
//!
//! store.on_write().unsubscribe(subscription);
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory engine for development and testing

pub mod prelude;

pub use docpath_core::{backend, document, error, event, path, query, schema, store};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docpath_memory::{InMemoryStore, InMemoryStoreBuilder};
}
