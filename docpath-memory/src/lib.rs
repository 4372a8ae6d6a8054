//! In-memory document storage backend for docpath.
//!
//! This crate provides an in-memory implementation of the `StoreBackend` trait. It keeps
//! a hierarchical document tree behind an async-aware read-write lock and is meant as a
//! drop-in test double for real document databases.
//!
//! # Features
//!
//! - **Path-addressed tree** - Collections and documents nest to any depth
//! - **Deep-merge writes** - Partial writes merge into existing documents
//! - **Ordered queries** - `where`, `array-contains` and `limit` applied as a pipeline
//! - **Change events** - Synchronous write and delete notifications
//! - **Simulated latency** - Optional delay before every operation
//!
//! # Quick Start
//!
//! ```ignore
//! use docpath::{prelude::*, memory::InMemoryStore};
//! use bson::bson;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::builder().build().await?;
//!     let requests = CollectionPath::root("rateLimit").doc("client-1").collection("requests");
//!
//!     let id = store.add_to_collection(&requests, bson!({ "attempts": 1 })).await?;
//!     let entries = store
//!         .read_collection(&requests, Query::builder().where_field("attempts", WhereOp::Gte, 1).build())
//!         .await?;
//!     assert_eq!(entries[0].id, id);
//!
//!     Ok(())
//! }
//! ```

mod evaluator;
mod tree;

pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
