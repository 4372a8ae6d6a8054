//! A path-addressed, hierarchical document database abstraction.
//!
//! Documents live at paths that alternate between collection and document segments,
//! e.g. `portalPages/p1/instances/i1`. This crate is the core of the docpath project and
//! provides:
//!
//! - **Paths** ([`path`]) - Parity-checked document and collection addresses
//! - **Store backend abstraction** ([`backend`]) - The contract every backend fulfills
//! - **Query constraints** ([`query`]) - `where`, `array-contains` and `limit` pipelines
//! - **Change events** ([`event`]) - Synchronous write/delete notification channels
//! - **Document data** ([`document`]) - Serde-based conversions to and from BSON
//! - **Typed schemas** ([`schema`]) - Identifier-to-path mappings with typed data
//! - **Document store** ([`store`]) - Main interface handing out typed handles
//! - **Error handling** ([`error`]) - Error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use docpath::prelude::*;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct RateLimit {
//!     pub attempts: u32,
//! }
//!
//! pub struct RateLimits;
//!
//! impl CollectionSchema for RateLimits {
//!     type Identifier = String;
//!     type Data = RateLimit;
//!
//!     fn path(client: &String) -> CollectionPath {
//!         CollectionPath::root("rateLimit").doc(client).collection("requests")
//!     }
//! }
//! ```

pub mod backend;
pub mod document;
pub mod error;
pub mod event;
pub mod path;
pub mod query;
pub mod schema;
pub mod store;
