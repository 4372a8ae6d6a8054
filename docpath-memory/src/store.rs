//! In-memory storage implementation for document stores.
//!
//! This module provides a backend that keeps the whole document tree in memory behind
//! an async-safe read-write lock and broadcasts change events synchronously.

use std::{sync::Arc, time::Duration};
use async_trait::async_trait;
use bson::Bson;
use mea::rwlock::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

use docpath_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::Entry,
    error::{DocumentStoreError, DocumentStoreResult},
    event::{DeleteEvent, EventChannel, WriteEvent},
    path::{CollectionPath, DocumentPath},
    query::Query,
};

use crate::{
    evaluator::CollectionEvaluator,
    tree::{Branch, Node},
};

/// Segments leading to the level that holds the last segment.
fn parent_segments(segments: &[String]) -> &[String] {
    &segments[..segments.len().saturating_sub(1)]
}

/// In-memory document storage backend.
///
/// This struct implements the [`StoreBackend`] trait as a test double for real document
/// databases: same paths, same write semantics, same events, no persistence.
///
/// # Consistency
///
/// Each operation takes the tree lock once, mutates, emits its events and releases the
/// lock, so no caller observes a half-applied write and events are delivered in the
/// order the mutations happened. Subscribers run while the lock is held and must not
/// block on the store.
///
/// `InMemoryStore` is cloneable; clones share the same tree and the same event
/// channels.
///
/// # Communication Delay
///
/// A store built with [`InMemoryStoreBuilder::communication_delay`] waits that long at
/// the start of every operation, before touching the tree, to emulate network latency.
///
/// # Example
///
/// ```ignore
/// use docpath_memory::InMemoryStore;
/// use docpath::{backend::StoreBackend, path::CollectionPath};
/// use bson::bson;
///
/// let store = InMemoryStore::new();
/// let pages = CollectionPath::root("portalPages");
///
/// store.write_document(&pages.doc("p1"), bson!({ "title": "Home" })).await?;
/// let page = store.read_document(&pages.doc("p1")).await?;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// Root level: top-level collections by name
    tree: Arc<RwLock<Branch>>,
    on_write: Arc<EventChannel<WriteEvent>>,
    on_delete: Arc<EventChannel<DeleteEvent>>,
    /// Simulated latency applied before every operation
    communication_delay: Duration,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store without simulated latency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing an `InMemoryStore` with custom options.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use docpath_memory::InMemoryStore;
    /// use std::time::Duration;
    ///
    /// let store = InMemoryStore::builder()
    ///     .communication_delay(Duration::from_millis(20))
    ///     .build()
    ///     .await?;
    /// ```
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    pub fn communication_delay(&self) -> Duration {
        self.communication_delay
    }

    async fn simulate_communication_delay(&self) {
        if !self.communication_delay.is_zero() {
            tokio::time::sleep(self.communication_delay).await;
        }
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn write_document(&self, path: &DocumentPath, data: Bson) -> DocumentStoreResult<()> {
        self.simulate_communication_delay().await;

        let mut tree = self.tree.write().await;
        let (before, after) = tree
            .ensure_level(parent_segments(path.segments()))
            .write_document(path.id(), data);

        debug!(path = %path, created = before.is_none(), "document written");

        self.on_write.emit(&WriteEvent {
            path: path.clone(),
            before,
            after,
        });

        Ok(())
    }

    async fn read_document(&self, path: &DocumentPath) -> DocumentStoreResult<Bson> {
        self.simulate_communication_delay().await;

        let tree = self.tree.read().await;
        let data = tree
            .level(parent_segments(path.segments()))
            .and_then(|level| level.get(path.id()))
            .and_then(Node::data)
            .cloned();

        trace!(path = %path, found = data.is_some(), "document read");

        data.ok_or_else(|| DocumentStoreError::NotFound(path.to_string()))
    }

    async fn delete_document(&self, path: &DocumentPath) -> DocumentStoreResult<()> {
        self.simulate_communication_delay().await;

        let mut tree = self.tree.write().await;
        let before = tree
            .level_mut(parent_segments(path.segments()))
            .and_then(|level| level.take_document(path.id()));

        if let Some(before) = before {
            debug!(path = %path, "document deleted");

            self.on_delete.emit(&DeleteEvent {
                path: path.clone(),
                before,
            });
        }

        Ok(())
    }

    async fn read_collection(
        &self,
        path: &CollectionPath,
        query: Query,
    ) -> DocumentStoreResult<Vec<Entry>> {
        self.simulate_communication_delay().await;

        let entries = {
            let tree = self.tree.read().await;
            match tree
                .level(parent_segments(path.segments()))
                .and_then(|level| level.get(path.id()))
            {
                Some(Node::Branch(collection)) => collection
                    .documents()
                    .map(|(id, data)| Entry::new(id, data.clone()))
                    .collect::<Vec<_>>(),
                _ => return Err(DocumentStoreError::NotFound(path.to_string())),
            }
        };

        trace!(
            path = %path,
            documents = entries.len(),
            constraints = query.constraints.len(),
            "collection read"
        );

        CollectionEvaluator::new(entries).evaluate(&query)
    }

    async fn add_to_collection(
        &self,
        path: &CollectionPath,
        data: Bson,
    ) -> DocumentStoreResult<String> {
        self.simulate_communication_delay().await;

        let mut tree = self.tree.write().await;
        let collection = tree.ensure_level(path.segments());

        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if collection.get(&candidate).is_none() {
                break candidate;
            }
        };

        let (before, after) = collection.write_document(&id, data);

        debug!(path = %path, id = %id, "document added");

        self.on_write.emit(&WriteEvent {
            path: path.doc(id.as_str()),
            before,
            after,
        });

        Ok(id)
    }

    async fn delete_collection(&self, path: &CollectionPath) -> DocumentStoreResult<()> {
        self.simulate_communication_delay().await;

        let mut tree = self.tree.write().await;
        let removed = tree
            .level_mut(parent_segments(path.segments()))
            .and_then(|level| level.remove(path.id()));

        if let Some(removed) = removed {
            // Only documents directly in the collection are reported; documents in
            // nested subcollections disappear silently.
            let mut deleted = 0usize;
            for (id, before) in removed.into_children().into_documents() {
                self.on_delete.emit(&DeleteEvent {
                    path: path.doc(id),
                    before,
                });
                deleted += 1;
            }

            debug!(path = %path, deleted, "collection deleted");
        }

        Ok(())
    }

    fn on_write(&self) -> &EventChannel<WriteEvent> {
        &self.on_write
    }

    fn on_delete(&self) -> &EventChannel<DeleteEvent> {
        &self.on_delete
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// use docpath_memory::InMemoryStore;
/// use docpath::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder().build().await.unwrap();
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryStoreBuilder {
    communication_delay: Duration,
}

impl InMemoryStoreBuilder {
    /// Waits `delay` at the start of every operation to emulate network latency.
    pub fn communication_delay(mut self, delay: Duration) -> Self {
        self.communication_delay = delay;
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore {
            communication_delay: self.communication_delay,
            ..InMemoryStore::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::bson;
    use docpath_core::query::{Constraint, WhereOp};
    use std::sync::Mutex;

    fn test_collection() -> CollectionPath {
        CollectionPath::root("test-root")
            .doc("test-document")
            .collection("test-collection")
    }

    fn test_document() -> DocumentPath {
        CollectionPath::root("test-root").doc("test-document")
    }

    fn record_writes(store: &InMemoryStore) -> Arc<Mutex<Vec<WriteEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        store
            .on_write()
            .subscribe(move |event: &WriteEvent| sink.lock().unwrap().push(event.clone()));
        log
    }

    fn record_deletes(store: &InMemoryStore) -> Arc<Mutex<Vec<DeleteEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        store
            .on_delete()
            .subscribe(move |event: &DeleteEvent| sink.lock().unwrap().push(event.clone()));
        log
    }

    async fn seed_three(store: &InMemoryStore) {
        let collection = test_collection();
        store
            .write_document(&collection.doc("doc1"), bson!({ "stringField": "value1", "numberField": 10 }))
            .await
            .unwrap();
        store
            .write_document(&collection.doc("doc2"), bson!({ "stringField": "value2", "numberField": 20 }))
            .await
            .unwrap();
        store
            .write_document(&collection.doc("doc3"), bson!({ "stringField": "value1", "numberField": 30 }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn write_then_read_returns_the_data() {
        let store = InMemoryStore::new();
        let data = bson!({ "stringField": "data", "nested": { "list": [1, 2] } });

        store.write_document(&test_document(), data.clone()).await.unwrap();

        assert_eq!(store.read_document(&test_document()).await.unwrap(), data);
    }

    #[tokio::test]
    async fn writes_merge_into_existing_documents() {
        let store = InMemoryStore::new();
        let path = test_document();

        store
            .write_document(&path, bson!({ "topField": "keep this", "nestedField": { "subField": "original" } }))
            .await
            .unwrap();
        store
            .write_document(&path, bson!({ "nestedField": { "subField": "updated", "extra": 1 } }))
            .await
            .unwrap();

        assert_eq!(
            store.read_document(&path).await.unwrap(),
            bson!({ "topField": "keep this", "nestedField": { "subField": "updated", "extra": 1 } })
        );
    }

    #[tokio::test]
    async fn non_document_data_is_replaced() {
        let store = InMemoryStore::new();
        let path = test_document();

        store.write_document(&path, bson!("scalar")).await.unwrap();
        store.write_document(&path, bson!({ "a": 1 })).await.unwrap();
        assert_eq!(store.read_document(&path).await.unwrap(), bson!({ "a": 1 }));

        store.write_document(&path, bson!([1, 2])).await.unwrap();
        assert_eq!(store.read_document(&path).await.unwrap(), bson!([1, 2]));
    }

    #[tokio::test]
    async fn reads_return_independent_copies() {
        let store = InMemoryStore::new();
        let path = test_document();
        store.write_document(&path, bson!({ "a": { "b": 1 } })).await.unwrap();

        let mut copy = store.read_document(&path).await.unwrap();
        if let Bson::Document(doc) = &mut copy {
            doc.insert("a", "mutated");
        }

        assert_eq!(store.read_document(&path).await.unwrap(), bson!({ "a": { "b": 1 } }));
    }

    #[tokio::test]
    async fn missing_documents_are_not_found() {
        let store = InMemoryStore::new();

        let err = store.read_document(&test_document()).await.unwrap_err();
        assert_eq!(err, DocumentStoreError::NotFound("test-root/test-document".to_string()));

        // A level that only exists because of a nested write is not a document.
        store
            .write_document(&test_collection().doc("doc1"), bson!({ "v": 1 }))
            .await
            .unwrap();
        assert!(store.read_document(&test_document()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_document_is_idempotent() {
        let store = InMemoryStore::new();
        let deletes = record_deletes(&store);
        let path = test_document();

        store.delete_document(&path).await.unwrap();
        assert!(deletes.lock().unwrap().is_empty());

        store.write_document(&path, bson!({ "stringField": "data to delete" })).await.unwrap();
        store.delete_document(&path).await.unwrap();
        store.delete_document(&path).await.unwrap();

        assert!(store.read_document(&path).await.unwrap_err().is_not_found());
        assert_eq!(
            *deletes.lock().unwrap(),
            vec![DeleteEvent {
                path: path.clone(),
                before: bson!({ "stringField": "data to delete" }),
            }]
        );
    }

    #[tokio::test]
    async fn deleting_a_document_keeps_its_subcollections() {
        let store = InMemoryStore::new();
        let child = test_collection().doc("doc1");

        store.write_document(&test_document(), bson!({ "own": 1 })).await.unwrap();
        store.write_document(&child, bson!({ "v": 1 })).await.unwrap();
        store.delete_document(&test_document()).await.unwrap();

        assert!(store.read_document(&test_document()).await.unwrap_err().is_not_found());
        assert_eq!(store.read_document(&child).await.unwrap(), bson!({ "v": 1 }));
    }

    #[tokio::test]
    async fn write_events_carry_before_and_after() {
        let store = InMemoryStore::new();
        let writes = record_writes(&store);
        let path = test_document();

        store.write_document(&path, bson!({ "stringField": "initial data" })).await.unwrap();
        store.write_document(&path, bson!({ "other": 1 })).await.unwrap();

        assert_eq!(
            *writes.lock().unwrap(),
            vec![
                WriteEvent {
                    path: path.clone(),
                    before: None,
                    after: bson!({ "stringField": "initial data" }),
                },
                WriteEvent {
                    path: path.clone(),
                    before: Some(bson!({ "stringField": "initial data" })),
                    after: bson!({ "stringField": "initial data", "other": 1 }),
                },
            ]
        );
    }

    #[tokio::test]
    async fn read_collection_applies_constraints() {
        let store = InMemoryStore::new();
        seed_three(&store).await;

        let all = store.read_collection(&test_collection(), Query::new()).await.unwrap();
        assert_eq!(
            all.iter().map(|entry| entry.id.as_str()).collect::<Vec<_>>(),
            ["doc1", "doc2", "doc3"]
        );

        let filtered = store
            .read_collection(
                &test_collection(),
                Query::builder()
                    .where_field("stringField", WhereOp::Eq, "value1")
                    .where_field("numberField", WhereOp::Lt, 20)
                    .limit(1)
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(
            filtered,
            vec![Entry::new("doc1", bson!({ "stringField": "value1", "numberField": 10 }))]
        );
    }

    #[tokio::test]
    async fn read_collection_array_contains() {
        let store = InMemoryStore::new();
        let collection = test_collection();
        store.write_document(&collection.doc("doc1"), bson!({ "arrayField": ["value1", "value2"] })).await.unwrap();
        store.write_document(&collection.doc("doc2"), bson!({ "arrayField": ["value3"] })).await.unwrap();
        store.write_document(&collection.doc("doc3"), bson!({ "arrayField": ["value1", "value4"] })).await.unwrap();

        let result = store
            .read_collection(&collection, vec![Constraint::array_contains("arrayField", "value1")].into())
            .await
            .unwrap();

        assert_eq!(
            result,
            vec![
                Entry::new("doc1", bson!({ "arrayField": ["value1", "value2"] })),
                Entry::new("doc3", bson!({ "arrayField": ["value1", "value4"] })),
            ]
        );
    }

    #[tokio::test]
    async fn read_collection_not_found_and_empty() {
        let store = InMemoryStore::new();

        let err = store.read_collection(&test_collection(), Query::new()).await.unwrap_err();
        assert!(err.is_not_found());

        store.write_document(&test_collection().doc("only"), bson!({})).await.unwrap();
        store.delete_document(&test_collection().doc("only")).await.unwrap();

        assert!(store.read_collection(&test_collection(), Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_collection_skips_placeholder_levels() {
        let store = InMemoryStore::new();
        let collection = test_collection();
        store.write_document(&collection.doc("real"), bson!({ "v": 1 })).await.unwrap();
        store
            .write_document(&collection.doc("ghost").collection("sub").doc("x"), bson!({ "v": 2 }))
            .await
            .unwrap();

        let result = store.read_collection(&collection, Query::new()).await.unwrap();
        assert_eq!(result, vec![Entry::new("real", bson!({ "v": 1 }))]);
    }

    #[tokio::test]
    async fn add_to_collection_generates_unique_ids() {
        let store = InMemoryStore::new();
        let writes = record_writes(&store);
        let collection = test_collection();

        let first = store.add_to_collection(&collection, bson!({ "value": 1 })).await.unwrap();
        let second = store.add_to_collection(&collection, bson!({ "value": 2 })).await.unwrap();

        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
        assert_eq!(
            store.read_document(&collection.doc(first.as_str())).await.unwrap(),
            bson!({ "value": 1 })
        );

        let writes = writes.lock().unwrap().clone();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].path, collection.doc(first.as_str()));
        assert_eq!(writes[0].before, None);
        assert_eq!(writes[0].after, bson!({ "value": 1 }));
    }

    #[tokio::test]
    async fn delete_collection_emits_one_event_per_direct_document() {
        let store = InMemoryStore::new();
        seed_three(&store).await;
        let collection = test_collection();
        store
            .write_document(&collection.doc("doc1").collection("nested").doc("deep"), bson!({ "v": 1 }))
            .await
            .unwrap();
        let deletes = record_deletes(&store);

        store.delete_collection(&collection).await.unwrap();

        let deletes = deletes.lock().unwrap().clone();
        assert_eq!(
            deletes.iter().map(|event| event.path.id()).collect::<Vec<_>>(),
            ["doc1", "doc2", "doc3"]
        );
        assert_eq!(deletes[1].path, collection.doc("doc2"));
        assert_eq!(deletes[1].before, bson!({ "stringField": "value2", "numberField": 20 }));

        assert!(store.read_collection(&collection, Query::new()).await.unwrap_err().is_not_found());
        assert!(store.read_document(&collection.doc("doc1")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_missing_collection_is_silent() {
        let store = InMemoryStore::new();
        let deletes = record_deletes(&store);

        store.delete_collection(&test_collection()).await.unwrap();

        assert!(deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_state_and_channels() {
        let store = InMemoryStore::new();
        let clone = store.clone();
        let writes = record_writes(&store);

        clone.write_document(&test_document(), bson!({ "a": 1 })).await.unwrap();

        assert_eq!(store.read_document(&test_document()).await.unwrap(), bson!({ "a": 1 }));
        assert_eq!(writes.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn communication_delay_precedes_operations() {
        let delay = Duration::from_millis(250);
        let store = InMemoryStore::builder()
            .communication_delay(delay)
            .build()
            .await
            .unwrap();
        assert_eq!(store.communication_delay(), delay);

        let start = tokio::time::Instant::now();
        store.write_document(&test_document(), bson!({ "a": 1 })).await.unwrap();
        store.read_document(&test_document()).await.unwrap();

        assert!(start.elapsed() >= delay * 2);
    }
}
