//! The in-memory document tree.
//!
//! The tree alternates between collection levels and document levels, mirroring the
//! path layout. Every level is a [`Branch`]: an insertion-ordered mapping from segment
//! to [`Node`]. A node is either a document holding data ([`Node::Leaf`]) or a bare
//! intermediate level ([`Node::Branch`]): a collection, or a document position that only
//! exists because something was written beneath it. Both kinds can own nested levels.

use bson::{Bson, Document};
use indexmap::IndexMap;
use std::mem;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    /// A document: its data plus the subcollections nested beneath it.
    Leaf { data: Bson, children: Branch },
    /// A level without data of its own.
    Branch(Branch),
}

impl Node {
    fn leaf(data: Bson) -> Self {
        Node::Leaf {
            data,
            children: Branch::default(),
        }
    }

    /// Document data, if this node is a document.
    pub(crate) fn data(&self) -> Option<&Bson> {
        match self {
            Node::Leaf { data, .. } => Some(data),
            Node::Branch(_) => None,
        }
    }

    pub(crate) fn children(&self) -> &Branch {
        match self {
            Node::Leaf { children, .. } | Node::Branch(children) => children,
        }
    }

    fn children_mut(&mut self) -> &mut Branch {
        match self {
            Node::Leaf { children, .. } | Node::Branch(children) => children,
        }
    }

    pub(crate) fn into_children(self) -> Branch {
        match self {
            Node::Leaf { children, .. } | Node::Branch(children) => children,
        }
    }

    /// Takes the document data out, leaving a bare level with the same children.
    fn take_data(&mut self) -> Option<Bson> {
        match mem::replace(self, Node::Branch(Branch::default())) {
            Node::Leaf { data, children } => {
                *self = Node::Branch(children);
                Some(data)
            }
            branch => {
                *self = branch;
                None
            }
        }
    }
}

/// Insertion-ordered mapping from segment to node.
///
/// Replacing the node of an existing key keeps its position; removing a key and
/// inserting it again moves it to the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Branch {
    entries: IndexMap<String, Node>,
}

impl Branch {
    pub(crate) fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    /// Returns the node at `key`, inserting an empty intermediate level if absent.
    fn entry(&mut self, key: &str) -> &mut Node {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| Node::Branch(Branch::default()))
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.shift_remove(key)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Documents directly beneath this level, in insertion order. Intermediate levels
    /// without data are skipped.
    pub(crate) fn documents(&self) -> impl Iterator<Item = (&str, &Bson)> {
        self.entries
            .iter()
            .filter_map(|(key, node)| node.data().map(|data| (key.as_str(), data)))
    }

    pub(crate) fn into_documents(self) -> impl Iterator<Item = (String, Bson)> {
        self.entries
            .into_iter()
            .filter_map(|(key, node)| match node {
                Node::Leaf { data, .. } => Some((key, data)),
                Node::Branch(_) => None,
            })
    }

    /// Walks `segments` and returns the level reached, if every segment exists.
    pub(crate) fn level(&self, segments: &[String]) -> Option<&Branch> {
        let mut branch = self;
        for segment in segments {
            branch = branch.get(segment)?.children();
        }

        Some(branch)
    }

    pub(crate) fn level_mut(&mut self, segments: &[String]) -> Option<&mut Branch> {
        let mut branch = self;
        for segment in segments {
            branch = branch.get_mut(segment)?.children_mut();
        }

        Some(branch)
    }

    /// Like [`Branch::level_mut`], creating missing levels on the way.
    pub(crate) fn ensure_level(&mut self, segments: &[String]) -> &mut Branch {
        let mut branch = self;
        for segment in segments {
            branch = branch.entry(segment).children_mut();
        }

        branch
    }

    /// Writes document data at `key`.
    ///
    /// Returns the data before the write (`None` if there was no document) and after
    /// it. Nested levels already beneath `key` are kept.
    pub(crate) fn write_document(&mut self, key: &str, data: Bson) -> (Option<Bson>, Bson) {
        match self.entries.get_mut(key) {
            Some(Node::Leaf { data: existing, .. }) => {
                let before = existing.clone();
                merge(existing, data);
                (Some(before), existing.clone())
            }
            Some(node) => {
                let children = mem::take(node.children_mut());
                *node = Node::Leaf {
                    data: data.clone(),
                    children,
                };
                (None, data)
            }
            None => {
                self.entries
                    .insert(key.to_string(), Node::leaf(data.clone()));
                (None, data)
            }
        }
    }

    /// Removes the document data at `key` and returns it.
    ///
    /// Nested levels beneath the document survive as an intermediate level in the same
    /// position; a document without any is removed entirely.
    pub(crate) fn take_document(&mut self, key: &str) -> Option<Bson> {
        let node = self.entries.get_mut(key)?;
        let data = node.take_data()?;

        if node.children().is_empty() {
            self.entries.shift_remove(key);
        }

        Some(data)
    }
}

/// Merges `source` into `target`.
///
/// Two BSON documents are merged key by key, recursing where both sides hold a
/// document. Anything else, arrays included, replaces the target value.
pub(crate) fn merge(target: &mut Bson, source: Bson) {
    match (target, source) {
        (Bson::Document(existing), Bson::Document(incoming)) => merge_documents(existing, incoming),
        (target, source) => *target = source,
    }
}

fn merge_documents(target: &mut Document, source: Document) {
    for (key, value) in source {
        match value {
            Bson::Document(incoming) => match target.get_mut(&key) {
                Some(Bson::Document(existing)) => merge_documents(existing, incoming),
                _ => {
                    target.insert(key, Bson::Document(incoming));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}
