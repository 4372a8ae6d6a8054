//! Constraint evaluation for in-memory collection reads.
//!
//! This module applies a [`Query`] to the documents of a collection, one constraint
//! after the other, and provides the comparison rules used by `where` and
//! `array-contains`.

use bson::{Bson, datetime::DateTime};
use std::{cmp::Ordering, collections::HashMap};

use docpath_core::{
    document::Entry,
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Query, QueryVisitor, WhereOp},
};

/// Type-erased, comparable representation of BSON values.
///
/// Integers compare exactly as i64; an integer meets a double as f64, so
/// `Int32(10) == Double(10.0)`. Ordering is only defined within one type class; comparing
/// across classes yields no ordering and every operator evaluates to `false`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    /// Int32 and Int64
    Int(i64),
    Double(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Any other BSON type; only equality is defined
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(i64::from(*value)),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Double(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Int(a), Comparable::Int(b)) => a == b,
            (Comparable::Double(a), Comparable::Double(b)) => a == b,
            (Comparable::Int(a), Comparable::Double(b)) => *a as f64 == *b,
            (Comparable::Double(a), Comparable::Int(b)) => *a == *b as f64,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Int(b)) => Some(a.cmp(b)),
            (Comparable::Double(a), Comparable::Double(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Double(b)) => (*a as f64).partial_cmp(b),
            (Comparable::Double(a), Comparable::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ if self == other => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// Looks up a top-level field. Data that is not a document has no fields.
fn field_value<'a>(data: &'a Bson, field: &str) -> Option<&'a Bson> {
    data.as_document()?.get(field)
}

/// Evaluates `field op value` against document data. A missing field never matches.
pub(crate) fn matches_where(data: &Bson, field: &str, op: WhereOp, value: &Bson) -> bool {
    let Some(field_value) = field_value(data, field) else {
        return false;
    };

    let left = Comparable::from(field_value);
    let right = Comparable::from(value);

    match op {
        WhereOp::Eq => left == right,
        WhereOp::Lt => left.partial_cmp(&right).is_some_and(Ordering::is_lt),
        WhereOp::Lte => left.partial_cmp(&right).is_some_and(Ordering::is_le),
        WhereOp::Gte => left.partial_cmp(&right).is_some_and(Ordering::is_ge),
        WhereOp::Gt => left.partial_cmp(&right).is_some_and(Ordering::is_gt),
    }
}

/// Checks that `field` is an array holding an element equal to `value`.
pub(crate) fn matches_array_contains(data: &Bson, field: &str, value: &Bson) -> bool {
    match field_value(data, field) {
        Some(Bson::Array(items)) => {
            let needle = Comparable::from(value);
            items
                .iter()
                .any(|item| Comparable::from(item) == needle)
        }
        _ => false,
    }
}

/// Runs a query as a pipeline over a collection's entries.
pub(crate) struct CollectionEvaluator {
    entries: Vec<Entry>,
}

impl CollectionEvaluator {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn evaluate(mut self, query: &Query) -> DocumentStoreResult<Vec<Entry>> {
        self.visit_query(query)?;

        Ok(self.entries)
    }
}

impl QueryVisitor for CollectionEvaluator {
    type Error = DocumentStoreError;

    fn visit_where(&mut self, field: &str, op: WhereOp, value: &Bson) -> Result<(), Self::Error> {
        self.entries
            .retain(|entry| matches_where(&entry.data, field, op, value));

        Ok(())
    }

    fn visit_array_contains(&mut self, field: &str, value: &Bson) -> Result<(), Self::Error> {
        self.entries
            .retain(|entry| matches_array_contains(&entry.data, field, value));

        Ok(())
    }

    fn visit_limit(&mut self, n: usize) -> Result<(), Self::Error> {
        self.entries.truncate(n);

        Ok(())
    }
}
