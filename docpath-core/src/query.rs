//! Query constraints for collection reads.
//!
//! A [`Query`] is an ordered pipeline of [`Constraint`]s. Each constraint is applied to
//! the output of the previous one, so `limit(1)` followed by a `where` truncates before
//! filtering, and the reverse filters before truncating.
//!
//! # Query Building
//!
//! ```ignore
//! use docpath::query::{Query, WhereOp};
//!
//! let query = Query::builder()
//!     .where_field("stringField", WhereOp::Eq, "value1")
//!     .where_field("numberField", WhereOp::Lt, 20)
//!     .limit(1)
//!     .build();
//! ```
//!
//! # Constraint API
//!
//! [`Constraint`] also offers shorthand constructors:
//!
//! - Comparison: `eq`, `lt`, `lte`, `gt`, `gte`, `where_field`
//! - Array membership: `array_contains`
//! - Truncation: `limit`

use bson::Bson;
use std::{fmt, str::FromStr};

use crate::error::DocumentStoreError;

/// Comparison operator of a `where` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereOp {
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `==`
    Eq,
    /// `>=`
    Gte,
    /// `>`
    Gt,
}

impl WhereOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhereOp::Lt => "<",
            WhereOp::Lte => "<=",
            WhereOp::Eq => "==",
            WhereOp::Gte => ">=",
            WhereOp::Gt => ">",
        }
    }
}

impl fmt::Display for WhereOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhereOp {
    type Err = DocumentStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(WhereOp::Lt),
            "<=" => Ok(WhereOp::Lte),
            "==" => Ok(WhereOp::Eq),
            ">=" => Ok(WhereOp::Gte),
            ">" => Ok(WhereOp::Gt),
            other => Err(DocumentStoreError::InvalidQuery(format!(
                "unsupported where operator: {other}"
            ))),
        }
    }
}

/// A single step of a collection query.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Keeps documents whose `field` compares true against `value`.
    Where {
        /// Top-level field of the document data.
        field: String,
        /// The comparison operator.
        op: WhereOp,
        /// The value to compare against.
        value: Bson,
    },
    /// Keeps documents whose `field` is an array holding an element equal to `value`.
    ArrayContains {
        field: String,
        value: Bson,
    },
    /// Truncates the current result set to its first `n` entries.
    Limit(usize),
}

impl Constraint {
    pub fn where_field(field: impl Into<String>, op: WhereOp, value: impl Into<Bson>) -> Self {
        Constraint::Where {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::where_field(field, WhereOp::Eq, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::where_field(field, WhereOp::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::where_field(field, WhereOp::Lte, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::where_field(field, WhereOp::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::where_field(field, WhereOp::Gte, value)
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Constraint::ArrayContains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn limit(n: usize) -> Self {
        Constraint::Limit(n)
    }
}

/// An ordered list of constraints applied to a collection read.
///
/// An empty query returns every document of the collection in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Constraints, applied first to last.
    pub constraints: Vec<Constraint>,
}

impl Query {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Query {
            constraints: Vec::new(),
        }
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl From<Vec<Constraint>> for Query {
    fn from(constraints: Vec<Constraint>) -> Self {
        Query { constraints }
    }
}

impl FromIterator<Constraint> for Query {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Query {
            constraints: iter.into_iter().collect(),
        }
    }
}

/// Appends constraints in call order.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder {
            query: Query::default(),
        }
    }

    /// Appends an arbitrary constraint.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.query.constraints.push(constraint);
        self
    }

    /// Appends a `where` constraint.
    ///
    /// # Arguments
    ///
    /// * `field` - Top-level field of the document data
    /// * `op` - The comparison operator
    /// * `value` - The value to compare against
    pub fn where_field(self, field: impl Into<String>, op: WhereOp, value: impl Into<Bson>) -> Self {
        self.constraint(Constraint::where_field(field, op, value))
    }

    /// Appends an `array-contains` constraint.
    pub fn array_contains(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.constraint(Constraint::array_contains(field, value))
    }

    /// Appends a `limit` constraint.
    pub fn limit(self, n: usize) -> Self {
        self.constraint(Constraint::limit(n))
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

/// Walks the constraints of a query in order.
///
/// Backends implement this to apply (or translate) each kind of constraint;
/// [`QueryVisitor::visit_query`] drives the pipeline.
pub trait QueryVisitor {
    type Error: Into<DocumentStoreError>;

    fn visit_where(&mut self, field: &str, op: WhereOp, value: &Bson) -> Result<(), Self::Error>;
    fn visit_array_contains(&mut self, field: &str, value: &Bson) -> Result<(), Self::Error>;
    fn visit_limit(&mut self, n: usize) -> Result<(), Self::Error>;

    fn visit_constraint(&mut self, constraint: &Constraint) -> Result<(), Self::Error> {
        match constraint {
            Constraint::Where { field, op, value } => self.visit_where(field, *op, value),
            Constraint::ArrayContains { field, value } => self.visit_array_contains(field, value),
            Constraint::Limit(n) => self.visit_limit(*n),
        }
    }

    fn visit_query(&mut self, query: &Query) -> Result<(), Self::Error> {
        for constraint in &query.constraints {
            self.visit_constraint(constraint)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_call_order() {
        let query = Query::builder()
            .limit(5)
            .where_field("a", WhereOp::Gte, 3)
            .array_contains("tags", "x")
            .build();

        assert_eq!(
            query.constraints,
            vec![
                Constraint::Limit(5),
                Constraint::gte("a", 3),
                Constraint::array_contains("tags", "x"),
            ]
        );
    }

    #[test]
    fn where_op_round_trips_through_str() {
        for op in [WhereOp::Lt, WhereOp::Lte, WhereOp::Eq, WhereOp::Gte, WhereOp::Gt] {
            assert_eq!(op.as_str().parse::<WhereOp>().unwrap(), op);
        }
        assert_eq!(
            "!=".parse::<WhereOp>().unwrap_err(),
            DocumentStoreError::InvalidQuery("unsupported where operator: !=".to_string())
        );
    }

    struct Recorder(Vec<String>);

    impl QueryVisitor for Recorder {
        type Error = DocumentStoreError;

        fn visit_where(&mut self, field: &str, op: WhereOp, _value: &Bson) -> Result<(), Self::Error> {
            self.0.push(format!("where {field} {op}"));
            Ok(())
        }

        fn visit_array_contains(&mut self, field: &str, _value: &Bson) -> Result<(), Self::Error> {
            self.0.push(format!("array-contains {field}"));
            Ok(())
        }

        fn visit_limit(&mut self, n: usize) -> Result<(), Self::Error> {
            self.0.push(format!("limit {n}"));
            Ok(())
        }
    }

    #[test]
    fn visitor_walks_constraints_in_order() {
        let query: Query = vec![
            Constraint::eq("s", "v"),
            Constraint::limit(2),
            Constraint::array_contains("tags", "t"),
        ]
        .into();

        let mut recorder = Recorder(Vec::new());
        recorder.visit_query(&query).unwrap();

        assert_eq!(recorder.0, ["where s ==", "limit 2", "array-contains tags"]);
    }
}
