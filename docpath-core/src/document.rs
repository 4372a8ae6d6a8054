//! Document data and its conversions.
//!
//! Backends store document data as [`Bson`] values. Any serde type can be used as typed
//! document data; [`DocumentExt`] converts it to and from BSON and JSON.

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, from_value, to_value};

use crate::error::DocumentStoreResult;

/// Marker trait for types that can be stored as document data.
///
/// Implemented automatically for every `Serialize + DeserializeOwned` type that can be
/// shared across tasks.
pub trait DocumentData: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> DocumentData for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Serialization helpers for document data.
pub trait DocumentExt: Sized {
    /// Converts this value to BSON for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> DocumentStoreResult<Bson>;

    /// Creates a value from stored BSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored data does not match the type.
    fn from_bson(bson: Bson) -> DocumentStoreResult<Self>;

    fn to_json(&self) -> DocumentStoreResult<Value>;

    fn from_json(value: Value) -> DocumentStoreResult<Self>;
}

impl<D: DocumentData> DocumentExt for D {
    fn to_bson(&self) -> DocumentStoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }

    fn to_json(&self) -> DocumentStoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> DocumentStoreResult<Self> {
        Ok(from_value(value)?)
    }
}

/// One document of a collection read: its id within the collection and its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T = Bson> {
    pub id: String,
    pub data: T,
}

impl<T> Entry<T> {
    pub fn new(id: impl Into<String>, data: T) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

impl Entry<Bson> {
    /// Deserializes the data into a typed entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored data does not match `T`.
    pub fn into_typed<T: DocumentData>(self) -> DocumentStoreResult<Entry<T>> {
        Ok(Entry {
            id: self.id,
            data: T::from_bson(self.data)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Limit {
        attempts: i32,
        #[serde(rename = "isoTimestamp")]
        iso_timestamp: String,
    }

    #[test]
    fn typed_data_converts_through_bson() {
        let limit = Limit {
            attempts: 3,
            iso_timestamp: "2024-01-01T00:00:00Z".to_string(),
        };

        let bson = limit.to_bson().unwrap();
        assert_eq!(
            bson,
            Bson::Document(doc! { "attempts": 3, "isoTimestamp": "2024-01-01T00:00:00Z" })
        );
        assert_eq!(Limit::from_bson(bson).unwrap(), limit);
    }

    #[test]
    fn typed_data_converts_through_json() {
        let limit = Limit {
            attempts: 2,
            iso_timestamp: "2024-05-01T12:00:00Z".to_string(),
        };

        let json = limit.to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "attempts": 2, "isoTimestamp": "2024-05-01T12:00:00Z" })
        );
        assert_eq!(Limit::from_json(json).unwrap(), limit);

        let err = Limit::from_json(serde_json::json!({ "attempts": 2 })).unwrap_err();
        assert!(matches!(err, crate::error::DocumentStoreError::Serialization(_)));
    }

    #[test]
    fn mismatched_data_is_a_serialization_error() {
        let err = Limit::from_bson(Bson::Document(doc! { "attempts": "many" })).unwrap_err();
        assert!(matches!(err, crate::error::DocumentStoreError::Serialization(_)));

        let entry = Entry::new("x", Bson::String("nope".into()));
        assert!(entry.into_typed::<Limit>().is_err());
    }
}
