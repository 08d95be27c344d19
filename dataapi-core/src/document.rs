//! Document traits, identities, and documents returned by `find_one`.
//!
//! Documents travel as JSON objects. Typed documents implement [`Document`] and
//! get conversion helpers through [`DocumentExt`]. A document fetched with
//! [`Collection::find_one`](crate::collection::Collection::find_one) comes back as
//! a [`FoundDocument`], which can write itself back with [`FoundDocument::save`].

use bson::oid::ObjectId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, from_value, json, to_value};
use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use crate::{
    collection::Collection,
    error::{DataApiError, DataApiResult},
    transport::Transport,
};

/// Name of the identity field.
pub const ID_FIELD: &str = "_id";
/// Name of the creation timestamp stamped on insert.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Name of the modification timestamp stamped on insert and bumped by `save`.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Core trait for typed documents stored in a data API collection.
///
/// # Example
///
/// ```ignore
/// use dataapi::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Order {
///     pub status: String,
///     pub total: f64,
/// }
///
/// impl Document for Order {
///     fn collection_name() -> &'static str {
///         "orders"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Extension trait providing JSON conversions for documents.
///
/// Automatically implemented for every [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document into a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or does not produce an object.
    fn to_json(&self) -> DataApiResult<Map<String, Value>>;

    /// Creates a document from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    fn from_json(value: Value) -> DataApiResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_json(&self) -> DataApiResult<Map<String, Value>> {
        into_object(to_value(self)?)
    }

    fn from_json(value: Value) -> DataApiResult<Self> {
        Ok(from_value(value)?)
    }
}

/// Serializes `value` and requires the result to be a JSON object.
pub fn to_object<S: Serialize + ?Sized>(value: &S) -> DataApiResult<Map<String, Value>> {
    into_object(to_value(value)?)
}

fn into_object(value: Value) -> DataApiResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DataApiError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Renders `now` as a date value: `{"$date": "<ISO-8601 UTC, milliseconds>"}`.
pub fn date_value(now: DateTime<Utc>) -> Value {
    json!({ "$date": now.to_rfc3339_opts(SecondsFormat::Millis, true) })
}

/// Sets both timestamps to `now`, overwriting whatever the caller supplied.
pub fn stamp_timestamps(document: &mut Map<String, Value>, now: DateTime<Utc>) {
    let stamp = date_value(now);
    document.insert(CREATED_AT_FIELD.into(), stamp.clone());
    document.insert(UPDATED_AT_FIELD.into(), stamp);
}

/// A document identity in wire form (`{"$oid": value}`).
#[derive(Debug, Clone, PartialEq)]
pub struct Identity(Value);

impl Identity {
    /// Normalizes an `_id` value as found on a document.
    ///
    /// Strings are wrapped as `{"$oid": ...}`; values already in that form, and
    /// any other kind of value, are kept unchanged.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(id) => Identity::from(id),
            other => Identity(other),
        }
    }

    pub fn as_wire(&self) -> &Value {
        &self.0
    }

    pub fn into_wire(self) -> Value {
        self.0
    }

    /// The `{_id: <wire identity>}` filter selecting this identity.
    pub fn filter(&self) -> Value {
        json!({ ID_FIELD: self.0 })
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Identity(json!({ "$oid": id }))
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Identity(json!({ "$oid": id }))
    }
}

impl From<ObjectId> for Identity {
    fn from(id: ObjectId) -> Self {
        Identity(json!({ "$oid": id.to_hex() }))
    }
}

impl From<&ObjectId> for Identity {
    fn from(id: &ObjectId) -> Self {
        Identity::from(*id)
    }
}

/// A document returned by `find_one`, bound to the collection it came from.
///
/// Derefs to the underlying JSON map, so fields can be read and modified in place
/// before calling [`save`](Self::save).
pub struct FoundDocument<'a, T: Transport> {
    fields: Map<String, Value>,
    collection: Collection<'a, T>,
}

impl<'a, T: Transport> FoundDocument<'a, T> {
    pub(crate) fn new(fields: Map<String, Value>, collection: Collection<'a, T>) -> Self {
        Self { fields, collection }
    }

    /// Returns the document's `_id`, if it has one. `null` and `""` count as none.
    pub fn id(&self) -> Option<&Value> {
        self.fields.get(ID_FIELD).filter(|id| is_present(id))
    }

    /// Decodes the document into a typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn decode<D: for<'de> Deserialize<'de>>(&self) -> DataApiResult<D> {
        Ok(from_value(Value::Object(self.fields.clone()))?)
    }

    /// Detaches the fields from the collection.
    pub fn into_inner(self) -> Map<String, Value> {
        self.fields
    }

    /// Writes the document back.
    ///
    /// With an `_id`, this is an `updateOne` against `{_id: <wire identity>}` whose update
    /// is `{$currentDate: {updatedAt: true}, $set: <fields>}`. The local `createdAt` and
    /// `updatedAt` are left out of `$set`, so the server keeps ownership of them.
    /// Without an `_id` (or with a `null` or empty one), the document is inserted as-is.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn save(&self) -> DataApiResult<Value> {
        let mut fields = self.fields.clone();

        match fields.remove(ID_FIELD).filter(is_present) {
            Some(id) => {
                let identity = Identity::from_value(id);
                fields.remove(CREATED_AT_FIELD);
                fields.remove(UPDATED_AT_FIELD);
                fields.insert(ID_FIELD.into(), identity.as_wire().clone());

                self.collection
                    .update_one(
                        identity.filter(),
                        json!({
                            "$currentDate": { UPDATED_AT_FIELD: true },
                            "$set": fields,
                        }),
                    )
                    .await
            }
            None => self.collection.insert_one(&fields).await,
        }
    }
}

fn is_present(id: &Value) -> bool {
    !matches!(id, Value::Null) && id.as_str() != Some("")
}

impl<T: Transport> Deref for FoundDocument<'_, T> {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}

impl<T: Transport> DerefMut for FoundDocument<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.fields
    }
}

impl<T: Transport> fmt::Debug for FoundDocument<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoundDocument")
            .field("collection", &self.collection.name())
            .field("fields", &self.fields)
            .finish()
    }
}

impl<T: Transport> PartialEq<Value> for FoundDocument<'_, T> {
    fn eq(&self, other: &Value) -> bool {
        other.as_object() == Some(&self.fields)
    }
}
