//! The pending operation record and its translation to and from the wire.
//!
//! A [`PendingOperation`] accumulates everything a chain stages (filter, sort,
//! limit, projection, update, document) for exactly one [`Action`]. Turning it
//! into a request body consumes it, so nothing staged for one execution can leak
//! into the next.
//!
//! | action                    | request body                                  |
//! |---------------------------|-----------------------------------------------|
//! | `find`                    | `{filter, sort, limit, projection}`           |
//! | `findOne`                 | `{filter, projection}`                        |
//! | `insertOne`               | `{document}` stamped with `createdAt`/`updatedAt` |
//! | `updateOne`/`updateMany`  | `{filter, update}`                            |
//! | `deleteOne`/`deleteMany`  | `{filter}`                                    |

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::{
    action::Action,
    document::stamp_timestamps,
    error::{DataApiError, DataApiResult},
};

/// Sort direction for `sort_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order, sent as `1`.
    Asc,
    /// Descending order, sent as `-1`.
    Desc,
}

impl SortDirection {
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// A field projection, always in the `{field: 1}` inclusion form when built from names.
///
/// `Projection::from("a b c")`, `Projection::from(json!(["a", "b", "c"]))` and
/// `Projection::from(json!({"a": 1, "b": 1, "c": 1}))` produce the same projection.
/// `null` and other scalars mean no projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection(Map<String, Value>);

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an included field.
    pub fn include(mut self, field: impl Into<String>) -> Self {
        self.0.insert(field.into(), Value::from(1));
        self
    }

    /// Adds an excluded field.
    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.0.insert(field.into(), Value::from(0));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<&str> for Projection {
    fn from(fields: &str) -> Self {
        fields
            .split_whitespace()
            .fold(Projection::new(), |projection, field| projection.include(field))
    }
}

impl From<String> for Projection {
    fn from(fields: String) -> Self {
        Projection::from(fields.as_str())
    }
}

impl From<Map<String, Value>> for Projection {
    fn from(map: Map<String, Value>) -> Self {
        Projection(map)
    }
}

impl From<Value> for Projection {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Projection(map),
            Value::String(fields) => Projection::from(fields.as_str()),
            Value::Array(fields) => fields
                .iter()
                .filter_map(Value::as_str)
                .flat_map(str::split_whitespace)
                .collect(),
            _ => Projection::default(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Projection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(Projection::new(), |projection, field| projection.include(field))
    }
}

/// Everything staged for the next execution of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    pub action: Action,
    pub filter: Value,
    pub sort: Value,
    pub limit: Option<u64>,
    pub projection: Projection,
    pub update: Value,
    pub document: Option<Map<String, Value>>,
}

impl Default for PendingOperation {
    fn default() -> Self {
        Self {
            action: Action::Find,
            filter: Value::Object(Map::new()),
            sort: Value::Object(Map::new()),
            limit: None,
            projection: Projection::default(),
            update: Value::Object(Map::new()),
            document: None,
        }
    }
}

impl PendingOperation {
    /// A default record staged for `action`.
    pub fn new(action: Action) -> Self {
        Self { action, ..Self::default() }
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_update(mut self, update: Value) -> Self {
        self.update = update;
        self
    }

    pub fn with_document(mut self, document: Map<String, Value>) -> Self {
        self.document = Some(document);
        self
    }

    /// Whether the staged filter names no fields.
    ///
    /// Only a non-empty object selects anything; `null`, `{}`, arrays and scalars do not.
    pub fn has_empty_filter(&self) -> bool {
        self.filter.as_object().is_none_or(|fields| fields.is_empty())
    }

    /// Consumes the record and assembles the action-specific request body.
    ///
    /// `now` is the instant stamped onto inserted documents.
    ///
    /// # Errors
    ///
    /// Returns [`DataApiError::InvalidOperation`] for an update or delete whose filter is
    /// empty, and [`DataApiError::InvalidDocument`] for an insert with no staged document.
    pub fn into_body(self, now: DateTime<Utc>) -> DataApiResult<Map<String, Value>> {
        if self.action.requires_filter() && self.has_empty_filter() {
            let kind = if self.action.is_update() { "update" } else { "delete" };
            return Err(DataApiError::InvalidOperation(format!(
                "{} requires a non-empty filter; refusing an unfiltered {kind}",
                self.action
            )));
        }

        let mut body = Map::new();

        match self.action {
            Action::Find => {
                body.insert("filter".into(), self.filter);
                body.insert("sort".into(), self.sort);
                if let Some(limit) = self.limit {
                    body.insert("limit".into(), Value::from(limit));
                }
                body.insert("projection".into(), self.projection.into_value());
            }
            Action::FindOne => {
                body.insert("filter".into(), self.filter);
                body.insert("projection".into(), self.projection.into_value());
            }
            Action::InsertOne => {
                let mut document = self.document.ok_or_else(|| {
                    DataApiError::InvalidDocument("insertOne requires a document".into())
                })?;
                stamp_timestamps(&mut document, now);
                body.insert("document".into(), Value::Object(document));
            }
            Action::UpdateOne | Action::UpdateMany => {
                body.insert("filter".into(), self.filter);
                body.insert("update".into(), self.update);
            }
            Action::DeleteOne | Action::DeleteMany => {
                body.insert("filter".into(), self.filter);
            }
        }

        Ok(body)
    }
}

/// A response with the data API envelope stripped.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutput {
    /// Result of `find`: the `documents` list, empty when absent.
    Documents(Vec<Value>),
    /// Result of `findOne`: the `document` object, `None` when absent or `null`.
    Document(Option<Map<String, Value>>),
    /// Any mutation: the response as received.
    Raw(Value),
}

impl ActionOutput {
    /// Normalizes a raw response for `action`.
    ///
    /// Missing or mistyped envelope fields degrade to the empty result instead of failing.
    pub fn from_response(action: Action, response: Value) -> Self {
        match action {
            Action::Find => match response {
                Value::Object(mut map) => match map.remove("documents") {
                    Some(Value::Array(documents)) => ActionOutput::Documents(documents),
                    _ => ActionOutput::Documents(Vec::new()),
                },
                _ => ActionOutput::Documents(Vec::new()),
            },
            Action::FindOne => match response {
                Value::Object(mut map) => match map.remove("document") {
                    Some(Value::Object(document)) => ActionOutput::Document(Some(document)),
                    _ => ActionOutput::Document(None),
                },
                _ => ActionOutput::Document(None),
            },
            Action::InsertOne
            | Action::UpdateOne
            | Action::UpdateMany
            | Action::DeleteOne
            | Action::DeleteMany => ActionOutput::Raw(response),
        }
    }

    pub fn into_documents(self) -> Vec<Value> {
        match self {
            ActionOutput::Documents(documents) => documents,
            ActionOutput::Document(document) => document.map(Value::Object).into_iter().collect(),
            ActionOutput::Raw(_) => Vec::new(),
        }
    }

    pub fn into_document(self) -> Option<Map<String, Value>> {
        match self {
            ActionOutput::Document(document) => document,
            ActionOutput::Documents(documents) => documents
                .into_iter()
                .find_map(|doc| match doc {
                    Value::Object(map) => Some(map),
                    _ => None,
                }),
            ActionOutput::Raw(_) => None,
        }
    }

    pub fn into_raw(self) -> Value {
        match self {
            ActionOutput::Raw(value) => value,
            ActionOutput::Documents(documents) => Value::Array(documents),
            ActionOutput::Document(document) => document.map(Value::Object).unwrap_or(Value::Null),
        }
    }
}
