//! Chainable collection handles.
//!
//! A [`Collection`] is the document-driver-like surface over the data API. Reads are
//! staged on builders and executed with `.exec()` or by awaiting the builder;
//! mutations execute as soon as they are awaited.
//!
//! Each chain owns its own [`PendingOperation`]. Execution consumes it, so a handle
//! never carries filter/sort/limit/projection state from one chain into the next,
//! whether the previous execution succeeded or failed, and two chains running at the
//! same time on one handle cannot see each other's state.
//!
//! # Collection Types
//!
//! - [`Collection`] - Untyped collection working with JSON objects
//! - [`TypedCollection`] - Collection that encodes and decodes a [`Document`] type
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//!
//! let orders = client.collection("orders");
//!
//! let open = orders
//!     .find(json!({ "status": "open" }))
//!     .sort(json!({ "createdAt": -1 }))
//!     .limit(10)
//!     .select("status total")
//!     .exec()
//!     .await?;
//!
//! if let Some(mut order) = orders.find_by_id("65f1c0ffee00000000000001").await? {
//!     order.insert("status".into(), json!("shipped"));
//!     order.save().await?;
//! }
//!
//! orders.delete_many(json!({ "status": "cancelled" })).await?;
//! ```

use chrono::Utc;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{borrow::Cow, fmt, future::IntoFuture, marker::PhantomData};
use tracing::{debug, trace, warn};

use crate::{
    action::Action,
    config::DataApiConfig,
    document::{Document, DocumentExt, FoundDocument, Identity, to_object},
    error::DataApiResult,
    operation::{ActionOutput, PendingOperation, Projection, SortDirection},
    transport::{ActionRequest, Transport},
};

/// A handle to one collection of the remote database.
///
/// Holds the collection name, its routing configuration, and a reference to the
/// transport. Cloning is cheap unless the configuration was overridden per collection.
pub struct Collection<'a, T: Transport> {
    name: String,
    config: Cow<'a, DataApiConfig>,
    transport: &'a T,
}

impl<'a, T: Transport> Collection<'a, T> {
    /// Creates a collection handle borrowing a configuration and a transport.
    pub fn new(name: impl Into<String>, config: &'a DataApiConfig, transport: &'a T) -> Self {
        Self {
            name: name.into(),
            config: Cow::Borrowed(config),
            transport,
        }
    }

    /// Returns this handle using `api_key` instead of the configured default.
    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        Self {
            config: Cow::Owned(self.config.with_api_key(api_key)),
            ..self
        }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration requests are routed with.
    pub fn config(&self) -> &DataApiConfig {
        &self.config
    }

    /// Stages a `find`. Nothing is sent until the returned builder is executed.
    pub fn find(&self, filter: Value) -> Find<'_, 'a, T> {
        Find {
            collection: self,
            operation: PendingOperation::new(Action::Find).with_filter(filter),
        }
    }

    /// Stages a `findOne`. Awaiting the returned builder executes it at once.
    ///
    /// The result is `None` when nothing matched; otherwise a [`FoundDocument`] that can
    /// be saved back.
    pub fn find_one(&self, filter: Value) -> FindOne<'_, 'a, T> {
        FindOne {
            collection: self,
            operation: PendingOperation::new(Action::FindOne).with_filter(filter),
        }
    }

    /// `find_one` on `{_id: <wire identity>}`.
    pub fn find_by_id(&self, id: impl Into<Identity>) -> FindOne<'_, 'a, T> {
        self.find_one(id.into().filter())
    }

    /// `update_one` on `{_id: <wire identity>}`.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn find_by_id_and_update(
        &self,
        id: impl Into<Identity>,
        update: Value,
    ) -> DataApiResult<Value> {
        let filter = id.into().filter();
        self.update_one(filter, update).await
    }

    /// Inserts one document, stamping `createdAt` and `updatedAt` with the current time.
    ///
    /// Returns the raw insert acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns [`DataApiError::InvalidDocument`](crate::error::DataApiError::InvalidDocument)
    /// if `document` does not serialize to an object, and propagates transport failures.
    pub async fn insert_one<S>(&self, document: S) -> DataApiResult<Value>
    where
        S: Serialize,
    {
        let operation = PendingOperation::new(Action::InsertOne).with_document(to_object(&document)?);
        Ok(self.exec(operation).await?.into_raw())
    }

    /// Alias of [`insert_one`](Self::insert_one).
    pub async fn create<S>(&self, document: S) -> DataApiResult<Value>
    where
        S: Serialize,
    {
        self.insert_one(document).await
    }

    /// Updates the first document matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DataApiError::InvalidOperation`](crate::error::DataApiError::InvalidOperation)
    /// without sending anything if `filter` is empty, and propagates transport failures.
    pub async fn update_one(&self, filter: Value, update: Value) -> DataApiResult<Value> {
        self.mutate(Action::UpdateOne, filter, update).await
    }

    /// Updates every document matching `filter`. Same rules as [`update_one`](Self::update_one).
    pub async fn update_many(&self, filter: Value, update: Value) -> DataApiResult<Value> {
        self.mutate(Action::UpdateMany, filter, update).await
    }

    /// Deletes the first document matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DataApiError::InvalidOperation`](crate::error::DataApiError::InvalidOperation)
    /// without sending anything if `filter` is empty, and propagates transport failures.
    pub async fn delete_one(&self, filter: Value) -> DataApiResult<Value> {
        self.mutate(Action::DeleteOne, filter, Value::Object(Map::new())).await
    }

    /// Deletes every document matching `filter`. Same rules as [`delete_one`](Self::delete_one).
    pub async fn delete_many(&self, filter: Value) -> DataApiResult<Value> {
        self.mutate(Action::DeleteMany, filter, Value::Object(Map::new())).await
    }

    async fn mutate(&self, action: Action, filter: Value, update: Value) -> DataApiResult<Value> {
        let operation = PendingOperation::new(action)
            .with_filter(filter)
            .with_update(update);

        Ok(self.exec(operation).await?.into_raw())
    }

    /// Executes a staged operation and returns its normalized result.
    ///
    /// The operation is consumed whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DataApiError::InvalidOperation`](crate::error::DataApiError::InvalidOperation)
    /// before any network call for an unfiltered update or delete, and propagates transport
    /// failures unchanged.
    pub async fn exec(&self, operation: PendingOperation) -> DataApiResult<ActionOutput> {
        let action = operation.action;
        let body = operation.into_body(Utc::now()).inspect_err(|err| {
            warn!(%action, collection = %self.name, error = %err, "refusing to send data api action");
        })?;

        let response = self.request(action, body).await?;
        trace!(%action, collection = %self.name, "normalizing data api response");

        Ok(ActionOutput::from_response(action, response))
    }

    async fn request(&self, action: Action, body: Map<String, Value>) -> DataApiResult<Value> {
        let mut payload = Map::with_capacity(body.len() + 3);
        payload.insert("dataSource".into(), Value::from(self.config.data_source.as_str()));
        payload.insert("database".into(), Value::from(self.config.database.as_str()));
        payload.insert("collection".into(), Value::from(self.name.as_str()));
        payload.extend(body);

        debug!(
            %action,
            collection = %self.name,
            database = %self.config.database,
            "sending data api action"
        );

        self.transport
            .send(ActionRequest {
                action,
                url: self.config.action_url(action),
                api_key: self.config.api_key.clone(),
                body: payload,
            })
            .await
            .inspect_err(|err| {
                debug!(%action, collection = %self.name, error = %err, "data api action failed");
            })
    }
}

impl<T: Transport> Clone for Collection<'_, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            config: self.config.clone(),
            transport: self.transport,
        }
    }
}

impl<T: Transport> fmt::Debug for Collection<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("transport", &self.transport)
            .finish()
    }
}

/// A staged `find`. Execute with [`exec`](Self::exec) or by awaiting it.
#[must_use = "a find does nothing until it is executed"]
pub struct Find<'c, 'a, T: Transport> {
    collection: &'c Collection<'a, T>,
    operation: PendingOperation,
}

impl<'c, 'a: 'c, T: Transport> Find<'c, 'a, T> {
    /// Replaces the sort specification, e.g. `json!({"createdAt": -1})`.
    pub fn sort(mut self, sort: Value) -> Self {
        self.operation.sort = sort;
        self
    }

    /// Adds one field to the sort specification.
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        let entry = Value::from(direction.as_i32());
        match &mut self.operation.sort {
            Value::Object(sort) => {
                sort.insert(field.into(), entry);
            }
            other => {
                let mut sort = Map::new();
                sort.insert(field.into(), entry);
                *other = Value::Object(sort);
            }
        }
        self
    }

    /// Caps the number of returned documents.
    pub fn limit(mut self, limit: u64) -> Self {
        self.operation.limit = Some(limit);
        self
    }

    /// Sets the projection, from a mapping or a space-separated list of field names.
    pub fn select(mut self, projection: impl Into<Projection>) -> Self {
        self.operation.projection = projection.into();
        self
    }

    /// The operation staged so far.
    pub fn operation(&self) -> &PendingOperation {
        &self.operation
    }

    /// Sends the `find` and returns the matched documents, empty if the response had none.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn exec(self) -> DataApiResult<Vec<Value>> {
        Ok(self.collection.exec(self.operation).await?.into_documents())
    }

    /// Like [`exec`](Self::exec), decoding each document into `D`.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and decoding errors.
    pub async fn exec_as<D: Document>(self) -> DataApiResult<Vec<D>> {
        self.exec()
            .await?
            .into_iter()
            .map(D::from_json)
            .collect()
    }
}

impl<'c, 'a: 'c, T: Transport + 'a> IntoFuture for Find<'c, 'a, T> {
    type Output = DataApiResult<Vec<Value>>;
    type IntoFuture = BoxFuture<'c, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exec())
    }
}

impl<T: Transport> fmt::Debug for Find<'_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Find")
            .field("collection", &self.collection.name())
            .field("operation", &self.operation)
            .finish()
    }
}

/// A staged `findOne`. Awaiting it executes immediately.
#[must_use = "a find_one does nothing until it is awaited"]
pub struct FindOne<'c, 'a, T: Transport> {
    collection: &'c Collection<'a, T>,
    operation: PendingOperation,
}

impl<'c, 'a: 'c, T: Transport> FindOne<'c, 'a, T> {
    /// Sets the projection, from a mapping or a space-separated list of field names.
    pub fn select(mut self, projection: impl Into<Projection>) -> Self {
        self.operation.projection = projection.into();
        self
    }

    /// The operation staged so far.
    pub fn operation(&self) -> &PendingOperation {
        &self.operation
    }

    /// Sends the `findOne`. Returns `None` if the response had no document.
    ///
    /// The returned document holds its own handle, so it outlives this builder's borrow.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn exec(self) -> DataApiResult<Option<FoundDocument<'a, T>>> {
        let document = self.collection.exec(self.operation).await?.into_document();

        Ok(document.map(|fields| FoundDocument::new(fields, self.collection.clone())))
    }
}

impl<'c, 'a: 'c, T: Transport + 'a> IntoFuture for FindOne<'c, 'a, T> {
    type Output = DataApiResult<Option<FoundDocument<'a, T>>>;
    type IntoFuture = BoxFuture<'c, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exec())
    }
}

impl<T: Transport> fmt::Debug for FindOne<'_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindOne")
            .field("collection", &self.collection.name())
            .field("operation", &self.operation)
            .finish()
    }
}

/// A collection bound to a [`Document`] type.
///
/// Reads decode into `D`, inserts encode from `D`. The collection name comes from
/// [`Document::collection_name`].
pub struct TypedCollection<'a, T: Transport, D: Document> {
    inner: Collection<'a, T>,
    _marker: PhantomData<D>,
}

impl<'a, T: Transport, D: Document> TypedCollection<'a, T, D> {
    pub(crate) fn new(inner: Collection<'a, T>) -> Self {
        Self { inner, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Returns the untyped handle for the same collection.
    pub fn untyped(&self) -> &Collection<'a, T> {
        &self.inner
    }

    /// Converts this typed collection to a different document type.
    pub fn with_type<U: Document>(&self) -> TypedCollection<'a, T, U> {
        TypedCollection::new(self.inner.clone())
    }

    /// Stages a `find` whose results decode into `D`.
    pub fn find(&self, filter: Value) -> TypedFind<'_, 'a, T, D> {
        TypedFind {
            inner: self.inner.find(filter),
            _marker: PhantomData,
        }
    }

    /// Fetches one matching document.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and decoding errors.
    pub async fn find_one(&self, filter: Value) -> DataApiResult<Option<D>> {
        self.inner
            .find_one(filter)
            .exec()
            .await?
            .map(|found| D::from_json(Value::Object(found.into_inner())))
            .transpose()
    }

    /// Fetches the document with identity `id`.
    pub async fn find_by_id(&self, id: impl Into<Identity>) -> DataApiResult<Option<D>> {
        self.find_one(id.into().filter()).await
    }

    /// Inserts `document`, stamping its timestamps.
    pub async fn insert_one(&self, document: &D) -> DataApiResult<Value> {
        self.inner.insert_one(document.to_json()?).await
    }

    pub async fn update_one(&self, filter: Value, update: Value) -> DataApiResult<Value> {
        self.inner.update_one(filter, update).await
    }

    pub async fn update_many(&self, filter: Value, update: Value) -> DataApiResult<Value> {
        self.inner.update_many(filter, update).await
    }

    pub async fn delete_one(&self, filter: Value) -> DataApiResult<Value> {
        self.inner.delete_one(filter).await
    }

    pub async fn delete_many(&self, filter: Value) -> DataApiResult<Value> {
        self.inner.delete_many(filter).await
    }
}

impl<T: Transport, D: Document> fmt::Debug for TypedCollection<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCollection")
            .field("inner", &self.inner)
            .field("document", &std::any::type_name::<D>())
            .finish()
    }
}

/// A staged `find` on a [`TypedCollection`].
#[must_use = "a find does nothing until it is executed"]
pub struct TypedFind<'c, 'a, T: Transport, D: Document> {
    inner: Find<'c, 'a, T>,
    _marker: PhantomData<D>,
}

impl<'c, 'a: 'c, T: Transport, D: Document> TypedFind<'c, 'a, T, D> {
    pub fn sort(self, sort: Value) -> Self {
        Self { inner: self.inner.sort(sort), _marker: PhantomData }
    }

    pub fn sort_by(self, field: impl Into<String>, direction: SortDirection) -> Self {
        Self { inner: self.inner.sort_by(field, direction), _marker: PhantomData }
    }

    pub fn limit(self, limit: u64) -> Self {
        Self { inner: self.inner.limit(limit), _marker: PhantomData }
    }

    pub fn select(self, projection: impl Into<Projection>) -> Self {
        Self { inner: self.inner.select(projection), _marker: PhantomData }
    }

    pub async fn exec(self) -> DataApiResult<Vec<D>> {
        self.inner.exec_as::<D>().await
    }
}

impl<'c, 'a: 'c, T: Transport + 'a, D: Document> IntoFuture for TypedFind<'c, 'a, T, D> {
    type Output = DataApiResult<Vec<D>>;
    type IntoFuture = BoxFuture<'c, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exec())
    }
}
