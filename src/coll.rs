pub mod options;

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    cursor::Cursor,
    db::Database,
    error::{Error, Result},
    options::{CreateCollectionOptions, QueryOptions},
    provision::{read_or_create, EnsureOutcome},
    query::{parse_query, Predicate},
    results::{CollectionDescriptor, DocumentDescriptor},
    Client, Document, Locator,
};

/// `Collection` is the client-side abstraction of a collection of documents in the store. It
/// is used to provision the collection and to perform document-level CRUD and query
/// operations. A `Collection` can be obtained through a [`Database`] by calling
/// [`Database::collection`].
///
/// A [`Collection`] can be parameterized with any type that implements the `Serialize` and
/// `Deserialize` traits from the [`serde`](https://serde.rs/) crate, not just the raw
/// [`Document`](crate::Document) map. The store is schemaless: the typed parameter is a
/// client-side convenience, and the same collection can be viewed at a different type with
/// [`Collection::clone_with_type`].
///
/// Every document must serialize to a JSON object carrying a string `id` field; the id is the
/// document's identity within the collection.
///
/// `Collection` uses [`std::sync::Arc`](https://doc.rust-lang.org/std/sync/struct.Arc.html)
/// internally, so it can safely be shared across threads or async tasks.
#[derive(Debug)]
pub struct Collection<T>
where
    T: Send + Sync,
{
    inner: Arc<CollectionInner>,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

// Because derive is too conservative, derive only implements Clone if T is Clone.
// Collection<T> does not actually store any value of type T (so T does not need to be Clone).
impl<T> Clone for Collection<T>
where
    T: Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _phantom: Default::default(),
        }
    }
}

#[derive(Debug)]
struct CollectionInner {
    client: Client,
    db: Database,
    name: String,
}

impl<T> Collection<T>
where
    T: Send + Sync,
{
    pub(crate) fn new(db: Database, name: &str) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                client: db.client().clone(),
                db,
                name: name.to_string(),
            }),
            _phantom: Default::default(),
        }
    }

    /// Gets a clone of the `Collection` with a different type `U`.
    pub fn clone_with_type<U: Send + Sync>(&self) -> Collection<U> {
        Collection {
            inner: self.inner.clone(),
            _phantom: Default::default(),
        }
    }

    /// Get the `Client` this collection descended from.
    pub fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Gets the name of the `Collection`.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    fn db_name(&self) -> &str {
        self.inner.db.name()
    }

    /// Gets the locator addressing the `Collection`.
    pub fn locator(&self) -> Locator {
        Locator::collection(self.db_name(), self.name())
    }

    /// Reads the collection's descriptor. Fails with a
    /// [`NotFound`](crate::error::StatusCode::NotFound) error if the collection (or its
    /// database) does not exist.
    pub async fn read(&self) -> Result<CollectionDescriptor> {
        self.client()
            .backend()
            .read_collection(self.db_name(), self.name())
            .await
    }

    /// Reads the collection, creating it with `options` if the store reports it missing.
    ///
    /// This is idempotent: an existing collection is returned as [`EnsureOutcome::Found`]
    /// without any write (and without reconciling its configuration against `options`); a
    /// missing one is created and returned as [`EnsureOutcome::Created`]. Any error other
    /// than the not-found signal propagates unchanged; in particular, the database itself
    /// must already exist.
    pub async fn ensure_exists(
        &self,
        options: impl Into<Option<CreateCollectionOptions>>,
    ) -> Result<EnsureOutcome<CollectionDescriptor>> {
        let backend = self.client().backend();
        let options = options.into().unwrap_or_default();
        read_or_create(backend.read_collection(self.db_name(), self.name()), || {
            backend.create_collection(self.db_name(), self.name(), options)
        })
        .await
    }

    /// Deletes the collection and its documents.
    pub async fn drop(&self) -> Result<()> {
        self.client()
            .backend()
            .delete_collection(self.db_name(), self.name())
            .await
    }

    /// Runs a query with a structured predicate, returning a [`Cursor`] over the matching
    /// documents.
    ///
    /// The collection's existence is verified eagerly; result pages are fetched lazily as
    /// the cursor is drained, `max_item_count` documents at a time.
    pub async fn find(
        &self,
        predicate: Predicate,
        options: impl Into<Option<QueryOptions>>,
    ) -> Result<Cursor<T>> {
        self.read().await?;
        Ok(Cursor::new(
            self.client().backend().clone(),
            self.db_name().to_string(),
            self.name().to_string(),
            predicate,
            options.into().unwrap_or_default().max_item_count,
        ))
    }

    /// Runs a query expressed as query text, returning a [`Cursor`] over the matching
    /// documents.
    ///
    /// The text is compiled into the same predicate representation
    /// [`Collection::find`] accepts, so for any filter the two entry points return the same
    /// result set. See [`crate::query`] for the dialect.
    pub async fn query(
        &self,
        text: impl AsRef<str>,
        options: impl Into<Option<QueryOptions>>,
    ) -> Result<Cursor<T>> {
        let predicate = parse_query(text.as_ref())?;
        self.find(predicate, options).await
    }

    /// Deletes the document addressed by `id`. Fails with a
    /// [`NotFound`](crate::error::StatusCode::NotFound) error if it does not exist.
    pub async fn delete_document(&self, id: impl AsRef<str>) -> Result<()> {
        self.client()
            .backend()
            .delete_document(self.db_name(), self.name(), id.as_ref())
            .await
    }
}

impl<T> Collection<T>
where
    T: Serialize + Send + Sync,
{
    /// Serializes `document` and validates that it is an object carrying a string id.
    fn to_document(&self, document: &T) -> Result<(String, Document)> {
        let value = serde_json::to_value(document)?;
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::invalid_argument(format!(
                    "documents must serialize to JSON objects, got {}",
                    json_type_name(&other)
                )))
            }
        };
        let id = match map.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::String(_)) => {
                return Err(Error::invalid_argument("the document id must not be empty"))
            }
            Some(_) => return Err(Error::invalid_argument("the document id must be a string")),
            None => {
                return Err(Error::invalid_argument(
                    "the document serializes without an \"id\" field",
                ))
            }
        };
        Ok((id, map))
    }

    /// Creates `document` in the collection. Fails with a
    /// [`Conflict`](crate::error::StatusCode::Conflict) error if a document with the same id
    /// already exists.
    pub async fn create_document(&self, document: &T) -> Result<DocumentDescriptor> {
        let (_, map) = self.to_document(document)?;
        self.client()
            .backend()
            .create_document(self.db_name(), self.name(), map)
            .await
    }

    /// Reads the document with `document`'s id, creating `document` if the store reports it
    /// missing.
    ///
    /// This is idempotent: when a document with the same id already exists it is left
    /// untouched (its content is **not** compared against or updated from `document`) and
    /// the outcome is [`EnsureOutcome::Found`]. Any error other than the not-found signal
    /// propagates unchanged.
    pub async fn ensure_document(&self, document: &T) -> Result<EnsureOutcome<DocumentDescriptor>> {
        let (id, map) = self.to_document(document)?;
        let backend = self.client().backend();
        read_or_create(
            async {
                backend
                    .read_document(self.db_name(), self.name(), &id)
                    .await
                    .map(|_| DocumentDescriptor::new(self.db_name(), self.name(), &id))
            },
            || backend.create_document(self.db_name(), self.name(), map),
        )
        .await
    }

    /// Replaces the content of the document addressed by `id` with `document`, wholesale.
    ///
    /// There is no partial-update form: the stored content afterwards is exactly the
    /// serialization of `document`, so fields absent from it are absent from the store.
    /// Fails with a [`NotFound`](crate::error::StatusCode::NotFound) error if the document
    /// does not exist.
    pub async fn replace_document(
        &self,
        id: impl AsRef<str>,
        document: &T,
    ) -> Result<DocumentDescriptor> {
        let (_, map) = self.to_document(document)?;
        self.client()
            .backend()
            .replace_document(self.db_name(), self.name(), id.as_ref(), map)
            .await
    }
}

impl<T> Collection<T>
where
    T: DeserializeOwned + Send + Sync,
{
    /// Reads the document addressed by `id`. Fails with a
    /// [`NotFound`](crate::error::StatusCode::NotFound) error if it does not exist.
    pub async fn read_document(&self, id: impl AsRef<str>) -> Result<T> {
        let map = self
            .client()
            .backend()
            .read_document(self.db_name(), self.name(), id.as_ref())
            .await?;
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
