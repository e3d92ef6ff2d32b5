pub mod options;

use std::sync::Arc;

use crate::{
    coll::Collection,
    error::Result,
    options::CreateCollectionOptions,
    provision::{read_or_create, EnsureOutcome},
    results::{CollectionDescriptor, DatabaseDescriptor},
    Client, Locator,
};

/// `Database` is the client-side abstraction of a database in the store. It can be used to
/// provision the database itself, to manage its collections, and to obtain
/// [`Collection`] handles. A `Database` can only be obtained through a [`Client`] by calling
/// [`Client::database`].
///
/// `Database` uses [`std::sync::Arc`](https://doc.rust-lang.org/std/sync/struct.Arc.html)
/// internally, so it can safely be shared across threads or async tasks.
#[derive(Clone, Debug)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

#[derive(Debug)]
struct DatabaseInner {
    client: Client,
    name: String,
}

impl Database {
    pub(crate) fn new(client: Client, name: &str) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                client,
                name: name.to_string(),
            }),
        }
    }

    /// Get the `Client` this database descended from.
    pub(crate) fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Gets the name of the `Database`.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Gets the locator addressing the `Database`.
    pub fn locator(&self) -> Locator {
        Locator::database(self.name())
    }

    /// Gets a handle to a collection in this database with the provided name.
    ///
    /// For more information on how the generic parameter `T` is used, check out the
    /// [`Collection`] documentation.
    ///
    /// This method neither sends nor receives anything from the store; the collection need
    /// not exist yet.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        Collection::new(self.clone(), name)
    }

    /// Reads the database's descriptor. Fails with a
    /// [`NotFound`](crate::error::StatusCode::NotFound) error if the database does not exist.
    pub async fn read(&self) -> Result<DatabaseDescriptor> {
        self.client().backend().read_database(self.name()).await
    }

    /// Reads the database, creating it if the store reports it missing.
    ///
    /// This is idempotent: an existing database is returned as
    /// [`EnsureOutcome::Found`] without any write, a missing one is created and returned as
    /// [`EnsureOutcome::Created`]. Any error other than the not-found signal propagates
    /// unchanged.
    pub async fn ensure_exists(&self) -> Result<EnsureOutcome<DatabaseDescriptor>> {
        let backend = self.client().backend();
        read_or_create(backend.read_database(self.name()), || {
            backend.create_database(self.name())
        })
        .await
    }

    /// Creates a new collection in the database with the given `name` and `options`.
    ///
    /// The indexing policy and throughput allocation in `options` are forwarded opaquely to
    /// the store, which applies its defaults for whichever are unset.
    pub async fn create_collection(
        &self,
        name: impl AsRef<str>,
        options: impl Into<Option<CreateCollectionOptions>>,
    ) -> Result<CollectionDescriptor> {
        self.client()
            .backend()
            .create_collection(
                self.name(),
                name.as_ref(),
                options.into().unwrap_or_default(),
            )
            .await
    }

    /// Lists the names of the collections in the database, in name order.
    pub async fn list_collection_names(&self) -> Result<Vec<String>> {
        self.client()
            .backend()
            .list_collection_names(self.name())
            .await
    }

    /// Deletes the database and everything in it.
    pub async fn drop(&self) -> Result<()> {
        self.client().backend().delete_database(self.name()).await
    }
}
