//! The boundary between the client and the document store.
//!
//! [`StoreBackend`] is the complete operation set the client uses; everything the store owns
//! (transport, query execution, indexing, consistency) sits behind it. The crate ships one
//! implementation, [`MemoryBackend`], an embedded engine with the same observable semantics as
//! the hosted service's local emulator.

mod memory;

pub use memory::MemoryBackend;

use async_trait::async_trait;

use crate::{
    error::Result,
    options::CreateCollectionOptions,
    query::Predicate,
    results::{CollectionDescriptor, DatabaseDescriptor, DocumentDescriptor},
    Document,
};

/// One page of query results, together with the token needed to request the next page.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct QueryPage {
    /// The documents of this page, in the store's scan order.
    pub documents: Vec<Document>,

    /// An opaque token resuming the scan after this page, or `None` when the results are
    /// exhausted.
    pub continuation: Option<String>,
}

/// A request for one page of query results.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct PageRequest {
    /// The maximum number of documents to return; `None` requests everything in one page.
    pub max_item_count: Option<u32>,

    /// The continuation token from the previous page, or `None` for the first page.
    pub continuation: Option<String>,
}

impl PageRequest {
    /// Creates a page request.
    pub fn new(max_item_count: Option<u32>, continuation: Option<String>) -> Self {
        Self {
            max_item_count,
            continuation,
        }
    }
}

/// The operation set of a document store: databases containing collections containing JSON
/// documents, addressed by caller-supplied names and ids.
///
/// Errors are reported through [`crate::error::ApiError`] with a
/// [`StatusCode`](crate::error::StatusCode) classifier; reads of missing resources report
/// [`NotFound`](crate::error::StatusCode::NotFound), creates of present ones report
/// [`Conflict`](crate::error::StatusCode::Conflict).
#[async_trait]
pub trait StoreBackend: Send + Sync + std::fmt::Debug {
    /// Establishes a session for the holder of `key`.
    async fn connect(&self, key: &str) -> Result<()>;

    /// Reads a database's descriptor.
    async fn read_database(&self, database: &str) -> Result<DatabaseDescriptor>;

    /// Creates a database.
    async fn create_database(&self, database: &str) -> Result<DatabaseDescriptor>;

    /// Deletes a database and everything in it.
    async fn delete_database(&self, database: &str) -> Result<()>;

    /// Lists the names of all databases, in name order.
    async fn list_database_names(&self) -> Result<Vec<String>>;

    /// Reads a collection's descriptor.
    async fn read_collection(&self, database: &str, collection: &str)
        -> Result<CollectionDescriptor>;

    /// Creates a collection with the provided indexing policy and throughput allocation.
    async fn create_collection(
        &self,
        database: &str,
        collection: &str,
        options: CreateCollectionOptions,
    ) -> Result<CollectionDescriptor>;

    /// Deletes a collection and its documents.
    async fn delete_collection(&self, database: &str, collection: &str) -> Result<()>;

    /// Lists the names of a database's collections, in name order.
    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>>;

    /// Reads a document's content.
    async fn read_document(&self, database: &str, collection: &str, id: &str)
        -> Result<Document>;

    /// Creates a document. The content must carry the caller-supplied `id`.
    async fn create_document(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<DocumentDescriptor>;

    /// Replaces a document's content wholesale.
    async fn replace_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<DocumentDescriptor>;

    /// Deletes a document.
    async fn delete_document(&self, database: &str, collection: &str, id: &str) -> Result<()>;

    /// Returns one page of the documents matching `predicate`.
    async fn query_documents(
        &self,
        database: &str,
        collection: &str,
        predicate: &Predicate,
        page: PageRequest,
    ) -> Result<QueryPage>;
}
