use std::{
    collections::{BTreeMap, HashMap},
    ops::Bound,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    backend::{PageRequest, QueryPage, StoreBackend},
    error::{ApiError, Error, Result, StatusCode},
    options::{CreateCollectionOptions, IndexingPolicy, Throughput},
    query::Predicate,
    results::{CollectionDescriptor, DatabaseDescriptor, DocumentDescriptor},
    trace::OPERATION_TRACING_EVENT_TARGET,
    Document, Locator,
};

/// The smallest throughput allocation the store accepts for a collection.
pub const MIN_THROUGHPUT: u32 = 400;

/// The largest throughput allocation the store accepts for a collection.
pub const MAX_THROUGHPUT: u32 = 1_000_000;

/// Characters the store rejects in document ids.
const INVALID_ID_CHARS: &[char] = &['/', '\\', '#', '?'];

/// An embedded in-memory document store with the observable semantics of the hosted service's
/// local emulator: name-keyed databases and collections, id-keyed JSON documents, status-coded
/// rejections, and id-ordered query scans with continuation tokens.
///
/// All state lives behind a [`tokio::sync::RwLock`], so a backend can be shared across clients
/// and tasks. Dropping the backend discards everything.
#[derive(Debug)]
pub struct MemoryBackend {
    key: String,
    catalog: RwLock<Catalog>,
    writes: AtomicU64,
}

#[derive(Debug, Default)]
struct Catalog {
    databases: HashMap<String, DatabaseEntry>,
}

#[derive(Debug, Default)]
struct DatabaseEntry {
    collections: HashMap<String, CollectionEntry>,
}

#[derive(Debug)]
struct CollectionEntry {
    indexing_policy: IndexingPolicy,
    throughput: Throughput,
    documents: BTreeMap<String, Document>,
}

impl MemoryBackend {
    /// The account key the local emulator is provisioned with. It is fixed and well known;
    /// the emulator stores no durable data, so the key authenticates nothing of value.
    pub const WELL_KNOWN_KEY: &'static str =
        "C2y6yDjf5/R+ob0N8A7Cgv30VRDJIWEHLM+4QDU5DE2nQ9nDuVTqobD4b8mGGyPMbIZnqyMsEcaGQy67XIw/Jw==";

    /// Creates an empty store provisioned with the provided account key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            catalog: RwLock::new(Catalog::default()),
            writes: AtomicU64::new(0),
        }
    }

    /// The number of successful write operations (creates, replaces, deletes) the store has
    /// performed. Reads and queries do not count.
    pub fn write_operations(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for MemoryBackend {
    /// An empty store provisioned with [`MemoryBackend::WELL_KNOWN_KEY`].
    fn default() -> Self {
        Self::new(Self::WELL_KNOWN_KEY)
    }
}

fn not_found(locator: Locator) -> Error {
    ApiError::new(StatusCode::NotFound, format!("{} does not exist", locator)).into()
}

fn conflict(locator: Locator) -> Error {
    ApiError::new(StatusCode::Conflict, format!("{} already exists", locator)).into()
}

fn bad_request(message: impl Into<String>) -> Error {
    ApiError::new(StatusCode::BadRequest, message).into()
}

impl Catalog {
    fn database(&self, database: &str) -> Result<&DatabaseEntry> {
        self.databases
            .get(database)
            .ok_or_else(|| not_found(Locator::database(database)))
    }

    fn database_mut(&mut self, database: &str) -> Result<&mut DatabaseEntry> {
        self.databases
            .get_mut(database)
            .ok_or_else(|| not_found(Locator::database(database)))
    }

    fn collection(&self, database: &str, collection: &str) -> Result<&CollectionEntry> {
        self.database(database)?
            .collections
            .get(collection)
            .ok_or_else(|| not_found(Locator::collection(database, collection)))
    }

    fn collection_mut(
        &mut self,
        database: &str,
        collection: &str,
    ) -> Result<&mut CollectionEntry> {
        self.database_mut(database)?
            .collections
            .get_mut(collection)
            .ok_or_else(|| not_found(Locator::collection(database, collection)))
    }
}

/// Extracts and validates the caller-supplied id of a document body.
fn document_id(document: &Document) -> Result<String> {
    let id = match document.get("id") {
        Some(Value::String(id)) => id.as_str(),
        Some(_) => return Err(bad_request("the document id must be a string")),
        None => return Err(bad_request("the document carries no id")),
    };
    if id.is_empty() {
        return Err(bad_request("the document id must not be empty"));
    }
    if id.contains(INVALID_ID_CHARS) {
        return Err(bad_request(format!(
            "the document id {:?} contains a reserved character (one of / \\ # ?)",
            id
        )));
    }
    Ok(id.to_string())
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn connect(&self, key: &str) -> Result<()> {
        if key != self.key {
            return Err(ApiError::new(
                StatusCode::Unauthorized,
                "the presented account key is not valid for this store",
            )
            .into());
        }
        debug!(
            target: OPERATION_TRACING_EVENT_TARGET,
            "session established"
        );
        Ok(())
    }

    async fn read_database(&self, database: &str) -> Result<DatabaseDescriptor> {
        let catalog = self.catalog.read().await;
        catalog.database(database)?;
        Ok(DatabaseDescriptor::new(database))
    }

    async fn create_database(&self, database: &str) -> Result<DatabaseDescriptor> {
        if database.is_empty() {
            return Err(bad_request("the database name must not be empty"));
        }
        let mut catalog = self.catalog.write().await;
        if catalog.databases.contains_key(database) {
            return Err(conflict(Locator::database(database)));
        }
        catalog
            .databases
            .insert(database.to_string(), DatabaseEntry::default());
        self.record_write();
        debug!(
            target: OPERATION_TRACING_EVENT_TARGET,
            db = database,
            "database created"
        );
        Ok(DatabaseDescriptor::new(database))
    }

    async fn delete_database(&self, database: &str) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        if catalog.databases.remove(database).is_none() {
            return Err(not_found(Locator::database(database)));
        }
        self.record_write();
        debug!(
            target: OPERATION_TRACING_EVENT_TARGET,
            db = database,
            "database deleted"
        );
        Ok(())
    }

    async fn list_database_names(&self) -> Result<Vec<String>> {
        let catalog = self.catalog.read().await;
        let mut names: Vec<String> = catalog.databases.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn read_collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<CollectionDescriptor> {
        let catalog = self.catalog.read().await;
        let entry = catalog.collection(database, collection)?;
        Ok(CollectionDescriptor::new(
            database,
            collection,
            entry.indexing_policy.clone(),
            entry.throughput,
        ))
    }

    async fn create_collection(
        &self,
        database: &str,
        collection: &str,
        options: CreateCollectionOptions,
    ) -> Result<CollectionDescriptor> {
        if collection.is_empty() {
            return Err(bad_request("the collection name must not be empty"));
        }
        let indexing_policy = options.indexing_policy.unwrap_or_default();
        let throughput = options.throughput.unwrap_or_default();
        if !(MIN_THROUGHPUT..=MAX_THROUGHPUT).contains(&throughput.request_units) {
            return Err(bad_request(format!(
                "the requested throughput of {} request units is outside the supported range {}..={}",
                throughput.request_units, MIN_THROUGHPUT, MAX_THROUGHPUT
            )));
        }

        let mut catalog = self.catalog.write().await;
        let db_entry = catalog.database_mut(database)?;
        if db_entry.collections.contains_key(collection) {
            return Err(conflict(Locator::collection(database, collection)));
        }
        db_entry.collections.insert(
            collection.to_string(),
            CollectionEntry {
                indexing_policy: indexing_policy.clone(),
                throughput,
                documents: BTreeMap::new(),
            },
        );
        self.record_write();
        debug!(
            target: OPERATION_TRACING_EVENT_TARGET,
            db = database,
            coll = collection,
            request_units = throughput.request_units,
            "collection created"
        );
        Ok(CollectionDescriptor::new(
            database,
            collection,
            indexing_policy,
            throughput,
        ))
    }

    async fn delete_collection(&self, database: &str, collection: &str) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        let db_entry = catalog.database_mut(database)?;
        if db_entry.collections.remove(collection).is_none() {
            return Err(not_found(Locator::collection(database, collection)));
        }
        self.record_write();
        debug!(
            target: OPERATION_TRACING_EVENT_TARGET,
            db = database,
            coll = collection,
            "collection deleted"
        );
        Ok(())
    }

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>> {
        let catalog = self.catalog.read().await;
        let mut names: Vec<String> = catalog.database(database)?.collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn read_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
    ) -> Result<Document> {
        let catalog = self.catalog.read().await;
        let entry = catalog.collection(database, collection)?;
        entry
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(Locator::document(database, collection, id)))
    }

    async fn create_document(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<DocumentDescriptor> {
        let id = document_id(&document)?;
        let mut catalog = self.catalog.write().await;
        let entry = catalog.collection_mut(database, collection)?;
        if entry.documents.contains_key(&id) {
            return Err(conflict(Locator::document(database, collection, &id)));
        }
        entry.documents.insert(id.clone(), document);
        self.record_write();
        debug!(
            target: OPERATION_TRACING_EVENT_TARGET,
            db = database,
            coll = collection,
            id = id.as_str(),
            "document created"
        );
        Ok(DocumentDescriptor::new(database, collection, &id))
    }

    async fn replace_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<DocumentDescriptor> {
        let body_id = document_id(&document)?;
        if body_id != id {
            return Err(bad_request(format!(
                "the replacement content carries id {:?} but addresses {:?}; a replace may not change the id",
                body_id, id
            )));
        }
        let mut catalog = self.catalog.write().await;
        let entry = catalog.collection_mut(database, collection)?;
        match entry.documents.get_mut(id) {
            Some(stored) => *stored = document,
            None => return Err(not_found(Locator::document(database, collection, id))),
        }
        self.record_write();
        debug!(
            target: OPERATION_TRACING_EVENT_TARGET,
            db = database,
            coll = collection,
            id = id,
            "document replaced"
        );
        Ok(DocumentDescriptor::new(database, collection, id))
    }

    async fn delete_document(&self, database: &str, collection: &str, id: &str) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        let entry = catalog.collection_mut(database, collection)?;
        if entry.documents.remove(id).is_none() {
            return Err(not_found(Locator::document(database, collection, id)));
        }
        self.record_write();
        debug!(
            target: OPERATION_TRACING_EVENT_TARGET,
            db = database,
            coll = collection,
            id = id,
            "document deleted"
        );
        Ok(())
    }

    async fn query_documents(
        &self,
        database: &str,
        collection: &str,
        predicate: &Predicate,
        page: PageRequest,
    ) -> Result<QueryPage> {
        let catalog = self.catalog.read().await;
        let entry = catalog.collection(database, collection)?;

        if predicate.uses_string_range() && !entry.indexing_policy.serves_string_range() {
            return Err(bad_request(
                "a range comparison over strings requires a string range index on the collection",
            ));
        }

        // Id-ordered scan resuming after the continuation token, if any.
        let lower = match page.continuation {
            Some(after) => Bound::Excluded(after),
            None => Bound::Unbounded,
        };
        let mut matches = entry
            .documents
            .range::<String, _>((lower, Bound::Unbounded))
            .filter(|(_, document)| predicate.matches(document));

        let mut documents = Vec::new();
        let mut continuation = None;
        match page.max_item_count {
            Some(limit) => {
                for (id, document) in matches.by_ref().take(limit as usize) {
                    documents.push(document.clone());
                    continuation = Some(id.clone());
                }
                // Only hand back a token when something is actually left to resume from.
                if documents.len() < limit as usize || matches.next().is_none() {
                    continuation = None;
                }
            }
            None => {
                documents.extend(matches.map(|(_, document)| document.clone()));
            }
        }

        debug!(
            target: OPERATION_TRACING_EVENT_TARGET,
            db = database,
            coll = collection,
            returned = documents.len(),
            exhausted = continuation.is_none(),
            "query page served"
        );
        Ok(QueryPage {
            documents,
            continuation,
        })
    }
}
