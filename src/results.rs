//! Contains the descriptor types returned by resource operations.

use serde::{Deserialize, Serialize};

use crate::{
    options::{IndexingPolicy, Throughput},
    Locator,
};

/// The descriptor of a database, returned by read, create and ensure operations on databases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct DatabaseDescriptor {
    /// The caller-supplied database name.
    pub id: String,

    /// The locator the store serves this database under.
    pub self_link: Locator,
}

impl DatabaseDescriptor {
    pub(crate) fn new(database: &str) -> Self {
        Self {
            id: database.to_string(),
            self_link: Locator::database(database),
        }
    }
}

/// The descriptor of a collection, returned by read, create and ensure operations on
/// collections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct CollectionDescriptor {
    /// The caller-supplied collection name.
    pub id: String,

    /// The locator the store serves this collection under.
    pub self_link: Locator,

    /// The indexing policy the collection was created with.
    pub indexing_policy: IndexingPolicy,

    /// The throughput allocation reserved for the collection.
    pub throughput: Throughput,
}

impl CollectionDescriptor {
    pub(crate) fn new(
        database: &str,
        collection: &str,
        indexing_policy: IndexingPolicy,
        throughput: Throughput,
    ) -> Self {
        Self {
            id: collection.to_string(),
            self_link: Locator::collection(database, collection),
            indexing_policy,
            throughput,
        }
    }
}

/// The descriptor of a document, returned by create, ensure and replace operations on
/// documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct DocumentDescriptor {
    /// The caller-supplied document id.
    pub id: String,

    /// The locator the store serves this document under.
    pub self_link: Locator,
}

impl DocumentDescriptor {
    pub(crate) fn new(database: &str, collection: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            self_link: Locator::document(database, collection, id),
        }
    }
}
