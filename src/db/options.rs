use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use typed_builder::TypedBuilder;

use crate::options::{IndexingPolicy, Throughput};

/// Specifies the options to a
/// [`Database::create_collection`](crate::Database::create_collection) or
/// [`Collection::ensure_exists`](crate::Collection::ensure_exists) operation.
///
/// Both fields are forwarded opaquely to the store, which fills in its defaults for whichever
/// are unset and enforces its own bounds.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(default, setter(into)))]
#[non_exhaustive]
pub struct CreateCollectionOptions {
    /// The indexing policy for the new collection.
    pub indexing_policy: Option<IndexingPolicy>,

    /// The throughput allocation to reserve for the new collection.
    pub throughput: Option<Throughput>,
}
