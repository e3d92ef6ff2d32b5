//! Contains all of the types needed to specify options to the operations in the crate.

pub use crate::{
    client::options::ClientOptions,
    coll::options::{
        DataKind, IndexKind, IndexSpec, IndexingPolicy, QueryOptions, Throughput, MAX_PRECISION,
    },
    db::options::CreateCollectionOptions,
};
