use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use typed_builder::TypedBuilder;

/// A precision value requesting the maximum precision the store supports for an index.
pub const MAX_PRECISION: i8 = -1;

/// Specifies the options to a [`Collection::find`](crate::Collection::find) or
/// [`Collection::query`](crate::Collection::query) operation.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(default, setter(into)))]
#[non_exhaustive]
pub struct QueryOptions {
    /// The maximum number of documents returned per result page. `None` asks the store to
    /// return everything in a single page.
    ///
    /// Note that this does not affect which documents a cursor yields, only how many are held
    /// in memory at a time and how many round trips are needed to drain the results.
    pub max_item_count: Option<u32>,
}

/// The indexing configuration of a collection, passed opaquely to the store at creation time.
///
/// The default policy hashes strings and range-indexes numbers, which serves equality
/// predicates and numeric ranges. Range comparisons over strings additionally require a
/// string [`IndexKind::Range`] entry, typically at [`MAX_PRECISION`]:
///
/// ```rust
/// use docstore::options::{DataKind, IndexSpec, IndexingPolicy, MAX_PRECISION};
///
/// let policy = IndexingPolicy::builder()
///     .indexes(vec![
///         IndexSpec::range(DataKind::String, MAX_PRECISION),
///         IndexSpec::range(DataKind::Number, MAX_PRECISION),
///     ])
///     .build();
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
#[non_exhaustive]
pub struct IndexingPolicy {
    /// Whether the store indexes documents as they are written.
    #[builder(default = true)]
    pub automatic: bool,

    /// The index entries maintained for the collection.
    #[builder(default)]
    pub indexes: Vec<IndexSpec>,
}

impl Default for IndexingPolicy {
    fn default() -> Self {
        Self {
            automatic: true,
            indexes: vec![
                IndexSpec::hash(DataKind::String, 3),
                IndexSpec::range(DataKind::Number, MAX_PRECISION),
            ],
        }
    }
}

impl IndexingPolicy {
    /// Whether this policy maintains a range index over strings, enabling range comparisons
    /// against string values in queries.
    pub fn serves_string_range(&self) -> bool {
        self.indexes
            .iter()
            .any(|index| index.kind == IndexKind::Range && index.data == DataKind::String)
    }
}

/// One index entry of an [`IndexingPolicy`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct IndexSpec {
    /// The kind of index structure maintained.
    pub kind: IndexKind,

    /// The data type the entry covers.
    pub data: DataKind,

    /// The indexing precision in bytes; [`MAX_PRECISION`] requests the maximum.
    pub precision: i8,
}

impl IndexSpec {
    /// Creates a hash index entry over `data`.
    pub fn hash(data: DataKind, precision: i8) -> Self {
        Self {
            kind: IndexKind::Hash,
            data,
            precision,
        }
    }

    /// Creates a range index entry over `data`.
    pub fn range(data: DataKind, precision: i8) -> Self {
        Self {
            kind: IndexKind::Range,
            data,
            precision,
        }
    }
}

/// The kinds of index structure the store maintains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum IndexKind {
    /// Supports equality comparisons.
    Hash,

    /// Supports equality and range comparisons.
    Range,
}

/// The data types an index entry can cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum DataKind {
    /// String values.
    String,

    /// Numeric values.
    Number,
}

/// A capacity reservation for a collection, expressed in the store's request units. The store
/// accepts it opaquely at collection creation and enforces its own bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Throughput {
    /// The reserved request units per second.
    pub request_units: u32,
}

impl Throughput {
    /// Creates a reservation of `request_units` request units per second.
    pub fn request_units(request_units: u32) -> Self {
        Self { request_units }
    }
}

impl Default for Throughput {
    /// The store's minimum allocation of 400 request units.
    fn default() -> Self {
        Self { request_units: 400 }
    }
}
