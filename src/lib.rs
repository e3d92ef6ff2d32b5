//! This crate contains a client-side library for a document-oriented database exposing a
//! databases → collections → JSON documents resource model. It provides typed collections
//! backed by [`serde`], an idempotent ensure-exists provisioning layer, and a query facility
//! accepting either structured predicates or query text, with both forms executing the same
//! logical filter.
//!
//! The store itself sits behind the [`backend::StoreBackend`] trait; the crate ships
//! [`backend::MemoryBackend`], an embedded in-memory engine with the observable semantics of
//! the hosted service's local emulator, so applications and tests run without any external
//! process.
//!
//! # Example Usage
//!
//! ## Connecting and provisioning
//!
//! Provisioning is idempotent end to end: every resource is read first and only created when
//! the store reports it missing, so a workflow can be re-run safely.
//!
//! ```rust
//! # async fn demo() -> docstore::error::Result<()> {
//! use docstore::{backend::MemoryBackend, options::ClientOptions, Client};
//!
//! let options = ClientOptions::builder()
//!     .endpoint("https://localhost:8081/")
//!     .key(MemoryBackend::WELL_KNOWN_KEY)
//!     .build();
//! let client = Client::connect(options).await?;
//!
//! let db = client.database("FamilyDB");
//! let outcome = db.ensure_exists().await?;
//! println!("database {}: created = {}", db.name(), outcome.is_created());
//! # Ok(())
//! # }
//! ```
//!
//! ## Typed collections
//!
//! A [`Collection`] can be parameterized with any type implementing `Serialize` and
//! `Deserialize`; documents must serialize to JSON objects carrying a string `id` field.
//!
//! ```rust
//! # async fn demo(db: docstore::Database) -> docstore::error::Result<()> {
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Family {
//!     id: String,
//!     #[serde(rename = "LastName")]
//!     last_name: String,
//! }
//!
//! let families = db.collection::<Family>("FamilyCollection");
//! families.ensure_exists(None).await?;
//!
//! let family = Family {
//!     id: "Andersen.1".to_string(),
//!     last_name: "Andersen".to_string(),
//! };
//! families.ensure_document(&family).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Querying
//!
//! The same filter can be expressed structurally or as query text; the two forms return the
//! same result set. Results stream through a [`Cursor`], which implements the
//! [`Stream`](futures_core::Stream) trait from the `futures` ecosystem.
//!
//! ```rust
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Debug, Serialize, Deserialize)]
//! # struct Family { id: String }
//! # async fn demo(families: docstore::Collection<Family>) -> docstore::error::Result<()> {
//! use docstore::query::Predicate;
//! use futures_util::TryStreamExt;
//!
//! let structured: Vec<Family> = families
//!     .find(Predicate::eq("LastName", "Andersen"), None)
//!     .await?
//!     .try_collect()
//!     .await?;
//!
//! let textual: Vec<Family> = families
//!     .query("SELECT * FROM Family WHERE Family.LastName = 'Andersen'", None)
//!     .await?
//!     .try_collect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod backend;
mod client;
mod coll;
mod cursor;
mod db;
pub mod error;
mod locator;
pub mod options;
mod provision;
pub mod query;
pub mod results;
pub(crate) mod trace;

pub use crate::{
    client::Client,
    coll::Collection,
    cursor::Cursor,
    db::Database,
    locator::Locator,
    provision::EnsureOutcome,
};

/// The raw, schemaless representation of a stored document: a JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;
