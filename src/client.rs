pub mod options;

use std::sync::Arc;

use base64::Engine as _;
use tracing::{debug, info};

use crate::{
    backend::{MemoryBackend, StoreBackend},
    db::Database,
    error::{Error, Result},
    options::ClientOptions,
    results::DatabaseDescriptor,
    trace::CONNECTION_TRACING_EVENT_TARGET,
};

/// This is the main entry point for the API. A `Client` holds the single connection to a
/// document store and hands out [`Database`] and [`Collection`](crate::Collection) handles.
///
/// `Client` uses [`std::sync::Arc`](https://doc.rust-lang.org/std/sync/struct.Arc.html)
/// internally, so it can safely be shared across threads or async tasks. The connection is
/// acquired once by [`Client::connect`] and held until [`Client::shutdown`] (or until the last
/// clone is dropped).
///
/// ```rust
/// # async fn demo() -> docstore::error::Result<()> {
/// use docstore::{backend::MemoryBackend, options::ClientOptions, Client};
///
/// let options = ClientOptions::builder()
///     .endpoint("https://localhost:8081/")
///     .key(MemoryBackend::WELL_KNOWN_KEY)
///     .build();
/// let client = Client::connect(options).await?;
///
/// let db = client.database("FamilyDB");
/// // ... provision and query ...
/// client.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    options: ClientOptions,
    backend: Arc<dyn StoreBackend>,
}

impl Client {
    /// Connects to an embedded in-memory store provisioned with the account key in `options`.
    ///
    /// The embedded store plays the role of the local emulator: it starts empty and its
    /// contents live exactly as long as the backend does. To connect to a store shared with
    /// other clients (or a different [`StoreBackend`] implementation entirely), use
    /// [`Client::with_backend`].
    pub async fn connect(options: ClientOptions) -> Result<Self> {
        let backend = Arc::new(MemoryBackend::new(options.key.clone()));
        Self::with_backend(backend, options).await
    }

    /// Connects to the provided backend.
    ///
    /// The endpoint and key in `options` are validated client side (URL shape, base64 key)
    /// and the key is then presented to the backend, which rejects it with an
    /// [`Unauthorized`](crate::error::StatusCode::Unauthorized) error if it does not match
    /// the store's provisioned key.
    pub async fn with_backend(
        backend: Arc<dyn StoreBackend>,
        options: ClientOptions,
    ) -> Result<Self> {
        validate_endpoint(&options.endpoint)?;
        validate_key(&options.key)?;
        backend.connect(&options.key).await?;

        info!(
            target: CONNECTION_TRACING_EVENT_TARGET,
            endpoint = options.endpoint.as_str(),
            "connection established"
        );
        Ok(Self {
            inner: Arc::new(ClientInner { options, backend }),
        })
    }

    /// The endpoint address this client is connected to.
    pub fn endpoint(&self) -> &str {
        &self.inner.options.endpoint
    }

    pub(crate) fn backend(&self) -> &Arc<dyn StoreBackend> {
        &self.inner.backend
    }

    /// Gets a handle to the database named `name`.
    ///
    /// This method neither sends nor receives anything from the store; the database need not
    /// exist yet.
    pub fn database(&self, name: &str) -> Database {
        Database::new(self.clone(), name)
    }

    /// Creates a database named `name`. Fails with a
    /// [`Conflict`](crate::error::StatusCode::Conflict) error if it already exists.
    pub async fn create_database(&self, name: impl AsRef<str>) -> Result<DatabaseDescriptor> {
        self.backend().create_database(name.as_ref()).await
    }

    /// Lists the names of all databases in the store, in name order.
    pub async fn list_database_names(&self) -> Result<Vec<String>> {
        self.backend().list_database_names().await
    }

    /// Releases the connection. Pending handles cloned from this client keep the store alive
    /// until they are dropped, but a released workflow should not issue further operations.
    pub async fn shutdown(self) {
        debug!(
            target: CONNECTION_TRACING_EVENT_TARGET,
            endpoint = self.inner.options.endpoint.as_str(),
            "connection released"
        );
    }
}

/// Endpoint addresses are URLs over http or https with a non-empty host.
fn validate_endpoint(endpoint: &str) -> Result<()> {
    let rest = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .ok_or_else(|| {
            Error::invalid_argument(format!(
                "the endpoint {:?} is not an http or https URL",
                endpoint
            ))
        })?;
    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(Error::invalid_argument(format!(
            "the endpoint {:?} names no host",
            endpoint
        )));
    }
    Ok(())
}

/// Account keys are base64; a key that does not decode is rejected before it reaches the
/// store.
fn validate_key(key: &str) -> Result<()> {
    base64::engine::general_purpose::STANDARD
        .decode(key)
        .map_err(|_| Error::authentication("the account key is not valid base64"))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn endpoint_shapes() {
        assert!(validate_endpoint("https://localhost:8081/").is_ok());
        assert!(validate_endpoint("http://10.0.0.5:8081").is_ok());
        assert!(validate_endpoint("localhost:8081").is_err());
        assert!(validate_endpoint("ftp://localhost").is_err());
        assert!(validate_endpoint("https:///dbs").is_err());
    }

    #[test]
    fn key_must_be_base64() {
        assert!(validate_key(MemoryBackend::WELL_KNOWN_KEY).is_ok());
        assert!(validate_key("not base64!").is_err());
    }
}
