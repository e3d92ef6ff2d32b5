use std::fmt;

use typed_builder::TypedBuilder;

use crate::error::{Error, Result};

/// The connection parameters for a [`Client`](crate::Client): the store's endpoint address and
/// the account key authorizing access.
///
/// Options can be assembled with the builder or parsed from the store's connection-string
/// form:
///
/// ```rust
/// use docstore::options::ClientOptions;
///
/// # fn demo() -> docstore::error::Result<()> {
/// let options = ClientOptions::builder()
///     .endpoint("https://localhost:8081/")
///     .key("bG9jYWwtZW11bGF0b3Ita2V5")
///     .build();
///
/// let options = ClientOptions::parse(
///     "AccountEndpoint=https://localhost:8081/;AccountKey=bG9jYWwtZW11bGF0b3Ita2V5;",
/// )?;
/// # let _ = options;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
#[non_exhaustive]
pub struct ClientOptions {
    /// The endpoint address of the store, e.g. `https://localhost:8081/`.
    pub endpoint: String,

    /// The base64-encoded account key presented when the session is established.
    pub key: String,
}

impl ClientOptions {
    /// Parses options from a connection string of `;`-separated `Name=Value` pairs. The
    /// recognized names are `AccountEndpoint` and `AccountKey`; both are required.
    pub fn parse(connection_string: impl AsRef<str>) -> Result<Self> {
        let mut endpoint = None;
        let mut key = None;

        for pair in connection_string.as_ref().split(';') {
            if pair.is_empty() {
                continue;
            }
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                Error::invalid_argument(format!(
                    "connection string segment {:?} is not a Name=Value pair",
                    pair
                ))
            })?;
            match name {
                "AccountEndpoint" => endpoint = Some(value.to_string()),
                "AccountKey" => key = Some(value.to_string()),
                other => {
                    return Err(Error::invalid_argument(format!(
                        "unrecognized connection string setting {:?}",
                        other
                    )))
                }
            }
        }

        match (endpoint, key) {
            (Some(endpoint), Some(key)) => Ok(Self { endpoint, key }),
            (None, _) => Err(Error::invalid_argument(
                "the connection string names no AccountEndpoint",
            )),
            (_, None) => Err(Error::invalid_argument(
                "the connection string names no AccountKey",
            )),
        }
    }
}

// The account key stays out of Debug output.
impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .finish()
    }
}
