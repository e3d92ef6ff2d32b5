use std::{fmt, str::FromStr};

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// A path-like identifier naming a database, a collection within a database, or a document
/// within a collection.
///
/// Locators render in the store's link format: `dbs/{database}`,
/// `dbs/{database}/colls/{collection}` and `dbs/{database}/colls/{collection}/docs/{id}`. They
/// appear in store error messages and in the `self_link` field of the descriptors returned by
/// resource operations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locator {
    /// The name of the database.
    pub database: String,

    /// The name of the collection, when the locator addresses a collection or a document.
    pub collection: Option<String>,

    /// The document id, when the locator addresses a document.
    pub document: Option<String>,
}

impl Locator {
    /// Creates a locator addressing a database.
    pub fn database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: None,
            document: None,
        }
    }

    /// Creates a locator addressing a collection.
    pub fn collection(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: Some(collection.into()),
            document: None,
        }
    }

    /// Creates a locator addressing a document.
    pub fn document(
        database: impl Into<String>,
        collection: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            collection: Some(collection.into()),
            document: Some(document.into()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dbs/{}", self.database)?;
        if let Some(ref coll) = self.collection {
            write!(f, "/colls/{}", coll)?;
        }
        if let Some(ref doc) = self.document {
            write!(f, "/docs/{}", doc)?;
        }
        Ok(())
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('/');

        let mut expect = |tag: &str| -> Result<String, Error> {
            match (segments.next(), segments.next()) {
                (Some(t), Some(name)) if t == tag && !name.is_empty() => Ok(name.to_string()),
                _ => Err(Error::invalid_argument(format!(
                    "locator {:?} is missing a {}/<name> segment",
                    s, tag
                ))),
            }
        };

        let database = expect("dbs")?;
        let mut locator = Locator::database(database);

        let rest: Vec<&str> = segments.collect();
        match rest.as_slice() {
            [] => Ok(locator),
            ["colls", coll] if !coll.is_empty() => {
                locator.collection = Some((*coll).to_string());
                Ok(locator)
            }
            ["colls", coll, "docs", doc] if !coll.is_empty() && !doc.is_empty() => {
                locator.collection = Some((*coll).to_string());
                locator.document = Some((*doc).to_string());
                Ok(locator)
            }
            _ => Err(Error::invalid_argument(format!(
                "locator {:?} does not match dbs/<db>[/colls/<coll>[/docs/<id>]]",
                s
            ))),
        }
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: Error| D::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::Locator;

    #[test]
    fn display_uses_the_link_format() {
        assert_eq!(Locator::database("FamilyDB").to_string(), "dbs/FamilyDB");
        assert_eq!(
            Locator::collection("FamilyDB", "FamilyCollection").to_string(),
            "dbs/FamilyDB/colls/FamilyCollection"
        );
        assert_eq!(
            Locator::document("FamilyDB", "FamilyCollection", "Andersen.1").to_string(),
            "dbs/FamilyDB/colls/FamilyCollection/docs/Andersen.1"
        );
    }

    #[test]
    fn parse_round_trips() {
        for link in [
            "dbs/FamilyDB",
            "dbs/FamilyDB/colls/FamilyCollection",
            "dbs/FamilyDB/colls/FamilyCollection/docs/Andersen.1",
        ] {
            let locator: Locator = link.parse().unwrap();
            assert_eq!(locator.to_string(), link);
        }
    }

    #[test]
    fn parse_rejects_malformed_links() {
        for link in [
            "",
            "FamilyDB",
            "dbs/",
            "dbs/FamilyDB/colls",
            "dbs/FamilyDB/colls/",
            "dbs/FamilyDB/docs/Andersen.1",
            "dbs/FamilyDB/colls/FamilyCollection/docs",
            "dbs/FamilyDB/colls/FamilyCollection/docs/a/extra",
        ] {
            assert!(link.parse::<Locator>().is_err(), "accepted {:?}", link);
        }
    }
}
