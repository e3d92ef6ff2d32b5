//! Shared fixtures for the integration tests: the family data model the sample workflow
//! seeds, and helpers for standing up a client against a fresh in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use docstore::{
    backend::MemoryBackend,
    error::Result,
    options::{
        ClientOptions, CreateCollectionOptions, DataKind, IndexSpec, IndexingPolicy,
        MAX_PRECISION,
    },
    Client, Collection, Database,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Family {
    #[serde(rename = "id")]
    pub id: String,
    pub last_name: String,
    pub parents: Vec<Parent>,
    pub children: Vec<Child>,
    pub address: Address,
    pub is_registered: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    pub first_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Child {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    pub first_name: String,
    pub gender: String,
    pub grade: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pets: Vec<Pet>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pet {
    pub given_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub state: String,
    pub county: String,
    pub city: String,
}

/// The Andersen seed family: one child in grade 5, optional name fields unset.
pub fn andersen() -> Family {
    Family {
        id: "Andersen.1".to_string(),
        last_name: "Andersen".to_string(),
        parents: vec![
            Parent {
                family_name: None,
                first_name: "Thomas".to_string(),
            },
            Parent {
                family_name: None,
                first_name: "Mary Kay".to_string(),
            },
        ],
        children: vec![Child {
            family_name: None,
            first_name: "Henriette Thaulow".to_string(),
            gender: "female".to_string(),
            grade: 5,
            pets: vec![Pet {
                given_name: "Fluffy".to_string(),
            }],
        }],
        address: Address {
            state: "WA".to_string(),
            county: "King".to_string(),
            city: "Seattle".to_string(),
        },
        is_registered: true,
    }
}

/// The Wakefield seed family: two children, optional name fields set.
pub fn wakefield() -> Family {
    Family {
        id: "Wakefield.7".to_string(),
        last_name: "Wakefield".to_string(),
        parents: vec![
            Parent {
                family_name: Some("Wakefield".to_string()),
                first_name: "Robin".to_string(),
            },
            Parent {
                family_name: Some("Miller".to_string()),
                first_name: "Ben".to_string(),
            },
        ],
        children: vec![
            Child {
                family_name: Some("Merriam".to_string()),
                first_name: "Jesse".to_string(),
                gender: "female".to_string(),
                grade: 8,
                pets: vec![
                    Pet {
                        given_name: "Goofy".to_string(),
                    },
                    Pet {
                        given_name: "Shadow".to_string(),
                    },
                ],
            },
            Child {
                family_name: Some("Miller".to_string()),
                first_name: "Lisa".to_string(),
                gender: "female".to_string(),
                pets: vec![],
                grade: 1,
            },
        ],
        address: Address {
            state: "NY".to_string(),
            county: "Manhattan".to_string(),
            city: "NY".to_string(),
        },
        is_registered: false,
    }
}

pub fn emulator_options() -> ClientOptions {
    ClientOptions::builder()
        .endpoint("https://localhost:8081/")
        .key(MemoryBackend::WELL_KNOWN_KEY)
        .build()
}

/// A client connected to a fresh, empty in-memory store. The backend is returned alongside
/// so tests can observe store-side state such as the write counter.
pub async fn test_client() -> (Arc<MemoryBackend>, Client) {
    let backend = Arc::new(MemoryBackend::default());
    let client = Client::with_backend(backend.clone(), emulator_options())
        .await
        .expect("connecting to a fresh in-memory store");
    (backend, client)
}

/// A collection creation configuration with string range indexing at maximum precision, the
/// configuration the sample workflow provisions.
pub fn string_range_collection_options() -> CreateCollectionOptions {
    CreateCollectionOptions::builder()
        .indexing_policy(
            IndexingPolicy::builder()
                .indexes(vec![
                    IndexSpec::range(DataKind::String, MAX_PRECISION),
                    IndexSpec::range(DataKind::Number, MAX_PRECISION),
                ])
                .build(),
        )
        .build()
}

/// Provisions `db_name`/`coll_name` and seeds the two sample families.
pub async fn seeded_families(
    client: &Client,
    db_name: &str,
    coll_name: &str,
) -> Result<(Database, Collection<Family>)> {
    let db = client.database(db_name);
    db.ensure_exists().await?;
    let families = db.collection::<Family>(coll_name);
    families
        .ensure_exists(string_range_collection_options())
        .await?;
    families.ensure_document(&andersen()).await?;
    families.ensure_document(&wakefield()).await?;
    Ok((db, families))
}
