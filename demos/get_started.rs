//! A console walk-through of the provisioning-and-seeding workflow: ensure a database and a
//! collection exist, seed two family documents, query them (structurally and textually),
//! replace one, delete it, and tear the database down.
//!
//! Run with `cargo run --example get_started`. Debug builds use the embedded emulator
//! defaults; release builds read the endpoint and key from the `DOCSTORE_ENDPOINT` and
//! `DOCSTORE_KEY` environment variables.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use docstore::{
    backend::MemoryBackend,
    error::Result,
    options::{
        ClientOptions, CreateCollectionOptions, DataKind, IndexSpec, IndexingPolicy, Throughput,
        MAX_PRECISION,
    },
    query::Predicate,
    Client, Collection,
};
use futures_util::TryStreamExt;

const DATABASE_NAME: &str = "FamilyDB";
const COLLECTION_NAME: &str = "FamilyCollection";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Family {
    #[serde(rename = "id")]
    id: String,
    last_name: String,
    parents: Vec<Parent>,
    children: Vec<Child>,
    address: Address,
    is_registered: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Parent {
    #[serde(skip_serializing_if = "Option::is_none")]
    family_name: Option<String>,
    first_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Child {
    #[serde(skip_serializing_if = "Option::is_none")]
    family_name: Option<String>,
    first_name: String,
    gender: String,
    grade: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pets: Vec<Pet>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Pet {
    given_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Address {
    state: String,
    county: String,
    city: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(error) = run().await {
        match error.status() {
            Some(status) => println!("{} error occurred: {}", status, error),
            None => println!("Error: {}", error),
        }
    }
    println!("End of demo, press Enter to exit.");
    wait_for_enter();
}

async fn run() -> Result<()> {
    let client = Client::connect(connection_options()?).await?;

    // Release the connection on the error path too.
    let result = get_started(&client).await;
    client.shutdown().await;
    result
}

fn connection_options() -> Result<ClientOptions> {
    if cfg!(debug_assertions) {
        // Connect to the embedded emulator.
        Ok(ClientOptions::builder()
            .endpoint("https://localhost:8081/")
            .key(MemoryBackend::WELL_KNOWN_KEY)
            .build())
    } else {
        let endpoint = std::env::var("DOCSTORE_ENDPOINT").unwrap_or_default();
        let key = std::env::var("DOCSTORE_KEY").unwrap_or_default();
        ClientOptions::parse(format!("AccountEndpoint={};AccountKey={};", endpoint, key))
    }
}

async fn get_started(client: &Client) -> Result<()> {
    let db = client.database(DATABASE_NAME);
    let outcome = db.ensure_exists().await?;
    write_and_prompt(format!(
        "{} {}",
        if outcome.is_created() { "Created" } else { "Found" },
        DATABASE_NAME
    ));

    let families = db.collection::<Family>(COLLECTION_NAME);

    // Index strings for range comparisons at maximum precision, and reserve the smallest
    // throughput tier.
    let collection_options = CreateCollectionOptions::builder()
        .indexing_policy(IndexingPolicy::builder()
            .indexes(vec![
                IndexSpec::range(DataKind::String, MAX_PRECISION),
                IndexSpec::range(DataKind::Number, MAX_PRECISION),
            ])
            .build())
        .throughput(Throughput::request_units(400))
        .build();
    let outcome = families.ensure_exists(collection_options).await?;
    write_and_prompt(format!(
        "{} {}",
        if outcome.is_created() { "Created" } else { "Found" },
        COLLECTION_NAME
    ));

    let mut andersen_family = Family {
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
    };
    seed_family(&families, &andersen_family).await?;

    let wakefield_family = Family {
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
                grade: 1,
                pets: vec![],
            },
        ],
        address: Address {
            state: "NY".to_string(),
            county: "Manhattan".to_string(),
            city: "NY".to_string(),
        },
        is_registered: false,
    };
    seed_family(&families, &wakefield_family).await?;

    execute_simple_query(&families).await?;

    // Update the grade of the Andersen family child.
    andersen_family.children[0].grade = 6;
    families
        .replace_document(&andersen_family.id, &andersen_family)
        .await?;
    write_and_prompt(format!("Replaced Family {}", andersen_family.id));

    execute_simple_query(&families).await?;

    families.delete_document(&andersen_family.id).await?;
    println!("Deleted Family {}", andersen_family.id);

    db.drop().await?;
    println!("Deleted database {}", DATABASE_NAME);
    Ok(())
}

async fn seed_family(families: &Collection<Family>, family: &Family) -> Result<()> {
    let outcome = families.ensure_document(family).await?;
    if outcome.is_created() {
        write_and_prompt(format!("Created Family {}", family.id));
    } else {
        write_and_prompt(format!("Found {}", family.id));
    }
    Ok(())
}

/// Runs the same last-name filter twice, once as a structured predicate and once as query
/// text, and prints both result sets.
async fn execute_simple_query(families: &Collection<Family>) -> Result<()> {
    println!("Running structured query...");
    let matches: Vec<Family> = families
        .find(Predicate::eq("LastName", "Andersen"), None)
        .await?
        .try_collect()
        .await?;
    for family in &matches {
        println!("\tRead {:?}", family);
    }

    println!("Running query text...");
    let matches: Vec<Family> = families
        .query(
            "SELECT * FROM Family WHERE Family.LastName = 'Andersen'",
            None,
        )
        .await?
        .try_collect()
        .await?;
    for family in &matches {
        println!("\tRead {:?}", family);
    }

    write_and_prompt("");
    Ok(())
}

fn write_and_prompt(line: impl AsRef<str>) {
    let line = line.as_ref();
    if !line.is_empty() {
        println!("{}", line);
    }
    println!("Press Enter to continue ...");
    wait_for_enter();
}

fn wait_for_enter() {
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
