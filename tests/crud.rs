//! Document CRUD semantics: typed round trips, wholesale replacement, status-classified
//! failures.

mod common;

use function_name::named;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;

use docstore::{
    error::{ErrorKind, StatusCode},
    options::{CreateCollectionOptions, Throughput},
    Document,
};

use crate::common::{andersen, test_client, wakefield, Family};

#[tokio::test]
#[named]
async fn typed_documents_round_trip() {
    let (_backend, client) = test_client().await;
    let (_, families) = common::seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    let stored: Family = families.read_document("Wakefield.7").await.unwrap();
    assert_eq!(stored, wakefield());
}

#[tokio::test]
#[named]
async fn replace_stores_exactly_the_new_content() {
    let (_backend, client) = test_client().await;
    let (_, families) = common::seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    let mut updated = andersen();
    updated.children[0].grade = 6;
    let descriptor = families
        .replace_document("Andersen.1", &updated)
        .await
        .unwrap();
    assert_eq!(descriptor.id, "Andersen.1");

    assert_eq!(
        families.read_document("Andersen.1").await.unwrap(),
        updated
    );

    // Optional fields that were absent before the replace are still absent in the raw
    // stored document; the replace specified nothing about them.
    let raw: Document = families
        .clone_with_type::<Document>()
        .read_document("Andersen.1")
        .await
        .unwrap();
    let parent = &raw["Parents"][0];
    assert_eq!(parent["FirstName"], json!("Thomas"));
    assert!(parent.get("FamilyName").is_none());
    let child = &raw["Children"][0];
    assert_eq!(child["Grade"], json!(6));
    assert!(child.get("FamilyName").is_none());
}

#[tokio::test]
#[named]
async fn deleting_a_document_makes_reads_report_not_found() {
    let (_backend, client) = test_client().await;
    let (_, families) = common::seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    families.delete_document("Andersen.1").await.unwrap();

    let error = families
        .read_document("Andersen.1")
        .await
        .unwrap_err();
    assert!(error.is_not_found());
    assert_eq!(error.status(), Some(StatusCode::NotFound));

    // A second delete reports the same signal.
    let error = families.delete_document("Andersen.1").await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
#[named]
async fn replacing_a_missing_document_fails() {
    let (_backend, client) = test_client().await;
    let (_, families) = common::seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    let mut ghost = andersen();
    ghost.id = "Andersen.2".to_string();
    let error = families
        .replace_document("Andersen.2", &ghost)
        .await
        .unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
#[named]
async fn creating_a_duplicate_document_conflicts() {
    let (_backend, client) = test_client().await;
    let (_, families) = common::seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    let error = families.create_document(&andersen()).await.unwrap_err();
    assert!(error.is_conflict());
}

#[tokio::test]
#[named]
async fn documents_must_carry_a_string_id() {
    #[derive(Serialize, Deserialize)]
    struct Anonymous {
        name: String,
    }

    let (_backend, client) = test_client().await;
    let db = client.database(function_name!());
    db.ensure_exists().await.unwrap();
    let anonymous = db.collection::<Anonymous>("Things");
    anonymous.ensure_exists(None).await.unwrap();

    let error = anonymous
        .create_document(&Anonymous {
            name: "no id".to_string(),
        })
        .await
        .unwrap_err();
    // Rejected client side, before anything reaches the store.
    assert!(matches!(
        error.kind.as_ref(),
        ErrorKind::InvalidArgument { .. }
    ));
    assert_eq!(error.status(), None);
}

#[tokio::test]
#[named]
async fn reserved_characters_in_ids_are_rejected_by_the_store() {
    let (_backend, client) = test_client().await;
    let db = client.database(function_name!());
    db.ensure_exists().await.unwrap();
    let things = db.collection::<Document>("Things");
    things.ensure_exists(None).await.unwrap();

    let doc = match json!({ "id": "a/b" }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    let error = things.create_document(&doc).await.unwrap_err();
    assert_eq!(error.status(), Some(StatusCode::BadRequest));
}

#[tokio::test]
#[named]
async fn the_store_enforces_its_throughput_bounds() {
    let (_backend, client) = test_client().await;
    let db = client.database(function_name!());
    db.ensure_exists().await.unwrap();

    let error = db
        .create_collection(
            "Underprovisioned",
            CreateCollectionOptions::builder()
                .throughput(Throughput::request_units(100))
                .build(),
        )
        .await
        .unwrap_err();
    assert_eq!(error.status(), Some(StatusCode::BadRequest));
    assert!(error.to_string().contains("request units"));
}

#[tokio::test]
#[named]
async fn dropping_a_collection_removes_its_documents() {
    let (_backend, client) = test_client().await;
    let (db, families) = common::seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    families.drop().await.unwrap();
    assert!(db.list_collection_names().await.unwrap().is_empty());
    let error = families.read_document("Andersen.1").await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
#[named]
async fn dropping_the_database_tears_everything_down() {
    let (_backend, client) = test_client().await;
    let (db, families) = common::seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    db.drop().await.unwrap();
    assert!(client.list_database_names().await.unwrap().is_empty());
    let error = families.read().await.unwrap_err();
    assert!(error.is_not_found());
}
