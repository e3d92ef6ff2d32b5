//! Query behavior: equivalence of the structured and textual forms, paging, and the
//! store-side indexing constraints.

mod common;

use function_name::named;
use futures::TryStreamExt;
use pretty_assertions::assert_eq;

use docstore::{
    error::StatusCode,
    options::QueryOptions,
    query::Predicate,
    Collection,
};

use crate::common::{seeded_families, test_client, Family};

/// Drains a cursor and returns the ids of the matching families, sorted. Query equivalence
/// is defined over sets, so tests compare through this order-independent view.
async fn ids(cursor: docstore::Cursor<Family>) -> Vec<String> {
    let mut ids: Vec<String> = cursor
        .map_ok(|family| family.id)
        .try_collect()
        .await
        .unwrap();
    ids.sort();
    ids
}

async fn both_forms(
    families: &Collection<Family>,
    predicate: Predicate,
    text: &str,
) -> (Vec<String>, Vec<String>) {
    let structured = ids(families.find(predicate, None).await.unwrap()).await;
    let textual = ids(families.query(text, None).await.unwrap()).await;
    (structured, textual)
}

#[tokio::test]
#[named]
async fn the_two_query_forms_return_the_same_set() {
    let (_backend, client) = test_client().await;
    let (_, families) = seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    let (structured, textual) = both_forms(
        &families,
        Predicate::eq("LastName", "Andersen"),
        "SELECT * FROM Family WHERE Family.LastName = 'Andersen'",
    )
    .await;
    assert_eq!(structured, vec!["Andersen.1".to_string()]);
    assert_eq!(structured, textual);
}

#[tokio::test]
#[named]
async fn the_two_query_forms_agree_on_compound_filters() {
    let (_backend, client) = test_client().await;
    let (_, families) = seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    let cases: Vec<(Predicate, &str)> = vec![
        (
            Predicate::eq("Address.State", "NY").and(Predicate::eq("IsRegistered", false)),
            "SELECT * FROM f WHERE f.Address.State = 'NY' AND f.IsRegistered = false",
        ),
        (
            Predicate::eq("LastName", "Andersen").or(Predicate::eq("LastName", "Wakefield")),
            "SELECT * FROM f WHERE f.LastName = 'Andersen' OR f.LastName = 'Wakefield'",
        ),
        (
            Predicate::eq("IsRegistered", true).not(),
            "SELECT * FROM f WHERE NOT f.IsRegistered = true",
        ),
        (
            Predicate::gt("Children.0.Grade", 5),
            "SELECT * FROM f WHERE f.Children.0.Grade > 5",
        ),
        (
            Predicate::ne("LastName", "Andersen"),
            "SELECT * FROM f WHERE f.LastName != 'Andersen'",
        ),
    ];

    for (predicate, text) in cases {
        let (structured, textual) = both_forms(&families, predicate.clone(), text).await;
        assert_eq!(structured, textual, "disagreement for {:?} vs {:?}", predicate, text);
    }
}

#[tokio::test]
#[named]
async fn an_unfiltered_query_returns_every_document() {
    let (_backend, client) = test_client().await;
    let (_, families) = seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    let all = ids(families.query("SELECT * FROM Families", None).await.unwrap()).await;
    assert_eq!(all, vec!["Andersen.1".to_string(), "Wakefield.7".to_string()]);
}

#[tokio::test]
#[named]
async fn paging_drains_the_full_result_set() {
    let (_backend, client) = test_client().await;
    let (_, families) = seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    let options = QueryOptions::builder().max_item_count(1u32).build();
    let paged: Vec<String> = ids(families
        .find(Predicate::All, options)
        .await
        .unwrap())
    .await;
    assert_eq!(paged, vec!["Andersen.1".to_string(), "Wakefield.7".to_string()]);
}

#[tokio::test]
#[named]
async fn the_seeding_scenario_end_to_end() {
    let (_backend, client) = test_client().await;
    let (_, families) = seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();
    let by_last_name = "SELECT * FROM Family WHERE Family.LastName = 'Andersen'";

    // One Andersen family, child in grade 5.
    let matches: Vec<Family> = families
        .query(by_last_name, None)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].children[0].grade, 5);

    // Replace with grade 6; the same query now observes the update.
    let mut updated = matches.into_iter().next().unwrap();
    updated.children[0].grade = 6;
    families
        .replace_document("Andersen.1", &updated)
        .await
        .unwrap();
    let matches: Vec<Family> = families
        .query(by_last_name, None)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].children[0].grade, 6);

    // Delete; the query comes back empty.
    families.delete_document("Andersen.1").await.unwrap();
    let matches: Vec<Family> = families
        .query(by_last_name, None)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
#[named]
async fn string_range_comparisons_require_a_range_index() {
    let (_backend, client) = test_client().await;
    let db = client.database(function_name!());
    db.ensure_exists().await.unwrap();

    // The default policy hash-indexes strings, so a string range comparison is refused.
    let unindexed = db.collection::<Family>("DefaultPolicy");
    unindexed.ensure_exists(None).await.unwrap();
    let error = unindexed
        .find(Predicate::gt("LastName", "B"), None)
        .await
        .unwrap()
        .try_next()
        .await
        .unwrap_err();
    assert_eq!(error.status(), Some(StatusCode::BadRequest));

    // Equality against the same collection is still served.
    let served: Vec<Family> = unindexed
        .find(Predicate::eq("LastName", "B"), None)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(served.is_empty());

    // With string range indexing (the sample's configuration) the comparison works.
    let (_, families) = seeded_families(&client, function_name!(), "RangeIndexed")
        .await
        .unwrap();
    let matched = ids(families
        .find(Predicate::gt("LastName", "B"), None)
        .await
        .unwrap())
    .await;
    assert_eq!(matched, vec!["Wakefield.7".to_string()]);
}

#[tokio::test]
#[named]
async fn malformed_query_text_is_classified_bad_request() {
    let (_backend, client) = test_client().await;
    let (_, families) = seeded_families(&client, function_name!(), "FamilyCollection")
        .await
        .unwrap();

    let error = families
        .query("SELECT * FROM f WHERE f.LastName", None)
        .await
        .unwrap_err();
    assert_eq!(error.status(), Some(StatusCode::BadRequest));
}

#[tokio::test]
#[named]
async fn querying_a_missing_collection_reports_not_found() {
    let (_backend, client) = test_client().await;
    let db = client.database(function_name!());
    db.ensure_exists().await.unwrap();

    let absent = db.collection::<Family>("Nowhere");
    let error = absent.find(Predicate::All, None).await.unwrap_err();
    assert!(error.is_not_found());
}
