mod harness;

use ghostroute_store::RedactionDraft;
use serde_json::json;

fn submission(doc: &str, terms: &[&str]) -> RedactionDraft {
    RedactionDraft {
        user: "maya".to_string(),
        doc_text: doc.to_string(),
        redacted_terms: terms.iter().map(|t| t.to_string()).collect(),
        source_event: Some(13),
        notes: None,
    }
}

#[tokio::test]
async fn redactions_round_trip_without_exposing_documents() {
    let (_pg, store) = harness::postgres_store().await;

    let draft = submission(
        "Draft injunction naming [REDACTED] and [REDACTED] as trustees.",
        &["Oasis Relay, Ltd.", "Meridian Holdings"],
    );
    let id = store.insert_redaction(&draft).await.unwrap();
    assert!(id > 0);

    let rows = store.list_recent_redactions().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].user_name, "maya");
    assert_eq!(rows[0].source_event, Some(13));
    assert_eq!(
        rows[0].redacted_terms,
        json!(["Oasis Relay, Ltd.", "Meridian Holdings"])
    );
    // the listing record carries who redacted what, never the document
    let listed = serde_json::to_value(&rows[0]).unwrap();
    assert!(listed.get("doc_text").is_none());
}

#[tokio::test]
async fn listing_is_newest_first() {
    let (_pg, store) = harness::postgres_store().await;

    let first = store
        .insert_redaction(&submission("first", &[]))
        .await
        .unwrap();
    let second = store
        .insert_redaction(&submission("second", &["a"]))
        .await
        .unwrap();

    let rows = store.list_recent_redactions().await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn sparse_submissions_get_defaults() {
    let (_pg, store) = harness::postgres_store().await;

    // wire shape: only doc_text supplied
    let draft: RedactionDraft =
        serde_json::from_value(json!({"doc_text": "bare minimum"})).unwrap();
    assert_eq!(draft.user, "anonymous");
    assert!(draft.redacted_terms.is_empty());

    store.insert_redaction(&draft).await.unwrap();
    let rows = store.list_recent_redactions().await.unwrap();
    assert_eq!(rows[0].user_name, "anonymous");
    assert_eq!(rows[0].redacted_terms, json!([]));
    assert_eq!(rows[0].source_event, None);
}
