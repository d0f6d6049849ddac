mod common;

use std::sync::Arc;

use common::*;
use concepter_application::state::CONCEPTS_LOADING_KEY;
use concepter_core::concept::{ConceptFilters, ConceptStatus, CreateConceptRequest};
use concepter_core::http::{HttpRequest, HttpResponse, Method, StatusCode};
use concepter_core::user::UpdateUserRequest;
use concepter_infrastructure::storage::MemoryMedium;
use serde_json::{Value, json};

const TOKEN: &str = "mock-token-resources";

fn concept_json(id: &str, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "status": status,
        "tags": [],
        "version": 1,
        "userId": "u-1",
        "eventDate": "2026-05-01"
    })
}

/// A small in-memory concepts backend.
fn concepts_server() -> FakeTransport {
    FakeTransport::new(|request: &HttpRequest| {
        let url = request.url.as_str();
        match request.method {
            Method::GET if url.contains("/api/concepts?") || url.ends_with("/api/concepts") => {
                ok(json!({
                    "content": [concept_json("c-1", "Summit", "DRAFT"), concept_json("c-2", "Gala", "COMPLETED")],
                    "totalElements": 2,
                    "totalPages": 1
                }))
            }
            Method::GET if url.ends_with("/api/concepts/c-1") => {
                ok(concept_json("c-1", "Summit", "DRAFT"))
            }
            Method::POST if url.ends_with("/api/concepts") => {
                let title = request.body.as_ref().unwrap()["title"].clone();
                ok(concept_json("c-3", title.as_str().unwrap(), "DRAFT"))
            }
            Method::PUT if url.ends_with("/api/concepts/c-1") => {
                let body = request.body.clone().unwrap();
                let status = body["status"].as_str().unwrap_or("DRAFT");
                let title = body["title"].as_str().unwrap_or("Summit");
                ok(concept_json("c-1", title, status))
            }
            Method::DELETE if url.contains("/api/concepts/c-") => {
                Ok(HttpResponse::new(StatusCode::NO_CONTENT, Vec::new()))
            }
            Method::GET if url.ends_with("/api/users/profile") => ok(user_json("demo@concepter.com")),
            Method::PUT if url.ends_with("/api/users/profile") => {
                let mut user = user_json("demo@concepter.com");
                user["firstName"] = request.body.as_ref().unwrap()["firstName"].clone();
                ok(user)
            }
            _ => fail(request, 404),
        }
    })
}

fn signed_in() -> Harness {
    let medium = Arc::new(MemoryMedium::new());
    seed_session(&medium, Some(TOKEN), Some("r"), Some("demo@concepter.com"));
    Harness::with_medium(concepts_server(), medium)
}

#[tokio::test]
async fn test_list_sends_filters_and_bearer() {
    let harness = signed_in();
    let filters = ConceptFilters {
        status: Some(ConceptStatus::InProgress),
        page: Some(1),
        limit: Some(20),
    };

    let page = harness.context.concepts.list(&filters).await.unwrap();

    assert_eq!(page.total_elements, 2);
    assert_eq!(page.content[0].details["eventDate"], "2026-05-01");

    let sent = &harness.transport.requests()[0];
    assert_eq!(
        sent.url,
        format!("{}/api/concepts?page=1&size=20&status=IN_PROGRESS", BASE_URL)
    );
    assert_eq!(sent.authorization(), Some(bearer(TOKEN).as_str()));
}

#[tokio::test]
async fn test_lazy_load_fetches_once_through_pipeline() {
    let harness = signed_in();
    let state = &harness.context.state;

    for _ in 0..3 {
        assert!(state.concepts().is_empty());
    }
    assert!(state.snapshot().is_loading(CONCEPTS_LOADING_KEY));

    let loaded = state.wait_until(|s| s.concepts_loaded).await;

    assert_eq!(loaded.concepts.len(), 2);
    assert_eq!(harness.transport.requests_to("/api/concepts").len(), 1);
    assert!(!loaded.is_loading(CONCEPTS_LOADING_KEY));
}

#[tokio::test]
async fn test_get_sets_current_concept() {
    let harness = signed_in();

    let concept = harness.context.concepts.get("c-1").await.unwrap();

    assert_eq!(
        harness.context.state.snapshot().current_concept,
        Some(concept)
    );
}

#[tokio::test]
async fn test_create_update_and_archive_keep_state_in_step() {
    let harness = signed_in();
    let state = &harness.context.state;
    let concepts = &harness.context.concepts;

    state.set_concepts(Vec::new());
    let created = concepts
        .create(&CreateConceptRequest {
            title: "Launch".to_string(),
            description: "Product launch".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(state.snapshot().concepts, vec![created]);

    let current = concepts.get("c-1").await.unwrap();
    state.add_concept(current);

    let archived = concepts.archive("c-1").await.unwrap();
    assert_eq!(archived.status, ConceptStatus::Archived);
    let snapshot = state.snapshot();
    assert_eq!(snapshot.current_concept.as_ref().unwrap().status, ConceptStatus::Archived);
    assert_eq!(snapshot.concepts[1].status, ConceptStatus::Archived);

    let put = harness.transport.requests_to("/api/concepts/c-1").pop().unwrap();
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.body, Some(json!({ "status": "ARCHIVED" })));

    let restored = concepts.unarchive("c-1").await.unwrap();
    assert_eq!(restored.status, ConceptStatus::Draft);
}

#[tokio::test]
async fn test_delete_removes_concept() {
    let harness = signed_in();
    let state = &harness.context.state;
    let current = harness.context.concepts.get("c-1").await.unwrap();
    state.set_concepts(vec![current]);

    harness.context.concepts.delete("c-1", true).await.unwrap();

    let snapshot = state.snapshot();
    assert!(snapshot.concepts.is_empty());
    assert!(snapshot.current_concept.is_none());

    let delete = harness.transport.requests().pop().unwrap();
    assert_eq!(delete.method, Method::DELETE);
    assert!(delete.url.ends_with("/api/concepts/c-1?permanent=true"));
}

#[tokio::test]
async fn test_missing_concept_publishes_not_found() {
    let harness = signed_in();

    let err = harness.context.concepts.get("missing").await.unwrap_err();

    assert_eq!(err.http_status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(
        harness.context.state.snapshot().error.as_deref(),
        Some("Resource not found.")
    );
}

#[tokio::test]
async fn test_profile_round_trip_updates_stored_user() {
    let harness = signed_in();
    let profile = &harness.context.profile;

    let user = profile.get_profile().await.unwrap();
    assert_eq!(user.email, "demo@concepter.com");

    let updated = profile
        .update_profile(&UpdateUserRequest {
            first_name: Some("Renamed".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Renamed");
    assert_eq!(
        harness.context.session.current_user().unwrap().first_name,
        "Renamed"
    );
    assert_eq!(
        harness.context.state.snapshot().user.as_ref().unwrap().first_name,
        "Renamed"
    );
}

#[tokio::test]
async fn test_delete_cannot_smuggle_query_through_id() {
    let harness = signed_in();

    harness
        .context
        .concepts
        .delete("c-9?permanent=true", false)
        .await
        .unwrap();

    let delete = harness.transport.requests().pop().unwrap();
    assert_eq!(delete.method, Method::DELETE);
    assert_eq!(
        delete.url,
        format!("{}/api/concepts/c-9%3Fpermanent=true", BASE_URL)
    );
}
