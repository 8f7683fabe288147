#[path = "common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::fixtures::list_body;
use leadflow::auth::Credentials;
use leadflow::entity::{Entity, Lead, Property, Task};
use leadflow::error::LeadflowError;
use leadflow::remote::{CollectionClient, HttpClient, ListQuery};
use leadflow::store::{EntityStore, FetchOutcome, RequestState, StorePolicy};
use leadflow::toast::Notifications;
use leadflow::types::TaskStatus;

fn client(server: &MockServer, credentials: Credentials) -> HttpClient {
    HttpClient::new(&format!("{}/api", server.uri()), credentials, None).unwrap()
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_sends_page_limit_and_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .and(query_param("search", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(
            "leads",
            vec![json!({"id": "l-1", "name": "Alice", "email": "alice@acme.com"})],
            6,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery::default().page(2).limit(5).search("acme");
    let page = CollectionClient::<Lead>::list(&client(&server, Credentials::new()), &query)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Alice");
    assert_eq!(page.total, 6);
    assert_eq!(page.pagination.unwrap().total, 6);
}

#[tokio::test]
async fn test_list_tasks_defaults_status_to_all() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(query_param("status", "all"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(
            "tasks",
            vec![json!({"id": "t-1", "title": "Call Alice", "status": "in_progress"})],
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let page = CollectionClient::<Task>::list(
        &client(&server, Credentials::new()),
        &ListQuery::default().search("ignored"),
    )
    .await
    .unwrap();
    assert_eq!(page.items[0].status_kind(), Some(TaskStatus::InProgress));
}

#[tokio::test]
async fn test_list_with_unlisted_status_replaces_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(
            "leads",
            vec![
                json!({"id": "l-1", "name": "Alice", "email": "alice@acme.com", "status": "proposal"}),
                json!({"id": "l-2", "name": "Bob", "email": "bob@acme.com", "status": "Contacted"}),
            ],
            2,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let store: EntityStore<Lead> = EntityStore::new(
        Arc::new(client(&server, Credentials::new())),
        StorePolicy::default(),
        Notifications::new(),
    );
    let outcome = store.fetch(&ListQuery::default()).await.unwrap();

    assert_eq!(outcome, FetchOutcome::Applied);
    assert_eq!(store.request_state(), RequestState::Idle);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.items[0].status, "proposal");
    assert_eq!(snapshot.items[1].fields()["status"], "Contacted");
    assert!(store.notifications().is_empty());
}

#[tokio::test]
async fn test_list_without_pagination_block() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"properties": []})))
        .mount(&server)
        .await;

    let page = CollectionClient::<Property>::list(
        &client(&server, Credentials::new()),
        &ListQuery::default(),
    )
    .await
    .unwrap();
    assert!(page.items.is_empty());
    assert!(page.pagination.is_none());
    assert_eq!(page.total, 0);
}

// ============================================================================
// Credentials
// ============================================================================

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body("leads", vec![], 0)))
        .expect(1)
        .mount(&server)
        .await;

    CollectionClient::<Lead>::list(
        &client(&server, Credentials::with_token("tok-123")),
        &ListQuery::default(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_token_change_applies_to_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body("leads", vec![], 0)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})))
        .mount(&server)
        .await;

    let credentials = Credentials::new();
    let http = client(&server, credentials.clone());

    let first = CollectionClient::<Lead>::list(&http, &ListQuery::default()).await;
    assert!(matches!(first, Err(LeadflowError::Auth(ref m)) if m == "Not authenticated"));

    credentials.set("second");
    CollectionClient::<Lead>::list(&http, &ListQuery::default())
        .await
        .unwrap();
}

// ============================================================================
// Create / update / delete
// ============================================================================

#[tokio::test]
async fn test_create_posts_fields_and_returns_server_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/leads"))
        .and(body_json(json!({"name": "Bob", "email": "bob@example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "l-9",
            "name": "Bob",
            "email": "bob@example.com",
            "status": "new",
            "created_at": "2026-03-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created: Lead = client(&server, Credentials::new())
        .create(&fields(json!({"name": "Bob", "email": "bob@example.com"})))
        .await
        .unwrap();
    assert_eq!(created.id, "l-9");
    assert_eq!(created.created_at.as_deref(), Some("2026-03-01T10:00:00Z"));
}

#[tokio::test]
async fn test_update_puts_to_record_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/properties/p-1"))
        .and(body_json(json!({"price": 450000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p-1",
            "title": "Loft",
            "address": "1 Main St",
            "property_type": "apartment",
            "price": 450000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated: Property = client(&server, Credentials::new())
        .update("p-1", &fields(json!({"price": 450000})))
        .await
        .unwrap();
    assert_eq!(updated.price, Some(450000.0));
}

#[tokio::test]
async fn test_delete_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/t-3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = CollectionClient::<Task>::delete(&client(&server, Credentials::new()), "t-3")
        .await
        .unwrap();
    assert_eq!(deleted, "t-3");
}

// ============================================================================
// Error classification
// ============================================================================

#[tokio::test]
async fn test_server_detail_is_used_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/leads"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Email already registered"})),
        )
        .mount(&server)
        .await;

    let result: Result<Lead, _> = client(&server, Credentials::new())
        .create(&fields(json!({"name": "Bob", "email": "bob@example.com"})))
        .await;
    let error = result.unwrap_err();
    assert!(matches!(error, LeadflowError::Validation(_)));
    assert_eq!(error.user_message(), "Email already registered");
}

#[tokio::test]
async fn test_validation_list_detail_is_joined() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                {"loc": ["body", "title"], "msg": "field required"},
                {"loc": ["body", "due_date"], "msg": "invalid date"}
            ]
        })))
        .mount(&server)
        .await;

    let result: Result<Task, _> = client(&server, Credentials::new())
        .create(&fields(json!({})))
        .await;
    assert_eq!(
        result.unwrap_err().user_message(),
        "field required; invalid date"
    );
}

#[tokio::test]
async fn test_fallback_message_without_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let result =
        CollectionClient::<Lead>::list(&client(&server, Credentials::new()), &ListQuery::default())
            .await;
    match result {
        Err(LeadflowError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to fetch leads");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_success_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(201).set_body_string("ok"))
        .mount(&server)
        .await;

    let result: Result<Lead, _> = client(&server, Credentials::new())
        .create(&fields(json!({"name": "Bob", "email": "bob@example.com"})))
        .await;
    match result {
        Err(LeadflowError::Decode(message)) => assert_eq!(message, "Failed to create lead"),
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_list_item_fails_fetch_with_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(
            "tasks",
            vec![json!({"title": "no id"})],
            1,
        )))
        .mount(&server)
        .await;

    let notifications = Notifications::new();
    let store: EntityStore<Task> = EntityStore::new(
        Arc::new(client(&server, Credentials::new())),
        StorePolicy::default(),
        notifications.clone(),
    );
    let error = store.fetch(&ListQuery::default()).await.unwrap_err();

    assert_eq!(error.user_message(), "Failed to fetch tasks");
    assert_eq!(
        store.request_state(),
        RequestState::Error("Failed to fetch tasks".to_string())
    );
    assert_eq!(notifications.latest().unwrap().message, "Failed to fetch tasks");
}

#[tokio::test]
async fn test_not_found_on_update() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/leads/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Lead not found"})))
        .mount(&server)
        .await;

    let result: Result<Lead, _> = client(&server, Credentials::new())
        .update("missing", &fields(json!({"status": "won"})))
        .await;
    assert!(matches!(result, Err(LeadflowError::NotFound(ref m)) if m == "Lead not found"));
}

#[tokio::test]
async fn test_delete_failure_uses_delete_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/properties/p-1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result =
        CollectionClient::<Property>::delete(&client(&server, Credentials::new()), "p-1").await;
    assert_eq!(result.unwrap_err().user_message(), "Failed to delete property");
}

#[tokio::test]
async fn test_timeout_is_a_network_error_with_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body("tasks", vec![], 0))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let http = HttpClient::new(
        &format!("{}/api", server.uri()),
        Credentials::new(),
        Some(Duration::from_millis(100)),
    )
    .unwrap();
    let result = CollectionClient::<Task>::list(&http, &ListQuery::default()).await;
    match result {
        Err(LeadflowError::Network(message)) => assert_eq!(message, "Failed to fetch tasks"),
        other => panic!("expected a network error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    // Nothing listens on port 9 of the loopback interface.
    let http = HttpClient::new("http://127.0.0.1:9/api", Credentials::new(), None).unwrap();
    let result = CollectionClient::<Lead>::delete(&http, "l-1").await;
    assert!(matches!(result, Err(LeadflowError::Network(_))));
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_dashboard_stats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalLeads": 40,
            "totalProperties": 12,
            "totalTasks": 10,
            "completedTasks": 4,
            "leadConversionRate": 12.5,
            "monthlyGrowth": -2.0
        })))
        .mount(&server)
        .await;

    let stats = client(&server, Credentials::new())
        .dashboard_stats()
        .await
        .unwrap();
    assert_eq!(stats.total_leads, 40);
    assert_eq!(stats.task_completion_rate(), 40.0);
    assert_eq!(stats.monthly_growth, -2.0);
}

#[tokio::test]
async fn test_lead_analytics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "leadsByStatus": [{"name": "new", "value": 45}, {"name": "won", "value": 25}],
            "monthlyLeads": [{"month": "Jan", "leads": 65, "converted": 12}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analytics = client(&server, Credentials::new())
        .lead_analytics()
        .await
        .unwrap();
    assert_eq!(analytics.leads_by_status.len(), 2);
    assert_eq!(analytics.leads_by_status[0].name, "new");
    assert!(analytics.leads_by_source.is_empty());
    assert_eq!(analytics.monthly_leads[0].leads, 65.0);
}

#[tokio::test]
async fn test_property_analytics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "propertiesByType": [{"_id": "house", "count": 3}, {"_id": "apartment", "count": 5}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analytics = client(&server, Credentials::new())
        .property_analytics()
        .await
        .unwrap();
    assert_eq!(analytics.properties_by_type[1].name, "apartment");
    assert_eq!(analytics.properties_by_type[1].value, 5.0);
}

#[tokio::test]
async fn test_analytics_failures_use_their_own_fallbacks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/leads"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let http = client(&server, Credentials::new());
    assert_eq!(
        http.lead_analytics().await.unwrap_err().user_message(),
        "Failed to fetch lead analytics"
    );
    assert_eq!(
        http.property_analytics().await.unwrap_err().user_message(),
        "Failed to fetch property analytics"
    );
}
