//! Mock server tests for the espocrm library.
//!
//! These tests use wiremock to simulate an EspoCRM server and exercise the
//! client's behavior without requiring network access or real credentials.

use espocrm::{
    Config, Entity, Error, EspoClient, JsonValue, ListParams, ListResponse, Record, ServerUrl,
};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Helper to create a client pointed at a mock server.
fn mock_client(server: &MockServer) -> EspoClient {
    // For tests, we need to allow HTTP localhost
    let url = ServerUrl::new(server.uri()).unwrap();
    EspoClient::new(Config::new(url))
}

/// Matches requests that do NOT carry the given header.
struct NoHeader(&'static str);

impl wiremock::Match for NoHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key(self.0)
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/App/user/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t1",
            "refreshToken": "r1"
        })))
        .mount(server)
        .await;
}

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
    name: String,
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/App/user/auth"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "userName": "u",
            "password": "p"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t1",
            "refreshToken": "r1"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let session = client.login("u", "p").await.unwrap();

    assert_eq!(session.token().as_str(), "t1");
    assert_eq!(session.refresh_token().map(|t| t.as_str()), Some("r1"));
    assert!(session.expires_at().is_none());

    // The stored session matches the returned one
    assert_eq!(client.session().await.unwrap(), session);
}

#[tokio::test]
async fn test_login_parses_expiry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/App/user/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t1",
            "expireAt": "2026-12-31T23:59:59Z"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let session = client.login("u", "p").await.unwrap();

    assert_eq!(
        session.expires_at(),
        Some("2026-12-31T23:59:59Z".parse().unwrap())
    );
    assert!(session.refresh_token().is_none());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/App/user/auth"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let result = client.login("bad", "wrong").await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert!(client.session().await.is_none());
}

#[tokio::test]
async fn test_session_token_used_as_bearer() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 0,
            "list": []
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let result: ListResponse<Record> = client
        .list(&Entity::new("Account").unwrap(), &ListParams::default())
        .await
        .unwrap();

    assert_eq!(result.total, Some(0));
}

#[tokio::test]
async fn test_second_login_overwrites_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/App/user/auth"))
        .and(body_json(json!({"userName": "first", "password": "p"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t1"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/App/user/auth"))
        .and(body_json(json!({"userName": "second", "password": "p"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t2"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account"))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("first", "p").await.unwrap();
    client.login("second", "p").await.unwrap();

    assert_eq!(client.session().await.unwrap().token().as_str(), "t2");

    // The replacement token is what authenticates the next call
    let result: Result<ListResponse<Record>, _> = client
        .list(&Entity::new("Account").unwrap(), &ListParams::default())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_missing_auth_token_fails_before_any_request() {
    let server = MockServer::start().await;

    let client = mock_client(&server);
    let result: Result<ListResponse<Record>, _> = client
        .list(&Entity::new("Account").unwrap(), &ListParams::default())
        .await;

    assert!(matches!(result, Err(Error::MissingAuthToken)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_api_key_replaces_bearer_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account"))
        .and(header("x-api-key", "k1"))
        .and(NoHeader("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "list": [{"id": "1", "name": "Foo"}]
        })))
        .mount(&server)
        .await;

    let url = ServerUrl::new(server.uri()).unwrap();
    let client = EspoClient::new(Config::new(url).with_api_key("k1"));

    // No login needed with a static key
    let result: ListResponse<Account> = client
        .list(&Entity::new("Account").unwrap(), &ListParams::default())
        .await
        .unwrap();

    assert_eq!(result.total, Some(1));
    assert_eq!(result.list[0].name, "Foo");
}

// ============================================================================
// Entity Operation Tests
// ============================================================================

#[tokio::test]
async fn test_list_typed_records() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "list": [{"id": "1", "name": "Foo"}]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let result: ListResponse<Account> = client
        .list(&Entity::new("Account").unwrap(), &ListParams::default())
        .await
        .unwrap();

    assert_eq!(result.total, Some(1));
    assert_eq!(result.list[0].id, "1");
    assert_eq!(result.list[0].name, "Foo");
}

#[tokio::test]
async fn test_list_dynamic_records_with_params() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account"))
        .and(query_param("maxSize", "5"))
        .and(query_param("orderBy", "name"))
        .and(query_param("order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "list": [
                {"id": "1", "name": "Foo", "rating": 4},
                {"id": "2", "name": "Bar", "active": false}
            ]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let params = ListParams {
        max_size: Some(5),
        order_by: Some("name".to_string()),
        order: Some(espocrm::Order::Asc),
        ..ListParams::default()
    };
    let result: ListResponse<Record> = client
        .list(&Entity::new("Account").unwrap(), &params)
        .await
        .unwrap();

    assert_eq!(result.total, Some(2));
    assert_eq!(result.list[0].id.as_deref(), Some("1"));
    assert_eq!(result.list[0].get("rating"), Some(&JsonValue::Number(4.0)));
    assert_eq!(result.list[1].get("active"), Some(&JsonValue::Bool(false)));
}

#[tokio::test]
async fn test_fetch_with_select() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account/42"))
        .and(query_param("select", "name,industry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42",
            "_type": "Account",
            "name": "Test",
            "industry": "IT"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let record: Record = client
        .fetch(
            &Entity::new("Account").unwrap(),
            "42",
            Some(&["name", "industry"]),
        )
        .await
        .unwrap();

    assert_eq!(record.id.as_deref(), Some("42"));
    assert_eq!(record.entity_type.as_deref(), Some("Account"));
    assert_eq!(record.get("industry"), Some(&JsonValue::from("IT")));
}

#[tokio::test]
async fn test_create_record() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/Account"))
        .and(header("authorization", "Bearer t1"))
        .and(body_json(json!({"name": "New Account"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "99",
            "name": "New Account"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let created: Record = client
        .create(
            &Entity::new("Account").unwrap(),
            &json!({"name": "New Account"}),
        )
        .await
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("99"));
    assert_eq!(created.get("name"), Some(&JsonValue::from("New Account")));
}

#[tokio::test]
async fn test_update_record() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/Account/7"))
        .and(body_json(json!({"rating": 5.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "7",
            "rating": 5.0
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let mut changes = Record::new();
    changes.set("rating", 5.0).unwrap();

    let updated: Record = client
        .update(&Entity::new("Account").unwrap(), "7", &changes)
        .await
        .unwrap();

    assert_eq!(updated.get("rating"), Some(&JsonValue::Number(5.0)));
}

#[tokio::test]
async fn test_create_rejects_reserved_attribute_before_any_request() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let mut body = Record::new();
    body.attributes
        .insert("id".to_string(), JsonValue::from("sneaky"));

    let result: Result<Record, _> = client
        .create(&Entity::new("Account").unwrap(), &body)
        .await;

    assert!(matches!(result, Err(Error::Encoding(_))));
    // Only the login reached the server
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_unauthorized_status() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let result: Result<ListResponse<Record>, _> = client
        .list(&Entity::new("Account").unwrap(), &ListParams::default())
        .await;

    assert!(matches!(result, Err(Error::Unauthorized)));
}

#[tokio::test]
async fn test_http_status_carries_code_and_body() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("oops")
                .insert_header("content-type", "text/plain"),
        )
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let result: Result<ListResponse<Record>, _> = client
        .list(&Entity::new("Account").unwrap(), &ListParams::default())
        .await;

    match result {
        Err(Error::HttpStatus { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "oops");
        }
        other => panic!("expected HttpStatus error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mismatched_body_is_a_decoding_error() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12345,
            "name": "not a valid Account shape"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let result: Result<Account, _> = client
        .fetch(&Entity::new("Account").unwrap(), "1", None)
        .await;

    assert!(matches!(result, Err(Error::Decoding(_))));
}

#[tokio::test]
async fn test_malformed_json_body_is_a_decoding_error() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Account/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{not json")
                .insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.login("u", "p").await.unwrap();

    let result: Result<Record, _> = client
        .fetch(&Entity::new("Account").unwrap(), "1", None)
        .await;

    assert!(matches!(result, Err(Error::Decoding(_))));
}

#[tokio::test]
async fn test_unreachable_server_maps_to_status_minus_one() {
    // Unroutable port: the server is started then dropped
    let server = MockServer::start().await;
    let url = ServerUrl::new(server.uri()).unwrap();
    drop(server);

    let client = EspoClient::new(Config::new(url).with_api_key("k1"));
    let result: Result<ListResponse<Record>, _> = client
        .list(&Entity::new("Account").unwrap(), &ListParams::default())
        .await;

    match result {
        Err(Error::HttpStatus { status, .. }) => assert_eq!(status, -1),
        other => panic!("expected HttpStatus(-1), got {other:?}"),
    }
}
