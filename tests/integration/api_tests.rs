//! API integration tests, driving the router in-process over a memory store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use sales_visits_server::{
    api::create_router,
    repository::{
        store::{KeyValueStore, MemoryStore},
        Repository,
    },
    services::Services,
    AppConfig, AppState,
};

async fn app_with_store(store: Arc<dyn KeyValueStore>) -> Router {
    let config = AppConfig::default();
    let services = Services::new(Repository::new(store), config.auth.clone())
        .await
        .expect("Failed to create services");

    create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn app() -> Router {
    app_with_store(Arc::new(MemoryStore::default())).await
}

const LOGIN: &str = "/api/v1/auth/login";
const VISITS: &str = "/api/v1/visits";

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(token), None).await
}

async fn put(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

async fn post_login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let credentials = json!({ "username": username, "password": password });
    send(app, Method::POST, LOGIN, None, Some(credentials)).await
}

/// Helper to log in and return the bearer token
async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = post_login(app, username, password).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("No token in response").to_string()
}

async fn post_visit(app: &Router, token: &str, visit: Value) -> (StatusCode, Value) {
    send(app, Method::POST, VISITS, Some(token), Some(visit)).await
}

async fn create(app: &Router, token: &str, visit: Value) -> Value {
    let (status, body) = post_visit(app, token, visit).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("Expected an array")
        .iter()
        .map(|v| v["id"].as_i64().expect("No visit ID"))
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_login() {
    let app = app().await;

    let (status, body) = post_login(&app, "admin", "admin123").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password").is_none());

    let token = body["token"].as_str().unwrap();
    let (status, me) = get(&app, "/api/v1/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Administrador");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = app().await;

    let (status, body) = post_login(&app, "admin", "nope").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");
    assert_eq!(body["message"], "Invalid username or password");

    let (status, _) = post_login(&app, "", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unauthorized_access() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/api/v1/visits", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/v1/visits", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_visit_lifecycle_and_roles() {
    let app = app().await;
    let admin = login(&app, "admin", "admin123").await;
    let juan = login(&app, "vendedor", "vendedor123").await;

    let visit = json!({
        "date": "2024-01-05", "type": "physical", "client": "Talleres Norte",
        "vendor": "Ana", "manager": "Marta", "division": "Recambios"
    });
    create(&app, &admin, visit).await;

    let visit = json!({
        "date": "2024-02-10", "type": "online", "client": "Garaje Sur",
        "vendor": "Ben", "manager": "Pablo"
    });
    create(&app, &admin, visit).await;

    let visit = json!({
        "date": "2024-03-01", "type": "whatsapp", "client": "Talleres Oeste",
        "vendor": "Ana", "manager": "Marta",
        "details": { "subject": "Oferta", "requestedProducts": ["pastillas"] }
    });
    let own = create(&app, &juan, visit).await;
    assert_eq!(own["id"], 3);
    assert_eq!(own["vendor"], "Juan Pérez");
    assert_eq!(own["status"], "Pending");
    assert_eq!(own["details"]["requestedProducts"][0], "pastillas");

    let (_, all) = get(&app, "/api/v1/visits", &admin).await;
    assert_eq!(ids(&all), vec![1, 2, 3]);

    let (_, mine) = get(&app, "/api/v1/visits", &juan).await;
    assert_eq!(ids(&mine), vec![3]);

    // Criteria never widen a salesperson's view
    let (_, mine) = get(&app, "/api/v1/visits?vendor=ana", &juan).await;
    assert!(ids(&mine).is_empty());

    let (status, _) = get(&app, "/api/v1/visits/1", &juan).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, detail) = get(&app, "/api/v1/visits/1", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["division"], "Recambios");
}

#[tokio::test]
async fn test_filters() {
    let app = app().await;
    let admin = login(&app, "admin", "admin123").await;

    for (date, vendor, client) in [
        ("2024-01-05", "Ana", "Talleres Norte"),
        ("2024-02-10", "Ben", "Garaje Sur"),
        ("2024-02-20", "Ana", "Garaje Este"),
    ] {
        let visit = json!({ "date": date, "type": "phone", "client": client, "vendor": vendor });
        create(&app, &admin, visit).await;
    }

    let (_, body) = get(&app, "/api/v1/visits?dateFrom=2024-02-01", &admin).await;
    assert_eq!(ids(&body), vec![2, 3]);

    let uri = "/api/v1/visits?vendor=ANA&client=&manager=&dateFrom=&dateTo=2024-02-20";
    let (_, body) = get(&app, uri, &admin).await;
    assert_eq!(ids(&body), vec![1, 3]);

    let (status, body) = get(&app, "/api/v1/visits?dateTo=yesterday", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_create_requires_fields() {
    let app = app().await;
    let admin = login(&app, "admin", "admin123").await;

    let visit = json!({ "date": "2024-01-05", "client": "Talleres Norte", "vendor": "Ana" });
    let (status, body) = post_visit(&app, &admin, visit).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let visit = json!({
        "date": "2024-01-05", "type": "", "client": "Talleres Norte", "vendor": "Ana"
    });
    let (status, body) = post_visit(&app, &admin, visit).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_suggestions_and_stats() {
    let app = app().await;
    let admin = login(&app, "admin", "admin123").await;

    for (vendor, client, visit_type) in [
        ("Ana López", "Talleres Norte", "physical"),
        ("Ben Ruiz", "Garaje Sur", "whatsapp"),
        ("Juana Gil", "Talleres Norte", "whatsapp"),
    ] {
        let visit = json!({
            "date": "2024-01-05", "type": visit_type, "client": client,
            "vendor": vendor, "manager": "Marta"
        });
        create(&app, &admin, visit).await;
    }

    let (_, body) = get(&app, "/api/v1/visits/suggestions", &admin).await;
    assert_eq!(body["vendors"], json!(["Ana López", "Ben Ruiz", "Juana Gil"]));
    assert_eq!(body["clients"], json!(["Talleres Norte", "Garaje Sur"]));
    assert_eq!(body["managers"], json!(["Marta"]));

    let (_, body) = get(&app, "/api/v1/visits/suggestions/vendor?q=ana%20l", &admin).await;
    assert_eq!(body, json!(["Ana López"]));
    let (_, body) = get(&app, "/api/v1/visits/suggestions/vendor?q=an", &admin).await;
    assert_eq!(body, json!(["Ana López", "Juana Gil"]));

    let (_, stats) = get(&app, "/api/v1/visits/stats", &admin).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["physical"], 1);
    assert_eq!(stats["whatsapp"], 2);
    assert_eq!(stats["pending"], 3);
}

#[tokio::test]
async fn test_unknown_suggestion_field_gets_json_error() {
    let app = app().await;
    let admin = login(&app, "admin", "admin123").await;

    let (status, body) = get(&app, "/api/v1/visits/suggestions/division?q=a", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["code"], 5);
    assert!(body["message"].as_str().unwrap().contains("vendor"));
}

#[tokio::test]
async fn test_replace_visits_admin_only() {
    let app = app().await;
    let admin = login(&app, "admin", "admin123").await;
    let juan = login(&app, "vendedor", "vendedor123").await;

    let import = json!([
        {
            "id": 10, "date": "2024-05-01", "type": "física", "client": "A",
            "vendor": "Juan Pérez", "status": "Completada"
        },
        { "id": 11, "date": "2024-05-02", "type": "online", "client": "B", "vendor": "Ana" }
    ]);

    let (status, _) = put(&app, "/api/v1/visits", &juan, import.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = put(&app, "/api/v1/visits", &admin, import).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (_, mine) = get(&app, "/api/v1/visits", &juan).await;
    assert_eq!(ids(&mine), vec![10]);
    assert_eq!(mine[0]["type"], "physical");
    assert_eq!(mine[0]["status"], "Completed");

    let visit = json!({ "date": "2024-05-03", "type": "phone", "client": "C" });
    let created = create(&app, &juan, visit).await;
    assert_eq!(created["id"], 3);
}

#[tokio::test]
async fn test_existing_records_are_kept() {
    let visits = json!([
        {
            "id": 1, "date": "2024-01-05", "type": "telefónica", "client": "Talleres Norte",
            "vendor": "Juan Pérez", "manager": "Marta", "division": "", "status": "Pendiente",
            "details": {
                "subject": "", "requestedProducts": [], "offeredProducts": [],
                "incidents": "", "additionalInfo": ""
            }
        },
        {
            "id": 2, "date": "2024-01-08", "type": "", "client": "Garaje Sur",
            "vendor": "Juan Pérez"
        }
    ]);
    let users = json!([
        {
            "id": 2, "username": "vendedor", "password": "vendedor123",
            "role": "vendedor", "name": "Juan Pérez"
        }
    ]);
    let store = Arc::new(MemoryStore::with_entries([
        ("visits", visits.to_string()),
        ("users", users.to_string()),
    ]));
    let app = app_with_store(store.clone()).await;

    // Plaintext password upgraded at startup
    let users = store.get("users").await.unwrap().unwrap();
    assert!(!users.contains("vendedor123"));

    let juan = login(&app, "vendedor", "vendedor123").await;
    let (_, mine) = get(&app, "/api/v1/visits", &juan).await;
    assert_eq!(ids(&mine), vec![1, 2]);
    assert_eq!(mine[1]["type"], "");

    // A blank-type row does not cost the earlier visits on the next append
    let visit = json!({ "date": "2024-01-09", "type": "online", "client": "Talleres Este" });
    let created = create(&app, &juan, visit).await;
    assert_eq!(created["id"], 3);
    let (_, mine) = get(&app, "/api/v1/visits", &juan).await;
    assert_eq!(ids(&mine), vec![1, 2, 3]);

    // Seed only happens when no user list exists
    let (status, _) = post_login(&app, "admin", "admin123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
