use axum::body::Body;
use billing_server::api::build_app;
use billing_server::auth::permissions::get_default_permissions;
use billing_server::db::Repositories;
use billing_server::{Config, ServerState};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn state() -> ServerState {
    let state = ServerState::with_repositories(Config::default(), Repositories::in_memory());
    state.categories.seed_defaults().await.unwrap();
    state
}

fn token(state: &ServerState, role: &str) -> String {
    state
        .jwt_service
        .generate_token("1", role, role, &get_default_permissions(role))
        .unwrap()
}

async fn send(
    state: &ServerState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = build_app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn default_category(state: &ServerState, token: &str) -> i64 {
    let (status, categories) = send(state, "GET", "/api/customer-categories", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Usuario Final")
        .and_then(|c| c["id"].as_i64())
        .unwrap()
}

fn customer_body(category_id: i64) -> Value {
    json!({
        "people": {
            "firstName": "Juan",
            "lastName": "Pérez",
            "rucCi": "0102030405",
            "mainEmail": "juan@example.com"
        },
        "customerCategoryId": category_id
    })
}

#[tokio::test]
async fn health_is_public() {
    let state = state().await;
    let (status, body) = send(&state, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_token() {
    let state = state().await;
    let (status, _) = send(&state, "GET", "/api/customers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&state, "GET", "/api/customers", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_customer_then_conflict_body() {
    let state = state().await;
    let admin = token(&state, "admin");
    let category_id = default_category(&state, &admin).await;

    let (status, created) = send(
        &state,
        "POST",
        "/api/customers",
        Some(&admin),
        Some(customer_body(category_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["loyaltyPoints"], 0);
    assert_eq!(created["active"], true);

    let (status, conflict) = send(
        &state,
        "POST",
        "/api/customers",
        Some(&admin),
        Some(customer_body(category_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["statusCode"], 409);
    assert_eq!(conflict["error"], "Customer Already Exists");
    assert_eq!(conflict["code"], 3002);
    assert_eq!(conflict["data"]["existingCustomer"], true);
    assert_eq!(conflict["data"]["customer"]["id"], created["id"]);
    assert_eq!(conflict["data"]["people"]["rucCi"], "0102030405");
    assert_eq!(conflict["data"]["customerCategory"]["name"], "Usuario Final");
}

#[tokio::test]
async fn points_overdraw_maps_to_422() {
    let state = state().await;
    let admin = token(&state, "admin");
    let category_id = default_category(&state, &admin).await;
    let (_, created) = send(
        &state,
        "POST",
        "/api/customers",
        Some(&admin),
        Some(customer_body(category_id)),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/customers/{id}/points");

    let (status, customer) = send(&state, "PUT", &uri, Some(&admin), Some(json!({"points": 30}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(customer["loyaltyPoints"], 30);

    let (status, error) = send(&state, "PUT", &uri, Some(&admin), Some(json!({"points": -50}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["details"]["current"], 30);

    let (_, detail) = send(&state, "GET", &format!("/api/customers/{id}"), Some(&admin), None).await;
    assert_eq!(detail["loyaltyPoints"], 30);
    assert_eq!(detail["loyaltyTransactions"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn write_routes_check_permissions() {
    let state = state().await;
    let cashier = token(&state, "cashier");

    // Cashiers manage customers but not the reward catalog or tiers
    let (status, _) = send(
        &state,
        "POST",
        "/api/rewards",
        Some(&cashier),
        Some(json!({"name": "Café", "rewardType": "DISCOUNT", "pointsCost": 10, "discountValue": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&state, "DELETE", "/api/customer-categories/1", Some(&cashier), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reads stay open to any authenticated user
    let (status, rewards) = send(&state, "GET", "/api/rewards/available", Some(&cashier), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(rewards.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_customer_is_404() {
    let state = state().await;
    let admin = token(&state, "admin");
    let (status, body) = send(&state, "GET", "/api/customers/424242", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3001);
}

#[tokio::test]
async fn readiness_reads_the_store() {
    let state = state().await;
    let (status, body) = send(&state, "GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}
