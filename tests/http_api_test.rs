mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{setup, tenant, TestApp};
use serde_json::{json, Value};
use std::sync::Arc;
use stockflow_api::{api_v1_routes, auth::TenantContext, config::AppConfig, handlers, AppState};
use tower::ServiceExt;
use uuid::Uuid;

fn test_router(app: &TestApp) -> Router {
    let config = Arc::new(AppConfig::new(
        "sqlite::memory:".into(),
        "127.0.0.1".into(),
        0,
        "test".into(),
    ));
    let state = AppState::new(app.db.clone(), config, app.event_sender.clone());
    Router::new()
        .merge(handlers::health::router())
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
}

fn request(method: &str, uri: &str, ctx: &TenantContext, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-tenant-id", ctx.tenant_id.to_string())
        .header("x-user-id", ctx.user_id.to_string());
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = setup().await;
    let router = test_router(&app);

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_tenant_header_is_a_bad_request() {
    let app = setup().await;
    let router = test_router(&app);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/inventory")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("x-tenant-id"));
}

#[tokio::test]
async fn receive_then_read_inventory_over_http() {
    let app = setup().await;
    let router = test_router(&app);
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/inventory/receive",
            &ctx,
            Some(json!({
                "item_id": item,
                "location_id": location,
                "quantity": 25
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/v1/inventory/{}/{}", item, location);
    let response = router
        .oneshot(request("GET", &uri, &ctx, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["quantity"], 25);
    assert_eq!(body["data"]["available_quantity"], 25);
}

#[tokio::test]
async fn unknown_inventory_record_is_not_found() {
    let app = setup().await;
    let router = test_router(&app);
    let ctx = tenant();

    let uri = format!("/api/v1/inventory/{}/{}", Uuid::new_v4(), Uuid::new_v4());
    let response = router
        .oneshot(request("GET", &uri, &ctx, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transfer_workflow_over_http() {
    let app = setup().await;
    let router = test_router(&app);
    let ctx = tenant();
    let item = Uuid::new_v4();
    let source = Uuid::new_v4();
    let destination = Uuid::new_v4();

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/inventory/receive",
            &ctx,
            Some(json!({
                "item_id": item,
                "location_id": source,
                "quantity": 100
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/transfers",
            &ctx,
            Some(json!({
                "from_location_id": source,
                "to_location_id": destination,
                "lines": [{ "item_id": item, "quantity": 30 }]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "DRAFT");
    let transfer_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/transfers/{}/approve", transfer_id),
            &ctx,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/transfers/{}/complete", transfer_id),
            &ctx,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "COMPLETED");

    // Cancelling a completed transfer is a state conflict.
    let response = router
        .oneshot(request(
            "POST",
            &format!("/api/v1/transfers/{}/cancel", transfer_id),
            &ctx,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn insufficient_stock_maps_to_unprocessable_entity() {
    let app = setup().await;
    let router = test_router(&app);
    let ctx = tenant();

    let response = router
        .oneshot(request(
            "POST",
            "/api/v1/transfers",
            &ctx,
            Some(json!({
                "from_location_id": Uuid::new_v4(),
                "to_location_id": Uuid::new_v4(),
                "lines": [{ "item_id": Uuid::new_v4(), "quantity": 5 }]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn sales_order_lifecycle_over_http() {
    let app = setup().await;
    let router = test_router(&app);
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();

    router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/inventory/receive",
            &ctx,
            Some(json!({
                "item_id": item,
                "location_id": location,
                "quantity": 10
            })),
        ))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/sales-orders",
            &ctx,
            Some(json!({
                "location_id": location,
                "lines": [{ "item_id": item, "quantity": 3 }]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/inventory/{}/{}", item, location);
    let response = router
        .clone()
        .oneshot(request("GET", &uri, &ctx, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["quantity"], 7);

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/sales-orders/{}/cancel", order_id),
            &ctx,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(request("GET", &uri, &ctx, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["quantity"], 10);
}

#[tokio::test]
async fn validation_failures_map_to_bad_request() {
    let app = setup().await;
    let router = test_router(&app);
    let ctx = tenant();

    let response = router
        .oneshot(request(
            "POST",
            "/api/v1/sales-orders",
            &ctx,
            Some(json!({
                "location_id": Uuid::new_v4(),
                "lines": []
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
