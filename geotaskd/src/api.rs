//! HTTP API for the GeoTask daemon.
//!
//! Provides REST endpoints for:
//! - Health check
//! - Status (courier and visible orders)
//! - Move courier

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

use geotask_domain::CourierStatus;

use crate::facade::CourierFacade;

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState {
    pub facade: Arc<dyn CourierFacade>,
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Request to move the courier.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: i32,
    pub zoom: i32,
}

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/move", post(move_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Courier and the orders around it.
async fn status_handler(State(state): State<Arc<ApiState>>) -> Json<CourierStatus> {
    Json(state.facade.get_status().await)
}

/// Move the courier. Always accepted; failures only show up in the logs.
async fn move_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<MoveRequest>,
) -> StatusCode {
    // An all-zero body carries no move.
    if request.direction == 0 && request.zoom == 0 {
        debug!("Ignoring empty move request");
        return StatusCode::ACCEPTED;
    }

    state.facade.move_courier(request.direction, request.zoom).await;
    StatusCode::ACCEPTED
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::CourierFacadeService;
    use crate::orders::{OrderLifecycle, OrderService};
    use crate::tracker::{CourierService, CourierTracker};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use geotask_domain::{Order, Point};
    use geotask_store::{CourierStorage, MemoryStore, OrderStorage};
    use geotask_zone::{ZoneGuard, ZoneSet};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        tracker: Arc<dyn CourierTracker>,
        orders: Arc<dyn OrderLifecycle>,
    }

    fn create_test_app() -> TestApp {
        let store = Arc::new(MemoryStore::new());
        let zones = Arc::new(ZoneSet::operational_area());
        let tracker: Arc<dyn CourierTracker> = Arc::new(CourierService::new(
            Arc::new(CourierStorage::new(store.clone())),
            zones.clone(),
        ));
        let orders: Arc<dyn OrderLifecycle> = Arc::new(OrderService::new(
            Arc::new(OrderStorage::new(store)),
            zones,
            Duration::from_secs(120),
        ));
        let facade = Arc::new(CourierFacadeService::new(tracker.clone(), orders.clone(), 2800.0));

        TestApp {
            router: create_router(Arc::new(ApiState { facade })),
            tracker,
            orders,
        }
    }

    fn move_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/move")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(health.status, "healthy");
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_test_app();
        let courier = app.tracker.get_courier().await.unwrap();
        let order = Order::new(1, 2000.0, 300.0, courier.location, Utc::now());
        app.orders.save(&order).await.unwrap();

        let response = app
            .router
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["courier"]["score"], 0);
        assert_eq!(json["orders"][0]["id"], 1);
        assert_eq!(json["orders"][0]["deliveryPrice"], 300.0);
        assert_eq!(json["orders"][0]["isDelivered"], false);
    }

    #[tokio::test]
    async fn test_move_endpoint_moves_courier() {
        let app = create_test_app();
        let before = app.tracker.get_courier().await.unwrap();

        let response = app
            .router
            .oneshot(move_request(r#"{"direction":3,"zoom":14}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let after = app.tracker.get_courier().await.unwrap();
        assert!((after.location.lng - (before.location.lng + 0.001)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_move_endpoint_ignores_zero_body() {
        let app = create_test_app();
        let before = app.tracker.get_courier().await.unwrap();

        let response = app
            .router
            .oneshot(move_request(r#"{"direction":0,"zoom":0}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(app.tracker.get_courier().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_move_endpoint_invalid_direction_still_accepted() {
        let app = create_test_app();
        let before = app.tracker.get_courier().await.unwrap();

        let response = app
            .router
            .oneshot(move_request(r#"{"direction":7,"zoom":14}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(app.tracker.get_courier().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_move_endpoint_lowest_zoom_keeps_courier_in_area() {
        let app = create_test_app();

        let response = app
            .router
            .oneshot(move_request(r#"{"direction":0,"zoom":-2147483648}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let courier = app.tracker.get_courier().await.unwrap();
        assert!(courier.location.is_finite());
        assert!(ZoneSet::operational_area().is_allowed(courier.location));
    }

    #[tokio::test]
    async fn test_move_endpoint_rejects_malformed_body() {
        let app = create_test_app();

        let response = app.router.oneshot(move_request(r#"{"direction":"up"}"#)).await.unwrap();

        assert!(response.status().is_client_error());
    }

    #[test]
    fn test_point_serialization_shape() {
        let json = serde_json::to_value(Point::new(1.5, 2.5)).unwrap();
        assert_eq!(json, serde_json::json!({"lat": 1.5, "lng": 2.5}));
    }
}
