//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::parking_lots::{self, AvailabilityDto};
use super::modules::request_id::request_id_middleware;
use super::modules::reservations::{self, ReservationAppState};
use crate::application::ReservationService;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        reservations::create_reservation,
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::update_status,
        reservations::cancel_reservation,
        reservations::record_payment,
        reservations::recalculate_cost,
        reservations::list_transactions,
        parking_lots::lot_availability,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            reservations::CreateReservationRequest,
            reservations::UpdateStatusRequest,
            reservations::CancelReservationRequest,
            reservations::ReservationDto,
            reservations::ReservationDetailsDto,
            reservations::LotSummaryDto,
            reservations::VehicleSummaryDto,
            reservations::DriverSummaryDto,
            reservations::TransactionDto,
            reservations::PaymentResponse,
            AvailabilityDto,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and storage health"),
        (name = "Reservations", description = "Booking, status lifecycle, payment and refunds"),
        (name = "Parking Lots", description = "Lot occupancy derived from active reservations"),
    ),
    info(
        title = "Parking Reservations API",
        version = "1.0.0",
        description = "Reservation lifecycle for transport companies and parking-lot operators",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the full router. `db` is only used by the health probe.
pub fn create_api_router(
    service: Arc<ReservationService>,
    db: Option<DatabaseConnection>,
    prometheus: PrometheusHandle,
) -> Router {
    let reservation_state = ReservationAppState { service };

    let reservation_routes = Router::new()
        .route(
            "/api/v1/reservations",
            post(reservations::create_reservation).get(reservations::list_reservations),
        )
        .route("/api/v1/reservations/{id}", get(reservations::get_reservation))
        .route("/api/v1/reservations/{id}/status", put(reservations::update_status))
        .route("/api/v1/reservations/{id}/cancel", put(reservations::cancel_reservation))
        .route("/api/v1/reservations/{id}/payment", put(reservations::record_payment))
        .route("/api/v1/reservations/{id}/recalculate", put(reservations::recalculate_cost))
        .route("/api/v1/reservations/{id}/transactions", get(reservations::list_transactions))
        .route(
            "/api/v1/parking-lots/{id}/availability",
            get(parking_lots::lot_availability),
        )
        .with_state(reservation_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(MetricsState { handle: prometheus });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(reservation_routes)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::create_event_bus;
    use crate::infrastructure::storage::fixtures::{tomorrow_at, Fixture};

    struct TestApp {
        fx: Fixture,
        router: Router,
    }

    async fn app() -> TestApp {
        let fx = Fixture::new().await;
        let service = Arc::new(ReservationService::new(fx.provider(), create_event_bus()));
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let router = create_api_router(service, None, handle);
        TestApp { fx, router }
    }

    fn carrier_headers(fx: &Fixture, builder: axum::http::request::Builder) -> axum::http::request::Builder {
        builder
            .header("x-actor-role", "TRANSPORTADORA")
            .header("x-company-id", fx.carrier.id.to_string())
    }

    fn operator_headers(fx: &Fixture, builder: axum::http::request::Builder) -> axum::http::request::Builder {
        builder
            .header("x-actor-role", "ESTACIONAMENTO")
            .header("x-company-id", fx.operator.id.to_string())
    }

    fn booking(fx: &Fixture, from: u32, to: u32) -> Value {
        json!({
            "parking_lot_id": fx.lot.id,
            "parking_space_id": fx.spaces[0].id,
            "company_id": fx.carrier.id,
            "vehicle_id": fx.vehicle.id,
            "driver_id": fx.driver.id,
            "start_time": tomorrow_at(from),
            "end_time": tomorrow_at(to),
        })
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(builder: axum::http::request::Builder, body: &Value) -> Request<Body> {
        builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn create(app: &TestApp, from: u32, to: u32) -> (StatusCode, Value) {
        let builder = carrier_headers(&app.fx, Request::post("/api/v1/reservations"));
        send(&app.router, json_request(builder, &booking(&app.fx, from, to))).await
    }

    #[tokio::test]
    async fn create_returns_201_with_server_computed_cost() {
        let app = app().await;
        let (status, body) = create(&app, 10, 12).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "PENDING");
        assert_eq!(body["data"]["payment_status"], "PENDING");
        assert_eq!(body["data"]["total_cost"], "30.00");
    }

    #[tokio::test]
    async fn overlapping_booking_is_409() {
        let app = app().await;
        assert_eq!(create(&app, 10, 12).await.0, StatusCode::CREATED);

        let (status, body) = create(&app, 11, 13).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);

        assert_eq!(create(&app, 12, 13).await.0, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn inverted_window_is_400() {
        let app = app().await;
        assert_eq!(create(&app, 12, 10).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_role_header_is_401() {
        let app = app().await;
        let req = json_request(Request::post("/api/v1/reservations"), &booking(&app.fx, 10, 12));
        assert_eq!(send(&app.router, req).await.0, StatusCode::UNAUTHORIZED);

        let req = json_request(
            Request::post("/api/v1/reservations").header("x-actor-role", "DRIVER"),
            &booking(&app.fx, 10, 12),
        );
        assert_eq!(send(&app.router, req).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn status_changes_follow_role_and_table() {
        let app = app().await;
        let id = create(&app, 10, 12).await.1["data"]["id"].as_i64().unwrap();
        let uri = format!("/api/v1/reservations/{}/status", id);

        let req = json_request(carrier_headers(&app.fx, Request::put(&uri)), &json!({"status": "CONFIRMED"}));
        assert_eq!(send(&app.router, req).await.0, StatusCode::FORBIDDEN);

        let req = json_request(operator_headers(&app.fx, Request::put(&uri)), &json!({"status": "COMPLETED"}));
        assert_eq!(send(&app.router, req).await.0, StatusCode::CONFLICT);

        let req = json_request(operator_headers(&app.fx, Request::put(&uri)), &json!({"status": "CONFIRMED"}));
        let (status, body) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "CONFIRMED");

        let req = json_request(operator_headers(&app.fx, Request::put(&uri)), &json!({"status": "ARRIVED"}));
        assert_eq!(send(&app.router, req).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cancel_records_reason() {
        let app = app().await;
        let id = create(&app, 10, 12).await.1["data"]["id"].as_i64().unwrap();

        let req = json_request(
            carrier_headers(&app.fx, Request::put(format!("/api/v1/reservations/{}/cancel", id))),
            &json!({"reason": "route changed"}),
        );
        let (status, body) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "CANCELLED");
        assert_eq!(body["data"]["cancellation_reason"], "route changed");
    }

    #[tokio::test]
    async fn details_include_lot_vehicle_and_driver() {
        let app = app().await;
        let id = create(&app, 10, 12).await.1["data"]["id"].as_i64().unwrap();

        let req = Request::get(format!("/api/v1/reservations/{}", id)).body(Body::empty()).unwrap();
        let (status, body) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id);
        assert_eq!(body["data"]["parking_lot"]["name"], "Central Yard");
        assert_eq!(body["data"]["parking_lot"]["space_number"], "S1");
        assert_eq!(body["data"]["vehicle"]["license_plate"], "ABC1D23");
        assert_eq!(body["data"]["driver"]["name"], "João Silva");

        let req = Request::get("/api/v1/reservations/9999").body(Body::empty()).unwrap();
        assert_eq!(send(&app.router, req).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let app = app().await;
        create(&app, 10, 12).await;

        let req = Request::get("/api/v1/reservations?status=PENDING").body(Body::empty()).unwrap();
        let (status, body) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let req = Request::get("/api/v1/reservations?status=CONFIRMED").body(Body::empty()).unwrap();
        assert_eq!(send(&app.router, req).await.1["data"].as_array().unwrap().len(), 0);

        let req = Request::get("/api/v1/reservations?status=bogus").body(Body::empty()).unwrap();
        assert_eq!(send(&app.router, req).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn payment_then_transactions() {
        let app = app().await;
        let id = create(&app, 10, 12).await.1["data"]["id"].as_i64().unwrap();

        let req = carrier_headers(&app.fx, Request::put(format!("/api/v1/reservations/{}/payment", id)))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["reservation"]["payment_status"], "PAID");
        assert_eq!(body["data"]["transaction"]["amount"], "30.00");

        let req = Request::get(format!("/api/v1/reservations/{}/transactions", id))
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&app.router, req).await;
        assert_eq!(body["data"][0]["transaction_type"], "PAYMENT");
    }

    #[tokio::test]
    async fn availability_and_health_and_metrics() {
        let app = app().await;

        let req = Request::get(format!("/api/v1/parking-lots/{}/availability", app.fx.lot.id))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_spaces"], 2);
        assert_eq!(body["data"]["available_spaces"], 2);

        let req = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"]["backend"], "memory");

        let resp = app
            .router
            .clone()
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let app = app().await;
        let req = Request::get("/health")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()["x-request-id"], "abc-123");
    }
}
