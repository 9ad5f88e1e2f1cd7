use axum::{
    body::Body,
    extract::Request,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, dashboard, health, notification, payment, property, tenant, unit, visitor};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/user", get(auth::current_user))

        // Registry
        .route("/api/v1/properties", get(property::list_properties).post(property::create_property))
        .route("/api/v1/properties/{id}", get(property::get_property).put(property::update_property).delete(property::delete_property))
        .route("/api/v1/units", get(unit::list_units).post(unit::create_unit))
        .route("/api/v1/units/{id}", get(unit::get_unit).put(unit::update_unit).delete(unit::delete_unit))

        // Tenancies
        .route("/api/v1/tenants", get(tenant::list_tenants).post(tenant::create_tenant))
        .route("/api/v1/tenants/me", get(tenant::my_tenancy))
        .route("/api/v1/tenants/{id}", get(tenant::get_tenant).put(tenant::update_tenant).delete(tenant::delete_tenant))

        // Ledger
        .route("/api/v1/payments", get(payment::list_payments).post(payment::create_payment))
        .route("/api/v1/payments/{id}", get(payment::get_payment).put(payment::update_payment).delete(payment::delete_payment))

        // Visitors & Notifications
        .route("/api/v1/visitors", get(visitor::list_visitors).post(visitor::create_visitor))
        .route("/api/v1/visitors/{id}", get(visitor::get_visitor).delete(visitor::delete_visitor))
        .route("/api/v1/notifications", get(notification::list_notifications).post(notification::create_notification))
        .route("/api/v1/notifications/{id}/mark-read", patch(notification::mark_read))

        .route("/api/v1/dashboard-stats", get(dashboard::dashboard_stats))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
