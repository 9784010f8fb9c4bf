//! HTTP Handlers
//!
//! The backend collaborator contract the checkout component speaks:
//! configuration, order create, order capture, plus health and the
//! telemetry proxy routes for browser-side spans.

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::Json;
use opentelemetry::KeyValue;
use serde::Serialize;

use checkout_core::GatewayError;
use checkout_core::wire::{ClientIdResponse, CreateOrderRequest, OrderResource};
use checkout_telemetry::LogLevel;

use crate::state::AppState;

/// Demo order amount.
// TODO: derive the amount from the cart contents
const ORDER_AMOUNT: &str = "100";
const ORDER_CURRENCY: &str = "USD";

const PROXY_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: f64,
    pub otel_endpoint: String,
    pub gateway_configured: bool,
}

#[derive(Serialize)]
pub struct ProxyAck {
    pub status: &'static str,
    pub target_status: u16,
    pub message: String,
}

type ErrorReply = (StatusCode, Json<serde_json::Value>);

fn error_reply(status: StatusCode, error: &str, code: &str) -> ErrorReply {
    (status, Json(serde_json::json!({ "error": error, "code": code })))
}

/// Forward upstream failure bodies verbatim with their status so the
/// component sees the `details`/`debug_id` shape (and can restart on a
/// declined instrument). Everything else degrades to a 500.
fn gateway_error_reply(error: GatewayError) -> ErrorReply {
    match error {
        GatewayError::Api { status, failure } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(serde_json::to_value(&failure).unwrap_or_default()),
        ),
        other => error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            &other.to_string(),
            "GATEWAY_ERROR",
        ),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /clientid` — the public credential for the payment SDK.
pub async fn get_client_id(State(state): State<AppState>) -> Json<ClientIdResponse> {
    let start = Instant::now();
    let mut span = state.tracer.start_span(
        "get_clientid",
        None,
        vec![
            KeyValue::new("endpoint", "/clientid"),
            KeyValue::new("http.method", "GET"),
        ],
    );
    state.metrics.request("/clientid", "GET");

    let response = ClientIdResponse { clientid: state.client_id.clone() };
    span.set_attribute(KeyValue::new("client_id_configured", response.is_configured()));
    state.shim.log_with_trace(
        LogLevel::Info,
        "Fetched client id configuration",
        Some(&span),
        &[KeyValue::new("configured", response.is_configured())],
    );

    state
        .metrics
        .duration("/clientid", "success", start.elapsed().as_secs_f64());
    Json(response)
}

/// `POST /orders` — create an upstream order from the cart payload.
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderResource>, ErrorReply> {
    let start = Instant::now();
    let mut span = state.tracer.start_span(
        "create_order",
        None,
        vec![
            KeyValue::new("endpoint", "/orders"),
            KeyValue::new("http.method", "POST"),
            KeyValue::new("cart.item_count", payload.cart.len() as i64),
            KeyValue::new("order.amount", ORDER_AMOUNT),
            KeyValue::new("order.currency", ORDER_CURRENCY),
        ],
    );
    state.metrics.request("/orders", "POST");

    let gateway = state.gateway.as_ref().ok_or_else(|| {
        error_reply(
            StatusCode::SERVICE_UNAVAILABLE,
            "Payments not configured",
            "PAYMENTS_DISABLED",
        )
    })?;

    match gateway.create_order(ORDER_AMOUNT, ORDER_CURRENCY).await {
        Ok(order) => {
            span.set_attribute(KeyValue::new("order.id", order.id.clone()));
            state.metrics.order("created");
            state.shim.log_with_trace(
                LogLevel::Info,
                "Order created",
                Some(&span),
                &[KeyValue::new("order.id", order.id.clone())],
            );
            state
                .metrics
                .duration("/orders", "success", start.elapsed().as_secs_f64());
            Ok(Json(order))
        }
        Err(err) => {
            state.shim.handle_error(&err, Some(&mut span), "create_order", &[]);
            state.metrics.error("/orders");
            state.metrics.order("failed");
            state
                .metrics
                .duration("/orders", "error", start.elapsed().as_secs_f64());
            Err(gateway_error_reply(err))
        }
    }
}

/// `POST /capture/{order_id}` — capture an approved upstream order.
pub async fn capture_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResource>, ErrorReply> {
    let start = Instant::now();
    let mut span = state.tracer.start_span(
        "capture_order",
        None,
        vec![
            KeyValue::new("endpoint", "/capture"),
            KeyValue::new("http.method", "POST"),
            KeyValue::new("order.id", order_id.clone()),
        ],
    );
    state.metrics.request("/capture", "POST");

    let gateway = state.gateway.as_ref().ok_or_else(|| {
        error_reply(
            StatusCode::SERVICE_UNAVAILABLE,
            "Payments not configured",
            "PAYMENTS_DISABLED",
        )
    })?;

    match gateway.capture_order(&order_id).await {
        Ok(order) => {
            if let Some(payment) = order.settled_payment() {
                span.set_attribute(KeyValue::new("capture.status", payment.status.clone()));
                span.set_attribute(KeyValue::new("transaction.id", payment.id.clone()));
                if let Some(amount) = &payment.amount {
                    span.set_attribute(KeyValue::new("capture.amount", amount.value.clone()));
                }
            }
            state.metrics.order("captured");
            state.shim.log_with_trace(
                LogLevel::Info,
                "Order captured",
                Some(&span),
                &[KeyValue::new("order.id", order_id.clone())],
            );
            state
                .metrics
                .duration("/capture", "success", start.elapsed().as_secs_f64());
            Ok(Json(order))
        }
        Err(err) => {
            state.shim.handle_error(
                &err,
                Some(&mut span),
                "capture_order",
                &[KeyValue::new("order.id", order_id.clone())],
            );
            state.metrics.error("/capture");
            state.metrics.order("capture_failed");
            state
                .metrics
                .duration("/capture", "error", start.elapsed().as_secs_f64());
            Err(gateway_error_reply(err))
        }
    }
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut span = state.tracer.start_span("health_check", None, vec![]);
    span.set_attribute(KeyValue::new("health.status", "ok"));
    tracing::info!("Health check requested");

    Json(HealthResponse {
        status: "healthy",
        service: "checkout-backend",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
        otel_endpoint: state.collector_base.clone(),
        gateway_configured: state.gateway.is_some(),
    })
}

/// `POST /proxy/v1/traces` — forward browser spans to the collector.
pub async fn proxy_traces(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ProxyAck>, ErrorReply> {
    forward_signal(&state, "traces", &headers, body).await
}

/// `POST /proxy/v1/metrics` — forward browser metrics to the collector.
pub async fn proxy_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ProxyAck>, ErrorReply> {
    forward_signal(&state, "metrics", &headers, body).await
}

/// CORS workaround: the page cannot post OTLP to the collector directly, so
/// the backend relays the payload untouched.
async fn forward_signal(
    state: &AppState,
    signal: &'static str,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Json<ProxyAck>, ErrorReply> {
    let mut span = state.tracer.start_span(
        "proxy_telemetry",
        None,
        vec![
            KeyValue::new("proxy.type", signal),
            KeyValue::new("proxy.target", "otel_collector"),
        ],
    );

    let url = format!("{}/v1/{signal}", state.collector_base.trim_end_matches('/'));
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    let response = state
        .http
        .post(url)
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .timeout(PROXY_TIMEOUT)
        .send()
        .await
        .map_err(|err| {
            span.set_attribute(KeyValue::new("proxy.error", err.to_string()));
            tracing::error!(signal, error = %err, "Error proxying telemetry");
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Proxy error: {err}"),
                "PROXY_ERROR",
            )
        })?;

    let target_status = response.status().as_u16();
    span.set_attribute(KeyValue::new("proxy.status_code", i64::from(target_status)));
    tracing::info!(signal, target_status, "Proxied telemetry request");

    Ok(Json(ProxyAck {
        status: "forwarded",
        target_status,
        message: format!("{signal} forwarded to OTel collector"),
    }))
}
