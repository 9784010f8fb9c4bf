//! Checkout Demo Backend
//!
//! Axum server that serves the demo storefront, brokers orders against the
//! upstream payment API, and relays browser telemetry to the OTel collector.

mod handlers;
mod metrics;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use checkout_core::{PaymentGateway, wire::CLIENT_ID_NOT_SET};
use checkout_gateway::RestGateway;
use checkout_telemetry::{OtelMetrics, OtelStageTracer, TelemetryConfig, TelemetryShim, init_telemetry};

use crate::handlers::{
    capture_order, create_order, get_client_id, health_check, proxy_metrics, proxy_traces,
};
use crate::metrics::ServerMetrics;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize telemetry (tracing subscriber + OTLP export)
    let telemetry_config = TelemetryConfig::from_env();
    let collector_base = telemetry_config.collector_endpoint.clone();
    let _telemetry = init_telemetry(telemetry_config)?;

    // Initialize the payment gateway
    let gateway = RestGateway::from_env().ok();
    let client_id = gateway
        .as_ref()
        .map_or_else(|| CLIENT_ID_NOT_SET.to_string(), |g| g.client_id().to_string());

    if gateway.is_some() {
        tracing::info!("✓ Payment gateway configured");
    } else {
        tracing::warn!("⚠ Payment gateway not configured - payments disabled");
        tracing::warn!("  Set PAYPAL_CLIENT_ID and PAYPAL_CLIENT_SECRET in .env");
    }

    // Build application state
    let state = AppState {
        gateway: gateway.map(|g| Arc::new(g) as Arc<dyn PaymentGateway>),
        client_id,
        shim: TelemetryShim::new(Arc::new(OtelMetrics::new("checkout-server"))),
        tracer: Arc::new(OtelStageTracer::new("checkout-server")),
        metrics: ServerMetrics::new(),
        http: reqwest::Client::new(),
        collector_base,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & configuration
        .route("/health", get(health_check))
        .route("/clientid", get(get_client_id))

        // Payment API
        .route("/orders", post(create_order))
        .route("/capture/{order_id}", post(capture_order))

        // Browser telemetry relay
        .route("/proxy/v1/traces", post(proxy_traces))
        .route("/proxy/v1/metrics", post(proxy_metrics))

        // Static storefront pages
        .nest_service("/", tower_http::services::ServeDir::new("static"))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 checkout backend running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health           - Health check");
    tracing::info!("  GET  /clientid         - Payment SDK client id");
    tracing::info!("  POST /orders           - Create order");
    tracing::info!("  POST /capture/:id      - Capture order");
    tracing::info!("  POST /proxy/v1/traces  - Browser span relay");
    tracing::info!("  POST /proxy/v1/metrics - Browser metric relay");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
