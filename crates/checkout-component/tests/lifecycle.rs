//! End-to-end lifecycle tests against stubbed collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use checkout_component::{
    ApiOutcome, Approval, ApproveAction, CANCEL_MESSAGE, Cancellation, CheckoutBackend,
    CheckoutComponent, PaymentFlow, PaymentSdk, RecordingSurface, SdkLoader, SdkProvider,
    SdkSource, Stage, Surface,
};
use checkout_core::wire::{ApiFailure, CartItem, ClientIdResponse, OrderResource};
use checkout_core::{CheckoutError, CountingMetrics, Result};
use checkout_telemetry::{CountingTracer, TelemetryShim};

struct StubBackend {
    clientid: String,
    clientid_fails: bool,
    create: Option<ApiOutcome>,
    capture: Option<ApiOutcome>,
    capture_calls: AtomicUsize,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self {
            clientid: "AaBbCc123".into(),
            clientid_fails: false,
            create: None,
            capture: None,
            capture_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CheckoutBackend for StubBackend {
    async fn fetch_client_id(&self) -> Result<ClientIdResponse> {
        if self.clientid_fails {
            return Err(CheckoutError::ConfigFetch("clientid endpoint returned 503".into()));
        }
        Ok(ClientIdResponse { clientid: self.clientid.clone() })
    }

    async fn create_order(&self, _cart: &[CartItem]) -> Result<ApiOutcome> {
        self.create
            .clone()
            .ok_or_else(|| CheckoutError::Transport("no create response configured".into()))
    }

    async fn capture_order(&self, _order_id: &str) -> Result<ApiOutcome> {
        self.capture_calls.fetch_add(1, Ordering::Relaxed);
        self.capture
            .clone()
            .ok_or_else(|| CheckoutError::Transport("no capture response configured".into()))
    }
}

struct StubSdk;

#[async_trait]
impl PaymentSdk for StubSdk {
    async fn render(
        &self,
        surface: &dyn Surface,
        style: checkout_component::ButtonStyle,
        _flow: Arc<dyn PaymentFlow>,
    ) -> Result<()> {
        surface.mount_button(style);
        Ok(())
    }
}

struct StubLoader;

#[async_trait]
impl SdkLoader for StubLoader {
    async fn load(&self, _client_id: &str) -> Result<Arc<dyn PaymentSdk>> {
        Ok(Arc::new(StubSdk))
    }
}

struct FailingLoader;

#[async_trait]
impl SdkLoader for FailingLoader {
    async fn load(&self, _client_id: &str) -> Result<Arc<dyn PaymentSdk>> {
        Err(CheckoutError::SdkLoad("script rejected".into()))
    }
}

struct Harness {
    component: Arc<CheckoutComponent>,
    backend: Arc<StubBackend>,
    surface: Arc<RecordingSurface>,
    tracer: Arc<CountingTracer>,
    metrics: Arc<CountingMetrics>,
}

fn harness(backend: StubBackend) -> Harness {
    harness_with_loader(backend, Arc::new(StubLoader))
}

fn harness_with_loader(backend: StubBackend, loader: Arc<dyn SdkLoader>) -> Harness {
    let backend = Arc::new(backend);
    let surface = Arc::new(RecordingSurface::new());
    let tracer = Arc::new(CountingTracer::new());
    let metrics = Arc::new(CountingMetrics::new());
    let shim = TelemetryShim::new(metrics.clone());
    let provider = Arc::new(checkout_component::CachingSdkProvider::new(loader));
    let component = Arc::new(CheckoutComponent::new(
        backend.clone(),
        provider,
        surface.clone(),
        tracer.clone(),
        shim,
    ));
    Harness { component, backend, surface, tracer, metrics }
}

fn order_created(id: &str) -> ApiOutcome {
    ApiOutcome::Success {
        status: 201,
        resource: serde_json::from_value(serde_json::json!({ "id": id }))
            .expect("order resource parses"),
    }
}

fn capture_completed() -> ApiOutcome {
    let resource: OrderResource = serde_json::from_value(serde_json::json!({
        "id": "O1",
        "purchase_units": [{
            "payments": {
                "captures": [{
                    "id": "C1",
                    "status": "COMPLETED",
                    "amount": { "value": "10.00", "currency_code": "USD" }
                }]
            }
        }]
    }))
    .expect("capture resource parses");
    ApiOutcome::Success { status: 201, resource }
}

fn failure(status: u16, issue: &str, description: &str, debug_id: &str) -> ApiOutcome {
    let failure: ApiFailure = serde_json::from_value(serde_json::json!({
        "details": [{ "issue": issue, "description": description }],
        "debug_id": debug_id,
    }))
    .expect("failure body parses");
    ApiOutcome::Failure { status, failure }
}

#[tokio::test]
async fn create_order_resolves_with_id_and_counts_one_action() {
    let h = harness(StubBackend {
        create: Some(order_created("5O190127TN364715T")),
        ..StubBackend::default()
    });
    h.component.mount().await.expect("mount succeeds");

    let actions_before = h.metrics.actions();
    let id = h.component.create_order().await.expect("order created");

    assert_eq!(id, "5O190127TN364715T");
    assert_eq!(h.metrics.actions() - actions_before, 1);
    assert_eq!(h.metrics.errors(), 0);
}

#[tokio::test]
async fn instrument_declined_restarts_instead_of_erroring() {
    let h = harness(StubBackend {
        create: Some(order_created("O1")),
        capture: Some(failure(422, "INSTRUMENT_DECLINED", "Instrument declined", "D9")),
        ..StubBackend::default()
    });
    h.component.mount().await.expect("mount succeeds");

    let action = h
        .component
        .on_approve(Approval { order_id: "O1".into() })
        .await
        .expect("declined instrument is not an error");

    assert_eq!(action, ApproveAction::Restart);
    assert_eq!(h.component.stage(), Stage::AwaitingInteraction);
}

#[tokio::test]
async fn spans_balance_across_success_and_failure_lifecycles() {
    // Success cycle.
    let h = harness(StubBackend {
        create: Some(order_created("O1")),
        capture: Some(capture_completed()),
        ..StubBackend::default()
    });
    h.component.mount().await.expect("mount succeeds");
    h.component.create_order().await.expect("order created");
    h.component
        .on_approve(Approval { order_id: "O1".into() })
        .await
        .expect("capture succeeds");
    assert_eq!(h.tracer.started(), h.tracer.ended());
    assert!(h.tracer.started() > 0);

    // Failure cycle: create fails, capture fails, then cancel and error hooks.
    let h = harness(StubBackend {
        create: Some(failure(422, "X", "Y", "D1")),
        capture: Some(failure(500, "INTERNAL_ERROR", "boom", "D2")),
        ..StubBackend::default()
    });
    h.component.mount().await.expect("mount succeeds");
    let _ = h.component.create_order().await;
    let _ = h.component.on_approve(Approval { order_id: "O1".into() }).await;
    h.component.on_error("capture blew up").await;
    assert_eq!(h.tracer.started(), h.tracer.ended());

    // Config-fetch failure cycle.
    let h = harness(StubBackend { clientid_fails: true, ..StubBackend::default() });
    let _ = h.component.mount().await;
    assert_eq!(h.tracer.started(), h.tracer.ended());
}

#[tokio::test]
async fn mounting_twice_leaves_one_button() {
    let h = harness(StubBackend::default());
    h.component.mount().await.expect("first mount");
    h.component.mount().await.expect("second mount");
    assert_eq!(h.surface.mounted_buttons(), 1);
}

#[tokio::test]
async fn capture_success_message_contains_status_and_id() {
    let h = harness(StubBackend {
        create: Some(order_created("O1")),
        capture: Some(capture_completed()),
        ..StubBackend::default()
    });
    h.component.mount().await.expect("mount succeeds");

    let action = h
        .component
        .on_approve(Approval { order_id: "O1".into() })
        .await
        .expect("capture succeeds");

    assert_eq!(action, ApproveAction::Completed);
    assert_eq!(h.component.stage(), Stage::Completed);
    let message = h.surface.last_message().expect("result message shown");
    assert!(message.contains("COMPLETED"), "message: {message}");
    assert!(message.contains("C1"), "message: {message}");
}

#[tokio::test]
async fn create_failure_surfaces_issue_description_and_debug_id() {
    let h = harness(StubBackend {
        create: Some(failure(422, "X", "Y", "D1")),
        ..StubBackend::default()
    });
    h.component.mount().await.expect("mount succeeds");

    let err = h.component.create_order().await.expect_err("create fails");
    let message = err.to_string();
    assert!(message.contains('X'), "message: {message}");
    assert!(message.contains('Y'), "message: {message}");
    assert!(message.contains("D1"), "message: {message}");
    assert_eq!(h.metrics.errors(), 1);
}

#[tokio::test]
async fn missing_order_id_is_normalized_into_an_error() {
    let h = harness(StubBackend {
        create: Some(ApiOutcome::Success { status: 200, resource: OrderResource::default() }),
        ..StubBackend::default()
    });
    h.component.mount().await.expect("mount succeeds");

    let err = h.component.create_order().await.expect_err("create fails");
    assert!(matches!(err, CheckoutError::OrderCreate(_)));
}

#[tokio::test]
async fn cancel_shows_fixed_message_and_never_captures() {
    let h = harness(StubBackend {
        create: Some(order_created("O1")),
        ..StubBackend::default()
    });
    h.component.mount().await.expect("mount succeeds");

    h.component
        .on_cancel(Cancellation { order_id: Some("O1".into()) })
        .await;

    assert_eq!(h.surface.last_message().as_deref(), Some(CANCEL_MESSAGE));
    assert_eq!(h.backend.capture_calls.load(Ordering::Relaxed), 0);
    assert_eq!(h.component.stage(), Stage::Cancelled);
}

#[tokio::test]
async fn config_fetch_failure_is_silent_and_leaves_button_unrendered() {
    let h = harness(StubBackend { clientid_fails: true, ..StubBackend::default() });

    let err = h.component.mount().await.expect_err("mount aborts");
    assert!(matches!(err, CheckoutError::ConfigFetch(_)));
    assert!(err.is_silent());
    assert_eq!(h.surface.mounted_buttons(), 0);
    assert!(h.surface.messages().is_empty());
    assert_eq!(h.component.stage(), Stage::Errored);
}

#[tokio::test]
async fn sdk_load_failure_aborts_before_render() {
    let h = harness_with_loader(StubBackend::default(), Arc::new(FailingLoader));

    let err = h.component.mount().await.expect_err("mount aborts");
    assert!(matches!(err, CheckoutError::SdkLoad(_)));
    assert_eq!(h.surface.mounted_buttons(), 0);
    assert!(h.surface.messages().is_empty());
    assert_eq!(h.tracer.started(), h.tracer.ended());
}

#[tokio::test]
async fn capture_failure_error_hook_shows_raw_message() {
    let h = harness(StubBackend {
        create: Some(order_created("O1")),
        capture: Some(failure(500, "INTERNAL_ERROR", "boom", "D2")),
        ..StubBackend::default()
    });
    h.component.mount().await.expect("mount succeeds");

    let err = h
        .component
        .on_approve(Approval { order_id: "O1".into() })
        .await
        .expect_err("capture fails");

    // The SDK surfaces the failure back through the error hook.
    h.component.on_error(&err.to_string()).await;
    assert_eq!(h.component.stage(), Stage::Errored);
    let message = h.surface.last_message().expect("error message shown");
    assert!(message.contains("INTERNAL_ERROR"), "message: {message}");
}
