//! Checkout Component
//!
//! Owns the button-render lifecycle and the order-lifecycle calls. Each
//! stage runs inside a [`ScopedSpan`](checkout_telemetry::ScopedSpan) so the
//! span ends on every exit path,
//! and each terminal outcome is reported through the injected surface and
//! metrics sink.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use opentelemetry::KeyValue;

use checkout_core::wire::{CartItem, normalize_api_failure};
use checkout_core::{CheckoutError, Result};
use checkout_telemetry::{LogLevel, StageTracer, TelemetryShim};

use crate::backend::{ApiOutcome, CheckoutBackend};
use crate::flow::{Approval, ApproveAction, Cancellation, PaymentFlow};
use crate::sdk::SdkProvider;
use crate::stage::Stage;
use crate::surface::{ButtonStyle, Surface};

/// Fixed message shown when the buyer cancels. No retry is offered.
pub const CANCEL_MESSAGE: &str = "Checkout cancelled. No payment was taken.";

/// The fixed-shape demo cart sent with every create-order call.
pub fn demo_cart() -> Vec<CartItem> {
    vec![CartItem { id: "YOUR_PRODUCT_ID".into(), quantity: "1".into() }]
}

/// The checkout component. Wrap in an [`Arc`] so it can hand itself to the
/// SDK as the [`PaymentFlow`] implementation.
pub struct CheckoutComponent {
    backend: Arc<dyn CheckoutBackend>,
    sdk_provider: Arc<dyn SdkProvider>,
    surface: Arc<dyn Surface>,
    tracer: Arc<dyn StageTracer>,
    shim: TelemetryShim,
    stage: Mutex<Stage>,
}

impl CheckoutComponent {
    pub fn new(
        backend: Arc<dyn CheckoutBackend>,
        sdk_provider: Arc<dyn SdkProvider>,
        surface: Arc<dyn Surface>,
        tracer: Arc<dyn StageTracer>,
        shim: TelemetryShim,
    ) -> Self {
        Self {
            backend,
            sdk_provider,
            surface,
            tracer,
            shim,
            stage: Mutex::new(Stage::Idle),
        }
    }

    /// Current lifecycle stage.
    pub fn stage(&self) -> Stage {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: Stage) -> Result<()> {
        let mut stage = self.stage.lock().unwrap_or_else(PoisonError::into_inner);
        if !stage.can_transition(next) {
            return Err(CheckoutError::Callback(format!(
                "illegal stage transition {stage} -> {next}"
            )));
        }
        tracing::debug!(from = %stage, to = %next, "stage transition");
        *stage = next;
        Ok(())
    }

    fn force_stage(&self, next: Stage) {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Attach the component: fetch configuration, load the SDK, render the
    /// button. Idempotent — mounting again replaces the button.
    ///
    /// Configuration and SDK-load failures abort with the button unrendered
    /// and **no user-visible message**, matching the original page (see
    /// [`CheckoutError::is_silent`]).
    pub async fn mount(self: &Arc<Self>) -> Result<()> {
        let mut root = self.tracer.start_span("checkout.mount", None, vec![]);
        match self.mount_inner(&root.context()).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.shim.handle_error(&err, Some(&mut root), "mount", &[]);
                self.force_stage(Stage::Errored);
                Err(err)
            }
        }
    }

    async fn mount_inner(
        self: &Arc<Self>,
        parent: &Option<opentelemetry::trace::SpanContext>,
    ) -> Result<()> {
        let parent = parent.as_ref();

        self.transition(Stage::Configuring)?;
        let client_id = {
            let mut span = self.tracer.start_span(
                "checkout.configure",
                parent,
                vec![
                    KeyValue::new("http.method", "GET"),
                    KeyValue::new("url.path", "/clientid"),
                ],
            );
            match self.backend.fetch_client_id().await {
                Ok(response) => {
                    span.set_attribute(KeyValue::new(
                        "client_id_configured",
                        response.is_configured(),
                    ));
                    if !response.is_configured() {
                        tracing::warn!("payment client id is not configured; SDK load will fail");
                    }
                    response.clientid
                }
                Err(err) => {
                    span.record_error(&err);
                    return Err(err);
                }
            }
        };

        self.transition(Stage::SdkLoading)?;
        let sdk = {
            let mut span = self.tracer.start_span("checkout.load_sdk", parent, vec![]);
            match self.sdk_provider.get_or_load(&client_id).await {
                Ok((sdk, source)) => {
                    span.set_attribute(KeyValue::new("sdk.load_source", source.as_str()));
                    sdk
                }
                Err(err) => {
                    span.record_error(&err);
                    return Err(err);
                }
            }
        };

        self.transition(Stage::Rendering)?;
        {
            let mut span = self.tracer.start_span("checkout.render", parent, vec![]);
            self.surface.clear_button();
            let flow: Arc<dyn PaymentFlow> = Arc::clone(self) as Arc<dyn PaymentFlow>;
            if let Err(err) = sdk
                .render(self.surface.as_ref(), ButtonStyle::default(), flow)
                .await
            {
                span.record_error(&err);
                return Err(err);
            }
            span.set_attribute(KeyValue::new(
                "buttons.mounted",
                self.surface.mounted_buttons() as i64,
            ));
        }

        self.transition(Stage::AwaitingInteraction)?;
        Ok(())
    }
}

#[async_trait]
impl PaymentFlow for CheckoutComponent {
    async fn create_order(&self) -> Result<String> {
        let cart = demo_cart();
        let mut span = self.tracer.start_span(
            "checkout.create_order",
            None,
            vec![
                KeyValue::new("http.method", "POST"),
                KeyValue::new("url.path", "/orders"),
                KeyValue::new("cart.item_count", cart.len() as i64),
            ],
        );

        let outcome = match self.backend.create_order(&cart).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.shim.handle_error(&err, Some(&mut span), "create_order", &[]);
                return Err(err);
            }
        };
        span.set_attribute(KeyValue::new("http.status_code", i64::from(outcome.status())));

        match outcome {
            ApiOutcome::Success { resource, .. } if !resource.id.is_empty() => {
                span.set_attribute(KeyValue::new("order.id", resource.id.clone()));
                self.shim.log_with_trace(
                    LogLevel::Info,
                    "Order created",
                    Some(&span),
                    &[KeyValue::new("order.id", resource.id.clone())],
                );
                Ok(resource.id)
            }
            ApiOutcome::Success { .. } => {
                let err =
                    CheckoutError::OrderCreate("create response did not contain an order id".into());
                self.shim.handle_error(&err, Some(&mut span), "create_order", &[]);
                Err(err)
            }
            ApiOutcome::Failure { failure, .. } => {
                let err = CheckoutError::OrderCreate(normalize_api_failure(&failure));
                self.shim.handle_error(&err, Some(&mut span), "create_order", &[]);
                Err(err)
            }
        }
    }

    async fn on_approve(&self, approval: Approval) -> Result<ApproveAction> {
        self.transition(Stage::Capturing)?;
        let mut span = self.tracer.start_span(
            "checkout.capture",
            None,
            vec![
                KeyValue::new("http.method", "POST"),
                KeyValue::new("url.path", format!("/capture/{}", approval.order_id)),
                KeyValue::new("order.id", approval.order_id.clone()),
            ],
        );

        let outcome = match self.backend.capture_order(&approval.order_id).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.shim.handle_error(&err, Some(&mut span), "capture", &[]);
                return Err(err);
            }
        };
        span.set_attribute(KeyValue::new("http.status_code", i64::from(outcome.status())));

        match outcome {
            ApiOutcome::Failure { failure, .. } if failure.is_instrument_declined() => {
                span.set_attribute(KeyValue::new("capture.declined", true));
                self.transition(Stage::DeclinedRetry)?;
                self.transition(Stage::AwaitingInteraction)?;
                self.shim.log_with_trace(
                    LogLevel::Warn,
                    "Instrument declined; restarting payment flow",
                    Some(&span),
                    &[KeyValue::new("order.id", approval.order_id.clone())],
                );
                Ok(ApproveAction::Restart)
            }
            ApiOutcome::Failure { failure, .. } => {
                let err = CheckoutError::Capture(normalize_api_failure(&failure));
                self.shim.handle_error(
                    &err,
                    Some(&mut span),
                    "capture",
                    &[KeyValue::new("order.id", approval.order_id.clone())],
                );
                Err(err)
            }
            ApiOutcome::Success { resource, .. } => match resource.settled_payment() {
                Some(payment) => {
                    span.set_attribute(KeyValue::new("capture.status", payment.status.clone()));
                    span.set_attribute(KeyValue::new("transaction.id", payment.id.clone()));
                    if let Some(amount) = &payment.amount {
                        span.set_attribute(KeyValue::new("capture.amount", amount.value.clone()));
                        span.set_attribute(KeyValue::new(
                            "capture.currency",
                            amount.currency_code.clone(),
                        ));
                    }
                    self.transition(Stage::Completed)?;
                    self.surface
                        .show_message(&format!("Transaction {}: {}", payment.status, payment.id));
                    self.shim.log_with_trace(
                        LogLevel::Info,
                        "Order captured",
                        Some(&span),
                        &[
                            KeyValue::new("order.id", approval.order_id.clone()),
                            KeyValue::new("transaction.id", payment.id.clone()),
                        ],
                    );
                    Ok(ApproveAction::Completed)
                }
                None => {
                    let err = CheckoutError::Capture(
                        "capture response did not contain a capture or authorization".into(),
                    );
                    self.shim.handle_error(
                        &err,
                        Some(&mut span),
                        "capture",
                        &[KeyValue::new("order.id", approval.order_id.clone())],
                    );
                    Err(err)
                }
            },
        }
    }

    async fn on_cancel(&self, cancellation: Cancellation) {
        let mut span = self.tracer.start_span("checkout.cancel", None, vec![]);
        if let Some(order_id) = &cancellation.order_id {
            span.set_attribute(KeyValue::new("order.id", order_id.clone()));
        }
        if let Err(err) = self.transition(Stage::Cancelled) {
            tracing::warn!(error = %err, "cancel outside awaiting state");
        }
        self.surface.show_message(CANCEL_MESSAGE);
        self.shim
            .log_with_trace(LogLevel::Info, "Checkout cancelled", Some(&span), &[]);
    }

    async fn on_error(&self, message: &str) {
        let mut span = self.tracer.start_span("checkout.error", None, vec![]);
        let err = CheckoutError::Callback(message.to_string());
        self.shim.handle_error(&err, Some(&mut span), "on_error", &[]);
        // The error hook terminates the attempt wherever it originated.
        self.force_stage(Stage::Errored);
        self.surface.show_message(message);
    }
}
