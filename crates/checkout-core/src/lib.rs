//! # checkout-core
//!
//! Shared foundation for the checkout demo: the order domain model, the wire
//! contracts spoken between the backend routes, the upstream payment
//! provider, and the checkout component, plus the seam traits the other
//! crates plug into.
//!
//! ## Seams
//!
//! - [`MetricsSink`] — injected counters so lifecycle code carries no hidden
//!   shared state.
//! - [`PaymentGateway`] — strategy trait for the upstream provider; the
//!   server works exclusively through it.
//!
//! ## Usage
//!
//! ```rust
//! use checkout_core::wire::{ApiFailure, ErrorDetail, normalize_api_failure};
//!
//! let failure = ApiFailure {
//!     details: vec![ErrorDetail {
//!         issue: "INVALID_REQUEST".into(),
//!         description: "Order amount malformed".into(),
//!     }],
//!     debug_id: Some("ab12cd".into()),
//! };
//! let message = normalize_api_failure(&failure);
//! assert!(message.contains("INVALID_REQUEST"));
//! ```

mod error;
mod gateway;
mod metrics;
mod order;
pub mod wire;

pub use error::{CheckoutError, GatewayError, Result};
pub use gateway::PaymentGateway;
pub use metrics::{CountingMetrics, MetricsSink, NoopMetrics};
pub use order::{Order, OrderStatus};
