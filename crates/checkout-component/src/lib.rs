//! # checkout-component
//!
//! The checkout button lifecycle as a headless state machine:
//!
//! ```text
//! idle → configuring → sdk_loading → rendering → awaiting_interaction
//!          → { capturing → completed
//!            | declined_retry → awaiting_interaction
//!            | cancelled
//!            | errored }
//! ```
//!
//! Mounting fetches the client configuration, loads (or reuses) the payment
//! SDK, and renders the button; the SDK then drives the component back
//! through the four [`PaymentFlow`] hooks. Every stage runs inside a scoped
//! span that closes on every exit path.
//!
//! All collaborators are injected: the backend over [`CheckoutBackend`], the
//! SDK over [`SdkProvider`], the page over [`Surface`], counters over the
//! metrics sink inside [`TelemetryShim`](checkout_telemetry::TelemetryShim).
//! Single-threaded, cooperative: nothing here spawns, and in-flight network
//! calls carry no timeout of their own.

mod backend;
mod component;
mod flow;
mod sdk;
mod stage;
mod surface;

pub use backend::{ApiOutcome, CheckoutBackend, HttpBackend};
pub use component::{CANCEL_MESSAGE, CheckoutComponent, demo_cart};
pub use flow::{Approval, ApproveAction, Cancellation, PaymentFlow};
pub use sdk::{CachingSdkProvider, PaymentSdk, SdkLoader, SdkProvider, SdkSource};
pub use stage::Stage;
pub use surface::{ButtonColor, ButtonLayout, ButtonShape, ButtonStyle, RecordingSurface, Surface};
