//! Payment Flow Hooks
//!
//! The four SDK callbacks as one explicit capability instead of ad-hoc
//! closures: the SDK renders the button and calls back through this trait
//! when the buyer interacts.

use async_trait::async_trait;

use checkout_core::CheckoutError;

/// Data the SDK passes when the buyer approves the order.
#[derive(Clone, Debug, Default)]
pub struct Approval {
    pub order_id: String,
}

/// Data the SDK passes when the buyer dismisses the flow.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    pub order_id: Option<String>,
}

/// Instruction back to the SDK after the approve hook ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApproveAction {
    /// Terminal success; the result message is already on the page.
    Completed,
    /// Funding source declined; the SDK restarts the payment flow.
    Restart,
}

/// The component-facing side of the payment SDK contract.
#[async_trait]
pub trait PaymentFlow: Send + Sync {
    /// Create an order; resolves with the upstream order id. A failure here
    /// surfaces through the SDK's own cancel/retry UI, not the page.
    async fn create_order(&self) -> Result<String, CheckoutError>;

    /// Capture the approved order. `Restart` means try again, not an error.
    async fn on_approve(&self, approval: Approval) -> Result<ApproveAction, CheckoutError>;

    /// Buyer dismissed the flow. Terminal, no retry.
    async fn on_cancel(&self, cancellation: Cancellation);

    /// The SDK reported an error. Terminal for the current attempt; the raw
    /// message is shown to the user.
    async fn on_error(&self, message: &str);
}
