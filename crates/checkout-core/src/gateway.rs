//! Upstream Payment Gateway Seam

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::wire::OrderResource;

/// Strategy trait for the upstream payment provider.
///
/// Implement this per provider; the server works exclusively through this
/// interface, which keeps handlers testable with a stub.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order with intent CAPTURE for the given amount.
    async fn create_order(
        &self,
        amount: &str,
        currency: &str,
    ) -> Result<OrderResource, GatewayError>;

    /// Capture an approved order.
    async fn capture_order(&self, order_id: &str) -> Result<OrderResource, GatewayError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
