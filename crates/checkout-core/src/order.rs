//! Order Domain Model

use serde::{Deserialize, Serialize};

/// Lifecycle status of one checkout attempt's order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created upstream, not yet finalized.
    Created,
    /// Funds captured; terminal.
    Captured,
    /// Funding source rejected; terminal for this order.
    Declined,
    /// Buyer dismissed the flow; terminal.
    Cancelled,
    /// Failed with an unrecoverable error; terminal.
    Errored,
}

impl OrderStatus {
    /// Whether the order can change state again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Created)
    }
}

/// An order as seen by this demo.
///
/// The identifier is opaque and assigned by the payment backend. Orders are
/// never persisted locally; one `Order` lives for the duration of a single
/// checkout attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    /// Upstream-assigned identifier.
    pub id: String,

    /// Amount as the provider's decimal string (e.g. "100.00").
    pub amount: String,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Current lifecycle status.
    pub status: OrderStatus,
}

impl Order {
    /// A freshly created order, before capture.
    pub fn created(id: impl Into<String>, amount: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            amount: amount.into(),
            currency: currency.into(),
            status: OrderStatus::Created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_order_is_not_terminal() {
        let order = Order::created("5O190127TN364715T", "100", "USD");
        assert_eq!(order.status, OrderStatus::Created);
        assert!(!order.status.is_terminal());
    }

    #[test]
    fn all_other_statuses_are_terminal() {
        for status in [
            OrderStatus::Captured,
            OrderStatus::Declined,
            OrderStatus::Cancelled,
            OrderStatus::Errored,
        ] {
            assert!(status.is_terminal());
        }
    }
}
