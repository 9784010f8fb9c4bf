//! Wire Contracts
//!
//! JSON shapes shared between the backend routes, the upstream payment
//! provider, and the checkout component. Every struct deserializes leniently
//! (`serde(default)`) because the component must normalize unexpected shapes
//! into errors rather than fail to parse them.

use serde::{Deserialize, Serialize};

/// Sentinel returned by `GET /clientid` when credentials are not configured.
pub const CLIENT_ID_NOT_SET: &str = "not_set";

/// Issue code for a rejected funding source. The only provider failure the
/// checkout flow recovers from (by restarting).
pub const INSTRUMENT_DECLINED: &str = "INSTRUMENT_DECLINED";

/// Response body of `GET /clientid`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientIdResponse {
    pub clientid: String,
}

impl ClientIdResponse {
    /// Whether real credentials are behind this client id.
    pub fn is_configured(&self) -> bool {
        self.clientid != CLIENT_ID_NOT_SET
    }
}

/// One line of the fixed-shape cart sent with every create-order call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub quantity: String,
}

/// Request body of `POST /orders`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub cart: Vec<CartItem>,
}

/// Monetary amount in the provider's representation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Amount {
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub value: String,
}

/// A capture or authorization record inside a purchase unit.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

/// Payments attached to a purchase unit after capture.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Payments {
    #[serde(default)]
    pub captures: Vec<PaymentRecord>,
    #[serde(default)]
    pub authorizations: Vec<PaymentRecord>,
}

/// One purchase unit of an order resource.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PurchaseUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<Payments>,
}

/// An order resource as returned by create and capture calls.
///
/// Only the fields this demo reads are modeled; unknown fields are dropped.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderResource {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
}

impl OrderResource {
    /// The record a capture response settles on: the first capture, falling
    /// back to the first authorization.
    pub fn settled_payment(&self) -> Option<&PaymentRecord> {
        let payments = self.purchase_units.first()?.payments.as_ref()?;
        payments
            .captures
            .first()
            .or_else(|| payments.authorizations.first())
    }
}

/// One issue inside a provider failure body.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub description: String,
}

/// The provider's failure shape: `{ details: [...], debug_id }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApiFailure {
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_id: Option<String>,
}

impl ApiFailure {
    /// Issue code of the first detail, if any.
    pub fn first_issue(&self) -> Option<&str> {
        self.details.first().map(|detail| detail.issue.as_str())
    }

    /// Whether this failure is the recoverable declined-instrument case.
    pub fn is_instrument_declined(&self) -> bool {
        self.first_issue() == Some(INSTRUMENT_DECLINED)
    }
}

/// Flatten a provider failure body into one descriptive line containing
/// every issue, description, and the debug id.
pub fn normalize_api_failure(failure: &ApiFailure) -> String {
    let mut parts: Vec<String> = failure
        .details
        .iter()
        .map(|detail| format!("{} {}", detail.issue, detail.description).trim().to_string())
        .collect();
    if parts.is_empty() {
        parts.push("unexpected response from payment provider".into());
    }
    let mut message = parts.join("; ");
    if let Some(debug_id) = &failure.debug_id {
        message.push_str(&format!(" ({debug_id})"));
    }
    message
}
