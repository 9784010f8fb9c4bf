//! Backend Collaborator Client
//!
//! The component's view of its own backend: configuration fetch, order
//! create, order capture. Non-success responses on the order endpoints are
//! not errors at this layer — they carry the provider failure body the
//! component must normalize (or restart on).

use async_trait::async_trait;

use checkout_core::wire::{ApiFailure, CartItem, ClientIdResponse, CreateOrderRequest, OrderResource};
use checkout_core::{CheckoutError, Result};

/// Result of a create or capture call.
#[derive(Clone, Debug)]
pub enum ApiOutcome {
    /// 2xx with a parsed order resource.
    Success { status: u16, resource: OrderResource },
    /// Non-2xx with the provider's failure body.
    Failure { status: u16, failure: ApiFailure },
}

impl ApiOutcome {
    pub fn status(&self) -> u16 {
        match self {
            ApiOutcome::Success { status, .. } | ApiOutcome::Failure { status, .. } => *status,
        }
    }
}

/// HTTP seam between the component and its backend.
#[async_trait]
pub trait CheckoutBackend: Send + Sync {
    /// `GET <base>/clientid`. Fails with [`CheckoutError::ConfigFetch`] on a
    /// non-success status or a malformed body.
    async fn fetch_client_id(&self) -> Result<ClientIdResponse>;

    /// `POST <base>/orders` with the cart payload.
    async fn create_order(&self, cart: &[CartItem]) -> Result<ApiOutcome>;

    /// `POST <base>/capture/{order_id}`.
    async fn capture_order(&self, order_id: &str) -> Result<ApiOutcome>;
}

/// Backend client over reqwest.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// `base_url` is the component's own resource path, e.g.
    /// `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn parse_outcome(response: reqwest::Response) -> Result<ApiOutcome> {
        let status = response.status();
        if status.is_success() {
            let resource = response
                .json::<OrderResource>()
                .await
                .map_err(|e| CheckoutError::Transport(e.to_string()))?;
            Ok(ApiOutcome::Success { status: status.as_u16(), resource })
        } else {
            let failure = response.json::<ApiFailure>().await.unwrap_or_default();
            Ok(ApiOutcome::Failure { status: status.as_u16(), failure })
        }
    }
}

#[async_trait]
impl CheckoutBackend for HttpBackend {
    async fn fetch_client_id(&self) -> Result<ClientIdResponse> {
        let response = self
            .http
            .get(format!("{}/clientid", self.base_url))
            .send()
            .await
            .map_err(|e| CheckoutError::ConfigFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckoutError::ConfigFetch(format!(
                "clientid endpoint returned {status}"
            )));
        }

        response
            .json::<ClientIdResponse>()
            .await
            .map_err(|e| CheckoutError::ConfigFetch(format!("malformed clientid body: {e}")))
    }

    async fn create_order(&self, cart: &[CartItem]) -> Result<ApiOutcome> {
        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .json(&CreateOrderRequest { cart: cart.to_vec() })
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        Self::parse_outcome(response).await
    }

    async fn capture_order(&self, order_id: &str) -> Result<ApiOutcome> {
        let response = self
            .http
            .post(format!("{}/capture/{order_id}", self.base_url))
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        Self::parse_outcome(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            http::Response::builder()
                .status(status)
                .body(body)
                .expect("response builds"),
        )
    }

    #[tokio::test]
    async fn success_body_parses_into_an_order_resource() {
        let outcome = HttpBackend::parse_outcome(response(
            201,
            r#"{"id": "5O190127TN364715T", "status": "CREATED"}"#,
        ))
        .await
        .expect("outcome parses");

        match outcome {
            ApiOutcome::Success { status, resource } => {
                assert_eq!(status, 201);
                assert_eq!(resource.id, "5O190127TN364715T");
            }
            ApiOutcome::Failure { .. } => panic!("expected success outcome"),
        }
    }

    #[tokio::test]
    async fn failure_body_stays_structured() {
        let outcome = HttpBackend::parse_outcome(response(
            422,
            r#"{"details": [{"issue": "INSTRUMENT_DECLINED", "description": "Declined"}],
                "debug_id": "D9"}"#,
        ))
        .await
        .expect("outcome parses");

        match outcome {
            ApiOutcome::Failure { status, failure } => {
                assert_eq!(status, 422);
                assert!(failure.is_instrument_declined());
                assert_eq!(failure.debug_id.as_deref(), Some("D9"));
            }
            ApiOutcome::Success { .. } => panic!("expected failure outcome"),
        }
    }

    #[tokio::test]
    async fn unparseable_failure_body_defaults_to_empty() {
        let outcome = HttpBackend::parse_outcome(response(500, "upstream fell over"))
            .await
            .expect("outcome parses");

        match outcome {
            ApiOutcome::Failure { status, failure } => {
                assert_eq!(status, 500);
                assert!(failure.details.is_empty());
                assert!(failure.debug_id.is_none());
            }
            ApiOutcome::Success { .. } => panic!("expected failure outcome"),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_transport_error() {
        let err = HttpBackend::parse_outcome(response(200, "not json"))
            .await
            .expect_err("parse fails");
        assert!(matches!(err, CheckoutError::Transport(_)));
    }
}
