//! Sandbox Payment Provider Client

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use checkout_core::wire::{ApiFailure, OrderResource};
use checkout_core::{GatewayError, PaymentGateway};

const DEFAULT_BASE_URL: &str = "https://api-m.sandbox.paypal.com";

/// Seconds shaved off the advertised token lifetime before refreshing.
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

/// REST client with a cached OAuth2 access token.
pub struct RestGateway {
    http: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<CachedToken>>,
}

#[derive(Clone, Debug)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn new(access_token: String, expires_in: i64) -> Self {
        let usable = (expires_in - TOKEN_EXPIRY_SLACK_SECS).max(0);
        Self {
            access_token,
            expires_at: Utc::now() + TimeDelta::seconds(usable),
        }
    }

    fn is_fresh(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl RestGateway {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: RwLock::new(None),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, GatewayError> {
        let client_id = std::env::var("PAYPAL_CLIENT_ID")
            .map_err(|_| GatewayError::Config("PAYPAL_CLIENT_ID not set".into()))?;
        let client_secret = std::env::var("PAYPAL_CLIENT_SECRET")
            .map_err(|_| GatewayError::Config("PAYPAL_CLIENT_SECRET not set".into()))?;
        let base_url =
            std::env::var("PAYPAL_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Ok(Self::new(client_id, client_secret, base_url))
    }

    /// The public credential served to the frontend.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    async fn access_token(&self) -> Result<String, GatewayError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!("Exchanging client credentials for an access token");
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Auth(format!(
                "token endpoint returned {status}"
            )));
        }

        let body: TokenResponse = response.json().await.map_err(transport)?;
        let token = CachedToken::new(body.access_token, body.expires_in);
        let access_token = token.access_token.clone();
        *self.token.write().await = Some(token);
        Ok(access_token)
    }

    async fn parse_order_response(
        response: reqwest::Response,
    ) -> Result<OrderResource, GatewayError> {
        let status = response.status();
        if status.is_success() {
            response.json::<OrderResource>().await.map_err(transport)
        } else {
            let failure = response.json::<ApiFailure>().await.unwrap_or_default();
            Err(GatewayError::Api { status: status.as_u16(), failure })
        }
    }
}

#[async_trait]
impl PaymentGateway for RestGateway {
    async fn create_order(
        &self,
        amount: &str,
        currency: &str,
    ) -> Result<OrderResource, GatewayError> {
        let token = self.access_token().await?;
        let body = create_order_body(amount, currency);

        let response = self
            .http
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        Self::parse_order_response(response).await
    }

    async fn capture_order(&self, order_id: &str) -> Result<OrderResource, GatewayError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{order_id}/capture",
                self.base_url
            ))
            .bearer_auth(token)
            .header("Prefer", "return=representation")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport)?;

        Self::parse_order_response(response).await
    }

    fn name(&self) -> &str {
        "paypal-sandbox"
    }
}

fn create_order_body(amount: &str, currency: &str) -> serde_json::Value {
    serde_json::json!({
        "intent": "CAPTURE",
        "purchase_units": [{
            "amount": {
                "currency_code": currency,
                "value": amount,
            }
        }],
    })
}

fn transport(error: reqwest::Error) -> GatewayError {
    GatewayError::Transport(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_reused() {
        let token = CachedToken::new("A21AA...".into(), 32_400);
        assert!(token.is_fresh());
    }

    #[test]
    fn short_lived_token_expires_immediately() {
        // Lifetime below the slack collapses to zero.
        let token = CachedToken::new("A21AA...".into(), 30);
        assert!(!token.is_fresh());
    }

    #[test]
    fn create_order_body_has_capture_intent_and_one_unit() {
        let body = create_order_body("100", "USD");
        assert_eq!(body["intent"], "CAPTURE");
        let units = body["purchase_units"].as_array().expect("units array");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0]["amount"]["currency_code"], "USD");
        assert_eq!(units[0]["amount"]["value"], "100");
    }

    #[test]
    fn from_env_fails_without_credentials() {
        // Guard against ambient env leaking into the assertion.
        if std::env::var("PAYPAL_CLIENT_ID").is_ok() {
            return;
        }
        assert!(matches!(
            RestGateway::from_env(),
            Err(GatewayError::Config(_))
        ));
    }
}
