//! # checkout-gateway
//!
//! REST client for the sandbox payment provider, standing in for the vendor
//! server SDK: OAuth2 client-credentials token exchange with in-process
//! caching, order create, and order capture.
//!
//! The server talks to this crate only through the
//! [`PaymentGateway`](checkout_core::PaymentGateway) trait, so handlers test
//! against a stub and never touch the network.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_core::PaymentGateway;
//! use checkout_gateway::RestGateway;
//!
//! let gateway = RestGateway::from_env()?;
//! let order = gateway.create_order("100", "USD").await?;
//! let captured = gateway.capture_order(&order.id).await?;
//! ```

mod client;

pub use client::RestGateway;
