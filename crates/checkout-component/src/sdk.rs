//! Payment SDK Seam
//!
//! The vendor script of the original page, modeled as an explicit
//! dependency: a provider hands out a shared handle keyed by client id
//! instead of the implicit global the script hung on the page context.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use checkout_core::{CheckoutError, Result};

use crate::flow::PaymentFlow;
use crate::surface::{ButtonStyle, Surface};

/// Where a checkout attempt got its SDK handle from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdkSource {
    Cache,
    Fresh,
}

impl SdkSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SdkSource::Cache => "cache",
            SdkSource::Fresh => "fresh",
        }
    }
}

/// A loaded payment SDK instance.
#[async_trait]
pub trait PaymentSdk: Send + Sync {
    /// Render the button onto the surface and wire the flow hooks in.
    async fn render(
        &self,
        surface: &dyn Surface,
        style: ButtonStyle,
        flow: Arc<dyn PaymentFlow>,
    ) -> Result<()>;
}

/// Hands the component an SDK handle, reusing a shared one when present.
#[async_trait]
pub trait SdkProvider: Send + Sync {
    /// Reuse the cached instance if one exists, otherwise load fresh with
    /// the given client identifier. Fails with
    /// [`CheckoutError::SdkLoad`] when the load rejects.
    async fn get_or_load(&self, client_id: &str) -> Result<(Arc<dyn PaymentSdk>, SdkSource)>;
}

/// Performs the actual (slow, fallible) SDK load.
#[async_trait]
pub trait SdkLoader: Send + Sync {
    async fn load(&self, client_id: &str) -> Result<Arc<dyn PaymentSdk>>;
}

/// [`SdkProvider`] that caches the first successful load.
///
/// Writes race-free only because the checkout runs single-threaded and
/// cooperative; there is deliberately no cross-load coordination, matching
/// the original page-global cache.
pub struct CachingSdkProvider {
    loader: Arc<dyn SdkLoader>,
    cached: Mutex<Option<Arc<dyn PaymentSdk>>>,
}

impl CachingSdkProvider {
    pub fn new(loader: Arc<dyn SdkLoader>) -> Self {
        Self { loader, cached: Mutex::new(None) }
    }
}

#[async_trait]
impl SdkProvider for CachingSdkProvider {
    async fn get_or_load(&self, client_id: &str) -> Result<(Arc<dyn PaymentSdk>, SdkSource)> {
        if let Some(sdk) = self.cached.lock().await.clone() {
            return Ok((sdk, SdkSource::Cache));
        }

        let sdk = self
            .loader
            .load(client_id)
            .await
            .map_err(|err| match err {
                already @ CheckoutError::SdkLoad(_) => already,
                other => CheckoutError::SdkLoad(other.to_string()),
            })?;
        *self.cached.lock().await = Some(Arc::clone(&sdk));
        Ok((sdk, SdkSource::Fresh))
    }
}
