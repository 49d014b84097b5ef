//! Optional delivery-code lookup for pickup values outside the fixed rule
//! table.
//!
//! The collaborator is advisory: the pipeline consults it once per rejected
//! record and treats any failure, timeout, or off-set answer as "no
//! answer", keeping the record's original error.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Boxed error for lookup implementations.
pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

/// Resolves a raw pickup-library value to a 2-letter GFA delivery code.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DeliveryLookup: Send + Sync {
    async fn delivery_code_for(&self, pickup_library_raw: &str) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    delivery_code: String,
}

/// HTTP client for the pickup-mapper service:
/// `GET <base>/ils_code_<raw>` answering `{"delivery_code": "RO"}`.
pub struct HttpDeliveryLookup {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDeliveryLookup {
    /// Builds a client with the given request timeout and a versioned
    /// User-Agent.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("annex-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(), // avoid "//"
        })
    }
}

#[async_trait]
impl DeliveryLookup for HttpDeliveryLookup {
    async fn delivery_code_for(&self, pickup_library_raw: &str) -> Result<String, LookupError> {
        let url = format!("{}/ils_code_{}", self.base_url, pickup_library_raw);
        debug!(url = %url, "Delivery lookup request");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: LookupResponse = response.json().await?;
        debug!(code = %body.delivery_code, "Delivery lookup answered");
        Ok(body.delivery_code)
    }
}
