//! Hermes price-oracle client.
//!
//! One blocking GET against the latest-price-update endpoint, no retry. A
//! non-2xx status, an oversized body or a malformed response shape is fatal
//! for the step that depends on the payload.

use ethers::types::Bytes;
use paylot_core::egress::validate_outbound_url_with_allowlist;
use paylot_core::{pricefeed, PaylotError, PriceUpdateSource, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Maximum response body size accepted from the oracle.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024; // 1 MiB

/// Oracle hosts that skip DNS resolution during URL validation.
const ALLOWED_ORACLE_HOSTS: &[&str] = &["hermes.pyth.network"];

trait HttpGetter: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

struct ReqwestHttpGetter {
    client: reqwest::blocking::Client,
}

impl ReqwestHttpGetter {
    fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| PaylotError::OracleError(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpGetter for ReqwestHttpGetter {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| PaylotError::OracleError(format!("oracle request failed: {e}")))?;

        let status = response.status().as_u16();

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_RESPONSE_BYTES as u64 {
                return Err(PaylotError::OracleError(format!(
                    "oracle response too large: {content_length} bytes (max {MAX_RESPONSE_BYTES})"
                )));
            }
        }

        // Bounded read covers chunked responses without a Content-Length.
        use std::io::Read;
        let mut limited = response.take((MAX_RESPONSE_BYTES + 1) as u64);
        let mut body = Vec::new();
        limited
            .read_to_end(&mut body)
            .map_err(|e| PaylotError::OracleError(format!("failed to read oracle response: {e}")))?;
        if body.len() > MAX_RESPONSE_BYTES {
            return Err(PaylotError::OracleError(format!(
                "oracle response too large: >{MAX_RESPONSE_BYTES} bytes"
            )));
        }

        Ok(HttpResponse { status, body })
    }
}

/// Hermes endpoint configuration.
#[derive(Debug, Clone)]
pub struct HermesConfig {
    pub base_url: String,
    pub price_feed_id: String,
    pub timeout: Duration,
}

impl Default for HermesConfig {
    fn default() -> Self {
        Self {
            base_url: paylot_core::config::DEFAULT_HERMES_URL.into(),
            price_feed_id: paylot_core::config::PRICE_FEED_ID.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the Hermes latest-price-update endpoint.
pub struct HermesClient {
    config: HermesConfig,
    http: Box<dyn HttpGetter>,
}

#[derive(Debug, Deserialize)]
struct LatestUpdateResponse {
    binary: BinaryUpdate,
}

#[derive(Debug, Deserialize)]
struct BinaryUpdate {
    #[serde(default)]
    data: Vec<String>,
}

impl HermesClient {
    pub fn new(config: HermesConfig) -> Result<Self> {
        let http = Box::new(ReqwestHttpGetter::new(config.timeout)?);
        Self::new_with_http(config, http)
    }

    /// Build a client from the full application configuration.
    pub fn from_config(config: &paylot_core::PaylotConfig) -> Result<Self> {
        Self::new(HermesConfig {
            base_url: config.oracle.hermes_base_url.clone(),
            price_feed_id: config.oracle.price_feed_id.clone(),
            timeout: config.timing.http_timeout,
        })
    }

    fn new_with_http(config: HermesConfig, http: Box<dyn HttpGetter>) -> Result<Self> {
        validate_outbound_url_with_allowlist(&config.base_url, ALLOWED_ORACLE_HOSTS)?;
        Ok(Self { config, http })
    }

    fn update_url(&self) -> Result<String> {
        let base = self.config.base_url.trim_end_matches('/');
        // The query key is the percent-encoded `ids[]` the service expects.
        let url = format!(
            "{base}/v2/updates/price/latest?ids%5B%5D={}",
            self.config.price_feed_id
        );
        validate_outbound_url_with_allowlist(&url, ALLOWED_ORACLE_HOSTS)?;
        Ok(url)
    }
}

impl PriceUpdateSource for HermesClient {
    fn latest_update(&self) -> Result<Vec<Bytes>> {
        let url = self.update_url()?;
        debug!(%url, "fetching latest price update");

        let response = self.http.get(&url)?;
        if !(200..=299).contains(&response.status) {
            return Err(PaylotError::OracleError(format!(
                "oracle returned status {}",
                response.status
            )));
        }

        let parsed: LatestUpdateResponse = serde_json::from_slice(&response.body)
            .map_err(|e| PaylotError::OracleError(format!("invalid oracle JSON: {e}")))?;

        let payloads = pricefeed::decode_update_payloads(&parsed.binary.data)?;
        debug!(count = payloads.len(), "price update payloads decoded");
        Ok(payloads)
    }
}
