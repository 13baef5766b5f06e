//! USD/TRY rate collaborator
//!
//! The engine only ever sees a number. This module fetches a live quote,
//! turns the payload into that number and substitutes a fixed fallback
//! whenever the live quote is unavailable, so callers never observe a
//! failure.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RateError;

/// Rate used when no live quote can be obtained
pub const DEFAULT_FALLBACK_RATE: f64 = 41.98;

/// Public endpoint serving USD cross rates
pub const LIVE_RATE_URL: &str = "https://latest.currency-api.pages.dev/v1/currencies/usd.json";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// Fetched from a provider
    Live,
    /// Provider failed; the configured constant was used
    Fallback,
    /// Given by the caller, nothing was fetched
    Supplied,
}

/// A USD/TRY quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub rate: f64,
    pub source: RateSource,
}

impl RateQuote {
    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }
}

/// Source of live USD/TRY quotes
pub trait RateProvider {
    fn fetch_usd_try(&self) -> Result<f64, RateError>;
}

/// Extract USD/TRY from a quote payload.
///
/// Accepts both shapes served by the public currency APIs:
/// `{"usd": {"try": 41.9}}` and `{"rates": {"TRY": 41.9}}`.
pub fn parse_rate_payload(payload: &str) -> Result<f64, RateError> {
    let json: Value = serde_json::from_str(payload)?;
    let rate = json
        .pointer("/usd/try")
        .or_else(|| json.pointer("/rates/TRY"))
        .and_then(Value::as_f64)
        .ok_or(RateError::MissingQuote)?;

    if rate > 0.0 {
        Ok(rate)
    } else {
        Err(RateError::NonPositive(rate))
    }
}

/// Provider fetching the quote over HTTP
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    url: String,
    timeout: Duration,
}

impl HttpRateProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpRateProvider {
    fn default() -> Self {
        Self::new(LIVE_RATE_URL)
    }
}

impl RateProvider for HttpRateProvider {
    fn fetch_usd_try(&self) -> Result<f64, RateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let payload = client.get(&self.url).send()?.error_for_status()?.text()?;
        log::debug!("Fetched USD/TRY payload from {}", self.url);
        parse_rate_payload(&payload)
    }
}

/// Provider reading a previously downloaded quote payload from disk
#[derive(Debug, Clone)]
pub struct PayloadFileProvider {
    path: PathBuf,
}

impl PayloadFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RateProvider for PayloadFileProvider {
    fn fetch_usd_try(&self) -> Result<f64, RateError> {
        let mut payload = String::new();
        File::open(&self.path)?.read_to_string(&mut payload)?;
        parse_rate_payload(&payload)
    }
}

/// Provider returning a fixed rate, e.g. one typed by the user
#[derive(Debug, Clone, Copy)]
pub struct FixedRate(pub f64);

impl RateProvider for FixedRate {
    fn fetch_usd_try(&self) -> Result<f64, RateError> {
        if self.0 > 0.0 {
            Ok(self.0)
        } else {
            Err(RateError::NonPositive(self.0))
        }
    }
}

/// Live quote from `provider`, or `fallback` if it fails
pub fn quote_or_fallback<P: RateProvider + ?Sized>(provider: &P, fallback: f64) -> RateQuote {
    match provider.fetch_usd_try() {
        Ok(rate) => RateQuote {
            rate,
            source: RateSource::Live,
        },
        Err(err) => {
            log::warn!("Failed to fetch live USD/TRY rate, using fallback {}: {}", fallback, err);
            RateQuote {
                rate: fallback,
                source: RateSource::Fallback,
            }
        }
    }
}

/// The caller's rate when positive, otherwise a live quote with fallback
pub fn quote_for<P: RateProvider + ?Sized>(supplied: f64, provider: &P, fallback: f64) -> RateQuote {
    if supplied > 0.0 {
        RateQuote {
            rate: supplied,
            source: RateSource::Supplied,
        }
    } else {
        quote_or_fallback(provider, fallback)
    }
}
