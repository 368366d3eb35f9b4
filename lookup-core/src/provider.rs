use crate::{Config, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::{error::Error as StdError, fmt::Debug};
use thiserror::Error;

pub mod openweather;

/// Status code embedded in the provider body.
///
/// The upstream API reports errors as strings (`"404"`) and success as a
/// number (`200`), so both shapes are accepted and compared as they arrive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProviderCode {
    Number(i64),
    Text(String),
}

impl ProviderCode {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderCode::Text(code) if code == "404")
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderCode::Number(200))
    }
}

/// Parsed provider body. Every field is optional: error bodies only carry
/// `cod` and `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPayload {
    pub cod: Option<ProviderCode>,
    message: Option<serde_json::Value>,
    pub name: Option<String>,
    pub sys: Option<PayloadSys>,
    pub main: Option<PayloadMain>,
    #[serde(default)]
    pub weather: Vec<PayloadCondition>,
    pub wind: Option<PayloadWind>,
}

impl ProviderPayload {
    /// Provider-supplied message, when it is a non-empty string.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadSys {
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadMain {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadCondition {
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadWind {
    pub speed: Option<f64>,
}

/// Failure to obtain a JSON body from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Failed to parse response JSON: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout;
        }
        // The request URL carries the API key.
        TransportError::Request(describe_chain(&err.without_url()))
    }
}

/// Joins an error and its sources, skipping repeated messages.
fn describe_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions for `city` (already trimmed) in metric units.
    async fn current_weather(&self, city: &str) -> Result<ProviderPayload, TransportError>;

    /// Base for icon asset URLs.
    fn icon_base_url(&self) -> &str;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = OpenWeatherProvider::new(
        api_key.to_owned(),
        config.provider.base_url.clone(),
        config.provider.icon_base_url.clone(),
        config.request_timeout(),
    )?;

    Ok(Box::new(provider))
}
