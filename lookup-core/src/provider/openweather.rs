use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{ProviderPayload, TransportError, WeatherProvider};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    icon_base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        icon_base_url: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-lookup/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { api_key, base_url, icon_base_url, http })
    }

    /// `{base}/weather?q={city}&appid={key}&units=metric`
    fn current_url(&self, city: &str) -> String {
        format!(
            "{}/weather?q={}&appid={}&units=metric",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key),
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<ProviderPayload, TransportError> {
        debug!(city, "requesting current weather from OpenWeather");

        let res = self.http.get(self.current_url(city)).send().await?;

        // Error bodies carry their own `cod`, so the HTTP status is only logged.
        let status = res.status();
        let body = res.text().await.map_err(|err| match TransportError::from(err) {
            TransportError::Request(msg) => TransportError::Body(msg),
            other => other,
        })?;

        debug!(%status, bytes = body.len(), "OpenWeather responded");

        serde_json::from_str(&body).map_err(|err| TransportError::Decode(err.to_string()))
    }

    fn icon_base_url(&self) -> &str {
        &self.icon_base_url
    }
}
