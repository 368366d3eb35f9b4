//! The weather lookup component.
//!
//! Owns the query text and the [`LookupStatus`] of the latest attempt. The
//! status lives in a `watch` channel so a rendering surface can redraw on
//! every transition while a request is in flight.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    model::{LookupStatus, WeatherReport, icon_url},
    provider::{ProviderPayload, TransportError, WeatherProvider},
};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a city name";
pub const NOT_FOUND_MESSAGE: &str = "City not found. Please check spelling.";
pub const PROVIDER_FALLBACK_MESSAGE: &str = "Failed to fetch weather";
pub const INTERRUPTED_MESSAGE: &str = "Lookup was interrupted";

/// Why a lookup ended in [`LookupStatus::Failed`]. Only the message reaches the UI.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("{}", EMPTY_QUERY_MESSAGE)]
    Validation,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("{0}")]
    Provider(String),

    /// Success code, but the body is missing something the report needs.
    #[error("Unexpected provider response: missing `{0}`")]
    Malformed(&'static str),
}

#[derive(Debug)]
pub struct WeatherLookup {
    provider: Arc<dyn WeatherProvider>,
    city_name: String,
    status: watch::Sender<LookupStatus>,
    latest_attempt: AtomicU64,
}

impl WeatherLookup {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        let (status, _) = watch::channel(LookupStatus::Idle);
        Self { provider, city_name: String::new(), status, latest_attempt: AtomicU64::new(0) }
    }

    /// Replaces the query verbatim. The visible status is left untouched.
    pub fn set_city_name(&mut self, text: impl Into<String>) {
        self.city_name = text.into();
    }

    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn current_status(&self) -> LookupStatus {
        self.status.borrow().clone()
    }

    /// Receiver that is notified after every status transition.
    pub fn subscribe(&self) -> watch::Receiver<LookupStatus> {
        self.status.subscribe()
    }

    /// Runs one lookup for the current query and returns the status it left behind.
    ///
    /// Never fails: every error becomes [`LookupStatus::Failed`]. When lookups
    /// overlap, only the most recently started one may publish its result.
    pub async fn submit_lookup(&self) -> LookupStatus {
        let city = self.city_name.trim().to_owned();

        if city.is_empty() {
            let seq = self.begin(None);
            debug!(seq, "rejecting empty query");
            Attempt::new(self, seq).settle(Err(LookupError::Validation));
            return self.current_status();
        }

        let seq = self.begin(Some(LookupStatus::Loading));
        let attempt = Attempt::new(self, seq);
        info!(seq, city = %city, "starting weather lookup");

        let outcome = match self.provider.current_weather(&city).await {
            Ok(payload) => classify(&payload, self.provider.icon_base_url()),
            Err(err) => Err(LookupError::from(err)),
        };

        attempt.settle(outcome);
        self.current_status()
    }

    /// Claims the next attempt number, optionally publishing `status` atomically with it.
    fn begin(&self, status: Option<LookupStatus>) -> u64 {
        let mut seq = 0;
        self.status.send_if_modified(|current| {
            seq = self.latest_attempt.fetch_add(1, Ordering::SeqCst) + 1;
            match status {
                Some(next) => {
                    *current = next;
                    true
                }
                None => false,
            }
        });
        seq
    }

    /// Publishes `next` unless a later attempt has started. Returns whether it was applied.
    fn publish(&self, seq: u64, next: LookupStatus) -> bool {
        self.status.send_if_modified(|current| {
            if self.latest_attempt.load(Ordering::SeqCst) != seq {
                return false;
            }
            *current = next;
            true
        })
    }
}

/// Scoped ownership of one attempt's status.
///
/// Dropping an unsettled attempt (cancelled future, panic while awaiting the
/// provider) still moves the status out of `Loading`.
struct Attempt<'a> {
    lookup: &'a WeatherLookup,
    seq: u64,
    settled: bool,
}

impl<'a> Attempt<'a> {
    fn new(lookup: &'a WeatherLookup, seq: u64) -> Self {
        Self { lookup, seq, settled: false }
    }

    fn settle(mut self, outcome: Result<WeatherReport, LookupError>) {
        self.settled = true;

        let next = match outcome {
            Ok(report) => {
                info!(seq = self.seq, city = %report.city_label, "weather lookup succeeded");
                LookupStatus::Succeeded { report }
            }
            Err(err) => {
                warn!(seq = self.seq, error = %err, "weather lookup failed");
                LookupStatus::Failed { message: err.to_string() }
            }
        };

        if !self.lookup.publish(self.seq, next) {
            debug!(seq = self.seq, "discarding result of superseded lookup");
        }
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(seq = self.seq, "weather lookup interrupted before settling");
        self.lookup
            .publish(self.seq, LookupStatus::Failed { message: INTERRUPTED_MESSAGE.to_string() });
    }
}

/// Maps a provider body to a report or the failure it describes.
pub fn classify(
    payload: &ProviderPayload,
    icon_base_url: &str,
) -> Result<WeatherReport, LookupError> {
    debug!(code = ?payload.cod, "classifying provider response");

    match &payload.cod {
        Some(code) if code.is_not_found() => Err(LookupError::NotFound),
        Some(code) if code.is_success() => build_report(payload, icon_base_url),
        _ => Err(LookupError::Provider(
            payload.message().unwrap_or(PROVIDER_FALLBACK_MESSAGE).to_string(),
        )),
    }
}

fn build_report(
    payload: &ProviderPayload,
    icon_base_url: &str,
) -> Result<WeatherReport, LookupError> {
    let main = payload.main.as_ref().ok_or(LookupError::Malformed("main"))?;
    let condition = payload.weather.first().ok_or(LookupError::Malformed("weather[0]"))?;

    let humidity = main.humidity.ok_or(LookupError::Malformed("main.humidity"))?;
    let wind_speed = payload
        .wind
        .as_ref()
        .and_then(|w| w.speed)
        .ok_or(LookupError::Malformed("wind.speed"))?;
    let icon = condition.icon.as_deref().ok_or(LookupError::Malformed("weather[0].icon"))?;

    Ok(WeatherReport {
        city_label: payload.name.clone().ok_or(LookupError::Malformed("name"))?,
        country_code: payload
            .sys
            .as_ref()
            .and_then(|s| s.country.clone())
            .ok_or(LookupError::Malformed("sys.country"))?,
        temperature_celsius: main.temp.ok_or(LookupError::Malformed("main.temp"))?,
        condition_main: condition.main.clone().ok_or(LookupError::Malformed("weather[0].main"))?,
        condition_description: condition
            .description
            .clone()
            .ok_or(LookupError::Malformed("weather[0].description"))?,
        humidity_percent: humidity.round().clamp(0.0, 100.0) as u8,
        wind_speed_mps: wind_speed.max(0.0),
        icon_reference: icon_url(icon_base_url, icon),
    })
}
