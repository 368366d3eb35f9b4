//! Core library for the `weather-lookup` client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider capability and its OpenWeather implementation
//! - Shared domain models (reports, lookup status)
//! - The lookup component that drives a single query through the provider
//!
//! It is used by `weather-lookup`, but any other rendering surface can drive
//! [`WeatherLookup`] the same way.

pub mod config;
pub mod lookup;
pub mod model;
pub mod provider;

pub use config::{Config, ProviderConfig};
pub use lookup::{LookupError, WeatherLookup};
pub use model::{LookupStatus, StatusView, WeatherReport};
pub use provider::{TransportError, WeatherProvider, provider_from_config};
