use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::error::LookupError;

/// A validated place name, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    place: String,
}

impl WeatherQuery {
    pub fn new(place: &str) -> Result<Self, LookupError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(LookupError::EmptyPlace);
        }

        Ok(Self { place: place.to_string() })
    }

    pub fn place(&self) -> &str {
        &self.place
    }
}

impl fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.place)
    }
}

/// Normalized result of one successful lookup.
///
/// Only built from a provider payload that carried every required field,
/// see [`crate::response::parse_current`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub(crate) country: String,
    pub(crate) temperature_celsius: f64,
    pub(crate) description: String,
    pub(crate) humidity_percent: u8,
    /// Meters per second, as reported by the provider.
    pub(crate) wind_speed: f64,
    pub(crate) icon_code: String,
    pub(crate) longitude: f64,
    pub(crate) latitude: f64,
    /// When the lookup ran, not the provider's observation time.
    pub(crate) observed_at: DateTime<Utc>,
}

impl WeatherRecord {
    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn humidity_percent(&self) -> u8 {
        self.humidity_percent
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    pub fn icon_code(&self) -> &str {
        &self.icon_code
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// Kelvin to Celsius, rounded to one decimal place.
///
/// Rounds the exact binary value (ties to even), so `277.4` gives `4.2`.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    let celsius = kelvin - 273.15;
    let rounded = format!("{celsius:.1}").parse::<f64>().unwrap_or(celsius);
    // -0.0 would print as "-0.0"
    if rounded == 0.0 { 0.0 } else { rounded }
}
