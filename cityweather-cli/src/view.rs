//! Human-friendly rendering of a [`WeatherRecord`].

use chrono::{DateTime, Local, TimeZone, Utc};
use cityweather_core::{LookupError, WeatherRecord};
use serde::Serialize;
use std::fmt::{self, Display};

const TIMESTAMP_FORMAT: &str = "%d %b %Y | %I:%M:%S %p";

/// Provider-hosted icon image for `icon_code`.
pub fn icon_url(icon_code: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon_code}@2x.png")
}

/// OpenStreetMap page with a single marker at the given point.
pub fn map_url(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={latitude}&mlon={longitude}#map=10/{latitude}/{longitude}"
    )
}

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Everything shown for one successful lookup.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherView {
    pub place: String,
    pub country: String,
    pub date_time: String,
    pub observed_at: DateTime<Utc>,
    pub temperature_celsius: f64,
    pub description: String,
    pub humidity_percent: u8,
    pub wind_speed_mps: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub map_url: String,
    pub icon_url: String,
}

impl WeatherView {
    pub fn new(place: &str, record: &WeatherRecord) -> Self {
        Self::in_timezone(place, record, &Local)
    }

    pub fn in_timezone<Tz: TimeZone>(place: &str, record: &WeatherRecord, tz: &Tz) -> Self
    where
        Tz::Offset: Display,
    {
        let observed_at = record.observed_at();

        Self {
            place: place.trim().to_string(),
            country: record.country().to_string(),
            date_time: format_timestamp(&observed_at.with_timezone(tz)),
            observed_at,
            temperature_celsius: record.temperature_celsius(),
            description: record.description().to_string(),
            humidity_percent: record.humidity_percent(),
            wind_speed_mps: record.wind_speed(),
            latitude: record.latitude(),
            longitude: record.longitude(),
            map_url: map_url(record.latitude(), record.longitude()),
            icon_url: icon_url(record.icon_code()),
        }
    }
}

impl Display for WeatherView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weather in {}, {}", self.place, self.country)?;
        writeln!(f, "Date & Time : {}", self.date_time)?;
        writeln!(f, "Current     : {:.1} °C", self.temperature_celsius)?;
        writeln!(f, "Description : {}", self.description)?;
        writeln!(f, "Humidity    : {} %", self.humidity_percent)?;
        writeln!(f, "Wind Speed  : {} m/s", self.wind_speed_mps)?;
        writeln!(f, "Map         : {}, {} ({})", self.latitude, self.longitude, self.map_url)?;
        write!(f, "Icon        : {}", self.icon_url)
    }
}

/// Error notice shown instead of any weather data.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorNotice {
    pub error: String,
    pub kind: &'static str,
}

impl ErrorNotice {
    pub fn new(err: &LookupError) -> Self {
        Self { error: err.user_message(), kind: err.kind() }
    }
}

impl Display for ErrorNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error in search! {}", self.error)
    }
}
