use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::fmt::Debug;
use tracing::{debug, info, warn};

use crate::{
    config::LookupConfig,
    error::LookupError,
    model::{WeatherQuery, WeatherRecord},
    response::parse_current,
};

/// Anything that can turn a place name into a [`WeatherRecord`].
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn lookup(&self, place: &str) -> Result<WeatherRecord, LookupError>;
}

/// Current-weather lookup against the configured provider endpoint.
#[derive(Debug, Clone)]
pub struct WeatherLookup {
    config: LookupConfig,
    http: Client,
}

impl WeatherLookup {
    pub fn new(config: LookupConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// One GET, no retries. Non-2xx answers are never parsed as weather data.
    pub async fn lookup(&self, place: &str) -> Result<WeatherRecord, LookupError> {
        let query = WeatherQuery::new(place)?;

        match self.fetch(&query).await {
            Ok(record) => {
                info!(
                    place = %query,
                    country = record.country(),
                    temperature_c = record.temperature_celsius(),
                    "weather lookup succeeded"
                );
                Ok(record)
            }
            Err(err) => {
                warn!(place = %query, kind = err.kind(), error = %err, "weather lookup failed");
                Err(err)
            }
        }
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherRecord, LookupError> {
        let url = self.config.endpoint.render(query.place(), &self.config.api_key);
        debug!(place = %query, timeout = ?self.config.timeout, "requesting current weather");

        let res = self.http.get(&url).send().await.map_err(LookupError::transport)?;

        let status = res.status();
        if !status.is_success() {
            // The body is only diagnostic here; keep the status even if it can't be read.
            let body = res.text().await.unwrap_or_default();
            return Err(LookupError::RequestFailed {
                status: Some(status.as_u16()),
                timed_out: false,
                cause: format!("provider answered {status}: {}", truncate_body(&body)),
            });
        }

        let body = res.text().await.map_err(LookupError::transport)?;

        parse_current(&body, Utc::now())
    }
}

#[async_trait]
impl WeatherSource for WeatherLookup {
    async fn lookup(&self, place: &str) -> Result<WeatherRecord, LookupError> {
        WeatherLookup::lookup(self, place).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EndpointTemplate, OPENWEATHER_TEMPLATE};

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("{\"cod\":\"404\"}"), "{\"cod\":\"404\"}");
    }

    #[test]
    fn truncate_body_cuts_on_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);

        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn new_keeps_config() {
        let cfg = LookupConfig::new("KEY", EndpointTemplate::parse(OPENWEATHER_TEMPLATE).unwrap())
            .with_timeout(std::time::Duration::from_secs(3));

        let lookup = WeatherLookup::new(cfg).unwrap();
        assert_eq!(lookup.config().timeout.as_secs(), 3);
    }
}
