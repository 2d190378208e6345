//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration (endpoint template, API key, timeout)
//! - The weather lookup: one provider request mapped into a normalized record
//! - Shared domain models and the lookup error taxonomy
//!
//! It is used by `cityweather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod response;

pub use config::{EndpointTemplate, LookupConfig, Settings};
pub use error::LookupError;
pub use lookup::{WeatherLookup, WeatherSource};
pub use model::{WeatherQuery, WeatherRecord};
pub use response::parse_current;
