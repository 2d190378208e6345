use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cityweather_core::{
    EndpointTemplate, Settings, WeatherLookup, WeatherSource,
    config::{DEFAULT_TIMEOUT, OPENWEATHER_TEMPLATE},
};
use inquire::{
    CustomType, CustomUserError, InquireError, Password, PasswordDisplayMode, Text,
    validator::Validation,
};
use std::{io::Write, process::ExitCode};

use crate::view::{ErrorNotice, WeatherView};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for a city")]
pub struct Cli {
    /// Request timeout in seconds; overrides config file and environment.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key, endpoint template and timeout.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "Paris, FR".
        place: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for cities until an empty answer.
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { place, json } => {
                let lookup = build_lookup(self.timeout)?;
                let format = if json { OutputFormat::Json } else { OutputFormat::Text };

                let mut out = std::io::stdout().lock();
                let found = show(&lookup, &place, format, &mut out).await?;

                Ok(if found { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Interactive => {
                let lookup = build_lookup(self.timeout)?;
                let mut out = std::io::stdout();
                interactive(&lookup, prompt_place, &mut out).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Merge config file, environment and the CLI override into a ready lookup.
fn build_lookup(timeout: Option<u64>) -> Result<WeatherLookup> {
    let mut settings = Settings::load()?.with_process_env()?;
    if let Some(secs) = timeout {
        settings.timeout_secs = Some(secs);
    }

    let config = settings.resolve()?;
    tracing::debug!(?config, "resolved lookup configuration");

    WeatherLookup::new(config)
}

/// Run one lookup and render it. Returns `false` when an error notice was shown.
pub async fn show<S, W>(source: &S, place: &str, format: OutputFormat, out: &mut W) -> Result<bool>
where
    S: WeatherSource + ?Sized,
    W: Write,
{
    match source.lookup(place).await {
        Ok(record) => {
            let view = WeatherView::new(place, &record);
            match format {
                OutputFormat::Text => writeln!(out, "{view}")?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &view)
                        .context("Failed to write JSON output")?;
                    writeln!(out)?;
                }
            }
            Ok(true)
        }
        Err(err) => {
            let notice = ErrorNotice::new(&err);
            match format {
                OutputFormat::Text => writeln!(out, "{notice}")?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &notice)
                        .context("Failed to write JSON output")?;
                    writeln!(out)?;
                }
            }
            Ok(false)
        }
    }
}

/// Prompt loop. `next_place` yields `None` when the user is done.
pub async fn interactive<S, P, W>(source: &S, mut next_place: P, out: &mut W) -> Result<()>
where
    S: WeatherSource + ?Sized,
    P: FnMut() -> Result<Option<String>>,
    W: Write,
{
    while let Some(place) = next_place()? {
        if place.trim().is_empty() {
            break;
        }

        show(source, &place, OutputFormat::Text, out).await?;
        writeln!(out)?;
    }

    Ok(())
}

fn prompt_place() -> Result<Option<String>> {
    match Text::new("Please enter your city").with_help_message("empty to quit").prompt() {
        Ok(place) => Ok(Some(place)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read city name"),
    }
}

fn configure() -> Result<()> {
    let mut settings = Settings::load()?;

    let mut key_prompt = Password::new("API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked);
    if settings.api_key.is_some() {
        key_prompt = key_prompt.with_help_message("leave empty to keep the current key");
    } else {
        key_prompt = key_prompt.with_validator(validate_api_key);
    }
    let api_key = key_prompt.prompt().context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        settings.api_key = Some(api_key.trim().to_string());
    }

    let current_template =
        settings.endpoint_template.clone().unwrap_or_else(|| OPENWEATHER_TEMPLATE.to_string());
    let template = Text::new("Endpoint template:")
        .with_default(&current_template)
        .with_help_message("two {} slots: place name, then API key")
        .with_validator(validate_template)
        .prompt()
        .context("Failed to read endpoint template")?;
    settings.endpoint_template = Some(template.trim().to_string());

    let timeout_secs = CustomType::<u64>::new("Timeout (seconds):")
        .with_default(settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT.as_secs()))
        .with_error_message("Please enter a whole number of seconds")
        .with_validator(validate_timeout)
        .prompt()
        .context("Failed to read timeout")?;
    settings.timeout_secs = Some(timeout_secs);

    let path = settings.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn validate_api_key(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("An API key is required".into()))
    } else {
        Ok(Validation::Valid)
    }
}

fn validate_template(input: &str) -> Result<Validation, CustomUserError> {
    match EndpointTemplate::parse(input) {
        Ok(_) => Ok(Validation::Valid),
        Err(e) => Ok(Validation::Invalid(e.to_string().into())),
    }
}

fn validate_timeout(secs: &u64) -> Result<Validation, CustomUserError> {
    if *secs == 0 {
        Ok(Validation::Invalid("Timeout must be at least 1 second".into()))
    } else {
        Ok(Validation::Valid)
    }
}
