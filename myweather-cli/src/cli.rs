use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use myweather_core::{Cancelled, Config, ExecutionResult, WeatherRepository, service::MAX_FORECAST_DAYS};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "myweather", version, about = "Weather for a single city")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and defaults.
    Configure,

    /// Show current conditions.
    Show {
        /// City name; falls back to the configured city.
        city: Option<String>,

        /// Response language, e.g. "ru".
        #[arg(long)]
        lang: Option<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show current conditions, the next 24 hours and a multi-day forecast.
    Forecast {
        city: Option<String>,

        /// Number of days (1-14).
        #[arg(long)]
        days: Option<u8>,

        #[arg(long)]
        lang: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                // A broken file must not stop the command that rewrites it.
                let mut config = Config::load_for_edit()?;
                configure(&mut config)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city, lang, json } => {
                let mut config = Config::load()?;
                let city = config.resolve_city(city)?;
                let repo = repository(&mut config, lang)?;
                let result = repo.load_summary(&city).await;
                finish(result, json, render::summary)
            }
            Command::Forecast { city, days, lang, json } => {
                let mut config = Config::load()?;
                let city = config.resolve_city(city)?;
                let days = days.unwrap_or(config.forecast_days);
                let repo = repository(&mut config, lang)?;
                let result = repo.load_overview(&city, days).await;
                finish(result, json, render::overview)
            }
        }
    }
}

fn repository(config: &mut Config, lang: Option<String>) -> anyhow::Result<WeatherRepository> {
    if let Some(lang) = lang {
        config.language = lang;
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    Ok(WeatherRepository::from_config(config)?.with_cancellation(cancel))
}

fn finish<T: Serialize>(
    result: Result<ExecutionResult<T>, Cancelled>,
    json: bool,
    render_text: fn(&T) -> String,
) -> anyhow::Result<ExitCode> {
    let Ok(result) = result else {
        tracing::debug!("interrupted by user");
        return Ok(ExitCode::from(130));
    };

    match result {
        ExecutionResult::Success(data) => {
            if json {
                let text = serde_json::to_string_pretty(&data).context("Failed to serialize output")?;
                println!("{text}");
            } else {
                println!("{}", render_text(&data));
            }
            Ok(ExitCode::SUCCESS)
        }
        ExecutionResult::ExpectedError(err) => {
            eprintln!("{}", render::expected_error(&err));
            Ok(ExitCode::FAILURE)
        }
        ExecutionResult::UnexpectedFailure(kind) => {
            eprintln!("{}", kind.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let city = Text::new("Default city:")
        .with_default(config.city.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read city")?;

    let language = Text::new("Language:")
        .with_default(&config.language)
        .prompt()
        .context("Failed to read language")?;

    let days = CustomType::<u8>::new("Forecast days:")
        .with_default(config.forecast_days)
        .with_error_message("Please enter a number")
        .prompt()
        .context("Failed to read forecast days")?;

    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }
    config.city = Some(city.trim().to_string()).filter(|c| !c.is_empty());
    config.language = language.trim().to_string();
    config.forecast_days = days.clamp(1, MAX_FORECAST_DAYS);

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
