//! Core library for the `myweather` client.
//!
//! This crate defines:
//! - The request execution pipeline (one call in, one typed result out)
//! - The WeatherAPI.com client and the repository built on top of it
//! - Wire models and the view models derived from them
//! - Configuration & credentials handling
//!
//! It is used by `myweather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod executor;
pub mod model;
pub mod repository;
pub mod service;
pub mod view;

pub use config::Config;
pub use executor::{Cancelled, ExecutionResult, FaultKind, RequestExecutor, StructuredError};
pub use repository::WeatherRepository;
pub use service::{WeatherApiClient, WeatherService};
pub use view::{CurrentSummary, WeatherOverview};
