pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "chromium")]
pub use adapters::chromium::ChromiumLauncher;

pub use adapters::{input::CsvQuerySource, storage::CsvStorage};
pub use config::ScrapeConfig;
pub use core::{runner::BatchRunner, session::SearchSession};
pub use domain::model::{RunOutcome, RunReport};
pub use utils::error::{Result, ScrapeError};
