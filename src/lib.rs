pub mod catalog;
pub mod collection;
pub mod config;
pub mod core;
pub mod domain;
pub mod narration;
pub mod playlist;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub mod app;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use catalog::{Catalog, CatalogStore};
pub use config::{cli::LocalStorage, toml_config::AppConfig};
pub use core::{etl::EtlEngine, pipeline::ImportPipeline};
pub use domain::YearMonth;
pub use utils::error::{HakoakeError, Result};
