pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod etl;
pub mod metrics;
pub mod utils;

pub use api::MeliClient;
pub use config::CliConfig;
pub use db::DbClient;
pub use domain::Record;
pub use etl::{etl_factory, EtlPipeline};
pub use metrics::MetricsRegistry;
pub use utils::error::{EtlError, Result};
