use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, Validate,
};
use crate::utils::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "meli-etl")]
#[command(about = "ETL pipeline for MercadoLibre product listings")]
pub struct CliConfig {
    /// Request products filtered by name, e.g. 'Iphone 11'.
    #[arg(long, default_value = "Iphone 11")]
    pub query: String,

    /// Maximum amount of products to be requested.
    #[arg(long, default_value_t = 200)]
    pub max_items: usize,

    /// Client seller id; products published by this seller are omitted.
    #[arg(long, default_value_t = 82916233)]
    pub exclude_seller_id: i64,

    /// Path of the SQLite database file.
    #[arg(long, default_value = "meli.db")]
    pub database: String,

    /// Country site alias, e.g. MLB (Mercado Libre Brasil).
    #[arg(long, default_value = "MLB")]
    pub site: String,

    /// Delete all data currently stored in the database before running.
    #[arg(long)]
    pub new_db: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("query", &self.query)?;
        validate_positive_number("max_items", self.max_items, 1)?;
        validate_non_empty_string("site", &self.site)?;
        validate_path("database", &self.database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CliConfig {
        CliConfig::parse_from(["meli-etl"])
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_zero_max_items_is_rejected() {
        let mut config = config();
        config.max_items = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let mut config = config();
        config.query = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
