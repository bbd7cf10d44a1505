use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("no new items were found in the search API")]
    NoResults,

    #[error("{api} API returned status {status}")]
    UpstreamStatus { api: &'static str, status: u16 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("record is missing field '{field}'")]
    MissingField { field: String },

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EtlError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        EtlError::MissingField {
            field: field.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
