use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("invalid {field} '{value}': not a finite number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} {value} is out of range [{min}, {max}]")]
    CoordinateOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid search radius {0}: must be a finite value greater than zero")]
    InvalidRadius(f64),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unreadable {collection} record #{index}: {reason}")]
    Feed {
        collection: &'static str,
        index: usize,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MarketError>;
