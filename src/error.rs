//! Error types
//!
//! Extraction itself never fails outward: `ExtractError` only travels from an
//! extractor to the assembler, which logs it and substitutes an empty list.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unexpected shape for field `{field}`: {detail}")]
    UnexpectedShape { field: &'static str, detail: String },

    #[error("invalid JSON in field `{field}`: {source}")]
    Json {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("itinerary id `{0}` is a temporary placeholder")]
    PlaceholderId(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("failed to decode response from {url}: {detail}")]
    Decode { url: String, detail: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}
