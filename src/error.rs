use thiserror::Error;

use crate::path_graph::Asn;

/// Errors produced while querying the RIPEstat API and assembling graphs.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no AS paths matched origin AS{filter}")]
    EmptyResult { filter: Asn },

    #[error("unsupported event type '{kind}' at {timestamp}")]
    UnsupportedEvent { kind: String, timestamp: String },

    #[error("invalid resource '{0}': expected an IP prefix or an ASN")]
    InvalidResource(String),

    #[error("invalid ASN '{0}'")]
    InvalidAsn(String),

    #[error("invalid timestamp '{0}': expected YYYY-MM-DDTHH:MM:SS")]
    InvalidTimestamp(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
