use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized snapshot quote for one symbol, as published to the board.
///
/// Every price field is optional because the provider nulls them for symbols
/// it knows but has no trade data for. A `Quote` is only ever produced from a
/// clean response; a failed fetch becomes a [`FetchError`] instead.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub current: Option<f64>,
    pub previous_close: Option<f64>,
    /// Unix seconds of the provider snapshot.
    pub timestamp: Option<i64>,
}

/// Per-symbol fetch failure.
///
/// One variant per failure class, each carrying the symbol it belongs to so
/// the batch layer can log and drop it without touching its siblings.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network-level failure: refused connection, request timeout, or an
    /// elapsed task ceiling.
    #[error("transport failure for {symbol}: {detail}")]
    Transport { symbol: String, detail: String },

    /// The endpoint answered with a status other than 200.
    #[error("unexpected status {status} for {symbol}: {body}")]
    Response {
        symbol: String,
        status: u16,
        body: String,
    },

    /// A 200 response whose body does not parse as a quote.
    #[error("malformed quote body for {symbol}: {detail}")]
    Malformed { symbol: String, detail: String },

    /// A 200 response whose own `err` field is set.
    #[error("provider error for {symbol}: {message}")]
    Provider { symbol: String, message: String },
}

impl FetchError {
    pub fn transport(symbol: &str, detail: impl ToString) -> Self {
        FetchError::Transport {
            symbol: symbol.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn response(symbol: &str, status: u16, body: String) -> Self {
        FetchError::Response {
            symbol: symbol.to_string(),
            status,
            // Enough body to diagnose, not enough to flood the log.
            body: body.chars().take(256).collect(),
        }
    }

    pub fn malformed(symbol: &str, detail: impl ToString) -> Self {
        FetchError::Malformed {
            symbol: symbol.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn provider(symbol: &str, message: String) -> Self {
        FetchError::Provider {
            symbol: symbol.to_string(),
            message,
        }
    }

    /// Symbol the failure belongs to.
    pub fn symbol(&self) -> &str {
        match self {
            FetchError::Transport { symbol, .. }
            | FetchError::Response { symbol, .. }
            | FetchError::Malformed { symbol, .. }
            | FetchError::Provider { symbol, .. } => symbol,
        }
    }
}
