use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    crawler::finnhub::Finnhub,
    declare::{FetchError, Quote},
    logging,
    util::http,
};

/// Wire schema of `GET /quote`. Every field is optional; the provider nulls
/// or omits fields for symbols it has no trade data for.
#[derive(Serialize, Deserialize, Debug)]
struct QuoteResponse {
    o: Option<f64>,
    h: Option<f64>,
    l: Option<f64>,
    c: Option<f64>,
    pc: Option<f64>,
    t: Option<i64>,
    err: Option<String>,
}

impl Finnhub {
    /// Fetches the current quote for one symbol.
    ///
    /// Any failure comes back as a [`FetchError`] carrying the symbol, so the
    /// caller can drop it without disturbing sibling fetches. A 200 response
    /// whose own `err` field is set counts as a failure too.
    pub async fn quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let url = format!("{}/quote", self.endpoint);

        logging::info_file_async(format!(
            "GET {} symbol={} token=<redacted>",
            url, symbol
        ));

        let response = http::get_with_query(
            &url,
            &[("symbol", symbol), ("token", self.token.as_str())],
        )
        .await
        .map_err(|why| FetchError::transport(symbol, why))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            logging::error_file_async(format!(
                "quote request for {} failed: status={} body={}",
                symbol, status, body
            ));
            return Err(FetchError::response(symbol, status.as_u16(), body));
        }

        let raw: QuoteResponse = response
            .json()
            .await
            .map_err(|why| FetchError::malformed(symbol, why))?;

        if let Some(message) = raw.err {
            return Err(FetchError::provider(symbol, message));
        }

        Ok(Quote {
            symbol: symbol.to_string(),
            open: raw.o,
            high: raw.h,
            low: raw.l,
            current: raw.c,
            previous_close: raw.pc,
            timestamp: raw.t,
        })
    }
}
