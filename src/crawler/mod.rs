use std::time::Duration;

use futures::{stream, StreamExt};
use tokio::time;

use crate::{
    crawler::finnhub::Finnhub,
    declare::{FetchError, Quote},
    logging,
};

pub mod finnhub;

/// Upper bound on one fetch task, over and above the HTTP client's own
/// request timeout and retry. A task that exceeds it resolves to a failure
/// and fan-in proceeds with the remaining results.
const FETCH_TASK_CEILING: Duration = Duration::from_secs(30);

/// Fetches quotes for every symbol through one bounded pool of concurrent
/// tasks and returns the successes.
///
/// One task per symbol; a task's failure never cancels or delays its
/// siblings. Failures are logged and dropped, so the result is a subset of
/// the input with every symbol at most once, ordered by task completion
/// rather than by input position. All symbols failing is not an error, the
/// batch is simply empty.
///
/// Callers pass the symbol list de-duplicated and sorted so the request log
/// reads deterministically; nothing here depends on it.
pub async fn fetch_quote_batch(
    provider: &Finnhub,
    symbols: &[String],
    limit: usize,
) -> Vec<Quote> {
    logging::info_file_async(format!(
        "fetch_quote_batch: input size: {}",
        symbols.len()
    ));

    let tasks: Vec<_> = symbols
        .iter()
        .map(|symbol| async move {
            match time::timeout(FETCH_TASK_CEILING, provider.quote(symbol)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::transport(
                    symbol,
                    format!("fetch task exceeded {:?}", FETCH_TASK_CEILING),
                )),
            }
        })
        .collect();

    let outcomes: Vec<Result<Quote, FetchError>> = stream::iter(tasks)
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    let mut quotes = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(quote) => quotes.push(quote),
            Err(why) => logging::error_file_async(format!("fetch_quote_batch error: {}", why)),
        }
    }

    logging::info_file_async(format!(
        "fetch_quote_batch: succeed count: {}",
        quotes.len()
    ));

    quotes
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use axum::{
        extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
    };
    use serde_json::json;

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener addr");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve mock");
        });

        format!("http://{}", addr)
    }

    /// Deterministic price so two runs against the mock agree byte for byte.
    fn price_for(symbol: &str) -> f64 {
        symbol.bytes().map(u64::from).sum::<u64>() as f64
    }

    async fn quote_endpoint(
        Query(params): Query<HashMap<String, String>>,
    ) -> axum::response::Response {
        match params.get("symbol").map(String::as_str) {
            Some("TSLA") => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
            Some("GME") => Json(json!({ "err": "no access" })).into_response(),
            Some(symbol) => Json(json!({
                "o": 1.0, "h": 2.0, "l": 0.5, "c": price_for(symbol),
                "t": 1_700_000_000i64, "pc": 1.5, "err": null
            }))
            .into_response(),
            None => (StatusCode::BAD_REQUEST, "missing symbol").into_response(),
        }
    }

    async fn test_provider() -> Finnhub {
        let base = serve(Router::new().route("/quote", get(quote_endpoint))).await;
        Finnhub::new(base, "test-token")
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_one_failure_never_drops_the_rest() {
        let provider = test_provider().await;

        let quotes = fetch_quote_batch(&provider, &symbols(&["AAPL", "TSLA"]), 4).await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].symbol, "AAPL");
        assert_eq!(quotes[0].current, Some(price_for("AAPL")));
    }

    #[tokio::test]
    async fn test_provider_err_symbols_are_filtered_despite_200() {
        let provider = test_provider().await;

        let quotes = fetch_quote_batch(&provider, &symbols(&["AAPL", "GME"]), 4).await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].symbol, "AAPL");
    }

    #[tokio::test]
    async fn test_all_failures_yield_an_empty_batch() {
        let provider = test_provider().await;

        let quotes = fetch_quote_batch(&provider, &symbols(&["GME", "TSLA"]), 4).await;

        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_result_is_a_unique_subset_of_the_input() {
        let provider = test_provider().await;
        let input = symbols(&["AAPL", "ARKG", "MSFT", "TSLA", "Z"]);

        let quotes = fetch_quote_batch(&provider, &input, 3).await;

        assert!(quotes.len() <= input.len());
        let seen: BTreeSet<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(seen.len(), quotes.len(), "no symbol may appear twice");
        assert!(seen.iter().all(|s| input.iter().any(|i| i == s)));
        assert_eq!(quotes.len(), 4);
    }

    #[tokio::test]
    async fn test_same_input_twice_yields_the_same_content() {
        let provider = test_provider().await;
        let input = symbols(&["AAPL", "ARKW", "MSFT", "TSLA", "Z"]);

        let mut first = fetch_quote_batch(&provider, &input, 4).await;
        let mut second = fetch_quote_batch(&provider, &input, 4).await;

        // Completion order may differ between runs; content may not.
        first.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        second.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_pool_of_one_serializes_but_still_completes() {
        let provider = test_provider().await;

        let quotes = fetch_quote_batch(&provider, &symbols(&["AAPL", "MSFT", "Z"]), 1).await;

        assert_eq!(quotes.len(), 3);
    }

    #[tokio::test]
    async fn test_zero_limit_is_clamped_instead_of_hanging() {
        let provider = test_provider().await;

        let quotes = fetch_quote_batch(&provider, &symbols(&["AAPL"]), 0).await;

        assert_eq!(quotes.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_every_symbol_quietly() {
        // Nothing listens here; every task resolves to a transport failure.
        let provider = Finnhub::new("http://127.0.0.1:1", "test-token");

        let quotes = fetch_quote_batch(&provider, &symbols(&["AAPL", "Z"]), 2).await;

        assert!(quotes.is_empty());
    }
}
