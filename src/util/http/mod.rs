use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use rustls::crypto::{ring, CryptoProvider};
use serde::Serialize;

use crate::logging;

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

/// Maximum number of attempts for one logical request.
const MAX_RETRIES: usize = 2;

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
///
/// # Returns
///
/// * Result<&'static Client>: A reference to the reqwest client instance,
///   or an error if the client cannot be created.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        // rustls needs a process-wide crypto provider before the first client
        // is built. Racing installs are fine, the loser keeps the winner's.
        if CryptoProvider::get_default().is_none() {
            let _ = CryptoProvider::install_default(ring::default_provider());
        }

        Client::builder()
            .brotli(true)
            .gzip(true)
            .zstd(true)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(8))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .http2_keep_alive_interval(Duration::from_secs(30))
            .http2_keep_alive_while_idle(true)
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request with the query attached via the request
/// builder, so the `url` string (and everything logged from it) stays free of
/// credential values.
///
/// # Returns
///
/// * `Result<Response>`: The raw response. Status handling is the caller's
///   business; only transport-level failures are errors here.
pub async fn get_with_query<Q>(url: &str, query: &Q) -> Result<Response>
where
    Q: Serialize + ?Sized,
{
    send(Method::GET, url, None, Some(|rb: RequestBuilder| rb.query(query))).await
}

/// Performs an HTTP POST request with a JSON body.
///
/// Returns the raw response rather than deserializing it, so callers can
/// treat bodyless statuses (the dashboard answers 204) as success.
pub async fn post_json<REQ>(
    url: &str,
    headers: Option<header::HeaderMap>,
    req: &REQ,
) -> Result<Response>
where
    REQ: Serialize,
{
    send(Method::POST, url, headers, Some(|rb: RequestBuilder| rb.json(req))).await
}

/// Sends an HTTP request using the specified method, URL, headers, and body
/// with retries on failure.
///
/// A non-2xx status is still a successful send; only transport errors are
/// retried. The delay grows with each attempt.
///
/// # Errors
///
/// Returns an `Err` if the request fails to send after [`MAX_RETRIES`]
/// attempts. The error message includes the retry count and the last
/// underlying request error.
async fn send(
    method: Method,
    url: &str,
    headers: Option<header::HeaderMap>,
    body: Option<impl FnOnce(RequestBuilder) -> RequestBuilder>,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client()?;
    let mut rb = client.request(method, url);
    let mut last_error = String::new();

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    if let Some(body_fn) = body {
        rb = body_fn(rb);
    }

    for attempt in 1..=MAX_RETRIES {
        let rb_clone = rb
            .try_clone()
            .ok_or_else(|| anyhow!("Failed to clone RequestBuilder"))?;
        let start = Instant::now();

        match rb_clone.send().await {
            Ok(response) => {
                logging::debug_file_async(format!(
                    "Attempt {} to send {} took {} ms",
                    attempt,
                    visit_log,
                    start.elapsed().as_millis()
                ));
                return Ok(response);
            }
            Err(why) => {
                last_error = format!("{:?}", why);
                logging::error_file_async(format!(
                    "Attempt {} to send {} failed: {}",
                    attempt, visit_log, last_error
                ));

                if attempt < MAX_RETRIES {
                    tokio::time::sleep(Duration::from_millis(200 * attempt as u64)).await;
                }
            }
        }
    }

    Err(anyhow!(
        "Failed to send {} after {} attempts: {}",
        visit_log,
        MAX_RETRIES,
        last_error
    ))
}
