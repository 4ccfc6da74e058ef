use crate::config::SETTINGS;

pub mod quote;

/// Finnhub REST client bound to one endpoint and one credential.
///
/// The struct is cheap to clone and holds no connection state; all requests
/// go through the shared client in [`crate::util::http`].
#[derive(Debug, Clone)]
pub struct Finnhub {
    endpoint: String,
    token: String,
}

impl Finnhub {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        let endpoint = endpoint.into();

        Finnhub {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_settings() -> Self {
        Finnhub::new(
            SETTINGS.finnhub.endpoint.as_str(),
            SETTINGS.finnhub.token.as_str(),
        )
    }
}
