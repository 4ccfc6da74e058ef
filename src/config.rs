use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::logging;

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub finnhub: Finnhub,
    #[serde(default)]
    pub dashboard: Dashboard,
    #[serde(default)]
    pub system: System,
}

const FINNHUB_ENDPOINT: &str = "FINNHUB_ENDPOINT";
const FINNHUB_TOKEN: &str = "FINNHUB_TOKEN";

/// Sandbox credential used when `FINNHUB_TOKEN` is absent. Fine for local
/// poking, never for production traffic.
const FALLBACK_TOKEN: &str = "brn42q7rh5r8ci1414tg";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Finnhub {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_token")]
    pub token: String,
}

impl Finnhub {
    /// True while the credential is still the bundled sandbox token.
    pub fn uses_fallback_token(&self) -> bool {
        self.token == FALLBACK_TOKEN
    }
}

impl Default for Finnhub {
    fn default() -> Self {
        Finnhub {
            endpoint: default_endpoint(),
            token: default_token(),
        }
    }
}

fn default_endpoint() -> String {
    "https://finnhub.io/api/v1".to_string()
}

fn default_token() -> String {
    FALLBACK_TOKEN.to_string()
}

const DASHBOARD_URL: &str = "DASHBOARD_URL";
const DASHBOARD_AUTH_TOKEN: &str = "DASHBOARD_AUTH_TOKEN";
const DASHBOARD_WIDGET: &str = "DASHBOARD_WIDGET";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Dashboard {
    #[serde(default = "default_dashboard_url")]
    pub url: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_widget")]
    pub widget: String,
}

impl Default for Dashboard {
    fn default() -> Self {
        Dashboard {
            url: default_dashboard_url(),
            auth_token: String::new(),
            widget: default_widget(),
        }
    }
}

fn default_dashboard_url() -> String {
    "http://127.0.0.1:3030".to_string()
}

fn default_widget() -> String {
    "stonks".to_string()
}

const SYSTEM_TICK_INTERVAL_SECS: &str = "SYSTEM_TICK_INTERVAL_SECS";
const SYSTEM_WORKER_POOL_SIZE: &str = "SYSTEM_WORKER_POOL_SIZE";
const SYSTEM_SYMBOLS: &str = "SYSTEM_SYMBOLS";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct System {
    /// Seconds between two refresh cycles of the board.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Upper bound on concurrent quote fetches within one cycle.
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
    /// Watch list published to the board.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
}

impl Default for System {
    fn default() -> Self {
        System {
            tick_interval_secs: default_tick_interval_secs(),
            worker_pool_size: default_worker_pool_size(),
            symbols: default_symbols(),
        }
    }
}

fn default_tick_interval_secs() -> u64 {
    10
}

fn default_worker_pool_size() -> usize {
    8
}

fn default_symbols() -> Vec<String> {
    ["AAPL", "TSLA", "MSFT", "Z", "TSM", "TWTR", "FB", "ARKW", "ARKG"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// Environment values win over whatever `app.json` said.
    fn override_with_env(mut self) -> Self {
        if let Ok(endpoint) = env::var(FINNHUB_ENDPOINT) {
            self.finnhub.endpoint = endpoint;
        }

        if let Ok(token) = env::var(FINNHUB_TOKEN) {
            self.finnhub.token = token;
        }

        if let Ok(url) = env::var(DASHBOARD_URL) {
            self.dashboard.url = url;
        }

        if let Ok(auth_token) = env::var(DASHBOARD_AUTH_TOKEN) {
            self.dashboard.auth_token = auth_token;
        }

        if let Ok(widget) = env::var(DASHBOARD_WIDGET) {
            self.dashboard.widget = widget;
        }

        if let Ok(secs) = env::var(SYSTEM_TICK_INTERVAL_SECS) {
            self.system.tick_interval_secs =
                u64::from_str(&secs).unwrap_or_else(|_| default_tick_interval_secs());
        }

        if let Ok(size) = env::var(SYSTEM_WORKER_POOL_SIZE) {
            self.system.worker_pool_size =
                usize::from_str(&size).unwrap_or_else(|_| default_worker_pool_size());
        }

        if let Ok(symbols) = env::var(SYSTEM_SYMBOLS) {
            let list: Vec<String> = symbols
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();

            if list.is_empty() {
                logging::error_file_async(format!(
                    "{} is set but contains no symbols, keeping the previous watch list",
                    SYSTEM_SYMBOLS
                ));
            } else {
                self.system.symbols = list;
            }
        }

        self
    }
}

/// Path of the optional JSON settings file.
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let app: App = serde_json::from_str("{}").expect("empty config should deserialize");

        assert_eq!(app.finnhub.endpoint, "https://finnhub.io/api/v1");
        assert!(app.finnhub.uses_fallback_token());
        assert_eq!(app.dashboard.widget, "stonks");
        assert_eq!(app.system.tick_interval_secs, 10);
        assert_eq!(app.system.worker_pool_size, 8);
        assert!(app.system.symbols.contains(&"AAPL".to_string()));
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let app: App = serde_json::from_str(r#"{"system": {"worker_pool_size": 2}}"#)
            .expect("partial config should deserialize");

        assert_eq!(app.system.worker_pool_size, 2);
        assert_eq!(app.system.tick_interval_secs, 10);
        assert_eq!(app.dashboard.widget, "stonks");
    }
}
