use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::{config::SETTINGS, util::http};

/// One row of the board: the symbol and its current price. `value` stays
/// null when the provider had no trade to report, the widget renders a dash.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WidgetItem {
    pub label: String,
    pub value: Option<f64>,
}

/// Body shape the Smashing widgets API expects: the auth token rides in the
/// payload next to the data.
#[derive(Serialize)]
struct WidgetPayload<'a> {
    auth_token: &'a str,
    items: &'a [WidgetItem],
}

/// Client for one dashboard widget.
#[derive(Debug, Clone)]
pub struct Widget {
    widget_url: String,
    auth_token: String,
}

impl Widget {
    pub fn new(dashboard_url: &str, widget: &str, auth_token: impl Into<String>) -> Self {
        Widget {
            widget_url: format!("{}/widgets/{}", dashboard_url.trim_end_matches('/'), widget),
            auth_token: auth_token.into(),
        }
    }

    pub fn from_settings() -> Self {
        Widget::new(
            &SETTINGS.dashboard.url,
            &SETTINGS.dashboard.widget,
            SETTINGS.dashboard.auth_token.as_str(),
        )
    }

    /// Publishes one batch of items, replacing whatever the widget showed
    /// before. Fire and forget: any 2xx counts as delivered (Smashing
    /// answers 204) and the response body is ignored.
    pub async fn send(&self, items: &[WidgetItem]) -> Result<()> {
        let payload = WidgetPayload {
            auth_token: &self.auth_token,
            items,
        };

        let response = http::post_json(&self.widget_url, None, &payload)
            .await
            .map_err(|why| anyhow!("Failed to publish to {} because: {:?}", self.widget_url, why))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Dashboard rejected publish to {}: status {}",
                self.widget_url,
                response.status()
            ));
        }

        Ok(())
    }
}
