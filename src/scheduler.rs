use std::env;

use anyhow::Result;
use tokio::task;

use crate::{config::SETTINGS, event, logging};

/// Starts the background jobs. Today that is the single quote-board cycle.
pub async fn start() -> Result<()> {
    task::spawn(async move {
        if let Err(why) = event::stonks::execute().await {
            logging::error_file_async(format!("{:?}", why));
        }
    });

    if SETTINGS.finnhub.uses_fallback_token() {
        logging::warn_file_async(
            "FINNHUB_TOKEN is not set, using the bundled sandbox token (test use only)"
                .to_string(),
        );
    }

    logging::info_file_async(format!(
        "stonk_dashboard started. OS/Arch: {}/{} watch list: {:?}",
        env::consts::OS,
        env::consts::ARCH,
        SETTINGS.system.symbols
    ));

    Ok(())
}
