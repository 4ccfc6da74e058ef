use std::time::Duration;

use anyhow::Result;
use tokio::time::{self, Instant};

use crate::{
    config::SETTINGS,
    crawler::{self, finnhub::Finnhub},
    dashboard::smashing::{Widget, WidgetItem},
    logging,
};

/// The quote-board cycle: on every tick, fetch the whole watch list and
/// publish whatever succeeded.
///
/// Collaborators arrive through the constructor; nothing here reads process
/// state, so a cycle can be driven against any endpoint and any sink.
pub struct StonkBoard {
    provider: Finnhub,
    widget: Widget,
    symbols: Vec<String>,
    pool_size: usize,
    tick_interval: Duration,
}

impl StonkBoard {
    pub fn new(
        provider: Finnhub,
        widget: Widget,
        mut symbols: Vec<String>,
        pool_size: usize,
        tick_interval: Duration,
    ) -> Self {
        // One fetch per symbol per cycle, in a stable log order.
        symbols.sort();
        symbols.dedup();

        StonkBoard {
            provider,
            widget,
            symbols,
            pool_size,
            tick_interval,
        }
    }

    pub fn from_settings() -> Self {
        StonkBoard::new(
            Finnhub::from_settings(),
            Widget::from_settings(),
            SETTINGS.system.symbols.clone(),
            SETTINGS.system.worker_pool_size,
            Duration::from_secs(SETTINGS.system.tick_interval_secs),
        )
    }

    /// Runs one cycle and returns the number of published items.
    ///
    /// A cycle where every fetch failed still publishes an empty list.
    pub async fn publish_once(&self) -> Result<usize> {
        let quotes =
            crawler::fetch_quote_batch(&self.provider, &self.symbols, self.pool_size).await;

        let items: Vec<WidgetItem> = quotes
            .into_iter()
            .map(|quote| WidgetItem {
                label: quote.symbol,
                value: quote.current,
            })
            .collect();

        self.widget.send(&items).await?;

        Ok(items.len())
    }

    /// Ticks forever. A failed cycle is logged and swallowed; the next tick
    /// starts from scratch, no state survives between cycles.
    pub async fn run(self) -> Result<()> {
        let mut task_interval = time::interval_at(Instant::now(), self.tick_interval);

        loop {
            task_interval.tick().await;

            if let Err(why) = self.publish_once().await {
                logging::error_file_async(format!("stonks cycle failed: {:?}", why));
            }
        }
    }
}

pub async fn execute() -> Result<()> {
    StonkBoard::from_settings().run().await
}
