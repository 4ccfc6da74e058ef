pub mod config;
pub mod crawler;
pub mod dashboard;
pub mod declare;
pub mod event;
pub mod logging;
pub mod scheduler;
pub mod util;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    scheduler::start().await?;

    // All jobs run in spawned tasks; keep the process alive.
    futures::future::pending::<()>().await;

    Ok(())
}
