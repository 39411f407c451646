use std::error::Error;
use std::io::Write;

use env_logger::Builder;
use flightwatch::api::{
    kiwi::KiwiSource,
    mock::StableMockSource,
    notify::notifier_from,
    source::{FlightSource, WithFallback},
};
use flightwatch::{Monitor, MonitorConfig};
use log::{error, info, LevelFilter};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("flightwatch", LevelFilter::Debug)
        .parse_default_env()
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(buf, "[{} {:<5} {}] {}", ts, record.level(), record.target(), record.args())
        })
        .target(env_logger::Target::Stderr)
        .init();

    info!("Starting flightwatch...");

    let config = MonitorConfig::from_env_or_default();
    let source: Box<dyn FlightSource> = if config.use_real {
        Box::new(WithFallback::new(KiwiSource::new(config.api_key.clone())?, StableMockSource::new()))
    } else {
        Box::new(StableMockSource::new())
    };
    let notifier = notifier_from(&config.bot_token, &config.chat_id)?;
    let monitor = Monitor::new(config, source, notifier);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Could not listen for Ctrl+C, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Interrupt received, stopping after the current cycle");
        let _ = shutdown_tx.send(true);
    });

    monitor.run(shutdown_rx).await;

    info!("Shutdown complete");
    Ok(())
}
