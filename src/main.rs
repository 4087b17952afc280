pub mod config;
pub mod mapping;
pub mod output;
pub mod protocol;
pub mod server;

use crate::config::BridgeConfig;
use crate::mapping::pedals;
use crate::output::{BridgeSink, OutputSink, ProcessAttach, ProcessTable};
use crate::server::BridgeHandle;
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    info!("Starting steering wheel bridge");

    // Konfiguration laden; fehlende Datei fällt auf Defaults zurück
    let mut config = BridgeConfig::load(config::CONFIG_FILE).await;
    config.validate();
    let config = Arc::new(config);

    let mut sink: Box<dyn OutputSink> = Box::new(BridgeSink::with_log_backends());

    // Release all keys on startup
    pedals::release_all(sink.as_mut());

    // An den Spielprozess anhängen; ohne laufendes Spiel kein Betrieb
    let game = ProcessTable
        .attach(&config.process_name)
        .map_err(|e| eyre!("Failed to attach to game process: {}", e))?;
    info!(
        "Game process attached: {} (pid {}, speed offset {:#x})",
        game.name, game.pid, config.speed_offset
    );

    let mut bridge = BridgeHandle::start(config.clone(), sink).await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted by user");
        }
        _ = bridge.join() => {
            info!("Supervisor stopped");
        }
    }

    // Supervisor-Stopp löst immer beide Pedaltasten
    bridge.shutdown().await?;
    info!("Bridge terminated, all keys released");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
