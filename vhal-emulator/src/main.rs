//! Vehicle HAL Emulator
//!
//! Runs the emulated vehicle and serves it on the debug socket so a remote
//! test harness can read and write properties without hardware.
//!
//! Usage: `vhal-emulator [settings.json]`

mod settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use settings::Settings;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vhal_proto::ids;
use vhal_server::{EmulatorServer, VehicleHal};
use vhal_sim::{PropertyCatalog, StaticCatalog};

/// How long to wait for an active session after shutdown is requested
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings_arg = std::env::args_os().nth(1).map(PathBuf::from);
    let loaded = Settings::load(settings_arg);
    let settings = loaded.as_ref().ok().cloned().unwrap_or_default();

    // Include all our crates in the default filter
    let default_filter = settings
        .log_filter
        .clone()
        .unwrap_or_else(|| "vhal_emulator=info,vhal_proto=info,vhal_sim=info,vhal_server=info".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = &loaded {
        warn!("Using default settings: {:#}", e);
    }

    info!("Starting vehicle HAL emulator");

    let catalog: Arc<dyn PropertyCatalog> = match &settings.catalog_path {
        Some(path) => {
            info!("Loading catalog from {}", path.display());
            Arc::new(
                StaticCatalog::load(path)
                    .with_context(|| format!("failed to load catalog {}", path.display()))?,
            )
        }
        None => Arc::new(StaticCatalog::builtin()),
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let hal = Arc::new(VehicleHal::new(catalog, events_tx));

    let server = EmulatorServer::new(settings.server_config()?, Arc::clone(&hal))
        .spawn()
        .await
        .context("failed to start emulator server")?;

    loop {
        tokio::select! {
            event = events_rx.recv() => match event {
                Some(value) => info!(
                    prop = value.prop,
                    area = value.area_id,
                    "{} changed: {:?}",
                    ids::name(value.prop).unwrap_or("property"),
                    value.value
                ),
                None => break,
            },
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Shutting down");
                break;
            }
        }
    }

    server.shutdown();
    match tokio::time::timeout(SHUTDOWN_GRACE, server.join()).await {
        Ok(result) => result?,
        Err(_) => warn!("Harness still connected, exiting without waiting for it"),
    }

    Ok(())
}
