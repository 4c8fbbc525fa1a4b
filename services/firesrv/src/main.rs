//! Fire detection monitor
//!
//! Runs until SIGINT/SIGTERM, then silences the buzzer and resets the display.

use anyhow::Context;
use common::service_bootstrap::{self, ServiceInfo};
use common::{Parser, ServiceArgs};
use tracing::{error, info};

use firesrv::{FireConfig, FireMonitor, Hardware, NotifierClients, SERVICE_NAME, SERVICE_VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServiceArgs::parse();
    let service_info = ServiceInfo::new(SERVICE_NAME, SERVICE_VERSION, "Fire detection monitor");

    // Config is read first so that it can choose the log directory; the
    // loader's own log lines are lost, so the sources are reported below
    let config_file = args.config_file(SERVICE_NAME);
    let config = FireConfig::load(Some(&config_file));
    let log_dir = config.as_ref().ok().and_then(|c| c.log_dir.clone());
    service_bootstrap::init_logging(&service_info, &args, log_dir.as_deref())?;
    if !args.no_color {
        service_bootstrap::print_startup_banner(&service_info);
    }
    for source in FireConfig::sources(Some(&config_file)) {
        info!("Configuration: {}", source);
    }

    let config = config.context("Failed to load configuration")?;

    if args.validate {
        for line in config.summary() {
            info!("{}", line);
        }
        info!("Validation completed successfully");
        return Ok(());
    }

    let hardware = open_hardware(&args, &config)?;
    let clients = NotifierClients::from_config(&config)?;
    let mut handle = FireMonitor::new(config, hardware, clients).start();

    tokio::select! {
        signal = common::shutdown::wait_for_shutdown() => {
            info!("{} received, shutting down", signal);
        },
        result = handle.join() => {
            if let Err(e) = result {
                error!("Monitor stopped unexpectedly: {}", e);
            }
        },
    }

    handle.shutdown().await;
    Ok(())
}

#[cfg(feature = "hardware")]
fn open_hardware(args: &ServiceArgs, config: &FireConfig) -> anyhow::Result<Hardware> {
    if args.simulate {
        return Ok(Hardware::simulated(config));
    }
    Hardware::linux(config).context("Failed to open hardware")
}

#[cfg(not(feature = "hardware"))]
fn open_hardware(args: &ServiceArgs, config: &FireConfig) -> anyhow::Result<Hardware> {
    if !args.simulate {
        info!("Built without the `hardware` feature, simulating");
    }
    Ok(Hardware::simulated(config))
}
