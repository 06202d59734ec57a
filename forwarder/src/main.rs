use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use pecunia_common::{
    chain::ChainParams,
    config::MIN_TX_FEE,
    crypto::Address,
    utils::format_coins,
};
use pecunia_forwarder::{config::Config, service::ForwardingService};
use pecunia_wallet::{daemon_api::DaemonAPI, network_handler::NetworkHandler, wallet::Wallet};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    setup_logger(config.log_level.into()).context("Error while setting up the logger")?;

    // building the parameters runs the genesis self-check; a corrupted
    // table aborts here, before anything touches the network
    let params = ChainParams::get(config.network);
    info!(
        "{} parameters loaded, genesis {}",
        params.network(),
        params.genesis_hash()
    );

    let destination = Address::from_string(&config.destination, params)
        .context("Invalid destination address")?;

    let node = DaemonAPI::new(&config.daemon_address)?;
    let wallet = Wallet::new(params, Arc::new(node));

    let handler = NetworkHandler::new(wallet.clone());
    handler
        .start(true)
        .await
        .with_context(|| format!("Cannot reach the daemon at {}", config.daemon_address))?;

    let service = ForwardingService::new(wallet.clone(), destination, config.confirmations);
    let events = wallet.subscribe();
    let forwarding = tokio::spawn(Arc::clone(&service).run(events));

    println!(
        "Forwarding incoming coins (minus the {} PEC fee) to {}",
        format_coins(MIN_TX_FEE),
        service.destination()
    );
    println!("Waiting for coins to arrive. Press Ctrl-C to quit.");

    tokio::signal::ctrl_c()
        .await
        .context("Error while waiting for interrupt")?;

    info!("shutting down");
    // abandon outstanding trackers first so no forward fires mid-shutdown
    wallet.shutdown();
    handler.stop().await?;
    forwarding.abort();

    Ok(())
}

fn setup_logger(level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()
        .context("logger already initialized")
}
