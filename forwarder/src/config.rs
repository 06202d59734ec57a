use clap::Parser;
use log::LevelFilter;
use pecunia_common::{config::VERSION, network::Network};
use pecunia_wallet::config::DEFAULT_DAEMON_ADDRESS;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Sits on the network and forwards every payment it receives, minus the
/// relay fee, to the given address once the payment is confirmed.
#[derive(Parser, Clone, Debug)]
#[command(name = "pecunia-forwarder", version = VERSION)]
pub struct Config {
    /// Address the received coins are forwarded to
    pub destination: String,

    /// Network to run on
    #[clap(value_enum, default_value_t = Network::Mainnet)]
    pub network: Network,

    /// Daemon RPC address to connect to
    #[clap(long, default_value_t = String::from(DEFAULT_DAEMON_ADDRESS))]
    pub daemon_address: String,

    /// Confirmation depth a payment must reach before it is forwarded
    #[clap(long, default_value_t = 1)]
    pub confirmations: u32,

    /// Set log level
    #[clap(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}
