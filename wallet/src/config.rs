// daemon RPC address by default when none specified
pub const DEFAULT_DAEMON_ADDRESS: &str = "http://127.0.0.1:8999";

// Auto reconnect interval in seconds for the network handler
pub const AUTO_RECONNECT_INTERVAL: u64 = 5;

// Seconds between two daemon polls
pub const POLL_INTERVAL: u64 = 5;

// Seconds before an RPC request is given up
pub const REQUEST_TIMEOUT: u64 = 30;

// Events kept per subscriber before the oldest are dropped
pub const EVENT_CHANNEL_SIZE: usize = 64;
