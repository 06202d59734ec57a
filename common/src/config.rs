use crate::static_assert;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 8 decimals numbers
pub const COIN_DECIMALS: u8 = 8;
// 100 000 000 to represent 1 PEC
pub const COIN_VALUE: u64 = 10u64.pow(COIN_DECIMALS as u32);
// 50M full coin
pub const MAXIMUM_SUPPLY: u64 = 50_000_000 * COIN_VALUE;

// Fixed minimum relay fee: 0.0001 PEC
// Every spend built by the wallet attaches at least this fee
pub const MIN_TX_FEE: u64 = 10_000;

// Expected duration of one retarget window, in seconds
pub const TARGET_TIMESPAN: u64 = 14 * 24 * 60 * 60;
// Expected spacing between two blocks, in seconds
pub const TARGET_SPACING: u64 = 10 * 60;
// Blocks between two difficulty retargets
pub const RETARGET_INTERVAL: u32 = (TARGET_TIMESPAN / TARGET_SPACING) as u32;

// A coinbase output cannot be spent before it is buried this deep
pub const SPENDABLE_COINBASE_DEPTH: u32 = 100;

// Static checks
static_assert!(
    MIN_TX_FEE < COIN_VALUE,
    "Minimum fee must be smaller than one coin"
);
static_assert!(
    TARGET_TIMESPAN % TARGET_SPACING == 0,
    "Retarget window must be a whole number of blocks"
);
