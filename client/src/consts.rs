use web_time::Duration;

/// Decimals of the native currency when the network doesn't say otherwise
pub const NATIVE_DECIMALS: u8 = 18;

pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

pub const NO_WALLET_NOTICE: &str = "wallet not detected";
