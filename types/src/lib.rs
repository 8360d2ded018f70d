pub mod network;
pub mod video;

pub use alloy_primitives::{Address, TxHash, U256};
pub use network::{ChainId, NativeCurrency, NetworkParams};
pub use video::{ContentId, NewVideo, VideoRecord};
