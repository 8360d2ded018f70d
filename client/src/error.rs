use thiserror::Error;
use types::TxHash;

use crate::{utils::price::PriceError, wallet::RpcError};

#[derive(Debug, Error)]
pub enum PinningError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    /// Error detail reported by the pinning service, kept verbatim
    #[error("{0}")]
    Service(String),
    #[error("failed to obtain pinning credentials: {0}")]
    Credentials(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("wallet not detected")]
    NoWallet,
    #[error("connect wallet first")]
    NotConnected,
    #[error("please switch to {0}")]
    WrongNetwork(String),
    #[error("{0}")]
    Rpc(#[from] RpcError),
    #[error("failed to decode contract response: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    #[error("malformed wallet response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("contract returned video lists of different lengths")]
    MalformedVideoList,
    #[error("display time of video {0} is out of range")]
    DisplayTimeOutOfRange(u64),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("{0}")]
    Pinning(#[from] PinningError),
    #[error("invalid price: {0}")]
    Price(#[from] PriceError),
    #[error("invalid view time: {0:?}")]
    DisplayTime(String),
    #[error("Fill all fields")]
    IncompleteForm,
    #[error("no video selected")]
    NoSelection,
    #[error("permission check still in progress")]
    PermissionPending,
    #[error("payment already in progress")]
    PaymentInFlight,
    #[error("upload already in progress")]
    UploadInFlight,
    #[error("{0}")]
    Url(#[from] url::ParseError),
    #[error("{0}")]
    Config(#[from] config_kv::KVFetchError),
}

impl Error {
    /// Errors caused by a missing wallet, account or wrong network
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::NoWallet | Error::NotConnected | Error::WrongNetwork(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
