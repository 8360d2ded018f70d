//! EIP-1193 wallet adapter interface and a typed wrapper around it

mod events;

pub use events::*;

use std::{future::Future, rc::Rc};

use alloy_primitives::{Bytes, U64};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use types::{Address, ChainId, NetworkParams, TxHash, U256};

use crate::Result;

/// User rejected the request
pub const USER_REJECTED: i64 = 4001;
/// Chain is not known to the wallet, it has to be added first
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// Error object returned by the wallet
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Error)]
#[error("{message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == UNRECOGNIZED_CHAIN
    }
}

/// Provider injected by the wallet extension.
///
/// Futures are not required to be `Send`, everything runs on the
/// browser's event loop.
pub trait Eip1193 {
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = std::result::Result<Value, RpcError>>;

    fn subscribe(&self, kind: EventKind) -> Subscription;
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status != Some(U64::ZERO)
    }
}

/// Typed access to an [`Eip1193`] provider
pub struct Wallet<P> {
    provider: Rc<P>,
}

impl<P> Clone for Wallet<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
        }
    }
}

impl<P: Eip1193> Wallet<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Rc::new(provider),
        }
    }

    pub fn from_rc(provider: Rc<P>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        log::debug!("wallet request {method}");
        let res = self.provider.request(method, params).await?;
        Ok(serde_json::from_value(res)?)
    }

    pub async fn chain_id(&self) -> Result<ChainId> {
        self.request("eth_chainId", json!([])).await
    }

    /// Accounts the dApp is already authorised for, doesn't prompt the user
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_accounts", json!([])).await
    }

    pub async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_requestAccounts", json!([])).await
    }

    pub async fn switch_chain(&self, chain_id: &ChainId) -> std::result::Result<(), RpcError> {
        self.provider
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": chain_id }]),
            )
            .await
            .map(|_| ())
    }

    pub async fn add_chain(&self, network: &NetworkParams) -> std::result::Result<(), RpcError> {
        self.provider
            .request("wallet_addEthereumChain", json!([network]))
            .await
            .map(|_| ())
    }

    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
    }

    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash> {
        self.request("eth_sendTransaction", json!([tx])).await
    }

    pub async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TransactionReceipt>> {
        self.request("eth_getTransactionReceipt", json!([hash]))
            .await
    }

    pub fn subscribe(&self, kind: EventKind) -> Subscription {
        self.provider.subscribe(kind)
    }
}
