use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Hex encoded chain id as reported by the wallet (e.g `0x221`)
///
/// Comparison is string-exact.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Parameters of the network the app runs on.
/// Serializes into the shape expected by `wallet_addEthereumChain`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkParams {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkParams {
    pub fn flow_evm_testnet() -> Self {
        Self {
            chain_id: ChainId::new("0x221"),
            chain_name: "Flow EVM Testnet".into(),
            native_currency: NativeCurrency {
                name: "Flow".into(),
                symbol: "FLOW".into(),
                decimals: 18,
            },
            rpc_urls: vec!["https://evm.testnet.flowchain.dev".into()],
            block_explorer_urls: vec!["https://testnet.flowscan.org/".into()],
        }
    }

    pub fn matches(&self, chain_id: &ChainId) -> bool {
        &self.chain_id == chain_id
    }
}
