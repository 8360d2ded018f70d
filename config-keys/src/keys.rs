use std::sync::LazyLock;

use types::{Address, NetworkParams};
use url::Url;

use crate::{key_derive, key_name};

pub const DEFAULT_PINNING_ENDPOINT: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";
pub const DEFAULT_GATEWAY_BASE: &str = "https://gateway.pinata.cloud/ipfs/";

pub static PINNING_ENDPOINT: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_PINNING_ENDPOINT).unwrap());
pub static GATEWAY_BASE: LazyLock<Url> = LazyLock::new(|| Url::parse(DEFAULT_GATEWAY_BASE).unwrap());

/// Network every contract call must be made on
pub struct RequiredNetworkKey;
key_name!(RequiredNetworkKey, "required_network");
key_derive!(RequiredNetworkKey => NetworkParams | NetworkParams::flow_evm_testnet());

/// Deployed pay-per-view contract
pub struct ContractAddressKey;
key_name!(ContractAddressKey, "contract_address");
key_derive!(ContractAddressKey => Address);

/// Single file upload endpoint of the pinning service
pub struct PinningEndpointKey;
key_name!(PinningEndpointKey, "pinning_endpoint");
key_derive!(PinningEndpointKey => Url | PINNING_ENDPOINT.clone());

/// Gateway used to build media urls from content identifiers
pub struct GatewayBaseKey;
key_name!(GatewayBaseKey, "gateway_base");
key_derive!(GatewayBaseKey => Url | GATEWAY_BASE.clone());

/// Server side endpoint handing out short lived pinning credentials
pub struct CredentialIssuerKey;
key_name!(CredentialIssuerKey, "credential_issuer");
key_derive!(CredentialIssuerKey => Url);

/// Endpoint receiving client metric events, metrics are only logged
/// without one
pub struct MetricsIngestKey;
key_name!(MetricsIngestKey, "metrics_ingest");
key_derive!(MetricsIngestKey => Url);
