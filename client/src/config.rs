use config_keys::{
    ContractAddressKey, CredentialIssuerKey, GatewayBaseKey, MetricsIngestKey,
    PinningEndpointKey, RequiredNetworkKey, GATEWAY_BASE, PINNING_ENDPOINT,
};
use config_kv::{KVConfig, KVFetchError};
#[cfg(feature = "js")]
use metrics::metric_sender::js_spawn::JsSpawnMetricTx;
use metrics::metric_sender::{http::HttpMetricTx, mock::MaybeMockLocalMetricEventTx};
use types::{Address, NetworkParams};
use url::Url;
use web_time::Duration;

use crate::{
    consts::RECEIPT_POLL_INTERVAL,
    pinning::{IssuerCredentials, PinataClient},
    Result,
};

/// Deployment settings of the client
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub network: NetworkParams,
    pub contract_address: Address,
    pub pinning_endpoint: Url,
    pub gateway_base: Url,
    /// Where pinning credentials are obtained, uploads are unavailable
    /// without one
    pub credential_issuer: Option<Url>,
    /// Metrics are only logged without an ingest endpoint
    pub metrics_ingest: Option<Url>,
    pub receipt_poll_interval: Duration,
}

/// Sender posting metric events to the ingest endpoint
#[cfg(not(feature = "js"))]
pub type IngestMetricTx = HttpMetricTx;
/// Sender posting metric events to the ingest endpoint, without holding up
/// the caller
#[cfg(feature = "js")]
pub type IngestMetricTx = JsSpawnMetricTx<HttpMetricTx>;

pub type ClientMetricTx = MaybeMockLocalMetricEventTx<IngestMetricTx>;

fn optional<T>(res: std::result::Result<T, KVFetchError>) -> Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(KVFetchError::KeyNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl ClientConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            network: NetworkParams::flow_evm_testnet(),
            contract_address,
            pinning_endpoint: PINNING_ENDPOINT.clone(),
            gateway_base: GATEWAY_BASE.clone(),
            credential_issuer: None,
            metrics_ingest: None,
            receipt_poll_interval: RECEIPT_POLL_INTERVAL,
        }
    }

    pub fn with_metrics_ingest(mut self, ingest: Url) -> Self {
        self.metrics_ingest = Some(ingest);
        self
    }

    pub fn with_credential_issuer(mut self, issuer: Url) -> Self {
        self.credential_issuer = Some(issuer);
        self
    }

    /// Load every key from the config store, missing keys fall back to
    /// their defaults
    pub async fn fetch(kv: &KVConfig) -> Result<Self> {
        let contract_address = kv.get(ContractAddressKey).await?;
        let credential_issuer = optional(kv.get(CredentialIssuerKey).await)?;
        let metrics_ingest = optional(kv.get(MetricsIngestKey).await)?;

        Ok(Self {
            network: kv.get(RequiredNetworkKey).await?,
            contract_address,
            pinning_endpoint: kv.get(PinningEndpointKey).await?,
            gateway_base: kv.get(GatewayBaseKey).await?,
            credential_issuer,
            metrics_ingest,
            receipt_poll_interval: RECEIPT_POLL_INTERVAL,
        })
    }

    /// Metric sender for the configured ingest endpoint, a logging mock
    /// when there is none
    pub fn metric_tx(&self) -> ClientMetricTx {
        let Some(ingest) = self.metrics_ingest.clone() else {
            return ClientMetricTx::default();
        };
        let tx = HttpMetricTx::new(ingest);
        #[cfg(feature = "js")]
        let tx = JsSpawnMetricTx(tx);
        MaybeMockLocalMetricEventTx::Real(tx)
    }

    /// Pinning client backed by the configured credential issuer
    pub fn pinata(&self) -> Option<PinataClient<IssuerCredentials>> {
        let issuer = self.credential_issuer.clone()?;
        Some(PinataClient::new(
            self.pinning_endpoint.clone(),
            IssuerCredentials::new(issuer),
        ))
    }
}

#[cfg(test)]
mod tests {
    use metrics::{
        metric_sender::LocalMetricTx,
        metrics::{EventSource, VideoUnlocked},
    };

    use super::*;

    #[test]
    fn defaults_target_flow_testnet() {
        let config = ClientConfig::new(Address::repeat_byte(7));
        assert_eq!(config.network.chain_id.as_str(), "0x221");
        assert_eq!(
            config.pinning_endpoint.as_str(),
            "https://api.pinata.cloud/pinning/pinFileToIPFS"
        );
        assert_eq!(
            config.gateway_base.as_str(),
            "https://gateway.pinata.cloud/ipfs/"
        );
        assert!(config.pinata().is_none());
    }

    #[tokio::test]
    async fn metrics_are_mocked_without_ingest() {
        let config = ClientConfig::new(Address::repeat_byte(7));
        let tx = config.metric_tx();
        assert!(matches!(tx, MaybeMockLocalMetricEventTx::Mock(_)));

        let metrics = LocalMetricTx::new(EventSource::WebClient, tx);
        metrics
            .push(VideoUnlocked {
                video_id: 1,
                viewer: Address::ZERO,
                after_payment: false,
            })
            .await
            .unwrap();
    }

    #[test]
    fn ingest_enables_http_metrics() {
        let config = ClientConfig::new(Address::repeat_byte(7))
            .with_metrics_ingest(Url::parse("https://ppv.example/metrics").unwrap());
        assert!(matches!(
            config.metric_tx(),
            MaybeMockLocalMetricEventTx::Real(_)
        ));
    }

    #[test]
    fn issuer_enables_pinning() {
        let config = ClientConfig::new(Address::repeat_byte(7))
            .with_credential_issuer(Url::parse("https://ppv.example/pinning-token").unwrap());
        assert!(config.pinata().is_some());
    }
}
