use config_keys::ConfigKey;
use thiserror::Error;
use url::Url;

/// Remote key/value store holding the client configuration
#[derive(Clone)]
pub struct KVConfig {
    client: reqwest::Client,
    url: Url,
    token: String,
}

#[derive(Debug, Error)]
pub enum KVFetchError {
    #[error("failed to reach config store: {0}")]
    Client(reqwest::Error),
    #[error("config key not found")]
    KeyNotFound,
    #[error("config store returned status {0}")]
    StatusNotOk(u16),
    #[error("failed to read config value: {0}")]
    Decode(reqwest::Error),
    #[error("invalid config value: {0}")]
    Parse(serde_json::Error),
    #[error("invalid config store url or key name")]
    InvalidUrlOrKeyName,
}

impl KVConfig {
    pub fn new(url: Url, token: String) -> KVConfig {
        KVConfig {
            client: reqwest::Client::new(),
            url,
            token,
        }
    }

    fn key_url<K: ConfigKey>(&self, key: &K) -> Result<Url, KVFetchError> {
        self.url
            .join(&key.to_string())
            .map_err(|_| KVFetchError::InvalidUrlOrKeyName)
    }

    pub async fn get<K: ConfigKey>(&self, key: K) -> Result<K::Value, KVFetchError> {
        let url = self.key_url(&key)?;

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(KVFetchError::Client)?;

        match resp.status().as_u16() {
            200 => {
                let value = resp.text().await.map_err(KVFetchError::Decode)?;
                parse_value::<K>(&value)
            }
            404 => <K as ConfigKey>::fallback().ok_or(KVFetchError::KeyNotFound),
            status_code => Err(KVFetchError::StatusNotOk(status_code)),
        }
    }

    pub async fn set<K: ConfigKey>(&self, key: K, value: K::Value) -> Result<(), KVFetchError> {
        let url = self.key_url(&key)?;
        let value = serde_json::to_string(&value).map_err(KVFetchError::Parse)?;

        let resp = self
            .client
            .post(url)
            .body(value)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(KVFetchError::Client)?;

        match resp.status().as_u16() {
            200 => Ok(()),
            status_code => Err(KVFetchError::StatusNotOk(status_code)),
        }
    }
}

fn parse_value<K: ConfigKey>(raw: &str) -> Result<K::Value, KVFetchError> {
    serde_json::from_str(raw).map_err(KVFetchError::Parse)
}
