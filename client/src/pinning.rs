//! Client of the content-addressed pinning service

use std::future::Future;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use types::ContentId;
use url::Url;

use crate::PinningError;

/// A file picked by the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

pub trait PinningService {
    /// Upload a single file, returning its content identifier
    fn pin_file(&self, file: &MediaFile) -> impl Future<Output = Result<ContentId, PinningError>>;
}

/// Source of the bearer token sent to the pinning service
pub trait CredentialSource {
    fn bearer_token(&self) -> impl Future<Output = Result<String, PinningError>>;
}

/// Fixed token, only for server side use and tests.
/// Never ship a long lived token to the browser
pub struct StaticCredentials(String);

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialSource for StaticCredentials {
    async fn bearer_token(&self) -> Result<String, PinningError> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize)]
struct IssuedToken {
    jwt: String,
}

/// Fetches a short lived upload token from a backend that holds the
/// real pinning service key
#[derive(Clone)]
pub struct IssuerCredentials {
    client: reqwest::Client,
    issuer: Url,
    session_token: Option<String>,
}

impl IssuerCredentials {
    pub fn new(issuer: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            issuer,
            session_token: None,
        }
    }

    /// Authenticate against the issuer with the app's own session token
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl CredentialSource for IssuerCredentials {
    async fn bearer_token(&self) -> Result<String, PinningError> {
        let mut req = self.client.get(self.issuer.clone());
        if let Some(token) = &self.session_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PinningError::Credentials(format!(
                "issuer returned status {status}"
            )));
        }

        let issued: IssuedToken = resp
            .json()
            .await
            .map_err(|e| PinningError::Credentials(e.to_string()))?;
        Ok(issued.jwt)
    }
}

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinata style single file pinning endpoint (multipart upload, bearer auth)
pub struct PinataClient<C> {
    client: reqwest::Client,
    endpoint: Url,
    credentials: C,
}

impl<C: CredentialSource> PinataClient<C> {
    pub fn new(endpoint: Url, credentials: C) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            credentials,
        }
    }
}

impl<C: CredentialSource> PinningService for PinataClient<C> {
    async fn pin_file(&self, file: &MediaFile) -> Result<ContentId, PinningError> {
        let token = self.credentials.bearer_token().await?;

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part("file", part);

        log::debug!("pinning {} ({} bytes)", file.name, file.bytes.len());
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let detail = error_detail(&body)
                .unwrap_or_else(|| format!("pinning service returned status {status}"));
            return Err(PinningError::Service(detail));
        }

        let pinned: PinResponse = serde_json::from_str(&body)
            .map_err(|e| PinningError::Service(format!("unexpected pinning response: {e}")))?;
        log::info!("pinned {} as {}", file.name, pinned.ipfs_hash);
        Ok(pinned.ipfs_hash.into())
    }
}

/// Most specific error message in a pinning service error body
fn error_detail(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let body = body.trim();
        return (!body.is_empty()).then(|| body.to_string());
    };

    let error = value.get("error");
    let detail = error
        .and_then(|e| e.get("details"))
        .or_else(|| error.filter(|e| e.is_string()))
        .or_else(|| error.and_then(|e| e.get("reason")))
        .or_else(|| value.get("message"))?;

    match detail {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
