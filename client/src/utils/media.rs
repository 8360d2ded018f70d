use types::ContentId;
use url::Url;

/// Url of a pinned file on the storage gateway
pub fn gateway_url(base: &Url, cid: &ContentId) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        return base.join(cid.as_str());
    }
    let mut base = base.clone();
    base.set_path(&format!("{}/", base.path()));
    base.join(cid.as_str())
}
