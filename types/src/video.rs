use std::fmt::{self, Display};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Content identifier of a file pinned on the storage network
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A video as listed by the pay-per-view contract.
///
/// Records are immutable once uploaded, `id` is the position
/// of the record in the contract's video list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: u64,
    pub uploader: Address,
    pub video_hash: ContentId,
    pub thumbnail_hash: ContentId,
    /// price in the smallest unit of the native currency
    pub price: U256,
    /// allowed display duration in seconds
    pub display_time: u64,
}

impl VideoRecord {
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }
}

/// Metadata submitted to the contract once both files are pinned
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewVideo {
    pub video_hash: ContentId,
    pub thumbnail_hash: ContentId,
    pub price: U256,
    pub display_time: u64,
}
