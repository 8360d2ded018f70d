use serde::{Deserialize, Serialize};
use types::{Address, U256};
use utoipa::ToSchema;

use super::sealed_metric::SealedMetric;

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct VideoUploaded {
    #[schema(value_type = String)]
    pub uploader: Address,
    pub video_hash: String,
    pub thumbnail_hash: String,
    #[schema(value_type = String)]
    pub price: U256,
    pub display_time: u64,
}

impl SealedMetric for VideoUploaded {
    fn tag(&self) -> String {
        "video_uploaded".to_string()
    }

    fn user_id(&self) -> Option<String> {
        Some(self.uploader.to_string())
    }
}
