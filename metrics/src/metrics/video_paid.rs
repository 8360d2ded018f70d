use serde::{Deserialize, Serialize};
use types::{Address, U256};
use utoipa::ToSchema;

use super::sealed_metric::SealedMetric;

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct VideoPaid {
    pub video_id: u64,
    #[schema(value_type = String)]
    pub viewer: Address,
    /// smallest currency unit
    #[schema(value_type = String)]
    pub price: U256,
}

impl SealedMetric for VideoPaid {
    fn tag(&self) -> String {
        "video_paid".to_string()
    }

    fn user_id(&self) -> Option<String> {
        Some(self.viewer.to_string())
    }
}
