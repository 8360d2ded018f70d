use serde::{Deserialize, Serialize};
use types::Address;
use utoipa::ToSchema;

use super::sealed_metric::SealedMetric;

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct VideoUnlocked {
    pub video_id: u64,
    #[schema(value_type = String)]
    pub viewer: Address,
    /// whether permission was obtained by a payment in this session
    pub after_payment: bool,
}

impl SealedMetric for VideoUnlocked {
    fn tag(&self) -> String {
        "video_unlocked".to_string()
    }

    fn user_id(&self) -> Option<String> {
        Some(self.viewer.to_string())
    }
}
