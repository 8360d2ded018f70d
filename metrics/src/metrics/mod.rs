pub mod video_paid;
pub mod video_unlocked;
pub mod video_uploaded;

pub use video_paid::VideoPaid;
pub use video_unlocked::VideoUnlocked;
pub use video_uploaded::VideoUploaded;

use sealed_metric::SealedMetric;
use serde::Serialize;
use web_time::{SystemTime, UNIX_EPOCH};

mod sealed_metric {
    use std::fmt::Debug;

    use serde::Serialize;

    pub trait SealedMetric: Serialize + Debug {
        fn tag(&self) -> String;

        fn user_id(&self) -> Option<String>;
    }
}

pub trait Metric: SealedMetric {}

impl<T: SealedMetric> Metric for T {}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventSource {
    WebClient,
}

#[derive(Serialize, Debug)]
pub struct MetricEvent<M: Metric> {
    pub source: EventSource,
    pub tag: String,
    pub user_id: Option<String>,
    pub metric: M,
    pub unix_timestamp_secs: u64,
}

impl<M: Metric> MetricEvent<M> {
    pub fn new(source: EventSource, metric: M) -> Self {
        Self {
            source,
            tag: metric.tag(),
            user_id: metric.user_id(),
            metric,
            unix_timestamp_secs: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        }
    }
}

/// Batch of events sharing a tag
#[derive(Serialize, Debug)]
pub struct MetricEventList<M: Metric> {
    pub source: EventSource,
    pub tag: String,
    pub events: Vec<MetricEvent<M>>,
}

impl<M: Metric> MetricEventList<M> {
    pub fn new(source: EventSource, tag: String, events: Vec<MetricEvent<M>>) -> Self {
        Self {
            source,
            tag,
            events,
        }
    }
}
