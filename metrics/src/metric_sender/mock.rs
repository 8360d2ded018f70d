use std::{
    convert::Infallible,
    fmt::Debug,
    sync::{Arc, Mutex},
};

use crate::metrics::{Metric, MetricEvent, MetricEventList};

use super::{LocalMetricEventTx, MetricEventTx};

/// Logs metrics instead of sending them
#[derive(Default, Clone, Copy)]
pub struct MockMetricEventTx;

impl MockMetricEventTx {
    fn push_inner(&self, ev: impl Debug) {
        log::debug!("mock metric received: {ev:?}");
    }
}

impl MetricEventTx for MockMetricEventTx {
    type Error = Infallible;

    async fn push<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        self.push_inner(ev);

        Ok(())
    }

    async fn push_list<M: Metric + Send + 'static>(
        &self,
        ev: MetricEventList<M>,
    ) -> Result<(), Self::Error> {
        self.push_inner(ev);

        Ok(())
    }
}

/// Keeps the tags of every metric pushed, for asserting in tests
#[derive(Default, Clone)]
pub struct RecordingMetricTx {
    tags: Arc<Mutex<Vec<String>>>,
}

impl RecordingMetricTx {
    pub fn tags(&self) -> Vec<String> {
        self.tags
            .lock()
            .map(|tags| tags.clone())
            .unwrap_or_default()
    }

    fn record(&self, tag: &str) {
        if let Ok(mut tags) = self.tags.lock() {
            tags.push(tag.to_string());
        }
    }
}

impl MetricEventTx for RecordingMetricTx {
    type Error = Infallible;

    async fn push<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        self.record(&ev.tag);
        Ok(())
    }

    async fn push_list<M: Metric + Send + 'static>(
        &self,
        ev: MetricEventList<M>,
    ) -> Result<(), Self::Error> {
        self.record(&ev.tag);
        Ok(())
    }
}

/// Sender that is a mock unless a real one was configured
#[derive(Clone)]
pub enum MaybeMockLocalMetricEventTx<Tx> {
    Mock(MockMetricEventTx),
    Real(Tx),
}

impl<Tx> Default for MaybeMockLocalMetricEventTx<Tx> {
    fn default() -> Self {
        Self::Mock(MockMetricEventTx)
    }
}

impl<Tx: LocalMetricEventTx> LocalMetricEventTx for MaybeMockLocalMetricEventTx<Tx> {
    type Error = Tx::Error;

    async fn push_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        match self {
            Self::Mock(m) => {
                m.push(ev).await.unwrap_or_else(|e| match e {});
                Ok(())
            }
            Self::Real(m) => m.push_local(ev).await,
        }
    }

    async fn push_list_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEventList<M>,
    ) -> Result<(), Self::Error> {
        match self {
            Self::Mock(m) => {
                m.push_list(ev).await.unwrap_or_else(|e| match e {});
                Ok(())
            }
            Self::Real(m) => m.push_list_local(ev).await,
        }
    }
}
