pub mod http;
#[cfg(feature = "js")]
pub mod js_spawn;
pub mod mock;

use std::{error::Error, future::Future};

use crate::metrics::{EventSource, Metric, MetricEvent, MetricEventList};

pub trait MetricEventTx: Send {
    type Error: Error;

    fn push<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn push_list<M: Metric + Send + 'static>(
        &self,
        ev: MetricEventList<M>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Metric sender whose futures are bound to the current thread
/// (browser event loop)
pub trait LocalMetricEventTx {
    type Error: Error;

    fn push_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    fn push_list_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEventList<M>,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}

impl<T: MetricEventTx> LocalMetricEventTx for T {
    type Error = <Self as MetricEventTx>::Error;

    async fn push_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        MetricEventTx::push(self, ev).await
    }

    async fn push_list_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEventList<M>,
    ) -> Result<(), Self::Error> {
        MetricEventTx::push_list(self, ev).await
    }
}

/// Metric sender tagged with the source of its events
#[derive(Clone)]
pub struct LocalMetricTx<Tx> {
    source: EventSource,
    tx: Tx,
}

impl<Tx: LocalMetricEventTx> LocalMetricTx<Tx> {
    pub fn new(source: EventSource, tx: Tx) -> Self {
        Self { source, tx }
    }

    pub async fn push(&self, metric: impl Metric + Send + 'static) -> Result<(), Tx::Error> {
        self.tx
            .push_local(MetricEvent::new(self.source, metric))
            .await
    }

    /// Push a metric, logging instead of failing if it could not be sent
    pub async fn push_or_log(&self, metric: impl Metric + Send + 'static) {
        if let Err(e) = self.push(metric).await {
            log::warn!("failed to send metric {e}");
        }
    }

    pub async fn push_list(
        &self,
        tag: String,
        metrics: Vec<impl Metric + Send + 'static>,
    ) -> Result<(), Tx::Error> {
        let events = metrics
            .into_iter()
            .map(|m| MetricEvent::new(self.source, m))
            .collect();

        self.tx
            .push_list_local(MetricEventList::new(self.source, tag, events))
            .await
    }
}
