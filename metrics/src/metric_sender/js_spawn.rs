use std::convert::Infallible;

use wasm_bindgen_futures::spawn_local;

use crate::metrics::{Metric, MetricEvent, MetricEventList};

use super::LocalMetricEventTx;

/// Fire-and-forget wrapper around a local metric sender.
/// Each push is spawned on the current thread, failures are only logged
#[derive(Clone)]
pub struct JsSpawnMetricTx<Tx: LocalMetricEventTx + Clone + 'static>(pub Tx);

impl<Tx: LocalMetricEventTx + Clone + 'static> LocalMetricEventTx for JsSpawnMetricTx<Tx> {
    type Error = Infallible;

    async fn push_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        let tx = self.0.clone();
        spawn_local(async move {
            if let Err(e) = tx.push_local(ev).await {
                log::warn!("failed to send metric {e}")
            }
        });
        Ok(())
    }

    async fn push_list_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEventList<M>,
    ) -> Result<(), Self::Error> {
        let tx = self.0.clone();
        spawn_local(async move {
            if let Err(e) = tx.push_list_local(ev).await {
                log::warn!("failed to send metric list {e}")
            }
        });
        Ok(())
    }
}
