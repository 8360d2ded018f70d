use reqwest::RequestBuilder;
use url::Url;

use crate::metrics::{Metric, MetricEvent, MetricEventList};

/// Posts metric events as json to an ingest endpoint
#[derive(Clone)]
pub struct HttpMetricTx {
    client: reqwest::Client,
    ingest_url: Url,
}

impl HttpMetricTx {
    pub fn new(ingest_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), ingest_url)
    }

    pub fn with_client(client: reqwest::Client, ingest_url: Url) -> Self {
        Self { client, ingest_url }
    }

    fn post_json(&self, body: &impl serde::Serialize) -> RequestBuilder {
        self.client.post(self.ingest_url.clone()).json(body)
    }
}

async fn send(req: RequestBuilder) -> Result<(), reqwest::Error> {
    req.send().await?.error_for_status()?;
    Ok(())
}

#[cfg(feature = "js")]
impl super::LocalMetricEventTx for HttpMetricTx {
    type Error = reqwest::Error;

    async fn push_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        send(self.post_json(&ev)).await
    }

    async fn push_list_local<M: Metric + Send + 'static>(
        &self,
        ev: MetricEventList<M>,
    ) -> Result<(), Self::Error> {
        send(self.post_json(&ev)).await
    }
}

#[cfg(not(feature = "js"))]
impl super::MetricEventTx for HttpMetricTx {
    type Error = reqwest::Error;

    async fn push<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        send(self.post_json(&ev)).await
    }

    async fn push_list<M: Metric + Send + 'static>(
        &self,
        ev: MetricEventList<M>,
    ) -> Result<(), Self::Error> {
        send(self.post_json(&ev)).await
    }
}
