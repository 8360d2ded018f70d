use std::rc::Rc;

use futures_util::StreamExt;
use metrics::metric_sender::{LocalMetricEventTx, LocalMetricTx};

use crate::{
    access::AccessWorkflow,
    catalog::VideoCatalog,
    config::ClientConfig,
    contract::EvmVideoContract,
    notify::Notifier,
    pinning::PinningService,
    session::WalletSession,
    upload::UploadPipeline,
    wallet::{Eip1193, Wallet, WalletEvent},
};

type Contract<P> = EvmVideoContract<P>;

/// Everything the pay-per-view front end talks to, wired over one wallet
pub struct PayPerView<P, S, M> {
    session: Rc<WalletSession<P>>,
    contract: Rc<Contract<P>>,
    catalog: VideoCatalog<Contract<P>>,
    access: AccessWorkflow<P, Contract<P>, M>,
    uploader: UploadPipeline<P, Contract<P>, S, M>,
}

impl<P, S, M> PayPerView<P, S, M>
where
    P: Eip1193,
    S: PinningService,
    M: LocalMetricEventTx + Clone,
{
    /// `provider` is `None` when no wallet was injected into the page
    pub fn new(
        provider: Option<P>,
        config: &ClientConfig,
        pinning: S,
        metrics: LocalMetricTx<M>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        let wallet = provider.map(Wallet::new);
        let session = Rc::new(WalletSession::new(
            wallet.clone(),
            config.network.clone(),
            notifier.clone(),
        ));
        let contract = Rc::new(EvmVideoContract::new(
            wallet,
            config.contract_address,
            config.receipt_poll_interval,
        ));

        Self {
            catalog: VideoCatalog::new(
                contract.clone(),
                notifier.clone(),
                config.gateway_base.clone(),
                config.network.native_currency.clone(),
            ),
            access: AccessWorkflow::new(
                session.clone(),
                contract.clone(),
                metrics.clone(),
                notifier.clone(),
                config.gateway_base.clone(),
            ),
            uploader: UploadPipeline::new(
                session.clone(),
                contract.clone(),
                pinning,
                metrics,
                notifier,
            ),
            session,
            contract,
        }
    }

    pub fn session(&self) -> &WalletSession<P> {
        &self.session
    }

    pub fn contract(&self) -> &EvmVideoContract<P> {
        &self.contract
    }

    pub fn catalog(&self) -> &VideoCatalog<Contract<P>> {
        &self.catalog
    }

    pub fn access(&self) -> &AccessWorkflow<P, Contract<P>, M> {
        &self.access
    }

    pub fn uploader(&self) -> &UploadPipeline<P, Contract<P>, S, M> {
        &self.uploader
    }

    /// Page load: pick up an already authorised account, check the
    /// network and list the videos
    pub async fn start(&self) {
        self.session.restore().await;
        self.catalog.refresh().await;
    }

    pub async fn handle_event(&self, event: &WalletEvent) {
        self.access.handle_event(event).await;
        if let WalletEvent::ChainChanged(_) = event {
            if self.session.gate().chain_ok() {
                self.catalog.refresh().await;
            }
        }
    }

    /// Apply wallet notifications until the wallet goes away
    pub async fn follow_wallet(&self) {
        let Some(mut events) = self.session.subscribe() else {
            return;
        };
        while let Some(event) = events.next().await {
            self.handle_event(&event).await;
        }
    }
}
