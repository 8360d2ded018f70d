use std::{cell::Cell, rc::Rc};

use types::NetworkParams;

use crate::{
    consts::NO_WALLET_NOTICE,
    notify::{Notice, Notifier},
    wallet::{Eip1193, Wallet, WalletEvent},
    Error, Result,
};

/// Blocks contract interaction unless the wallet is on the required network
pub struct ChainGate<P> {
    wallet: Option<Wallet<P>>,
    network: NetworkParams,
    chain_ok: Cell<bool>,
    missing_wallet_reported: Cell<bool>,
    notifier: Rc<dyn Notifier>,
}

impl<P: Eip1193> ChainGate<P> {
    /// Starts closed until the first [`ChainGate::check`]
    pub fn new(
        wallet: Option<Wallet<P>>,
        network: NetworkParams,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            wallet,
            network,
            chain_ok: Cell::new(false),
            missing_wallet_reported: Cell::new(false),
            notifier,
        }
    }

    pub fn chain_ok(&self) -> bool {
        self.chain_ok.get()
    }

    pub fn network(&self) -> &NetworkParams {
        &self.network
    }

    /// Read the wallet's current chain and compare it to the required one.
    /// Without a wallet the first check reports it, later ones stay quiet
    pub async fn check(&self) -> bool {
        let Some(wallet) = &self.wallet else {
            self.chain_ok.set(false);
            if !self.missing_wallet_reported.replace(true) {
                self.notifier.notify(Notice::error(NO_WALLET_NOTICE));
            }
            return false;
        };

        let ok = match wallet.chain_id().await {
            Ok(chain_id) => {
                log::debug!("wallet is on chain {chain_id}");
                self.network.matches(&chain_id)
            }
            Err(e) => {
                log::warn!("failed to read chain id: {e}");
                false
            }
        };
        self.chain_ok.set(ok);

        if !ok {
            self.notifier.notify(Notice::error(format!(
                "Please switch to {} to use the app!",
                self.network.chain_name
            )));
        }
        ok
    }

    /// Ask the wallet to move to the required network, registering the
    /// network first if the wallet doesn't know it.
    /// The chain is checked again afterwards whether the switch worked or not.
    pub async fn switch_network(&self) -> Result<()> {
        let Some(wallet) = &self.wallet else {
            self.notifier.notify(Notice::error(NO_WALLET_NOTICE));
            return Err(Error::NoWallet);
        };

        let res = self.try_switch(wallet).await;
        self.check().await;
        res
    }

    async fn try_switch(&self, wallet: &Wallet<P>) -> Result<()> {
        let chain_id = &self.network.chain_id;
        match wallet.switch_chain(chain_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unrecognized_chain() => {
                log::info!("registering {} with the wallet", self.network.chain_name);
                if let Err(e) = wallet.add_chain(&self.network).await {
                    self.notifier.notify(Notice::error(format!(
                        "Failed to add {}",
                        self.network.chain_name
                    )));
                    return Err(e.into());
                }
                wallet.switch_chain(chain_id).await.map_err(|e| {
                    self.notifier
                        .notify(Notice::error("Failed to switch network"));
                    e.into()
                })
            }
            Err(e) => {
                self.notifier
                    .notify(Notice::error("Failed to switch network"));
                Err(e.into())
            }
        }
    }

    /// The chain id carried by the event is ignored, the wallet is
    /// queried again so the latest state always wins
    pub async fn handle_event(&self, event: &WalletEvent) {
        if let WalletEvent::ChainChanged(_) = event {
            self.check().await;
        }
    }
}
