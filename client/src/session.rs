use std::{cell::RefCell, rc::Rc};

use futures_util::{stream, Stream};
use types::{Address, NetworkParams};

use crate::{
    consts::NO_WALLET_NOTICE,
    gate::ChainGate,
    notify::{Notice, Notifier},
    wallet::{Eip1193, EventKind, Wallet, WalletEvent},
    Error, Result,
};

/// Connected account plus the chain gate, shared by everything that
/// talks to the contract
pub struct WalletSession<P> {
    wallet: Option<Wallet<P>>,
    gate: ChainGate<P>,
    account: RefCell<Option<Address>>,
    notifier: Rc<dyn Notifier>,
}

impl<P: Eip1193> WalletSession<P> {
    pub fn new(
        wallet: Option<Wallet<P>>,
        network: NetworkParams,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            gate: ChainGate::new(wallet.clone(), network, notifier.clone()),
            wallet,
            account: RefCell::new(None),
            notifier,
        }
    }

    pub fn wallet(&self) -> Option<&Wallet<P>> {
        self.wallet.as_ref()
    }

    pub fn gate(&self) -> &ChainGate<P> {
        &self.gate
    }

    pub fn account(&self) -> Option<Address> {
        *self.account.borrow()
    }

    /// `0x1234...abcd`
    pub fn short_account(&self) -> Option<String> {
        self.account().map(|account| {
            let full = account.to_string();
            format!("{}...{}", &full[..6], &full[full.len() - 4..])
        })
    }

    /// Whether mutating actions should be offered at all
    pub fn can_transact(&self) -> bool {
        self.gate.chain_ok() && self.account().is_some()
    }

    fn set_account(&self, accounts: &[Address]) {
        let account = accounts.first().copied();
        log::debug!("account changed to {account:?}");
        *self.account.borrow_mut() = account;
    }

    /// Pick up an already authorised account and check the chain
    pub async fn restore(&self) {
        if let Some(wallet) = &self.wallet {
            match wallet.accounts().await {
                Ok(accounts) => self.set_account(&accounts),
                Err(e) => log::warn!("failed to read wallet accounts: {e}"),
            }
        }
        self.gate.check().await;
    }

    pub async fn connect(&self) -> Result<Address> {
        let Some(wallet) = &self.wallet else {
            self.notifier.notify(Notice::error(NO_WALLET_NOTICE));
            return Err(Error::NoWallet);
        };

        let accounts = match wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                self.notifier
                    .notify(Notice::error(format!("Failed to connect wallet: {e}")));
                return Err(e);
            }
        };
        self.set_account(&accounts);
        self.gate.check().await;

        self.account().ok_or(Error::NotConnected)
    }

    /// Forget the account locally, the wallet keeps its authorisation
    pub fn disconnect(&self) {
        self.set_account(&[]);
    }

    /// Both notification streams merged.
    /// The subscriptions live as long as the returned stream
    pub fn subscribe(&self) -> Option<impl Stream<Item = WalletEvent> + Unpin> {
        let wallet = self.wallet.as_ref()?;
        Some(stream::select(
            wallet.subscribe(EventKind::AccountsChanged),
            wallet.subscribe(EventKind::ChainChanged),
        ))
    }

    pub async fn handle_event(&self, event: &WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => self.set_account(accounts),
            WalletEvent::ChainChanged(_) => self.gate.handle_event(event).await,
        }
    }

    /// Precondition of every contract call, using the last known chain state
    pub fn ready(&self) -> Result<Address> {
        if self.wallet.is_none() {
            return Err(Error::NoWallet);
        }
        if !self.gate.chain_ok() {
            return Err(Error::WrongNetwork(self.gate.network().chain_name.clone()));
        }
        self.account().ok_or(Error::NotConnected)
    }

    /// Precondition of state mutating contract calls, the chain is
    /// checked again first
    pub async fn ensure_ready(&self) -> Result<Address> {
        if self.wallet.is_some() {
            self.gate.check().await;
        }
        self.ready()
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{FutureExt, StreamExt};

    use super::*;
    use crate::mock::{MockWallet, RecordingNotifier};

    const ACCOUNT: Address = Address::repeat_byte(0xaa);

    fn session(wallet: &Rc<MockWallet>) -> (WalletSession<MockWallet>, Rc<RecordingNotifier>) {
        let notifier = Rc::new(RecordingNotifier::default());
        let session = WalletSession::new(
            Some(Wallet::from_rc(wallet.clone())),
            NetworkParams::flow_evm_testnet(),
            notifier.clone(),
        );
        (session, notifier)
    }

    #[tokio::test]
    async fn restore_picks_first_authorised_account() {
        let wallet = Rc::new(MockWallet::on_chain("0x221").with_accounts(vec![ACCOUNT]));
        let (session, _) = session(&wallet);

        session.restore().await;

        assert_eq!(session.account(), Some(ACCOUNT));
        assert!(session.can_transact());
        assert_eq!(
            session.short_account().unwrap().to_lowercase(),
            "0xaaaa...aaaa"
        );
    }

    #[tokio::test]
    async fn connect_requests_accounts() {
        let wallet = Rc::new(MockWallet::on_chain("0x221").with_accounts(vec![ACCOUNT]));
        let (session, _) = session(&wallet);

        assert_eq!(session.connect().await.unwrap(), ACCOUNT);
        assert!(wallet.methods().contains(&"eth_requestAccounts".to_string()));

        session.disconnect();
        assert_eq!(session.account(), None);
        assert!(!session.can_transact());
    }

    #[tokio::test]
    async fn connect_without_wallet_fails_cleanly() {
        let notifier = Rc::new(RecordingNotifier::default());
        let session: WalletSession<MockWallet> =
            WalletSession::new(None, NetworkParams::flow_evm_testnet(), notifier.clone());

        assert!(matches!(session.connect().await, Err(Error::NoWallet)));
        assert!(matches!(session.ensure_ready().await, Err(Error::NoWallet)));
        assert!(session.subscribe().is_none());
        assert_eq!(notifier.messages(), vec!["wallet not detected"]);
    }

    #[tokio::test]
    async fn empty_accounts_event_clears_account() {
        let wallet = Rc::new(MockWallet::on_chain("0x221").with_accounts(vec![ACCOUNT]));
        let (session, _) = session(&wallet);
        session.restore().await;

        let mut events = session.subscribe().unwrap();
        wallet.emit(WalletEvent::AccountsChanged(vec![]));
        let event = events.next().now_or_never().flatten().unwrap();
        session.handle_event(&event).await;

        assert_eq!(session.account(), None);
        assert!(matches!(session.ready(), Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn ensure_ready_rechecks_chain() {
        let wallet = Rc::new(MockWallet::on_chain("0x221").with_accounts(vec![ACCOUNT]));
        let (session, _) = session(&wallet);
        session.restore().await;
        assert!(session.ready().is_ok());

        // wallet moved without an event reaching us
        wallet.set_chain("0x1");
        assert!(matches!(
            session.ensure_ready().await,
            Err(Error::WrongNetwork(_))
        ));
        assert!(!session.can_transact());
    }
}
