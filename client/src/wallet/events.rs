use std::{
    cell::RefCell,
    pin::Pin,
    task::{Context, Poll},
};

use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures_util::{Stream, StreamExt};
use types::{Address, ChainId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    AccountsChanged,
    ChainChanged,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// New list of authorised accounts, empty when the wallet disconnected
    AccountsChanged(Vec<Address>),
    ChainChanged(ChainId),
}

impl WalletEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WalletEvent::AccountsChanged(_) => EventKind::AccountsChanged,
            WalletEvent::ChainChanged(_) => EventKind::ChainChanged,
        }
    }
}

/// Stream of wallet notifications of a single kind.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`])
/// detaches it from the wallet.
pub struct Subscription {
    kind: EventKind,
    rx: UnboundedReceiver<WalletEvent>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn unsubscribe(mut self) {
        self.rx.close();
    }
}

impl Stream for Subscription {
    type Item = WalletEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_next_unpin(cx)
    }
}

/// Fan-out of wallet notifications to every live subscription.
///
/// Meant to be embedded by wallet adapters, each consumer gets its own
/// subscription instead of registering listeners on a shared object.
#[derive(Default)]
pub struct EventHub {
    subscribers: RefCell<Vec<(EventKind, UnboundedSender<WalletEvent>)>>,
}

impl EventHub {
    pub fn subscribe(&self, kind: EventKind) -> Subscription {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.borrow_mut().push((kind, tx));
        Subscription { kind, rx }
    }

    pub fn emit(&self, event: WalletEvent) {
        let kind = event.kind();
        self.subscribers.borrow_mut().retain(|(sub_kind, tx)| {
            if tx.is_closed() {
                return false;
            }
            if *sub_kind != kind {
                return true;
            }
            tx.unbounded_send(event.clone()).is_ok()
        });
    }

    /// Number of subscriptions that are still attached
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|(_, tx)| !tx.is_closed());
        subscribers.len()
    }
}
