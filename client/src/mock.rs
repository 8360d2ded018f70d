//! Test doubles for the wallet, the contract and the pinning service

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet, VecDeque},
    rc::Rc,
};

use alloy_primitives::Bytes;
use futures_channel::oneshot;
use futures_util::future;
use serde_json::{json, Value};
use types::{Address, ChainId, ContentId, NewVideo, TxHash, VideoRecord, U256};

use crate::{
    contract::VideoContract,
    notify::{Notice, Notifier},
    pinning::{MediaFile, PinningService},
    wallet::{Eip1193, EventHub, EventKind, RpcError, Subscription, WalletEvent},
    Error, PinningError, Result,
};

/// Scripted EIP-1193 provider. Unscripted calls succeed.
pub struct MockWallet {
    chain: RefCell<ChainId>,
    accounts: RefCell<Vec<Address>>,
    switch_script: RefCell<VecDeque<Result<(), RpcError>>>,
    send_script: RefCell<VecDeque<Result<(), RpcError>>>,
    call_script: RefCell<VecDeque<Vec<u8>>>,
    receipt_script: RefCell<VecDeque<Option<&'static str>>>,
    requests: RefCell<Vec<(String, Value)>>,
    yielding: Cell<bool>,
    hub: EventHub,
}

impl MockWallet {
    pub const TX_HASH: TxHash = TxHash::repeat_byte(0xab);

    pub fn on_chain(chain: &str) -> Self {
        Self {
            chain: RefCell::new(ChainId::new(chain)),
            accounts: RefCell::default(),
            switch_script: RefCell::default(),
            send_script: RefCell::default(),
            call_script: RefCell::default(),
            receipt_script: RefCell::default(),
            requests: RefCell::default(),
            yielding: Cell::new(false),
            hub: EventHub::default(),
        }
    }

    pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
        *self.accounts.borrow_mut() = accounts;
        self
    }

    /// Give way to other tasks before answering, like a wallet extension
    pub fn yielding(self) -> Self {
        self.yielding.set(true);
        self
    }

    pub fn chain(&self) -> ChainId {
        self.chain.borrow().clone()
    }

    pub fn set_chain(&self, chain: &str) {
        *self.chain.borrow_mut() = ChainId::new(chain);
    }

    pub fn script_switch(&self, res: Result<(), RpcError>) {
        self.switch_script.borrow_mut().push_back(res);
    }

    pub fn script_send(&self, res: Result<(), RpcError>) {
        self.send_script.borrow_mut().push_back(res);
    }

    pub fn script_call(&self, returns: Vec<u8>) {
        self.call_script.borrow_mut().push_back(returns);
    }

    /// `None` for a pending transaction, otherwise the receipt status
    pub fn script_receipt(&self, status: Option<&'static str>) {
        self.receipt_script.borrow_mut().push_back(status);
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.requests
            .borrow()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }

    pub fn emit(&self, event: WalletEvent) {
        self.hub.emit(event);
    }
}

impl Eip1193 for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        if self.yielding.get() {
            tokio::task::yield_now().await;
        }
        self.requests
            .borrow_mut()
            .push((method.to_string(), params.clone()));

        match method {
            "eth_chainId" => Ok(json!(self.chain())),
            "eth_accounts" | "eth_requestAccounts" => Ok(json!(self.accounts.borrow().clone())),
            "wallet_switchEthereumChain" => {
                let scripted = self.switch_script.borrow_mut().pop_front();
                scripted.unwrap_or(Ok(()))?;
                let chain: ChainId = serde_json::from_value(params[0]["chainId"].clone())
                    .map_err(|e| RpcError::new(-32602, e.to_string()))?;
                *self.chain.borrow_mut() = chain;
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => Ok(Value::Null),
            "eth_call" => {
                let scripted = self.call_script.borrow_mut().pop_front();
                scripted
                    .map(|data| json!(Bytes::from(data)))
                    .ok_or_else(|| RpcError::new(3, "execution reverted"))
            }
            "eth_sendTransaction" => {
                let scripted = self.send_script.borrow_mut().pop_front();
                scripted.unwrap_or(Ok(()))?;
                Ok(json!(Self::TX_HASH))
            }
            "eth_getTransactionReceipt" => {
                let scripted = self.receipt_script.borrow_mut().pop_front();
                Ok(match scripted.unwrap_or(Some("0x1")) {
                    Some(status) => json!({
                        "transactionHash": Self::TX_HASH,
                        "blockNumber": "0x1",
                        "status": status,
                    }),
                    None => Value::Null,
                })
            }
            _ => Err(RpcError::new(-32601, format!("{method} not supported"))),
        }
    }

    fn subscribe(&self, kind: EventKind) -> Subscription {
        self.hub.subscribe(kind)
    }
}

/// In-memory contract. Paying grants permission unless told otherwise
#[derive(Default)]
pub struct MockContract {
    videos: RefCell<Vec<VideoRecord>>,
    allowed: RefCell<HashSet<u64>>,
    held_permissions: RefCell<HashMap<u64, oneshot::Receiver<()>>>,
    held_payment: RefCell<Option<oneshot::Receiver<()>>>,
    list_error: Cell<bool>,
    permission_error: Cell<bool>,
    payment_error: Cell<bool>,
    upload_error: Cell<bool>,
    deny_on_payment: Cell<bool>,
    permission_calls: Cell<usize>,
    pay_calls: Cell<usize>,
    upload_calls: Cell<usize>,
    last_viewer: Cell<Option<Address>>,
    last_payment: Cell<Option<(Address, u64, U256)>>,
    last_upload: RefCell<Option<(Address, NewVideo)>>,
}

impl MockContract {
    pub fn set_videos(&self, videos: Vec<VideoRecord>) {
        *self.videos.borrow_mut() = videos;
    }

    pub fn fail_listing(&self, fail: bool) {
        self.list_error.set(fail);
    }

    pub fn allow(&self, video_id: u64) {
        self.allowed.borrow_mut().insert(video_id);
    }

    /// Permission checks for `video_id` wait until `gate` resolves
    pub fn hold_permission(&self, video_id: u64, gate: oneshot::Receiver<()>) {
        self.held_permissions.borrow_mut().insert(video_id, gate);
    }

    pub fn hold_payment(&self, gate: oneshot::Receiver<()>) {
        *self.held_payment.borrow_mut() = Some(gate);
    }

    pub fn fail_permission_checks(&self, fail: bool) {
        self.permission_error.set(fail);
    }

    pub fn fail_payments(&self, fail: bool) {
        self.payment_error.set(fail);
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.upload_error.set(fail);
    }

    pub fn grant_on_payment(&self, grant: bool) {
        self.deny_on_payment.set(!grant);
    }

    pub fn permission_calls(&self) -> usize {
        self.permission_calls.get()
    }

    pub fn pay_calls(&self) -> usize {
        self.pay_calls.get()
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.get()
    }

    pub fn last_viewer(&self) -> Option<Address> {
        self.last_viewer.get()
    }

    pub fn last_payment(&self) -> Option<(Address, u64, U256)> {
        self.last_payment.get()
    }

    pub fn last_upload(&self) -> Option<(Address, NewVideo)> {
        self.last_upload.borrow().clone()
    }
}

impl VideoContract for MockContract {
    async fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        if self.list_error.get() {
            return Err(Error::Rpc(RpcError::new(-32603, "internal error")));
        }
        Ok(self.videos.borrow().clone())
    }

    async fn check_permission(&self, video_id: u64, viewer: Address) -> Result<bool> {
        self.permission_calls.set(self.permission_calls.get() + 1);
        self.last_viewer.set(Some(viewer));

        let held = self.held_permissions.borrow_mut().remove(&video_id);
        if let Some(gate) = held {
            let _ = gate.await;
        }

        if self.permission_error.get() {
            return Err(Error::Rpc(RpcError::new(-32000, "header not found")));
        }
        Ok(self.allowed.borrow().contains(&video_id))
    }

    async fn pay_to_view(&self, from: Address, video_id: u64, price: U256) -> Result<TxHash> {
        self.pay_calls.set(self.pay_calls.get() + 1);
        self.last_payment.set(Some((from, video_id, price)));

        let held = self.held_payment.borrow_mut().take();
        if let Some(gate) = held {
            let _ = gate.await;
        }

        if self.payment_error.get() {
            return Err(Error::Rpc(RpcError::new(
                4001,
                "User denied transaction signature.",
            )));
        }
        if !self.deny_on_payment.get() {
            self.allow(video_id);
        }
        Ok(MockWallet::TX_HASH)
    }

    async fn upload_video(&self, from: Address, video: &NewVideo) -> Result<TxHash> {
        self.upload_calls.set(self.upload_calls.get() + 1);
        if self.upload_error.get() {
            return Err(Error::Reverted(MockWallet::TX_HASH));
        }
        *self.last_upload.borrow_mut() = Some((from, video.clone()));
        Ok(MockWallet::TX_HASH)
    }
}

#[derive(Default)]
struct PinningState {
    failures: RefCell<HashMap<String, String>>,
    hanging: RefCell<HashSet<String>>,
    pinned: RefCell<Vec<String>>,
}

/// Pins by file name, `Qm-<name>`
#[derive(Default, Clone)]
pub struct MockPinning {
    state: Rc<PinningState>,
}

impl MockPinning {
    pub fn fail_for(&self, name: &str, detail: &str) {
        self.state
            .failures
            .borrow_mut()
            .insert(name.to_string(), detail.to_string());
    }

    /// The next pin of `name` never resolves
    pub fn hang_once(&self, name: &str) {
        self.state.hanging.borrow_mut().insert(name.to_string());
    }

    /// Names of successfully pinned files, in order
    pub fn pinned(&self) -> Vec<String> {
        self.state.pinned.borrow().clone()
    }
}

impl PinningService for MockPinning {
    async fn pin_file(&self, file: &MediaFile) -> Result<ContentId, PinningError> {
        let hang = self.state.hanging.borrow_mut().remove(&file.name);
        if hang {
            future::pending::<()>().await;
        }
        let failure = self.state.failures.borrow().get(&file.name).cloned();
        if let Some(detail) = failure {
            return Err(PinningError::Service(detail));
        }
        self.state.pinned.borrow_mut().push(file.name.clone());
        Ok(ContentId::new(format!("Qm-{}", file.name)))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.notices
            .borrow()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn take(&self) -> Vec<Notice> {
        self.notices.take()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
