//! View access workflow: select a video, check permission, pay if
//! needed, unlock playback.
//!
//! ```text
//! Idle --select--> Checking --allowed--> Unlocked
//!                     |   \--denied/error--> Locked --pay--> Paying
//!                     ^                                        |
//!                     \-------------- confirmed ---------------/
//!                                     failed ---> Locked
//! ```
//!
//! Selecting another video from any state starts over at `Checking`.
//! Every selection gets a generation number, a permission result that
//! arrives for an older generation is dropped (last selection wins).

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures_util::StreamExt;
use metrics::{
    metric_sender::{LocalMetricEventTx, LocalMetricTx},
    metrics::{VideoPaid, VideoUnlocked},
};
use types::{Address, VideoRecord};
use url::Url;
use web_time::Instant;

use crate::{
    contract::VideoContract,
    notify::{Notice, Notifier},
    session::WalletSession,
    utils::media::gateway_url,
    wallet::{Eip1193, WalletEvent},
    Error, Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessState {
    /// no video selected
    Idle,
    /// permission query in flight
    Checking,
    /// permission denied, payment can be offered
    Locked,
    /// payment submitted, waiting for confirmation
    Paying,
    /// permission granted, playback enabled
    Unlocked,
}

/// The currently selected video and what we know about access to it
#[derive(Clone, Debug)]
pub struct ViewSession {
    pub video: VideoRecord,
    pub state: AccessState,
    /// when permission was last observed
    pub unlocked_at: Option<Instant>,
    generation: u64,
}

impl ViewSession {
    fn new(video: VideoRecord, generation: u64) -> Self {
        Self {
            video,
            state: AccessState::Checking,
            unlocked_at: None,
            generation,
        }
    }

    pub fn can_play(&self) -> bool {
        self.state == AccessState::Unlocked
    }

    /// Seconds left of the video's display time since it was unlocked.
    ///
    /// Informational only, access is never revoked client side when
    /// this reaches zero; the contract decides through `canView`.
    pub fn remaining_display_secs(&self) -> Option<u64> {
        let unlocked_at = self.unlocked_at?;
        Some(
            self.video
                .display_time
                .saturating_sub(unlocked_at.elapsed().as_secs()),
        )
    }
}

pub struct AccessWorkflow<P, C, M> {
    session: Rc<WalletSession<P>>,
    contract: Rc<C>,
    metrics: LocalMetricTx<M>,
    notifier: Rc<dyn Notifier>,
    gateway: Url,
    current: RefCell<Option<ViewSession>>,
    generation: Cell<u64>,
}

impl<P, C, M> AccessWorkflow<P, C, M>
where
    P: Eip1193,
    C: VideoContract,
    M: LocalMetricEventTx,
{
    pub fn new(
        session: Rc<WalletSession<P>>,
        contract: Rc<C>,
        metrics: LocalMetricTx<M>,
        notifier: Rc<dyn Notifier>,
        gateway: Url,
    ) -> Self {
        Self {
            session,
            contract,
            metrics,
            notifier,
            gateway,
            current: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    pub fn state(&self) -> AccessState {
        self.current
            .borrow()
            .as_ref()
            .map_or(AccessState::Idle, |s| s.state)
    }

    pub fn view_session(&self) -> Option<ViewSession> {
        self.current.borrow().clone()
    }

    pub fn selected(&self) -> Option<VideoRecord> {
        self.current.borrow().as_ref().map(|s| s.video.clone())
    }

    /// Playback url of the selected video, only once unlocked
    pub fn playback_url(&self) -> Option<Url> {
        let current = self.current.borrow();
        let session = current.as_ref().filter(|s| s.can_play())?;
        gateway_url(&self.gateway, &session.video.video_hash).ok()
    }

    /// Whether the pay button should be enabled
    pub fn can_pay(&self) -> bool {
        self.state() == AccessState::Locked && self.session.can_transact()
    }

    /// Make `video` the active selection and check access to it.
    ///
    /// Returns the state once the check settled, which is the state of a
    /// newer selection if one was made in the meantime.
    pub async fn select(&self, video: VideoRecord) -> Result<AccessState> {
        self.begin(video, true).await
    }

    /// Check the active selection again, e.g after the account changed
    pub async fn refresh(&self) -> Result<AccessState> {
        let Some(video) = self.selected() else {
            return Ok(AccessState::Idle);
        };
        self.begin(video, false).await
    }

    /// Drop the selection
    pub fn clear(&self) {
        self.next_generation();
        *self.current.borrow_mut() = None;
    }

    fn next_generation(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    fn set_state(&self, generation: u64, state: AccessState) {
        if let Some(session) = self.current.borrow_mut().as_mut() {
            if session.generation == generation {
                session.state = state;
                if state == AccessState::Unlocked {
                    session.unlocked_at = Some(Instant::now());
                }
            }
        }
    }

    async fn begin(&self, video: VideoRecord, report: bool) -> Result<AccessState> {
        let generation = self.next_generation();
        *self.current.borrow_mut() = Some(ViewSession::new(video.clone(), generation));

        let viewer = match self.session.ready() {
            Ok(viewer) => viewer,
            Err(e) => {
                self.set_state(generation, AccessState::Locked);
                if report {
                    self.notifier.notify(Notice::error(e.to_string()));
                }
                return Err(e);
            }
        };

        Ok(self.verify(generation, &video, viewer, false).await)
    }

    /// Ask the contract for permission, failures count as denied
    async fn verify(
        &self,
        generation: u64,
        video: &VideoRecord,
        viewer: Address,
        after_payment: bool,
    ) -> AccessState {
        let allowed = match self.contract.check_permission(video.id, viewer).await {
            Ok(allowed) => allowed,
            Err(e) => {
                log::warn!(
                    "permission check for video {} failed, keeping it locked: {e}",
                    video.id
                );
                false
            }
        };

        if !self.is_current(generation) {
            log::debug!("dropping stale permission result for video {}", video.id);
            return self.state();
        }

        let state = if allowed {
            AccessState::Unlocked
        } else {
            AccessState::Locked
        };
        self.set_state(generation, state);

        if allowed {
            self.metrics
                .push_or_log(VideoUnlocked {
                    video_id: video.id,
                    viewer,
                    after_payment,
                })
                .await;
        }
        state
    }

    /// Pay for the selected video and check permission again once the
    /// payment is confirmed
    pub async fn pay_to_view(&self) -> Result<AccessState> {
        // claimed before the first await, a second call sees `Paying`
        let (generation, video) = {
            let mut current = self.current.borrow_mut();
            let session = current.as_mut().ok_or(Error::NoSelection)?;
            match session.state {
                AccessState::Locked => {
                    session.state = AccessState::Paying;
                    (session.generation, session.video.clone())
                }
                AccessState::Unlocked => return Ok(AccessState::Unlocked),
                AccessState::Paying => return Err(Error::PaymentInFlight),
                AccessState::Checking => return Err(Error::PermissionPending),
                AccessState::Idle => return Err(Error::NoSelection),
            }
        };

        let viewer = match self.session.ensure_ready().await {
            Ok(viewer) => viewer,
            Err(e) => {
                self.set_state(generation, AccessState::Locked);
                self.notifier.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };
        if !self.is_current(generation) {
            return Ok(self.state());
        }

        if let Err(e) = self
            .contract
            .pay_to_view(viewer, video.id, video.price)
            .await
        {
            log::warn!("payment for video {} failed: {e}", video.id);
            self.set_state(generation, AccessState::Locked);
            self.notifier
                .notify(Notice::error(format!("Payment failed: {e}")));
            return Err(e);
        }

        self.notifier.notify(Notice::success("Payment successful!"));
        self.metrics
            .push_or_log(VideoPaid {
                video_id: video.id,
                viewer,
                price: video.price,
            })
            .await;

        if !self.is_current(generation) {
            return Ok(self.state());
        }
        self.set_state(generation, AccessState::Checking);
        Ok(self.verify(generation, &video, viewer, true).await)
    }

    /// Apply a wallet notification, re-checking the selection when the
    /// account changed
    pub async fn handle_event(&self, event: &WalletEvent) {
        self.session.handle_event(event).await;
        if let WalletEvent::AccountsChanged(_) = event {
            if let Err(e) = self.refresh().await {
                log::debug!("selection locked after account change: {e}");
            }
        }
    }

    /// Follow wallet notifications until the wallet goes away.
    /// Subscriptions are released when this future is dropped
    pub async fn follow_wallet(&self) {
        let Some(mut events) = self.session.subscribe() else {
            return;
        };
        while let Some(event) = events.next().await {
            self.handle_event(&event).await;
        }
    }
}
