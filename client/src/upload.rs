//! Two phase upload: pin both files, then register them with the contract

use std::{cell::Cell, rc::Rc};

use futures_util::future::try_join;
use metrics::{
    metric_sender::{LocalMetricEventTx, LocalMetricTx},
    metrics::VideoUploaded,
};
use types::{NewVideo, TxHash, U256};

use crate::{
    contract::VideoContract,
    notify::{Notice, Notifier},
    pinning::{MediaFile, PinningService},
    session::WalletSession,
    utils::price::parse_units,
    wallet::Eip1193,
    Error, Result,
};

/// User input of the upload form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub video: Option<MediaFile>,
    pub thumbnail: Option<MediaFile>,
    /// price in display units, e.g `"0.5"`
    pub price: String,
    /// seconds
    pub display_time: String,
}

struct ValidForm<'a> {
    video: &'a MediaFile,
    thumbnail: &'a MediaFile,
    price: U256,
    display_time: u64,
}

impl UploadForm {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn validate(&self, decimals: u8) -> Result<ValidForm<'_>> {
        let (Some(video), Some(thumbnail)) = (&self.video, &self.thumbnail) else {
            return Err(Error::IncompleteForm);
        };
        if self.price.trim().is_empty() || self.display_time.trim().is_empty() {
            return Err(Error::IncompleteForm);
        }

        let price = parse_units(&self.price, decimals)?;
        let display_time = self
            .display_time
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| Error::DisplayTime(self.display_time.clone()))?;

        Ok(ValidForm {
            video,
            thumbnail,
            price,
            display_time,
        })
    }
}

/// Keeps the loading flag set until dropped, an abandoned submission
/// clears it too
struct Loading<'a>(&'a Cell<bool>);

impl<'a> Loading<'a> {
    fn start(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct UploadPipeline<P, C, S, M> {
    session: Rc<WalletSession<P>>,
    contract: Rc<C>,
    pinning: S,
    metrics: LocalMetricTx<M>,
    notifier: Rc<dyn Notifier>,
    loading: Cell<bool>,
}

impl<P, C, S, M> UploadPipeline<P, C, S, M>
where
    P: Eip1193,
    C: VideoContract,
    S: PinningService,
    M: LocalMetricEventTx,
{
    pub fn new(
        session: Rc<WalletSession<P>>,
        contract: Rc<C>,
        pinning: S,
        metrics: LocalMetricTx<M>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            contract,
            pinning,
            metrics,
            notifier,
            loading: Cell::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Whether the submit button should be enabled
    pub fn can_submit(&self) -> bool {
        self.session.can_transact() && !self.is_loading()
    }

    /// Pin both files and register the video.
    ///
    /// The form is cleared only after the transaction is confirmed, on
    /// any failure it is left untouched so the user can retry.
    pub async fn submit(&self, form: &mut UploadForm) -> Result<TxHash> {
        if self.is_loading() {
            return Err(Error::UploadInFlight);
        }

        let decimals = self.session.gate().network().native_currency.decimals;
        let valid = match form.validate(decimals) {
            Ok(valid) => valid,
            Err(e) => {
                self.notifier.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };

        let res = {
            let _loading = Loading::start(&self.loading);
            self.upload(valid).await
        };

        match res {
            Ok(hash) => {
                self.notifier.notify(Notice::success("Video uploaded!"));
                form.clear();
                Ok(hash)
            }
            Err(e) if e.is_precondition() => {
                self.notifier.notify(Notice::error(e.to_string()));
                Err(e)
            }
            Err(e) => {
                self.notifier
                    .notify(Notice::error(format!("Upload failed: {e}")));
                Err(e)
            }
        }
    }

    async fn upload(&self, form: ValidForm<'_>) -> Result<TxHash> {
        let uploader = self.session.ensure_ready().await?;

        let (video_hash, thumbnail_hash) = try_join(
            self.pinning.pin_file(form.video),
            self.pinning.pin_file(form.thumbnail),
        )
        .await?;

        let video = NewVideo {
            video_hash,
            thumbnail_hash,
            price: form.price,
            display_time: form.display_time,
        };
        let hash = self.contract.upload_video(uploader, &video).await?;
        log::info!("video {} registered in {hash}", video.video_hash);

        self.metrics
            .push_or_log(VideoUploaded {
                uploader,
                video_hash: video.video_hash.to_string(),
                thumbnail_hash: video.thumbnail_hash.to_string(),
                price: video.price,
                display_time: video.display_time,
            })
            .await;

        Ok(hash)
    }
}
