use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use types::{NativeCurrency, VideoRecord};
use url::Url;

use crate::{
    contract::VideoContract,
    notify::{Notice, Notifier},
    utils::{media::gateway_url, price::price_label},
};

/// What a listing shows for a video
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoCard {
    pub video: VideoRecord,
    pub thumbnail_url: Option<Url>,
    pub price_label: String,
    pub display_time_label: String,
}

/// Videos listed by the contract. Listing is a read, it works without an
/// account and on the wrong network as long as the wallet answers
pub struct VideoCatalog<C> {
    contract: Rc<C>,
    notifier: Rc<dyn Notifier>,
    gateway: Url,
    currency: NativeCurrency,
    videos: RefCell<Vec<VideoRecord>>,
    loading: Cell<bool>,
}

impl<C: VideoContract> VideoCatalog<C> {
    pub fn new(
        contract: Rc<C>,
        notifier: Rc<dyn Notifier>,
        gateway: Url,
        currency: NativeCurrency,
    ) -> Self {
        Self {
            contract,
            notifier,
            gateway,
            currency,
            videos: RefCell::default(),
            loading: Cell::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn videos(&self) -> Vec<VideoRecord> {
        self.videos.borrow().clone()
    }

    /// Reload the list. On failure the list is emptied and the user
    /// notified, calling again retries
    pub async fn refresh(&self) -> Vec<VideoRecord> {
        self.loading.set(true);
        let videos = match self.contract.list_videos().await {
            Ok(videos) => {
                log::debug!("loaded {} videos", videos.len());
                videos
            }
            Err(e) => {
                log::warn!("failed to fetch videos: {e}");
                self.notifier.notify(Notice::error("Failed to fetch videos"));
                Vec::new()
            }
        };
        *self.videos.borrow_mut() = videos.clone();
        self.loading.set(false);
        videos
    }

    pub fn cards(&self) -> Vec<VideoCard> {
        self.videos
            .borrow()
            .iter()
            .map(|video| VideoCard {
                thumbnail_url: gateway_url(&self.gateway, &video.thumbnail_hash).ok(),
                price_label: price_label(video.price, &self.currency),
                display_time_label: format!("{} sec", video.display_time),
                video: video.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use types::{Address, ContentId, NetworkParams, U256};

    use super::*;
    use crate::mock::{MockContract, RecordingNotifier};

    fn catalog(contract: &Rc<MockContract>, notifier: &Rc<RecordingNotifier>) -> VideoCatalog<MockContract> {
        VideoCatalog::new(
            contract.clone(),
            notifier.clone(),
            Url::parse("https://gateway.pinata.cloud/ipfs/").unwrap(),
            NetworkParams::flow_evm_testnet().native_currency,
        )
    }

    fn video(id: u64) -> VideoRecord {
        VideoRecord {
            id,
            uploader: Address::repeat_byte(1),
            video_hash: ContentId::new("QmVideo"),
            thumbnail_hash: ContentId::new("QmThumb"),
            price: U256::from(500_000_000_000_000_000u128),
            display_time: 90,
        }
    }

    #[tokio::test]
    async fn refresh_loads_cards() {
        let contract = Rc::new(MockContract::default());
        let notifier = Rc::new(RecordingNotifier::default());
        contract.set_videos(vec![video(0)]);
        let catalog = catalog(&contract, &notifier);

        assert_eq!(catalog.refresh().await.len(), 1);
        assert!(!catalog.is_loading());

        let cards = catalog.cards();
        assert_eq!(
            cards[0].thumbnail_url.as_ref().unwrap().as_str(),
            "https://gateway.pinata.cloud/ipfs/QmThumb"
        );
        assert_eq!(cards[0].price_label, "0.5 Flow");
        assert_eq!(cards[0].display_time_label, "90 sec");
    }

    #[tokio::test]
    async fn failed_listing_degrades_to_empty() {
        let contract = Rc::new(MockContract::default());
        let notifier = Rc::new(RecordingNotifier::default());
        contract.set_videos(vec![video(0)]);
        let catalog = catalog(&contract, &notifier);
        catalog.refresh().await;

        contract.fail_listing(true);
        assert!(catalog.refresh().await.is_empty());
        assert!(catalog.videos().is_empty());
        assert!(!catalog.is_loading());
        assert_eq!(notifier.messages(), vec!["Failed to fetch videos"]);

        // retry by reading again
        contract.fail_listing(false);
        assert_eq!(catalog.refresh().await.len(), 1);
    }
}
