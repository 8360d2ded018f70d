//! Client of the pay-per-view contract

use std::future::Future;

use alloy_primitives::Bytes;
use alloy_sol_types::{sol, SolCall};
use futures_timer::Delay;
use types::{Address, NewVideo, TxHash, VideoRecord, U256};
use web_time::{Duration, Instant};

use crate::{
    wallet::{Eip1193, TransactionRequest, Wallet},
    Error, Result,
};

sol! {
    function getVideos() external view returns (
        address[] uploaders,
        string[] videoHashes,
        string[] thumbnailHashes,
        uint256[] prices,
        uint256[] displayTimes
    );
    function canView(uint256 videoId, address viewer) external view returns (bool allowed);
    function payToView(uint256 videoId) external payable;
    function uploadVideo(
        string videoHash,
        string thumbnailHash,
        uint256 price,
        uint256 displayTime
    ) external;
}

/// Operations of the pay-per-view contract.
///
/// Mutating calls resolve only once the transaction is confirmed.
pub trait VideoContract {
    fn list_videos(&self) -> impl Future<Output = Result<Vec<VideoRecord>>>;

    fn check_permission(
        &self,
        video_id: u64,
        viewer: Address,
    ) -> impl Future<Output = Result<bool>>;

    fn pay_to_view(
        &self,
        from: Address,
        video_id: u64,
        price: U256,
    ) -> impl Future<Output = Result<TxHash>>;

    fn upload_video(&self, from: Address, video: &NewVideo)
        -> impl Future<Output = Result<TxHash>>;
}

/// [`VideoContract`] deployed on an EVM chain, reached through the wallet
pub struct EvmVideoContract<P> {
    wallet: Option<Wallet<P>>,
    address: Address,
    poll_interval: Duration,
}

impl<P: Eip1193> EvmVideoContract<P> {
    pub fn new(wallet: Option<Wallet<P>>, address: Address, poll_interval: Duration) -> Self {
        Self {
            wallet,
            address,
            poll_interval,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn wallet(&self) -> Result<&Wallet<P>> {
        self.wallet.as_ref().ok_or(Error::NoWallet)
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let data = self
            .wallet()?
            .call(self.address, Bytes::from(call.abi_encode()))
            .await?;
        Ok(C::abi_decode_returns(&data, true)?)
    }

    async fn transact<C: SolCall>(
        &self,
        from: Address,
        call: C,
        value: Option<U256>,
    ) -> Result<TxHash> {
        let tx = TransactionRequest {
            from,
            to: self.address,
            data: Bytes::from(call.abi_encode()),
            value,
        };
        let hash = self.wallet()?.send_transaction(&tx).await?;
        log::debug!("submitted {} as {hash}", C::SIGNATURE);
        self.wait_for_confirmation(hash).await
    }

    /// Poll for the receipt until the transaction is mined.
    /// There is no timeout, a transaction that never lands keeps the caller waiting
    async fn wait_for_confirmation(&self, hash: TxHash) -> Result<TxHash> {
        let wallet = self.wallet()?;
        let started = Instant::now();
        loop {
            match wallet.transaction_receipt(hash).await? {
                Some(receipt) if receipt.succeeded() => {
                    log::info!(
                        "transaction {hash} confirmed after {:?}",
                        started.elapsed()
                    );
                    return Ok(hash);
                }
                Some(_) => return Err(Error::Reverted(hash)),
                None => {
                    log::debug!("transaction {hash} pending");
                    Delay::new(self.poll_interval).await;
                }
            }
        }
    }
}

impl<P: Eip1193> VideoContract for EvmVideoContract<P> {
    async fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        let res = self.read(getVideosCall {}).await?;

        let len = res.uploaders.len();
        let lens = [
            res.videoHashes.len(),
            res.thumbnailHashes.len(),
            res.prices.len(),
            res.displayTimes.len(),
        ];
        if lens.iter().any(|l| *l != len) {
            return Err(Error::MalformedVideoList);
        }

        let videos = res
            .uploaders
            .into_iter()
            .zip(res.videoHashes)
            .zip(res.thumbnailHashes)
            .zip(res.prices)
            .zip(res.displayTimes)
            .enumerate()
            .map(
                |(id, ((((uploader, video_hash), thumbnail_hash), price), display_time))|
                 -> Result<VideoRecord> {
                    let id = id as u64;
                    Ok(VideoRecord {
                        id,
                        uploader,
                        video_hash: video_hash.into(),
                        thumbnail_hash: thumbnail_hash.into(),
                        price,
                        display_time: u64::try_from(display_time)
                            .map_err(|_| Error::DisplayTimeOutOfRange(id))?,
                    })
                },
            )
            .collect::<Result<Vec<_>>>()?;

        Ok(videos)
    }

    async fn check_permission(&self, video_id: u64, viewer: Address) -> Result<bool> {
        let res = self
            .read(canViewCall {
                videoId: U256::from(video_id),
                viewer,
            })
            .await?;
        Ok(res.allowed)
    }

    async fn pay_to_view(&self, from: Address, video_id: u64, price: U256) -> Result<TxHash> {
        let call = payToViewCall {
            videoId: U256::from(video_id),
        };
        self.transact(from, call, Some(price)).await
    }

    async fn upload_video(&self, from: Address, video: &NewVideo) -> Result<TxHash> {
        let call = uploadVideoCall {
            videoHash: video.video_hash.to_string(),
            thumbnailHash: video.thumbnail_hash.to_string(),
            price: video.price,
            displayTime: U256::from(video.display_time),
        };
        self.transact(from, call, None).await
    }
}
