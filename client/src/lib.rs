pub mod access;
mod app;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod contract;
mod error;
pub mod gate;
#[cfg(test)]
pub(crate) mod mock;
pub mod notify;
pub mod pinning;
pub mod session;
pub mod upload;
pub mod utils;
pub mod wallet;

pub use app::PayPerView;
pub use error::*;
