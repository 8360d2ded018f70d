pub mod media;
pub mod price;
