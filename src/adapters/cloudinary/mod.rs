//! Cloudinary-compatible media service adapter.
//!
//! - `client`: signed upload/destroy calls implementing `MediaIngestionPort`
//! - `delivery`: URLs for on-the-fly transformations (downloads, crops, background removal)

mod client;
pub mod delivery;
mod signature;

pub use client::CloudinaryClient;
pub use delivery::DeliveryUrls;
