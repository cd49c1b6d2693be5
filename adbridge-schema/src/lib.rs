pub mod deletion;
pub mod google_ads;
pub mod linkedin_ads;
pub mod meta_ads;
pub mod oauth;
pub mod tiktok_ads;

pub use deletion::{DeletionReceiptBody, DeletionStatusBody, SignedRequestPayload};
pub use oauth::{ProviderErrorBody, StandardTokenBody};
pub use tiktok_ads::{TiktokEnvelope, TiktokTokenData, TiktokTokenRequest};
