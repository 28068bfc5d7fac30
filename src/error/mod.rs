mod oauth;
mod sitepush;

pub use oauth::OauthError;
pub(crate) use oauth::body_preview;
pub use sitepush::SitepushError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
