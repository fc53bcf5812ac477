use thiserror::Error;

use crate::checkout::CheckoutStage;
use crate::extract::PageMode;

#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Network, TLS or body-read failure. Fatal to the task's retry loop.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx page response: the product is not published yet.
    #[error("page not ready: HTTP {status} from {url}")]
    NotReady { status: u16, url: String },

    #[error("no XSRF-TOKEN cookie in response from {url}")]
    MissingAntiForgeryToken { url: String },

    #[error("no embedded {mode} data found in page")]
    ExtractionFailed { mode: PageMode },

    #[error("JSON deserialization error for {context}: {source}")]
    ParseFailed {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no product matched keywords \"{keyword}\"")]
    NoMatch { keyword: String },

    #[error("product \"{product}\" is out of stock")]
    OutOfStock { product: String },

    #[error("no available variant \"{size}\" for product \"{product}\"")]
    VariantUnavailable { product: String, size: String },

    /// A checkout sub-step failed. Recorded and logged; later stages still run.
    #[error("{stage} failed: {reason}")]
    StageFailed { stage: CheckoutStage, reason: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("site not found: {site}")]
    SiteNotFound { site: String },

    #[error("province lookup for {site} is unavailable")]
    ProvincesUnavailable { site: String },

    #[error("province not found for {site}: {state}")]
    ProvinceNotFound { site: String, state: String },

    #[error("notification webhook failed: {reason}")]
    Notify { reason: String },
}

impl StorefrontError {
    /// Whether the engine should sleep and poll again rather than give up.
    ///
    /// Only "not published yet" and business conditions (no match, sold out,
    /// size unavailable) retry. Everything else ends the task.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorefrontError::NotReady { .. }
                | StorefrontError::NoMatch { .. }
                | StorefrontError::OutOfStock { .. }
                | StorefrontError::VariantUnavailable { .. }
        )
    }
}
