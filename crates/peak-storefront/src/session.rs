//! Per-task HTTP session: one cookie store, one anti-forgery token.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::StorefrontError;

/// Name of the cookie carrying the storefront's anti-forgery token.
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Client construction settings shared by every session in a run.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// `0` disables the per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &peak_core::AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
        }
    }

    pub(crate) fn build_client(&self, cookie_store: bool) -> Result<Client, StorefrontError> {
        let mut builder = Client::builder()
            .user_agent(&self.user_agent)
            .cookie_store(cookie_store);
        if self.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(self.timeout_secs));
        }
        Ok(builder.build()?)
    }
}

/// A fetched storefront page.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub body: String,
}

/// HTTP session owned by exactly one task.
///
/// Holds its own cookie jar so the cart created during checkout belongs to
/// the same visitor that loaded the product page. Never shared across tasks.
pub struct Session {
    client: Client,
    anti_forgery_token: Option<String>,
}

impl Session {
    /// Creates a session with an empty cookie store.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Transport`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(settings: &ClientSettings) -> Result<Self, StorefrontError> {
        Ok(Self {
            client: settings.build_client(true)?,
            anti_forgery_token: None,
        })
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Token captured from the most recent successful page fetch.
    #[must_use]
    pub fn anti_forgery_token(&self) -> Option<&str> {
        self.anti_forgery_token.as_deref()
    }

    /// GETs a product or collection page.
    ///
    /// On success the `XSRF-TOKEN` cookie from the response replaces any
    /// previously captured token.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotReady`] — any non-2xx status; the page is not
    ///   published yet and the caller should poll again.
    /// - [`StorefrontError::Transport`] — network, TLS or body-read failure.
    /// - [`StorefrontError::MissingAntiForgeryToken`] — a 2xx page that did
    ///   not set the token cookie; checkout cannot proceed without it.
    pub async fn fetch(&mut self, url: &str) -> Result<Page, StorefrontError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorefrontError::NotReady {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        // Cookies must be read before the body consumes the response.
        let token = xsrf_token(&response);
        let body = response.text().await?;

        let Some(token) = token else {
            return Err(StorefrontError::MissingAntiForgeryToken {
                url: url.to_owned(),
            });
        };
        self.anti_forgery_token = Some(token);

        Ok(Page {
            url: url.to_owned(),
            body,
        })
    }
}

fn xsrf_token(response: &Response) -> Option<String> {
    response
        .cookies()
        .find(|c| c.name() == XSRF_COOKIE)
        .map(|c| c.value().to_owned())
}
