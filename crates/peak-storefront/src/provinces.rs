//! Province name → code lookup for a storefront.
//!
//! The storefront only accepts province codes in checkout forms, while task
//! files carry human-readable state names. Tables are fetched once per site
//! before dispatch and then only read.

use std::collections::HashMap;

use reqwest::Client;

use crate::error::StorefrontError;
use crate::types::ProvinceResponse;

/// Country every checkout ships to.
pub const COUNTRY_CODE: &str = "MY";

#[derive(Debug, Clone, Default)]
pub struct ProvinceTable {
    codes: HashMap<String, String>,
}

impl ProvinceTable {
    /// Looks up a province code by its exact display name.
    #[must_use]
    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.codes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// When a name repeats, the first code listed wins.
impl FromIterator<(String, String)> for ProvinceTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut codes = HashMap::new();
        for (name, code) in iter {
            codes.entry(name).or_insert(code);
        }
        Self { codes }
    }
}

#[must_use]
pub fn provinces_url(base_url: &str) -> String {
    format!(
        "{}/sf/countries/{COUNTRY_CODE}/provinces",
        base_url.trim_end_matches('/')
    )
}

/// Fetches the province table for the storefront at `base_url`.
///
/// # Errors
///
/// - [`StorefrontError::UnexpectedStatus`] — non-200 response.
/// - [`StorefrontError::Transport`] — network failure.
/// - [`StorefrontError::ParseFailed`] — body is not a province list.
pub async fn fetch_provinces(
    client: &Client,
    base_url: &str,
) -> Result<ProvinceTable, StorefrontError> {
    let url = provinces_url(base_url);
    let response = client.get(&url).send().await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(StorefrontError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        });
    }

    let body = response.text().await?;
    let parsed = serde_json::from_str::<ProvinceResponse>(&body).map_err(|e| {
        StorefrontError::ParseFailed {
            context: format!("provinces from {url}"),
            source: e,
        }
    })?;

    Ok(parsed
        .provinces
        .into_iter()
        .map(|p| (p.name, p.code))
        .collect())
}
