use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One storefront the runner knows how to buy from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Identifier used in the `site` column of the task file.
    pub site: String,
    /// Storefront root, e.g. `https://shop.example.com`.
    pub link: String,
    /// Page embedding `const collection = {...}`; polled for keyword tasks.
    pub product_link: String,
    /// `payment_category` sent with the order placement form.
    pub payment_category: String,
    /// `checkout[gateway_handle]` sent with the order placement form.
    pub gateway_handle: String,
}

impl SiteConfig {
    /// Storefront root without a trailing slash, ready for path joins.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.link.trim_end_matches('/')
    }
}

#[derive(Debug, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteConfig>,
}

impl SitesFile {
    /// Look up a site by its exact identifier.
    #[must_use]
    pub fn find(&self, site: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|s| s.site == site)
    }
}

/// Load and validate the site lookup table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sites_file: SitesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SitesFileParse)?;

    validate_sites(&sites_file)?;

    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for site in &sites_file.sites {
        if site.site.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site name must be non-empty".to_string(),
            ));
        }

        for (field, value) in [("link", &site.link), ("product_link", &site.product_link)] {
            if !is_http_url(value) {
                return Err(ConfigError::Validation(format!(
                    "site '{}' has invalid {field} '{value}'; must start with http:// or https://",
                    site.site
                )));
            }
        }

        if !seen.insert(site.site.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site: '{}'",
                site.site
            )));
        }
    }

    Ok(())
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
