//! Product matching for direct-link and keyword tasks.
//!
//! A keyword expression is a comma-separated list of OR-terms, each an
//! `&`-separated list of AND-subterms: `"dunk & low, jordan 1"` matches any
//! product whose name contains both `dunk` and `low`, or contains `jordan 1`.
//!
//! Only the product name is lower-cased. Subterms are trimmed but keep their
//! case, so an upper-case subterm can never match.

use crate::error::StorefrontError;
use crate::extract::PageMode;
use crate::types::{Collection, Product};

/// Evaluates a keyword expression against a product name.
#[must_use]
pub fn keyword_matches(expr: &str, name: &str) -> bool {
    let name = name.to_lowercase();
    expr.split(',').any(|or_term| {
        or_term
            .split('&')
            .all(|subterm| name.contains(subterm.trim()))
    })
}

/// Picks the matching product with the highest id, or `None`.
///
/// Newer listings get higher ids, so the highest id is the most recent drop.
/// On equal ids the first listed product wins.
#[must_use]
pub fn search_products<'a>(collection: &'a Collection, expr: &str) -> Option<&'a Product> {
    collection
        .products
        .iter()
        .filter(|p| keyword_matches(expr, &p.name))
        .reduce(|best, p| if p.id > best.id { p } else { best })
}

/// Parses embedded JSON and resolves it to one in-stock product.
///
/// In [`PageMode::Product`] the JSON is the product itself and `keyword` is
/// ignored. In [`PageMode::Collection`] the JSON is a collection filtered by
/// [`keyword_matches`].
///
/// # Errors
///
/// - [`StorefrontError::ParseFailed`] — the JSON does not have the expected shape.
/// - [`StorefrontError::NoMatch`] — no product in the collection matched.
/// - [`StorefrontError::OutOfStock`] — the resolved product is unavailable.
pub fn match_product(raw: &str, mode: PageMode, keyword: &str) -> Result<Product, StorefrontError> {
    let product = match mode {
        PageMode::Product => {
            serde_json::from_str::<Product>(raw).map_err(|e| StorefrontError::ParseFailed {
                context: "embedded product".to_owned(),
                source: e,
            })?
        }
        PageMode::Collection => {
            let collection = serde_json::from_str::<Collection>(raw).map_err(|e| {
                StorefrontError::ParseFailed {
                    context: "embedded collection".to_owned(),
                    source: e,
                }
            })?;
            search_products(&collection, keyword)
                .cloned()
                .ok_or_else(|| StorefrontError::NoMatch {
                    keyword: keyword.to_owned(),
                })?
        }
    };

    if !product.available {
        return Err(StorefrontError::OutOfStock {
            product: product.name,
        });
    }

    Ok(product)
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
