//! Variant selection by size token.

use peak_core::RANDOM_SIZE;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::error::StorefrontError;
use crate::types::{Product, Variant};

/// Picks the variant to buy for `size`.
///
/// - `"RA"`: uniform pick among available variants, from an RNG freshly
///   seeded on every call. Consecutive retries may pick the same variant.
/// - anything else: the first available variant whose title equals `size`
///   ignoring case. If some title equals `size` exactly, only exact titles
///   are considered, so a sold-out `"M"` is not swapped for an `"m"`.
///
/// # Errors
///
/// Returns [`StorefrontError::VariantUnavailable`] when nothing qualifies.
pub fn select_variant<'a>(product: &'a Product, size: &str) -> Result<&'a Variant, StorefrontError> {
    let selected = if size == RANDOM_SIZE {
        let available: Vec<&Variant> = product.variants.iter().filter(|v| v.available).collect();
        let mut rng = StdRng::from_os_rng();
        available.choose(&mut rng).copied()
    } else {
        let exact_title_exists = product.variants.iter().any(|v| v.title == size);
        product.variants.iter().find(|v| {
            let title_matches = if exact_title_exists {
                v.title == size
            } else {
                v.title.to_lowercase() == size.to_lowercase()
            };
            title_matches && v.available
        })
    };

    selected.ok_or_else(|| StorefrontError::VariantUnavailable {
        product: product.name.clone(),
        size: size.to_owned(),
    })
}
