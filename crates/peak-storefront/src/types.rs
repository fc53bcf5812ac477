//! Storefront response types.
//!
//! ## Embedded product data
//!
//! Product pages assign the product to a JS constant on a single line:
//! `const product = {"id":123,"name":"Dunk Low","price":459.0,...};`.
//! Collection pages do the same with `const collection = {"products":[...]}`.
//! Only the fields the runner uses are modelled; serde ignores the rest
//! (`handle`, `selected_variant`, `published_at`, ...).
//!
//! ### `price`
//! A JSON number in ringgit (`459.0`), not a string. Parsed into a
//! [`Decimal`] so the notification can print it with two decimals.
//!
//! ### `available`
//! Present on both products and variants. Treated as `false` when absent:
//! a product without the flag cannot be assumed purchasable.
//!
//! ### `null` values
//! Listings send `null` for unset fields (`img_url` on products without an
//! image, `title` on untitled variants). Those read as the field's default,
//! the same as a missing key, so one sparse product never breaks a whole
//! collection.
//!
//! ### Checkout endpoints
//! `POST /cart/add?retrieve=true` returns the whole cart; only `token` and the
//! carted items are read. `PUT .../shipping_address` returns the checkout with
//! the selected shipping method. `POST .../order_placement` returns the
//! payment redirect.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A purchasable variant; `title` carries the size label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Variant {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub img_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
}

/// Response from `GET /sf/countries/MY/provinces`.
#[derive(Debug, Deserialize)]
pub struct ProvinceResponse {
    #[serde(default)]
    pub provinces: Vec<Province>,
}

#[derive(Debug, Deserialize)]
pub struct Province {
    #[serde(default)]
    pub id: Option<i64>,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Deserialize)]
pub struct CartItem {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub variant_name: String,
    #[serde(default)]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ShippingRateResponse {
    pub checkout: ShippingCheckout,
}

#[derive(Debug, Deserialize)]
pub struct ShippingCheckout {
    pub selected_shipping_method: ShippingMethod,
}

#[derive(Debug, Deserialize)]
pub struct ShippingMethod {
    pub handle: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderPlacementResponse {
    #[serde(alias = "url")]
    pub redirect_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_parses_numeric_price_and_ignores_unknown_fields() {
        let raw = r#"{
            "id": 4012,
            "handle": "dunk-low",
            "name": "Dunk Low Panda",
            "price": 459.9,
            "available": true,
            "img_url": "https://cdn.example.com/dunk.jpg",
            "selected_variant": {"id": 1, "title": "S", "available": true},
            "variants": [{"id": 1, "title": "S", "available": true, "sku": "DL-S"}]
        }"#;
        let product: Product = serde_json::from_str(raw).unwrap();
        assert_eq!(product.id, 4012);
        assert_eq!(format!("{:.2}", product.price), "459.90");
        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variants[0].title, "S");
    }

    #[test]
    fn missing_availability_defaults_to_false() {
        let product: Product = serde_json::from_str(r#"{"id": 1, "name": "X"}"#).unwrap();
        assert!(!product.available);
        assert!(product.variants.is_empty());
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let raw = r#"{
            "id": 7,
            "name": null,
            "price": null,
            "available": null,
            "img_url": null,
            "variants": [{"id": 1, "title": null, "available": null}]
        }"#;
        let product: Product = serde_json::from_str(raw).unwrap();
        assert_eq!(product.name, "");
        assert_eq!(product.price, Decimal::ZERO);
        assert!(!product.available);
        assert_eq!(product.img_url, "");
        assert_eq!(product.variants[0].title, "");
        assert!(!product.variants[0].available);
    }

    #[test]
    fn order_placement_accepts_url_alias() {
        let resp: OrderPlacementResponse =
            serde_json::from_str(r#"{"url": "https://pay.example.com/r/1"}"#).unwrap();
        assert_eq!(resp.redirect_url, "https://pay.example.com/r/1");
    }
}
