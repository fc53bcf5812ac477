use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::form::FormFields;
use super::CheckoutStage;
use crate::error::StorefrontError;
use crate::types::{CartResponse, OrderPlacementResponse, ShippingMethod, ShippingRateResponse};

const XSRF_HEADER: &str = "x-xsrf-token";

#[derive(Serialize)]
struct AddToCartBody<'a> {
    id: i64,
    /// Sent as a string; the storefront's own cart widget does the same.
    quantity: String,
    #[serde(rename = "_token")]
    token: &'a str,
}

pub(super) fn add_to_cart_url(base: &str) -> String {
    format!("{base}/cart/add?retrieve=true")
}

pub(super) fn shipping_address_url(base: &str, cart_token: &str) -> String {
    format!("{base}/sf/checkout/{cart_token}/shipping_address")
}

pub(super) fn order_placement_url(base: &str, cart_token: &str) -> String {
    format!("{base}/sf/checkout/{cart_token}/order_placement")
}

pub(super) async fn add_to_cart(
    client: &Client,
    base: &str,
    token: &str,
    variant_id: i64,
    quantity: u32,
) -> Result<CartResponse, StorefrontError> {
    let stage = CheckoutStage::AddToCart;
    let body = AddToCartBody {
        id: variant_id,
        quantity: quantity.to_string(),
        token,
    };
    let request = client.post(add_to_cart_url(base)).json(&body);
    send(stage, request, token).await
}

pub(super) async fn shipping_quote(
    client: &Client,
    base: &str,
    token: &str,
    cart_token: &str,
    form: &FormFields,
) -> Result<ShippingMethod, StorefrontError> {
    let stage = CheckoutStage::ShippingQuote;
    let request = client
        .put(shipping_address_url(base, cart_token))
        .form(form);
    let response: ShippingRateResponse = send(stage, request, token).await?;
    Ok(response.checkout.selected_shipping_method)
}

pub(super) async fn place_order(
    client: &Client,
    base: &str,
    token: &str,
    cart_token: &str,
    form: &FormFields,
) -> Result<String, StorefrontError> {
    let stage = CheckoutStage::OrderPlacement;
    let request = client
        .post(order_placement_url(base, cart_token))
        .form(form);
    let response: OrderPlacementResponse = send(stage, request, token).await?;
    Ok(response.redirect_url)
}

/// Sends a stage request with the anti-forgery header and decodes a 200 body.
///
/// Every failure, transport included, is reported as the stage's failure.
async fn send<T: DeserializeOwned>(
    stage: CheckoutStage,
    request: RequestBuilder,
    token: &str,
) -> Result<T, StorefrontError> {
    let response = request
        .headers(stage_headers(token))
        .send()
        .await
        .map_err(|e| stage.failed(e))?;
    let body = read_ok_body(stage, response).await?;
    serde_json::from_str::<T>(&body).map_err(|e| stage.failed(format!("invalid response: {e}")))
}

fn stage_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        "x-requested-with",
        HeaderValue::from_static("XMLHttpRequest"),
    );
    // Cookie values are header-safe; an unrepresentable token is just omitted.
    if let Ok(value) = HeaderValue::from_str(token) {
        headers.insert(XSRF_HEADER, value);
    }
    headers
}

async fn read_ok_body(stage: CheckoutStage, response: Response) -> Result<String, StorefrontError> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(stage.failed(format!("HTTP {}", status.as_u16())));
    }
    response.text().await.map_err(|e| stage.failed(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cart_token_leaves_an_empty_path_segment() {
        assert_eq!(
            shipping_address_url("https://shop.example.com", ""),
            "https://shop.example.com/sf/checkout//shipping_address"
        );
        assert_eq!(
            order_placement_url("https://shop.example.com", "c1"),
            "https://shop.example.com/sf/checkout/c1/order_placement"
        );
    }

    #[test]
    fn add_to_cart_body_sends_quantity_as_string() {
        let body = AddToCartBody {
            id: 42,
            quantity: 2.to_string(),
            token: "xsrf",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 42, "quantity": "2", "_token": "xsrf"})
        );
        assert_eq!(
            add_to_cart_url("https://shop.example.com"),
            "https://shop.example.com/cart/add?retrieve=true"
        );
    }
}
