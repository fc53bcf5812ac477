//! Fixtures shared by the storefront integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use peak_core::{SiteConfig, SitesFile, Task};
use peak_storefront::{ClientSettings, ProvinceTable, RunContext};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SITE: &str = "kicks-my";
pub const XSRF: &str = "tok123";
pub const CART_TOKEN: &str = "cart-abc";

pub fn settings() -> ClientSettings {
    ClientSettings {
        timeout_secs: 5,
        user_agent: "peak-test/0.1".to_owned(),
    }
}

pub fn site(base: &str) -> SiteConfig {
    SiteConfig {
        site: SITE.to_owned(),
        link: base.to_owned(),
        product_link: format!("{base}/collections/all"),
        payment_category: "online_banking".to_owned(),
        gateway_handle: "billplz".to_owned(),
    }
}

/// One task parsed through the real CSV loader.
pub fn task(index: usize, keyword: &str, size: &str, state: &str) -> Task {
    let header = "site,keyword,size,state,quantity,delay,address_line1,address_line2,city,zipcode,firstname,lastname,email,phone,cardno,expirydate,cvv";
    let row = format!(
        "{SITE},{keyword},{size},{state},1,10,1 Jalan Test,Unit 2,Shah Alam,40000,Aina,Rahman,aina@example.com,0123456789,,,"
    );
    let csv = format!("{header}\n{row}\n");
    let mut file = peak_core::parse_tasks(csv.as_bytes()).expect("task csv parses");
    assert!(file.rejected.is_empty(), "fixture row rejected: {:?}", file.rejected);
    let mut task = file.tasks.remove(0);
    task.index = index;
    task
}

pub fn selangor() -> ProvinceTable {
    [("Selangor".to_owned(), "SGR".to_owned())]
        .into_iter()
        .collect()
}

pub fn context(base: &str) -> RunContext {
    RunContext {
        sites: SitesFile {
            sites: vec![site(base)],
        },
        provinces: HashMap::from([(SITE.to_owned(), selangor())]),
        notifier: None,
        settings: settings(),
    }
}

pub fn dunk_low() -> Value {
    json!({
        "id": 4012,
        "name": "Dunk Low Panda",
        "price": 459.9,
        "available": true,
        "img_url": "https://cdn.example.com/dunk.jpg",
        "variants": [
            {"id": 11, "title": "M", "available": false},
            {"id": 12, "title": "L", "available": true}
        ]
    })
}

pub fn product_page(product: &Value) -> String {
    format!("<html><script>\nconst product = {product};\n</script></html>")
}

pub fn collection_page(products: &Value) -> String {
    format!("<html><script>\nconst collection = {{\"products\":{products}}};\n</script></html>")
}

/// A 200 page response that sets the anti-forgery cookie.
pub fn page_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("set-cookie", format!("XSRF-TOKEN={XSRF}; Path=/").as_str())
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

/// Mounts add-to-cart, shipping and order endpoints that all succeed.
pub async fn mount_checkout(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/cart/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": CART_TOKEN,
            "items": [{"product_name": "Dunk Low Panda", "variant_name": "L", "quantity": 1}]
        })))
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("/sf/checkout/{CART_TOKEN}/shipping_address")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "checkout": {"selected_shipping_method": {"handle": "standard-delivery", "title": "Standard"}}
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/sf/checkout/{CART_TOKEN}/order_placement")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"redirect_url": "https://pay.example.com/r/1"})),
        )
        .mount(server)
        .await;
}

/// Requests received by `server` other than page fetches, as `METHOD path`.
pub async fn checkout_calls(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() != "GET")
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}
