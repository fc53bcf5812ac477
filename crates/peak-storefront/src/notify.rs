//! Discord webhook notification sent once per checked-out task.

use chrono::{DateTime, Local};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::StorefrontError;
use crate::session::ClientSettings;

const BOT_NAME: &str = "Easystore Bot";
const COLOR_SUCCESS: u32 = 0x00_FF_00;
const COLOR_FAILURE: u32 = 0xFF_00_00;

/// What a notification reports about one checkout.
#[derive(Debug, Clone)]
pub struct CheckoutNotice {
    pub task_number: usize,
    pub product_name: String,
    pub variant: String,
    pub price: Decimal,
    pub image_url: String,
    /// Empty when the checkout failed.
    pub checkout_link: String,
}

#[derive(Debug, Serialize)]
struct Hook {
    username: &'static str,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    color: u32,
    fields: Vec<Field>,
    thumbnail: Thumbnail,
    footer: Footer,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct Field {
    name: &'static str,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Serialize)]
struct Footer {
    text: String,
}

fn field(name: &'static str, value: String) -> Field {
    Field {
        name,
        value,
        inline: false,
    }
}

fn build_hook(notice: &CheckoutNotice, now: DateTime<Local>) -> Hook {
    let mut fields = vec![
        field("Product Name", notice.product_name.clone()),
        field("Variant", notice.variant.clone()),
        field("Price", format!("{:.2}", notice.price)),
        field("Task No", notice.task_number.to_string()),
    ];

    let (title, color) = if notice.checkout_link.is_empty() {
        ("Checkout Failed!".to_owned(), COLOR_FAILURE)
    } else {
        fields.push(field(
            "Checkout Link",
            format!("||{}||", notice.checkout_link),
        ));
        (notice.product_name.clone(), COLOR_SUCCESS)
    };

    Hook {
        username: BOT_NAME,
        embeds: vec![Embed {
            title,
            color,
            fields,
            thumbnail: Thumbnail {
                url: notice.image_url.clone(),
            },
            footer: Footer {
                text: format!("v2 | {BOT_NAME} - {}", now.format("%H:%M:%S%.3f")),
            },
            timestamp: now.to_rfc3339(),
        }],
    }
}

/// Posts checkout notices to a webhook.
pub struct Notifier {
    client: Client,
    webhook_url: String,
}

impl Notifier {
    /// # Errors
    ///
    /// Returns [`StorefrontError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(settings: &ClientSettings, webhook_url: impl Into<String>) -> Result<Self, StorefrontError> {
        Ok(Self {
            client: settings.build_client(false)?,
            webhook_url: webhook_url.into(),
        })
    }

    /// Sends one notice. The webhook answers `204 No Content` on success.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Notify`] on a transport failure or any
    /// status other than 204.
    pub async fn send(&self, notice: &CheckoutNotice) -> Result<(), StorefrontError> {
        let hook = build_hook(notice, Local::now());
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&hook)
            .send()
            .await
            .map_err(|e| StorefrontError::Notify {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(StorefrontError::Notify {
                reason: format!("expected HTTP 204, got {}", status.as_u16()),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("webhook_url", &"[redacted]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::Value;

    use super::*;

    fn notice(link: &str) -> CheckoutNotice {
        CheckoutNotice {
            task_number: 3,
            product_name: "Dunk Low Panda".to_owned(),
            variant: "L".to_owned(),
            price: Decimal::new(4599, 1),
            image_url: "https://cdn.example.com/dunk.jpg".to_owned(),
            checkout_link: link.to_owned(),
        }
    }

    fn render(notice: &CheckoutNotice) -> Value {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        serde_json::to_value(build_hook(notice, now)).unwrap()
    }

    #[test]
    fn success_embed_has_spoilered_link() {
        let json = render(&notice("https://pay.example.com/r/1"));
        assert_eq!(json["username"], "Easystore Bot");
        let embed = &json["embeds"][0];
        assert_eq!(embed["title"], "Dunk Low Panda");
        assert_eq!(embed["color"], 0x00FF00);
        let fields = embed["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[2]["name"], "Price");
        assert_eq!(fields[2]["value"], "459.90");
        assert_eq!(fields[3]["value"], "3");
        assert_eq!(fields[4]["name"], "Checkout Link");
        assert_eq!(fields[4]["value"], "||https://pay.example.com/r/1||");
        assert_eq!(embed["thumbnail"]["url"], "https://cdn.example.com/dunk.jpg");
        assert_eq!(embed["footer"]["text"], "v2 | Easystore Bot - 09:05:07.000");
    }

    #[test]
    fn failure_embed_is_red_without_link() {
        let json = render(&notice(""));
        let embed = &json["embeds"][0];
        assert_eq!(embed["title"], "Checkout Failed!");
        assert_eq!(embed["color"], 0xFF0000);
        let fields = embed["fields"].as_array().unwrap();
        assert!(fields.iter().all(|f| f["name"] != "Checkout Link"));
    }
}
