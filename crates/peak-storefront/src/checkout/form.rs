//! Form bodies for the two checkout endpoints.
//!
//! Both endpoints take the same flat field list; the storefront rejects
//! requests with missing keys even when the values are empty, so every field
//! is always sent, in the platform's own order.

use peak_core::{SiteConfig, Task};

use crate::provinces::COUNTRY_CODE;

/// Ordered `(name, value)` pairs, sent with `RequestBuilder::form`.
pub(crate) type FormFields = Vec<(&'static str, String)>;

/// Values that differ between the shipping quote and the order placement.
#[derive(Default)]
struct Filled<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: &'a str,
    billing_same_as_shipping: &'a str,
    shipping_handle: &'a str,
    payment_category: &'a str,
    gateway_handle: &'a str,
}

/// Fields for `PUT /sf/checkout/{cart}/shipping_address`.
///
/// Only the delivery address is filled in: the quote depends on nothing else.
pub(crate) fn shipping_quote_form(token: &str, task: &Task) -> FormFields {
    checkout_form(token, task, &Filled::default())
}

/// Fields for `POST /sf/checkout/{cart}/order_placement`.
pub(crate) fn order_placement_form(
    token: &str,
    task: &Task,
    site: &SiteConfig,
    shipping_handle: &str,
) -> FormFields {
    checkout_form(
        token,
        task,
        &Filled {
            first_name: &task.firstname,
            last_name: &task.lastname,
            email: &task.email,
            phone: &task.phone,
            billing_same_as_shipping: "true",
            shipping_handle,
            payment_category: &site.payment_category,
            gateway_handle: &site.gateway_handle,
        },
    )
}

fn checkout_form(token: &str, task: &Task, filled: &Filled<'_>) -> FormFields {
    let s = |v: &str| v.to_owned();
    vec![
        ("_token", s(token)),
        ("_testing", s("false")),
        ("checkout[detail][first_name]", s(filled.first_name)),
        ("checkout[detail][last_name]", s(filled.last_name)),
        ("checkout[detail][email]", s(filled.email)),
        ("checkout[detail][phone]", s(filled.phone)),
        ("base_delivery_method", s("shipping")),
        ("checkout[delivery_datetime]", String::new()),
        ("checkout[pickup_address][is_self_collect]", s("true")),
        ("checkout[pickup_address][receiver][first_name]", String::new()),
        ("checkout[pickup_address][receiver][last_name]", String::new()),
        ("checkout[pickup_address][receiver][email]", String::new()),
        ("checkout[pickup_address][receiver][phone]", String::new()),
        ("checkout[delivery_method]", s("shipping-standard")),
        ("checkout[shipping_address][first_name]", s(filled.first_name)),
        ("checkout[shipping_address][last_name]", s(filled.last_name)),
        ("checkout[shipping_address][email]", s(filled.email)),
        ("checkout[shipping_address][phone]", s(filled.phone)),
        ("checkout[shipping_address][company]", String::new()),
        ("checkout[shipping_address][address1]", s(&task.address_line1)),
        ("checkout[shipping_address][province_code]", s(&task.state)),
        ("checkout[shipping_address][address2]", String::new()),
        ("checkout[shipping_address][country_code]", s(COUNTRY_CODE)),
        ("checkout[shipping_address][city]", s(&task.city)),
        ("checkout[shipping_address][zip]", s(&task.zipcode)),
        ("shipping_handle", s(filled.shipping_handle)),
        ("checkout[remark]", String::new()),
        (
            "checkout[billing_same_as_shipping]",
            s(filled.billing_same_as_shipping),
        ),
        ("checkout[billing_address][company]", String::new()),
        ("checkout[billing_address][address1]", String::new()),
        ("checkout[billing_address][address2]", String::new()),
        ("checkout[billing_address][city]", String::new()),
        ("checkout[billing_address][zip]", String::new()),
        ("payment_category", s(filled.payment_category)),
        ("checkout[gateway_handle]", s(filled.gateway_handle)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let csv = "\
site,keyword,size,state,quantity,delay,address_line1,address_line2,city,zipcode,firstname,lastname,email,phone,cardno,expirydate,cvv
kicks-my,dunk,L,Selangor,1,500,1 Jalan Test,Unit 2,Shah Alam,40000,Aina,Rahman,aina@example.com,0123456789,,,
";
        let mut file = peak_core::parse_tasks(csv.as_bytes()).unwrap();
        file.tasks.remove(0).with_province_code("SGR")
    }

    fn site() -> SiteConfig {
        SiteConfig {
            site: "kicks-my".to_owned(),
            link: "https://kicks.example.com".to_owned(),
            product_link: "https://kicks.example.com/collections/all".to_owned(),
            payment_category: "online_banking".to_owned(),
            gateway_handle: "billplz".to_owned(),
        }
    }

    fn value<'a>(form: &'a FormFields, key: &str) -> &'a str {
        form.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("missing field {key}"))
    }

    #[test]
    fn both_forms_share_the_same_keys_in_order() {
        let t = task();
        let quote = shipping_quote_form("tok", &t);
        let order = order_placement_form("tok", &t, &site(), "standard");
        let quote_keys: Vec<_> = quote.iter().map(|(k, _)| *k).collect();
        let order_keys: Vec<_> = order.iter().map(|(k, _)| *k).collect();
        assert_eq!(quote_keys, order_keys);
        assert_eq!(quote_keys.first(), Some(&"_token"));
        assert_eq!(quote_keys.last(), Some(&"checkout[gateway_handle]"));
    }

    #[test]
    fn shipping_quote_only_fills_the_address() {
        let form = shipping_quote_form("tok", &task());
        assert_eq!(value(&form, "_token"), "tok");
        assert_eq!(value(&form, "checkout[shipping_address][address1]"), "1 Jalan Test");
        assert_eq!(value(&form, "checkout[shipping_address][province_code]"), "SGR");
        assert_eq!(value(&form, "checkout[shipping_address][country_code]"), "MY");
        assert_eq!(value(&form, "checkout[shipping_address][city]"), "Shah Alam");
        assert_eq!(value(&form, "checkout[shipping_address][zip]"), "40000");
        assert_eq!(value(&form, "checkout[detail][email]"), "");
        assert_eq!(value(&form, "checkout[shipping_address][address2]"), "");
        assert_eq!(value(&form, "shipping_handle"), "");
        assert_eq!(value(&form, "payment_category"), "");
    }

    #[test]
    fn order_placement_carries_buyer_and_payment() {
        let form = order_placement_form("tok", &task(), &site(), "standard-delivery");
        assert_eq!(value(&form, "checkout[detail][first_name]"), "Aina");
        assert_eq!(value(&form, "checkout[shipping_address][phone]"), "0123456789");
        assert_eq!(value(&form, "checkout[billing_same_as_shipping]"), "true");
        assert_eq!(value(&form, "shipping_handle"), "standard-delivery");
        assert_eq!(value(&form, "payment_category"), "online_banking");
        assert_eq!(value(&form, "checkout[gateway_handle]"), "billplz");
    }

    #[test]
    fn card_details_are_never_sent() {
        let form = order_placement_form("tok", &task(), &site(), "h");
        assert!(form.iter().all(|(k, _)| !k.contains("card")));
    }
}
