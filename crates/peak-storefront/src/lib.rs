//! Storefront polling and checkout for `peak`.
//!
//! A task is driven by the [`engine`] state machine: the page is fetched
//! through a per-task [`Session`], the embedded product data is pulled out by
//! [`extract`], matched by [`matcher`] and narrowed to one variant by
//! [`variant`]. The [`checkout`] pipeline then runs exactly once. The
//! [`dispatch`] module fans tasks out and collects their reports.

pub mod checkout;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod notify;
pub mod provinces;
pub mod session;
pub mod types;
pub mod variant;

pub use checkout::{CheckoutOutcome, CheckoutPipeline, CheckoutStage};
pub use dispatch::{dispatch, prepare_context, DispatchOptions, RunContext};
pub use engine::{run_task, transition, CheckedOut, TaskOutcome, TaskReport, TaskState};
pub use error::StorefrontError;
pub use extract::{extract_embedded_json, PageMode};
pub use matcher::{keyword_matches, match_product, search_products};
pub use notify::{CheckoutNotice, Notifier};
pub use provinces::{fetch_provinces, ProvinceTable};
pub use session::{ClientSettings, Page, Session};
pub use types::{Collection, Product, Variant};
pub use variant::select_variant;
