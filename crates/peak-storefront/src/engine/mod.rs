//! Per-task execution engine.
//!
//! A task walks an explicit state machine:
//!
//! ```text
//! Fetching → Extracting → Matching → SelectingVariant → CheckingOut → Done
//!     ↑                                                    (once)
//!     └──── Retry (sleep `delay`) ←── NotReady / NoMatch / OutOfStock / VariantUnavailable
//! ```
//!
//! Any other error moves to `Failed`. Checkout runs at most once per task;
//! its stage failures are part of the `Done` outcome, not a reason to retry.

use std::time::Instant;

use peak_core::{SiteConfig, Task};
use tracing::{error, info, warn};

use crate::checkout::{CheckoutOutcome, CheckoutPipeline};
use crate::dispatch::RunContext;
use crate::error::StorefrontError;
use crate::extract::{extract_embedded_json, PageMode};
use crate::matcher::match_product;
use crate::notify::CheckoutNotice;
use crate::session::{Page, Session};
use crate::types::{Product, Variant};
use crate::variant::select_variant;

#[derive(Debug)]
pub enum TaskState {
    Fetching,
    Extracting(Page),
    /// Raw embedded JSON awaiting parsing and matching.
    Matching(String),
    SelectingVariant(Product),
    CheckingOut {
        product: Product,
        variant: Variant,
    },
    Retry(StorefrontError),
    Done(Box<CheckedOut>),
    Failed(StorefrontError),
}

impl TaskState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Done(_) | TaskState::Failed(_))
    }
}

/// Next state after a step: its successor on success, otherwise `Retry` for
/// retryable errors and `Failed` for the rest.
#[must_use]
pub fn transition(result: Result<TaskState, StorefrontError>) -> TaskState {
    match result {
        Ok(next) => next,
        Err(e) if e.is_retryable() => TaskState::Retry(e),
        Err(e) => TaskState::Failed(e),
    }
}

/// A task that reached checkout.
#[derive(Debug)]
pub struct CheckedOut {
    pub product: Product,
    pub variant: Variant,
    pub checkout: CheckoutOutcome,
}

#[derive(Debug)]
pub enum TaskOutcome {
    CheckedOut(Box<CheckedOut>),
    Failed(StorefrontError),
}

/// Final record of one task run.
#[derive(Debug)]
pub struct TaskReport {
    /// 0-based task index.
    pub index: usize,
    pub site: String,
    /// Page fetches issued.
    pub attempts: u32,
    /// Sleeps taken before polling again.
    pub retries: u32,
    pub outcome: TaskOutcome,
}

impl TaskReport {
    /// True only when checkout produced a payment link.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(&self.outcome, TaskOutcome::CheckedOut(c) if c.checkout.succeeded())
    }
}

/// Runs one task to completion: resolves its site and province, polls until
/// a variant is selectable, checks out once and sends the notification.
///
/// Never returns an error; failures are reported in [`TaskReport::outcome`].
pub async fn run_task(ctx: &RunContext, task: Task) -> TaskReport {
    let started = Instant::now();
    let (attempts, retries, outcome) = match ctx.resolve(&task) {
        Ok((site, code)) => {
            let resolved = task.clone().with_province_code(code);
            execute(ctx, site, &resolved).await
        }
        Err(e) => (0, 0, TaskOutcome::Failed(e)),
    };

    match &outcome {
        TaskOutcome::CheckedOut(checked_out) => {
            info!(
                task = task.number(),
                site = %task.site,
                product = %checked_out.product.name,
                variant = %checked_out.variant.title,
                succeeded = checked_out.checkout.succeeded(),
                attempts,
                elapsed_ms = started.elapsed().as_millis(),
                "task finished"
            );
            if let Some(notifier) = &ctx.notifier {
                let notice = CheckoutNotice {
                    task_number: task.number(),
                    product_name: checked_out.product.name.clone(),
                    variant: checked_out.variant.title.clone(),
                    price: checked_out.product.price,
                    image_url: checked_out.product.img_url.clone(),
                    checkout_link: checked_out.checkout.checkout_link().to_owned(),
                };
                if let Err(e) = notifier.send(&notice).await {
                    warn!(task = task.number(), error = %e, "notification failed");
                }
            }
        }
        TaskOutcome::Failed(e) => {
            error!(
                task = task.number(),
                site = %task.site,
                attempts,
                error = %e,
                "task failed"
            );
        }
    }

    TaskReport {
        index: task.index,
        site: task.site,
        attempts,
        retries,
        outcome,
    }
}

/// Drives the state machine for a resolved task. Returns `(attempts,
/// retries, outcome)`.
async fn execute(ctx: &RunContext, site: &SiteConfig, task: &Task) -> (u32, u32, TaskOutcome) {
    let session = match Session::new(&ctx.settings) {
        Ok(session) => session,
        Err(e) => return (0, 0, TaskOutcome::Failed(e)),
    };

    let mut run = TaskRun {
        task,
        site,
        session,
        mode: PageMode::for_task(task),
        attempts: 0,
        retries: 0,
    };
    let outcome = run.drive().await;
    (run.attempts, run.retries, outcome)
}

/// Mutable run state for one task's state machine.
struct TaskRun<'a> {
    task: &'a Task,
    site: &'a SiteConfig,
    session: Session,
    mode: PageMode,
    attempts: u32,
    retries: u32,
}

impl TaskRun<'_> {
    async fn drive(&mut self) -> TaskOutcome {
        let mut state = TaskState::Fetching;
        loop {
            state = match state {
                TaskState::Done(checked_out) => return TaskOutcome::CheckedOut(checked_out),
                TaskState::Failed(e) => return TaskOutcome::Failed(e),
                other => self.step(other).await,
            };
        }
    }

    fn page_url(&self) -> &str {
        match self.mode {
            PageMode::Product => &self.task.keyword,
            PageMode::Collection => &self.site.product_link,
        }
    }

    async fn step(&mut self, state: TaskState) -> TaskState {
        match state {
            TaskState::Fetching => {
                self.attempts += 1;
                let url = self.page_url().to_owned();
                transition(self.session.fetch(&url).await.map(TaskState::Extracting))
            }
            TaskState::Extracting(page) => transition(
                extract_embedded_json(&page.body, self.mode)
                    .map(|raw| TaskState::Matching(raw.to_owned())),
            ),
            TaskState::Matching(raw) => {
                transition(match_product(&raw, self.mode, &self.task.keyword).map(|product| {
                    info!(
                        task = self.task.number(),
                        site = %self.task.site,
                        product = %product.name,
                        "product found"
                    );
                    TaskState::SelectingVariant(product)
                }))
            }
            TaskState::SelectingVariant(product) => {
                let selected = select_variant(&product, &self.task.size).cloned();
                transition(selected.map(|variant| {
                    info!(
                        task = self.task.number(),
                        site = %self.task.site,
                        product = %product.name,
                        variant = %variant.title,
                        "variant found"
                    );
                    TaskState::CheckingOut { product, variant }
                }))
            }
            TaskState::CheckingOut { product, variant } => {
                let checkout = CheckoutPipeline::new(&self.session, self.site, self.task)
                    .run(&variant)
                    .await;
                TaskState::Done(Box::new(CheckedOut {
                    product,
                    variant,
                    checkout,
                }))
            }
            TaskState::Retry(reason) => {
                info!(
                    task = self.task.number(),
                    site = %self.task.site,
                    attempt = self.attempts,
                    reason = %reason,
                    "not ready, retrying"
                );
                tokio::time::sleep(self.task.delay()).await;
                self.retries += 1;
                TaskState::Fetching
            }
            terminal @ (TaskState::Done(_) | TaskState::Failed(_)) => terminal,
        }
    }
}
