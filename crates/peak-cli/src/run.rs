//! `run` and `check` command handlers.
//!
//! Row validation failures and per-task failures are reported and skipped;
//! only unreadable input files abort the command.

use std::path::PathBuf;

use peak_core::{AppConfig, TaskFile};
use peak_storefront::{
    dispatch, prepare_context, ClientSettings, DispatchOptions, Notifier, RunContext, TaskOutcome,
    TaskReport,
};

/// Input files for a command: CLI flags win over the environment.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct InputPaths {
    pub tasks: PathBuf,
    pub sites: PathBuf,
}

impl InputPaths {
    pub(crate) fn resolve(
        config: &AppConfig,
        tasks: Option<PathBuf>,
        sites: Option<PathBuf>,
    ) -> Self {
        Self {
            tasks: tasks.unwrap_or_else(|| config.tasks_path.clone()),
            sites: sites.unwrap_or_else(|| config.sites_path.clone()),
        }
    }
}

/// `--max-concurrent 0` means unbounded; no flag defers to the environment.
pub(crate) fn concurrency_limit(flag: Option<usize>, config: &AppConfig) -> Option<usize> {
    match flag {
        Some(0) => None,
        Some(n) => Some(n),
        None => config.max_concurrent_tasks,
    }
}

fn load_inputs(paths: &InputPaths) -> anyhow::Result<(peak_core::SitesFile, TaskFile)> {
    let sites = peak_core::load_sites(&paths.sites)?;
    let task_file = peak_core::load_tasks(&paths.tasks)?;
    for rejected in &task_file.rejected {
        tracing::warn!(error = %rejected, "skipping invalid task row");
    }
    tracing::info!(
        tasks = task_file.tasks.len(),
        rejected = task_file.rejected.len(),
        sites = sites.sites.len(),
        "loaded inputs"
    );
    Ok((sites, task_file))
}

/// Load everything, dispatch all valid tasks and print a per-task summary.
///
/// # Errors
///
/// Returns an error if the site or task file cannot be read, or the HTTP
/// clients cannot be built. Task failures are reported, not returned.
pub(crate) async fn run_tasks(
    config: &AppConfig,
    paths: &InputPaths,
    max_concurrent: Option<usize>,
) -> anyhow::Result<()> {
    let (sites, task_file) = load_inputs(paths)?;
    if task_file.tasks.is_empty() {
        println!("no runnable tasks in {}", paths.tasks.display());
        return Ok(());
    }

    let settings = ClientSettings::from_app_config(config);
    let notifier = config
        .webhook_url
        .as_deref()
        .map(|url| Notifier::new(&settings, url))
        .transpose()?;
    if notifier.is_none() {
        tracing::info!("PEAK_WEBHOOK_URL not set; notifications disabled");
    }

    let ctx = prepare_context(sites, &task_file.tasks, settings, notifier).await?;
    let options = DispatchOptions {
        max_concurrent_tasks: concurrency_limit(max_concurrent, config),
    };
    let reports = dispatch(&ctx, task_file.tasks, &options).await;

    for report in &reports {
        println!("{}", summary_line(report));
    }
    let succeeded = reports.iter().filter(|r| r.succeeded()).count();
    println!(
        "{succeeded}/{} tasks checked out ({} rows rejected)",
        reports.len(),
        task_file.rejected.len()
    );
    Ok(())
}

/// Validate the input files and resolve every task's site and province.
///
/// # Errors
///
/// Returns an error if any row is rejected or any task cannot be resolved.
pub(crate) async fn check_tasks(config: &AppConfig, paths: &InputPaths) -> anyhow::Result<()> {
    let (sites, task_file) = load_inputs(paths)?;
    let settings = ClientSettings::from_app_config(config);
    let ctx = prepare_context(sites, &task_file.tasks, settings, None).await?;

    let mut problems = task_file.rejected.len();
    for rejected in &task_file.rejected {
        println!("rejected: {rejected}");
    }
    for task in &task_file.tasks {
        match check_line(&ctx, task) {
            Ok(line) => println!("{line}"),
            Err(line) => {
                problems += 1;
                println!("{line}");
            }
        }
    }

    if problems > 0 {
        anyhow::bail!("{problems} task(s) failed validation");
    }
    println!("{} tasks ok", task_file.tasks.len());
    Ok(())
}

fn check_line(ctx: &RunContext, task: &peak_core::Task) -> Result<String, String> {
    let mode = if task.is_direct_link() {
        "direct link"
    } else {
        "keywords"
    };
    match ctx.resolve(task) {
        Ok((site, code)) => Ok(format!(
            "task {} [{}] ok: {mode} '{}', size {}, province {code}, via {}",
            task.number(),
            task.site,
            task.keyword,
            task.size,
            site.base_url()
        )),
        Err(e) => Err(format!("task {} [{}] invalid: {e}", task.number(), task.site)),
    }
}

pub(crate) fn summary_line(report: &TaskReport) -> String {
    let task = report.index + 1;
    match &report.outcome {
        TaskOutcome::CheckedOut(c) if c.checkout.succeeded() => format!(
            "task {task} [{}] checked out {} ({}) after {} attempt(s): {}",
            report.site,
            c.product.name,
            c.variant.title,
            report.attempts,
            c.checkout.checkout_link()
        ),
        TaskOutcome::CheckedOut(c) => format!(
            "task {task} [{}] checkout failed for {} ({}): {} stage error(s)",
            report.site,
            c.product.name,
            c.variant.title,
            c.checkout.failures.len()
        ),
        TaskOutcome::Failed(e) => format!("task {task} [{}] failed: {e}", report.site),
    }
}
