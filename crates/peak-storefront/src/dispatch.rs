//! Fans tasks out concurrently and collects their reports.

use std::collections::{BTreeSet, HashMap};

use futures::stream::{self, StreamExt};
use peak_core::{SiteConfig, SitesFile, Task};
use tracing::{info, warn};

use crate::engine::{run_task, TaskReport};
use crate::error::StorefrontError;
use crate::notify::Notifier;
use crate::provinces::{fetch_provinces, ProvinceTable};
use crate::session::ClientSettings;

/// Read-only state shared by every task in a run.
///
/// Built once before dispatch; tasks only read it, so no locking is needed.
#[derive(Debug)]
pub struct RunContext {
    pub sites: SitesFile,
    /// Province tables keyed by site identifier. A site whose table could not
    /// be fetched is absent and its tasks fail with `ProvincesUnavailable`.
    pub provinces: HashMap<String, ProvinceTable>,
    pub notifier: Option<Notifier>,
    pub settings: ClientSettings,
}

impl RunContext {
    /// Finds the task's site and the province code for its state.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::SiteNotFound`] — the site is not configured.
    /// - [`StorefrontError::ProvincesUnavailable`] — the site's province
    ///   table could not be loaded.
    /// - [`StorefrontError::ProvinceNotFound`] — the state name is unknown.
    pub fn resolve(&self, task: &Task) -> Result<(&SiteConfig, &str), StorefrontError> {
        let site = self
            .sites
            .find(&task.site)
            .ok_or_else(|| StorefrontError::SiteNotFound {
                site: task.site.clone(),
            })?;
        let provinces =
            self.provinces
                .get(&task.site)
                .ok_or_else(|| StorefrontError::ProvincesUnavailable {
                    site: task.site.clone(),
                })?;
        let code = provinces
            .code_for(&task.state)
            .ok_or_else(|| StorefrontError::ProvinceNotFound {
                site: task.site.clone(),
                state: task.state.clone(),
            })?;
        Ok((site, code))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// `None` runs every task at once.
    pub max_concurrent_tasks: Option<usize>,
}

/// Builds the run context, fetching one province table per site used by
/// `tasks`.
///
/// Province fetch failures are logged and leave the site out of the table;
/// only the tasks for that site fail later.
///
/// # Errors
///
/// Returns [`StorefrontError::Transport`] if the HTTP client for province
/// lookups cannot be built.
pub async fn prepare_context(
    sites: SitesFile,
    tasks: &[Task],
    settings: ClientSettings,
    notifier: Option<Notifier>,
) -> Result<RunContext, StorefrontError> {
    let client = settings.build_client(false)?;
    let used: BTreeSet<&str> = tasks.iter().map(|t| t.site.as_str()).collect();

    let mut provinces = HashMap::new();
    for site_id in used {
        let Some(site) = sites.find(site_id) else {
            continue;
        };
        match fetch_provinces(&client, site.base_url()).await {
            Ok(table) => {
                info!(site = %site_id, provinces = table.len(), "loaded provinces");
                provinces.insert(site_id.to_owned(), table);
            }
            Err(e) => warn!(site = %site_id, error = %e, "failed to load provinces"),
        }
    }

    Ok(RunContext {
        sites,
        provinces,
        notifier,
        settings,
    })
}

/// Runs every task to completion and returns one report per task, ordered
/// by task index.
///
/// A failing task never affects the others.
pub async fn dispatch(
    ctx: &RunContext,
    tasks: Vec<Task>,
    options: &DispatchOptions,
) -> Vec<TaskReport> {
    let limit = options
        .max_concurrent_tasks
        .unwrap_or(tasks.len())
        .max(1);
    info!(tasks = tasks.len(), max_concurrent = limit, "dispatching tasks");

    let mut reports: Vec<TaskReport> = stream::iter(tasks)
        .map(|task| run_task(ctx, task))
        .buffer_unordered(limit)
        .collect()
        .await;
    reports.sort_by_key(|r| r.index);
    reports
}
