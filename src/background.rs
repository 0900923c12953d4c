/// Background worker: runs merges and the other trigger actions against the
/// browser host

use crate::dispatch::{Action, MergeRequest};
use crate::error::{HostError, MergeError};
use crate::host::{ExtensionStorage, TabHost};
use crate::operations::{compute_merge_set, UI_TITLE};
use crate::settings::Settings;
use crate::storage::{GroupStore, GROUPS_KEY, INTO_GROUP_KEY, MERGED_TABS_KEY, SETTINGS_KEY};
use crate::tab_data::PendingMerge;
use futures::future::{self, Either};
use futures::pin_mut;

/// Extension page url, relative to the extension root
pub const PAGE_URL: &str = "index.html";

/// How long to wait for a newly opened extension page to finish loading
pub const PAGE_LOAD_TIMEOUT_MS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub pending: PendingMerge,
    /// Duplicates and reserved pages that were closed
    pub closed: Vec<i32>,
    /// Originals of the merged tabs that were closed
    pub moved: Vec<i32>,
    pub failed_to_close: Vec<i32>,
}

pub async fn load_settings<H: ExtensionStorage>(host: &H) -> Settings {
    match host.get_sync(SETTINGS_KEY).await {
        Ok(value) => Settings::from_stored(value),
        Err(e) => {
            log::warn!("Failed to read settings, using defaults: {}", e);
            Settings::default()
        }
    }
}

pub async fn load_groups<H: ExtensionStorage>(host: &H, settings: &Settings, created: &str) -> GroupStore {
    let value = host.get_sync(GROUPS_KEY).await.unwrap_or_else(|e| {
        log::warn!("Failed to read groups, using defaults: {}", e);
        None
    });
    GroupStore::from_stored(value, &settings.title, &settings.color, created)
}

/// Write default settings and a single empty group unless valid ones exist
pub async fn initialize_storage<H: ExtensionStorage>(host: &H, created: &str) -> Result<(), HostError> {
    let settings = load_settings(host).await;
    let groups = load_groups(host, &settings, created).await;

    host.set_sync(SETTINGS_KEY, to_json(&settings)?).await?;
    host.set_sync(GROUPS_KEY, to_json(&groups)?).await?;
    log::info!("Storage ready with {} group(s)", groups.len());
    Ok(())
}

/// Focus the extension page, opening it if needed.
///
/// A newly created page must report loaded within `timeout_ms`.
pub async fn ensure_page_tab<H: TabHost>(host: &H, timeout_ms: u32) -> Result<i32, HostError> {
    if let Some(tab_id) = host.find_tab_by_title(UI_TITLE).await? {
        host.focus_tab(tab_id).await?;
        return Ok(tab_id);
    }

    let tab_id = host.create_tab(PAGE_URL, true).await?;
    let loaded = host.wait_until_loaded(tab_id);
    let timeout = host.sleep(timeout_ms);
    pin_mut!(loaded, timeout);

    match future::select(loaded, timeout).await {
        Either::Left((result, _)) => result.map(|_| tab_id),
        Either::Right(_) => Err(HostError::Timeout { tab_id, timeout_ms }),
    }
}

/// Close every tab independently; failures are logged and returned
async fn close_tabs<H: TabHost>(host: &H, tab_ids: &[i32]) -> (Vec<i32>, Vec<i32>) {
    let results = future::join_all(tab_ids.iter().map(|&id| async move {
        (id, host.close_tab(id).await)
    }))
    .await;

    let mut closed = Vec::new();
    let mut failed = Vec::new();
    for (id, result) in results {
        match result {
            Ok(()) => closed.push(id),
            Err(e) => {
                log::warn!("Failed to close tab {}: {}", id, e);
                failed.push(id);
            }
        }
    }
    (closed, failed)
}

async fn write_pending<H: ExtensionStorage>(host: &H, pending: &PendingMerge) -> Result<(), HostError> {
    host.set_local(INTO_GROUP_KEY, serde_json::Value::String(pending.into_group.clone()))
        .await?;
    host.set_local(MERGED_TABS_KEY, to_json(&pending.merged_tabs)?).await
}

/// Run one merge: bring up the page, filter the window's tabs, close the
/// duplicates and hand the rest to the page through local storage.
///
/// The merged tabs themselves are closed only after the pending merge is
/// written; if the write fails they stay open.
pub async fn merge_tabs<H>(
    host: &H,
    request: &MergeRequest,
    created: &str,
    timeout_ms: u32,
) -> Result<MergeOutcome, MergeError>
where
    H: TabHost + ExtensionStorage,
{
    ensure_page_tab(host, timeout_ms).await?;

    let tabs = host.query_window_tabs().await?;
    let settings = load_settings(host).await;
    let groups = load_groups(host, &settings, created).await;

    let merge_set = compute_merge_set(
        &tabs,
        request.direction,
        request.origin_index,
        &settings.blacklist_entries(),
        &groups,
    )?;

    let pending = PendingMerge {
        into_group: request
            .target_group_id
            .clone()
            .unwrap_or_else(|| groups.default_target().to_string()),
        merged_tabs: merge_set.tabs_to_keep,
    };

    let ((closed, mut failed_to_close), written) = futures::join!(
        close_tabs(host, &merge_set.tab_ids_to_close),
        write_pending(host, &pending)
    );
    written?;

    let (moved, failed_to_move) = close_tabs(host, &merge_set.kept_tab_ids).await;
    failed_to_close.extend(failed_to_move);

    log::info!(
        "Merged {} tab(s) into {}, closed {} duplicate(s)",
        pending.merged_tabs.len(),
        pending.into_group,
        closed.len()
    );

    Ok(MergeOutcome {
        pending,
        closed,
        moved,
        failed_to_close,
    })
}

/// Carry out a dispatched action
pub async fn run_action<H>(host: &H, action: Action, created: &str) -> Result<(), MergeError>
where
    H: TabHost + ExtensionStorage,
{
    match action {
        Action::OpenPage => {
            ensure_page_tab(host, PAGE_LOAD_TIMEOUT_MS).await?;
        }
        Action::Merge(request) => {
            merge_tabs(host, &request, created, PAGE_LOAD_TIMEOUT_MS).await?;
        }
        Action::ExcludeSite(url) => {
            let mut settings = load_settings(host).await;
            settings.exclude_site(&url);
            host.set_sync(SETTINGS_KEY, to_json(&settings)?).await?;
            log::info!("Excluded {} from merges", url);
        }
        Action::OpenUrl(url) => {
            host.create_tab(url, true).await?;
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, HostError> {
    serde_json::to_value(value).map_err(|e| HostError::Conversion(e.to_string()))
}
