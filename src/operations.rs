/// Tab operations: directional selection, blacklist, deduplication

use crate::error::MergeError;
use crate::storage::GroupStore;
use crate::tab_data::{SavedTab, TabInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Title of the extension page; that tab is never merged
pub const UI_TITLE: &str = "TabMerger";

/// Titles of pages that are closed rather than merged
pub const RESERVED_TITLES: [&str; 4] = [UI_TITLE, "New Tab", "Extensions", "Add-ons Manager"];

/// Which tabs relative to the origin tab a merge takes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MergeDirection {
    #[default]
    All,
    Left,
    Right,
    Excluding,
    Only,
}

impl MergeDirection {
    pub fn name(self) -> &'static str {
        match self {
            MergeDirection::All => "all",
            MergeDirection::Left => "left",
            MergeDirection::Right => "right",
            MergeDirection::Excluding => "excluding",
            MergeDirection::Only => "only",
        }
    }

    fn needs_origin(self) -> bool {
        !matches!(self, MergeDirection::All)
    }

    fn selects(self, index: i32, origin_index: i32) -> bool {
        match self {
            MergeDirection::All => true,
            MergeDirection::Left => index < origin_index,
            MergeDirection::Right => index > origin_index,
            MergeDirection::Excluding => index != origin_index,
            MergeDirection::Only => index == origin_index,
        }
    }
}

/// Outcome of filtering a window's tabs for a merge
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergeSet {
    pub tabs_to_keep: Vec<SavedTab>,
    /// Ids of the open tabs behind `tabs_to_keep`, same order
    pub kept_tab_ids: Vec<i32>,
    pub tab_ids_to_close: Vec<i32>,
}

/// Keep the tabs a merge in `direction` from `origin_index` selects
pub fn filter_by_direction(
    tabs: &[TabInfo],
    direction: MergeDirection,
    origin_index: i32,
) -> Vec<TabInfo> {
    tabs.iter()
        .filter(|tab| direction.selects(tab.index, origin_index))
        .cloned()
        .collect()
}

/// Whether a url contains any of the (lowercased) blacklist fragments
pub fn is_blacklisted(url: &str, blacklist: &[String]) -> bool {
    let url = url.to_lowercase();
    blacklist.iter().any(|site| url.contains(site.as_str()))
}

/// Split tabs into those not yet stored anywhere and the ids of tabs that
/// already are (or that are reserved system pages). A tab counts as stored
/// when its title or url matches the title or url of any stored tab.
pub fn split_stored_duplicates(tabs: &[TabInfo], groups: &GroupStore) -> (Vec<TabInfo>, Vec<i32>) {
    let mut filter_vals: HashSet<&str> = groups.stored_urls().chain(groups.stored_titles()).collect();
    for title in RESERVED_TITLES {
        filter_vals.insert(title);
    }

    let (duplicates, fresh): (Vec<&TabInfo>, Vec<&TabInfo>) = tabs.iter().partition(|tab| {
        filter_vals.contains(tab.title.as_str()) || filter_vals.contains(tab.url.as_str())
    });

    (
        fresh.into_iter().cloned().collect(),
        duplicates.into_iter().map(|tab| tab.id).collect(),
    )
}

/// Make tabs unique by URL (keep first occurrence)
pub fn make_tabs_unique(tabs: &[TabInfo]) -> (Vec<TabInfo>, Vec<i32>) {
    let mut seen_urls = HashSet::new();
    let mut keep_tabs = Vec::new();
    let mut remove_ids = Vec::new();

    for tab in tabs {
        if seen_urls.contains(&tab.url) {
            remove_ids.push(tab.id);
        } else {
            seen_urls.insert(tab.url.clone());
            keep_tabs.push(tab.clone());
        }
    }

    (keep_tabs, remove_ids)
}

/// Pick the tabs a merge moves into a group and the duplicate tabs it closes.
///
/// Stages, each on the survivors of the previous one:
/// 1. drop the extension page itself
/// 2. directional selection around `origin_index`
/// 3. drop blacklisted urls
/// 4. close tabs whose title or url is already stored in a group, or that
///    show a reserved page
/// 5. close later tabs repeating an earlier url
///
/// Directional merges need `origin_index` to name a tab in `candidate_tabs`.
pub fn compute_merge_set(
    candidate_tabs: &[TabInfo],
    direction: MergeDirection,
    origin_index: i32,
    blacklist: &[String],
    existing_groups: &GroupStore,
) -> Result<MergeSet, MergeError> {
    if direction.needs_origin() && !candidate_tabs.iter().any(|t| t.index == origin_index) {
        return Err(MergeError::OriginNotFound(origin_index));
    }

    let mut tabs: Vec<TabInfo> = candidate_tabs
        .iter()
        .filter(|tab| tab.title != UI_TITLE)
        .cloned()
        .collect();
    tabs.sort_by_key(|tab| tab.index);

    let selected = filter_by_direction(&tabs, direction, origin_index);

    let allowed: Vec<TabInfo> = selected
        .into_iter()
        .filter(|tab| !is_blacklisted(&tab.url, blacklist))
        .collect();

    let (fresh, mut tab_ids_to_close) = split_stored_duplicates(&allowed, existing_groups);
    let (unique, repeated) = make_tabs_unique(&fresh);
    tab_ids_to_close.extend(repeated);

    log::debug!(
        "Merge {:?}: {} selected, {} kept, {} to close",
        direction,
        allowed.len(),
        unique.len(),
        tab_ids_to_close.len()
    );

    Ok(MergeSet {
        tabs_to_keep: unique.iter().map(TabInfo::to_saved).collect(),
        kept_tab_ids: unique.iter().map(|tab| tab.id).collect(),
        tab_ids_to_close,
    })
}
