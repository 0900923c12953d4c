/// State behind the extension page.
///
/// The page renders from `PageState`; every edit goes through `apply_edit`,
/// and the returned `Persist` is written straight away.

use crate::background::{load_groups, load_settings};
use crate::error::HostError;
use crate::export::ExportBundle;
use crate::host::{ExtensionStorage, TabHost};
use crate::settings::{OpenBehavior, Settings};
use crate::storage::{GroupStore, GROUPS_KEY, INTO_GROUP_KEY, MERGED_TABS_KEY, SETTINGS_KEY};
use crate::tab_data::{PendingMerge, SavedTab};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// An edit made on the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageEdit {
    AddGroup,
    DeleteGroup { id: String },
    RenameGroup { id: String, title: String },
    RecolorGroup { id: String, color: String },
    RemoveTab { group: String, pos: usize },
    #[serde(rename_all = "camelCase")]
    MoveTab { from_group: String, tab_pos: usize, to_group: String, to_pos: usize },
    #[serde(rename_all = "camelCase")]
    MoveGroup { id: String, to_pos: usize },
    OpenAll,
    DeleteAll,
    ToggleTheme,
    SetOpenBehavior { open: OpenBehavior },
    SetDefaults { title: String, color: String },
    ExcludeSite { url: String },
}

/// What has to be written (and opened) after an edit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Persist {
    pub groups: Option<GroupStore>,
    pub settings: Option<Settings>,
    pub open_urls: Vec<String>,
}

impl Persist {
    pub fn is_empty(&self) -> bool {
        self.groups.is_none() && self.settings.is_none() && self.open_urls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub groups: GroupStore,
    pub settings: Settings,
}

impl PageState {
    pub async fn load<H: ExtensionStorage>(host: &H, created: &str) -> PageState {
        let settings = load_settings(host).await;
        let groups = load_groups(host, &settings, created).await;
        PageState { groups, settings }
    }

    fn groups_changed(&self) -> Persist {
        Persist {
            groups: Some(self.groups.clone()),
            ..Persist::default()
        }
    }

    fn settings_changed(&self) -> Persist {
        Persist {
            settings: Some(self.settings.clone()),
            ..Persist::default()
        }
    }

    /// Apply an edit. Edits that change nothing return an empty `Persist`.
    pub fn apply_edit(&mut self, edit: PageEdit, created: &str) -> Persist {
        let title = self.settings.title.clone();
        let color = self.settings.color.clone();

        let changed = match edit {
            PageEdit::AddGroup => {
                self.groups.add_group(&title, &color, created);
                true
            }
            PageEdit::DeleteGroup { id } => self.groups.remove_group(&id),
            PageEdit::RenameGroup { id, title } => self.groups.rename_group(&id, title),
            PageEdit::RecolorGroup { id, color } => self.groups.recolor_group(&id, color),
            PageEdit::RemoveTab { group, pos } => self.groups.remove_tab(&group, pos).is_some(),
            PageEdit::MoveTab { from_group, tab_pos, to_group, to_pos } => {
                self.groups.move_tab(&from_group, tab_pos, &to_group, to_pos)
            }
            PageEdit::MoveGroup { id, to_pos } => self.groups.move_group(&id, to_pos),
            PageEdit::OpenAll => {
                let open_urls = self.groups.take_all_urls(&title, &color, created);
                return Persist {
                    open_urls,
                    ..self.groups_changed()
                };
            }
            PageEdit::DeleteAll => {
                self.groups.reset(&title, &color, created);
                true
            }
            PageEdit::ToggleTheme => {
                self.settings.toggle_theme();
                return self.settings_changed();
            }
            PageEdit::SetOpenBehavior { open } => {
                self.settings.open = open;
                return self.settings_changed();
            }
            PageEdit::SetDefaults { title, color } => {
                self.settings.title = title;
                self.settings.color = color;
                return self.settings_changed();
            }
            PageEdit::ExcludeSite { url } => {
                self.settings.exclude_site(&url);
                return self.settings_changed();
            }
        };

        if changed {
            self.groups_changed()
        } else {
            log::debug!("Edit had no effect");
            Persist::default()
        }
    }

    /// Replace groups and settings with an imported file
    pub fn import(&mut self, bundle: ExportBundle) -> Persist {
        self.groups = bundle.groups;
        self.settings = bundle.settings;
        Persist {
            groups: Some(self.groups.clone()),
            settings: Some(self.settings.clone()),
            open_urls: Vec::new(),
        }
    }

    /// Add the tabs of a pending merge; returns the group they went to
    pub fn apply_pending(&mut self, pending: PendingMerge) -> String {
        let count = pending.merged_tabs.len();
        let target = self.groups.apply_pending(pending);
        log::info!("Added {} merged tab(s) to {}", count, target);
        target
    }
}

/// Pull in a merge that is waiting in local storage. The record is removed
/// once applied so a reload does not add the tabs twice.
///
/// `state` is only borrowed between awaits, so the page can keep editing
/// while storage calls are in flight.
pub async fn consume_pending<H: ExtensionStorage>(
    state: &RefCell<PageState>,
    host: &H,
) -> Result<Option<String>, HostError> {
    let Some(pending) = read_pending(host).await? else {
        return Ok(None);
    };

    let (target, groups) = {
        let mut state = state.borrow_mut();
        let target = state.apply_pending(pending);
        (target, to_json(&state.groups)?)
    };
    host.set_sync(GROUPS_KEY, groups).await?;
    host.remove_local(&[INTO_GROUP_KEY, MERGED_TABS_KEY]).await?;

    Ok(Some(target))
}

async fn read_pending<H: ExtensionStorage>(host: &H) -> Result<Option<PendingMerge>, HostError> {
    let Some(tabs) = host.get_local(MERGED_TABS_KEY).await? else {
        return Ok(None);
    };
    let merged_tabs: Vec<SavedTab> = match serde_json::from_value(tabs) {
        Ok(tabs) => tabs,
        Err(e) => {
            log::warn!("Dropping malformed pending merge: {}", e);
            host.remove_local(&[INTO_GROUP_KEY, MERGED_TABS_KEY]).await?;
            return Ok(None);
        }
    };

    let into_group = host
        .get_local(INTO_GROUP_KEY)
        .await?
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    Ok(Some(PendingMerge {
        into_group,
        merged_tabs,
    }))
}

/// Write what an edit changed and open any tabs it released
pub async fn persist<H>(host: &H, persist: Persist) -> Result<(), HostError>
where
    H: TabHost + ExtensionStorage,
{
    if let Some(groups) = &persist.groups {
        host.set_sync(GROUPS_KEY, to_json(groups)?).await?;
    }
    if let Some(settings) = &persist.settings {
        host.set_sync(SETTINGS_KEY, to_json(settings)?).await?;
    }
    for url in &persist.open_urls {
        if let Err(e) = host.create_tab(url, false).await {
            log::warn!("Failed to reopen {}: {}", url, e);
        }
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, HostError> {
    serde_json::to_value(value).map_err(|e| HostError::Conversion(e.to_string()))
}
