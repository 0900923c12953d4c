/// Group storage for chrome.storage.sync

use crate::tab_data::{PendingMerge, SavedTab, TabGroup};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Keys in synchronized storage
pub const SETTINGS_KEY: &str = "settings";
pub const GROUPS_KEY: &str = "groups";

/// Keys in local storage holding the pending merge
pub const INTO_GROUP_KEY: &str = "into_group";
pub const MERGED_TABS_KEY: &str = "merged_tabs";

pub const DEFAULT_GROUP_ID: &str = "group-0";

/// All groups, in display order.
///
/// Serialized as a JSON object keyed by group id; key order is display order.
/// Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStore {
    groups: Vec<TabGroup>,
}

impl GroupStore {
    /// A store holding one empty default group
    pub fn new(title: &str, color: &str, created: &str) -> Self {
        GroupStore {
            groups: vec![TabGroup::new(
                DEFAULT_GROUP_ID.to_string(),
                title.to_string(),
                color.to_string(),
                created.to_string(),
            )],
        }
    }

    /// Load groups from a stored value; missing, malformed or empty records
    /// give a single default group
    pub fn from_stored(
        value: Option<serde_json::Value>,
        title: &str,
        color: &str,
        created: &str,
    ) -> Self {
        let parsed = match value {
            Some(value) if !value.is_null() => match serde_json::from_value::<GroupStore>(value) {
                Ok(store) => Some(store),
                Err(e) => {
                    log::warn!("Ignoring malformed groups: {}", e);
                    None
                }
            },
            _ => None,
        };

        parsed
            .filter(|store| !store.groups.is_empty())
            .unwrap_or_else(|| GroupStore::new(title, color, created))
    }

    pub fn groups(&self) -> &[TabGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get_group(&self, group_id: &str) -> Option<&TabGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    fn get_group_mut(&mut self, group_id: &str) -> Option<&mut TabGroup> {
        self.groups.iter_mut().find(|g| g.id == group_id)
    }

    fn position(&self, group_id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.id == group_id)
    }

    /// Id a merge lands in when the request names no group
    pub fn default_target(&self) -> &str {
        self.groups
            .first()
            .map(|g| g.id.as_str())
            .unwrap_or(DEFAULT_GROUP_ID)
    }

    pub fn total_tabs(&self) -> usize {
        self.groups.iter().map(|g| g.tabs.len()).sum()
    }

    /// Every url stored in any group
    pub fn stored_urls(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.tabs.iter().map(|t| t.url.as_str()))
    }

    pub fn stored_titles(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.tabs.iter().map(|t| t.title.as_str()))
    }

    /// Append a new empty group and return its id
    pub fn add_group(&mut self, title: &str, color: &str, created: &str) -> String {
        let id = (self.groups.len()..)
            .map(|n| format!("group-{}", n))
            .find(|id| self.get_group(id).is_none())
            .unwrap_or_else(|| format!("group-{}", self.groups.len()));

        self.groups.push(TabGroup::new(
            id.clone(),
            title.to_string(),
            color.to_string(),
            created.to_string(),
        ));
        id
    }

    /// Remove a group. The last remaining group is emptied instead.
    pub fn remove_group(&mut self, group_id: &str) -> bool {
        let Some(pos) = self.position(group_id) else {
            return false;
        };

        if self.groups.len() == 1 {
            self.groups[0].tabs.clear();
        } else {
            self.groups.remove(pos);
        }
        true
    }

    pub fn rename_group(&mut self, group_id: &str, new_title: String) -> bool {
        self.get_group_mut(group_id)
            .map(|group| {
                group.title = new_title;
            })
            .is_some()
    }

    pub fn recolor_group(&mut self, group_id: &str, new_color: String) -> bool {
        self.get_group_mut(group_id)
            .map(|group| {
                group.color = new_color;
            })
            .is_some()
    }

    /// Remove the tab at `tab_pos` from a group, returning it
    pub fn remove_tab(&mut self, group_id: &str, tab_pos: usize) -> Option<SavedTab> {
        let group = self.get_group_mut(group_id)?;
        (tab_pos < group.tabs.len()).then(|| group.tabs.remove(tab_pos))
    }

    /// Drag a tab to a position in the same or another group.
    ///
    /// `to_pos` is clamped to the end of the destination group.
    pub fn move_tab(
        &mut self,
        from_group: &str,
        tab_pos: usize,
        to_group: &str,
        to_pos: usize,
    ) -> bool {
        if self.get_group(to_group).is_none() {
            return false;
        }
        let Some(tab) = self.remove_tab(from_group, tab_pos) else {
            return false;
        };

        match self.get_group_mut(to_group) {
            Some(group) => {
                let pos = to_pos.min(group.tabs.len());
                group.tabs.insert(pos, tab);
                true
            }
            None => false,
        }
    }

    /// Move a group to a new display position, clamped to the end
    pub fn move_group(&mut self, group_id: &str, to_pos: usize) -> bool {
        let Some(from) = self.position(group_id) else {
            return false;
        };
        let group = self.groups.remove(from);
        let pos = to_pos.min(self.groups.len());
        self.groups.insert(pos, group);
        true
    }

    /// Append the tabs of a pending merge to its target group, or to the
    /// first group if the target no longer exists. Returns the id used.
    pub fn apply_pending(&mut self, pending: PendingMerge) -> String {
        let target = if self.get_group(&pending.into_group).is_some() {
            pending.into_group
        } else {
            log::warn!(
                "Merge target {} not found, using {}",
                pending.into_group,
                self.default_target()
            );
            self.default_target().to_string()
        };

        if let Some(group) = self.get_group_mut(&target) {
            group.tabs.extend(pending.merged_tabs);
        }
        target
    }

    /// Drop every group and start over with one empty default group
    pub fn reset(&mut self, title: &str, color: &str, created: &str) {
        *self = GroupStore::new(title, color, created);
    }

    /// Urls of every stored tab in display order, then reset the store.
    pub fn take_all_urls(&mut self, title: &str, color: &str, created: &str) -> Vec<String> {
        let urls = self.stored_urls().map(str::to_string).collect();
        self.reset(title, color, created);
        urls
    }
}

impl Serialize for GroupStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.groups.iter().map(|g| (&g.id, g)))
    }
}

struct GroupStoreVisitor;

impl<'de> Visitor<'de> for GroupStoreVisitor {
    type Value = GroupStore;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of group id to group")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<GroupStore, A::Error> {
        let mut groups = Vec::new();
        while let Some((id, mut group)) = map.next_entry::<String, TabGroup>()? {
            group.id = id;
            groups.push(group);
        }
        Ok(GroupStore { groups })
    }
}

impl<'de> Deserialize<'de> for GroupStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(GroupStoreVisitor)
    }
}
