/// Data structures for TabMerger
use serde::{Deserialize, Serialize};

/// Information about a live browser tab, as reported by the tabs API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabInfo {
    pub id: i32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "favIconUrl", default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    pub index: i32,
}

impl TabInfo {
    pub fn new(id: i32, url: String, title: String, index: i32) -> TabInfo {
        TabInfo {
            id,
            url,
            title,
            fav_icon_url: None,
            index,
        }
    }

    /// Strip the tab down to what a group displays
    pub fn to_saved(&self) -> SavedTab {
        SavedTab {
            title: self.title.clone(),
            url: self.url.clone(),
            fav_icon_url: self.fav_icon_url.clone(),
        }
    }
}

/// A tab stored inside a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedTab {
    pub title: String,
    pub url: String,
    #[serde(rename = "favIconUrl", default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
}

/// A named, colored group of saved tabs.
///
/// The id is the key the group is stored under, so it is not part of the
/// serialized body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabGroup {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub color: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub tabs: Vec<SavedTab>,
}

impl TabGroup {
    pub fn new(id: String, title: String, color: String, created: String) -> TabGroup {
        TabGroup {
            id,
            title,
            color,
            created,
            tabs: Vec::new(),
        }
    }
}

/// Handoff between the merge runner and the extension page.
///
/// Written to local storage after every merge and consumed once by the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingMerge {
    pub into_group: String,
    pub merged_tabs: Vec<SavedTab>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_info_creation() {
        let tab = TabInfo::new(1, "https://google.com".to_string(), "Google".to_string(), 0);

        assert_eq!(tab.id, 1);
        assert_eq!(tab.url, "https://google.com");
        assert_eq!(tab.title, "Google");
        assert_eq!(tab.fav_icon_url, None);
        assert_eq!(tab.index, 0);
    }

    #[test]
    fn test_tab_info_from_browser_json() {
        // The tabs API omits url/title for tabs without host permission
        let json = r#"{"id": 7, "index": 3, "favIconUrl": "https://a.com/f.ico", "pinned": true}"#;
        let tab: TabInfo = serde_json::from_str(json).unwrap();

        assert_eq!(tab.id, 7);
        assert_eq!(tab.index, 3);
        assert_eq!(tab.url, "");
        assert_eq!(tab.fav_icon_url.as_deref(), Some("https://a.com/f.ico"));
    }

    #[test]
    fn test_to_saved_keeps_display_fields() {
        let mut tab = TabInfo::new(4, "https://a.com".to_string(), "A".to_string(), 2);
        tab.fav_icon_url = Some("icon.png".to_string());

        let saved = tab.to_saved();

        assert_eq!(saved.url, "https://a.com");
        assert_eq!(saved.title, "A");
        assert_eq!(saved.fav_icon_url.as_deref(), Some("icon.png"));
    }

    #[test]
    fn test_group_id_not_serialized() {
        let group = TabGroup::new(
            "group-3".to_string(),
            "Reading".to_string(),
            "#ff0000".to_string(),
            "Mon Oct 19 2026".to_string(),
        );

        let value = serde_json::to_value(&group).unwrap();

        assert!(value.get("id").is_none());
        assert_eq!(value["title"], "Reading");
        assert_eq!(value["tabs"], serde_json::json!([]));
    }

    #[test]
    fn test_pending_merge_field_names() {
        let pending = PendingMerge {
            into_group: "group-0".to_string(),
            merged_tabs: vec![SavedTab {
                title: "Google".to_string(),
                url: "https://google.com".to_string(),
                fav_icon_url: None,
            }],
        };

        let value = serde_json::to_value(&pending).unwrap();

        assert_eq!(value["into_group"], "group-0");
        assert_eq!(value["merged_tabs"][0]["url"], "https://google.com");
    }
}
