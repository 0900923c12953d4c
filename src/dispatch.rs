/// Turns toolbar clicks, context menu items, keyboard commands and page
/// messages into actions for the background worker

use crate::error::MergeError;
use crate::operations::MergeDirection;
use crate::settings::{OpenBehavior, Settings};
use serde::{Deserialize, Serialize};

pub const INSTRUCTIONS_URL: &str = "https://tabmerger.herokuapp.com/instructions";
pub const CONTACT_URL: &str = "https://tabmerger.herokuapp.com/contact";
pub const UNINSTALL_URL: &str = "https://tabmerger.herokuapp.com/survey";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    Normal,
    Separator,
}

/// A context menu entry. `title_key` is looked up in the extension's locales.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MenuItem {
    pub id: &'static str,
    pub title_key: &'static str,
    #[serde(rename = "type")]
    pub kind: MenuItemKind,
}

const fn item(id: &'static str, title_key: &'static str) -> MenuItem {
    MenuItem { id, title_key, kind: MenuItemKind::Normal }
}

const fn separator(id: &'static str) -> MenuItem {
    MenuItem { id, title_key: "separator", kind: MenuItemKind::Separator }
}

pub const CONTEXT_MENU: [MenuItem; 12] = [
    item("aopen-tabmerger", "bgOpen"),
    separator("first-separator"),
    item("merge-all-menu", "bgAll"),
    item("merge-left-menu", "bgLeft"),
    item("merge-right-menu", "bgRight"),
    item("merge-xcluding-menu", "bgExclude"),
    item("merge-snly-menu", "bgOnly"),
    separator("second-separator"),
    item("remove-visibility", "bgSiteExclude"),
    separator("third-separator"),
    item("zdl-instructions", "bgInstructions"),
    item("dl-contact", "bgContact"),
];

/// The tab an event happened on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OriginTab {
    #[serde(default)]
    pub url: String,
    pub index: i32,
}

/// Message sent by the extension page's merge buttons
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageMessage {
    pub msg: MergeDirection,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    ToolbarClick { tab: Option<OriginTab> },
    ContextMenu { item_id: String, tab: Option<OriginTab> },
    Command { command: String, tab: Option<OriginTab> },
    Message { message: PageMessage, active_tab: Option<OriginTab> },
}

/// Everything needed to run one merge; built per trigger
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRequest {
    pub direction: MergeDirection,
    pub origin_index: i32,
    pub target_group_id: Option<String>,
}

impl MergeRequest {
    /// A merge from `origin`. Only `All` may go without an origin tab.
    pub fn new(direction: MergeDirection, origin: Option<&OriginTab>) -> Result<Self, MergeError> {
        let origin_index = match (origin, direction) {
            (Some(tab), _) => tab.index,
            (None, MergeDirection::All) => 0,
            (None, _) => return Err(MergeError::MissingOrigin(direction.name())),
        };
        Ok(MergeRequest {
            direction,
            origin_index,
            target_group_id: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    OpenPage,
    Merge(MergeRequest),
    ExcludeSite(String),
    OpenUrl(&'static str),
}

pub fn resolve(trigger: Trigger, settings: &Settings) -> Result<Action, MergeError> {
    match trigger {
        Trigger::ToolbarClick { tab } => match settings.open {
            OpenBehavior::Without => Ok(Action::OpenPage),
            OpenBehavior::With => Ok(Action::Merge(MergeRequest::new(MergeDirection::All, tab.as_ref())?)),
        },
        Trigger::ContextMenu { item_id, tab } => resolve_item(&item_id, tab),
        Trigger::Command { command, tab } => resolve_item(&command, tab),
        Trigger::Message { message, active_tab } => Ok(Action::Merge(MergeRequest {
            target_group_id: message.id,
            ..MergeRequest::new(message.msg, active_tab.as_ref())?
        })),
    }
}

/// Menu items and keyboard commands share ids
fn resolve_item(id: &str, tab: Option<OriginTab>) -> Result<Action, MergeError> {
    let direction = match id {
        "aopen-tabmerger" => return Ok(Action::OpenPage),
        "remove-visibility" => {
            let tab = tab.ok_or(MergeError::MissingOrigin("excluding a site"))?;
            return Ok(Action::ExcludeSite(tab.url));
        }
        "zdl-instructions" => return Ok(Action::OpenUrl(INSTRUCTIONS_URL)),
        "dl-contact" => return Ok(Action::OpenUrl(CONTACT_URL)),
        "merge-left-menu" => MergeDirection::Left,
        "merge-right-menu" => MergeDirection::Right,
        "merge-xcluding-menu" => MergeDirection::Excluding,
        "merge-snly-menu" => MergeDirection::Only,
        "merge-all-menu" => MergeDirection::All,
        other => {
            log::debug!("Unrecognized trigger {}, merging all tabs", other);
            MergeDirection::All
        }
    };
    Ok(Action::Merge(MergeRequest::new(direction, tab.as_ref())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(index: i32) -> Option<OriginTab> {
        Some(OriginTab {
            url: "https://Example.com/page".to_string(),
            index,
        })
    }

    fn merge_of(action: Result<Action, MergeError>) -> MergeRequest {
        match action {
            Ok(Action::Merge(request)) => request,
            other => panic!("expected a merge, got {:?}", other),
        }
    }

    #[test]
    fn test_toolbar_click_follows_open_behavior() {
        let mut settings = Settings::default();
        assert_eq!(
            resolve(Trigger::ToolbarClick { tab: tab(3) }, &settings),
            Ok(Action::OpenPage)
        );

        settings.open = OpenBehavior::With;
        let request = merge_of(resolve(Trigger::ToolbarClick { tab: tab(3) }, &settings));
        assert_eq!(request.direction, MergeDirection::All);
        assert_eq!(request.origin_index, 3);
    }

    #[test]
    fn test_context_menu_directions() {
        let settings = Settings::default();
        let cases = [
            ("merge-all-menu", MergeDirection::All),
            ("merge-left-menu", MergeDirection::Left),
            ("merge-right-menu", MergeDirection::Right),
            ("merge-xcluding-menu", MergeDirection::Excluding),
            ("merge-snly-menu", MergeDirection::Only),
        ];

        for (id, direction) in cases {
            let trigger = Trigger::ContextMenu { item_id: id.to_string(), tab: tab(1) };
            let request = merge_of(resolve(trigger, &settings));
            assert_eq!(request.direction, direction, "menu item {}", id);
            assert_eq!(request.target_group_id, None);
        }
    }

    #[test]
    fn test_context_menu_other_actions() {
        let settings = Settings::default();
        let menu = |id: &str| resolve(Trigger::ContextMenu { item_id: id.to_string(), tab: tab(0) }, &settings);

        assert_eq!(menu("aopen-tabmerger"), Ok(Action::OpenPage));
        assert_eq!(menu("remove-visibility"), Ok(Action::ExcludeSite("https://Example.com/page".to_string())));
        assert_eq!(menu("zdl-instructions"), Ok(Action::OpenUrl(INSTRUCTIONS_URL)));
        assert_eq!(menu("dl-contact"), Ok(Action::OpenUrl(CONTACT_URL)));
    }

    #[test]
    fn test_directional_merge_without_origin_is_error() {
        let settings = Settings::default();

        for id in ["merge-left-menu", "merge-right-menu", "merge-xcluding-menu", "merge-snly-menu"] {
            let trigger = Trigger::ContextMenu { item_id: id.to_string(), tab: None };
            assert!(
                matches!(resolve(trigger, &settings), Err(MergeError::MissingOrigin(_))),
                "menu item {}",
                id
            );
        }

        let message = PageMessage { msg: MergeDirection::Left, id: None };
        let result = resolve(Trigger::Message { message, active_tab: None }, &settings);
        assert_eq!(result, Err(MergeError::MissingOrigin("left")));

        let trigger = Trigger::ContextMenu { item_id: "remove-visibility".to_string(), tab: None };
        assert!(resolve(trigger, &settings).is_err());
    }

    #[test]
    fn test_merge_all_without_origin() {
        let trigger = Trigger::ContextMenu { item_id: "merge-all-menu".to_string(), tab: None };

        let request = merge_of(resolve(trigger, &Settings::default()));

        assert_eq!(request.direction, MergeDirection::All);
    }

    #[test]
    fn test_origin_tab_needs_index() {
        assert!(serde_json::from_str::<OriginTab>(r#"{"url": "https://a.com"}"#).is_err());

        let tab: OriginTab = serde_json::from_str(r#"{"index": 4, "id": 17}"#).unwrap();
        assert_eq!(tab.index, 4);
        assert_eq!(tab.url, "");
    }

    #[test]
    fn test_unknown_command_merges_all() {
        let trigger = Trigger::Command { command: "merge-shortcut".to_string(), tab: tab(2) };

        let request = merge_of(resolve(trigger, &Settings::default()));

        assert_eq!(request.direction, MergeDirection::All);
    }

    #[test]
    fn test_page_message_targets_group() {
        let message: PageMessage = serde_json::from_str(r#"{"msg": "right", "id": "group-2"}"#).unwrap();
        let trigger = Trigger::Message { message, active_tab: tab(4) };

        let request = merge_of(resolve(trigger, &Settings::default()));

        assert_eq!(request.direction, MergeDirection::Right);
        assert_eq!(request.origin_index, 4);
        assert_eq!(request.target_group_id.as_deref(), Some("group-2"));
    }

    #[test]
    fn test_context_menu_layout() {
        let separators = CONTEXT_MENU.iter().filter(|i| i.kind == MenuItemKind::Separator).count();

        assert_eq!(separators, 3);
        assert_eq!(CONTEXT_MENU[0].id, "aopen-tabmerger");

        let value = serde_json::to_value(CONTEXT_MENU[1]).unwrap();
        assert_eq!(value["type"], "separator");
    }
}
