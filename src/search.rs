/// Search boxes on the extension page: filter groups by title and tabs by title
use crate::storage::GroupStore;
use serde::Serialize;

/// What the page should show for the current search text
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct SearchView {
    /// Ids of groups to show, in display order
    pub groups: Vec<String>,
    /// For each shown group, positions of tabs to show
    pub tabs: Vec<Vec<usize>>,
}

fn matches(text: &str, query: &str) -> bool {
    text.to_lowercase().contains(query)
}

/// Filter by group title and by tab title. Empty queries match everything.
pub fn search(store: &GroupStore, group_query: &str, tab_query: &str) -> SearchView {
    let group_query = group_query.trim().to_lowercase();
    let tab_query = tab_query.trim().to_lowercase();

    let mut view = SearchView::default();
    for group in store.groups() {
        if !matches(&group.title, &group_query) {
            continue;
        }

        let visible_tabs = group
            .tabs
            .iter()
            .enumerate()
            .filter(|(_, tab)| matches(&tab.title, &tab_query))
            .map(|(pos, _)| pos)
            .collect();

        view.groups.push(group.id.clone());
        view.tabs.push(visible_tabs);
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab_data::{PendingMerge, SavedTab};

    fn tab(title: &str) -> SavedTab {
        SavedTab {
            title: title.to_string(),
            url: format!("https://{}.com", title.to_lowercase().replace(' ', "")),
            fav_icon_url: None,
        }
    }

    fn store() -> GroupStore {
        let mut store = GroupStore::new("Reading List", "#000000", "now");
        let work = store.add_group("Work", "#ff0000", "now");
        store.apply_pending(PendingMerge {
            into_group: "group-0".to_string(),
            merged_tabs: vec![tab("Rust Book"), tab("News")],
        });
        store.apply_pending(PendingMerge {
            into_group: work,
            merged_tabs: vec![tab("Jira"), tab("rust-lang PR")],
        });
        store
    }

    #[test]
    fn test_empty_queries_show_everything() {
        let view = search(&store(), "", "  ");

        assert_eq!(view.groups, vec!["group-0", "group-1"]);
        assert_eq!(view.tabs, vec![vec![0, 1], vec![0, 1]]);
    }

    #[test]
    fn test_group_filter_case_insensitive() {
        let view = search(&store(), "WORK", "");

        assert_eq!(view.groups, vec!["group-1"]);
    }

    #[test]
    fn test_tab_filter() {
        let view = search(&store(), "", "rust");

        assert_eq!(view.tabs, vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_no_match() {
        let view = search(&store(), "personal", "");

        assert_eq!(view, SearchView::default());
    }
}
