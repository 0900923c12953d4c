/// The browser capabilities the background worker and the extension page need.
///
/// `chrome::ChromeHost` implements these over the JS bridge; tests use an
/// in-memory host.
use crate::error::HostError;
use crate::tab_data::TabInfo;

#[allow(async_fn_in_trait)]
pub trait TabHost {
    /// Every tab in the current window
    async fn query_window_tabs(&self) -> Result<Vec<TabInfo>, HostError>;

    /// Id of the first tab in the current window with exactly this title
    async fn find_tab_by_title(&self, title: &str) -> Result<Option<i32>, HostError>;

    /// Make a tab active and highlighted
    async fn focus_tab(&self, tab_id: i32) -> Result<(), HostError>;

    /// Open `url` in a new tab and return its id
    async fn create_tab(&self, url: &str, active: bool) -> Result<i32, HostError>;

    /// Resolves once the tab reports status "complete"
    async fn wait_until_loaded(&self, tab_id: i32) -> Result<(), HostError>;

    async fn close_tab(&self, tab_id: i32) -> Result<(), HostError>;

    async fn sleep(&self, ms: u32);
}

/// Key-value storage. Groups and settings live in the synchronized area,
/// the pending merge in the local one.
#[allow(async_fn_in_trait)]
pub trait ExtensionStorage {
    async fn get_sync(&self, key: &str) -> Result<Option<serde_json::Value>, HostError>;

    async fn set_sync(&self, key: &str, value: serde_json::Value) -> Result<(), HostError>;

    async fn get_local(&self, key: &str) -> Result<Option<serde_json::Value>, HostError>;

    async fn set_local(&self, key: &str, value: serde_json::Value) -> Result<(), HostError>;

    async fn remove_local(&self, keys: &[&str]) -> Result<(), HostError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};

    /// In-memory browser: one window of tabs plus both storage areas
    #[derive(Default)]
    pub struct FakeHost {
        pub tabs: RefCell<Vec<TabInfo>>,
        pub sync: RefCell<HashMap<String, serde_json::Value>>,
        pub local: RefCell<HashMap<String, serde_json::Value>>,
        pub focused: RefCell<Vec<i32>>,
        pub created: RefCell<Vec<String>>,
        pub close_calls: RefCell<Vec<i32>>,
        pub failing_closes: HashSet<i32>,
        /// Newly created tabs never report loaded
        pub stall_loading: bool,
        pub fail_local_writes: bool,
    }

    impl FakeHost {
        pub fn with_tabs(tabs: Vec<TabInfo>) -> Self {
            FakeHost {
                tabs: RefCell::new(tabs),
                ..FakeHost::default()
            }
        }

        pub fn open_tab_ids(&self) -> Vec<i32> {
            self.tabs.borrow().iter().map(|t| t.id).collect()
        }
    }

    impl TabHost for FakeHost {
        async fn query_window_tabs(&self) -> Result<Vec<TabInfo>, HostError> {
            Ok(self.tabs.borrow().clone())
        }

        async fn find_tab_by_title(&self, title: &str) -> Result<Option<i32>, HostError> {
            Ok(self.tabs.borrow().iter().find(|t| t.title == title).map(|t| t.id))
        }

        async fn focus_tab(&self, tab_id: i32) -> Result<(), HostError> {
            self.focused.borrow_mut().push(tab_id);
            Ok(())
        }

        async fn create_tab(&self, url: &str, _active: bool) -> Result<i32, HostError> {
            let mut tabs = self.tabs.borrow_mut();
            let id = tabs.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            let index = tabs.len() as i32;
            tabs.push(TabInfo::new(id, url.to_string(), crate::operations::UI_TITLE.to_string(), index));
            self.created.borrow_mut().push(url.to_string());
            Ok(id)
        }

        async fn wait_until_loaded(&self, _tab_id: i32) -> Result<(), HostError> {
            if self.stall_loading {
                futures::future::pending::<()>().await;
            }
            Ok(())
        }

        async fn close_tab(&self, tab_id: i32) -> Result<(), HostError> {
            self.close_calls.borrow_mut().push(tab_id);
            if self.failing_closes.contains(&tab_id) {
                return Err(HostError::Browser(format!("No tab with id: {}", tab_id)));
            }
            self.tabs.borrow_mut().retain(|t| t.id != tab_id);
            Ok(())
        }

        async fn sleep(&self, _ms: u32) {}
    }

    impl ExtensionStorage for FakeHost {
        async fn get_sync(&self, key: &str) -> Result<Option<serde_json::Value>, HostError> {
            Ok(self.sync.borrow().get(key).cloned())
        }

        async fn set_sync(&self, key: &str, value: serde_json::Value) -> Result<(), HostError> {
            self.sync.borrow_mut().insert(key.to_string(), value);
            Ok(())
        }

        async fn get_local(&self, key: &str) -> Result<Option<serde_json::Value>, HostError> {
            Ok(self.local.borrow().get(key).cloned())
        }

        async fn set_local(&self, key: &str, value: serde_json::Value) -> Result<(), HostError> {
            if self.fail_local_writes {
                return Err(HostError::Browser("QUOTA_BYTES quota exceeded".to_string()));
            }
            self.local.borrow_mut().insert(key.to_string(), value);
            Ok(())
        }

        async fn remove_local(&self, keys: &[&str]) -> Result<(), HostError> {
            let mut local = self.local.borrow_mut();
            for key in keys {
                local.remove(*key);
            }
            Ok(())
        }
    }
}
