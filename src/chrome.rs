/// Browser host backed by the extension APIs, through js/chrome_bridge.js

use crate::error::HostError;
use crate::host::{ExtensionStorage, TabHost};
use crate::tab_data::TabInfo;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/chrome_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getCurrentWindowTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn findTabByTitle(title: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn focusTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str, active: bool) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn waitUntilLoaded(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn delay(ms: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(area: &str, key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(area: &str, key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeStorage(area: &str, keys: JsValue) -> Result<(), JsValue>;
}

const SYNC: &str = "sync";
const LOCAL: &str = "local";

/// The real browser
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

fn browser_error(call: &str, e: JsValue) -> HostError {
    HostError::Browser(format!("{} failed: {:?}", call, e))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, HostError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| HostError::Conversion(e.to_string()))
}

fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, HostError> {
    // Plain objects, not Maps, so chrome.storage can persist them
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| HostError::Conversion(e.to_string()))
}

async fn get_value(area: &str, key: &str) -> Result<Option<serde_json::Value>, HostError> {
    let value = getStorage(area, key)
        .await
        .map_err(|e| browser_error("storage.get", e))?;

    if value.is_null() || value.is_undefined() {
        Ok(None)
    } else {
        from_js(value).map(Some)
    }
}

async fn set_value(area: &str, key: &str, value: serde_json::Value) -> Result<(), HostError> {
    setStorage(area, key, to_js(&value)?)
        .await
        .map_err(|e| browser_error("storage.set", e))
}

impl TabHost for ChromeHost {
    async fn query_window_tabs(&self) -> Result<Vec<TabInfo>, HostError> {
        let tabs_js = getCurrentWindowTabs()
            .await
            .map_err(|e| browser_error("tabs.query", e))?;
        from_js(tabs_js)
    }

    async fn find_tab_by_title(&self, title: &str) -> Result<Option<i32>, HostError> {
        let id = findTabByTitle(title)
            .await
            .map_err(|e| browser_error("tabs.query", e))?;
        Ok(id.as_f64().map(|id| id as i32))
    }

    async fn focus_tab(&self, tab_id: i32) -> Result<(), HostError> {
        focusTab(tab_id)
            .await
            .map_err(|e| browser_error("tabs.update", e))
    }

    async fn create_tab(&self, url: &str, active: bool) -> Result<i32, HostError> {
        let id = createTab(url, active)
            .await
            .map_err(|e| browser_error("tabs.create", e))?;
        id.as_f64()
            .map(|id| id as i32)
            .ok_or_else(|| HostError::Conversion(format!("tab id {:?}", id)))
    }

    async fn wait_until_loaded(&self, tab_id: i32) -> Result<(), HostError> {
        waitUntilLoaded(tab_id)
            .await
            .map_err(|e| browser_error("tabs.onUpdated", e))
    }

    async fn close_tab(&self, tab_id: i32) -> Result<(), HostError> {
        removeTab(tab_id)
            .await
            .map_err(|e| browser_error("tabs.remove", e))
    }

    async fn sleep(&self, ms: u32) {
        if let Err(e) = delay(ms).await {
            log::debug!("Timer failed: {:?}", e);
        }
    }
}

impl ExtensionStorage for ChromeHost {
    async fn get_sync(&self, key: &str) -> Result<Option<serde_json::Value>, HostError> {
        get_value(SYNC, key).await
    }

    async fn set_sync(&self, key: &str, value: serde_json::Value) -> Result<(), HostError> {
        set_value(SYNC, key, value).await
    }

    async fn get_local(&self, key: &str) -> Result<Option<serde_json::Value>, HostError> {
        get_value(LOCAL, key).await
    }

    async fn set_local(&self, key: &str, value: serde_json::Value) -> Result<(), HostError> {
        set_value(LOCAL, key, value).await
    }

    async fn remove_local(&self, keys: &[&str]) -> Result<(), HostError> {
        removeStorage(LOCAL, to_js(keys)?)
            .await
            .map_err(|e| browser_error("storage.remove", e))
    }
}

/// Current time as the browser formats it, e.g. "Mon Oct 19 2026 10:30:00 GMT-0400"
pub fn now_string() -> String {
    String::from(js_sys::Date::new_0().to_string())
}
