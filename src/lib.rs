/// TabMerger - merge open tabs into named groups
/// Built with Rust + WASM

pub mod app;
pub mod background;
pub mod chrome;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod host;
pub mod operations;
pub mod pdf;
pub mod search;
pub mod settings;
pub mod storage;
pub mod tab_data;

use app::{PageEdit, PageState};
use chrome::{now_string, ChromeHost};
use dispatch::{OriginTab, PageMessage, Trigger};
use js_sys::Promise;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(js_error)
}

fn origin_tab(tab: JsValue) -> Option<OriginTab> {
    serde_wasm_bindgen::from_value(tab)
        .map_err(|e| log::warn!("Unreadable origin tab: {:?}", e))
        .ok()
}

fn handle_trigger(trigger: Trigger) {
    spawn_local(async move {
        let host = ChromeHost;
        let settings = background::load_settings(&host).await;
        let action = match dispatch::resolve(trigger, &settings) {
            Ok(action) => action,
            Err(e) => {
                log::error!("Ignoring trigger: {}", e);
                return;
            }
        };
        log::debug!("Running {:?}", action);

        if let Err(e) = background::run_action(&host, action, &now_string()).await {
            log::error!("Action failed: {}", e);
        }
    });
}

// Background worker entry points, called from js/background.js

/// Context menu entries for the background script to register
#[wasm_bindgen]
pub fn context_menu_items() -> Result<JsValue, JsValue> {
    to_js(&dispatch::CONTEXT_MENU)
}

#[wasm_bindgen]
pub fn uninstall_url() -> String {
    dispatch::UNINSTALL_URL.to_string()
}

#[wasm_bindgen]
pub fn on_installed() {
    spawn_local(async {
        if let Err(e) = background::initialize_storage(&ChromeHost, &now_string()).await {
            log::error!("Failed to initialize storage: {}", e);
        }
    });
}

#[wasm_bindgen]
pub fn on_toolbar_click(tab: JsValue) {
    handle_trigger(Trigger::ToolbarClick { tab: origin_tab(tab) });
}

#[wasm_bindgen]
pub fn on_context_menu(menu_item_id: String, tab: JsValue) {
    handle_trigger(Trigger::ContextMenu {
        item_id: menu_item_id,
        tab: origin_tab(tab),
    });
}

#[wasm_bindgen]
pub fn on_command(command: String, active_tab: JsValue) {
    handle_trigger(Trigger::Command {
        command,
        tab: origin_tab(active_tab),
    });
}

#[wasm_bindgen]
pub fn on_message(request: JsValue, active_tab: JsValue) -> Result<(), JsValue> {
    let message: PageMessage = serde_wasm_bindgen::from_value(request).map_err(js_error)?;
    handle_trigger(Trigger::Message {
        message,
        active_tab: origin_tab(active_tab),
    });
    Ok(())
}

// Extension page, driven from js/page_bridge.js

#[wasm_bindgen]
pub struct TabMergerPage {
    state: Rc<RefCell<PageState>>,
}

#[wasm_bindgen]
impl TabMergerPage {
    /// Load groups and settings, then pull in any merge waiting in storage
    pub async fn load() -> TabMergerPage {
        let host = ChromeHost;
        let state = RefCell::new(PageState::load(&host, &now_string()).await);
        if let Err(e) = app::consume_pending(&state, &host).await {
            log::error!("Failed to apply pending merge: {}", e);
        }
        TabMergerPage { state: Rc::new(state) }
    }

    /// Re-check for a merge made while the page was open. Resolves to
    /// whether one was applied; the page stays usable meanwhile.
    pub fn refresh(&self) -> Promise {
        let state = Rc::clone(&self.state);
        future_to_promise(async move {
            let applied = app::consume_pending(&state, &ChromeHost).await.map_err(js_error)?;
            Ok(JsValue::from_bool(applied.is_some()))
        })
    }

    pub fn groups(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow().groups)
    }

    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow().settings)
    }

    pub fn tab_total(&self) -> usize {
        self.state.borrow().groups.total_tabs()
    }

    pub fn search(&self, group_query: &str, tab_query: &str) -> Result<JsValue, JsValue> {
        to_js(&search::search(&self.state.borrow().groups, group_query, tab_query))
    }

    /// Apply an edit from the page and persist it
    pub fn edit(&self, edit: JsValue) -> Result<(), JsValue> {
        let edit: PageEdit = serde_wasm_bindgen::from_value(edit).map_err(js_error)?;
        let persist = self.state.borrow_mut().apply_edit(edit, &now_string());
        if persist.is_empty() {
            return Ok(());
        }

        spawn_local(async move {
            if let Err(e) = app::persist(&ChromeHost, persist).await {
                log::error!("Failed to save: {}", e);
            }
        });
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, JsValue> {
        let state = self.state.borrow();
        export::export_json(&state.groups, &state.settings).map_err(js_error)
    }

    pub fn export_file_name(&self) -> String {
        export::output_file_name(&now_string())
    }

    /// Replace everything with an imported file. A rejected file leaves
    /// storage untouched and the message is shown to the user.
    pub fn import_json(&self, file_name: &str, mime_type: &str, content: &str) -> Result<(), JsValue> {
        let bundle = export::import_json(file_name, mime_type, content).map_err(js_error)?;
        let persist = self.state.borrow_mut().import(bundle);

        spawn_local(async move {
            if let Err(e) = app::persist(&ChromeHost, persist).await {
                log::error!("Failed to save import: {}", e);
            }
        });
        Ok(())
    }

    pub fn pdf_layout(&self) -> Result<JsValue, JsValue> {
        to_js(&pdf::layout(&self.state.borrow().groups))
    }
}
