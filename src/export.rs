/// JSON export and import of groups and settings

use crate::error::ImportError;
use crate::settings::Settings;
use crate::storage::GroupStore;
use serde::{Deserialize, Serialize};

/// Everything an export file holds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportBundle {
    pub groups: GroupStore,
    #[serde(default)]
    pub settings: Settings,
}

pub fn export_json(groups: &GroupStore, settings: &Settings) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportBundle {
        groups: groups.clone(),
        settings: settings.clone(),
    })
}

fn is_json_file(file_name: &str, mime_type: &str) -> bool {
    mime_type == "application/json" || file_name.to_lowercase().ends_with(".json")
}

/// Validate and parse an imported file
pub fn import_json(file_name: &str, mime_type: &str, content: &str) -> Result<ExportBundle, ImportError> {
    if !is_json_file(file_name, mime_type) {
        return Err(ImportError::NotJson(file_name.to_string()));
    }

    let bundle: ExportBundle =
        serde_json::from_str(content).map_err(|e| ImportError::Malformed(e.to_string()))?;

    if bundle.groups.is_empty() {
        return Err(ImportError::Malformed("file holds no groups".to_string()));
    }
    Ok(bundle)
}

/// Export file name (without extension) from a JS `Date` string.
///
/// "Mon Oct 19 2026 10:30:00 GMT-0400" becomes "TabMerger [Oct-19-2026 @ 10:30:00]".
pub fn output_file_name(date: &str) -> String {
    let parts: Vec<&str> = date.split_whitespace().skip(1).take(4).collect();
    match parts.as_slice() {
        [month, day, year, time] => format!("TabMerger [{}-{}-{} @ {}]", month, day, year, time),
        _ => format!("TabMerger [{}]", date.trim()),
    }
}
