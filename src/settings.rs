/// User settings kept in synchronized storage
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_COLOR: &str = "#000000";
pub const DEFAULT_TITLE: &str = "Title";

/// What the toolbar icon does
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OpenBehavior {
    /// Open the extension page and merge every tab in the window
    With,
    /// Only open the extension page
    #[default]
    Without,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

// Stored as the `dark` boolean so older exports keep loading.
fn serialize_theme<S: Serializer>(theme: &Theme, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bool(*theme == Theme::Dark)
}

fn deserialize_theme<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Theme, D::Error> {
    let dark = Option::<bool>::deserialize(deserializer)?;
    Ok(if dark.unwrap_or(false) { Theme::Dark } else { Theme::Light })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Comma separated url fragments that are never merged
    pub blacklist: String,
    pub open: OpenBehavior,
    #[serde(
        rename = "dark",
        serialize_with = "serialize_theme",
        deserialize_with = "deserialize_theme"
    )]
    pub theme: Theme,
    pub color: String,
    pub title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            blacklist: String::new(),
            open: OpenBehavior::default(),
            theme: Theme::default(),
            color: DEFAULT_COLOR.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a stored value, falling back to defaults when the
    /// record is missing or malformed
    pub fn from_stored(value: Option<serde_json::Value>) -> Settings {
        match value {
            Some(value) if !value.is_null() => serde_json::from_value(value).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed settings: {}", e);
                Settings::default()
            }),
            _ => Settings::default(),
        }
    }

    /// Parsed blacklist fragments, trimmed and lowercased
    pub fn blacklist_entries(&self) -> Vec<String> {
        parse_blacklist(&self.blacklist)
    }

    /// Add a url to the blacklist so later merges skip it
    pub fn exclude_site(&mut self, url: &str) {
        if self.blacklist_entries().contains(&url.to_lowercase()) {
            return;
        }
        if self.blacklist.trim().is_empty() {
            self.blacklist = url.to_string();
        } else {
            self.blacklist = format!("{}, {}", self.blacklist, url);
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }
}

pub fn parse_blacklist(blacklist: &str) -> Vec<String> {
    blacklist
        .split(',')
        .map(|site| site.trim().to_lowercase())
        .filter(|site| !site.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.blacklist, "");
        assert_eq!(settings.open, OpenBehavior::Without);
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.color, "#000000");
        assert_eq!(settings.title, "Title");
    }

    #[test]
    fn test_from_stored_missing_or_malformed() {
        assert_eq!(Settings::from_stored(None), Settings::default());
        assert_eq!(Settings::from_stored(Some(serde_json::Value::Null)), Settings::default());
        assert_eq!(Settings::from_stored(Some(json!("garbage"))), Settings::default());
        assert_eq!(Settings::from_stored(Some(json!({"open": "sometimes"}))), Settings::default());
    }

    #[test]
    fn test_from_stored_partial_record() {
        let settings = Settings::from_stored(Some(json!({"open": "with", "dark": true})));

        assert_eq!(settings.open, OpenBehavior::With);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.title, "Title");
    }

    #[test]
    fn test_theme_stored_as_dark_flag() {
        let mut settings = Settings::default();
        settings.toggle_theme();

        let value = serde_json::to_value(&settings).unwrap();

        assert_eq!(value["dark"], json!(true));
        assert_eq!(value["open"], json!("without"));
    }

    #[test]
    fn test_parse_blacklist() {
        let entries = parse_blacklist(" Example.com ,,https://News.site/ , ");
        assert_eq!(entries, vec!["example.com", "https://news.site/"]);
        assert!(parse_blacklist("").is_empty());
    }

    #[test]
    fn test_exclude_site() {
        let mut settings = Settings::default();

        settings.exclude_site("https://a.com/");
        settings.exclude_site("https://b.com/");
        settings.exclude_site("https://A.com/");

        assert_eq!(settings.blacklist, "https://a.com/, https://b.com/");
    }
}
