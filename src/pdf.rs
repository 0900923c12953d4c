/// PDF export layout.
///
/// Rust decides where everything goes; js/page_bridge.js replays the pages
/// through jsPDF. Units are millimetres on an A4 portrait page.
use crate::storage::GroupStore;
use serde::Serialize;

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;

const MARGIN_X: f64 = 25.0;
const FIRST_Y: f64 = 50.0;
const PAGE_TOP_Y: f64 = 25.0;
const LINE_HEIGHT: f64 = 10.0;
const GROUP_GAP: f64 = 15.0;
const GROUP_WIDTH: f64 = 175.0;
const MAX_TITLE_CHARS: usize = 75;

pub const CHROME_STORE_URL: &str =
    "https://chrome.google.com/webstore/detail/tabmerger/inmiajapbpafmhjleiebcamfhkfnlgoc";
pub const FIREFOX_STORE_URL: &str = "https://addons.mozilla.org/en-CA/firefox/addon/tabmerger/";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PdfOp {
    Image { src: &'static str, x: f64, y: f64, w: f64, h: f64 },
    Text { text: String, x: f64, y: f64, size: f64 },
    Link { text: String, url: String, x: f64, y: f64, size: f64 },
    Rect { color: String, x: f64, y: f64, w: f64, h: f64 },
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct PdfLayout {
    pub pages: Vec<Vec<PdfOp>>,
}

/// Drop characters outside ASCII; jsPDF's built-in fonts cannot draw them
pub fn clean_string(input: &str) -> String {
    input.chars().filter(char::is_ascii).collect()
}

/// Shorten long titles to 75 characters plus "..."
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let short: String = title.chars().take(MAX_TITLE_CHARS).collect();
        format!("{}...", short)
    } else {
        title.to_string()
    }
}

struct Cursor {
    pages: Vec<Vec<PdfOp>>,
    y: f64,
}

impl Cursor {
    fn push(&mut self, op: PdfOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    /// Move down, starting a new page once past the bottom
    fn advance(&mut self, dy: f64) {
        self.y += dy;
        if self.y >= PAGE_HEIGHT {
            self.pages.push(Vec::new());
            self.y = PAGE_TOP_Y;
        }
    }

    fn text(&mut self, text: impl Into<String>, x: f64, y: f64, size: f64) {
        self.push(PdfOp::Text { text: text.into(), x, y, size });
    }
}

pub fn layout(store: &GroupStore) -> PdfLayout {
    let x = MARGIN_X;
    let mut cursor = Cursor {
        pages: vec![Vec::new()],
        y: FIRST_Y,
    };

    let y = cursor.y;
    cursor.push(PdfOp::Image { src: "./images/logo-full-rescale.PNG", x: x - 5.0, y: y - 25.0, w: 74.4, h: 14.0 });
    cursor.text("Get TabMerger Today:", x + 90.0, y - 15.0, 11.0);
    cursor.push(PdfOp::Link { text: "Chrome".to_string(), url: CHROME_STORE_URL.to_string(), x: x + 131.0, y: y - 15.0, size: 11.0 });
    cursor.text("|", x + 146.0, y - 15.0, 11.0);
    cursor.push(PdfOp::Link { text: "FireFox".to_string(), url: FIREFOX_STORE_URL.to_string(), x: x + 149.0, y: y - 15.0, size: 11.0 });
    cursor.push(PdfOp::Image { src: "./images/logo128.png", x: PAGE_WIDTH - 20.0, y: y - 20.0, w: 5.0, h: 5.0 });
    cursor.text(format!("{} tabs in total", store.total_tabs()), x - 5.0, y, 16.0);

    for group in store.groups() {
        let rows = group.tabs.len().max(1) as f64 + 1.0;
        cursor.push(PdfOp::Rect {
            color: group.color.clone(),
            x: x - 5.0,
            y: cursor.y + 8.0,
            w: GROUP_WIDTH,
            h: LINE_HEIGHT * rows,
        });

        cursor.advance(GROUP_GAP);
        let y = cursor.y;
        cursor.text(clean_string(&group.title), x - 3.0, y, 16.0);

        if group.tabs.is_empty() {
            cursor.text("[ NO TABS IN GROUP ]", x + 5.0, y + LINE_HEIGHT, 12.0);
            cursor.y += LINE_HEIGHT;
            continue;
        }

        for (pos, tab) in group.tabs.iter().enumerate() {
            cursor.advance(LINE_HEIGHT);
            let y = cursor.y;
            cursor.text(format!("{}.", pos + 1), x + 5.0, y, 12.0);
            cursor.push(PdfOp::Link {
                text: clean_string(&truncate_title(&tab.title)),
                url: tab.url.clone(),
                x: if pos < 9 { x + 11.0 } else { x + 13.0 },
                y,
                size: 12.0,
            });
        }
    }

    let total = cursor.pages.len();
    for (i, page) in cursor.pages.iter_mut().enumerate() {
        page.push(PdfOp::Text {
            text: format!("Page {} of {}", i + 1, total),
            x: PAGE_WIDTH / 2.0 - 20.0,
            y: PAGE_HEIGHT - 5.0,
            size: 12.0,
        });
        page.push(PdfOp::Text {
            text: "\u{a9} TabMerger".to_string(),
            x: PAGE_WIDTH - 50.0,
            y: PAGE_HEIGHT - 5.0,
            size: 12.0,
        });
    }

    PdfLayout { pages: cursor.pages }
}
