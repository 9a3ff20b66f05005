//! Output formatting: Alfred feedback, table, JSON, plain.
//!
//! `list` produces a sequence of [`Item`]s, `set` a single message. Both go
//! through here so every format stays consistent.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

const ICON: &str = "icon.png";

// ── Items ────────────────────────────────────────────────────────────

/// One result row. Serializes as an Alfred script-filter item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    /// Whether actioning the item does anything.
    pub valid: bool,
    pub icon: Icon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub path: String,
}

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uid: None,
            title: title.into(),
            subtitle: None,
            arg: None,
            valid: false,
            icon: Icon { path: ICON.into() },
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Attach the argument passed on when actioned; makes the item valid.
    pub fn action(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self.valid = true;
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }
}

#[derive(Serialize)]
struct ScriptFilter<'a> {
    items: &'a [Item],
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Detail")]
    subtitle: String,
    #[tabled(rename = "Arg")]
    arg: String,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            subtitle: item.subtitle.clone().unwrap_or_default(),
            arg: item.arg.clone().unwrap_or_default(),
        }
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

pub fn render_items(format: OutputFormat, items: &[Item]) -> String {
    match format {
        OutputFormat::Alfred => render_json_compact(&ScriptFilter { items }),
        OutputFormat::Table => {
            let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json_pretty(items),
        OutputFormat::Plain => items
            .iter()
            .map(|i| i.title.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render the one-line result of an action.
pub fn render_message(format: OutputFormat, message: &str) -> String {
    match format {
        OutputFormat::Json => render_json_pretty(&serde_json::json!({ "message": message })),
        OutputFormat::Alfred | OutputFormat::Table | OutputFormat::Plain => message.to_owned(),
    }
}

pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

pub(crate) fn render_json_pretty<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

fn render_json_compact<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

// ── Filtering ────────────────────────────────────────────────────────

/// Keep the items whose key contains every character of `query`, in order.
pub fn fuzzy_match<T>(query: &str, items: Vec<T>, key: impl Fn(&T) -> String) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| is_subsequence(query, &key(item)))
        .collect()
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut rest = haystack.chars();
    needle.chars().all(|c| rest.any(|h| h == c))
}
