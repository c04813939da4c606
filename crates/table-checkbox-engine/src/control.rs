//! The rendered checkbox literal and lookups against it.
//!
//! The exact shape `<input type="checkbox" STATE id="ID">` is the on-disk
//! contract: attribute order and spelling must not change or toggles stop
//! finding the controls they belong to.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// State attribute of a rendered checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Checked,
    Unchecked,
}

impl CheckState {
    pub fn from_checked(checked: bool) -> Self {
        if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }

    pub fn is_checked(self) -> bool {
        matches!(self, CheckState::Checked)
    }

    /// Attribute text as written into the document
    pub fn as_attr(self) -> &'static str {
        match self {
            CheckState::Checked => "checked",
            CheckState::Unchecked => "unchecked",
        }
    }

    fn from_attr(attr: &str) -> Option<Self> {
        match attr {
            "checked" => Some(CheckState::Checked),
            "unchecked" => Some(CheckState::Unchecked),
            _ => None,
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_attr())
    }
}

/// Render the control literal for `id`
pub fn render_checkbox(id: &str, state: CheckState) -> String {
    format!(r#"<input type="checkbox" {state} id="{id}">"#)
}

/// A rendered checkbox located in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlInfo {
    pub id: String,
    pub state: CheckState,
    /// Byte range of the whole literal
    pub range: Range<usize>,
    /// Byte range of the state attribute alone
    pub state_range: Range<usize>,
}

fn any_control_regex() -> &'static Regex {
    static CONTROL_REGEX: OnceLock<Regex> = OnceLock::new();
    CONTROL_REGEX.get_or_init(|| {
        Regex::new(r#"<input type="checkbox" (checked|unchecked) id="([^"]*)">"#)
            .expect("Invalid control regex")
    })
}

fn control_from_captures(caps: &regex::Captures<'_>, id: &str) -> Option<ControlInfo> {
    let whole = caps.get(0)?;
    let state = caps.get(1)?;
    Some(ControlInfo {
        id: id.to_string(),
        state: CheckState::from_attr(state.as_str())?,
        range: whole.range(),
        state_range: state.range(),
    })
}

/// First rendered control carrying `id`, in either state
pub fn find_control(text: &str, id: &str) -> Option<ControlInfo> {
    let pattern = format!(
        r#"<input type="checkbox" (checked|unchecked) id="{}">"#,
        regex::escape(id)
    );
    let regex = Regex::new(&pattern).ok()?;
    let caps = regex.captures(text)?;
    control_from_captures(&caps, id)
}

/// Every rendered control in document order
pub fn list_controls(text: &str) -> Vec<ControlInfo> {
    any_control_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let id = caps.get(2)?.as_str().to_string();
            control_from_captures(&caps, &id)
        })
        .collect()
}
