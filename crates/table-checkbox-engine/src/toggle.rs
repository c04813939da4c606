//! Writing a control's checked state back into the persisted document.

use std::collections::BTreeMap;

use relative_path::RelativePath;

use crate::control::{CheckState, find_control};
use crate::io::{FileStore, IoError};

/// Class the host puts on its own task-list checkboxes; those are not ours
pub const NATIVE_TASK_CLASS: &str = "task-list-item-checkbox";

/// The element that fired a state change, as reported by the host UI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
}

impl ControlElement {
    /// A rendered checkbox element as produced by the converters
    pub fn checkbox(id: &str) -> Self {
        let attributes = [("type", "checkbox"), ("id", id)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            tag: "input".to_string(),
            attributes,
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// The id of a checkbox this engine is responsible for, if it is one
    pub fn owned_id(&self) -> Option<&str> {
        let is_checkbox =
            self.tag.eq_ignore_ascii_case("input") && self.attribute("type") == Some("checkbox");
        if !is_checkbox || self.has_class(NATIVE_TASK_CLASS) {
            return None;
        }
        self.attribute("id").filter(|id| !id.is_empty())
    }
}

/// A checked/unchecked change on a control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleEvent {
    pub target: ControlElement,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Not one of our controls
    Ignored,
    /// No rendered control with this id in the document; nothing written
    NotFound { id: String },
    /// Control already had this state; nothing written
    Unchanged { id: String, state: CheckState },
    /// Document rewritten with the new state
    Written { id: String, state: CheckState },
}

/// Rewrite the state attribute of the first control carrying `id`.
///
/// Everything outside that one attribute is left byte for byte as it was.
pub fn sync_toggle(text: &str, id: &str, checked: bool) -> Option<String> {
    let control = find_control(text, id)?;
    let state = CheckState::from_checked(checked);

    let mut out = String::with_capacity(text.len() + 2);
    out.push_str(&text[..control.state_range.start]);
    out.push_str(state.as_attr());
    out.push_str(&text[control.state_range.end..]);
    Some(out)
}

/// Handle a toggle event against the persisted copy of `path`
pub fn apply_toggle<F: FileStore + ?Sized>(
    store: &mut F,
    path: &RelativePath,
    event: &ToggleEvent,
) -> Result<ToggleOutcome, IoError> {
    let Some(id) = event.target.owned_id() else {
        return Ok(ToggleOutcome::Ignored);
    };

    let text = store.read(path)?;
    let Some(updated) = sync_toggle(&text, id, event.checked) else {
        log::debug!("no control with id {id:?} in {path}");
        return Ok(ToggleOutcome::NotFound { id: id.to_string() });
    };

    let state = CheckState::from_checked(event.checked);
    if updated == text {
        log::debug!("checkbox {id} in {path} is already {state}");
        return Ok(ToggleOutcome::Unchanged {
            id: id.to_string(),
            state,
        });
    }

    store.write(path, &updated)?;
    log::info!("set checkbox {id} to {state} in {path}");

    Ok(ToggleOutcome::Written {
        id: id.to_string(),
        state,
    })
}
