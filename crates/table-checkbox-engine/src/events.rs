//! Input port: typed events in, outcomes out.
//!
//! Hosts translate their own callbacks into [`EditorEvent`]s and hand them to
//! [`handle`] along with whatever the event needs to act on. Subscription
//! setup and teardown stay on the host side.

use relative_path::RelativePath;

use crate::bulk::{BulkConversion, ConversionPolicy};
use crate::commands::{CommandError, execute_command};
use crate::convert::{Edit, convert_at_cursor};
use crate::document::{DocumentService, EditError};
use crate::io::{FileStore, IoError};
use crate::toggle::{ToggleEvent, ToggleOutcome, apply_toggle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A character is about to be inserted at the caret
    KeyInput { ch: char },
    /// A rendered control changed state
    ControlToggled(ToggleEvent),
    /// A palette command was invoked
    Command(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to do; keystrokes fall through to the host
    Ignored,
    /// The keystroke was replaced by this edit
    Converted(Edit),
    Bulk(BulkConversion),
    Toggled(ToggleOutcome),
}

impl Outcome {
    /// Whether the event modified a live buffer or a persisted document
    pub fn changed(&self) -> bool {
        match self {
            Outcome::Ignored => false,
            Outcome::Converted(_) => true,
            Outcome::Bulk(result) => !result.is_noop(),
            Outcome::Toggled(outcome) => matches!(outcome, ToggleOutcome::Written { .. }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Everything an event may touch, borrowed for the duration of one event
pub struct EventContext<'a, D: ?Sized, F: ?Sized> {
    /// Live buffer of the active document, if an editor is focused
    pub document: Option<&'a mut D>,
    /// Persisted copies of documents
    pub store: &'a mut F,
    /// Notes-relative path of the active document
    pub active_path: Option<&'a RelativePath>,
    pub policy: ConversionPolicy,
}

pub fn handle<D, F>(
    event: &EditorEvent,
    ctx: &mut EventContext<'_, D, F>,
) -> Result<Outcome, EngineError>
where
    D: DocumentService + ?Sized,
    F: FileStore + ?Sized,
{
    match event {
        EditorEvent::KeyInput { ch } => {
            let Some(doc) = ctx.document.as_deref_mut() else {
                return Ok(Outcome::Ignored);
            };
            Ok(convert_at_cursor(doc, *ch)?.map_or(Outcome::Ignored, Outcome::Converted))
        }
        EditorEvent::ControlToggled(toggle) => {
            let Some(path) = ctx.active_path else {
                log::debug!("toggle with no active document ignored");
                return Ok(Outcome::Ignored);
            };
            Ok(Outcome::Toggled(apply_toggle(&mut *ctx.store, path, toggle)?))
        }
        EditorEvent::Command(command) => {
            let Some(doc) = ctx.document.as_deref_mut() else {
                log::debug!("command {command} with no active document ignored");
                return Ok(Outcome::Ignored);
            };
            Ok(Outcome::Bulk(execute_command(command, doc, ctx.policy)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::COMMAND_CONVERT_ALL;
    use crate::document::{EditorDocument, Position};
    use crate::io::MemoryStore;
    use crate::toggle::ControlElement;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_input_converts_on_live_document() {
        let mut doc = EditorDocument::from_text("| a | - [");
        doc.set_cursor(Position::new(0, 9)).unwrap();
        let mut store = MemoryStore::new();
        let mut ctx = EventContext {
            document: Some(&mut doc),
            store: &mut store,
            active_path: None,
            policy: ConversionPolicy::default(),
        };

        let outcome = handle(&EditorEvent::KeyInput { ch: ']' }, &mut ctx).unwrap();

        assert!(matches!(outcome, Outcome::Converted(_)));
        assert!(doc.text().starts_with("| a | <input type=\"checkbox\" unchecked id=\""));
    }

    #[test]
    fn test_events_without_active_document_are_ignored() {
        let mut store = MemoryStore::new();
        let mut ctx: EventContext<'_, EditorDocument, MemoryStore> = EventContext {
            document: None,
            store: &mut store,
            active_path: None,
            policy: ConversionPolicy::default(),
        };

        let toggle = EditorEvent::ControlToggled(ToggleEvent {
            target: ControlElement::checkbox("abc123"),
            checked: true,
        });
        for event in [
            EditorEvent::KeyInput { ch: ']' },
            EditorEvent::Command(COMMAND_CONVERT_ALL.to_string()),
            toggle,
        ] {
            assert_eq!(handle(&event, &mut ctx).unwrap(), Outcome::Ignored);
        }
    }

    #[test]
    fn test_toggle_event_reaches_store() {
        let mut store = MemoryStore::new()
            .with_file("tasks.md", "| a | <input type=\"checkbox\" unchecked id=\"abc123\"> |");
        let path = RelativePath::new("tasks.md");
        let mut ctx: EventContext<'_, EditorDocument, MemoryStore> = EventContext {
            document: None,
            store: &mut store,
            active_path: Some(path),
            policy: ConversionPolicy::default(),
        };

        let event = EditorEvent::ControlToggled(ToggleEvent {
            target: ControlElement::checkbox("abc123"),
            checked: true,
        });
        let outcome = handle(&event, &mut ctx).unwrap();

        assert!(matches!(outcome, Outcome::Toggled(ToggleOutcome::Written { .. })));
        assert_eq!(
            store.read(path).unwrap(),
            "| a | <input type=\"checkbox\" checked id=\"abc123\"> |"
        );
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let mut doc = EditorDocument::from_text("");
        let mut store = MemoryStore::new();
        let mut ctx = EventContext {
            document: Some(&mut doc),
            store: &mut store,
            active_path: None,
            policy: ConversionPolicy::default(),
        };

        let result = handle(&EditorEvent::Command("nope".to_string()), &mut ctx);
        assert!(matches!(result, Err(EngineError::Command(CommandError::Unknown(_)))));
    }
}
