//! Live conversion of a checkbox token as the user types it.
//!
//! The host reports the `]` keystroke before inserting it, together with the
//! caret at which it would land. When a conversion happens the returned edit
//! takes the place of the keystroke; when nothing matches the keystroke is
//! left to the host.

use crate::control::{CheckState, render_checkbox};
use crate::document::{DocumentService, EditError, Position, Span};
use crate::ids::{IdAllocator, IdSource, UuidSource};
use crate::matcher::{extract_checkbox_span, is_checkbox_in_table_context, is_trigger_position_valid};

/// The only character that can complete a checkbox token
pub const TRIGGER: char = ']';

/// A single replacement to apply to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub text: String,
}

/// Decide what a `]` typed at `cursor` on `line` should turn into.
///
/// Returns `None` whenever any check fails; that is not an error.
pub fn plan_conversion<S: IdSource>(
    line: &str,
    cursor: Position,
    ids: &mut IdAllocator<'_, S>,
) -> Option<Edit> {
    if !is_checkbox_in_table_context(line) {
        return None;
    }
    if !is_trigger_position_valid(line, cursor.ch) {
        return None;
    }
    // A complete token already swallowed the bracket sitting at the caret
    let token = extract_checkbox_span(line, cursor.ch)?;

    let id = ids.allocate();
    Some(Edit {
        span: Span::on_line(cursor.line, token.span),
        text: render_checkbox(&id, CheckState::Unchecked),
    })
}

/// React to a typed character on the live document.
///
/// On a conversion the token span is selected and replaced in one step, and
/// the applied edit is returned. `Ok(None)` means the host should insert the
/// character as usual.
pub fn convert_at_cursor<D: DocumentService + ?Sized>(
    doc: &mut D,
    typed: char,
) -> Result<Option<Edit>, EditError> {
    convert_at_cursor_with(doc, typed, UuidSource)
}

pub fn convert_at_cursor_with<D, S>(
    doc: &mut D,
    typed: char,
    source: S,
) -> Result<Option<Edit>, EditError>
where
    D: DocumentService + ?Sized,
    S: IdSource,
{
    if typed != TRIGGER {
        return Ok(None);
    }

    let cursor = doc.cursor();
    let Some(line) = doc.line(cursor.line) else {
        return Ok(None);
    };

    let text = doc.text();
    let mut ids = IdAllocator::with_source(&text, source);
    let Some(edit) = plan_conversion(&line, cursor, &mut ids) else {
        log::debug!("no checkbox to convert at {}:{}", cursor.line, cursor.ch);
        return Ok(None);
    };

    doc.set_selection(edit.span)?;
    doc.replace_selection(&edit.text)?;
    Ok(Some(edit))
}
