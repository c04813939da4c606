/*!
 * # Table checkbox engine
 *
 * Turns markdown checkbox tokens (`- [ ]`, `-[]`, ...) into rendered
 * `<input type="checkbox">` controls with unique ids, and writes control
 * state changes back into the document text.
 *
 * ## Module Structure
 *
 * - **`matcher`**: pure line classification and token location
 * - **`ids`**: identifier allocation, unique per document and per batch
 * - **`control`**: the rendered control literal and lookups by id
 * - **`convert`**: live conversion of a token as `]` is typed
 * - **`bulk`**: whole-document conversion under a [`ConversionPolicy`]
 * - **`toggle`**: state write-back for toggled controls
 * - **`document`**, **`io`**: the host editor and file-store seams
 * - **`events`**, **`commands`**, **`windows`**: input port, command surface
 *   and per-window listener registry
 */

pub mod bulk;
pub mod commands;
pub mod control;
pub mod convert;
pub mod document;
pub mod events;
pub mod ids;
pub mod io;
pub mod matcher;
pub mod toggle;
pub mod windows;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use bulk::{BulkConversion, ConversionPolicy, convert_all, convert_document};
pub use commands::{COMMAND_CONVERT_ALL, COMMANDS, CommandError, CommandSpec, execute_command};
pub use control::{CheckState, ControlInfo, find_control, list_controls, render_checkbox};
pub use convert::{Edit, convert_at_cursor, plan_conversion};
pub use document::{DocumentService, EditError, EditorDocument, Position, Span};
pub use events::{EditorEvent, EngineError, EventContext, Outcome, handle};
pub use ids::{IdAllocator, IdSource, UuidSource, generate_unique_id};
pub use io::{FileStore, IoError, MemoryStore, NotesDir};
pub use matcher::{
    Token, extract_checkbox_span, find_all_checkbox_spans, is_checkbox_in_table_context,
    is_trigger_position_valid,
};
pub use toggle::{ControlElement, ToggleEvent, ToggleOutcome, apply_toggle, sync_toggle};
pub use windows::{WindowId, WindowListeners, WindowRegistry};
