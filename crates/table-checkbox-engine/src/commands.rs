use crate::bulk::{BulkConversion, ConversionPolicy, convert_document};
use crate::document::DocumentService;

pub const COMMAND_CONVERT_ALL: &str = "convert-all-checkboxes";

/// A command a host can list in its palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub id: &'static str,
    pub name: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[CommandSpec {
    id: COMMAND_CONVERT_ALL,
    name: "Convert all checkboxes in current document",
}];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
}

/// Run a palette command against the active document
pub fn execute_command<D: DocumentService + ?Sized>(
    command: &str,
    doc: &mut D,
    policy: ConversionPolicy,
) -> Result<BulkConversion, CommandError> {
    match command {
        COMMAND_CONVERT_ALL => Ok(convert_document(doc, policy)),
        _ => Err(CommandError::Unknown(command.to_string())),
    }
}
