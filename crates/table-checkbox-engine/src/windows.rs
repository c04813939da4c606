//! Per-window listener bookkeeping.
//!
//! Each host window registers its own listeners when it opens and drops them
//! when it closes. Events are only dispatched for windows that are open, and
//! each window only ever acts on its own active document.

use std::collections::HashMap;

use crate::document::DocumentService;
use crate::events::{EditorEvent, EngineError, EventContext, Outcome, handle};
use crate::io::FileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Listener state for one window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowListeners {
    /// Events dispatched to this window
    pub handled: u64,
    /// Events that changed a document
    pub applied: u64,
}

#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<WindowId, WindowListeners>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register listeners for a window; returns false if it was already registered
    pub fn open(&mut self, window: WindowId) -> bool {
        if self.windows.contains_key(&window) {
            return false;
        }
        log::debug!("registering listeners for window {}", window.0);
        self.windows.insert(window, WindowListeners::default());
        true
    }

    /// Drop a window's listeners; returns its final state if it was open
    pub fn close(&mut self, window: WindowId) -> Option<WindowListeners> {
        log::debug!("removing listeners for window {}", window.0);
        self.windows.remove(&window)
    }

    pub fn is_open(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    pub fn listeners(&self, window: WindowId) -> Option<&WindowListeners> {
        self.windows.get(&window)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Route an event from `window` to the engine
    pub fn dispatch<D, F>(
        &mut self,
        window: WindowId,
        event: &EditorEvent,
        ctx: &mut EventContext<'_, D, F>,
    ) -> Result<Outcome, EngineError>
    where
        D: DocumentService + ?Sized,
        F: FileStore + ?Sized,
    {
        let Some(listeners) = self.windows.get_mut(&window) else {
            log::debug!("event for unregistered window {} dropped", window.0);
            return Ok(Outcome::Ignored);
        };

        listeners.handled += 1;
        let outcome = handle(event, ctx)?;
        if outcome.changed() {
            listeners.applied += 1;
        }
        Ok(outcome)
    }
}
