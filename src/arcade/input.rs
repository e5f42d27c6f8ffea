use tracing::warn;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Up,
    Down,
    Left,
    Right,
}

/// Input delivered by the front-end to the running game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Global key press; only reaches a game that holds the key listener.
    Key(Key),
    /// Pointer moved to `x` inside the play field.
    PointerMove { x: f64 },
    /// Pointer clicked at a play field position.
    Click { x: f64, y: f64 },
    /// A memory cell picked by keypad instead of pointer.
    Cell(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// The single process-wide key listener slot.
#[derive(Debug, Default)]
pub struct KeyListeners {
    live: Option<ListenerId>,
    next: u64,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot. Fails while another listener is registered.
    pub fn register(&mut self) -> Result<ListenerId> {
        if self.live.is_some() {
            return Err(Error::ListenerBusy);
        }
        let id = ListenerId(self.next);
        self.next += 1;
        self.live = Some(id);
        Ok(id)
    }

    pub fn unregister(&mut self, id: ListenerId) -> bool {
        if self.live == Some(id) {
            self.live = None;
            true
        } else {
            false
        }
    }

    /// Drop whatever listener is registered, returning it.
    pub fn clear(&mut self) -> Option<ListenerId> {
        let stale = self.live.take();
        if let Some(id) = stale {
            warn!(?id, "dropping stale key listener");
        }
        stale
    }

    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.live == Some(id)
    }

    pub fn live_count(&self) -> usize {
        usize::from(self.live.is_some())
    }
}
