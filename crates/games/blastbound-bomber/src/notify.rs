use std::collections::VecDeque;

/// What produced a notification, so the presentation layer can style it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Boost,
    Pickup,
    Encounter,
    Connection,
    Phase,
}

/// One line of player-facing feedback. The color is the accent the UI
/// should use; nothing in the simulation renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub color: u32,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(kind: NotificationKind, color: u32, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color,
            kind,
        }
    }
}

/// Bounded feed of notifications awaiting display. Oldest entries are
/// dropped when the buffer is full and nobody is draining.
#[derive(Debug)]
pub struct NotificationFeed {
    buf: VecDeque<Notification>,
    cap: usize,
}

impl NotificationFeed {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, note: Notification) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(note);
    }

    /// Take everything pending, in arrival order.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.buf.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(32)
    }
}
