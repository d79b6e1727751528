use crate::dom::{EventKind, NodeId};

/// Keys the menu reacts to; everything else is `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Escape,
    Enter,
    Space,
    Other,
}

/// An input event dispatched by the host into [`crate::Menu::handle_event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    /// Element the event was dispatched at. For `MouseEnter`/`MouseLeave`
    /// this is the list item the pointer entered or left.
    pub target: NodeId,
    pub key: Key,
    pub shift: bool,
}

impl DomEvent {
    pub const fn click(target: NodeId) -> Self {
        Self {
            kind: EventKind::Click,
            target,
            key: Key::Other,
            shift: false,
        }
    }

    pub const fn key_down(target: NodeId, key: Key, shift: bool) -> Self {
        Self {
            kind: EventKind::KeyDown,
            target,
            key,
            shift,
        }
    }

    pub const fn mouse_enter(target: NodeId) -> Self {
        Self {
            kind: EventKind::MouseEnter,
            target,
            key: Key::Other,
            shift: false,
        }
    }

    pub const fn mouse_leave(target: NodeId) -> Self {
        Self {
            kind: EventKind::MouseLeave,
            target,
            key: Key::Other,
            shift: false,
        }
    }

    pub const fn animation_end(target: NodeId) -> Self {
        Self {
            kind: EventKind::AnimationEnd,
            target,
            key: Key::Other,
            shift: false,
        }
    }
}

/// Result of dispatching an event into a menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEvent {
    /// The event reached one of the menu's listeners and was processed.
    Handled,
    /// No listener of this menu applies (wrong target, not a toggle, ...).
    Ignored,
}

impl MenuEvent {
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}
