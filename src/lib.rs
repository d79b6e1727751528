//! Accessible dropdown navigation menus built from nested HTML lists.
//!
//! A [`Menu`] takes a `<ul>` inside a [`Document`], inserts a toggle button
//! next to every parent link, wires up ARIA state and reacts to clicks,
//! hover, keyboard input and outside clicks. Timing (hover-close delays,
//! animation timeouts) runs on a virtual clock driven by [`Menu::advance`].
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `Menu::handle_key`.
//! - `serde`: deserialization of [`MenuConfig`].

mod animate;
mod config;
mod context;
pub mod dom;
mod error;
mod event;
mod glyphs;
mod ids;
#[cfg(feature = "keymap")]
mod keymap;
mod menu;
pub mod prelude;
mod style;
mod timer;
mod widget;

pub use animate::{AnimationId, Animator};
pub use config::{
    Action, DEFAULT_BUTTON_ICON, MenuConfig, MenuObserver, Template, TemplateFn, WrapAnchor,
    WrapFn,
};
pub use context::MenuRowContext;
pub use dom::{Document, Element, EventKind, ListenerTarget, NodeId, NodeKind, Selector};
pub use error::{MenuError, Result};
pub use event::{DomEvent, Key, MenuEvent};
pub use glyphs::{MenuGlyphs, menu_label_line};
pub use ids::{DocumentIds, IdAllocator, IdPair};
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, MenuKey, MenuKeyBindings};
pub use menu::Menu;
pub use style::MenuViewStyle;
pub use timer::{TimerId, Timers};
pub use widget::{MenuRow, MenuView, visible_rows};
