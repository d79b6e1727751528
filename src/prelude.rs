pub use crate::{
    Action, Document, DomEvent, Key, Menu, MenuConfig, MenuError, MenuEvent, MenuGlyphs,
    MenuObserver, MenuView, MenuViewStyle, NodeId, Template, WrapAnchor,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, MenuKey, MenuKeyBindings};
