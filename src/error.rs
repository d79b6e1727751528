use thiserror::Error;

use crate::dom::NodeId;

/// Fatal errors raised while building a menu or parsing its markup.
///
/// Everything else (a click outside any toggle, a button whose sub-menu went
/// missing, a second initialization of the same root) is not an error and is
/// reported through [`crate::MenuEvent::Ignored`] or a log record instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("menu root {0:?} must be a valid element")]
    InvalidRoot(NodeId),

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("malformed markup at byte {offset}: {reason}")]
    Markup { offset: usize, reason: &'static str },
}

pub type Result<T, E = MenuError> = std::result::Result<T, E>;
