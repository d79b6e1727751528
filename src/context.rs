use ratatui::style::Style;

/// Per-row facts handed to the label renderer.
#[derive(Clone, Copy, Debug)]
pub struct MenuRowContext {
    /// Nesting depth; top-level items are 0.
    pub level: u16,
    pub has_sub_menu: bool,
    pub is_expanded: bool,
    pub is_focused: bool,
    pub line_style: Style,
}
