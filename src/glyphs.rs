use ratatui::text::{Line, Span};

use crate::context::MenuRowContext;

#[derive(Clone, Copy, Debug)]
pub struct MenuGlyphs<'a> {
    pub indent: &'a str,
    pub leaf: &'a str,
    pub expanded: &'a str,
    pub collapsed: &'a str,
}

impl MenuGlyphs<'static> {
    pub const fn unicode() -> Self {
        Self {
            indent: "  ",
            leaf: "•",
            expanded: "▼",
            collapsed: "▶",
        }
    }

    pub const fn ascii() -> Self {
        Self {
            indent: "  ",
            leaf: "*",
            expanded: "v",
            collapsed: ">",
        }
    }
}

/// Builds the line for one menu item: indentation, expander and label.
pub fn menu_label_line<'a>(ctx: &MenuRowContext, label: &'a str, glyphs: &MenuGlyphs<'a>) -> Line<'a> {
    let expander = if !ctx.has_sub_menu {
        glyphs.leaf
    } else if ctx.is_expanded {
        glyphs.expanded
    } else {
        glyphs.collapsed
    };

    let mut spans = Vec::with_capacity(ctx.level as usize + 3);
    for _ in 0..ctx.level {
        spans.push(Span::styled(glyphs.indent, ctx.line_style));
    }
    spans.push(Span::raw(expander));
    spans.push(Span::raw(" "));
    spans.push(Span::raw(label));
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Style;

    fn ctx(level: u16, has_sub_menu: bool, is_expanded: bool) -> MenuRowContext {
        MenuRowContext {
            level,
            has_sub_menu,
            is_expanded,
            is_focused: false,
            line_style: Style::default(),
        }
    }

    #[test]
    fn expander_reflects_state() {
        let glyphs = MenuGlyphs::ascii();
        assert_eq!(menu_label_line(&ctx(0, true, false), "Docs", &glyphs).to_string(), "> Docs");
        assert_eq!(menu_label_line(&ctx(0, true, true), "Docs", &glyphs).to_string(), "v Docs");
        assert_eq!(menu_label_line(&ctx(2, false, false), "Leaf", &glyphs).to_string(), "    * Leaf");
    }
}
