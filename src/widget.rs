use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::context::MenuRowContext;
use crate::dom::{Document, NodeId};
use crate::glyphs::{MenuGlyphs, menu_label_line};
use crate::menu::Menu;
use crate::style::MenuViewStyle;

/// One visible menu item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuRow {
    pub item: NodeId,
    pub label: String,
    pub level: u16,
    pub toggle: Option<NodeId>,
    pub is_expanded: bool,
    pub is_focused: bool,
}

/// Visible items of `menu` in document order. Items inside closed sub-menus
/// are hidden, the same way the open class reveals them on a page.
pub fn visible_rows(doc: &Document, menu: &Menu) -> Vec<MenuRow> {
    let mut rows = Vec::new();
    collect_rows(doc, menu, menu.root(), 0, &mut rows);
    rows
}

fn collect_rows(doc: &Document, menu: &Menu, list: NodeId, level: u16, rows: &mut Vec<MenuRow>) {
    let focused = doc.active_element();
    for item in doc.element_children(list).filter(|&n| doc.tag(n) == Some("li")) {
        let children: Vec<_> = doc.element_children(item).collect();
        let anchor = children.iter().copied().find(|&n| doc.tag(n) == Some("a"));
        let toggle = children
            .iter()
            .copied()
            .find(|&n| doc.attr_is(n, "data-menu", "sub-toggle"));
        let label = anchor.map_or_else(|| doc.text_content(item), |a| doc.text_content(a));
        let is_focused = focused.is_some_and(|f| Some(f) == anchor || Some(f) == toggle);
        let sub_menu = toggle.and_then(|t| menu.sub_menu_for(doc, t));
        let is_expanded = toggle.is_some_and(|t| doc.attr_is(t, "aria-expanded", "true"));

        rows.push(MenuRow {
            item,
            label: label.trim().to_owned(),
            level,
            toggle,
            is_expanded,
            is_focused,
        });

        if let Some(sub_menu) = sub_menu.filter(|&ul| menu.is_open(doc, ul)) {
            collect_rows(doc, menu, sub_menu, level.saturating_add(1), rows);
        }
    }
}

/// Terminal rendering of a menu: one line per visible item.
pub struct MenuView<'a> {
    doc: &'a Document,
    menu: &'a Menu,
    style: MenuViewStyle<'a>,
    glyphs: MenuGlyphs<'a>,
}

impl<'a> MenuView<'a> {
    pub const fn new(doc: &'a Document, menu: &'a Menu, style: MenuViewStyle<'a>) -> Self {
        Self {
            doc,
            menu,
            style,
            glyphs: MenuGlyphs::unicode(),
        }
    }

    #[must_use]
    pub const fn glyphs(mut self, glyphs: MenuGlyphs<'a>) -> Self {
        self.glyphs = glyphs;
        self
    }

    fn build_lines<'r>(&self, rows: &'r [MenuRow]) -> Vec<Line<'r>>
    where
        'a: 'r,
    {
        let blank = " ".repeat(self.style.highlight_symbol.chars().count());
        rows.iter()
            .map(|row| {
                let ctx = MenuRowContext {
                    level: row.level,
                    has_sub_menu: row.toggle.is_some(),
                    is_expanded: row.is_expanded,
                    is_focused: row.is_focused,
                    line_style: self.style.line_style,
                };
                let mut line = menu_label_line(&ctx, &row.label, &self.glyphs);
                let marker = if ctx.is_focused {
                    Span::raw(self.style.highlight_symbol)
                } else {
                    Span::raw(blank.clone())
                };
                line.spans.insert(0, marker);
                if ctx.is_focused {
                    line = line.style(self.style.highlight_style);
                } else if ctx.is_expanded {
                    line = line.style(self.style.expanded_style);
                }
                line
            })
            .collect()
    }
}

impl Widget for MenuView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = visible_rows(self.doc, self.menu);

        let mut block = Block::default().borders(self.style.borders);
        if let Some(title) = self.style.title.clone() {
            block = block.title(title);
        }
        block = block
            .style(self.style.block_style)
            .border_style(self.style.border_style);

        let lines = self.build_lines(&rows);
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
