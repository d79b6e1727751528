// Minimal example: build a menu from markup, open a branch, render it.
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::Widget;

use menu_toolkit::{Document, DomEvent, Menu, MenuConfig, MenuView, MenuViewStyle, visible_rows};

const MARKUP: &str = r##"
<nav>
  <ul id="primary-menu">
    <li class="menu-item-has-children"><a href="#">Products</a>
      <ul>
        <li><a href="/products/cli">CLI</a></li>
        <li><a href="/products/sdk">SDK</a></li>
      </ul>
    </li>
    <li><a href="/about">About</a></li>
  </ul>
</nav>
"##;

fn main() -> menu_toolkit::Result<()> {
    let mut doc = Document::parse(MARKUP)?;
    let Some(root) = doc.element_by_id("primary-menu") else {
        return Ok(());
    };

    // `None` means the root was already initialized.
    let Some(mut menu) = Menu::create(&mut doc, root, MenuConfig::default())? else {
        return Ok(());
    };

    // Click the first toggle, as a browser would dispatch it.
    if let Some(toggle) = visible_rows(&doc, &menu).iter().find_map(|row| row.toggle) {
        menu.handle_event(&mut doc, &DomEvent::click(toggle));
    }

    println!("{}", doc.outer_html(root));

    // Render into an in-memory buffer (no terminal required for the example).
    let area = Rect::new(0, 0, 40, 8);
    let mut buffer = Buffer::empty(area);
    MenuView::new(&doc, &menu, MenuViewStyle::default()).render(area, &mut buffer);
    Ok(())
}
