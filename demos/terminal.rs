use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::{DefaultTerminal, Frame};

use menu_toolkit::{
    Document, KeymapProfile, Menu, MenuConfig, MenuGlyphs, MenuView, MenuViewStyle,
};

const MARKUP: &str = r##"
<ul id="site-menu">
  <li class="menu-item-has-children"><a href="#">Docs</a>
    <ul>
      <li><a href="/docs/install">Install</a></li>
      <li class="menu-item-has-children"><a href="/docs/guides">Guides</a>
        <ul>
          <li class="current-menu-item"><a href="/docs/guides/menus">Menus</a></li>
          <li><a href="/docs/guides/themes">Themes</a></li>
        </ul>
      </li>
    </ul>
  </li>
  <li class="menu-item-has-children"><a href="#">Community</a>
    <ul>
      <li><a href="/forum">Forum</a></li>
      <li><a href="/chat">Chat</a></li>
    </ul>
  </li>
  <li><a href="/blog">Blog</a></li>
</ul>
"##;

fn render(frame: &mut Frame, doc: &Document, menu: &Menu, style: &MenuViewStyle<'_>) {
    let widget = MenuView::new(doc, menu, style.clone()).glyphs(MenuGlyphs::unicode());
    frame.render_widget(widget, frame.area());
}

fn run_app(
    mut terminal: DefaultTerminal,
    mut doc: Document,
    mut menu: Menu,
    style: MenuViewStyle<'_>,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|frame| render(frame, &doc, &menu, &style))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    break;
                }
                menu.handle_key(&mut doc, key);
            }
        }

        // Hover delays and animation timeouts run on the menu's own clock.
        let now = Instant::now();
        menu.advance(&mut doc, now - last_tick);
        last_tick = now;
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let mut doc = Document::parse(MARKUP).map_err(io::Error::other)?;
    let Some(root) = doc.element_by_id("site-menu") else {
        return Ok(());
    };

    let mut config = MenuConfig::default();
    config.open_active_sub_menu_on_create = true;
    let Some(mut menu) = Menu::create(&mut doc, root, config).map_err(io::Error::other)? else {
        return Ok(());
    };
    menu.keymap_mut().set_profile(KeymapProfile::Vim);

    let mut style = MenuViewStyle::default();
    style.block_style = Style::default()
        .fg(Color::Rgb(221, 227, 235))
        .bg(Color::Rgb(24, 28, 36));
    style.border_style = Style::default().fg(Color::Rgb(92, 110, 140));
    style.expanded_style = Style::default().fg(Color::Rgb(136, 192, 208));
    style.highlight_style = Style::default()
        .fg(Color::Rgb(255, 255, 255))
        .bg(Color::Rgb(52, 66, 96))
        .add_modifier(Modifier::BOLD);
    style.title = Some(Line::from("Tab/j/k: move  Enter: toggle  Esc: close  q: quit"));

    let terminal = ratatui::init();
    let result = run_app(terminal, doc, menu, style);
    ratatui::restore();
    result
}
