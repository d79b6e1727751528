use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Menu-level meaning of a terminal key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuKey {
    /// Tab: move focus forward.
    Next,
    /// Shift+Tab: move focus backward.
    Prev,
    Escape,
    /// Activate the focused toggle or link.
    Activate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    /// Tab/Shift+Tab, Esc, Enter/Space.
    #[default]
    Default,
    /// Default plus arrow keys and `j`/`k` for focus movement.
    Vim,
}

#[derive(Clone, Copy, Debug)]
pub struct MenuKeyBindings {
    profile: KeymapProfile,
}

impl Default for MenuKeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuKeyBindings {
    pub const fn new() -> Self {
        Self {
            profile: KeymapProfile::Default,
        }
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    pub fn resolve(&self, key: KeyEvent) -> Option<MenuKey> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let common = Self::resolve_common(key);
        if common.is_some() {
            return common;
        }
        match self.profile {
            KeymapProfile::Default => None,
            KeymapProfile::Vim => Self::resolve_vim(key),
        }
    }

    const fn resolve_common(key: KeyEvent) -> Option<MenuKey> {
        match key.code {
            KeyCode::BackTab => Some(MenuKey::Prev),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(MenuKey::Prev),
            KeyCode::Tab => Some(MenuKey::Next),
            KeyCode::Esc => Some(MenuKey::Escape),
            KeyCode::Enter | KeyCode::Char(' ') => Some(MenuKey::Activate),
            _ => None,
        }
    }

    const fn resolve_vim(key: KeyEvent) -> Option<MenuKey> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => Some(MenuKey::Next),
            KeyCode::Up | KeyCode::Char('k') => Some(MenuKey::Prev),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MenuConfig;
    use crate::dom::Document;
    use crate::menu::Menu;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn resolves_default_profile() {
        let keys = MenuKeyBindings::new();
        assert_eq!(keys.resolve(press(KeyCode::Tab)), Some(MenuKey::Next));
        assert_eq!(keys.resolve(press(KeyCode::BackTab)), Some(MenuKey::Prev));
        assert_eq!(
            keys.resolve(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT)),
            Some(MenuKey::Prev)
        );
        assert_eq!(keys.resolve(press(KeyCode::Char(' '))), Some(MenuKey::Activate));
        assert_eq!(keys.resolve(press(KeyCode::Char('j'))), None);
    }

    #[test]
    fn vim_profile_adds_motion_keys() {
        let keys = MenuKeyBindings::with_profile(KeymapProfile::Vim);
        assert_eq!(keys.resolve(press(KeyCode::Char('j'))), Some(MenuKey::Next));
        assert_eq!(keys.resolve(press(KeyCode::Up)), Some(MenuKey::Prev));
        assert_eq!(keys.resolve(press(KeyCode::Esc)), Some(MenuKey::Escape));
    }

    #[test]
    fn keyboard_session_opens_walks_and_closes() {
        let mut doc = Document::parse(
            r##"<ul id="menu"><li class="menu-item-has-children"><a href="#">Docs</a><ul><li><a href="/a">A</a></li><li><a href="/b">B</a></li></ul></li><li><a href="/c">C</a></li></ul>"##,
        )
        .unwrap();
        let root = doc.element_by_id("menu").unwrap();
        let mut menu = Menu::create(&mut doc, root, MenuConfig::default())
            .unwrap()
            .unwrap();

        // Focus the toggle and open it.
        assert!(menu.handle_key(&mut doc, press(KeyCode::Tab)).is_handled());
        let toggle = doc.active_element().unwrap();
        assert_eq!(doc.tag(toggle), Some("button"));
        menu.handle_key(&mut doc, press(KeyCode::Enter));
        assert_eq!(menu.open_sub_menus(&doc).len(), 1);

        // Walk to the last link; tabbing past it closes the branch.
        menu.handle_key(&mut doc, press(KeyCode::Tab));
        menu.handle_key(&mut doc, press(KeyCode::Tab));
        assert_eq!(doc.text_content(doc.active_element().unwrap()), "B");
        menu.handle_key(&mut doc, press(KeyCode::Tab));
        assert!(menu.open_sub_menus(&doc).is_empty());
        assert_eq!(doc.text_content(doc.active_element().unwrap()), "C");

        // Reopen, step inside, and escape back to the toggle.
        menu.handle_key(&mut doc, press(KeyCode::BackTab));
        menu.handle_key(&mut doc, press(KeyCode::Char(' ')));
        menu.handle_key(&mut doc, press(KeyCode::Tab));
        menu.handle_key(&mut doc, press(KeyCode::Esc));
        assert!(menu.open_sub_menus(&doc).is_empty());
        assert_eq!(doc.active_element(), Some(toggle));
    }
}
