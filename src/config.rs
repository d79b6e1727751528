use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::dom::{Document, NodeId};
use crate::event::DomEvent;

/// Chevron icon appended to every toggle button by default.
pub const DEFAULT_BUTTON_ICON: &str = r#"<svg width="24" height="24" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg" aria-hidden="true" focusable="false"><path d="M17.5 11.6L12 16l-5.5-4.4.9-1.2L12 14l4.5-3.6 1 1.2z"></path></svg>"#;

/// How sub-menus are opened by pointer input.
#[cfg_attr(feature = "serde", derive(Deserialize), serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Action {
    #[default]
    Click,
    Hover,
}

/// `(doc, root, sub_menu, level) -> markup`.
pub type TemplateFn = Arc<dyn Fn(&Document, NodeId, NodeId, u16) -> String>;

/// Button class or icon: fixed text or computed per sub-menu.
#[cfg_attr(feature = "serde", derive(Deserialize), serde(from = "String"))]
#[derive(Clone)]
pub enum Template {
    Static(String),
    Dynamic(TemplateFn),
}

impl Template {
    pub fn dynamic(f: impl Fn(&Document, NodeId, NodeId, u16) -> String + 'static) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    pub fn render(&self, doc: &Document, root: NodeId, sub_menu: NodeId, level: u16) -> String {
        match self {
            Self::Static(text) => text.clone(),
            Self::Dynamic(f) => f(doc, root, sub_menu, level),
        }
    }
}

impl From<String> for Template {
    fn from(value: String) -> Self {
        Self::Static(value)
    }
}

impl From<&str> for Template {
    fn from(value: &str) -> Self {
        Self::Static(value.to_owned())
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// `(heuristic, doc, anchor, level) -> wrap`.
pub type WrapFn = Arc<dyn Fn(bool, &Document, NodeId, u16) -> bool>;

/// Whether the toggle button covers its anchor or sits beside it as an icon.
///
/// `Auto` covers anchors without a destination (missing, empty or `#` href).
#[cfg_attr(feature = "serde", derive(Deserialize), serde(from = "Option<bool>"))]
#[derive(Clone, Default)]
pub enum WrapAnchor {
    #[default]
    Auto,
    Always(bool),
    /// Receives the `Auto` decision and may override it.
    Custom(WrapFn),
}

impl WrapAnchor {
    pub fn custom(f: impl Fn(bool, &Document, NodeId, u16) -> bool + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Resolves the policy for `anchor` at nesting `level`.
    pub fn resolve(&self, doc: &Document, anchor: NodeId, level: u16) -> bool {
        let heuristic = doc
            .attr(anchor, "href")
            .is_none_or(|href| href.is_empty() || href == "#");
        match self {
            Self::Auto => heuristic,
            Self::Always(wrap) => *wrap,
            Self::Custom(f) => f(heuristic, doc, anchor, level),
        }
    }
}

impl From<Option<bool>> for WrapAnchor {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Auto, Self::Always)
    }
}

impl fmt::Debug for WrapAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Always(wrap) => f.debug_tuple("Always").field(wrap).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Lifecycle hooks of a menu. Every method defaults to doing nothing.
pub trait MenuObserver {
    fn before_create(&mut self, _doc: &Document, _root: NodeId) {}
    fn after_create(&mut self, _doc: &Document, _root: NodeId) {}
    fn before_open(&mut self, _doc: &Document, _sub_menu: NodeId, _event: Option<&DomEvent>) {}
    fn after_open(&mut self, _doc: &Document, _sub_menu: NodeId, _event: Option<&DomEvent>) {}
    fn before_close(&mut self, _doc: &Document, _sub_menu: NodeId, _event: Option<&DomEvent>) {}
    fn after_close(&mut self, _doc: &Document, _sub_menu: NodeId, _event: Option<&DomEvent>) {}
}

impl MenuObserver for () {}

/// Menu options. `Default` gives the documented defaults.
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct MenuConfig {
    pub action: Action,
    pub sub_menu_anchor_selector: String,
    pub sub_menu_list_item_selector: String,
    pub open_sub_menu_class: String,
    pub button_class: Template,
    pub visually_hidden_class: String,
    pub expand_child_menu_text: String,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub hover_timeout: Duration,
    pub button_icon: Template,
    pub wrap_anchor: WrapAnchor,
    pub active_list_item_selector: String,
    /// Mostly useful for mobile menus.
    pub open_active_sub_menu_on_create: bool,
    pub close_sub_menu_on_outside_click: bool,
    pub animate_open: bool,
    pub animate_close: bool,
    pub animate_open_class: String,
    pub animate_close_class: String,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub animate_open_max_execution_time: Duration,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub animate_close_max_execution_time: Duration,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub observer: Option<Box<dyn MenuObserver>>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            action: Action::Click,
            sub_menu_anchor_selector: ".menu-item-has-children > a".to_owned(),
            sub_menu_list_item_selector: ".menu-item-has-children".to_owned(),
            open_sub_menu_class: "is-open".to_owned(),
            button_class: Template::Static(String::new()),
            visually_hidden_class: "screen-reader-text".to_owned(),
            expand_child_menu_text: "Sub menu".to_owned(),
            hover_timeout: Duration::from_millis(750),
            button_icon: Template::Static(DEFAULT_BUTTON_ICON.to_owned()),
            wrap_anchor: WrapAnchor::Auto,
            active_list_item_selector: ".current-menu-item".to_owned(),
            open_active_sub_menu_on_create: false,
            close_sub_menu_on_outside_click: true,
            animate_open: false,
            animate_close: false,
            animate_open_class: "animate-open".to_owned(),
            animate_close_class: "animate-close".to_owned(),
            animate_open_max_execution_time: Duration::from_millis(250),
            animate_close_max_execution_time: Duration::from_millis(250),
            observer: None,
        }
    }
}

impl fmt::Debug for MenuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuConfig")
            .field("action", &self.action)
            .field("sub_menu_anchor_selector", &self.sub_menu_anchor_selector)
            .field("sub_menu_list_item_selector", &self.sub_menu_list_item_selector)
            .field("open_sub_menu_class", &self.open_sub_menu_class)
            .field("button_class", &self.button_class)
            .field("hover_timeout", &self.hover_timeout)
            .field("wrap_anchor", &self.wrap_anchor)
            .field("animate_open", &self.animate_open)
            .field("animate_close", &self.animate_close)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl MenuConfig {
    /// Default options with the given interaction mode.
    pub fn new(action: Action) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl MenuObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    #[must_use]
    pub fn with_button_class(mut self, class: impl Into<Template>) -> Self {
        self.button_class = class.into();
        self
    }

    #[must_use]
    pub fn with_button_icon(mut self, icon: impl Into<Template>) -> Self {
        self.button_icon = icon.into();
        self
    }

    #[must_use]
    pub fn with_wrap_anchor(mut self, wrap: WrapAnchor) -> Self {
        self.wrap_anchor = wrap;
        self
    }

    /// Enables both open and close animations.
    #[must_use]
    pub const fn animated(mut self) -> Self {
        self.animate_open = true;
        self.animate_close = true;
        self
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(html: &str) -> (Document, NodeId) {
        let doc = Document::parse(html).unwrap();
        let a = doc.children(doc.document_node())[0];
        (doc, a)
    }

    #[test]
    fn wrap_heuristic_follows_href() {
        for (html, expected) in [
            (r##"<a href="#">x</a>"##, true),
            (r#"<a href="">x</a>"#, true),
            ("<a>x</a>", true),
            (r#"<a href="/about">x</a>"#, false),
        ] {
            let (doc, a) = anchor(html);
            assert_eq!(WrapAnchor::Auto.resolve(&doc, a, 1), expected, "{html}");
        }
    }

    #[test]
    fn wrap_overrides_take_precedence() {
        let (doc, a) = anchor(r#"<a href="/about">x</a>"#);
        assert!(WrapAnchor::Always(true).resolve(&doc, a, 1));

        let deep_only = WrapAnchor::custom(|auto, _, _, level| auto || level > 1);
        assert!(!deep_only.resolve(&doc, a, 1));
        assert!(deep_only.resolve(&doc, a, 2));
    }

    #[test]
    fn templates_render_static_and_dynamic() {
        let (doc, a) = anchor("<a>x</a>");
        assert_eq!(Template::from("btn").render(&doc, a, a, 3), "btn");
        let per_level = Template::dynamic(|_, _, _, level| format!("btn-level-{level}"));
        assert_eq!(per_level.render(&doc, a, a, 3), "btn-level-3");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_plain_options() {
        let config: MenuConfig = serde_json::from_str(
            r#"{"action":"hover","hover_timeout":300,"button_class":"toggle","wrap_anchor":false}"#,
        )
        .unwrap();
        assert_eq!(config.action, Action::Hover);
        assert_eq!(config.hover_timeout, Duration::from_millis(300));
        assert!(matches!(config.button_class, Template::Static(ref c) if c == "toggle"));
        assert!(matches!(config.wrap_anchor, WrapAnchor::Always(false)));
        assert_eq!(config.open_sub_menu_class, "is-open");
    }
}
