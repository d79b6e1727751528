use std::time::Duration;

use smallvec::SmallVec;

use crate::animate::{AnimationId, Animator};
use crate::config::{Action, MenuConfig, MenuObserver};
use crate::dom::{Document, EventKind, ListenerTarget, NodeId, Selector};
use crate::error::{MenuError, Result};
use crate::event::{DomEvent, Key, MenuEvent};
use crate::ids::{DocumentIds, IdAllocator};
use crate::timer::{TimerId, Timers};

#[cfg(feature = "keymap")]
use crate::keymap::{MenuKey, MenuKeyBindings};
#[cfg(feature = "keymap")]
use crossterm::event::KeyEvent;

const FOCUSABLE_ELEMENTS: &str = "a[href]:not([hidden]), area[href], input:not([disabled]), \
     select:not([disabled]), textarea:not([disabled]), button:not([disabled])";

/// Work scheduled on the menu's timer queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuTask {
    HoverClose(NodeId),
    AnimationTimeout(AnimationId),
}

/// Deferred second half of an animated open or close.
#[derive(Clone, Copy, Debug)]
enum Transition {
    Opened {
        sub_menu: NodeId,
        event: Option<DomEvent>,
    },
    Closed {
        sub_menu: NodeId,
        event: Option<DomEvent>,
    },
}

fn is_toggle(doc: &Document, node: NodeId) -> bool {
    doc.attr_is(node, "data-menu", "sub-toggle")
}

fn is_sub_menu(doc: &Document, node: NodeId) -> bool {
    doc.attr_is(node, "data-menu", "sub-menu")
}

fn is_tag(doc: &Document, node: NodeId, tag: &str) -> bool {
    doc.tag(node) == Some(tag)
}

/// Dropdown menu controller bound to one root element.
///
/// Open state lives in the document only: a sub-menu is open exactly when it
/// carries the configured open class. The controller keeps the per-instance
/// bookkeeping around it (pending hover closes and animations).
pub struct Menu {
    root: NodeId,
    config: MenuConfig,
    observer: Box<dyn MenuObserver>,
    anchor_selector: Selector,
    list_item_selector: Selector,
    active_selector: Selector,
    focusable: Selector,
    timers: Timers<MenuTask>,
    // Pending hover closes, oldest first; at most one per sub-menu.
    hover_timeouts: Vec<(TimerId, NodeId)>,
    animator: Animator<Transition>,
    #[cfg(feature = "keymap")]
    keymap: MenuKeyBindings,
}

impl Menu {
    /// Builds a menu on `root` using [`DocumentIds`] for id allocation.
    ///
    /// Returns `Ok(None)` without touching the document if `root` was already
    /// initialized.
    pub fn create(doc: &mut Document, root: NodeId, config: MenuConfig) -> Result<Option<Self>> {
        Self::create_with_ids(doc, root, config, &mut DocumentIds::new())
    }

    /// Builds a menu on `root` with a custom id allocator.
    pub fn create_with_ids(
        doc: &mut Document,
        root: NodeId,
        mut config: MenuConfig,
        ids: &mut impl IdAllocator,
    ) -> Result<Option<Self>> {
        if !doc.is_element(root) {
            return Err(MenuError::InvalidRoot(root));
        }
        let anchor_selector = Selector::parse(&config.sub_menu_anchor_selector)?;
        let list_item_selector = Selector::parse(&config.sub_menu_list_item_selector)?;
        let active_selector = Selector::parse(&config.active_list_item_selector)?;
        let focusable = Selector::parse(FOCUSABLE_ELEMENTS)?;

        if doc.attr_is(root, "data-menu", "root") {
            log::warn!("menu root {root:?} is already initialized");
            return Ok(None);
        }

        let observer: Box<dyn MenuObserver> = match config.observer.take() {
            Some(observer) => observer,
            None => Box::new(()),
        };
        let mut menu = Self {
            root,
            config,
            observer,
            anchor_selector,
            list_item_selector,
            active_selector,
            focusable,
            timers: Timers::new(),
            hover_timeouts: Vec::new(),
            animator: Animator::new(root),
            #[cfg(feature = "keymap")]
            keymap: MenuKeyBindings::new(),
        };
        menu.build(doc, ids);
        Ok(Some(menu))
    }

    fn build(&mut self, doc: &mut Document, ids: &mut impl IdAllocator) {
        let root = self.root;
        let anchors = doc.query_all(root, &self.anchor_selector);
        let list_items = doc.query_all(root, &self.list_item_selector);

        self.observer.before_create(doc, root);
        doc.set_attr(root, "data-menu", "root");

        for (index, anchor) in anchors.into_iter().enumerate() {
            self.add_toggle(doc, ids, index, anchor);
        }

        if self.config.open_active_sub_menu_on_create {
            self.open_active_sub_menu(doc);
        }

        let node = ListenerTarget::Node(root);
        doc.add_listener(node, EventKind::Click, root);
        doc.add_listener(node, EventKind::KeyDown, root);
        if self.config.close_sub_menu_on_outside_click {
            doc.add_listener(ListenerTarget::Document, EventKind::Click, root);
        }
        if self.config.action == Action::Hover {
            for li in list_items {
                doc.add_listener(ListenerTarget::Node(li), EventKind::MouseEnter, root);
                doc.add_listener(ListenerTarget::Node(li), EventKind::MouseLeave, root);
            }
        }

        self.observer.after_create(doc, root);
        doc.add_class(root, "is-ready");
    }

    fn add_toggle(
        &self,
        doc: &mut Document,
        ids: &mut impl IdAllocator,
        index: usize,
        anchor: NodeId,
    ) {
        let root = self.root;
        let depth = doc
            .ancestors(anchor)
            .take_while(|&n| n != root)
            .filter(|&n| is_tag(doc, n, "ul"))
            .count();
        let level = u16::try_from(depth + 1).unwrap_or(u16::MAX);

        let sub_menu = doc
            .closest(anchor, |n| is_tag(doc, n, "li"))
            .and_then(|li| doc.find_descendant(li, |n| is_tag(doc, n, "ul")));
        let Some(sub_menu) = sub_menu else {
            log::debug!("anchor {anchor:?} has no nested list, skipping toggle");
            return;
        };
        if is_sub_menu(doc, sub_menu) {
            log::debug!("sub-menu {sub_menu:?} already has a toggle, skipping anchor {anchor:?}");
            return;
        }

        let pair = ids.allocate(doc, index);
        let button = doc.create_element("button");
        doc.set_attr(button, "data-menu", "sub-toggle");
        doc.set_attr(button, "aria-expanded", "false");
        doc.set_attr(button, "data-menu-level", level.to_string());
        doc.set_attr(button, "aria-controls", pair.sub_menu.as_str());
        doc.set_attr(sub_menu, "id", pair.sub_menu);
        doc.set_attr(sub_menu, "data-menu", "sub-menu");

        let class = self.button_class(doc, sub_menu, level);
        if !class.is_empty() {
            doc.set_attr(button, "class", class);
        }
        doc.set_attr(button, "type", "button");

        let icon = self.button_icon(doc, sub_menu, level);
        let span = doc.create_element("span");
        let cover = self.config.wrap_anchor.resolve(doc, anchor, level);
        let label = if cover {
            doc.text_content(anchor)
        } else {
            doc.set_attr(span, "class", self.config.visually_hidden_class.as_str());
            self.config.expand_child_menu_text.clone()
        };
        let text = doc.create_text(label);
        doc.append_child(span, text);
        doc.append_child(button, span);
        if !icon.is_empty() {
            let icon = doc.create_raw(icon);
            doc.append_child(button, icon);
        }
        doc.set_attr(button, "data-toggle-type", if cover { "cover" } else { "icon" });
        doc.insert_after(anchor, button);
        // Only once the button is attached does its id count as taken.
        doc.set_attr(button, "id", pair.toggle);
        if cover {
            doc.set_attr(anchor, "hidden", "");
        }
    }

    /// Root element of this menu.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub const fn config(&self) -> &MenuConfig {
        &self.config
    }

    #[cfg(feature = "keymap")]
    /// Returns a mutable reference to the key binding set.
    pub const fn keymap_mut(&mut self) -> &mut MenuKeyBindings {
        &mut self.keymap
    }

    /// Class for the toggle of `sub_menu` at `level`.
    pub fn button_class(&self, doc: &Document, sub_menu: NodeId, level: u16) -> String {
        self.config
            .button_class
            .render(doc, self.root, sub_menu, level)
    }

    /// Icon markup for the toggle of `sub_menu` at `level`.
    pub fn button_icon(&self, doc: &Document, sub_menu: NodeId, level: u16) -> String {
        self.config
            .button_icon
            .render(doc, self.root, sub_menu, level)
    }

    /// Returns `true` if `sub_menu` carries the open class.
    pub fn is_open(&self, doc: &Document, sub_menu: NodeId) -> bool {
        doc.has_class(sub_menu, &self.config.open_sub_menu_class)
    }

    fn is_closing(&self, sub_menu: NodeId) -> bool {
        self.config.animate_close
            && self
                .animator
                .is_pending(sub_menu, &self.config.animate_close_class)
    }

    /// Open sub-menus of this menu in document order.
    pub fn open_sub_menus(&self, doc: &Document) -> Vec<NodeId> {
        doc.descendants(self.root)
            .filter(|&n| is_sub_menu(doc, n) && self.is_open(doc, n))
            .collect()
    }

    /// Toggle button controlling `sub_menu`.
    pub fn toggle_for(&self, doc: &Document, sub_menu: NodeId) -> Option<NodeId> {
        let id = doc.attr(sub_menu, "id")?;
        doc.find_descendant(self.root, |n| doc.attr_is(n, "aria-controls", id))
    }

    /// Sub-menu controlled by `button`, if it lives inside this menu.
    pub fn sub_menu_for(&self, doc: &Document, button: NodeId) -> Option<NodeId> {
        let id = doc.attr(button, "aria-controls")?;
        doc.find_descendant(self.root, |n| doc.attr_is(n, "id", id))
    }

    /// Opens `sub_menu`. No-op if it is already open and not closing.
    pub fn open_sub_menu(&mut self, doc: &mut Document, sub_menu: NodeId, event: Option<&DomEvent>) {
        let closing = self.is_closing(sub_menu);
        if self.is_open(doc, sub_menu) && !closing {
            return;
        }
        log::trace!("opening sub-menu {sub_menu:?}");

        self.observer.before_open(doc, sub_menu, event);

        if let Some(button) = self.toggle_for(doc, sub_menu) {
            doc.set_attr(button, "aria-expanded", "true");
        }
        if closing {
            self.animator.cancel(
                doc,
                &mut self.timers,
                sub_menu,
                &self.config.animate_close_class,
            );
        }
        doc.remove_class(sub_menu, &self.config.animate_close_class);
        doc.add_class(sub_menu, &self.config.open_sub_menu_class);

        let transition = Transition::Opened {
            sub_menu,
            event: event.copied(),
        };
        if self.config.animate_open {
            self.animator.start(
                doc,
                &mut self.timers,
                sub_menu,
                &self.config.animate_open_class,
                Some(transition),
                Some(self.config.animate_open_max_execution_time),
                MenuTask::AnimationTimeout,
            );
        } else {
            self.finish(doc, transition);
        }
    }

    /// Closes `sub_menu`. No-op if it is closed or already closing.
    pub fn close_sub_menu(
        &mut self,
        doc: &mut Document,
        sub_menu: NodeId,
        event: Option<&DomEvent>,
    ) {
        if !self.is_open(doc, sub_menu) || self.is_closing(sub_menu) {
            return;
        }
        log::trace!("closing sub-menu {sub_menu:?}");

        self.observer.before_close(doc, sub_menu, event);

        if let Some(button) = self.toggle_for(doc, sub_menu) {
            doc.set_attr(button, "aria-expanded", "false");
        }
        if self.config.animate_open
            && self.animator.cancel(
                doc,
                &mut self.timers,
                sub_menu,
                &self.config.animate_open_class,
            ) > 0
        {
            doc.remove_class(sub_menu, &self.config.animate_open_class);
        }

        let transition = Transition::Closed {
            sub_menu,
            event: event.copied(),
        };
        if self.config.animate_close {
            self.animator.start(
                doc,
                &mut self.timers,
                sub_menu,
                &self.config.animate_close_class,
                Some(transition),
                Some(self.config.animate_close_max_execution_time),
                MenuTask::AnimationTimeout,
            );
        } else {
            self.finish(doc, transition);
        }
    }

    fn finish(&mut self, doc: &mut Document, transition: Transition) {
        match transition {
            Transition::Opened { sub_menu, event } => {
                doc.remove_class(sub_menu, &self.config.animate_open_class);
                self.observer.after_open(doc, sub_menu, event.as_ref());
            }
            Transition::Closed { sub_menu, event } => {
                doc.remove_class(sub_menu, &self.config.open_sub_menu_class);
                doc.remove_class(sub_menu, &self.config.animate_close_class);
                self.observer.after_close(doc, sub_menu, event.as_ref());
            }
        }
    }

    /// Closes every open sub-menu.
    pub fn close_all_sub_menus(&mut self, doc: &mut Document) {
        for sub_menu in self.open_sub_menus(doc) {
            self.close_sub_menu(doc, sub_menu, None);
        }
    }

    /// Opens the sub-menu chain leading to the active list item, outermost
    /// first. A top-level active item opens its own sub-menu instead.
    pub fn open_active_sub_menu(&mut self, doc: &mut Document) {
        let Some(active) = doc.query(self.root, &self.active_selector) else {
            return;
        };
        let Some(innermost) = doc
            .closest(active, |n| is_sub_menu(doc, n))
            .or_else(|| doc.find_descendant(active, |n| is_sub_menu(doc, n)))
        else {
            return;
        };

        let root = self.root;
        let mut chain: SmallVec<[NodeId; 4]> = doc
            .ancestors(innermost)
            .take_while(|&n| n != root)
            .filter(|&n| is_tag(doc, n, "ul"))
            .collect();
        chain.reverse();
        chain.push(innermost);
        for sub_menu in chain {
            self.open_sub_menu(doc, sub_menu, None);
        }
    }

    /// Dispatches a host event to the listeners this menu installed.
    pub fn handle_event(&mut self, doc: &mut Document, event: &DomEvent) -> MenuEvent {
        let root = self.root;
        let inside = doc.contains(root, event.target);
        let handled = match event.kind {
            EventKind::Click => {
                let mut handled = false;
                if inside && doc.has_listener(ListenerTarget::Node(root), EventKind::Click, root) {
                    handled |= self.handle_toggle_click(doc, event);
                }
                if doc.has_listener(ListenerTarget::Document, EventKind::Click, root) {
                    handled |= self.handle_outside_click(doc, event);
                }
                handled
            }
            EventKind::KeyDown => {
                inside
                    && doc.has_listener(ListenerTarget::Node(root), EventKind::KeyDown, root)
                    && self.handle_key_down(doc, event)
            }
            EventKind::MouseEnter => {
                doc.has_listener(
                    ListenerTarget::Node(event.target),
                    EventKind::MouseEnter,
                    root,
                ) && self.handle_mouse_enter(doc, event)
            }
            EventKind::MouseLeave => {
                doc.has_listener(
                    ListenerTarget::Node(event.target),
                    EventKind::MouseLeave,
                    root,
                ) && self.handle_mouse_leave(doc, event)
            }
            EventKind::AnimationEnd => self.handle_animation_end(doc, event),
        };
        if handled {
            MenuEvent::Handled
        } else {
            MenuEvent::Ignored
        }
    }

    /// Advances the menu clock by `elapsed`, firing due hover closes and
    /// animation timeouts. Returns the number of timers that fired.
    pub fn advance(&mut self, doc: &mut Document, elapsed: Duration) -> usize {
        let deadline = self.timers.now() + elapsed;
        let mut fired = 0;
        while let Some((id, task)) = self.timers.pop_due(deadline) {
            fired += 1;
            match task {
                MenuTask::HoverClose(sub_menu) => {
                    log::trace!("hover timeout closes {sub_menu:?}");
                    self.hover_timeouts.retain(|&(timer, _)| timer != id);
                    self.close_sub_menu(doc, sub_menu, None);
                }
                MenuTask::AnimationTimeout(animation) => {
                    if let Some(transition) = self.animator.timed_out(doc, animation) {
                        self.finish(doc, transition);
                    }
                }
            }
        }
        self.timers.set_now(deadline);
        fired
    }

    /// Number of hover closes waiting to fire.
    pub fn pending_hover_closes(&self) -> usize {
        self.hover_timeouts.len()
    }

    fn handle_toggle_click(&mut self, doc: &mut Document, event: &DomEvent) -> bool {
        let Some(button) = doc.closest(event.target, |n| is_toggle(doc, n)) else {
            return false;
        };
        let Some(sub_menu) = self.sub_menu_for(doc, button) else {
            return false;
        };

        if self.is_open(doc, sub_menu) && !self.is_closing(sub_menu) {
            self.close_sub_menu(doc, sub_menu, Some(event));
        } else {
            let unrelated: Vec<_> = self
                .open_sub_menus(doc)
                .into_iter()
                .filter(|&open| open != sub_menu && !doc.contains(open, sub_menu))
                .collect();
            for open in unrelated {
                self.close_sub_menu(doc, open, None);
            }
            self.open_sub_menu(doc, sub_menu, Some(event));
        }
        true
    }

    fn handle_outside_click(&mut self, doc: &mut Document, event: &DomEvent) -> bool {
        if doc.contains(self.root, event.target) {
            return false;
        }
        let open = self.open_sub_menus(doc);
        if open.is_empty() {
            return false;
        }
        self.close_all_sub_menus(doc);
        true
    }

    fn handle_key_down(&mut self, doc: &mut Document, event: &DomEvent) -> bool {
        let target = event.target;
        let button = if is_toggle(doc, target) {
            Some(target)
        } else {
            doc.closest(target, |n| is_sub_menu(doc, n))
                .and_then(|ul| doc.parent_element(ul))
                .and_then(|parent| doc.find_descendant(parent, |n| is_toggle(doc, n)))
                .or_else(|| doc.closest(target, |n| is_toggle(doc, n)))
        };
        let Some(list_item) = doc.closest(button.unwrap_or(target), |n| is_tag(doc, n, "li"))
        else {
            return false;
        };

        match (event.key, event.shift) {
            (Key::Tab, false) => {
                let last = self.focusable_within(doc, list_item).last().copied();
                if last != Some(target) {
                    return false;
                }
                let closable: Vec<_> = self
                    .open_sub_menus(doc)
                    .into_iter()
                    .filter(|&sub_menu| {
                        self.focusable_within(doc, sub_menu).last() == Some(&target)
                            || !doc.contains(sub_menu, list_item)
                    })
                    .collect();
                self.close_each(doc, closable)
            }
            (Key::Tab, true) => {
                if button != Some(target) {
                    return false;
                }
                let closable: Vec<_> = self
                    .open_sub_menus(doc)
                    .into_iter()
                    .filter(|&sub_menu| !doc.contains(sub_menu, list_item))
                    .collect();
                self.close_each(doc, closable)
            }
            (Key::Escape, _) => {
                let Some(parent_item) = doc
                    .closest(target, |n| is_sub_menu(doc, n))
                    .and_then(|ul| doc.closest(ul, |n| is_tag(doc, n, "li")))
                else {
                    return false;
                };
                if let Some(&first) = self.focusable_within(doc, parent_item).first() {
                    doc.focus(first);
                }
                if let Some(sub_menu) = doc.find_descendant(parent_item, |n| is_sub_menu(doc, n)) {
                    self.close_sub_menu(doc, sub_menu, None);
                }
                true
            }
            _ => false,
        }
    }

    fn close_each(&mut self, doc: &mut Document, sub_menus: Vec<NodeId>) -> bool {
        let any = !sub_menus.is_empty();
        for sub_menu in sub_menus {
            self.close_sub_menu(doc, sub_menu, None);
        }
        any
    }

    fn handle_mouse_enter(&mut self, doc: &mut Document, event: &DomEvent) -> bool {
        let Some(sub_menu) = doc.find_descendant(event.target, |n| is_sub_menu(doc, n)) else {
            return false;
        };

        // Entering a branch keeps it and every branch around it alive.
        self.hover_timeouts.retain(|&(timer, pending)| {
            let keep = pending != sub_menu && !doc.contains(pending, sub_menu);
            if !keep {
                self.timers.cancel(timer);
            }
            keep
        });

        let unrelated: Vec<_> = self
            .open_sub_menus(doc)
            .into_iter()
            .filter(|&open| {
                open != sub_menu && !doc.contains(open, sub_menu) && !doc.contains(sub_menu, open)
            })
            .collect();
        for open in unrelated {
            self.close_sub_menu(doc, open, Some(event));
        }

        self.open_sub_menu(doc, sub_menu, Some(event));
        true
    }

    fn handle_mouse_leave(&mut self, doc: &Document, event: &DomEvent) -> bool {
        let Some(sub_menu) = doc.find_descendant(event.target, |n| is_sub_menu(doc, n)) else {
            return false;
        };
        self.hover_timeouts.retain(|&(timer, pending)| {
            if pending == sub_menu {
                self.timers.cancel(timer);
                false
            } else {
                true
            }
        });
        let timer = self
            .timers
            .schedule(self.config.hover_timeout, MenuTask::HoverClose(sub_menu));
        self.hover_timeouts.push((timer, sub_menu));
        true
    }

    fn handle_animation_end(&mut self, doc: &mut Document, event: &DomEvent) -> bool {
        let root = self.root;
        let listening = std::iter::once(event.target)
            .chain(doc.ancestors(event.target))
            .any(|n| doc.has_listener(ListenerTarget::Node(n), EventKind::AnimationEnd, root));
        if !listening {
            return false;
        }
        let transitions = self.animator.animation_end(doc, &mut self.timers, event.target);
        for transition in transitions {
            self.finish(doc, transition);
        }
        true
    }

    /// Focusable elements inside `element`, skipping those whose nearest
    /// sub-menu is closed.
    pub fn focusable_within(&self, doc: &Document, element: NodeId) -> Vec<NodeId> {
        doc.query_all(element, &self.focusable)
            .into_iter()
            .filter(|&n| {
                doc.closest(n, |a| is_sub_menu(doc, a))
                    .is_none_or(|ul| self.is_open(doc, ul))
            })
            .collect()
    }

    /// Tab order of the whole menu: focusable elements not hidden by any
    /// closed sub-menu.
    pub fn tab_order(&self, doc: &Document) -> Vec<NodeId> {
        let root = self.root;
        doc.query_all(root, &self.focusable)
            .into_iter()
            .filter(|&n| {
                doc.ancestors(n)
                    .take_while(|&a| a != root)
                    .all(|a| !is_sub_menu(doc, a) || self.is_open(doc, a))
            })
            .collect()
    }

    /// Moves focus to the next element in [`Menu::tab_order`] after the
    /// focused one in document order. Focus leaves the menu (blur) past the
    /// last element.
    pub fn focus_next(&self, doc: &mut Document) -> Option<NodeId> {
        let (order, current) = self.ranked_tab_order(doc);
        let next = match current {
            Some(rank) => order.iter().find(|(r, _)| *r > rank),
            None => order.first(),
        }
        .map(|&(_, node)| node);
        self.move_focus(doc, next)
    }

    /// Moves focus to the previous element in [`Menu::tab_order`].
    pub fn focus_prev(&self, doc: &mut Document) -> Option<NodeId> {
        let (order, current) = self.ranked_tab_order(doc);
        let prev = match current {
            Some(rank) => order.iter().rev().find(|(r, _)| *r < rank),
            None => order.last(),
        }
        .map(|&(_, node)| node);
        self.move_focus(doc, prev)
    }

    // Tab order paired with document positions, plus the position of the
    // focused element. The focused element may have just become hidden.
    fn ranked_tab_order(&self, doc: &Document) -> (Vec<(usize, NodeId)>, Option<usize>) {
        let order = self.tab_order(doc);
        let active = doc.active_element();
        let mut ranked = Vec::with_capacity(order.len());
        let mut current = None;
        let mut pending = order.iter().copied().peekable();
        for (rank, node) in doc.descendants(self.root).enumerate() {
            if Some(node) == active {
                current = Some(rank);
            }
            if pending.peek() == Some(&node) {
                ranked.push((rank, node));
                pending.next();
            }
        }
        (ranked, current)
    }

    fn move_focus(&self, doc: &mut Document, node: Option<NodeId>) -> Option<NodeId> {
        match node {
            Some(node) => doc.focus(node),
            None => doc.blur(),
        }
        node
    }

    #[cfg(feature = "keymap")]
    /// Handles a crossterm key against the focused element: dispatches the
    /// keydown, then performs the default action (focus move or activation).
    pub fn handle_key(&mut self, doc: &mut Document, key: KeyEvent) -> MenuEvent {
        let Some(action) = self.keymap.resolve(key) else {
            return MenuEvent::Ignored;
        };
        let Some(target) = doc
            .active_element()
            .filter(|&n| doc.contains(self.root, n))
        else {
            let moved = match action {
                MenuKey::Next => self.focus_next(doc),
                MenuKey::Prev => self.focus_prev(doc),
                MenuKey::Escape | MenuKey::Activate => None,
            };
            return if moved.is_some() {
                MenuEvent::Handled
            } else {
                MenuEvent::Ignored
            };
        };

        match action {
            MenuKey::Next => {
                self.handle_event(doc, &DomEvent::key_down(target, Key::Tab, false));
                self.focus_next(doc);
                MenuEvent::Handled
            }
            MenuKey::Prev => {
                self.handle_event(doc, &DomEvent::key_down(target, Key::Tab, true));
                self.focus_prev(doc);
                MenuEvent::Handled
            }
            MenuKey::Escape => {
                self.handle_event(doc, &DomEvent::key_down(target, Key::Escape, false))
            }
            MenuKey::Activate => {
                self.handle_event(doc, &DomEvent::key_down(target, Key::Enter, false));
                self.handle_event(doc, &DomEvent::click(target))
            }
        }
    }
}
