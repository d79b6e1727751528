use crate::dom::Document;

/// Ids linking a toggle button to the sub-menu it controls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdPair {
    pub toggle: String,
    pub sub_menu: String,
}

/// Source of collision-free ids for toggle buttons and sub-menus.
///
/// `index` is the position of the sub-menu anchor among all anchors of the
/// menu being built.
pub trait IdAllocator {
    fn allocate(&mut self, doc: &Document, index: usize) -> IdPair;
}

impl<F> IdAllocator for F
where
    F: FnMut(&Document, usize) -> IdPair,
{
    fn allocate(&mut self, doc: &Document, index: usize) -> IdPair {
        self(doc, index)
    }
}

/// Default allocator: `sub-menu-{n}-{index}` / `sub-menu-toggle-{n}-{index}`.
///
/// `n` starts at 1 and only grows, so it is shared by all anchors of one menu.
/// Each candidate is checked against the document's id index.
#[derive(Clone, Copy, Debug)]
pub struct DocumentIds {
    next: usize,
}

impl Default for DocumentIds {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentIds {
    pub const fn new() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator for DocumentIds {
    fn allocate(&mut self, doc: &Document, index: usize) -> IdPair {
        loop {
            let pair = IdPair {
                toggle: format!("sub-menu-toggle-{}-{index}", self.next),
                sub_menu: format!("sub-menu-{}-{index}", self.next),
            };
            if doc.element_by_id(&pair.sub_menu).is_none() && doc.element_by_id(&pair.toggle).is_none()
            {
                return pair;
            }
            self.next += 1;
        }
    }
}
