//! Control-flow blocks: conditional and list rendering inside a fragment.
//!
//! Both blocks keep an empty text node as an anchor so that content created
//! later (condition turning true, list growing) lands at the right position.

use crate::dom::NodeId;
use crate::runtime::DirtyMask;
use crate::transition::{transition_in, transition_out};

use super::{detach_if, Fragment, Scope};

type Factory<C> = Box<dyn Fn(&Scope, &C) -> Box<dyn Fragment<C>>>;

// =============================================================================
// IF BLOCK
// =============================================================================

/// Renders its branch while a condition holds.
pub struct IfBlock<C> {
    factory: Factory<C>,
    block: Option<Box<dyn Fragment<C>>>,
    anchor: Option<NodeId>,
}

impl<C> IfBlock<C> {
    pub fn new(factory: impl Fn(&Scope, &C) -> Box<dyn Fragment<C>> + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            block: None,
            anchor: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.block.is_some()
    }

    pub fn create(&mut self, cx: &Scope, ctx: &C, condition: bool) {
        if condition {
            let mut block = (self.factory)(cx, ctx);
            block.create(cx, ctx);
            self.block = Some(block);
        }
        self.anchor = Some(cx.document.empty());
    }

    pub fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        if let Some(block) = self.block.as_mut() {
            block.mount(cx, target, anchor);
        }
        if let Some(own) = self.anchor {
            cx.document.insert(target, own, anchor);
        }
    }

    /// Reconcile with the current condition.
    ///
    /// `entered` replays the intro on an already-present branch (the
    /// condition's field was dirty).
    pub fn patch(&mut self, cx: &Scope, ctx: &C, dirty: &DirtyMask, condition: bool, entered: bool) {
        if !condition {
            if let Some(mut block) = self.block.take() {
                block.destroy(cx, true);
            }
            return;
        }

        if let Some(block) = self.block.as_mut() {
            block.patch(cx, ctx, dirty);
            if entered {
                transition_in(cx, Some(block.as_mut()), true);
            }
            return;
        }

        let mut block = (self.factory)(cx, ctx);
        block.create(cx, ctx);
        transition_in(cx, Some(block.as_mut()), true);
        let parent = self.anchor.and_then(|anchor| cx.document.parent(anchor));
        if let Some(parent) = parent {
            block.mount(cx, parent, self.anchor);
        }
        self.block = Some(block);
    }

    pub fn intro(&mut self, cx: &Scope, local: bool) {
        if let Some(block) = self.block.as_mut() {
            transition_in(cx, Some(block.as_mut()), local);
        }
    }

    pub fn outro(&mut self, cx: &Scope, local: bool) {
        if let Some(block) = self.block.as_mut() {
            transition_out(cx, Some(block.as_mut()), local, None);
        }
    }

    pub fn destroy(&mut self, cx: &Scope, detaching: bool) {
        if let Some(mut block) = self.block.take() {
            block.destroy(cx, detaching);
        }
        detach_if(cx, detaching, self.anchor.take());
    }
}

// =============================================================================
// EACH BLOCK
// =============================================================================

/// Renders one row per item, keyed by index.
pub struct EachBlock<T> {
    factory: Factory<T>,
    rows: Vec<Box<dyn Fragment<T>>>,
    anchor: Option<NodeId>,
}

impl<T> EachBlock<T> {
    pub fn new(factory: impl Fn(&Scope, &T) -> Box<dyn Fragment<T>> + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            rows: Vec::new(),
            anchor: None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn create(&mut self, cx: &Scope, items: &[T]) {
        for item in items {
            let mut row = (self.factory)(cx, item);
            row.create(cx, item);
            self.rows.push(row);
        }
        self.anchor = Some(cx.document.empty());
    }

    pub fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        for row in &mut self.rows {
            row.mount(cx, target, anchor);
        }
        if let Some(own) = self.anchor {
            cx.document.insert(target, own, anchor);
        }
    }

    /// Patch existing rows, create rows for new items, destroy surplus rows.
    pub fn patch(&mut self, cx: &Scope, items: &[T], dirty: &DirtyMask) {
        let parent = self.anchor.and_then(|anchor| cx.document.parent(anchor));

        for (index, item) in items.iter().enumerate() {
            if let Some(row) = self.rows.get_mut(index) {
                row.patch(cx, item, dirty);
                transition_in(cx, Some(row.as_mut()), true);
                continue;
            }
            let mut row = (self.factory)(cx, item);
            row.create(cx, item);
            transition_in(cx, Some(row.as_mut()), true);
            if let Some(parent) = parent {
                row.mount(cx, parent, self.anchor);
            }
            self.rows.push(row);
        }

        for mut row in self.rows.drain(items.len()..) {
            row.destroy(cx, true);
        }
    }

    pub fn intro(&mut self, cx: &Scope, local: bool) {
        for row in &mut self.rows {
            transition_in(cx, Some(row.as_mut()), local);
        }
    }

    pub fn destroy(&mut self, cx: &Scope, detaching: bool) {
        for mut row in self.rows.drain(..) {
            row.destroy(cx, detaching);
        }
        detach_if(cx, detaching, self.anchor.take());
    }
}
