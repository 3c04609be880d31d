//! View Tree - Fragments that build, patch and tear down document nodes.
//!
//! A [`Fragment`] is the rendered form of one component (or one block inside
//! it). It is driven entirely by its owner:
//!
//! ```text
//! create → [intro] → mount → patch* → [outro] → destroy
//! ```
//!
//! `create` builds detached nodes, `mount` inserts them, `patch` reconciles
//! them with new state for the fields in the dirty mask. `intro` and `outro`
//! default to no-ops; fragments with transitions override them.

mod blocks;

pub use blocks::{EachBlock, IfBlock};

use crate::dom::{Dom, NodeId};
use crate::runtime::{DirtyMask, Runtime};

/// Everything a fragment needs to touch the outside world.
#[derive(Clone, Debug)]
pub struct Scope {
    pub runtime: Runtime,
    pub document: Dom,
}

impl Scope {
    pub fn new(runtime: Runtime, document: Dom) -> Self {
        Self { runtime, document }
    }
}

/// Rendered view over a context `C` (usually a component's state).
pub trait Fragment<C> {
    /// Build nodes (not yet attached).
    fn create(&mut self, cx: &Scope, ctx: &C);

    /// Insert the nodes into `target` before `anchor`.
    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>);

    /// Bring the nodes up to date with `ctx` for the fields in `dirty`.
    fn patch(&mut self, cx: &Scope, ctx: &C, dirty: &DirtyMask);

    /// Start enter transitions.
    fn intro(&mut self, _cx: &Scope, _local: bool) {}

    /// Start exit transitions.
    fn outro(&mut self, _cx: &Scope, _local: bool) {}

    /// Tear down; `detaching` removes the fragment's root nodes from the tree.
    fn destroy(&mut self, cx: &Scope, detaching: bool);
}

/// A fragment that renders nothing.
#[derive(Debug, Default)]
pub struct EmptyFragment;

impl<C> Fragment<C> for EmptyFragment {
    fn create(&mut self, _cx: &Scope, _ctx: &C) {}
    fn mount(&mut self, _cx: &Scope, _target: NodeId, _anchor: Option<NodeId>) {}
    fn patch(&mut self, _cx: &Scope, _ctx: &C, _dirty: &DirtyMask) {}
    fn destroy(&mut self, _cx: &Scope, _detaching: bool) {}
}

/// Detach `node` when a fragment is destroyed with `detaching`.
pub(crate) fn detach_if(cx: &Scope, detaching: bool, node: Option<NodeId>) {
    if let (true, Some(node)) = (detaching, node) {
        cx.document.detach(node);
    }
}
