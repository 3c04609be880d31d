//! Exit transitions and outro groups.
//!
//! Outros started between [`group_outros`] and [`check_outros`] share a
//! group. The group's callbacks (usually "destroy the block") run when its
//! last outro finishes, or at `check_outros` if nothing was started.
//!
//! ```text
//! group_outros()
//!     transition_out(block, callback) → block.outro() → create_out_transition ...
//! check_outros()
//! ... frames ... last outro ends → callbacks
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::dom::{Dom, NodeId};
use crate::error::Result;
use crate::runtime::{Cleanup, Runtime};
use crate::view::{Fragment, Scope};

use super::stylesheet::{create_rule, delete_rule};
use super::{TransitionConfig, TransitionSpec};

#[derive(Default)]
struct OutroGroup {
    remaining: Cell<usize>,
    callbacks: RefCell<Vec<Cleanup>>,
    parent: Option<Rc<OutroGroup>>,
}

impl OutroGroup {
    fn run_callbacks(&self) {
        let callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }

    fn finish_one(&self) {
        let remaining = self.remaining.get().saturating_sub(1);
        self.remaining.set(remaining);
        if remaining == 0 {
            self.run_callbacks();
        }
    }
}

#[derive(Default)]
pub(crate) struct OutroState {
    current: RefCell<Option<Rc<OutroGroup>>>,
    /// Fragments currently playing an outro, by address.
    outroing: RefCell<HashSet<usize>>,
}

fn block_key<C>(block: &dyn Fragment<C>) -> usize {
    std::ptr::from_ref(block).cast::<()>() as usize
}

/// Open a new outro group nested in the current one.
pub fn group_outros(runtime: &Runtime) {
    let outros = &runtime.inner().outros;
    let parent = outros.current.borrow_mut().take();
    *outros.current.borrow_mut() = Some(Rc::new(OutroGroup {
        parent,
        ..OutroGroup::default()
    }));
}

/// Close the current group; runs its callbacks now if no outro is pending.
pub fn check_outros(runtime: &Runtime) {
    let outros = &runtime.inner().outros;
    let group = outros.current.borrow_mut().take();
    let Some(group) = group else { return };
    if group.remaining.get() == 0 {
        group.run_callbacks();
    }
    *outros.current.borrow_mut() = group.parent.clone();
}

/// Play a block's intro, cancelling any outro bookkeeping for it.
pub fn transition_in<C>(cx: &Scope, block: Option<&mut dyn Fragment<C>>, local: bool) {
    let Some(block) = block else { return };
    cx.runtime
        .inner()
        .outros
        .outroing
        .borrow_mut()
        .remove(&block_key(block));
    block.intro(cx, local);
}

/// Play a block's outro; `callback` runs once its group completes.
///
/// A block already outroing is left alone. Without an open group, one is
/// opened and closed around this call.
pub fn transition_out<C>(
    cx: &Scope,
    block: Option<&mut dyn Fragment<C>>,
    local: bool,
    callback: Option<Cleanup>,
) {
    let Some(block) = block else { return };
    let key = block_key(block);
    let outros = &cx.runtime.inner().outros;
    if !outros.outroing.borrow_mut().insert(key) {
        return;
    }

    let implicit = outros.current.borrow().is_none();
    if implicit {
        group_outros(&cx.runtime);
    }

    let group = outros.current.borrow().clone();
    if let Some(group) = group {
        let weak = cx.runtime.downgrade();
        group.callbacks.borrow_mut().push(Box::new(move || {
            if let Some(runtime) = weak.upgrade() {
                runtime.inner().outros.outroing.borrow_mut().remove(&key);
            }
            if let Some(callback) = callback {
                callback();
            }
        }));
    }

    block.outro(cx, local);

    if implicit {
        check_outros(&cx.runtime);
    }
}

// =============================================================================
// OUT TRANSITION
// =============================================================================

struct OutroInner {
    cx: Scope,
    node: NodeId,
    group: Rc<OutroGroup>,
    config: RefCell<Option<TransitionConfig>>,
    animation: RefCell<Option<String>>,
    running: Cell<bool>,
}

impl OutroInner {
    fn go(self: &Rc<Self>, config: TransitionConfig) {
        let cx = &self.cx;
        *self.config.borrow_mut() = Some(config.clone());

        if let Some(css) = &config.css {
            let name = create_rule(
                cx,
                self.node,
                1.0,
                0.0,
                config.duration,
                config.delay,
                config.easing,
                css.as_ref(),
                0,
            );
            *self.animation.borrow_mut() = Some(name);
        }

        let start = cx.runtime.now() + config.delay;
        let end = start + config.duration;
        debug!(node = ?self.node, duration = config.duration, "outro started");

        let (document, node) = (cx.document.clone(), self.node);
        cx.runtime.add_render_callback(move || {
            document.dispatch(node, "outrostart");
        });
        cx.runtime.schedule_update();

        // The task is never aborted; ending an outro clears `running`
        let inner = self.clone();
        let _task = cx.runtime.loop_task(move |now| {
            if !inner.running.get() {
                return false;
            }
            if now >= end {
                config.run_tick(0.0, 1.0);
                inner.cx.document.dispatch(inner.node, "outroend");
                inner.running.set(false);
                inner.group.finish_one();
                return false;
            }
            if now >= start {
                let t = (config.easing)((now - start) / config.duration);
                config.run_tick(1.0 - t, t);
            }
            inner.running.get()
        });
    }
}

/// Handle to an exit transition on one node.
#[derive(Clone)]
pub struct OutroTransition {
    inner: Rc<OutroInner>,
}

/// Start an outro for `node` in the current group.
pub fn create_out_transition(
    cx: &Scope,
    node: NodeId,
    build: impl FnOnce(&Dom, NodeId) -> Result<TransitionSpec>,
) -> Result<OutroTransition> {
    let spec = build(&cx.document, node)?;

    let current = cx.runtime.inner().outros.current.borrow().clone();
    let group = current.unwrap_or_default();
    group.remaining.set(group.remaining.get() + 1);

    let inner = Rc::new(OutroInner {
        cx: cx.clone(),
        node,
        group,
        config: RefCell::new(None),
        animation: RefCell::new(None),
        running: Cell::new(true),
    });

    match spec {
        TransitionSpec::Ready(config) => inner.go(config),
        TransitionSpec::Lazy(compute) => {
            let pending = inner.clone();
            cx.runtime.wait(move || {
                pending.go(compute());
            });
        }
    }

    Ok(OutroTransition { inner })
}

impl OutroTransition {
    /// Stop early; `reset` snaps the node back to its visible state.
    pub fn end(&self, reset: bool) {
        let inner = &self.inner;
        if reset {
            let config = inner.config.borrow().clone();
            if let Some(config) = config {
                config.run_tick(1.0, 0.0);
            }
        }
        if inner.running.replace(false) {
            let animation = inner.animation.borrow_mut().take();
            if let Some(name) = animation {
                delete_rule(&inner.cx, inner.node, Some(&name));
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{DirtyMask, ManualClock};

    fn setup() -> (Scope, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        let cx = Scope::new(Runtime::with_clock(clock.clone()), Dom::new());
        (cx, clock)
    }

    /// A paragraph that fades out over 100ms.
    struct Fading {
        node: Option<NodeId>,
        outro: Option<OutroTransition>,
        intros: Rc<Cell<usize>>,
    }

    impl Fragment<()> for Fading {
        fn create(&mut self, cx: &Scope, _ctx: &()) {
            self.node = Some(cx.document.element("p"));
        }
        fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
            if let Some(node) = self.node {
                cx.document.insert(target, node, anchor);
            }
        }
        fn patch(&mut self, _cx: &Scope, _ctx: &(), _dirty: &DirtyMask) {}
        fn intro(&mut self, _cx: &Scope, _local: bool) {
            self.intros.set(self.intros.get() + 1);
        }
        fn outro(&mut self, cx: &Scope, _local: bool) {
            let Some(node) = self.node else { return };
            self.outro = create_out_transition(cx, node, |_, _| {
                Ok(TransitionConfig::default().duration(100.0).into())
            })
            .ok();
        }
        fn destroy(&mut self, cx: &Scope, detaching: bool) {
            crate::view::detach_if(cx, detaching, self.node.take());
        }
    }

    fn fading() -> Fading {
        Fading {
            node: None,
            outro: None,
            intros: Rc::new(Cell::new(0)),
        }
    }

    #[test]
    fn test_outro_ticks_from_one_to_zero() {
        let (cx, clock) = setup();
        let node = cx.document.element("p");
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();

        group_outros(&cx.runtime);
        let outro = create_out_transition(&cx, node, move |_, _| {
            Ok(TransitionConfig::default()
                .duration(100.0)
                .tick(move |t, u| l.borrow_mut().push((t, u)))
                .into())
        })
        .unwrap();
        check_outros(&cx.runtime);

        clock.set(50.0);
        cx.runtime.run_frame_now();
        assert_eq!(log.borrow().last(), Some(&(0.5, 0.5)));

        clock.set(100.0);
        cx.runtime.run_frame_now();
        assert_eq!(log.borrow().last(), Some(&(0.0, 1.0)));
        assert!(!outro.is_running());
        assert_eq!(cx.runtime.active_task_count(), 0);
    }

    #[test]
    fn test_group_callbacks_wait_for_last_outro() {
        let (cx, clock) = setup();
        let root = cx.document.root();
        let done = Rc::new(Cell::new(false));

        let mut first = fading();
        let mut second = fading();
        first.create(&cx, &());
        second.create(&cx, &());
        first.mount(&cx, root, None);
        second.mount(&cx, root, None);

        group_outros(&cx.runtime);
        let d = done.clone();
        transition_out(&cx, Some(&mut first as &mut dyn Fragment<()>), false, Some(Box::new(move || d.set(true))));
        transition_out(&cx, Some(&mut second as &mut dyn Fragment<()>), false, None);
        check_outros(&cx.runtime);
        assert!(!done.get());

        clock.set(100.0);
        cx.runtime.run_frame_now();
        assert!(done.get());
    }

    #[test]
    fn test_group_without_outros_completes_at_check() {
        let (cx, _clock) = setup();
        let done = Rc::new(Cell::new(false));
        let mut block = crate::view::EmptyFragment;

        let d = done.clone();
        transition_out(&cx, Some(&mut block as &mut dyn Fragment<()>), false, Some(Box::new(move || d.set(true))));
        assert!(done.get());
    }

    #[test]
    fn test_outroing_block_not_restarted() {
        let (cx, _clock) = setup();
        let root = cx.document.root();
        let mut block = fading();
        block.create(&cx, &());
        block.mount(&cx, root, None);

        group_outros(&cx.runtime);
        transition_out(&cx, Some(&mut block as &mut dyn Fragment<()>), false, None);
        transition_out(&cx, Some(&mut block as &mut dyn Fragment<()>), false, None);
        check_outros(&cx.runtime);
        assert_eq!(cx.runtime.active_task_count(), 1);

        // Intro cancels the bookkeeping
        transition_in(&cx, Some(&mut block as &mut dyn Fragment<()>), false);
        assert_eq!(block.intros.get(), 1);
        assert!(cx.runtime.inner().outros.outroing.borrow().is_empty());
    }

    #[test]
    fn test_end_with_reset_restores_visible_state() {
        let (cx, _clock) = setup();
        let node = cx.document.element("p");
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();

        let outro = create_out_transition(&cx, node, move |_, _| {
            Ok(TransitionConfig::default()
                .tick(move |t, _| l.borrow_mut().push(t))
                .css(|t, _| format!("opacity: {t}"))
                .into())
        })
        .unwrap();
        assert_eq!(cx.document.rule_count(), 1);

        outro.end(true);
        assert!(!outro.is_running());
        assert_eq!(log.borrow().last(), Some(&1.0));
        assert_eq!(cx.document.animation(node), "");

        cx.runtime.run_frame_now();
        assert_eq!(cx.runtime.active_task_count(), 0);
        assert_eq!(cx.document.rule_count(), 0);
    }
}
