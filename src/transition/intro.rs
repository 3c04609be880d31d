//! Enter transitions.
//!
//! ```text
//! start → [lazy: wait] → go: css rule? → tick(0, 1) → introstart
//!       → every frame: tick(t, 1 - t) → at end: tick(1, 0) → introend → cleanup
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::dom::{Dom, NodeId};
use crate::error::Result;
use crate::runtime::Task;
use crate::view::Scope;

use super::stylesheet::{create_rule, delete_rule};
use super::{TransitionConfig, TransitionFn, TransitionSpec};

struct IntroInner {
    cx: Scope,
    node: NodeId,
    spec: RefCell<Option<TransitionSpec>>,
    /// Set once the spec is resolved.
    config: RefCell<Option<TransitionConfig>>,
    animation: RefCell<Option<String>>,
    task: RefCell<Option<Task>>,
    running: Cell<bool>,
    started: Cell<bool>,
    uid: Cell<u64>,
}

impl IntroInner {
    fn cleanup(&self) {
        let animation = self.animation.borrow_mut().take();
        if let Some(name) = animation {
            delete_rule(&self.cx, self.node, Some(&name));
        }
    }

    fn go(self: &Rc<Self>, config: TransitionConfig) {
        let cx = &self.cx;
        *self.config.borrow_mut() = Some(config.clone());

        if let Some(css) = &config.css {
            let uid = self.uid.get();
            self.uid.set(uid + 1);
            let name = create_rule(
                cx,
                self.node,
                0.0,
                1.0,
                config.duration,
                config.delay,
                config.easing,
                css.as_ref(),
                uid,
            );
            *self.animation.borrow_mut() = Some(name);
        }

        config.run_tick(0.0, 1.0);
        let start = cx.runtime.now() + config.delay;
        let end = start + config.duration;

        let previous = self.task.borrow_mut().take();
        if let Some(task) = previous {
            task.abort();
        }
        self.running.set(true);
        debug!(node = ?self.node, duration = config.duration, "intro started");

        let (document, node) = (cx.document.clone(), self.node);
        cx.runtime.add_render_callback(move || {
            document.dispatch(node, "introstart");
        });
        cx.runtime.schedule_update();

        let inner = self.clone();
        let task = cx.runtime.loop_task(move |now| {
            if !inner.running.get() {
                return false;
            }
            if now >= end {
                config.run_tick(1.0, 0.0);
                inner.cx.document.dispatch(inner.node, "introend");
                inner.cleanup();
                inner.running.set(false);
                return false;
            }
            if now >= start {
                let t = (config.easing)((now - start) / config.duration);
                config.run_tick(t, 1.0 - t);
            }
            inner.running.get()
        });
        *self.task.borrow_mut() = Some(task);
    }
}

/// Handle to an enter transition on one node.
#[derive(Clone)]
pub struct IntroTransition {
    inner: Rc<IntroInner>,
}

/// Build an intro for `node`. The builder runs now; its error aborts this
/// transition only.
pub fn create_in_transition(
    cx: &Scope,
    node: NodeId,
    build: impl FnOnce(&Dom, NodeId) -> Result<TransitionSpec>,
) -> Result<IntroTransition> {
    let spec = build(&cx.document, node)?;
    Ok(IntroTransition {
        inner: Rc::new(IntroInner {
            cx: cx.clone(),
            node,
            spec: RefCell::new(Some(spec)),
            config: RefCell::new(None),
            animation: RefCell::new(None),
            task: RefCell::new(None),
            running: Cell::new(false),
            started: Cell::new(false),
            uid: Cell::new(0),
        }),
    })
}

impl IntroTransition {
    /// Play the transition. Later calls are ignored until [`invalidate`].
    ///
    /// [`invalidate`]: IntroTransition::invalidate
    pub fn start(&self) {
        let inner = &self.inner;
        if inner.started.replace(true) {
            return;
        }
        delete_rule(&inner.cx, inner.node, None);

        // A replay after invalidate reuses the resolved config
        let spec = inner.spec.borrow_mut().take();
        let config = inner.config.borrow().clone();
        match (spec, config) {
            (Some(TransitionSpec::Lazy(compute)), _) => {
                let pending = inner.clone();
                inner.cx.runtime.wait(move || {
                    let inner = pending;
                    let config = compute();
                    inner.go(config);
                });
            }
            (Some(TransitionSpec::Ready(config)), _) | (None, Some(config)) => {
                inner.go(config);
            }
            (None, None) => inner.go(TransitionConfig::none()),
        }
    }

    /// Allow [`start`](IntroTransition::start) to play again.
    pub fn invalidate(&self) {
        self.inner.started.set(false);
    }

    /// Stop early, removing the generated animation.
    pub fn end(&self) {
        let inner = &self.inner;
        if inner.running.get() {
            inner.cleanup();
            inner.running.set(false);
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    pub fn node(&self) -> NodeId {
        self.inner.node
    }
}

// =============================================================================
// INTRO SLOT
// =============================================================================

#[derive(Default)]
enum SlotState {
    #[default]
    Idle,
    Pending,
    Playing(IntroTransition),
    Failed,
}

/// An intro that plays once, from the next render pass.
#[derive(Default, Clone)]
pub struct IntroSlot {
    state: Rc<RefCell<SlotState>>,
}

impl IntroSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the intro unless it already played (or is queued).
    pub fn play(
        &self,
        cx: &Scope,
        node: NodeId,
        build: impl FnOnce(&Dom, NodeId) -> Result<TransitionSpec> + 'static,
    ) {
        if !matches!(*self.state.borrow(), SlotState::Idle) {
            return;
        }
        *self.state.borrow_mut() = SlotState::Pending;

        let build: TransitionFn = Box::new(build);
        let (state, scope) = (self.state.clone(), cx.clone());
        cx.runtime.add_render_callback(move || {
            let next = match create_in_transition(&scope, node, build) {
                Ok(transition) => {
                    transition.start();
                    SlotState::Playing(transition)
                }
                Err(err) => {
                    warn!(node = ?node, error = %err, "intro aborted");
                    SlotState::Failed
                }
            };
            *state.borrow_mut() = next;
        });
    }

    pub fn transition(&self) -> Option<IntroTransition> {
        match &*self.state.borrow() {
            SlotState::Playing(transition) => Some(transition.clone()),
            _ => None,
        }
    }

    /// Stop a running intro (before its node is removed).
    pub fn end(&self) {
        if let Some(transition) = self.transition() {
            transition.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ManualClock, Runtime};
    use std::cell::RefCell;

    fn setup() -> (Scope, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        let cx = Scope::new(Runtime::with_clock(clock.clone()), Dom::new());
        (cx, clock)
    }

    fn recording(log: &Rc<RefCell<Vec<(f64, f64)>>>) -> TransitionConfig {
        let log = log.clone();
        TransitionConfig::default()
            .duration(100.0)
            .tick(move |t, u| log.borrow_mut().push((t, u)))
    }

    #[test]
    fn test_intro_ticks_from_zero_to_one() {
        let (cx, clock) = setup();
        let node = cx.document.element("p");
        let log = Rc::new(RefCell::new(Vec::new()));
        let config = recording(&log);

        let intro = create_in_transition(&cx, node, move |_, _| Ok(config.into())).unwrap();
        intro.start();
        assert!(intro.is_running());
        assert_eq!(log.borrow().first(), Some(&(0.0, 1.0)));

        clock.set(50.0);
        cx.runtime.run_frame_now();
        assert_eq!(log.borrow().last(), Some(&(0.5, 0.5)));

        clock.set(100.0);
        cx.runtime.run_frame_now();
        assert_eq!(log.borrow().last(), Some(&(1.0, 0.0)));
        assert!(!intro.is_running());
        assert_eq!(cx.runtime.active_task_count(), 0);
    }

    #[test]
    fn test_start_twice_plays_once() {
        let (cx, _clock) = setup();
        let node = cx.document.element("p");
        let log = Rc::new(RefCell::new(Vec::new()));
        let config = recording(&log);

        let intro = create_in_transition(&cx, node, move |_, _| Ok(config.into())).unwrap();
        intro.start();
        intro.start();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_lazy_config_waits_for_microtask() {
        let (cx, _clock) = setup();
        let node = cx.document.element("p");
        let log = Rc::new(RefCell::new(Vec::new()));
        let config = recording(&log);

        let intro = create_in_transition(&cx, node, move |_, _| {
            Ok(TransitionSpec::Lazy(Box::new(move || config)))
        })
        .unwrap();
        intro.start();
        assert!(log.borrow().is_empty());

        cx.runtime.run_microtasks();
        assert_eq!(log.borrow().first(), Some(&(0.0, 1.0)));
    }

    #[test]
    fn test_delay_holds_until_start() {
        let (cx, clock) = setup();
        let node = cx.document.element("p");
        let log = Rc::new(RefCell::new(Vec::new()));
        let config = recording(&log).delay(50.0);

        let intro = create_in_transition(&cx, node, move |_, _| Ok(config.into())).unwrap();
        intro.start();
        clock.set(25.0);
        cx.runtime.run_frame_now();
        assert_eq!(log.borrow().len(), 1);

        clock.set(100.0);
        cx.runtime.run_frame_now();
        assert_eq!(log.borrow().last(), Some(&(0.5, 0.5)));
    }

    #[test]
    fn test_events_dispatched() {
        let (cx, clock) = setup();
        let node = cx.document.element("p");
        let events = Rc::new(RefCell::new(Vec::new()));
        for event in ["introstart", "introend"] {
            let e = events.clone();
            let _keep = cx.document.listen(node, event, move || e.borrow_mut().push(event));
        }

        let intro = create_in_transition(&cx, node, |_, _| {
            Ok(TransitionConfig::default().duration(10.0).into())
        })
        .unwrap();
        intro.start();
        cx.runtime.run_microtasks();
        assert_eq!(*events.borrow(), vec!["introstart"]);

        clock.set(10.0);
        cx.runtime.run_frame_now();
        assert_eq!(*events.borrow(), vec!["introstart", "introend"]);
    }

    #[test]
    fn test_end_removes_css_animation() {
        let (cx, _clock) = setup();
        let node = cx.document.element("p");
        let intro = create_in_transition(&cx, node, |_, _| {
            Ok(TransitionConfig::default()
                .css(|t, _| format!("opacity: {t}"))
                .into())
        })
        .unwrap();
        intro.start();
        assert!(cx.document.animation(node).starts_with("__spark_"));
        assert_eq!(cx.document.rule_count(), 1);

        intro.end();
        assert_eq!(cx.document.animation(node), "");
        cx.runtime.run_frame_now();
        assert_eq!(cx.document.rule_count(), 0);
    }

    #[test]
    fn test_slot_plays_once_from_render_pass() {
        let (cx, _clock) = setup();
        let node = cx.document.element("p");
        let builds = Rc::new(Cell::new(0));
        let slot = IntroSlot::new();

        for _ in 0..2 {
            let b = builds.clone();
            slot.play(&cx, node, move |_, _| {
                b.set(b.get() + 1);
                Ok(TransitionConfig::default().into())
            });
        }
        assert!(slot.transition().is_none());

        cx.runtime.flush();
        assert_eq!(builds.get(), 1);
        assert!(slot.transition().is_some_and(|t| t.is_running()));
    }

    #[test]
    fn test_slot_build_error_is_contained() {
        let (cx, _clock) = setup();
        let node = cx.document.element("p");
        let slot = IntroSlot::new();
        slot.play(&cx, node, |_, _| Err(crate::error::Error::transition("no text child")));

        cx.runtime.flush();
        assert!(slot.transition().is_none());
        assert_eq!(cx.runtime.active_task_count(), 0);
    }
}
