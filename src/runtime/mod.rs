//! Runtime - Event loop state for components and transitions.
//!
//! One [`Runtime`] owns every queue the component system needs:
//! - Scheduler: dirty components, binding/render/flush callbacks, seen-set
//! - Event loop: microtasks, macrotasks, animation-frame callbacks
//! - Frame loop: the shared per-frame transition task set
//! - Styles: the generated keyframe registry and outro groups
//!
//! # Turn Model
//!
//! ```text
//! macrotask (input event, cv load) → microtasks (flush) → frame (transition ticks) → microtasks
//! ```
//!
//! Nothing here is thread-safe. A runtime lives on the UI thread and is shared
//! by cloning its handle (`Rc` inside).

mod clock;
mod component;
mod dirty;
mod frame;
mod scheduler;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use component::{Cleanup, Component, ComponentDef, InitOptions, Setup, WeakComponent};
pub use dirty::DirtyMask;
pub use frame::Task;
pub use scheduler::RenderCallback;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::transition::{OutroState, StyleRegistry};

use frame::FrameState;
use scheduler::SchedulerState;

type Job = Box<dyn FnOnce()>;

pub(crate) struct RuntimeInner {
    clock: Rc<dyn Clock>,
    microtasks: RefCell<VecDeque<Job>>,
    macrotasks: RefCell<VecDeque<Job>>,
    /// Callbacks waiting on the current microtask-level wait, if one is armed.
    waiters: RefCell<Option<Vec<Job>>>,
    scheduler: SchedulerState,
    frames: FrameState,
    pub(crate) styles: StyleRegistry,
    pub(crate) outros: OutroState,
}

/// Handle to the event loop state shared by a tree of components.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

/// Non-owning runtime handle, used by callbacks the runtime itself stores.
#[derive(Clone)]
pub struct WeakRuntime(Weak<RuntimeInner>);

impl WeakRuntime {
    pub fn upgrade(&self) -> Option<Runtime> {
        self.0.upgrade().map(|inner| Runtime { inner })
    }
}

impl Runtime {
    /// Create a runtime on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Rc::new(MonotonicClock::new()))
    }

    /// Create a runtime driven by the given clock.
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                clock,
                microtasks: RefCell::new(VecDeque::new()),
                macrotasks: RefCell::new(VecDeque::new()),
                waiters: RefCell::new(None),
                scheduler: SchedulerState::default(),
                frames: FrameState::default(),
                styles: StyleRegistry::default(),
                outros: OutroState::default(),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakRuntime {
        WeakRuntime(Rc::downgrade(&self.inner))
    }

    pub(crate) fn inner(&self) -> &RuntimeInner {
        &self.inner
    }

    /// Current monotonic time in milliseconds.
    pub fn now(&self) -> f64 {
        self.inner.clock.now()
    }

    pub fn ptr_eq(&self, other: &Runtime) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Microtasks
    // =========================================================================

    /// Queue work to run at the end of the current turn.
    pub fn queue_microtask(&self, job: impl FnOnce() + 'static) {
        self.inner.microtasks.borrow_mut().push_back(Box::new(job));
    }

    /// Drain the microtask queue, including microtasks queued while draining.
    ///
    /// Returns the number of microtasks run.
    pub fn run_microtasks(&self) -> usize {
        let mut count = 0;
        loop {
            let job = self.inner.microtasks.borrow_mut().pop_front();
            let Some(job) = job else { break };
            job();
            count += 1;
        }
        count
    }

    pub fn has_pending_microtasks(&self) -> bool {
        !self.inner.microtasks.borrow().is_empty()
    }

    /// Run `callback` once the shared microtask-level wait resolves.
    ///
    /// Every caller within one turn joins the same wait, so all of them
    /// resume in the same microtask, in call order.
    pub fn wait(&self, callback: impl FnOnce() + 'static) {
        let armed = {
            let mut waiters = self.inner.waiters.borrow_mut();
            let armed = waiters.is_some();
            waiters.get_or_insert_with(Vec::new).push(Box::new(callback));
            armed
        };
        if armed {
            return;
        }

        let weak = self.downgrade();
        self.queue_microtask(move || {
            let Some(runtime) = weak.upgrade() else { return };
            let waiters = runtime.inner.waiters.borrow_mut().take().unwrap_or_default();
            for waiter in waiters {
                waiter();
            }
        });
    }

    // =========================================================================
    // Macrotasks
    // =========================================================================

    /// Queue a macrotask (I/O completion, deferred load).
    pub fn queue_task(&self, job: impl FnOnce() + 'static) {
        self.inner.macrotasks.borrow_mut().push_back(Box::new(job));
    }

    /// Run one macrotask followed by all microtasks it produced.
    ///
    /// Returns false when the macrotask queue was empty.
    pub fn run_next_task(&self) -> bool {
        let job = self.inner.macrotasks.borrow_mut().pop_front();
        let Some(job) = job else { return false };
        job();
        self.run_microtasks();
        true
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.inner.macrotasks.borrow().is_empty()
    }

    /// Run microtasks and macrotasks until both queues are empty.
    ///
    /// Animation frames are not run; see [`Runtime::run_frame`].
    pub fn run_until_idle(&self) {
        self.run_microtasks();
        while self.run_next_task() {}
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("now", &self.now())
            .field("microtasks", &self.inner.microtasks.borrow().len())
            .field("macrotasks", &self.inner.macrotasks.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_microtasks_run_in_order_including_nested() {
        let runtime = Runtime::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let (rt, l) = (runtime.clone(), log.clone());
        runtime.queue_microtask(move || {
            l.borrow_mut().push(1);
            let l2 = l.clone();
            rt.queue_microtask(move || l2.borrow_mut().push(3));
        });
        let l = log.clone();
        runtime.queue_microtask(move || l.borrow_mut().push(2));

        assert_eq!(runtime.run_microtasks(), 3);
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
        assert!(!runtime.has_pending_microtasks());
    }

    #[test]
    fn test_wait_shares_one_microtask() {
        let runtime = Runtime::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let l = log.clone();
            runtime.wait(move || l.borrow_mut().push(i));
        }
        assert!(log.borrow().is_empty());

        assert_eq!(runtime.run_microtasks(), 1);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);

        // A new wait arms a fresh microtask
        let l = log.clone();
        runtime.wait(move || l.borrow_mut().push(9));
        assert_eq!(runtime.run_microtasks(), 1);
        assert_eq!(log.borrow().last(), Some(&9));
    }

    #[test]
    fn test_macrotask_drains_its_microtasks() {
        let runtime = Runtime::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let (rt, l) = (runtime.clone(), log.clone());
        runtime.queue_task(move || {
            l.borrow_mut().push("task");
            let l2 = l.clone();
            rt.queue_microtask(move || l2.borrow_mut().push("micro"));
        });
        let l = log.clone();
        runtime.queue_task(move || l.borrow_mut().push("second"));

        assert!(runtime.run_next_task());
        assert_eq!(*log.borrow(), vec!["task", "micro"]);

        runtime.run_until_idle();
        assert_eq!(*log.borrow(), vec!["task", "micro", "second"]);
        assert!(!runtime.run_next_task());
    }
}
