//! Update Scheduler - Coalesced, ordered re-render passes.
//!
//! State mutations mark components dirty. The first mark on a clean component
//! enqueues it and arms a flush microtask, so a burst of mutations within one
//! turn produces exactly one re-render of each affected component.
//!
//! # Flush Pass
//!
//! ```text
//! repeat {
//!     for each dirty component (enqueue order, including ones added mid-pass):
//!         update hook → before-update callbacks → clear mask → patch fragment
//!         → queue after-update callbacks
//!     binding callbacks (LIFO)
//!     render callbacks (FIFO work queue, shared callbacks fire once per flush)
//! } while components were dirtied
//! flush callbacks (LIFO)
//! ```
//!
//! A flush requested while one is running returns immediately; the running
//! flush picks up whatever the nested request would have handled.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use tracing::{debug, trace};

use super::Runtime;

/// Anything the scheduler can re-render.
pub(crate) trait Schedulable {
    fn perform_update(&self);
}

/// A callback run after components have been patched.
pub enum RenderCallback {
    /// Runs once.
    Once(Box<dyn FnOnce()>),
    /// May be queued repeatedly; runs at most once per flush.
    Shared(Rc<dyn Fn()>),
}

#[derive(Default)]
pub(crate) struct SchedulerState {
    dirty: RefCell<Vec<Rc<dyn Schedulable>>>,
    binding_callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
    render_callbacks: RefCell<VecDeque<RenderCallback>>,
    flush_callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
    seen: RefCell<HashSet<usize>>,
    update_scheduled: Cell<bool>,
    flushing: Cell<bool>,
    flush_count: Cell<u64>,
}

/// Identity of a shared callback for the seen-set.
fn callback_key(callback: &Rc<dyn Fn()>) -> usize {
    Rc::as_ptr(callback) as *const () as usize
}

impl Runtime {
    /// Add a component to the dirty queue and arm a flush.
    pub(crate) fn enqueue_dirty(&self, component: Rc<dyn Schedulable>) {
        self.inner.scheduler.dirty.borrow_mut().push(component);
        self.schedule_update();
    }

    /// Arm a flush for the end of this turn (at most once per turn).
    pub fn schedule_update(&self) {
        let scheduler = &self.inner.scheduler;
        if scheduler.update_scheduled.replace(true) {
            return;
        }
        let weak = self.downgrade();
        self.queue_microtask(move || {
            if let Some(runtime) = weak.upgrade() {
                runtime.flush();
            }
        });
    }

    /// Queue a one-shot render callback.
    pub fn add_render_callback(&self, callback: impl FnOnce() + 'static) {
        self.inner
            .scheduler
            .render_callbacks
            .borrow_mut()
            .push_back(RenderCallback::Once(Box::new(callback)));
    }

    /// Queue a shared render callback (guarded by the per-flush seen-set).
    pub fn add_shared_render_callback(&self, callback: Rc<dyn Fn()>) {
        self.inner
            .scheduler
            .render_callbacks
            .borrow_mut()
            .push_back(RenderCallback::Shared(callback));
    }

    /// Queue a bound-value callback, run after the component pass.
    pub fn add_binding_callback(&self, callback: impl FnOnce() + 'static) {
        self.inner
            .scheduler
            .binding_callbacks
            .borrow_mut()
            .push(Box::new(callback));
    }

    /// Queue a callback that runs once the current (or next) flush completes.
    pub fn add_flush_callback(&self, callback: impl FnOnce() + 'static) {
        self.inner
            .scheduler
            .flush_callbacks
            .borrow_mut()
            .push(Box::new(callback));
    }

    /// Run `callback` after pending state changes have been applied.
    pub fn after_flush(&self, callback: impl FnOnce() + 'static) {
        self.schedule_update();
        self.add_flush_callback(callback);
    }

    pub fn is_flushing(&self) -> bool {
        self.inner.scheduler.flushing.get()
    }

    pub fn is_update_scheduled(&self) -> bool {
        self.inner.scheduler.update_scheduled.get()
    }

    /// Number of components waiting for the next pass.
    pub fn dirty_count(&self) -> usize {
        self.inner.scheduler.dirty.borrow().len()
    }

    /// Number of completed (non-nested) flushes.
    pub fn flush_count(&self) -> u64 {
        self.inner.scheduler.flush_count.get()
    }

    /// Drain pending component updates and render callbacks to a fixed point.
    pub fn flush(&self) {
        let scheduler = &self.inner.scheduler;
        if scheduler.flushing.replace(true) {
            trace!("nested flush suppressed");
            return;
        }

        let mut passes = 0usize;
        let mut updated = 0usize;
        loop {
            passes += 1;

            // Components dirtied during this loop are appended and visited here
            let mut index = 0;
            loop {
                let next = scheduler.dirty.borrow().get(index).cloned();
                let Some(component) = next else { break };
                component.perform_update();
                index += 1;
            }
            updated += index;
            scheduler.dirty.borrow_mut().clear();

            loop {
                let callback = scheduler.binding_callbacks.borrow_mut().pop();
                let Some(callback) = callback else { break };
                callback();
            }

            loop {
                let callback = scheduler.render_callbacks.borrow_mut().pop_front();
                let Some(callback) = callback else { break };
                match callback {
                    RenderCallback::Once(callback) => callback(),
                    RenderCallback::Shared(callback) => {
                        let first_time = scheduler.seen.borrow_mut().insert(callback_key(&callback));
                        if first_time {
                            callback();
                        }
                    }
                }
            }

            if scheduler.dirty.borrow().is_empty() {
                break;
            }
        }

        loop {
            let callback = scheduler.flush_callbacks.borrow_mut().pop();
            let Some(callback) = callback else { break };
            callback();
        }

        scheduler.update_scheduled.set(false);
        scheduler.flushing.set(false);
        scheduler.seen.borrow_mut().clear();
        scheduler.flush_count.set(scheduler.flush_count.get() + 1);
        debug!(passes, updated, "flush complete");
    }
}
