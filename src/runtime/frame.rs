//! Animation frames and the shared per-frame task loop.
//!
//! `request_animation_frame` callbacks run on the next [`Runtime::run_frame`].
//! Transition tasks share a single frame callback: it is registered when the
//! first task is added and stops re-registering once the task set is empty.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use super::{Runtime, WeakRuntime};

type FrameCallback = Box<dyn FnOnce(f64)>;

struct TaskEntry {
    callback: Box<dyn FnMut(f64) -> bool>,
    aborted: Rc<Cell<bool>>,
}

#[derive(Default)]
pub(crate) struct FrameState {
    callbacks: RefCell<Vec<FrameCallback>>,
    /// Keyed by creation order so tasks tick in the order they were added.
    tasks: RefCell<BTreeMap<u64, TaskEntry>>,
    next_task: Cell<u64>,
    loop_scheduled: Cell<bool>,
}

/// Handle to a running frame-loop task.
pub struct Task {
    id: u64,
    aborted: Rc<Cell<bool>>,
    runtime: WeakRuntime,
}

impl Task {
    /// Stop the task. Takes effect before its next tick.
    pub fn abort(&self) {
        self.aborted.set(true);
        if let Some(runtime) = self.runtime.upgrade() {
            let removed = runtime.inner.frames.tasks.borrow_mut().remove(&self.id);
            drop(removed);
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.get()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("aborted", &self.aborted.get())
            .finish()
    }
}

impl Runtime {
    /// Run `callback` with the frame timestamp on the next frame.
    pub fn request_animation_frame(&self, callback: impl FnOnce(f64) + 'static) {
        self.inner
            .frames
            .callbacks
            .borrow_mut()
            .push(Box::new(callback));
    }

    pub fn has_pending_frame(&self) -> bool {
        !self.inner.frames.callbacks.borrow().is_empty()
    }

    /// Run every frame callback requested before this call, draining
    /// microtasks after each one. Callbacks requested meanwhile wait for the
    /// next frame.
    pub fn run_frame(&self, now: f64) {
        let callbacks = std::mem::take(&mut *self.inner.frames.callbacks.borrow_mut());
        for callback in callbacks {
            callback(now);
            self.run_microtasks();
        }
    }

    /// Run a frame at the clock's current time.
    pub fn run_frame_now(&self) {
        self.run_frame(self.now());
    }

    /// Add a task that runs every frame until it returns false or is aborted.
    pub fn loop_task(&self, callback: impl FnMut(f64) -> bool + 'static) -> Task {
        let frames = &self.inner.frames;
        let id = frames.next_task.get();
        frames.next_task.set(id + 1);

        let aborted = Rc::new(Cell::new(false));
        frames.tasks.borrow_mut().insert(
            id,
            TaskEntry {
                callback: Box::new(callback),
                aborted: aborted.clone(),
            },
        );

        if !frames.loop_scheduled.replace(true) {
            debug!("frame loop started");
            self.schedule_task_loop();
        }

        Task {
            id,
            aborted,
            runtime: self.downgrade(),
        }
    }

    /// Number of tasks still registered with the frame loop.
    pub fn active_task_count(&self) -> usize {
        self.inner.frames.tasks.borrow().len()
    }

    fn schedule_task_loop(&self) {
        let weak = self.downgrade();
        self.request_animation_frame(move |now| {
            if let Some(runtime) = weak.upgrade() {
                runtime.run_tasks(now);
            }
        });
    }

    fn run_tasks(&self, now: f64) {
        let frames = &self.inner.frames;
        let ids: Vec<u64> = frames.tasks.borrow().keys().copied().collect();

        for id in ids {
            // Taken out while running so the callback may add or abort tasks
            let entry = frames.tasks.borrow_mut().remove(&id);
            let Some(mut entry) = entry else { continue };
            if entry.aborted.get() {
                continue;
            }
            let keep = (entry.callback)(now);
            if keep && !entry.aborted.get() {
                frames.tasks.borrow_mut().insert(id, entry);
            }
        }

        if frames.tasks.borrow().is_empty() {
            frames.loop_scheduled.set(false);
            debug!("frame loop idle");
        } else {
            self.schedule_task_loop();
        }
    }
}
