//! Component instances - State, dirty mask, lifecycle and fragment.
//!
//! A component is defined by a [`ComponentDef`]: an instance function that
//! builds the initial state (registering lifecycle callbacks through
//! [`Setup`]) and a fragment constructor that renders that state.
//!
//! # Lifecycle
//!
//! ```text
//! Component::new → instance() → update hook → ready → before-update → fragment()
//!   [target given] → create → intro? → mount → flush
//! mount → on_mount callbacks (next render pass) → after-update callbacks
//! set/update → mark dirty → flush → patch
//! destroy → on_destroy callbacks → fragment.destroy
//! ```
//!
//! Field indices are the component's own convention; each definition exports
//! constants for them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::dirty::DirtyMask;
use super::scheduler::Schedulable;
use super::Runtime;
use crate::dom::NodeId;
use crate::transition::{transition_in, transition_out};
use crate::view::{Fragment, Scope};

/// A deferred teardown function.
pub type Cleanup = Box<dyn FnOnce()>;

type UpdateHook<S> = Box<dyn FnMut(&mut S, &DirtyMask)>;

/// Static description of a component type.
pub trait ComponentDef: 'static {
    type Props;
    type State: 'static;

    /// Build the initial state from props.
    fn instance(props: Self::Props, setup: &mut Setup<Self::State>) -> Self::State;

    /// Build the (not yet created) fragment for this state.
    fn fragment(state: &Self::State, cx: &Scope) -> Box<dyn Fragment<Self::State>>;
}

/// Options for [`Component::new`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InitOptions {
    /// Create and mount into this node, then flush.
    pub target: Option<NodeId>,
    pub anchor: Option<NodeId>,
    /// Play intros on the initial mount.
    pub intro: bool,
}

impl InitOptions {
    pub fn mount_into(target: NodeId) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct Lifecycle {
    on_mount: Vec<Box<dyn FnOnce() -> Option<Cleanup>>>,
    on_destroy: Vec<Cleanup>,
    before_update: Vec<Rc<dyn Fn()>>,
    after_update: Vec<Rc<dyn Fn()>>,
}

/// Registration context handed to [`ComponentDef::instance`].
pub struct Setup<S: 'static> {
    weak: Weak<ComponentCell<S>>,
    scope: Scope,
    lifecycle: Lifecycle,
    update: Option<UpdateHook<S>>,
}

impl<S: 'static> Setup<S> {
    /// Handle to the component being built. Upgrades once setup returns.
    pub fn handle(&self) -> WeakComponent<S> {
        WeakComponent(self.weak.clone())
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn on_mount(&mut self, callback: impl FnOnce() + 'static) {
        self.lifecycle.on_mount.push(Box::new(move || {
            callback();
            None
        }));
    }

    /// Like [`Setup::on_mount`]; the returned cleanup runs on destroy.
    pub fn on_mount_with_cleanup(&mut self, callback: impl FnOnce() -> Cleanup + 'static) {
        self.lifecycle
            .on_mount
            .push(Box::new(move || Some(callback())));
    }

    pub fn on_destroy(&mut self, callback: impl FnOnce() + 'static) {
        self.lifecycle.on_destroy.push(Box::new(callback));
    }

    pub fn before_update(&mut self, callback: impl Fn() + 'static) {
        self.lifecycle.before_update.push(Rc::new(callback));
    }

    pub fn after_update(&mut self, callback: impl Fn() + 'static) {
        self.lifecycle.after_update.push(Rc::new(callback));
    }

    /// Derived-state hook, run before every patch with the pending mask.
    pub fn reactive(&mut self, hook: impl FnMut(&mut S, &DirtyMask) + 'static) {
        self.update = Some(Box::new(hook));
    }
}

pub(crate) struct ComponentCell<S: 'static> {
    scope: Scope,
    state: RefCell<S>,
    dirty: RefCell<DirtyMask>,
    fragment: RefCell<Option<Box<dyn Fragment<S>>>>,
    update_hook: RefCell<Option<UpdateHook<S>>>,
    lifecycle: RefCell<Lifecycle>,
    bound: RefCell<HashMap<usize, Rc<dyn Fn()>>>,
    ready: Cell<bool>,
    skip_bound: Cell<bool>,
    alive: Cell<bool>,
    /// Set when destroy ran while the fragment was taken out for a call.
    deferred_destroy: Cell<Option<bool>>,
}

impl<S: 'static> ComponentCell<S> {
    fn run_update_hook(&self, dirty: &DirtyMask) {
        let mut hook = self.update_hook.borrow_mut();
        if let Some(run) = hook.as_mut() {
            run(&mut self.state.borrow_mut(), dirty);
        }
    }

    fn run_before_update(&self) {
        let callbacks = self.lifecycle.borrow().before_update.clone();
        for callback in callbacks {
            callback();
        }
    }

    fn queue_after_update(&self) {
        let callbacks = self.lifecycle.borrow().after_update.clone();
        for callback in callbacks {
            self.scope.runtime.add_shared_render_callback(callback);
        }
    }

    /// Put back a fragment taken out for a call, or tear it down if the
    /// component was destroyed during that call.
    fn restore_fragment(&self, mut fragment: Box<dyn Fragment<S>>) {
        match self.deferred_destroy.take() {
            Some(detaching) => fragment.destroy(&self.scope, detaching),
            None => *self.fragment.borrow_mut() = Some(fragment),
        }
    }

    fn make_dirty(self: &Rc<Self>, field: usize) {
        let was_clean = self.dirty.borrow().is_clean();
        self.dirty.borrow_mut().mark(field);
        if was_clean {
            self.scope.runtime.enqueue_dirty(self.clone());
        }
    }

    fn changed(self: &Rc<Self>, field: usize) {
        if !self.skip_bound.get() {
            let bound = self.bound.borrow().get(&field).cloned();
            if let Some(bound) = bound {
                bound();
            }
        }
        if self.ready.get() {
            self.make_dirty(field);
        }
    }
}

impl<S: 'static> Schedulable for ComponentCell<S> {
    fn perform_update(&self) {
        if !self.alive.get() {
            self.dirty.borrow_mut().clear();
            return;
        }

        let pending = self.dirty.borrow().clone();
        self.run_update_hook(&pending);
        self.run_before_update();

        let dirty = self.dirty.borrow_mut().take();
        let fragment = self.fragment.borrow_mut().take();
        if let Some(mut fragment) = fragment {
            {
                let state = self.state.borrow();
                fragment.patch(&self.scope, &state, &dirty);
            }
            self.restore_fragment(fragment);
        }

        self.queue_after_update();
    }
}

/// Shared handle to a component instance.
pub struct Component<S: 'static>(Rc<ComponentCell<S>>);

impl<S: 'static> Clone for Component<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Non-owning component handle, for event handlers held by the fragment.
pub struct WeakComponent<S: 'static>(Weak<ComponentCell<S>>);

impl<S: 'static> Clone for WeakComponent<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<S: 'static> WeakComponent<S> {
    pub fn upgrade(&self) -> Option<Component<S>> {
        self.0.upgrade().map(Component)
    }
}

impl<S: 'static> Component<S> {
    /// Instantiate a component. With a target it is created, mounted and
    /// flushed immediately.
    pub fn new<D>(cx: &Scope, props: D::Props, options: InitOptions) -> Self
    where
        D: ComponentDef<State = S>,
    {
        let cell = Rc::new_cyclic(|weak| {
            let mut setup = Setup {
                weak: weak.clone(),
                scope: cx.clone(),
                lifecycle: Lifecycle::default(),
                update: None,
            };
            let state = D::instance(props, &mut setup);
            ComponentCell {
                scope: cx.clone(),
                state: RefCell::new(state),
                dirty: RefCell::new(DirtyMask::clean()),
                fragment: RefCell::new(None),
                update_hook: RefCell::new(setup.update),
                lifecycle: RefCell::new(setup.lifecycle),
                bound: RefCell::new(HashMap::new()),
                ready: Cell::new(false),
                skip_bound: Cell::new(false),
                alive: Cell::new(true),
                deferred_destroy: Cell::new(None),
            }
        });

        cell.run_update_hook(&DirtyMask::clean());
        cell.ready.set(true);
        cell.run_before_update();

        let fragment = D::fragment(&cell.state.borrow(), cx);
        *cell.fragment.borrow_mut() = Some(fragment);

        let component = Component(cell);
        if let Some(target) = options.target {
            component.create();
            if options.intro {
                component.intro(false);
            }
            component.mount(target, options.anchor);
            cx.runtime.flush();
        }
        component
    }

    pub fn downgrade(&self) -> WeakComponent<S> {
        WeakComponent(Rc::downgrade(&self.0))
    }

    pub fn scope(&self) -> &Scope {
        &self.0.scope
    }

    pub fn runtime(&self) -> &Runtime {
        &self.0.scope.runtime
    }

    pub fn is_alive(&self) -> bool {
        self.0.alive.get()
    }

    /// Pending (not yet flushed) field changes.
    pub fn dirty(&self) -> DirtyMask {
        self.0.dirty.borrow().clone()
    }

    /// Read the current state.
    pub fn with_state<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        read(&self.0.state.borrow())
    }

    /// Assign a field; marks it dirty only when the value actually changed.
    pub fn set<T: PartialEq>(
        &self,
        field: usize,
        lens: impl FnOnce(&mut S) -> &mut T,
        value: T,
    ) -> bool {
        if !self.is_alive() {
            return false;
        }
        let changed = {
            let mut state = self.0.state.borrow_mut();
            let slot = lens(&mut state);
            if *slot != value {
                *slot = value;
                true
            } else {
                false
            }
        };
        if changed {
            self.0.changed(field);
        }
        changed
    }

    /// Mutate state in place; `mutate` reports whether `field` changed.
    pub fn update(&self, field: usize, mutate: impl FnOnce(&mut S) -> bool) -> bool {
        if !self.is_alive() {
            return false;
        }
        let changed = mutate(&mut self.0.state.borrow_mut());
        if changed {
            self.0.changed(field);
        }
        changed
    }

    /// Apply props from a parent without firing bound-value callbacks.
    pub fn set_props(&self, apply: impl FnOnce(&Self)) {
        self.0.skip_bound.set(true);
        apply(self);
        self.0.skip_bound.set(false);
    }

    /// Call `callback` whenever `field` changes through this handle.
    pub fn bind(&self, field: usize, callback: impl Fn() + 'static) {
        self.0.bound.borrow_mut().insert(field, Rc::new(callback));
    }

    /// Build the fragment's nodes.
    pub fn create(&self) {
        let state = self.0.state.borrow();
        let mut fragment = self.0.fragment.borrow_mut();
        if let Some(fragment) = fragment.as_mut() {
            fragment.create(&self.0.scope, &state);
        }
    }

    /// Insert the fragment into `target` and queue mount callbacks.
    pub fn mount(&self, target: NodeId, anchor: Option<NodeId>) {
        {
            let mut fragment = self.0.fragment.borrow_mut();
            if let Some(fragment) = fragment.as_mut() {
                fragment.mount(&self.0.scope, target, anchor);
            }
        }

        let weak = Rc::downgrade(&self.0);
        self.0.scope.runtime.add_render_callback(move || {
            let Some(cell) = weak.upgrade() else { return };
            let on_mount = std::mem::take(&mut cell.lifecycle.borrow_mut().on_mount);
            let cleanups: Vec<Cleanup> = on_mount.into_iter().filter_map(|callback| callback()).collect();
            if cell.alive.get() {
                cell.lifecycle.borrow_mut().on_destroy.extend(cleanups);
            } else {
                // Destroyed before its mount callbacks ran
                for cleanup in cleanups {
                    cleanup();
                }
            }
        });

        self.0.queue_after_update();
    }

    /// Play the fragment's intro transitions.
    pub fn intro(&self, local: bool) {
        let fragment = self.0.fragment.borrow_mut().take();
        if let Some(mut fragment) = fragment {
            transition_in(&self.0.scope, Some(fragment.as_mut()), local);
            self.0.restore_fragment(fragment);
        }
    }

    /// Play the fragment's outro transitions; `done` runs when they finish,
    /// which is immediately if the fragment has none.
    pub fn outro(&self, local: bool, done: Option<Cleanup>) {
        let fragment = self.0.fragment.borrow_mut().take();
        match fragment {
            Some(mut fragment) => {
                transition_out(&self.0.scope, Some(fragment.as_mut()), local, done);
                self.0.restore_fragment(fragment);
            }
            None => {
                if let Some(done) = done {
                    done();
                }
            }
        }
    }

    /// Run destroy callbacks and tear down the fragment. Idempotent.
    pub fn destroy(&self, detaching: bool) {
        if !self.0.alive.replace(false) {
            return;
        }
        let on_destroy = std::mem::take(&mut self.0.lifecycle.borrow_mut().on_destroy);
        for callback in on_destroy {
            callback();
        }
        let fragment = self.0.fragment.borrow_mut().take();
        match fragment {
            Some(mut fragment) => fragment.destroy(&self.0.scope, detaching),
            None => self.0.deferred_destroy.set(Some(detaching)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;

    #[derive(Default)]
    struct Counter {
        count: i32,
        doubled: i32,
    }

    impl Counter {
        const COUNT: usize = 0;
        const DOUBLED: usize = 1;
    }

    struct CounterDef;

    impl ComponentDef for CounterDef {
        type Props = (i32, Rc<RefCell<Vec<String>>>);
        type State = Counter;

        fn instance((count, log): Self::Props, setup: &mut Setup<Counter>) -> Counter {
            let mounted = log.clone();
            setup.on_mount_with_cleanup(move || {
                mounted.borrow_mut().push("mount".into());
                let unmounted = mounted.clone();
                Box::new(move || unmounted.borrow_mut().push("mount cleanup".into()))
            });
            let destroyed = log.clone();
            setup.on_destroy(move || destroyed.borrow_mut().push("destroy".into()));
            let before = log.clone();
            setup.before_update(move || before.borrow_mut().push("before".into()));
            let after = log;
            setup.after_update(move || after.borrow_mut().push("after".into()));
            setup.reactive(|state, _dirty| state.doubled = state.count * 2);
            Counter { count, doubled: 0 }
        }

        fn fragment(_state: &Counter, _cx: &Scope) -> Box<dyn Fragment<Counter>> {
            Box::new(CounterView { text: None, patches: 0 })
        }
    }

    struct CounterView {
        text: Option<NodeId>,
        patches: usize,
    }

    impl Fragment<Counter> for CounterView {
        fn create(&mut self, cx: &Scope, ctx: &Counter) {
            self.text = Some(cx.document.text(&ctx.doubled.to_string()));
        }

        fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
            if let Some(text) = self.text {
                cx.document.insert(target, text, anchor);
            }
        }

        fn patch(&mut self, cx: &Scope, ctx: &Counter, dirty: &DirtyMask) {
            self.patches += 1;
            if let (true, Some(text)) = (dirty.any(&[Counter::COUNT, Counter::DOUBLED]), self.text) {
                cx.document.set_data(text, &format!("{} #{}", ctx.doubled, self.patches));
            }
        }

        fn destroy(&mut self, cx: &Scope, detaching: bool) {
            if let (true, Some(text)) = (detaching, self.text.take()) {
                cx.document.detach(text);
            }
        }
    }

    fn mount(count: i32) -> (Scope, Component<Counter>, Rc<RefCell<Vec<String>>>) {
        let cx = Scope::new(Runtime::new(), Dom::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let root = cx.document.root();
        let counter = Component::new::<CounterDef>(&cx, (count, log.clone()), InitOptions::mount_into(root));
        (cx, counter, log)
    }

    fn root_text(cx: &Scope) -> String {
        cx.document.text_content(cx.document.root())
    }

    #[test]
    fn test_initial_render_uses_reactive_hook() {
        let (cx, counter, log) = mount(2);
        assert_eq!(root_text(&cx), "4");
        assert_eq!(counter.with_state(|s| s.doubled), 4);
        assert_eq!(*log.borrow(), vec!["before", "mount", "after"]);
    }

    #[test]
    fn test_set_marks_dirty_only_on_change() {
        let (cx, counter, _log) = mount(1);
        assert!(!counter.set(Counter::COUNT, |s| &mut s.count, 1));
        assert!(counter.dirty().is_clean());

        assert!(counter.set(Counter::COUNT, |s| &mut s.count, 5));
        assert!(counter.dirty().contains(Counter::COUNT));
        assert!(cx.runtime.is_update_scheduled());

        cx.runtime.run_microtasks();
        assert!(counter.dirty().is_clean());
        assert_eq!(root_text(&cx), "10 #1");
    }

    #[test]
    fn test_update_hooks_run_around_patch() {
        let (cx, counter, log) = mount(1);
        log.borrow_mut().clear();
        counter.update(Counter::COUNT, |s| {
            s.count += 1;
            true
        });
        cx.runtime.run_microtasks();
        assert_eq!(*log.borrow(), vec!["before", "after"]);
    }

    #[test]
    fn test_bind_and_set_props() {
        let (_cx, counter, _log) = mount(0);
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        counter.bind(Counter::COUNT, move || f.set(f.get() + 1));

        counter.set(Counter::COUNT, |s| &mut s.count, 1);
        assert_eq!(fired.get(), 1);

        counter.set_props(|c| {
            c.set(Counter::COUNT, |s| &mut s.count, 2);
        });
        assert_eq!(fired.get(), 1);
        assert!(counter.dirty().contains(Counter::COUNT));
    }

    #[test]
    fn test_destroy_runs_callbacks_once() {
        let (cx, counter, log) = mount(1);
        log.borrow_mut().clear();
        counter.destroy(true);
        counter.destroy(true);
        assert_eq!(*log.borrow(), vec!["destroy", "mount cleanup"]);
        assert!(!counter.is_alive());
        assert_eq!(root_text(&cx), "");
        assert!(!counter.set(Counter::COUNT, |s| &mut s.count, 9));
    }

    #[test]
    fn test_outro_without_transitions_completes_immediately() {
        let (cx, counter, _log) = mount(1);
        let handle = counter.clone();
        counter.outro(true, Some(Box::new(move || handle.destroy(true))));
        assert!(!counter.is_alive());
        assert_eq!(root_text(&cx), "");
    }

    #[test]
    fn test_detached_component_waits_for_mount() {
        let cx = Scope::new(Runtime::new(), Dom::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let counter = Component::new::<CounterDef>(&cx, (3, log.clone()), InitOptions::default());
        assert_eq!(root_text(&cx), "");
        assert_eq!(*log.borrow(), vec!["before"]);

        counter.create();
        counter.mount(cx.document.root(), None);
        cx.runtime.flush();
        assert_eq!(root_text(&cx), "6");
        assert!(log.borrow().contains(&"mount".to_string()));
    }
}
