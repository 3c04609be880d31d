//! Collapsible Section - A clickable heading over a body that types itself in.
//!
//! ```text
//! h2[.expanded]   name           click → toggle expanded
//! " "
//! {#if expanded}  body           intro: typewriter on each text element
//! ```
//!
//! The body is chosen by a [`SectionBody`]: it picks its data out of the CV
//! document and renders it. Profile, Employment and Education are the three
//! bodies.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::cv::{CvDocument, CvSource, LoadState};
use crate::dom::NodeId;
use crate::runtime::{Cleanup, ComponentDef, DirtyMask, Setup};
use crate::transition::presets::{typewriter, TYPEWRITER_SPEED};
use crate::transition::IntroSlot;
use crate::view::{detach_if, Fragment, IfBlock, Scope};

/// Renders the open state of one section.
pub trait SectionBody: 'static {
    type Data: Clone + PartialEq + 'static;

    fn extract(cv: CvDocument) -> Self::Data;

    fn body(speed: f64) -> Box<dyn Fragment<SectionState<Self::Data>>>;
}

pub struct SectionProps {
    pub name: String,
    pub expanded: bool,
    pub source: CvSource,
    /// Typewriter milliseconds per character.
    pub speed: f64,
}

impl SectionProps {
    pub fn new(name: impl Into<String>, source: CvSource) -> Self {
        Self {
            name: name.into(),
            expanded: false,
            source,
            speed: TYPEWRITER_SPEED,
        }
    }
}

pub struct SectionState<T> {
    pub expanded: bool,
    pub name: String,
    pub data: LoadState<T>,
    pub speed: f64,
    pub toggle: Rc<dyn Fn()>,
}

impl<T> SectionState<T> {
    pub const EXPANDED: usize = 0;
    pub const NAME: usize = 1;
    pub const DATA: usize = 2;
}

pub struct Section<B>(PhantomData<B>);

impl<B: SectionBody> ComponentDef for Section<B> {
    type Props = SectionProps;
    type State = SectionState<B::Data>;

    fn instance(props: SectionProps, setup: &mut Setup<Self::State>) -> Self::State {
        let handle = setup.handle();
        let toggle: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(section) = handle.upgrade() {
                section.update(SectionState::<B::Data>::EXPANDED, |s| {
                    s.expanded = !s.expanded;
                    true
                });
            }
        });

        let handle = setup.handle();
        let runtime = setup.scope().runtime.clone();
        let source = props.source;
        setup.on_mount(move || {
            source.fetch(&runtime, move |loaded| {
                if let Some(section) = handle.upgrade() {
                    section.set(
                        SectionState::<B::Data>::DATA,
                        |s| &mut s.data,
                        loaded.map(B::extract),
                    );
                }
            });
        });

        SectionState {
            expanded: props.expanded,
            name: props.name,
            data: LoadState::Loading,
            speed: props.speed,
            toggle,
        }
    }

    fn fragment(state: &Self::State, _cx: &Scope) -> Box<dyn Fragment<Self::State>> {
        let speed = state.speed;
        Box::new(SectionFragment {
            h2: None,
            title: None,
            gap: None,
            body: IfBlock::new(move |_, _| B::body(speed)),
            toggle: None,
            dispose: None,
        })
    }
}

struct SectionFragment<T: 'static> {
    h2: Option<NodeId>,
    title: Option<NodeId>,
    gap: Option<NodeId>,
    body: IfBlock<SectionState<T>>,
    toggle: Option<Rc<dyn Fn()>>,
    dispose: Option<Cleanup>,
}

impl<T: 'static> Fragment<SectionState<T>> for SectionFragment<T> {
    fn create(&mut self, cx: &Scope, ctx: &SectionState<T>) {
        let dom = &cx.document;
        let h2 = dom.element("h2");
        let title = dom.text(&ctx.name);
        dom.append(h2, title);
        dom.toggle_class(h2, "expanded", ctx.expanded);
        self.h2 = Some(h2);
        self.title = Some(title);
        self.gap = Some(dom.space());
        self.toggle = Some(ctx.toggle.clone());
        self.body.create(cx, ctx, ctx.expanded);
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        let (Some(h2), Some(gap)) = (self.h2, self.gap) else { return };
        cx.document.insert(target, h2, anchor);
        cx.document.insert(target, gap, anchor);
        self.body.mount(cx, target, anchor);
        if self.dispose.is_none() {
            let toggle = self.toggle.clone();
            self.dispose = Some(cx.document.listen(h2, "click", move || {
                if let Some(toggle) = &toggle {
                    toggle();
                }
            }));
        }
    }

    fn patch(&mut self, cx: &Scope, ctx: &SectionState<T>, dirty: &DirtyMask) {
        if let (true, Some(title)) = (dirty.contains(SectionState::<T>::NAME), self.title) {
            cx.document.set_data(title, &ctx.name);
        }
        let toggled = dirty.contains(SectionState::<T>::EXPANDED);
        if let (true, Some(h2)) = (toggled, self.h2) {
            cx.document.toggle_class(h2, "expanded", ctx.expanded);
        }
        self.body.patch(cx, ctx, dirty, ctx.expanded, toggled);
    }

    fn intro(&mut self, cx: &Scope, local: bool) {
        self.body.intro(cx, local);
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        detach_if(cx, detaching, self.h2.take());
        detach_if(cx, detaching, self.gap.take());
        self.body.destroy(cx, detaching);
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

/// Play the typewriter intro on a text element once.
pub(crate) fn type_in(slot: &IntroSlot, cx: &Scope, node: Option<NodeId>, speed: f64) {
    if let Some(node) = node {
        slot.play(cx, node, move |dom, node| typewriter(dom, node, speed));
    }
}

/// Element with a single text child, for typewriter targets.
pub(crate) fn text_element(cx: &Scope, tag: &str, text: &str) -> NodeId {
    let element = cx.document.element(tag);
    cx.document.append(element, cx.document.text(text));
    element
}

/// Replace an element's text when the value changed.
pub(crate) fn update_text(cx: &Scope, node: Option<NodeId>, current: &mut String, next: &str) {
    if current != next {
        current.clear();
        current.push_str(next);
        if let Some(node) = node {
            cx.document.set_text_content(node, next);
        }
    }
}
