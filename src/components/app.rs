//! App - The page root.
//!
//! ```text
//! main
//! └── div.content
//!     ├── Header
//!     ├── Profile     "Profile"
//!     ├── Employment  "Employment History"
//!     └── Education   "Education"
//! footer
//! └── Footer
//! ```
//!
//! Child components are instantiated with the fragment and share its
//! lifecycle: created, mounted, introduced and destroyed together.

use crate::cv::{CvSource, Job, School};
use crate::dom::NodeId;
use crate::runtime::{Component, ComponentDef, DirtyMask, InitOptions, Setup};
use crate::transition::presets::TYPEWRITER_SPEED;
use crate::view::{detach_if, Fragment, Scope};

use super::education::Education;
use super::employment::Employment;
use super::footer::Footer;
use super::header::{Header, HeaderProps, HeaderState};
use super::profile::Profile;
use super::section::{SectionProps, SectionState};

/// Section headings.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct SectionTitles {
    pub profile: String,
    pub employment: String,
    pub education: String,
}

impl Default for SectionTitles {
    fn default() -> Self {
        Self {
            profile: "Profile".into(),
            employment: "Employment History".into(),
            education: "Education".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppProps {
    pub source: CvSource,
    pub speed: f64,
    pub titles: SectionTitles,
}

impl AppProps {
    pub fn new(source: CvSource) -> Self {
        Self {
            source,
            speed: TYPEWRITER_SPEED,
            titles: SectionTitles::default(),
        }
    }
}

pub struct App;

impl ComponentDef for App {
    type Props = AppProps;
    type State = AppProps;

    fn instance(props: AppProps, _setup: &mut Setup<AppProps>) -> AppProps {
        props
    }

    fn fragment(state: &AppProps, cx: &Scope) -> Box<dyn Fragment<AppProps>> {
        let section = |title: &str| SectionProps {
            speed: state.speed,
            ..SectionProps::new(title, state.source.clone())
        };
        let detached = InitOptions::default();

        Box::new(AppFragment {
            header: Component::new::<Header>(
                cx,
                HeaderProps {
                    source: state.source.clone(),
                },
                detached,
            ),
            profile: Component::new::<Profile>(cx, section(&state.titles.profile), detached),
            employment: Component::new::<Employment>(cx, section(&state.titles.employment), detached),
            education: Component::new::<Education>(cx, section(&state.titles.education), detached),
            footer: Component::new::<Footer>(cx, (), detached),
            main: None,
            content: None,
            gap: None,
            footer_element: None,
            current: false,
        })
    }
}

struct AppFragment {
    header: Component<HeaderState>,
    profile: Component<SectionState<String>>,
    employment: Component<SectionState<Vec<Job>>>,
    education: Component<SectionState<Vec<School>>>,
    footer: Component<()>,
    main: Option<NodeId>,
    content: Option<NodeId>,
    gap: Option<NodeId>,
    footer_element: Option<NodeId>,
    current: bool,
}

impl AppFragment {
    /// Run `action` on every child, in document order.
    fn each_child(&self, mut action: impl FnMut(&dyn ChildComponent)) {
        action(&self.header);
        action(&self.profile);
        action(&self.employment);
        action(&self.education);
        action(&self.footer);
    }
}

/// Lifecycle operations the App drives on its children.
trait ChildComponent {
    fn create(&self);
    fn intro(&self, local: bool);
    fn outro(&self, local: bool);
    fn destroy(&self, detaching: bool);
}

impl<S: 'static> ChildComponent for Component<S> {
    fn create(&self) {
        Component::create(self);
    }
    fn intro(&self, local: bool) {
        Component::intro(self, local);
    }
    fn outro(&self, local: bool) {
        Component::outro(self, local, None);
    }
    fn destroy(&self, detaching: bool) {
        Component::destroy(self, detaching);
    }
}

impl Fragment<AppProps> for AppFragment {
    fn create(&mut self, cx: &Scope, _ctx: &AppProps) {
        let dom = &cx.document;
        let main = dom.element("main");
        let content = dom.element("div");
        dom.add_class(content, "content");
        dom.append(main, content);
        self.main = Some(main);
        self.content = Some(content);
        self.gap = Some(dom.space());
        self.footer_element = Some(dom.element("footer"));
        self.each_child(|child| child.create());
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        let (Some(main), Some(content), Some(gap), Some(footer)) =
            (self.main, self.content, self.gap, self.footer_element)
        else {
            return;
        };
        let dom = &cx.document;
        dom.insert(target, main, anchor);

        self.header.mount(content, None);
        dom.append(content, dom.space());
        self.profile.mount(content, None);
        dom.append(content, dom.space());
        self.employment.mount(content, None);
        dom.append(content, dom.space());
        self.education.mount(content, None);

        dom.insert(target, gap, anchor);
        dom.insert(target, footer, anchor);
        self.footer.mount(footer, None);
        self.current = true;
    }

    fn patch(&mut self, _cx: &Scope, _ctx: &AppProps, _dirty: &DirtyMask) {}

    fn intro(&mut self, _cx: &Scope, local: bool) {
        if self.current {
            return;
        }
        self.each_child(|child| child.intro(local));
        self.current = true;
    }

    fn outro(&mut self, _cx: &Scope, local: bool) {
        self.each_child(|child| child.outro(local));
        self.current = false;
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        detach_if(cx, detaching, self.main.take());
        detach_if(cx, detaching, self.gap.take());
        detach_if(cx, detaching, self.footer_element.take());
        self.each_child(|child| child.destroy(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;
    use crate::runtime::{ManualClock, Runtime};
    use std::rc::Rc;

    const CV: &str = r#"{
        "details": { "fullName": "Ada Example", "profession": "Engineer" },
        "profile": "Hi.",
        "employment": [{ "job_title": "Dev", "company_name": "Acme", "city_name": "Porto",
                         "employment_period": "2020", "task": ["Ship", "Fix"] }],
        "education": [{ "school_name": "Uni", "period": "2019" }]
    }"#;

    fn mount_app() -> (Scope, Rc<ManualClock>, Component<AppProps>) {
        let clock = Rc::new(ManualClock::new());
        let cx = Scope::new(Runtime::with_clock(clock.clone()), Dom::new());
        let root = cx.document.root();
        let app = Component::new::<App>(&cx, AppProps::new(CvSource::inline(CV)), InitOptions::mount_into(root));
        (cx, clock, app)
    }

    fn settle(cx: &Scope, clock: &ManualClock) {
        cx.runtime.run_until_idle();
        while cx.runtime.has_pending_frame() {
            clock.advance(1000.0);
            cx.runtime.run_frame_now();
        }
    }

    #[test]
    fn test_layout_skeleton() {
        let (cx, _clock, _app) = mount_app();
        let dom = &cx.document;
        let main = dom.find_by_tag("main");
        assert_eq!(main.len(), 1);
        assert_eq!(dom.find_by_tag("footer").len(), 1);
        assert_eq!(dom.find_by_tag("h2").len(), 3);
        let content = dom.children(main[0])[0];
        assert!(dom.has_class(content, "content"));
    }

    #[test]
    fn test_sections_start_collapsed() {
        let (cx, clock, _app) = mount_app();
        settle(&cx, &clock);
        let text = cx.document.text_content(cx.document.root());
        assert!(text.contains("Ada Example"));
        assert!(text.contains("Employment History"));
        assert!(!text.contains("Hi."));
        assert!(!text.contains("Responsibilities"));
    }

    #[test]
    fn test_click_expands_and_types_in() {
        let (cx, clock, _app) = mount_app();
        settle(&cx, &clock);

        let headings = cx.document.find_by_tag("h2");
        cx.document.dispatch(headings[1], "click");
        cx.runtime.run_microtasks();
        assert!(cx.document.has_class(headings[1], "expanded"));

        // Typewriter starts from an empty string
        let spans = cx.document.find_by_tag("span");
        let period = spans
            .into_iter()
            .find(|span| cx.document.parent(*span).is_some_and(|p| cx.document.has_class(p, "profile")))
            .unwrap();
        assert_eq!(cx.document.text_content(period), "");

        settle(&cx, &clock);
        let text = cx.document.text_content(cx.document.root());
        assert!(text.contains("Dev - Acme - Porto"));
        assert!(text.contains("Responsibilities:"));
        assert!(text.contains("Ship"));
        assert!(text.contains("Fix"));
        assert_eq!(cx.document.find_by_tag("li").len(), 2);

        // Collapse removes the body
        cx.document.dispatch(headings[1], "click");
        cx.runtime.run_microtasks();
        assert!(!cx.document.has_class(headings[1], "expanded"));
        assert_eq!(cx.document.find_by_tag("li").len(), 0);
    }

    #[test]
    fn test_destroy_removes_everything() {
        let (cx, _clock, app) = mount_app();
        app.destroy(true);
        assert!(cx.document.children(cx.document.root()).is_empty());
    }
}
