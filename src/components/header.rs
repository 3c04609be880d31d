//! Header - Name, profession and contact details.
//!
//! ```text
//! header
//! └── div.container
//!     ├── img[alt]
//!     ├── h1            fullName
//!     ├── span.profession / .location / .phone / .email
//!     └── p.error       (only when the cv failed to load)
//! ```

use crate::cv::{CvSource, Details, LoadState};
use crate::dom::NodeId;
use crate::runtime::{ComponentDef, DirtyMask, Setup};
use crate::view::{detach_if, Fragment, IfBlock, Scope};

/// Alt text of the portrait.
pub const PORTRAIT_ALT: &str = "Portrait";

pub struct HeaderProps {
    pub source: CvSource,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderState {
    pub details: LoadState<Details>,
}

impl HeaderState {
    pub const DETAILS: usize = 0;
}

pub struct Header;

impl ComponentDef for Header {
    type Props = HeaderProps;
    type State = HeaderState;

    fn instance(props: HeaderProps, setup: &mut Setup<HeaderState>) -> HeaderState {
        let handle = setup.handle();
        let runtime = setup.scope().runtime.clone();
        setup.on_mount(move || {
            props.source.fetch(&runtime, move |loaded| {
                if let Some(header) = handle.upgrade() {
                    header.set(
                        HeaderState::DETAILS,
                        |s| &mut s.details,
                        loaded.map(|cv| cv.details),
                    );
                }
            });
        });
        HeaderState::default()
    }

    fn fragment(_state: &HeaderState, _cx: &Scope) -> Box<dyn Fragment<HeaderState>> {
        Box::new(HeaderFragment {
            nodes: None,
            error: IfBlock::new(|_, _| Box::new(ErrorLine { p: None, text: None })),
        })
    }
}

struct HeaderNodes {
    header: NodeId,
    /// fullName, profession, location, phone, email
    fields: [NodeId; 5],
}

fn field_values(state: &HeaderState) -> [String; 5] {
    match state.details.ready() {
        Some(d) => [
            d.full_name.clone(),
            d.profession.clone(),
            d.location.clone(),
            d.phone.clone(),
            d.email.clone(),
        ],
        None => Default::default(),
    }
}

struct HeaderFragment {
    nodes: Option<HeaderNodes>,
    error: IfBlock<HeaderState>,
}

impl Fragment<HeaderState> for HeaderFragment {
    fn create(&mut self, cx: &Scope, ctx: &HeaderState) {
        let dom = &cx.document;
        let header = dom.element("header");
        let container = dom.element("div");
        dom.add_class(container, "container");
        dom.append(header, container);

        let img = dom.element("img");
        dom.attr(img, "alt", Some(PORTRAIT_ALT));
        dom.append(container, img);

        let values = field_values(ctx);
        let tags = ["h1", "span", "span", "span", "span"];
        let classes = [None, Some("profession"), Some("location"), Some("phone"), Some("email")];
        let mut fields = [header; 5];
        for (index, value) in values.iter().enumerate() {
            dom.append(container, dom.space());
            let element = dom.element(tags[index]);
            if let Some(class) = classes[index] {
                dom.add_class(element, class);
            }
            let text = dom.text(value);
            dom.append(element, text);
            dom.append(container, element);
            fields[index] = text;
        }

        self.error.create(cx, ctx, ctx.details.error().is_some());
        self.error.mount(cx, container, None);
        self.nodes = Some(HeaderNodes { header, fields });
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        if let Some(nodes) = &self.nodes {
            cx.document.insert(target, nodes.header, anchor);
        }
    }

    fn patch(&mut self, cx: &Scope, ctx: &HeaderState, dirty: &DirtyMask) {
        if !dirty.contains(HeaderState::DETAILS) {
            return;
        }
        if let Some(nodes) = &self.nodes {
            for (text, value) in nodes.fields.iter().zip(field_values(ctx)) {
                cx.document.set_data(*text, &value);
            }
        }
        self.error
            .patch(cx, ctx, dirty, ctx.details.error().is_some(), false);
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        self.error.destroy(cx, false);
        detach_if(cx, detaching, self.nodes.take().map(|n| n.header));
    }
}

/// `p.error` with the load failure.
struct ErrorLine {
    p: Option<NodeId>,
    text: Option<NodeId>,
}

impl ErrorLine {
    fn message(ctx: &HeaderState) -> String {
        format!("could not load cv: {}", ctx.details.error().unwrap_or_default())
    }
}

impl Fragment<HeaderState> for ErrorLine {
    fn create(&mut self, cx: &Scope, ctx: &HeaderState) {
        let p = cx.document.element("p");
        cx.document.add_class(p, "error");
        let text = cx.document.text(&Self::message(ctx));
        cx.document.append(p, text);
        self.p = Some(p);
        self.text = Some(text);
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        if let Some(p) = self.p {
            cx.document.insert(target, p, anchor);
        }
    }

    fn patch(&mut self, cx: &Scope, ctx: &HeaderState, _dirty: &DirtyMask) {
        if let Some(text) = self.text {
            cx.document.set_data(text, &Self::message(ctx));
        }
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        detach_if(cx, detaching, self.p.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;
    use crate::runtime::{Component, InitOptions, Runtime};

    fn mount(source: CvSource) -> (Scope, Component<HeaderState>) {
        let cx = Scope::new(Runtime::new(), Dom::new());
        let root = cx.document.root();
        let header = Component::new::<Header>(&cx, HeaderProps { source }, InitOptions::mount_into(root));
        (cx, header)
    }

    #[test]
    fn test_details_render_after_load() {
        let (cx, _header) = mount(CvSource::inline(
            r#"{ "details": { "fullName": "Ada Example", "email": "ada@example.org" } }"#,
        ));
        let root = cx.document.root();
        assert_eq!(cx.document.find_by_tag("h1").len(), 1);
        assert!(!cx.document.text_content(root).contains("Ada"));

        cx.runtime.run_until_idle();
        let text = cx.document.text_content(root);
        assert!(text.contains("Ada Example"));
        assert!(text.contains("ada@example.org"));
    }

    #[test]
    fn test_load_failure_shows_error_line() {
        let (cx, header) = mount(CvSource::inline("{ broken"));
        cx.runtime.run_until_idle();

        assert!(header.with_state(|s| s.details.error().is_some()));
        let errors = cx.document.find_by_tag("p");
        assert_eq!(errors.len(), 1);
        assert!(cx.document.has_class(errors[0], "error"));
        assert!(cx.document.text_content(errors[0]).starts_with("could not load cv:"));
    }

    #[test]
    fn test_destroy_detaches() {
        let (cx, header) = mount(CvSource::inline("{}"));
        header.destroy(true);
        assert!(cx.document.children(cx.document.root()).is_empty());
    }
}
