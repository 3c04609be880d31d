//! Footer - Credits line.

use crate::dom::NodeId;
use crate::runtime::{ComponentDef, DirtyMask, Setup};
use crate::view::{detach_if, Fragment, Scope};

/// (label, href) of each credited link, in order.
pub const CREDITS: [(&str, &str); 3] = [
    ("crossterm", "https://github.com/crossterm-rs/crossterm"),
    ("serde", "https://serde.rs"),
    ("tracing", "https://github.com/tokio-rs/tracing"),
];

pub struct Footer;

impl ComponentDef for Footer {
    type Props = ();
    type State = ();

    fn instance(_props: (), _setup: &mut Setup<()>) {}

    fn fragment(_state: &(), _cx: &Scope) -> Box<dyn Fragment<()>> {
        Box::new(FooterFragment { p: None })
    }
}

struct FooterFragment {
    p: Option<NodeId>,
}

impl Fragment<()> for FooterFragment {
    fn create(&mut self, cx: &Scope, _ctx: &()) {
        let dom = &cx.document;
        let p = dom.element("p");
        dom.append(p, dom.text("Built with "));
        for (index, &(label, href)) in CREDITS.iter().enumerate() {
            if index > 0 {
                let separator = if index + 1 == CREDITS.len() { " and " } else { ", " };
                dom.append(p, dom.text(separator));
            }
            let link = dom.element("a");
            dom.attr(link, "href", Some(href));
            dom.append(link, dom.text(label));
            dom.append(p, link);
        }
        dom.append(p, dom.text("."));
        self.p = Some(p);
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        if let Some(p) = self.p {
            cx.document.insert(target, p, anchor);
        }
    }

    fn patch(&mut self, _cx: &Scope, _ctx: &(), _dirty: &DirtyMask) {}

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        detach_if(cx, detaching, self.p.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;
    use crate::runtime::{Component, InitOptions, Runtime};

    #[test]
    fn test_credits_line() {
        let cx = Scope::new(Runtime::new(), Dom::new());
        let root = cx.document.root();
        let _footer = Component::new::<Footer>(&cx, (), InitOptions::mount_into(root));

        assert_eq!(
            cx.document.text_content(root),
            "Built with crossterm, serde and tracing."
        );
        let links = cx.document.find_by_tag("a");
        assert_eq!(links.len(), 3);
        assert_eq!(cx.document.get_attr(links[1], "href").as_deref(), Some("https://serde.rs"));
    }
}
