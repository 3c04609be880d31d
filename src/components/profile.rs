//! Profile - The summary paragraph.
//!
//! ```text
//! div.profile
//! └── p   profile   (typewriter)
//! ```

use crate::cv::CvDocument;
use crate::dom::NodeId;
use crate::runtime::DirtyMask;
use crate::transition::IntroSlot;
use crate::view::{detach_if, Fragment, Scope};

use super::section::{type_in, text_element, update_text, Section, SectionBody, SectionState};

pub struct ProfileBody;

pub type Profile = Section<ProfileBody>;

impl SectionBody for ProfileBody {
    type Data = String;

    fn extract(cv: CvDocument) -> String {
        cv.profile
    }

    fn body(speed: f64) -> Box<dyn Fragment<SectionState<String>>> {
        Box::new(ProfileFragment {
            div: None,
            p: None,
            shown: String::new(),
            intro: IntroSlot::new(),
            speed,
        })
    }
}

fn profile_text(ctx: &SectionState<String>) -> &str {
    ctx.data.ready().map(String::as_str).unwrap_or_default()
}

struct ProfileFragment {
    div: Option<NodeId>,
    p: Option<NodeId>,
    shown: String,
    intro: IntroSlot,
    speed: f64,
}

impl Fragment<SectionState<String>> for ProfileFragment {
    fn create(&mut self, cx: &Scope, ctx: &SectionState<String>) {
        let div = cx.document.element("div");
        cx.document.add_class(div, "profile");
        self.shown = profile_text(ctx).to_string();
        let p = text_element(cx, "p", &self.shown);
        cx.document.append(div, p);
        self.div = Some(div);
        self.p = Some(p);
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        if let Some(div) = self.div {
            cx.document.insert(target, div, anchor);
        }
    }

    fn patch(&mut self, cx: &Scope, ctx: &SectionState<String>, dirty: &DirtyMask) {
        if dirty.contains(SectionState::<String>::DATA) {
            update_text(cx, self.p, &mut self.shown, profile_text(ctx));
        }
    }

    fn intro(&mut self, cx: &Scope, _local: bool) {
        type_in(&self.intro, cx, self.p, self.speed);
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        self.intro.end();
        detach_if(cx, detaching, self.div.take());
    }
}
