//! Education - One block per school.
//!
//! ```text
//! div.profile          (per school)
//! ├── h3   school_name (typewriter)
//! └── span period      (typewriter)
//! ```

use crate::cv::{CvDocument, School};
use crate::dom::NodeId;
use crate::runtime::DirtyMask;
use crate::transition::IntroSlot;
use crate::view::{detach_if, EachBlock, Fragment, Scope};

use super::section::{type_in, text_element, update_text, Section, SectionBody, SectionState};

pub struct EducationBody;

pub type Education = Section<EducationBody>;

impl SectionBody for EducationBody {
    type Data = Vec<School>;

    fn extract(cv: CvDocument) -> Vec<School> {
        cv.education
    }

    fn body(speed: f64) -> Box<dyn Fragment<SectionState<Vec<School>>>> {
        Box::new(EducationFragment {
            schools: EachBlock::new(move |_, _| Box::new(SchoolRow::new(speed))),
        })
    }
}

fn schools(ctx: &SectionState<Vec<School>>) -> &[School] {
    ctx.data.ready().map(Vec::as_slice).unwrap_or_default()
}

struct EducationFragment {
    schools: EachBlock<School>,
}

impl Fragment<SectionState<Vec<School>>> for EducationFragment {
    fn create(&mut self, cx: &Scope, ctx: &SectionState<Vec<School>>) {
        self.schools.create(cx, schools(ctx));
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        self.schools.mount(cx, target, anchor);
    }

    fn patch(&mut self, cx: &Scope, ctx: &SectionState<Vec<School>>, dirty: &DirtyMask) {
        if dirty.contains(SectionState::<Vec<School>>::DATA) {
            self.schools.patch(cx, schools(ctx), dirty);
        }
    }

    fn intro(&mut self, cx: &Scope, local: bool) {
        self.schools.intro(cx, local);
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        self.schools.destroy(cx, detaching);
    }
}

struct SchoolRow {
    div: Option<NodeId>,
    name: Option<NodeId>,
    period: Option<NodeId>,
    shown_name: String,
    shown_period: String,
    name_intro: IntroSlot,
    period_intro: IntroSlot,
    speed: f64,
}

impl SchoolRow {
    fn new(speed: f64) -> Self {
        Self {
            div: None,
            name: None,
            period: None,
            shown_name: String::new(),
            shown_period: String::new(),
            name_intro: IntroSlot::new(),
            period_intro: IntroSlot::new(),
            speed,
        }
    }
}

impl Fragment<School> for SchoolRow {
    fn create(&mut self, cx: &Scope, school: &School) {
        let dom = &cx.document;
        let div = dom.element("div");
        dom.add_class(div, "profile");

        self.shown_name = school.school_name.clone();
        self.shown_period = school.period.clone();
        let name = text_element(cx, "h3", &self.shown_name);
        let period = text_element(cx, "span", &self.shown_period);
        dom.append(div, name);
        dom.append(div, dom.space());
        dom.append(div, period);

        self.div = Some(div);
        self.name = Some(name);
        self.period = Some(period);
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        if let Some(div) = self.div {
            cx.document.insert(target, div, anchor);
        }
    }

    fn patch(&mut self, cx: &Scope, school: &School, _dirty: &DirtyMask) {
        update_text(cx, self.name, &mut self.shown_name, &school.school_name);
        update_text(cx, self.period, &mut self.shown_period, &school.period);
    }

    fn intro(&mut self, cx: &Scope, _local: bool) {
        type_in(&self.name_intro, cx, self.name, self.speed);
        type_in(&self.period_intro, cx, self.period, self.speed);
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        self.name_intro.end();
        self.period_intro.end();
        detach_if(cx, detaching, self.div.take());
    }
}
