//! Employment - One block per job.
//!
//! ```text
//! div.profile                       (per job)
//! ├── h3     title - company - city
//! ├── span   period                 (typewriter)
//! ├── p      Responsibilities:      (typewriter)
//! └── ul
//!     └── li task                   (per task, typewriter)
//! ```

use crate::cv::{CvDocument, Job};
use crate::dom::NodeId;
use crate::runtime::DirtyMask;
use crate::transition::IntroSlot;
use crate::view::{detach_if, EachBlock, Fragment, Scope};

use super::section::{type_in, text_element, update_text, Section, SectionBody, SectionState};

pub const RESPONSIBILITIES: &str = "Responsibilities:";

pub struct EmploymentBody;

pub type Employment = Section<EmploymentBody>;

impl SectionBody for EmploymentBody {
    type Data = Vec<Job>;

    fn extract(cv: CvDocument) -> Vec<Job> {
        cv.employment
    }

    fn body(speed: f64) -> Box<dyn Fragment<SectionState<Vec<Job>>>> {
        Box::new(EmploymentFragment {
            jobs: EachBlock::new(move |_, _| Box::new(JobRow::new(speed))),
        })
    }
}

fn jobs(ctx: &SectionState<Vec<Job>>) -> &[Job] {
    ctx.data.ready().map(Vec::as_slice).unwrap_or_default()
}

struct EmploymentFragment {
    jobs: EachBlock<Job>,
}

impl Fragment<SectionState<Vec<Job>>> for EmploymentFragment {
    fn create(&mut self, cx: &Scope, ctx: &SectionState<Vec<Job>>) {
        self.jobs.create(cx, jobs(ctx));
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        self.jobs.mount(cx, target, anchor);
    }

    fn patch(&mut self, cx: &Scope, ctx: &SectionState<Vec<Job>>, dirty: &DirtyMask) {
        if dirty.contains(SectionState::<Vec<Job>>::DATA) {
            self.jobs.patch(cx, jobs(ctx), dirty);
        }
    }

    fn intro(&mut self, cx: &Scope, local: bool) {
        self.jobs.intro(cx, local);
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        self.jobs.destroy(cx, detaching);
    }
}

// =============================================================================
// JOB ROW
// =============================================================================

struct JobRow {
    div: Option<NodeId>,
    heading: Option<NodeId>,
    period: Option<NodeId>,
    label: Option<NodeId>,
    shown_period: String,
    period_intro: IntroSlot,
    label_intro: IntroSlot,
    tasks: EachBlock<String>,
    speed: f64,
}

impl JobRow {
    fn new(speed: f64) -> Self {
        Self {
            div: None,
            heading: None,
            period: None,
            label: None,
            shown_period: String::new(),
            period_intro: IntroSlot::new(),
            label_intro: IntroSlot::new(),
            tasks: EachBlock::new(move |_, _| Box::new(TaskRow::new(speed))),
            speed,
        }
    }
}

impl Fragment<Job> for JobRow {
    fn create(&mut self, cx: &Scope, job: &Job) {
        let dom = &cx.document;
        let div = dom.element("div");
        dom.add_class(div, "profile");

        let h3 = dom.element("h3");
        let heading = dom.text(&job.heading());
        dom.append(h3, heading);
        dom.append(div, h3);
        dom.append(div, dom.space());

        self.shown_period = job.employment_period.clone();
        let period = text_element(cx, "span", &self.shown_period);
        dom.append(div, period);
        dom.append(div, dom.space());

        let label = text_element(cx, "p", RESPONSIBILITIES);
        dom.append(div, label);
        dom.append(div, dom.space());

        let ul = dom.element("ul");
        self.tasks.create(cx, &job.task);
        self.tasks.mount(cx, ul, None);
        dom.append(div, ul);
        dom.append(div, dom.space());

        self.div = Some(div);
        self.heading = Some(heading);
        self.period = Some(period);
        self.label = Some(label);
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        if let Some(div) = self.div {
            cx.document.insert(target, div, anchor);
        }
    }

    fn patch(&mut self, cx: &Scope, job: &Job, dirty: &DirtyMask) {
        if let Some(heading) = self.heading {
            cx.document.set_data(heading, &job.heading());
        }
        update_text(cx, self.period, &mut self.shown_period, &job.employment_period);
        self.tasks.patch(cx, &job.task, dirty);
    }

    fn intro(&mut self, cx: &Scope, local: bool) {
        type_in(&self.period_intro, cx, self.period, self.speed);
        type_in(&self.label_intro, cx, self.label, self.speed);
        self.tasks.intro(cx, local);
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        self.period_intro.end();
        self.label_intro.end();
        self.tasks.destroy(cx, false);
        detach_if(cx, detaching, self.div.take());
    }
}

// =============================================================================
// TASK ROW
// =============================================================================

struct TaskRow {
    li: Option<NodeId>,
    shown: String,
    intro: IntroSlot,
    speed: f64,
}

impl TaskRow {
    fn new(speed: f64) -> Self {
        Self {
            li: None,
            shown: String::new(),
            intro: IntroSlot::new(),
            speed,
        }
    }
}

impl Fragment<String> for TaskRow {
    fn create(&mut self, cx: &Scope, task: &String) {
        self.shown = task.clone();
        self.li = Some(text_element(cx, "li", task));
    }

    fn mount(&mut self, cx: &Scope, target: NodeId, anchor: Option<NodeId>) {
        if let Some(li) = self.li {
            cx.document.insert(target, li, anchor);
        }
    }

    fn patch(&mut self, cx: &Scope, task: &String, _dirty: &DirtyMask) {
        update_text(cx, self.li, &mut self.shown, task);
    }

    fn intro(&mut self, cx: &Scope, _local: bool) {
        type_in(&self.intro, cx, self.li, self.speed);
    }

    fn destroy(&mut self, cx: &Scope, detaching: bool) {
        self.intro.end();
        detach_if(cx, detaching, self.li.take());
    }
}
