//! Mount API - Application lifecycle and the terminal event loop.
//!
//! ```ignore
//! use spark_cv::pipeline::mount;
//!
//! // Interactive: fullscreen until q / Esc / Ctrl+C
//! mount::run(props, Duration::from_millis(16))?;
//!
//! // Non-interactive: every section expanded, every intro finished
//! for line in mount::dump(props, 80) {
//!     println!("{line}");
//! }
//! ```
//!
//! # Loop
//!
//! ```text
//! poll input (frame interval) → host action → macrotasks + microtasks
//!     → due animation frame → repaint if the document changed → diff render
//! ```

use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event;
use crossterm::terminal;
use tracing::{debug, info};

use crate::components::{App, AppProps};
use crate::dom::Dom;
use crate::error::Result;
use crate::renderer::{DiffRenderer, Layout};
use crate::runtime::{Component, InitOptions, ManualClock, Runtime};
use crate::view::Scope;

use super::host::{Host, Step};
use super::input::translate;

/// Time skipped per frame while settling a dump.
const DUMP_FRAME_MS: f64 = 60_000.0;
/// Upper bound on frames run while settling a dump.
const DUMP_MAX_FRAMES: usize = 10_000;

/// Mount the App at the document root with intros enabled.
pub fn mount_app(cx: &Scope, props: AppProps) -> Component<AppProps> {
    let options = InitOptions {
        intro: true,
        ..InitOptions::mount_into(cx.document.root())
    };
    Component::new::<App>(cx, props, options)
}

/// Run the page fullscreen until the user quits.
///
/// The terminal is restored even when the loop fails.
pub fn run(props: AppProps, frame_interval: Duration) -> Result<()> {
    let cx = Scope::new(Runtime::new(), Dom::new());
    let app = mount_app(&cx, props);

    let (width, height) = terminal::size()?;
    let mut renderer = DiffRenderer::stdout();
    renderer.enter_fullscreen()?;
    info!(width, height, "entered fullscreen");

    let host = Host::new(cx.document.clone(), width, height);
    let result = event_loop(&cx, &mut renderer, host, frame_interval);
    let restored = renderer.exit_fullscreen();
    app.destroy(true);
    info!("left fullscreen");

    result?;
    restored?;
    Ok(())
}

fn event_loop<W: Write>(
    cx: &Scope,
    renderer: &mut DiffRenderer<W>,
    mut host: Host,
    frame_interval: Duration,
) -> Result<()> {
    let runtime = &cx.runtime;
    loop {
        runtime.run_microtasks();
        while runtime.run_next_task() {}
        if runtime.has_pending_frame() {
            runtime.run_frame_now();
        }
        if host.refresh() {
            renderer.render(host.buffer())?;
        }

        if !event::poll(frame_interval)? {
            continue;
        }
        let Some(action) = translate(&event::read()?) else {
            continue;
        };
        match host.handle(action) {
            Step::Quit => return Ok(()),
            Step::Redraw => {
                host.refresh();
                renderer.render_full(host.buffer())?;
            }
            Step::Continue => {}
        }
    }
}

/// Render the fully revealed page as plain lines at `width` columns.
///
/// Every clickable heading is clicked once, and time is skipped until all
/// transitions have finished.
pub fn dump(props: AppProps, width: u16) -> Vec<String> {
    let clock = Rc::new(ManualClock::new());
    let cx = Scope::new(Runtime::with_clock(clock.clone()), Dom::new());
    let app = mount_app(&cx, props);
    settle(&cx, &clock);

    let headings = cx.document.read(|doc| Layout::compute(doc, width, None).clickables);
    for heading in headings {
        cx.document.dispatch(heading, "click");
        cx.runtime.run_microtasks();
    }
    settle(&cx, &clock);

    let lines = cx.document.read(|doc| Layout::compute(doc, width, None).plain_lines());
    app.destroy(true);
    lines
}

/// Drain every queue, skipping time forward until no frame is pending.
fn settle(cx: &Scope, clock: &ManualClock) {
    cx.runtime.run_until_idle();
    let mut frames = 0;
    while cx.runtime.has_pending_frame() && frames < DUMP_MAX_FRAMES {
        clock.advance(DUMP_FRAME_MS);
        cx.runtime.run_frame_now();
        cx.runtime.run_until_idle();
        frames += 1;
    }
    debug!(frames, "settled");
}
