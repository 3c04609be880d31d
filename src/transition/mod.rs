//! Transition Engine - Timed enter/exit effects on document nodes.
//!
//! A transition interpolates `t` over `[0, 1]` for `duration` milliseconds
//! after `delay`, calling `tick(t, 1 - t)` every frame from the shared frame
//! loop. If the config also has a `css` function, it is sampled into a
//! generated `@keyframes` rule and the node's animation property plays it.
//!
//! # Modules
//!
//! - [`easing`] - Easing curves
//! - `stylesheet` - Keyframe rule generation, dedup and lazy cleanup
//! - `intro` / `outro` - Enter and exit transitions, outro groups
//! - [`presets`] - `typewriter` and `fade`
//!
//! # Example
//!
//! ```ignore
//! let intro = create_in_transition(&cx, paragraph, |dom, node| typewriter(dom, node, 30.0))?;
//! intro.start();
//! ```

pub mod easing;
mod intro;
mod outro;
pub mod presets;
mod stylesheet;

pub use intro::{create_in_transition, IntroSlot, IntroTransition};
pub use outro::{
    check_outros, create_out_transition, group_outros, transition_in, transition_out,
    OutroTransition,
};
pub use stylesheet::{clear_rules, create_rule, delete_rule, hash};

pub(crate) use outro::OutroState;
pub(crate) use stylesheet::StyleRegistry;

use std::rc::Rc;

use crate::dom::{Dom, NodeId};
use crate::error::Result;

/// Maps linear progress to eased progress.
pub type Easing = fn(f64) -> f64;

pub type TickFn = Rc<dyn Fn(f64, f64)>;
pub type CssFn = Rc<dyn Fn(f64, f64) -> String>;

/// Timing and effect of one transition.
#[derive(Clone)]
pub struct TransitionConfig {
    /// Milliseconds before the effect starts.
    pub delay: f64,
    /// Milliseconds the effect runs.
    pub duration: f64,
    pub easing: Easing,
    /// Called every frame with `(t, 1 - t)`.
    pub tick: Option<TickFn>,
    /// Style declarations at `(t, 1 - t)`, compiled into keyframes.
    pub css: Option<CssFn>,
}

impl TransitionConfig {
    /// A transition that completes immediately.
    pub fn none() -> Self {
        Self {
            duration: 0.0,
            ..Self::default()
        }
    }

    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn tick(mut self, tick: impl Fn(f64, f64) + 'static) -> Self {
        self.tick = Some(Rc::new(tick));
        self
    }

    pub fn css(mut self, css: impl Fn(f64, f64) -> String + 'static) -> Self {
        self.css = Some(Rc::new(css));
        self
    }

    pub(crate) fn run_tick(&self, t: f64, u: f64) {
        if let Some(tick) = &self.tick {
            tick(t, u);
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            delay: 0.0,
            duration: 300.0,
            easing: easing::linear,
            tick: None,
            css: None,
        }
    }
}

impl std::fmt::Debug for TransitionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionConfig")
            .field("delay", &self.delay)
            .field("duration", &self.duration)
            .field("tick", &self.tick.is_some())
            .field("css", &self.css.is_some())
            .finish()
    }
}

/// A config that is either known now or computed once the current wait
/// resolves.
pub enum TransitionSpec {
    Ready(TransitionConfig),
    Lazy(Box<dyn FnOnce() -> TransitionConfig>),
}

impl From<TransitionConfig> for TransitionSpec {
    fn from(config: TransitionConfig) -> Self {
        TransitionSpec::Ready(config)
    }
}

/// Builds the spec for a node. Errors abort that transition only.
pub type TransitionFn = Box<dyn FnOnce(&Dom, NodeId) -> Result<TransitionSpec>>;
