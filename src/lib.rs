//! # spark-cv
//!
//! A reactive component runtime, a transition engine and a terminal
//! résumé viewer built on them.
//!
//! ## Architecture
//!
//! ```text
//! cv.json ─► CvSource::fetch ─► Component state ─► dirty mask ─► flush
//!                                                                  │
//!            Fragment::patch / intro / outro ◄─────────────────────┘
//!                  │
//!                  ▼
//!            Dom (host document) ─► Layout ─► FrameBuffer ─► DiffRenderer
//! ```
//!
//! Components mark fields dirty; one microtask-scheduled flush per turn
//! patches their fragments. Transitions run on the shared frame loop and
//! either tick text directly or register generated keyframe rules.
//!
//! ## Modules
//!
//! - [`runtime`] - Scheduler, event loop queues, frame loop, components
//! - [`transition`] - Intro/outro transitions, outro groups, keyframes, easing
//! - [`view`] - Fragment trait and `{#if}` / `{#each}` blocks
//! - [`dom`] - Host document and stylesheet
//! - [`components`] - The résumé page
//! - [`cv`] - CV document model and loading
//! - [`renderer`] - Layout, frame buffer and diff rendering
//! - [`pipeline`] - Terminal event loop and `--dump`
//! - [`config`], [`logging`], [`error`] - Ambient plumbing

pub mod components;
pub mod config;
pub mod cv;
pub mod dom;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod renderer;
pub mod runtime;
pub mod transition;
pub mod types;
pub mod view;

pub use types::*;

pub use error::{Error, Result};

pub use config::Config;

pub use cv::{CvDocument, CvSource, Details, Job, LoadState, School};

pub use dom::{Dom, NodeId};

pub use runtime::{
    Cleanup, Clock, Component, ComponentDef, DirtyMask, InitOptions, ManualClock,
    MonotonicClock, Runtime, Setup,
};

pub use transition::{
    check_outros, create_in_transition, create_out_transition, group_outros, transition_in,
    transition_out, IntroTransition, OutroTransition, TransitionConfig, TransitionSpec,
};

pub use view::{Fragment, Scope};

pub use components::{App, AppProps, SectionTitles};

pub use renderer::{DiffRenderer, FrameBuffer, Layout};

pub use pipeline::{dump, mount_app, run};
