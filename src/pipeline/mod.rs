//! Terminal Pipeline
//!
//! Connects the component runtime to the terminal.
//!
//! ```text
//! crossterm Event → input::translate → Host::handle → Dom::dispatch
//!                                                        │
//! Runtime (flush, frames) → Document revision → Host::refresh → DiffRenderer
//! ```
//!
//! - [`input`] - Pure event translation
//! - [`host`] - Viewport: focus, scroll, hit regions
//! - [`mount`] - Fullscreen event loop and `--dump` rendering

pub mod host;
pub mod input;
pub mod mount;

pub use host::{Host, Step};
pub use input::{translate, HostAction};
pub use mount::{dump, mount_app, run};
