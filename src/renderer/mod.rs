//! Terminal Renderer - Document to cells to escape codes.
//!
//! ```text
//! Document ─► Layout::compute ─► Layout::paint ─► FrameBuffer ─► DiffRenderer
//!                                      └─► HitRegions (mouse → node)
//! ```

mod buffer;
mod diff;
mod paint;

pub use buffer::FrameBuffer;
pub use diff::DiffRenderer;
pub use paint::{hit_test, HitRegion, Layout, Line, Segment};
