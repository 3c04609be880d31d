//! Résumé Components - The views of the CV page.
//!
//! - [`App`] - Page root composing every other component
//! - [`Header`] - Name and contact details
//! - [`Profile`], [`Employment`], [`Education`] - Collapsible [`Section`]s
//! - [`Footer`] - Credits
//!
//! Every data-driven component fetches the CV on mount and renders the
//! loading state until it arrives.

mod app;
mod education;
mod employment;
mod footer;
mod header;
mod profile;
mod section;

pub use app::{App, AppProps, SectionTitles};
pub use education::{Education, EducationBody};
pub use employment::{Employment, EmploymentBody, RESPONSIBILITIES};
pub use footer::{Footer, CREDITS};
pub use header::{Header, HeaderProps, HeaderState, PORTRAIT_ALT};
pub use profile::{Profile, ProfileBody};
pub use section::{Section, SectionBody, SectionProps, SectionState};
