//! CV Document - The résumé data the components render.
//!
//! Loaded from JSON (`cv.json` by default):
//!
//! ```text
//! {
//!   "details": { "fullName", "profession", "location", "phone", "email" },
//!   "profile": "...",
//!   "employment": [{ "job_title", "company_name", "city_name", "employment_period", "task": [..] }],
//!   "education": [{ "school_name", "period" }]
//! }
//! ```
//!
//! Components fetch it through a [`CvSource`] on mount. The read happens in a
//! macrotask, so the first render always shows the loading state.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::runtime::Runtime;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Details {
    pub full_name: String,
    pub profession: String,
    pub location: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub job_title: String,
    pub company_name: String,
    pub city_name: String,
    pub employment_period: String,
    pub task: Vec<String>,
}

impl Job {
    /// `title - company - city`
    pub fn heading(&self) -> String {
        format!("{} - {} - {}", self.job_title, self.company_name, self.city_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct School {
    pub school_name: String,
    pub period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvDocument {
    pub details: Details,
    pub profile: String,
    pub employment: Vec<Job>,
    pub education: Vec<School>,
}

impl CvDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Self::from_json(&json)
    }
}

// =============================================================================
// SOURCE
// =============================================================================

/// Where components fetch the CV from.
#[derive(Debug, Clone)]
pub enum CvSource {
    File(PathBuf),
    /// JSON held in memory (tests, embedded data).
    Inline(Rc<str>),
}

impl CvSource {
    pub fn inline(json: &str) -> Self {
        CvSource::Inline(Rc::from(json))
    }

    /// Read and parse synchronously.
    pub fn read(&self) -> Result<CvDocument> {
        match self {
            CvSource::File(path) => CvDocument::load(path),
            CvSource::Inline(json) => CvDocument::from_json(json),
        }
    }

    /// Read in a macrotask and hand the outcome to `done`.
    pub fn fetch(&self, runtime: &Runtime, done: impl FnOnce(LoadState<CvDocument>) + 'static) {
        let source = self.clone();
        runtime.queue_task(move || {
            let state = match source.read() {
                Ok(cv) => {
                    debug!(source = %source, "cv loaded");
                    LoadState::Ready(cv)
                }
                Err(err) => {
                    error!(source = %source, error = %err, "could not load cv");
                    LoadState::Failed(err.to_string())
                }
            };
            done(state);
        });
    }
}

impl std::fmt::Display for CvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CvSource::File(path) => write!(f, "{}", path.display()),
            CvSource::Inline(_) => f.write_str("<inline>"),
        }
    }
}

/// Progress of an asynchronous load.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Ready(value) => LoadState::Ready(f(value)),
            LoadState::Failed(message) => LoadState::Failed(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const SAMPLE: &str = r#"{
        "details": { "fullName": "Ada Example", "profession": "Engineer",
                     "location": "Lisbon", "phone": "+351 000", "email": "ada@example.org" },
        "profile": "Builds things.",
        "employment": [{ "job_title": "Dev", "company_name": "Acme", "city_name": "Porto",
                         "employment_period": "2020 - 2023", "task": ["Ship", "Fix"] }],
        "education": [{ "school_name": "Uni", "period": "2015 - 2019" }]
    }"#;

    #[test]
    fn test_parse_document() {
        let cv = CvDocument::from_json(SAMPLE).unwrap();
        assert_eq!(cv.details.full_name, "Ada Example");
        assert_eq!(cv.employment[0].task, vec!["Ship", "Fix"]);
        assert_eq!(cv.employment[0].heading(), "Dev - Acme - Porto");
        assert_eq!(cv.education[0].period, "2015 - 2019");
    }

    #[test]
    fn test_missing_fields_default() {
        let cv = CvDocument::from_json(r#"{ "profile": "only" }"#).unwrap();
        assert_eq!(cv.profile, "only");
        assert!(cv.employment.is_empty());
        assert_eq!(cv.details, Details::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(CvDocument::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = CvSource::File(PathBuf::from("/nonexistent/cv.json"));
        assert!(matches!(source.read(), Err(Error::Io { .. })));
    }

    #[test]
    fn test_fetch_runs_as_macrotask() {
        let runtime = Runtime::new();
        let result = Rc::new(RefCell::new(None));
        let r = result.clone();
        CvSource::inline(SAMPLE).fetch(&runtime, move |state| *r.borrow_mut() = Some(state));

        runtime.run_microtasks();
        assert!(result.borrow().is_none());

        runtime.run_next_task();
        let state = result.borrow_mut().take().unwrap();
        assert_eq!(state.ready().map(|cv| cv.profile.as_str()), Some("Builds things."));
    }

    #[test]
    fn test_fetch_failure_becomes_failed_state() {
        let runtime = Runtime::new();
        let result = Rc::new(RefCell::new(LoadState::Loading));
        let r = result.clone();
        CvSource::inline("not json").fetch(&runtime, move |state| *r.borrow_mut() = state);

        runtime.run_until_idle();
        assert!(result.borrow().error().is_some_and(|e| e.contains("invalid cv document")));
    }
}
