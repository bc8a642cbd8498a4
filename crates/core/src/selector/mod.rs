//! Choosing one candidate (or all of them) from a ranked list.
//!
//! The selector is the last synchronous step of a resolution. Interactive
//! choices are delegated to a [`Presenter`]; the selector only validates
//! what comes back.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::CandidateEntity;
use crate::ranking::CandidateList;

/// How many times an out-of-range answer is re-asked before giving up.
pub const DEFAULT_MAX_PROMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no candidates to choose from")]
    NoCandidates,

    #[error("choice {index} is out of range (1-{len})")]
    OutOfRange { index: usize, len: usize },

    #[error("selecting all candidates is not allowed here")]
    AllNotAllowed,

    #[error("selection cancelled")]
    Cancelled,

    #[error("interactive selection unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Take the top-ranked candidate.
    #[default]
    First,
    /// Ask a presenter.
    Interactive,
    /// Every candidate.
    All,
}

/// What a presenter answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentChoice {
    /// Zero-based position in the presented list.
    Index(usize),
    All,
    Cancelled,
}

/// Context handed to a presenter alongside the candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentRequest {
    pub title: String,
    pub allow_all: bool,
    /// Set when re-asking after an invalid answer.
    pub notice: Option<String>,
}

/// Presentation layer for interactive selection.
///
/// Implementations may block on user input; they must not reorder the list.
pub trait Presenter: Send + Sync {
    fn present(
        &self,
        candidates: &CandidateList,
        request: &PresentRequest,
    ) -> Result<PresentChoice, SelectionError>;
}

/// Terminal artifact of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "selection", content = "candidates", rename_all = "lowercase")]
pub enum Selection {
    One(CandidateEntity),
    All(CandidateList),
}

impl Selection {
    /// Canonical URLs, one per selected candidate.
    pub fn urls(&self) -> Vec<&str> {
        match self {
            Selection::One(candidate) => vec![candidate.canonical_url.as_str()],
            Selection::All(list) => list.urls(),
        }
    }

    /// The chosen candidate when exactly one was selected.
    pub fn chosen(&self) -> Option<&CandidateEntity> {
        match self {
            Selection::One(candidate) => Some(candidate),
            Selection::All(_) => None,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All(_))
    }
}

/// Validates choices against the list actually presented.
#[derive(Debug, Clone)]
pub struct Selector {
    title: String,
    allow_all: bool,
    max_prompts: u32,
}

impl Selector {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            allow_all: true,
            max_prompts: DEFAULT_MAX_PROMPTS,
        }
    }

    pub fn allow_all(mut self, allow: bool) -> Self {
        self.allow_all = allow;
        self
    }

    pub fn max_prompts(mut self, prompts: u32) -> Self {
        self.max_prompts = prompts.max(1);
        self
    }

    pub fn select(
        &self,
        candidates: CandidateList,
        mode: SelectionMode,
        presenter: Option<&dyn Presenter>,
    ) -> Result<Selection, SelectionError> {
        if candidates.is_empty() {
            return Err(SelectionError::NoCandidates);
        }

        match mode {
            SelectionMode::First => candidates
                .into_iter()
                .next()
                .map(Selection::One)
                .ok_or(SelectionError::NoCandidates),
            SelectionMode::All if self.allow_all => Ok(Selection::All(candidates)),
            SelectionMode::All => Err(SelectionError::AllNotAllowed),
            SelectionMode::Interactive => {
                let presenter = presenter.ok_or_else(|| {
                    SelectionError::Unavailable("no presenter configured".to_string())
                })?;
                self.ask(candidates, presenter)
            }
        }
    }

    fn ask(
        &self,
        candidates: CandidateList,
        presenter: &dyn Presenter,
    ) -> Result<Selection, SelectionError> {
        let mut request = PresentRequest {
            title: self.title.clone(),
            allow_all: self.allow_all,
            notice: None,
        };
        let mut prompts = 0;

        loop {
            prompts += 1;
            let error = match presenter.present(&candidates, &request)? {
                PresentChoice::Cancelled => return Err(SelectionError::Cancelled),
                PresentChoice::All if self.allow_all => return Ok(Selection::All(candidates)),
                PresentChoice::All => SelectionError::AllNotAllowed,
                PresentChoice::Index(index) => match candidates.get(index) {
                    Some(candidate) => return Ok(Selection::One(candidate.clone())),
                    None => SelectionError::OutOfRange {
                        index: index + 1,
                        len: candidates.len(),
                    },
                },
            };

            if prompts >= self.max_prompts {
                return Err(error);
            }
            debug!(prompts, error = %error, "Invalid choice, asking again");
            request.notice = Some(error.to_string());
        }
    }
}
