//! Presenter that replays scripted answers.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ranking::CandidateList;
use crate::selector::{PresentChoice, PresentRequest, Presenter, SelectionError};

/// Answers with the scripted choices in order, then `Cancelled`.
///
/// Records each request and the ids it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPresenter {
    script: Mutex<VecDeque<PresentChoice>>,
    requests: Mutex<Vec<PresentRequest>>,
    shown: Mutex<Vec<Vec<String>>>,
}

impl ScriptedPresenter {
    pub fn new(script: Vec<PresentChoice>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<PresentRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Candidate ids of every list presented, in order.
    pub fn shown(&self) -> Vec<Vec<String>> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Presenter for ScriptedPresenter {
    fn present(
        &self,
        candidates: &CandidateList,
        request: &PresentRequest,
    ) -> Result<PresentChoice, SelectionError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(candidates.iter().map(|c| c.id.clone()).collect());
        }

        Ok(self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or(PresentChoice::Cancelled))
    }
}
