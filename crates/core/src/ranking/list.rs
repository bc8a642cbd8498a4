use std::collections::HashSet;
use std::ops::Index;

use serde::Serialize;

use crate::catalog::CandidateEntity;

/// Ordered candidates with unique ids; position is rank.
///
/// Every constructor deduplicates, keeping the first occurrence of each id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateList(Vec<CandidateEntity>);

impl CandidateList {
    pub fn new(candidates: impl IntoIterator<Item = CandidateEntity>) -> Self {
        let mut seen = HashSet::new();
        Self(
            candidates
                .into_iter()
                .filter(|c| seen.insert(c.id.clone()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&CandidateEntity> {
        self.0.first()
    }

    pub fn get(&self, index: usize) -> Option<&CandidateEntity> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateEntity> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[CandidateEntity] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<CandidateEntity> {
        self.0
    }

    /// Canonical URLs in rank order.
    pub fn urls(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.canonical_url.as_str()).collect()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}

impl FromIterator<CandidateEntity> for CandidateList {
    fn from_iter<I: IntoIterator<Item = CandidateEntity>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl IntoIterator for CandidateList {
    type Item = CandidateEntity;
    type IntoIter = std::vec::IntoIter<CandidateEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a CandidateEntity;
    type IntoIter = std::slice::Iter<'a, CandidateEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Index<usize> for CandidateList {
    type Output = CandidateEntity;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
