//! Disambiguation and ranking of raw candidates.
//!
//! Ranking deduplicates by id, optionally orders by release recency and
//! truncates to the display limit. Equal dates keep catalog order, so the
//! output is a pure function of the input sequence.

mod list;
mod release_date;

pub use list::CandidateList;
pub use release_date::ReleaseDate;

use crate::catalog::CandidateEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankOrder {
    /// Keep the order the catalog returned.
    #[default]
    Relevance,
    /// Newest release first; missing or malformed dates last.
    Recency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankOptions {
    pub order: RankOrder,
    pub display_limit: Option<usize>,
}

impl RankOptions {
    pub fn relevance() -> Self {
        Self::default()
    }

    pub fn recency() -> Self {
        Self {
            order: RankOrder::Recency,
            display_limit: None,
        }
    }

    pub fn with_display_limit(mut self, limit: usize) -> Self {
        self.display_limit = Some(limit);
        self
    }
}

/// Turn raw search output into the list presented for selection.
pub fn rank(candidates: Vec<CandidateEntity>, options: &RankOptions) -> CandidateList {
    let mut list = CandidateList::new(candidates);

    if options.order == RankOrder::Recency {
        let mut entries = list.into_vec();
        // Stable: equal keys keep catalog order.
        entries.sort_by_cached_key(|c| {
            std::cmp::Reverse(c.release_date.as_deref().and_then(ReleaseDate::parse))
        });
        list = CandidateList::new(entries);
    }

    if let Some(limit) = options.display_limit {
        list.truncate(limit);
    }

    list
}
