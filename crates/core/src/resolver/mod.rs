//! End-to-end resolution: search, rank, select.
//!
//! Two workflows are supported. Album resolution searches albums directly
//! and keeps catalog relevance order. Artist resolution first picks one
//! artist, then lists that artist's albums newest first.

use std::sync::Arc;

use tracing::info;

use crate::catalog::{CandidateEntity, CatalogSearch};
use crate::config::SearchConfig;
use crate::error::ResolveError;
use crate::query::SearchQuery;
use crate::ranking::{rank, CandidateList, RankOptions};
use crate::selector::{Presenter, Selection, SelectionError, SelectionMode, Selector};

/// Limits applied by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Albums fetched per artist.
    pub artist_album_limit: usize,
    /// Candidates kept after ranking.
    pub display_limit: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for ResolverSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            artist_album_limit: config.artist_album_limit as usize,
            display_limit: config.display_limit,
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub selection: Selection,
    /// The ranked list the selection was drawn from.
    pub candidates: CandidateList,
    /// The artist picked first, for artist workflows.
    pub artist: Option<CandidateEntity>,
}

pub struct Resolver {
    catalog: Arc<dyn CatalogSearch>,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(catalog: Arc<dyn CatalogSearch>, settings: ResolverSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Ranked albums matching `query`; empty is reported as `NoResults`.
    pub async fn list_albums(&self, query: &SearchQuery) -> Result<CandidateList, ResolveError> {
        let raw = self
            .catalog
            .search_albums(query, query.result_limit)
            .await?;
        let candidates = rank(
            raw,
            &RankOptions::relevance().with_display_limit(self.settings.display_limit),
        );
        info!(
            query = %query.catalog_query(),
            candidates = candidates.len(),
            "Album search finished"
        );
        non_empty(candidates, query.catalog_query())
    }

    /// Search albums and pick one (or all).
    pub async fn resolve_album(
        &self,
        query: &SearchQuery,
        mode: SelectionMode,
        presenter: Option<&dyn Presenter>,
    ) -> Result<Resolution, ResolveError> {
        let candidates = self.list_albums(query).await?;
        let selection = Selector::new("Select an album").select(
            candidates.clone(),
            mode,
            presenter,
        )?;

        Ok(Resolution {
            selection,
            candidates,
            artist: None,
        })
    }

    /// Ranked artists matching `query`.
    pub async fn list_artists(&self, query: &SearchQuery) -> Result<CandidateList, ResolveError> {
        let raw = self
            .catalog
            .search_artists(query, query.result_limit)
            .await?;
        let candidates = rank(raw, &RankOptions::relevance());
        info!(
            query = %query.artist_text(),
            candidates = candidates.len(),
            "Artist search finished"
        );
        non_empty(candidates, query.artist_text().to_string())
    }

    /// Pick an artist, then return that artist's albums newest first.
    ///
    /// The artist is chosen interactively only in interactive mode and is
    /// never "all".
    pub async fn list_artist_albums(
        &self,
        query: &SearchQuery,
        mode: SelectionMode,
        presenter: Option<&dyn Presenter>,
    ) -> Result<(CandidateEntity, CandidateList), ResolveError> {
        let artists = self.list_artists(query).await?;
        let artist_mode = match mode {
            SelectionMode::Interactive => SelectionMode::Interactive,
            SelectionMode::First | SelectionMode::All => SelectionMode::First,
        };

        let artist = match Selector::new("Select an artist")
            .allow_all(false)
            .select(artists, artist_mode, presenter)?
        {
            Selection::One(artist) => artist,
            Selection::All(_) => return Err(SelectionError::AllNotAllowed.into()),
        };

        let raw = self
            .catalog
            .get_artist_albums(&artist.id, self.settings.artist_album_limit)
            .await?;
        let albums = rank(
            raw,
            &RankOptions::recency().with_display_limit(self.settings.display_limit),
        );
        info!(
            artist = %artist.display_name,
            albums = albums.len(),
            "Artist albums listed"
        );

        let albums = non_empty(albums, artist.display_name.clone())?;
        Ok((artist, albums))
    }

    /// Artist -> album chain.
    pub async fn resolve_artist(
        &self,
        query: &SearchQuery,
        mode: SelectionMode,
        presenter: Option<&dyn Presenter>,
    ) -> Result<Resolution, ResolveError> {
        let (artist, albums) = self.list_artist_albums(query, mode, presenter).await?;
        let title = format!("Select an album by {}", artist.display_name);
        let selection = Selector::new(title).select(albums.clone(), mode, presenter)?;

        Ok(Resolution {
            selection,
            candidates: albums,
            artist: Some(artist),
        })
    }
}

fn non_empty(candidates: CandidateList, query: String) -> Result<CandidateList, ResolveError> {
    if candidates.is_empty() {
        Err(ResolveError::NoResults { query })
    } else {
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryBuilder, QueryInput};
    use crate::selector::PresentChoice;
    use crate::testing::{fixtures, MockCatalog, ScriptedPresenter};

    fn query(text: &str) -> SearchQuery {
        QueryBuilder::new("US", 20)
            .build(&QueryInput::FreeText(text.into()))
            .unwrap()
    }

    fn resolver(catalog: &Arc<MockCatalog>) -> Resolver {
        Resolver::new(catalog.clone(), ResolverSettings::default())
    }

    #[tokio::test]
    async fn test_resolve_album_first() {
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .set_albums(vec![
                fixtures::album("mop", "Master of Puppets", "Metallica", "1986-03-03"),
                fixtures::album("ride", "Ride the Lightning", "Metallica", "1984-07-27"),
            ])
            .await;

        let resolution = resolver(&catalog)
            .resolve_album(&query("Metallica - Master of Puppets"), SelectionMode::First, None)
            .await
            .unwrap();

        assert_eq!(
            resolution.selection.urls(),
            vec!["https://open.spotify.com/album/mop"]
        );
        assert_eq!(resolution.candidates.len(), 2);
        assert_eq!(catalog.album_searches().await[0].result_limit, 20);
    }

    #[tokio::test]
    async fn test_no_results_is_not_found() {
        let catalog = Arc::new(MockCatalog::new());

        let err = resolver(&catalog)
            .resolve_album(&query("Nonexistent Band XYZ123 - Fake Album 456"), SelectionMode::First, None)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_search_failure_is_not_not_found() {
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .set_next_error(crate::catalog::SearchError::Decode("bad".into()))
            .await;

        let err = resolver(&catalog)
            .resolve_album(&query("x"), SelectionMode::First, None)
            .await
            .unwrap_err();

        assert!(!err.is_not_found());
        assert!(matches!(err, ResolveError::Search(_)));
    }

    #[tokio::test]
    async fn test_album_search_deduplicates_and_truncates() {
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .set_albums(vec![
                fixtures::album("a", "A", "X", "2000"),
                fixtures::album("a", "A again", "X", "2000"),
                fixtures::album("b", "B", "X", "2001"),
                fixtures::album("c", "C", "X", "2002"),
            ])
            .await;
        let resolver = Resolver::new(
            catalog.clone(),
            ResolverSettings {
                artist_album_limit: 50,
                display_limit: 2,
            },
        );

        let list = resolver.list_albums(&query("x")).await.unwrap();

        let ids: Vec<_> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_resolve_artist_sorts_albums_by_recency() {
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .set_artists(vec![fixtures::artist("beatles", "The Beatles", 34_000_000)])
            .await;
        catalog
            .set_artist_albums(
                "beatles",
                vec![
                    fixtures::album("abbey", "Abbey Road", "The Beatles", "1969-09-26"),
                    fixtures::album("letitbe", "Let It Be", "The Beatles", "1970-05-08"),
                    fixtures::album("help", "Help!", "The Beatles", "1965-08-06"),
                ],
            )
            .await;

        let resolution = resolver(&catalog)
            .resolve_artist(&query("The Beatles"), SelectionMode::First, None)
            .await
            .unwrap();

        let dates: Vec<_> = resolution
            .candidates
            .iter()
            .map(|c| c.release_date.as_deref().unwrap())
            .collect();
        assert_eq!(dates, vec!["1970-05-08", "1969-09-26", "1965-08-06"]);
        assert_eq!(resolution.selection.chosen().unwrap().id, "letitbe");
        assert_eq!(resolution.artist.unwrap().id, "beatles");
        assert_eq!(catalog.artist_album_requests().await, vec![("beatles".to_string(), 50)]);
    }

    #[tokio::test]
    async fn test_resolve_artist_interactive_chain() {
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .set_artists(vec![
                fixtures::artist("ar1", "Genesis", 3_000_000),
                fixtures::artist("ar2", "Genesis (tribute)", 100),
            ])
            .await;
        catalog
            .set_artist_albums(
                "ar1",
                vec![
                    fixtures::album("g1", "Foxtrot", "Genesis", "1972-10-06"),
                    fixtures::album("g2", "Selling England by the Pound", "Genesis", "1973-10-12"),
                ],
            )
            .await;
        let presenter =
            ScriptedPresenter::new(vec![PresentChoice::Index(0), PresentChoice::All]);

        let resolution = resolver(&catalog)
            .resolve_artist(&query("Genesis"), SelectionMode::Interactive, Some(&presenter))
            .await
            .unwrap();

        assert!(resolution.selection.is_all());
        assert_eq!(resolution.selection.urls().len(), 2);

        let requests = presenter.requests();
        assert!(!requests[0].allow_all);
        assert!(requests[1].allow_all);
        assert!(requests[1].title.contains("Genesis"));
    }

    #[tokio::test]
    async fn test_artist_without_albums_is_not_found() {
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .set_artists(vec![fixtures::artist("solo", "Unknown Solo", 3)])
            .await;

        let err = resolver(&catalog)
            .resolve_artist(&query("Unknown Solo"), SelectionMode::First, None)
            .await
            .unwrap_err();

        match err {
            ResolveError::NoResults { query } => assert_eq!(query, "Unknown Solo"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_all_mode_picks_first_artist_then_all_albums() {
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .set_artists(vec![
                fixtures::artist("a1", "Tool", 5_000_000),
                fixtures::artist("a2", "Toolbox", 10),
            ])
            .await;
        catalog
            .set_artist_albums(
                "a1",
                vec![
                    fixtures::album("t1", "Lateralus", "Tool", "2001-05-15"),
                    fixtures::album("t2", "Fear Inoculum", "Tool", "2019-08-30"),
                ],
            )
            .await;

        let resolution = resolver(&catalog)
            .resolve_artist(&query("Tool"), SelectionMode::All, None)
            .await
            .unwrap();

        assert_eq!(
            resolution.selection.urls(),
            vec![
                "https://open.spotify.com/album/t2",
                "https://open.spotify.com/album/t1"
            ]
        );
    }
}
