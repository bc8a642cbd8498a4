use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{QueryInput, SearchQuery, ValidationError};

/// Matches text the user already wrote in catalog field syntax.
static FIELD_QUALIFIER: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)(^|\s)(artist|album|track|year|genre|label):").ok()
});

const ARTIST_ALBUM_DELIMITER: &str = " - ";

/// Builds [`SearchQuery`] values for one market and fetch limit.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    market: String,
    limit: usize,
}

impl QueryBuilder {
    pub fn new(market: impl Into<String>, limit: usize) -> Self {
        Self {
            market: market.into(),
            limit,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Normalize `input` into a query. Pure; no I/O.
    pub fn build(&self, input: &QueryInput) -> Result<SearchQuery, ValidationError> {
        if self.limit == 0 {
            return Err(ValidationError::ZeroLimit);
        }

        let (raw_text, artist, album) = match input {
            QueryInput::Structured { artist, album } => {
                let artist = non_empty(artist.as_deref());
                let album = non_empty(album.as_deref());
                let raw_text = match (&artist, &album) {
                    (None, None) => return Err(ValidationError::Empty),
                    (Some(a), Some(b)) => format!("{}{}{}", a, ARTIST_ALBUM_DELIMITER, b),
                    (Some(a), None) => a.clone(),
                    (None, Some(b)) => b.clone(),
                };
                (raw_text, artist, album)
            }
            QueryInput::FreeText(text) => parse_text(text)?,
            QueryInput::Piped(text) => {
                let line = text
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .ok_or(ValidationError::Empty)?;
                parse_text(line)?
            }
        };

        Ok(SearchQuery {
            raw_text,
            artist,
            album,
            market: self.market.clone(),
            result_limit: self.limit,
        })
    }
}

type Parsed = (String, Option<String>, Option<String>);

fn parse_text(text: &str) -> Result<Parsed, ValidationError> {
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return Err(ValidationError::Empty);
    }

    if has_field_qualifier(&text) {
        return Ok((text, None, None));
    }

    if let Some((artist, album)) = text.split_once(ARTIST_ALBUM_DELIMITER) {
        let artist = artist.trim();
        let album = album.trim();
        if !artist.is_empty() && !album.is_empty() {
            return Ok((
                text.clone(),
                Some(artist.to_string()),
                Some(album.to_string()),
            ));
        }
    }

    Ok((text, None, None))
}

fn has_field_qualifier(text: &str) -> bool {
    FIELD_QUALIFIER
        .as_ref()
        .is_some_and(|re| re.is_match(text))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(collapse_whitespace)
        .filter(|v| !v.is_empty())
}

/// Trim and squeeze interior runs of whitespace to one space.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
