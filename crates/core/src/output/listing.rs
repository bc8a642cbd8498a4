//! Textual renderings of a candidate list for `--list-only`.

use std::fmt;
use std::str::FromStr;

use crate::ranking::CandidateList;

/// First line of the TSV format; bump the version on column changes.
pub const LISTING_HEADER: &str = "#albumlink-list v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFormat {
    /// Numbered, human readable.
    #[default]
    Plain,
    /// Versioned tab-separated rows for scripts.
    Tsv,
    Json,
}

impl FromStr for ListFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(ListFormat::Plain),
            "tsv" => Ok(ListFormat::Tsv),
            "json" => Ok(ListFormat::Json),
            other => Err(format!("unknown list format: {}", other)),
        }
    }
}

impl fmt::Display for ListFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ListFormat::Plain => "plain",
            ListFormat::Tsv => "tsv",
            ListFormat::Json => "json",
        })
    }
}

/// Render `candidates` in `format`. Indices are 1-based.
pub fn render_listing(
    candidates: &CandidateList,
    format: ListFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ListFormat::Plain => Ok(candidates
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:>3}. {}\n     {}\n", i + 1, c.summary(), c.canonical_url))
            .collect()),
        ListFormat::Tsv => {
            let mut out = String::from(LISTING_HEADER);
            out.push('\n');
            for (i, c) in candidates.iter().enumerate() {
                let fields = [
                    (i + 1).to_string(),
                    c.kind.to_string(),
                    c.id.clone(),
                    c.display_name.clone(),
                    c.secondary_name.clone().unwrap_or_default(),
                    c.release_date.clone().unwrap_or_default(),
                    c.canonical_url.clone(),
                ];
                let row: Vec<String> = fields.iter().map(|f| tsv_field(f)).collect();
                out.push_str(&row.join("\t"));
                out.push('\n');
            }
            Ok(out)
        }
        ListFormat::Json => serde_json::to_string_pretty(candidates).map(|mut s| {
            s.push('\n');
            s
        }),
    }
}

/// Tabs and newlines inside a field would break the row structure.
fn tsv_field(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CandidateEntity;

    fn list() -> CandidateList {
        CandidateList::new(vec![
            CandidateEntity::album("a1", "Let It Be", "https://open.test/album/a1")
                .with_secondary("The Beatles")
                .with_release_date("1970-05-08"),
            CandidateEntity::album("a2", "Tab\tName", "https://open.test/album/a2"),
        ])
    }

    #[test]
    fn test_tsv_has_versioned_header_and_columns() {
        let out = render_listing(&list(), ListFormat::Tsv).unwrap();
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines[0], LISTING_HEADER);
        assert_eq!(
            lines[1],
            "1\talbum\ta1\tLet It Be\tThe Beatles\t1970-05-08\thttps://open.test/album/a1"
        );
        assert_eq!(lines[2].split('\t').count(), 7);
        assert!(lines[2].contains("Tab Name"));
    }

    #[test]
    fn test_plain_is_numbered() {
        let out = render_listing(&list(), ListFormat::Plain).unwrap();
        assert!(out.starts_with("  1. Let It Be — The Beatles (1970)\n"));
        assert!(out.contains("  2. Tab\tName (?)"));
    }

    #[test]
    fn test_json_is_array() {
        let out = render_listing(&list(), ListFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("TSV".parse::<ListFormat>(), Ok(ListFormat::Tsv));
        assert!("xml".parse::<ListFormat>().is_err());
        assert_eq!(ListFormat::Json.to_string(), "json");
    }
}
