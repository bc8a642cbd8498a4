use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt;

/// A release date at the precision the catalog reported.
///
/// Orders like the date strings would lexicographically: `1969` sorts before
/// `1969-01` which sorts before `1969-01-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReleaseDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl ReleaseDate {
    /// Parse `YYYY`, `YYYY-MM` or `YYYY-MM-DD`; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let year = parse_part(parts.next()?, 4)?;
        let month = match parts.next() {
            Some(m) => Some(parse_part(m, 2)?),
            None => None,
        };
        let day = match parts.next() {
            Some(d) => Some(parse_part(d, 2)?),
            None => None,
        };
        if parts.next().is_some() || (day.is_some() && month.is_none()) {
            return None;
        }

        let year = i32::try_from(year).ok()?;
        // Validate against the calendar, filling missing parts with 1.
        NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))?;

        Some(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    fn key(&self) -> (i32, u32, u32) {
        (self.year, self.month.unwrap_or(0), self.day.unwrap_or(0))
    }
}

fn parse_part(part: &str, width: usize) -> Option<u32> {
    if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl Ord for ReleaseDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for ReleaseDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
        }
        if let Some(day) = self.day {
            write!(f, "-{:02}", day)?;
        }
        Ok(())
    }
}
