//! Terminal presenters for interactive selection.
//!
//! The plain presenter prints a numbered list on stderr and reads the answer
//! from the terminal. When `gum` is installed the styled picker is used
//! instead, falling back to the plain list if it fails to start.

use std::io::{self, BufRead, Write};
use std::process::{Command, Stdio};

use albumlink_core::{CandidateList, PresentChoice, PresentRequest, Presenter, SelectionError};
use tracing::debug;

const ALL_LABEL: &str = "ALL";

/// Attempts at typing something parseable before giving up.
const MAX_INPUT_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parsed {
    Choice(PresentChoice),
    Invalid,
}

/// Interpret one typed answer. Numbers are 1-based; blank picks the first.
fn parse_answer(line: &str, allow_all: bool) -> Parsed {
    let answer = line.trim();
    if answer.is_empty() {
        return Parsed::Choice(PresentChoice::Index(0));
    }
    if answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("quit") {
        return Parsed::Choice(PresentChoice::Cancelled);
    }
    if allow_all && (answer.eq_ignore_ascii_case("all") || answer.eq_ignore_ascii_case("a")) {
        return Parsed::Choice(PresentChoice::All);
    }
    match answer.parse::<usize>() {
        Ok(n) if n >= 1 => Parsed::Choice(PresentChoice::Index(n - 1)),
        _ => Parsed::Invalid,
    }
}

fn render_menu(candidates: &CandidateList, request: &PresentRequest) -> String {
    let mut menu = format!("\n{} ({} found):\n", request.title, candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        menu.push_str(&format!("{:>3}. {}\n", i + 1, candidate.summary()));
    }
    if request.allow_all {
        menu.push_str(&format!("  {}  copy every URL\n", ALL_LABEL));
    }
    menu
}

/// Numbered list on stderr, answer read from stdin.
#[derive(Debug, Default)]
pub struct PlainPresenter;

impl Presenter for PlainPresenter {
    fn present(
        &self,
        candidates: &CandidateList,
        request: &PresentRequest,
    ) -> Result<PresentChoice, SelectionError> {
        let mut stderr = io::stderr();
        let io_error = |e: io::Error| SelectionError::Unavailable(e.to_string());

        if let Some(notice) = &request.notice {
            writeln!(stderr, "{}", notice).map_err(io_error)?;
        }
        write!(stderr, "{}", render_menu(candidates, request)).map_err(io_error)?;

        let hint = if request.allow_all {
            format!("Choice [1-{}, all, q] (Enter = 1): ", candidates.len())
        } else {
            format!("Choice [1-{}, q] (Enter = 1): ", candidates.len())
        };

        let stdin = io::stdin();
        for _ in 0..MAX_INPUT_ATTEMPTS {
            write!(stderr, "{}", hint).map_err(io_error)?;
            stderr.flush().map_err(io_error)?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line).map_err(io_error)? == 0 {
                // EOF
                return Ok(PresentChoice::Cancelled);
            }
            match parse_answer(&line, request.allow_all) {
                Parsed::Choice(choice) => return Ok(choice),
                Parsed::Invalid => {
                    writeln!(stderr, "Invalid selection: {}", line.trim()).map_err(io_error)?;
                }
            }
        }

        Ok(PresentChoice::Cancelled)
    }
}

/// Styled picker using `gum choose`.
#[derive(Debug, Default)]
pub struct GumPresenter {
    fallback: PlainPresenter,
}

impl GumPresenter {
    /// Whether `gum` can be started.
    pub fn available() -> bool {
        Command::new("gum")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn choose(
        &self,
        candidates: &CandidateList,
        request: &PresentRequest,
    ) -> io::Result<Option<String>> {
        let mut items: Vec<String> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {}", i + 1, c.summary()))
            .collect();
        if request.allow_all {
            items.push(ALL_LABEL.to_string());
        }

        let mut header = request.title.clone();
        if let Some(notice) = &request.notice {
            header = format!("{} ({})", header, notice);
        }

        // gum draws on the terminal through stderr; stdout carries the choice.
        let output = Command::new("gum")
            .arg("choose")
            .arg("--header")
            .arg(header)
            .args(&items)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()?;

        if !output.status.success() {
            // Escape / Ctrl-C inside gum.
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }
}

/// Map a line printed by `gum choose` back to a choice.
fn parse_gum_line(line: &str, allow_all: bool) -> PresentChoice {
    if allow_all && line == ALL_LABEL {
        return PresentChoice::All;
    }
    line.split_once(". ")
        .and_then(|(n, _)| n.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .map(|n| PresentChoice::Index(n - 1))
        .unwrap_or(PresentChoice::Cancelled)
}

impl Presenter for GumPresenter {
    fn present(
        &self,
        candidates: &CandidateList,
        request: &PresentRequest,
    ) -> Result<PresentChoice, SelectionError> {
        match self.choose(candidates, request) {
            Ok(Some(line)) => Ok(parse_gum_line(&line, request.allow_all)),
            Ok(None) => Ok(PresentChoice::Cancelled),
            Err(e) => {
                debug!(error = %e, "gum failed, using plain list");
                self.fallback.present(candidates, request)
            }
        }
    }
}

/// The best presenter available on this machine.
pub fn terminal_presenter() -> Box<dyn Presenter> {
    if GumPresenter::available() {
        Box::new(GumPresenter::default())
    } else {
        Box::new(PlainPresenter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use albumlink_core::testing::fixtures;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("2\n", true), Parsed::Choice(PresentChoice::Index(1)));
        assert_eq!(parse_answer("  \n", false), Parsed::Choice(PresentChoice::Index(0)));
        assert_eq!(parse_answer("ALL", true), Parsed::Choice(PresentChoice::All));
        assert_eq!(parse_answer("all", false), Parsed::Invalid);
        assert_eq!(parse_answer("q", true), Parsed::Choice(PresentChoice::Cancelled));
        assert_eq!(parse_answer("0", true), Parsed::Invalid);
        assert_eq!(parse_answer("two", true), Parsed::Invalid);
    }

    #[test]
    fn test_out_of_range_number_is_passed_through() {
        // Range checks belong to the selector, which re-asks.
        assert_eq!(
            parse_answer("99", true),
            Parsed::Choice(PresentChoice::Index(98))
        );
    }

    #[test]
    fn test_parse_gum_line() {
        assert_eq!(
            parse_gum_line("3. Abbey Road — The Beatles (1969)", true),
            PresentChoice::Index(2)
        );
        assert_eq!(parse_gum_line("ALL", true), PresentChoice::All);
        assert_eq!(parse_gum_line("ALL", false), PresentChoice::Cancelled);
        assert_eq!(parse_gum_line("", true), PresentChoice::Cancelled);
    }

    #[test]
    fn test_menu_lists_every_candidate() {
        let list = CandidateList::new(vec![
            fixtures::album("a", "Abbey Road", "The Beatles", "1969-09-26"),
            fixtures::album("b", "Help!", "The Beatles", "1965-08-06"),
        ]);
        let request = PresentRequest {
            title: "Select an album".into(),
            allow_all: true,
            notice: None,
        };

        let menu = render_menu(&list, &request);
        assert!(menu.contains("Select an album (2 found)"));
        assert!(menu.contains("  1. Abbey Road — The Beatles (1969)"));
        assert!(menu.contains("  2. Help! — The Beatles (1965)"));
        assert!(menu.contains(ALL_LABEL));
    }
}
