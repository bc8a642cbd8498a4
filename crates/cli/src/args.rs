use std::path::PathBuf;

use albumlink_core::{ListFormat, QueryInput, SelectionMode};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Resolve a band/album (or artist) into a Spotify link.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: <config dir>/albumlink/config.toml)
    #[arg(short, long, env = "ALBUMLINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Market (ISO 3166-1 alpha-2 country code)
    #[arg(short, long, global = true)]
    pub market: Option<String>,

    /// Number of results to fetch
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Print URLs instead of copying them to the clipboard
    #[arg(long, global = true)]
    pub no_clipboard: bool,

    /// Only list candidates, do not select
    #[arg(long, global = true)]
    pub list_only: bool,

    /// Listing format used with --list-only
    #[arg(long, value_enum, default_value_t = FormatArg::Plain, global = true)]
    pub format: FormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search albums directly
    Album(AlbumArgs),
    /// Pick an artist, then one of their albums
    Artist(ArtistArgs),
    /// Print the effective configuration (secrets redacted)
    Config,
}

#[derive(Args, Debug, Default)]
pub struct AlbumArgs {
    /// Band / artist name
    #[arg(short, long)]
    pub band: Option<String>,

    /// Album name
    #[arg(short, long)]
    pub album: Option<String>,

    /// Free-text query, e.g. "Metallica - Master of Puppets"
    #[arg(short, long, conflicts_with_all = ["band", "album"])]
    pub query: Option<String>,

    /// Choose from the results interactively
    #[arg(short, long, conflicts_with = "all")]
    pub pick: bool,

    /// Copy every result, one URL per line
    #[arg(long)]
    pub all: bool,

    /// Query words, joined with spaces
    #[arg(conflicts_with_all = ["band", "album", "query"])]
    pub words: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct ArtistArgs {
    /// Take the first artist and their newest album without asking
    #[arg(long, conflicts_with = "all")]
    pub first: bool,

    /// Copy every album of the first matching artist
    #[arg(long)]
    pub all: bool,

    /// Artist name words, joined with spaces
    pub words: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Plain,
    Tsv,
    Json,
}

impl From<FormatArg> for ListFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Plain => ListFormat::Plain,
            FormatArg::Tsv => ListFormat::Tsv,
            FormatArg::Json => ListFormat::Json,
        }
    }
}

impl AlbumArgs {
    /// Input given on the command line, by precedence: flags, query, words.
    pub fn input(&self) -> Option<QueryInput> {
        if self.band.is_some() || self.album.is_some() {
            return Some(QueryInput::Structured {
                artist: self.band.clone(),
                album: self.album.clone(),
            });
        }
        if let Some(query) = &self.query {
            return Some(QueryInput::FreeText(query.clone()));
        }
        words_input(&self.words)
    }

    pub fn mode(&self) -> SelectionMode {
        if self.all {
            SelectionMode::All
        } else if self.pick {
            SelectionMode::Interactive
        } else {
            SelectionMode::First
        }
    }
}

impl ArtistArgs {
    pub fn input(&self) -> Option<QueryInput> {
        words_input(&self.words)
    }

    /// Interactive unless told otherwise or no terminal is attached.
    pub fn mode(&self, interactive_terminal: bool) -> SelectionMode {
        if self.all {
            SelectionMode::All
        } else if self.first || !interactive_terminal {
            SelectionMode::First
        } else {
            SelectionMode::Interactive
        }
    }
}

fn words_input(words: &[String]) -> Option<QueryInput> {
    if words.is_empty() {
        None
    } else {
        Some(QueryInput::FreeText(words.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_album_flags() {
        let cli = parse(&["albumlink", "album", "-b", "Metallica", "-a", "Master of Puppets"]);
        let Command::Album(args) = cli.command else {
            panic!("expected album command");
        };

        assert_eq!(
            args.input(),
            Some(QueryInput::structured("Metallica", "Master of Puppets"))
        );
        assert_eq!(args.mode(), SelectionMode::First);
    }

    #[test]
    fn test_album_words_joined() {
        let cli = parse(&["albumlink", "album", "Pink", "Floyd", "-", "Animals", "--pick"]);
        let Command::Album(args) = cli.command else {
            panic!("expected album command");
        };

        assert_eq!(
            args.input(),
            Some(QueryInput::FreeText("Pink Floyd - Animals".into()))
        );
        assert_eq!(args.mode(), SelectionMode::Interactive);
    }

    #[test]
    fn test_query_conflicts_with_band() {
        assert!(Cli::try_parse_from(["albumlink", "album", "-q", "x", "-b", "y"]).is_err());
        assert!(Cli::try_parse_from(["albumlink", "album", "--pick", "--all", "x"]).is_err());
    }

    #[test]
    fn test_no_input_is_none() {
        let cli = parse(&["albumlink", "album"]);
        let Command::Album(args) = cli.command else {
            panic!("expected album command");
        };
        assert_eq!(args.input(), None);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&[
            "albumlink", "artist", "The", "Beatles", "--market", "GB", "--list-only", "--format",
            "tsv",
        ]);

        assert_eq!(cli.market.as_deref(), Some("GB"));
        assert!(cli.list_only);
        assert_eq!(ListFormat::from(cli.format), ListFormat::Tsv);
    }

    #[test]
    fn test_artist_mode() {
        let args = ArtistArgs::default();
        assert_eq!(args.mode(true), SelectionMode::Interactive);
        assert_eq!(args.mode(false), SelectionMode::First);

        let first = ArtistArgs {
            first: true,
            ..ArtistArgs::default()
        };
        assert_eq!(first.mode(true), SelectionMode::First);
    }
}
