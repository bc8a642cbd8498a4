mod args;
mod presenter;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use albumlink_core::error::exit_code;
use albumlink_core::{
    default_config_path, load_config, load_config_or_default, render_listing, validate_config,
    CandidateList, Config, ConfigCredentialStore, ConfigError, DeliveryChain, FileTokenCache,
    HttpBackend, ListFormat, Presenter, QueryBuilder, QueryInput, ReqwestBackend,
    ResilientTransport, Resolution, ResolveError, Resolver, ResolverSettings, SanitizedConfig,
    SearchQuery, Selection, SelectionError, SelectionMode, SpotifyCatalog, StdoutSink,
    TokenManager,
};

use args::{AlbumArgs, ArtistArgs, Cli, Command};

/// Used when the platform has no user config directory.
const FALLBACK_CONFIG_FILE: &str = "albumlink.toml";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // The pipeline runs on its own task so a blocking terminal prompt
    // cannot keep Ctrl-C from being observed here.
    let pipeline = tokio::spawn(run(cli));

    let code = tokio::select! {
        joined = pipeline => match joined {
            Ok(code) => code,
            Err(e) => {
                error!("Pipeline task failed: {}", e);
                exit_code::FAILURE
            }
        },
        _ = signal::ctrl_c() => {
            eprintln!();
            eprintln!("Cancelled.");
            exit_code::CANCELLED
        }
    };

    std::process::exit(code);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run(cli: Cli) -> i32 {
    match execute(cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => report(&e),
    }
}

/// Print a failure and map it to the process exit status.
fn report(error: &anyhow::Error) -> i32 {
    if let Some(resolve) = error.downcast_ref::<ResolveError>() {
        if resolve.is_cancelled() {
            eprintln!("Cancelled.");
        } else if resolve.is_not_found() {
            eprintln!("❌ {}", resolve);
        } else {
            eprintln!("❌ {:#}", error);
        }
        return resolve.exit_code();
    }

    eprintln!("❌ {:#}", error);
    if error.downcast_ref::<ConfigError>().is_some() {
        exit_code::INVALID_INPUT
    } else {
        exit_code::FAILURE
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = load_configuration(&cli)?;

    match &cli.command {
        Command::Config => print_config(&config),
        Command::Album(args) => run_album(&cli, &config, args).await,
        Command::Artist(args) => run_artist(&cli, &config, args).await,
    }
}

fn load_configuration(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => {
            let path = default_config_path().unwrap_or_else(|| PathBuf::from(FALLBACK_CONFIG_FILE));
            debug!(path = %path.display(), "Loading configuration");
            load_config_or_default(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
    };

    if let Some(market) = &cli.market {
        config.search.market = market.trim().to_uppercase();
    }
    if let Some(limit) = cli.limit {
        config.search.album_limit = limit;
        config.search.artist_limit = limit;
    }

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

fn print_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(&SanitizedConfig::from(config))
        .context("Failed to render configuration")?;
    write_stdout(&rendered)
}

fn build_resolver(config: &Config) -> Result<Resolver> {
    let backend: Arc<dyn HttpBackend> = Arc::new(
        ReqwestBackend::new(&config.http.user_agent).context("Failed to create HTTP client")?,
    );
    let transport = ResilientTransport::from_config(backend, &config.http);

    let store = ConfigCredentialStore::new(config);
    let mut tokens = TokenManager::from_store(&store, transport.clone(), &config.catalog.token_url)
        .map_err(ResolveError::from)?;
    if config.token_cache.enabled {
        if let Some(path) = config.token_cache.resolved_path() {
            debug!(path = %path.display(), "Token cache enabled");
            tokens = tokens.with_cache(FileTokenCache::new(path));
        }
    }

    let catalog = SpotifyCatalog::new(
        Arc::new(tokens),
        transport,
        &config.catalog,
        &config.search,
    );
    Ok(Resolver::new(
        Arc::new(catalog),
        ResolverSettings::from(&config.search),
    ))
}

fn build_query(config: &Config, limit: u32, input: &QueryInput) -> Result<SearchQuery> {
    let query = QueryBuilder::new(&config.search.market, limit as usize)
        .build(input)
        .map_err(ResolveError::from)?;
    info!(query = %query.catalog_query(), market = %query.market, "Built search query");
    Ok(query)
}

async fn run_album(cli: &Cli, config: &Config, args: &AlbumArgs) -> Result<()> {
    let input = match args.input() {
        Some(input) => input,
        None => read_album_input().await?,
    };
    let query = build_query(config, config.search.album_limit, &input)?;
    let resolver = build_resolver(config)?;

    if cli.list_only {
        let albums = resolver.list_albums(&query).await?;
        return print_listing(&albums, cli.format.into());
    }

    let mode = terminal_mode(args.mode());
    let presenter = presenter_for(mode);
    let resolution = resolver
        .resolve_album(&query, mode, presenter.as_deref())
        .await?;
    deliver(cli, &resolution).await
}

async fn run_artist(cli: &Cli, config: &Config, args: &ArtistArgs) -> Result<()> {
    let input = match args.input() {
        Some(input) => input,
        None => read_artist_input().await?,
    };
    let query = build_query(config, config.search.artist_limit, &input)?;
    let resolver = build_resolver(config)?;

    let mode = args.mode(io::stdin().is_terminal());
    let presenter = presenter_for(mode);

    if cli.list_only {
        let (artist, albums) = resolver
            .list_artist_albums(&query, mode, presenter.as_deref())
            .await?;
        eprintln!("Albums by {}:", artist.display_name);
        return print_listing(&albums, cli.format.into());
    }

    let resolution = resolver
        .resolve_artist(&query, mode, presenter.as_deref())
        .await?;
    deliver(cli, &resolution).await
}

/// Interactive selection needs a terminal to read from.
fn terminal_mode(mode: SelectionMode) -> SelectionMode {
    if mode == SelectionMode::Interactive && !io::stdin().is_terminal() {
        warn!("Standard input is not a terminal, taking the first result");
        SelectionMode::First
    } else {
        mode
    }
}

fn presenter_for(mode: SelectionMode) -> Option<Box<dyn Presenter>> {
    (mode == SelectionMode::Interactive).then(presenter::terminal_presenter)
}

/// Band/album from piped stdin, else from prompts on the terminal.
async fn read_album_input() -> Result<QueryInput> {
    if !io::stdin().is_terminal() {
        return read_piped().await;
    }
    let band = prompt("Band name: ").await?;
    let album = prompt("Album name: ").await?;
    Ok(QueryInput::Structured {
        artist: Some(band),
        album: Some(album),
    })
}

async fn read_artist_input() -> Result<QueryInput> {
    if !io::stdin().is_terminal() {
        return read_piped().await;
    }
    Ok(QueryInput::FreeText(prompt("Artist name: ").await?))
}

async fn read_piped() -> Result<QueryInput> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("Failed to read standard input")?;
    Ok(QueryInput::Piped(text))
}

async fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush().context("Failed to write prompt")?;

    let mut line = String::new();
    let read = BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read answer")?;
    if read == 0 {
        return Err(ResolveError::from(SelectionError::Cancelled).into());
    }
    Ok(line.trim().to_string())
}

fn print_listing(candidates: &CandidateList, format: ListFormat) -> Result<()> {
    let rendered = render_listing(candidates, format).context("Failed to render listing")?;
    write_stdout(&rendered)
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write to standard output")
}

fn describe(selection: &Selection) -> String {
    match selection {
        Selection::One(candidate) => candidate.summary(),
        Selection::All(candidates) => format!("{} albums", candidates.len()),
    }
}

/// Clipboard first unless disabled; stdout whenever the clipboard is not used.
async fn deliver(cli: &Cli, resolution: &Resolution) -> Result<()> {
    let summary = describe(&resolution.selection);
    let stdout = DeliveryChain::new().with_sink(StdoutSink);

    if cli.no_clipboard {
        stdout.deliver(&resolution.selection).await?;
        eprintln!("✅ {}", summary);
        return Ok(());
    }

    match DeliveryChain::clipboard().deliver(&resolution.selection).await {
        Ok(sink) => {
            debug!(sink = %sink, "Selection copied");
            eprintln!("✅ Copied to clipboard: {}", summary);
            if let Selection::One(candidate) = &resolution.selection {
                eprintln!("   {}", candidate.canonical_url);
            }
        }
        Err(e) => {
            warn!(error = %e, "Clipboard unavailable");
            stdout.deliver(&resolution.selection).await?;
            eprintln!("✅ {} (clipboard unavailable, printed instead)", summary);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use albumlink_core::testing::fixtures;
    use albumlink_core::SearchError;

    #[test]
    fn test_report_maps_exit_codes() {
        let not_found: anyhow::Error = ResolveError::NoResults {
            query: "Nonexistent".into(),
        }
        .into();
        assert_eq!(report(&not_found), exit_code::NOT_FOUND);

        let cancelled: anyhow::Error = ResolveError::from(SelectionError::Cancelled).into();
        assert_eq!(report(&cancelled), exit_code::CANCELLED);

        let failed: anyhow::Error =
            ResolveError::from(SearchError::Decode("bad body".into())).into();
        assert_eq!(report(&failed), exit_code::FAILURE);
    }

    #[test]
    fn test_report_config_error_behind_context() {
        let error = anyhow::Error::from(ConfigError::FileNotFound("/nope.toml".into()))
            .context("Failed to load config");
        assert_eq!(report(&error), exit_code::INVALID_INPUT);

        let other = anyhow::anyhow!("something else");
        assert_eq!(report(&other), exit_code::FAILURE);
    }

    #[test]
    fn test_describe_selection() {
        let one = Selection::One(fixtures::album("a", "Abbey Road", "The Beatles", "1969"));
        assert_eq!(describe(&one), "Abbey Road — The Beatles (1969)");

        let all = Selection::All(CandidateList::new(vec![
            fixtures::album("a", "Abbey Road", "The Beatles", "1969"),
            fixtures::album("b", "Help!", "The Beatles", "1965"),
        ]));
        assert_eq!(describe(&all), "2 albums");
    }

    #[test]
    fn test_missing_credentials_is_invalid_input() {
        let config = Config::default();
        let error = match build_resolver(&config) {
            Ok(_) => panic!("expected missing credentials"),
            Err(e) => e,
        };
        assert_eq!(report(&error), exit_code::INVALID_INPUT);
    }
}
