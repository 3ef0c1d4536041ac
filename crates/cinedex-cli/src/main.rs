//! cinedex - TMDB movie and TV lookup CLI.

/// Application configuration (TOML).
mod config;
/// Log-line rendering of TMDB records.
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, TmdbConfig, resolve_config_path};
use cinedex_api::tmdb::{
    CachedTmdbClient, DEFAULT_IMAGE_SIZE, FIRST_PAGE, ListEndpoint, Page, SearchMovieParams,
    SearchTvParams, TmdbApi, TmdbClient,
};

/// Environment variable that overrides `tmdb.api_key`.
const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Maximum number of detail requests in flight for multi-ID lookups.
const DETAILS_CONCURRENCY: usize = 4;

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Query movies.
    Movie(MovieCommand),
    /// Query TV series.
    Tv(TvCommand),
    /// Search movies or TV series by title.
    Search(SearchCommand),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for the `movie` subcommand.
#[derive(clap::Args)]
struct MovieCommand {
    /// Movie subcommand to run.
    #[command(subcommand)]
    command: MovieSubcommands,
}

/// Available movie subcommands.
#[derive(Subcommand)]
enum MovieSubcommands {
    /// Show full details of one or more movies.
    Details(IdsArgs),
    /// List popular movies.
    Popular(PageArgs),
    /// List movies similar to a movie.
    Similar(RelatedArgs),
    /// List movies recommended for a movie.
    Recommended(RelatedArgs),
    /// List trailers and clips of a movie.
    Videos(IdArgs),
    /// Show IDs of a movie on other sites.
    ExternalIds(IdArgs),
}

/// Arguments for the `tv` subcommand.
#[derive(clap::Args)]
struct TvCommand {
    /// TV subcommand to run.
    #[command(subcommand)]
    command: TvSubcommands,
}

/// Available TV subcommands.
#[derive(Subcommand)]
enum TvSubcommands {
    /// Show full details of one or more series.
    Details(IdsArgs),
    /// List popular series.
    Popular(PageArgs),
    /// List series similar to a series.
    Similar(RelatedArgs),
    /// List series recommended for a series.
    Recommended(RelatedArgs),
    /// Show the episodes of a season.
    Season(SeasonArgs),
    /// List trailers and clips of a series.
    Videos(IdArgs),
    /// Show IDs of a series on other sites.
    ExternalIds(IdArgs),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchCommand {
    /// Search subcommand to run.
    #[command(subcommand)]
    command: SearchSubcommands,
}

/// Available search subcommands.
#[derive(Subcommand)]
enum SearchSubcommands {
    /// Search for movies.
    Movie(SearchMovieArgs),
    /// Search for TV series.
    Tv(SearchTvArgs),
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a config file.
    Init(ConfigInitArgs),
    /// Print the resolved config file path.
    Path,
}

/// A single TMDB ID.
#[derive(clap::Args)]
struct IdArgs {
    /// TMDB ID.
    #[arg(long, required = true)]
    id: u64,
}

/// One or more TMDB IDs, fetched concurrently.
#[derive(clap::Args)]
struct IdsArgs {
    /// TMDB IDs (repeat or comma-separate).
    #[arg(long = "id", required = true, value_delimiter = ',')]
    ids: Vec<u64>,
}

/// Paging options of list commands.
#[derive(clap::Args)]
struct PageArgs {
    /// First page to fetch.
    #[arg(long, default_value_t = FIRST_PAGE, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
    /// Number of pages to walk.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,
}

/// Arguments for `similar` and `recommended`.
#[derive(clap::Args)]
struct RelatedArgs {
    /// TMDB ID of the source title.
    #[arg(long, required = true)]
    id: u64,
    /// Paging options.
    #[command(flatten)]
    paging: PageArgs,
}

/// Arguments for the `tv season` subcommand.
#[derive(clap::Args)]
struct SeasonArgs {
    /// TMDB series ID.
    #[arg(long, required = true)]
    id: u64,
    /// Season number (0 = specials).
    #[arg(long, required = true)]
    season: u32,
}

/// Arguments for the `search movie` subcommand.
#[derive(clap::Args)]
struct SearchMovieArgs {
    /// Search query (e.g. "The Matrix").
    #[arg(long, required = true)]
    query: String,
    /// Filter by year.
    #[arg(long)]
    year: Option<u32>,
    /// Filter by primary release year.
    #[arg(long)]
    primary_release_year: Option<u32>,
    /// Filter by region (ISO 3166-1).
    #[arg(long)]
    region: Option<String>,
    /// Include adult titles.
    #[arg(long)]
    include_adult: Option<bool>,
    /// Paging options.
    #[command(flatten)]
    paging: PageArgs,
}

/// Arguments for the `search tv` subcommand.
#[derive(clap::Args)]
struct SearchTvArgs {
    /// Search query (e.g. "Breaking Bad").
    #[arg(long, required = true)]
    query: String,
    /// Filter by year.
    #[arg(long)]
    year: Option<u32>,
    /// Filter by first air date year.
    #[arg(long)]
    first_air_date_year: Option<u32>,
    /// Include adult titles.
    #[arg(long)]
    include_adult: Option<bool>,
    /// Paging options.
    #[command(flatten)]
    paging: PageArgs,
}

/// Arguments for the `config init` subcommand.
#[derive(clap::Args)]
struct ConfigInitArgs {
    /// TMDB API key to store.
    #[arg(long)]
    api_key: Option<String>,
    /// Response language to store (e.g. "ja-JP").
    #[arg(long)]
    language: Option<String>,
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// A configured client plus the display settings of one run.
struct Session {
    /// Caching TMDB client shared by every request of the run.
    client: CachedTmdbClient<TmdbClient>,
    /// Poster size segment for printed image URLs.
    image_size: String,
}

impl Session {
    /// Loads the config file and builds the caching client.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded, no API key is
    /// available, or the client fails to build.
    #[instrument(skip_all)]
    fn open(dir: Option<&PathBuf>) -> Result<Self> {
        let path = resolve_config_path(dir)?;
        let config = AppConfig::load(&path)?;
        let client = build_tmdb_client(&config.tmdb, std::env::var(API_KEY_ENV).ok())?;
        Ok(Self {
            client: CachedTmdbClient::new(client),
            image_size: config
                .tmdb
                .image_size
                .unwrap_or_else(|| String::from(DEFAULT_IMAGE_SIZE)),
        })
    }

    /// Logs cache occupancy at debug level.
    async fn log_cache_stats(&self) {
        let stats = self.client.stats().await;
        tracing::debug!(
            movie_details = stats.movie_details,
            movie_summaries = stats.movie_summaries,
            tv_details = stats.tv_details,
            tv_summaries = stats.tv_summaries,
            tv_seasons = stats.tv_seasons,
            "cache statistics"
        );
    }
}

/// Picks the API key, preferring the environment over the config file.
///
/// # Errors
///
/// Returns an error if neither source provides a non-empty key.
fn resolve_api_key(from_env: Option<String>, from_config: Option<&str>) -> Result<String> {
    from_env
        .filter(|key| !key.is_empty())
        .or_else(|| from_config.filter(|key| !key.is_empty()).map(String::from))
        .context("TMDB API key is required (set TMDB_API_KEY or tmdb.api_key)")
}

/// Builds a `TmdbClient` from the `[tmdb]` config section.
///
/// # Errors
///
/// Returns an error if no API key is available, `base_url` is not a valid
/// URL, or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &TmdbConfig, env_api_key: Option<String>) -> Result<TmdbClient> {
    let api_key = resolve_api_key(env_api_key, config.api_key.as_deref())?;

    let mut builder = TmdbClient::builder().api_key(api_key).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(ref base_url) = config.base_url {
        let url = base_url
            .parse::<reqwest::Url>()
            .with_context(|| format!("invalid tmdb.base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }
    if let Some(ref language) = config.language {
        builder = builder.language(language);
    }
    builder.build().context("failed to build TMDB client")
}

/// Logs `pages` pages starting at `first`, following continuations.
///
/// Stops early at the last page.
///
/// # Errors
///
/// Returns an error if fetching a following page fails.
async fn walk_pages<L, F>(session: &Session, first: Page<L>, pages: u32, log_item: F) -> Result<()>
where
    L: ListEndpoint,
    F: Fn(&L::Item),
{
    let mut current = first;
    let mut remaining = pages;
    loop {
        for item in current.results() {
            log_item(item);
        }
        output::page_footer(
            current.page,
            current.total_pages(),
            current.response.total_results,
        );

        remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            break;
        }
        let next_page = current.page.saturating_add(1);
        match current.fetch_next(&session.client).await {
            Some(next) => {
                current = next.with_context(|| format!("failed to fetch page {next_page}"))?;
            }
            None => break,
        }
    }
    Ok(())
}

/// Runs a `movie` subcommand.
///
/// # Errors
///
/// Returns an error if a TMDB request fails.
#[instrument(skip_all)]
async fn run_movie(session: &Session, command: MovieSubcommands) -> Result<()> {
    let api = &session.client;
    match command {
        MovieSubcommands::Details(args) => {
            let movies: Vec<_> = stream::iter(args.ids)
                .map(|id| api.movie_details(id))
                .buffered(DETAILS_CONCURRENCY)
                .try_collect()
                .await
                .context("TMDB movie details request failed")?;
            for (index, details) in movies.iter().enumerate() {
                if index > 0 {
                    tracing::info!("---");
                }
                output::movie_details(details, &session.image_size);
            }
            Ok(())
        }
        MovieSubcommands::Popular(paging) => {
            let first = api
                .movie_popular(paging.page)
                .await
                .context("TMDB movie/popular request failed")?;
            output::movie_header();
            walk_pages(session, first, paging.pages, output::movie_row).await
        }
        MovieSubcommands::Similar(args) => {
            let source = api.movie_simple_details(args.id).await?;
            let first = api
                .movie_similar(args.id, args.paging.page)
                .await
                .context("TMDB movie similar request failed")?;
            output::relative_to("Similar to:", &source);
            output::movie_header();
            walk_pages(session, first, args.paging.pages, output::movie_row).await
        }
        MovieSubcommands::Recommended(args) => {
            let source = api.movie_simple_details(args.id).await?;
            let first = api
                .movie_recommended(args.id, args.paging.page)
                .await
                .context("TMDB movie recommendations request failed")?;
            output::relative_to("Recommended for:", &source);
            output::movie_header();
            walk_pages(session, first, args.paging.pages, output::movie_row).await
        }
        MovieSubcommands::Videos(args) => {
            let videos = api
                .movie_videos(args.id)
                .await
                .context("TMDB movie videos request failed")?;
            output::videos(&videos);
            Ok(())
        }
        MovieSubcommands::ExternalIds(args) => {
            let ids = api
                .movie_external_ids(args.id)
                .await
                .context("TMDB movie external_ids request failed")?;
            output::external_ids(&ids);
            Ok(())
        }
    }
}

/// Runs a `tv` subcommand.
///
/// # Errors
///
/// Returns an error if a TMDB request fails.
#[instrument(skip_all)]
async fn run_tv(session: &Session, command: TvSubcommands) -> Result<()> {
    let api = &session.client;
    match command {
        TvSubcommands::Details(args) => {
            let series: Vec<_> = stream::iter(args.ids)
                .map(|id| api.tv_details(id))
                .buffered(DETAILS_CONCURRENCY)
                .try_collect()
                .await
                .context("TMDB tv details request failed")?;
            for (index, details) in series.iter().enumerate() {
                if index > 0 {
                    tracing::info!("---");
                }
                output::tv_details(details, &session.image_size);
            }
            Ok(())
        }
        TvSubcommands::Popular(paging) => {
            let first = api
                .tv_popular(paging.page)
                .await
                .context("TMDB tv/popular request failed")?;
            output::tv_header();
            walk_pages(session, first, paging.pages, output::tv_row).await
        }
        TvSubcommands::Similar(args) => {
            let source = api.tv_simple_details(args.id).await?;
            let first = api
                .tv_similar(args.id, args.paging.page)
                .await
                .context("TMDB tv similar request failed")?;
            output::relative_to("Similar to:", &source);
            output::tv_header();
            walk_pages(session, first, args.paging.pages, output::tv_row).await
        }
        TvSubcommands::Recommended(args) => {
            let source = api.tv_simple_details(args.id).await?;
            let first = api
                .tv_recommended(args.id, args.paging.page)
                .await
                .context("TMDB tv recommendations request failed")?;
            output::relative_to("Recommended for:", &source);
            output::tv_header();
            walk_pages(session, first, args.paging.pages, output::tv_row).await
        }
        TvSubcommands::Season(args) => {
            let season = api
                .tv_season(args.id, args.season)
                .await
                .context("TMDB tv season request failed")?;
            output::season(&season);
            Ok(())
        }
        TvSubcommands::Videos(args) => {
            let videos = api
                .tv_videos(args.id)
                .await
                .context("TMDB tv videos request failed")?;
            output::videos(&videos);
            Ok(())
        }
        TvSubcommands::ExternalIds(args) => {
            let ids = api
                .tv_external_ids(args.id)
                .await
                .context("TMDB tv external_ids request failed")?;
            output::external_ids(&ids);
            Ok(())
        }
    }
}

/// Runs a `search` subcommand.
///
/// # Errors
///
/// Returns an error if a TMDB request fails.
#[instrument(skip_all)]
async fn run_search(session: &Session, command: SearchSubcommands) -> Result<()> {
    let api = &session.client;
    match command {
        SearchSubcommands::Movie(args) => {
            let params = SearchMovieParams {
                query: args.query,
                primary_release_year: args.primary_release_year,
                year: args.year,
                region: args.region,
                include_adult: args.include_adult,
            };
            let first = api
                .search_movie(&params, args.paging.page)
                .await
                .context("TMDB search/movie request failed")?;
            output::movie_header();
            walk_pages(session, first, args.paging.pages, output::movie_row).await
        }
        SearchSubcommands::Tv(args) => {
            let params = SearchTvParams {
                query: args.query,
                first_air_date_year: args.first_air_date_year,
                year: args.year,
                include_adult: args.include_adult,
            };
            let first = api
                .search_tv(&params, args.paging.page)
                .await
                .context("TMDB search/tv request failed")?;
            output::tv_header();
            walk_pages(session, first, args.paging.pages, output::tv_row).await
        }
    }
}

/// Runs a `config` subcommand.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved, the file already
/// exists without `--force`, or writing fails.
#[instrument(skip_all)]
fn run_config(command: &ConfigSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    match command {
        ConfigSubcommands::Path => {
            tracing::info!("{}", path.display());
            Ok(())
        }
        ConfigSubcommands::Init(args) => {
            if path.exists() && !args.force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            let config = AppConfig {
                tmdb: TmdbConfig {
                    api_key: args.api_key.clone(),
                    language: args.language.clone(),
                    ..TmdbConfig::default()
                },
            };
            config.save(&path)?;
            tracing::info!("Wrote {}", path.display());
            Ok(())
        }
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Movie(cmd) => {
            let session = Session::open(dir)?;
            let result = run_movie(&session, cmd.command).await;
            session.log_cache_stats().await;
            result
        }
        Commands::Tv(cmd) => {
            let session = Session::open(dir)?;
            let result = run_tv(&session, cmd.command).await;
            session.log_cache_stats().await;
            result
        }
        Commands::Search(cmd) => {
            let session = Session::open(dir)?;
            let result = run_search(&session, cmd.command).await;
            session.log_cache_stats().await;
            result
        }
        Commands::Config(cmd) => run_config(&cmd.command, dir),
    }
}
