mod cli;

use cineanalytics::{
    config,
    coordinator::{SearchCoordinator, SearchView, ViewStatus},
    server,
};

use anyhow::Result;
use cine_core::{ListQuery, MovieDetail, MovieSummary};
use cine_tmdb::{MovieSource, TmdbClient};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting CineAnalytics server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cineanalytics=trace,cine_tmdb=debug,tower_http=debug".to_string()
        } else {
            "cineanalytics=info,cine_tmdb=info,tower_http=info".to_string()
        }
    });

    // Logs go to stderr so `--json` output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Trending { json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_movies(ListQuery::Trending, cli.config.as_deref(), json))
        }
        Commands::Search { term, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            let query = ListQuery::from_input(&term);
            rt.block_on(list_movies(query, cli.config.as_deref(), json))
        }
        Commands::Movie { id, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(show_movie(id, cli.config.as_deref(), json))
        }
        Commands::Browse => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(browse(cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("cineanalytics {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn build_client(config: &config::Config) -> TmdbClient {
    TmdbClient::new(config.tmdb.client_options())
}

async fn list_movies(query: ListQuery, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let client = build_client(&config);

    let movies = client.fetch_list(&query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&movies)?);
    } else {
        print_movies(&query.heading(), &movies);
    }
    Ok(())
}

async fn show_movie(id: u64, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let client = build_client(&config);

    let movie = client.detail(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&movie)?);
    } else {
        print_detail(&movie);
    }
    Ok(())
}

/// Drive a live coordinator from stdin. Each line replaces the query text;
/// `:retry` re-issues a failed fetch and `:quit` (or end of input) exits.
async fn browse(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let settings = config.search.settings();
    let source: Arc<dyn MovieSource> = Arc::new(build_client(&config));

    let coordinator = SearchCoordinator::spawn(source, settings);
    let mut views = coordinator.subscribe();

    eprintln!("Type to search, empty line for trending, :retry to retry, :quit to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_printed: Option<SearchView> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim() == ":quit" => break,
                    Some(line) if line.trim() == ":retry" => coordinator.retry(),
                    Some(line) => coordinator.input(line),
                    None => {
                        // Let the last line's quiet period run out, then wait for its result.
                        tokio::time::sleep(settings.debounce + Duration::from_millis(50)).await;
                        let window = settings.request_timeout + Duration::from_secs(1);
                        if let Ok(Ok(view)) =
                            tokio::time::timeout(window, views.wait_for(is_settled)).await
                        {
                            let view = view.clone();
                            print_settled(&view, &mut last_printed);
                        }
                        break;
                    }
                }
            }

            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                print_settled(&view, &mut last_printed);
            }
        }
    }

    coordinator.shutdown();
    Ok(())
}

fn is_settled(view: &SearchView) -> bool {
    !view.loading && view.status != ViewStatus::Debouncing
}

fn print_settled(view: &SearchView, last_printed: &mut Option<SearchView>) {
    if !is_settled(view) || last_printed.as_ref() == Some(view) {
        return;
    }

    match &view.error {
        Some(err) if err.retryable => {
            println!("Error: {} (type :retry to try again)", err.message);
        }
        Some(err) => println!("Error: {}", err.message),
        None => print_movies(&view.heading, &view.results),
    }
    *last_printed = Some(view.clone());
}

fn print_movies(heading: &str, movies: &[MovieSummary]) {
    println!("{} ({})", heading, movies.len());
    if movies.is_empty() {
        println!("  No movies found.");
        return;
    }

    for movie in movies {
        let year = movie
            .year()
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();
        println!(
            "  {:>8}  {:>4.1}  {}{}",
            movie.id, movie.vote_average, movie.title, year
        );
    }
}

fn print_detail(movie: &MovieDetail) {
    println!("{} [{}]", movie.title, movie.id);
    if let Some(ref tagline) = movie.tagline {
        println!("  \"{}\"", tagline);
    }
    if let Some(ref date) = movie.release_date {
        println!("Released: {}", date);
    }
    println!("Rating:   {:.1} / 10", movie.vote_average);
    if let Some(runtime) = movie.runtime_display() {
        println!("Runtime:  {}", runtime);
    }
    if let Some(revenue) = movie.revenue_display() {
        println!("Revenue:  {}", revenue);
    }
    if let Some(key) = movie.trailer_key() {
        println!("Trailer:  https://www.youtube.com/watch?v={}", key);
    }
    if let Some(ref overview) = movie.overview {
        println!("\n{}", overview);
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  TMDB API: {}", config.tmdb.base_url);
            println!(
                "  API key: {}",
                if config.tmdb.api_key.is_empty() {
                    "missing"
                } else {
                    "set"
                }
            );
            println!("  Debounce: {} ms", config.search.debounce_ms);
            println!("  Request timeout: {} ms", config.search.request_timeout_ms);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
