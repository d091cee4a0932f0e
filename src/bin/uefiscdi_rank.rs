use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use uefiscdi_rank::app::{App, SearchFilter};
use uefiscdi_rank::domain::{MetricFamily, Quartile, Query};
use uefiscdi_rank::error::RankError;
use uefiscdi_rank::fetch::HttpSourceClient;
use uefiscdi_rank::output::JsonOutput;
use uefiscdi_rank::registry;
use uefiscdi_rank::rows::CsvRowSource;
use uefiscdi_rank::store::CacheStore;

#[derive(Parser)]
#[command(name = "uefiscdi-rank")]
#[command(about = "Index and query the UEFISCDI journal ranking databases")]
#[command(version, author)]
struct Cli {
    /// Print machine-readable JSON instead of plain lines.
    #[arg(long, global = true)]
    json: bool,

    /// Override the cache directory.
    #[arg(long, global = true)]
    cache_dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List known databases and registered editions")]
    Databases,
    #[command(about = "Download the source document for one edition")]
    Fetch(FetchArgs),
    #[command(about = "Build and cache a record store from extracted rows")]
    Index(IndexArgs),
    #[command(about = "Resolve one journal by name and/or ISSN")]
    Resolve(ResolveArgs),
    #[command(about = "Search a cached edition")]
    Search(SearchArgs),
    #[command(about = "List cached editions")]
    List,
}

#[derive(Args)]
struct FetchArgs {
    #[arg(short = 'd', long = "database", value_enum, default_value = "ais")]
    family: MetricFamily,

    /// Edition year the database was released.
    #[arg(long, default_value_t = registry::DEFAULT_VERSION)]
    year: i32,

    /// Destination path (defaults to the cache downloads directory).
    #[arg(long)]
    out: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct IndexArgs {
    #[arg(short = 'd', long = "database", value_enum, default_value = "ais")]
    family: MetricFamily,

    #[arg(long, default_value_t = registry::DEFAULT_VERSION)]
    year: i32,

    /// CSV file of rows extracted from the source document.
    #[arg(long)]
    rows: Utf8PathBuf,
}

#[derive(Args)]
struct ResolveArgs {
    #[arg(short = 'd', long = "database", value_enum, default_value = "ais")]
    family: MetricFamily,

    #[arg(long, default_value_t = registry::DEFAULT_VERSION)]
    year: i32,

    /// Journal name to match after normalization.
    #[arg(long)]
    name: Option<String>,

    /// Print ISSN. Takes precedence over the name when both match.
    #[arg(long)]
    issn: Option<String>,

    /// Electronic ISSN.
    #[arg(long)]
    eissn: Option<String>,

    /// Show all candidates, not only the primary match.
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct SearchArgs {
    #[arg(short = 'd', long = "database", value_enum, default_value = "ais")]
    family: MetricFamily,

    #[arg(long, default_value_t = registry::DEFAULT_VERSION)]
    year: i32,

    /// Free-text journal name query.
    query: Option<String>,

    /// Restrict results to categories containing this substring.
    #[arg(short = 'c', long)]
    category: Option<String>,

    /// Minimum quartile to display.
    #[arg(short = 'q', long, value_enum)]
    quartile: Option<Quartile>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(rank) = report.downcast_ref::<RankError>() {
            return ExitCode::from(map_exit_code(rank));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &RankError) -> u8 {
    match error {
        RankError::NotIndexed { .. }
        | RankError::UnknownEdition { .. }
        | RankError::InvalidQuery => 2,
        RankError::SourceHttp(_) | RankError::SourceStatus { .. } | RankError::RowSource(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cache = match &cli.cache_dir {
        Some(root) => CacheStore::new_with_path(root.clone()),
        None => CacheStore::new().into_diagnostic()?,
    };

    match &cli.command {
        Commands::Databases => run_databases(),
        Commands::Fetch(args) => {
            let app = App::new(cache, HttpSourceClient::new().into_diagnostic()?);
            let result = app
                .fetch(args.family, args.year, args.out.clone())
                .into_diagnostic()?;
            if cli.json {
                JsonOutput::print_fetch(&result).into_diagnostic()?;
            } else {
                println!("{} -> {} ({} bytes)", result.url, result.path, result.bytes);
            }
            Ok(())
        }
        Commands::Index(args) => {
            let app = App::new(cache, HttpSourceClient::new().into_diagnostic()?);
            let source = CsvRowSource::new(args.rows.clone());
            let result = app
                .index(&source, args.family, args.year)
                .into_diagnostic()?;
            if cli.json {
                JsonOutput::print_index(&result).into_diagnostic()?;
            } else {
                println!(
                    "indexed {} {}: {} rows -> {} records ({})",
                    result.family,
                    result.version,
                    result.rows,
                    result.records,
                    result.diagnostics.summary()
                );
                println!("saved to {}", result.path);
            }
            Ok(())
        }
        Commands::Resolve(args) => {
            let app = App::new(cache, HttpSourceClient::new().into_diagnostic()?);
            let query = Query {
                name: args.name.clone(),
                issn: args.issn.clone(),
                eissn: args.eissn.clone(),
            };
            let result = app
                .resolve(&query, args.family, args.year)
                .into_diagnostic()?;
            if cli.json {
                JsonOutput::print_resolve(&result).into_diagnostic()?;
            } else if result.matches.is_empty() {
                println!("no match");
            } else {
                for candidate in &result.matches {
                    if !args.all && !candidate.primary {
                        continue;
                    }
                    let marker = if candidate.primary { "*" } else { " " };
                    println!(
                        "{marker} {} issns: {}",
                        candidate.record.stringify(result.family),
                        candidate
                            .record
                            .issns
                            .iter()
                            .map(|issn| issn.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
            }
            Ok(())
        }
        Commands::Search(args) => {
            let app = App::new(cache, HttpSourceClient::new().into_diagnostic()?);
            let filter = SearchFilter {
                name: args.query.clone(),
                category: args.category.clone(),
                min_quartile: args.quartile,
            };
            let result = app
                .search(args.family, args.year, &filter)
                .into_diagnostic()?;
            if cli.json {
                JsonOutput::print_search(&result).into_diagnostic()?;
            } else {
                for record in &result.records {
                    println!("{}", record.stringify(result.family));
                }
            }
            Ok(())
        }
        Commands::List => {
            let app = App::new(cache, HttpSourceClient::new().into_diagnostic()?);
            let result = app.list().into_diagnostic()?;
            if cli.json {
                JsonOutput::print_list(&result).into_diagnostic()?;
            } else {
                for edition in &result.editions {
                    println!(
                        "{} {} {} records (indexed {})",
                        edition.family, edition.version, edition.records, edition.indexed_at
                    );
                }
            }
            Ok(())
        }
    }
}

fn run_databases() -> miette::Result<()> {
    for family in MetricFamily::all() {
        println!("{}", family.as_str());
        println!("    {}", family.description());
    }
    println!(
        "editions: {}",
        registry::versions()
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
