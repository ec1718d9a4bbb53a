use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use theseus::extract::{self, DumpPaths};
use theseus::graph::WikiGraph;
use theseus::load;
use theseus::search::{shortest_path, PathOutcome};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "theseus")]
#[command(about = "Extract wiki link dumps and answer shortest-path queries between articles")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the page/linktarget/pagelinks dumps into CSV artifacts
    Extract(ExtractArgs),
    /// Load the CSV artifacts and answer shortest-path queries
    Query(QueryArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to the page dump (.sql.bz2)
    #[arg(long)]
    pages: String,

    /// Path to the linktarget dump (.sql.bz2)
    #[arg(long)]
    linktargets: String,

    /// Path to the pagelinks dump (.sql.bz2)
    #[arg(long)]
    pagelinks: String,

    /// Output directory for the CSV artifacts
    #[arg(short, long)]
    output: String,
}

#[derive(Args)]
struct QueryArgs {
    /// Directory containing pages.csv and links.csv
    #[arg(short, long)]
    output: String,

    /// Start title for a one-shot query (underscores for spaces)
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// End title for a one-shot query (underscores for spaces)
    #[arg(long, requires = "from")]
    to: Option<String>,
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {}", args.output))?;

    let paths = DumpPaths {
        pages: args.pages,
        linktargets: args.linktargets,
        pagelinks: args.pagelinks,
    };

    let start = Instant::now();
    let stats = extract::run_extraction(&paths, &args.output)?;
    let duration = start.elapsed();

    println!();
    println!("=== Summary ===");
    println!("Extraction time:    {:.2}s", duration.as_secs_f64());
    println!();
    println!("Pages kept:         {}", stats.pages_kept);
    println!("Duplicate titles:   {}", stats.duplicate_titles);
    println!("Targets mapped:     {}", stats.targets_mapped);
    println!("Edges written:      {}", stats.edges_written);
    println!("Unresolved links:   {}", stats.unresolved_links);
    println!("Malformed rows:     {}", stats.malformed_rows);

    Ok(())
}

fn run_query(args: QueryArgs) -> Result<()> {
    let output_dir = Path::new(&args.output);
    let pages_path = output_dir.join(extract::PAGES_CSV);
    let links_path = output_dir.join(extract::LINKS_CSV);

    println!("Loading graph...");
    let start = Instant::now();
    let (graph, report) = load::build_graph(&pages_path, &links_path)?;
    info!(
        duration_secs = start.elapsed().as_secs_f64(),
        nodes = report.nodes,
        edges = report.edges,
        "Graph loaded"
    );
    println!(
        "Graph ready with {} pages and {} links.",
        report.nodes, report.edges
    );

    match (args.from, args.to) {
        (Some(from), Some(to)) => {
            print_outcome(&shortest_path(&graph, &from, &to));
            Ok(())
        }
        (None, None) => query_loop(&graph),
        // clap's `requires` rules reject the half-specified cases already
        _ => bail!("--from and --to must be given together"),
    }
}

/// Reads query pairs from stdin until EOF or an explicit quit. The graph is
/// immutable here, so interrupting between queries loses nothing.
fn query_loop(graph: &WikiGraph) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    println!("Enter two article titles separated by a space (underscores for spaces within a title). 'quit' exits.");
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        let mut titles = trimmed.split_whitespace();
        match (titles.next(), titles.next()) {
            (Some(from), Some(to)) => print_outcome(&shortest_path(graph, from, to)),
            _ => println!("Expected two titles, got: {}", trimmed),
        }
    }
    Ok(())
}

fn print_outcome(outcome: &PathOutcome) {
    match outcome {
        PathOutcome::Path(titles) => println!("{}", titles.join(" -> ")),
        PathOutcome::NoRoute => println!("No path found!"),
        PathOutcome::UnknownTitle(title) => println!("Title not found: {}", title),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Query(args) => run_query(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
