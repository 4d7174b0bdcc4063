use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mwpages::stats::DumpStats;
use mwpages::summarize::{summarize_dump, OutputFormat, SummaryOptions};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "mwpages")]
#[command(about = "Stream pages and revisions out of MediaWiki XML dumps")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one summary row per page (metadata plus revision counts)
    Pages(PagesArgs),
    /// Print page, revision and namespace totals for a dump
    Stats(StatsArgs),
}

#[derive(Args)]
struct PagesArgs {
    /// Path to the dump file (.xml or .xml.bz2)
    #[arg(short, long)]
    input: String,

    /// Output file for page summaries
    #[arg(short, long)]
    output: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Limit number of pages to process (for testing)
    #[arg(long)]
    limit: Option<u64>,
}

#[derive(Args)]
struct StatsArgs {
    /// Path to the dump file (.xml or .xml.bz2)
    #[arg(short, long)]
    input: String,

    /// Limit number of pages to process (for testing)
    #[arg(long)]
    limit: Option<u64>,
}

fn run_pages(args: PagesArgs) -> Result<()> {
    let start = Instant::now();
    let stats = summarize_dump(&SummaryOptions {
        input: &args.input,
        output: Some(&args.output),
        format: args.format,
        limit: args.limit,
    })?;
    info!(
        duration_secs = start.elapsed().as_secs_f64(),
        output = %args.output,
        "Page summaries written"
    );
    print_summary(&stats, start);
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let start = Instant::now();
    let stats = summarize_dump(&SummaryOptions {
        input: &args.input,
        output: None,
        format: OutputFormat::Csv,
        limit: args.limit,
    })?;
    print_summary(&stats, start);
    Ok(())
}

fn print_summary(stats: &DumpStats, start: Instant) {
    println!();
    println!("=== Summary ===");
    println!("Total time:         {:.2}s", start.elapsed().as_secs_f64());
    println!();
    println!("Pages:              {}", stats.pages());
    println!("Redirects:          {}", stats.redirects());
    println!("Revisions:          {}", stats.revisions());
    println!("Without revisions:  {}", stats.pages_without_revisions());
    for (ns, count) in stats.namespaces() {
        println!("  ns {:>5}:         {}", ns, count);
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
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Pages(args) => run_pages(args),
        Commands::Stats(args) => run_stats(args),
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
