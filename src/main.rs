//! Tribute - kingdom resource-tracking reports
//!
//! A CLI tool that loads the alliance/member/deposit summary from the
//! reports API (or a saved snapshot), aggregates weekly totals and
//! rankings, and writes a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, unreadable snapshot, etc.)
//!   2 - No deposits matched the filter and --fail-on-empty was set

mod analysis;
mod cli;
mod config;
mod fetch;
mod models;
mod report;

use analysis::DepositFilter;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use fetch::{ApiClient, SummarySource};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Report, ReportMetadata, Summary};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args)?;

    info!("Tribute v{}", env!("CARGO_PKG_VERSION"));

    match run_report(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .tribute.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the API URL, token, and ranking sizes.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load, aggregate, and write the report. Returns exit code (0 or 2).
async fn run_report(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let source = match args.input {
        Some(ref path) => SummarySource::File(path.clone()),
        None => SummarySource::Api(
            ApiClient::new(&config.api).context("Failed to set up the API client")?,
        ),
    };

    // Step 1: Load the summary
    println!("📥 Loading summary from: {}", source.describe());
    let summary = load_summary(&source, args.quiet).await?;
    info!(
        "Loaded {} members, {} alliances, {} deposits",
        summary.members.len(),
        summary.alliances.len(),
        summary.deposits.len()
    );

    // Step 2: Select the deposits in scope
    let filter = DepositFilter::new(args.week_from, args.week_to, args.search.as_deref());
    if filter.is_inverted() {
        warn!(
            "Week range {}..{} is inverted; no deposits will match",
            filter.week_from, filter.week_to
        );
    }
    if !filter.is_unrestricted() {
        info!("Filtering deposits: {}", filter);
    }

    if args.dry_run {
        return Ok(handle_dry_run(&summary, &filter));
    }

    let scoped = filter.apply(&summary.deposits);
    info!("{} of {} deposits in scope", scoped.len(), summary.deposits.len());

    // Step 3: Aggregate
    println!("\n🧮 Aggregating {} deposits ({})...", scoped.len(), filter);

    let limits = &config.aggregation;
    let mut alliances = analysis::rank_alliances(&summary.alliances);
    alliances.truncate(limits.top_alliances);

    let report = Report {
        metadata: ReportMetadata {
            source: source.describe(),
            generated_at: Utc::now(),
            filter: filter.clone(),
            deposits_in_scope: scoped.len(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        overview: analysis::overview(&summary),
        weekly: analysis::recent_weeks(&scoped, limits.week_window),
        members: analysis::rank_members(&scoped, limits.top_members),
        alliances,
        alliance_stats: analysis::alliance_stats(&summary.alliances),
        drift: analysis::snapshot_drift(&summary.members, &summary.deposits),
    };

    // Step 4: Render and save
    println!("\n📝 Generating report...");
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Report Summary:");
    println!(
        "   Weeks: showing {} of {}",
        report.weekly.buckets.len(),
        report.weekly.total_weeks
    );
    match report.members.first() {
        Some(top) => println!(
            "   Top contributor: {} ({})",
            top.name,
            report::generator::format_amount(top.total)
        ),
        None => println!("   Top contributor: none (no contribution data)"),
    }
    println!("   Alliances ranked: {}", report.alliances.len());
    if !report.drift.is_empty() {
        println!(
            "   ⚠️  {} member snapshot(s) disagree with the deposit ledger",
            report.drift.len()
        );
    }
    println!(
        "\n✅ Report complete! Saved to: {}",
        output_path.display()
    );

    if args.fail_on_empty && scoped.is_empty() {
        eprintln!("\n⛔ No deposits matched {}. Failing (exit code 2).", filter);
        return Ok(2);
    }

    Ok(0)
}

/// Load the summary, showing a spinner unless running quietly.
async fn load_summary(source: &SummarySource, quiet: bool) -> Result<Summary> {
    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching summary...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = source.load().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    result.with_context(|| format!("Failed to load summary from {}", source.describe()))
}

/// Handle --dry-run: print record counts, exit.
fn handle_dry_run(summary: &Summary, filter: &DepositFilter) -> i32 {
    println!("\n🔍 Dry run: summary loaded, no report written.\n");
    println!("   Members:   {}", summary.members.len());
    println!("   Alliances: {}", summary.alliances.len());
    println!("   Deposits:  {}", summary.deposits.len());

    let matching = summary
        .deposits
        .iter()
        .filter(|d| filter.matches(d))
        .count();
    println!("   Matching {}: {}", filter, matching);

    println!("\n✅ Dry run complete.");
    0
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
