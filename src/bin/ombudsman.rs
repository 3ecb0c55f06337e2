//! CLI binary for ombudsman-decisions.
//!
//! A thin shim over the library crate that maps CLI flags to the harvest and
//! fetch configs and prints results.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ombudsman_decisions::{
    download_and_convert, harvest_to_file, EntryError, FetchConfig, FetchProgressCallback,
    FetchStats, HarvestConfig, HarvestProgressCallback, HttpClientConfig, IndustrySector,
    ReqwestFetcher, SearchQuery, UpheldFilter, DEFAULT_METADATA_FILE, DEFAULT_OUTPUT_DIR,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── Harvest progress: spinner with a running count ───────────────────────────

struct CliHarvestProgress {
    bar: ProgressBar,
}

impl CliHarvestProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {pos} entries  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Searching");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl HarvestProgressCallback for CliHarvestProgress {
    fn on_page(&self, start: usize, entries: usize) {
        self.bar.inc(entries as u64);
        self.bar.set_message(dim(&format!("offset {start}")));
    }

    fn on_entry_skipped(&self, _start: usize, error: &EntryError) {
        self.bar
            .println(format!("  {} skipped {}", cyan("⚠"), dim(&error.to_string())));
    }

    fn on_harvest_complete(&self, records: usize) {
        self.bar.finish_and_clear();
        eprintln!("{} {} decisions found", green("✔"), bold(&records.to_string()));
    }
}

// ── Fetch progress: one bar over the table rows ──────────────────────────────

struct CliFetchProgress {
    bar: ProgressBar,
}

impl CliFetchProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>4}/{len} rows  \
                 ⏱ {elapsed_precise}  ETA {eta_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl FetchProgressCallback for CliFetchProgress {
    fn on_fetch_start(&self, total_rows: usize) {
        self.bar.set_length(total_rows as u64);
        self.bar.reset_eta();
    }

    fn on_row_skipped(&self, _decision_id: &str) {
        self.bar.inc(1);
    }

    fn on_row_start(&self, decision_id: &str) {
        self.bar.set_message(decision_id.to_string());
    }

    fn on_row_complete(&self, decision_id: &str, chars: usize) {
        self.bar.println(format!(
            "  {} {:<16} {}",
            green("✓"),
            decision_id,
            dim(&format!("{chars:>7} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_row_error(&self, decision_id: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {:<16} {}", red("✗"), decision_id, red(&msg)));
        self.bar.inc(1);
    }

    fn on_fetch_complete(&self, stats: &FetchStats) {
        self.bar.finish_and_clear();
        let mark = if stats.failed == 0 { green("✔") } else { cyan("⚠") };
        eprintln!(
            "{} {} converted, {} skipped, {} failed",
            mark,
            bold(&stats.converted.to_string()),
            stats.skipped,
            if stats.failed == 0 {
                stats.failed.to_string()
            } else {
                red(&stats.failed.to_string())
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Metadata for the last 50 days, all sectors
  ombudsman get-metadata

  # Upheld insurance decisions in 2015 mentioning subsidence
  ombudsman get-metadata --from 2015-01-01 --to 2015-12-31 \
      --industry-sector insurance --upheld --keyword subsidence

  # Download and convert everything listed in decisions.csv
  ombudsman download-and-convert-decisions

  # Custom table and output directory; stop at the first failure
  ombudsman download-and-convert-decisions insurance.csv insurance_txt --fail-fast

INDUSTRY SECTORS:
  banking-credit-mortgages, investment-pensions, insurance,
  payment-protection-insurance, claims-management-ombudsman-decisions,
  funeral-plans

RESUMING:
  download-and-convert-decisions skips every decision whose .txt file already
  exists, so an interrupted run can simply be started again.
"#;

/// Scrape ombudsman decision metadata and convert the decisions to text.
#[derive(Parser, Debug)]
#[command(
    name = "ombudsman",
    version,
    about = "Scrape ombudsman decision metadata and convert decision PDFs to cleaned text",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// User-Agent header sent with every request.
    #[arg(long, global = true, default_value = ombudsman_decisions::config::DEFAULT_USER_AGENT)]
    user_agent: String,

    /// HTTP timeout per request in seconds.
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,

    /// Print the run statistics as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Disable progress bars.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Page through the search results and write the metadata table.
    GetMetadata(GetMetadataArgs),

    /// Download every decision in the table and convert it to text.
    DownloadAndConvertDecisions(DownloadArgs),
}

#[derive(Args, Debug)]
struct GetMetadataArgs {
    /// Keyword to search for.
    #[arg(long)]
    keyword: Option<String>,

    /// Start date (YYYY-MM-DD). Default: 50 days ago.
    #[arg(long = "from")]
    from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Default: today.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Only upheld decisions.
    #[arg(long, conflicts_with = "no_upheld")]
    upheld: bool,

    /// Only decisions that were not upheld.
    #[arg(long)]
    no_upheld: bool,

    /// Comma-separated industry sectors. Default: all sectors.
    #[arg(long, value_name = "SECTORS")]
    industry_sector: Option<String>,

    /// Output table path.
    #[arg(short, long, default_value = DEFAULT_METADATA_FILE)]
    output: PathBuf,

    /// Safety cap on the number of search pages requested.
    #[arg(long, default_value_t = ombudsman_decisions::config::DEFAULT_MAX_PAGES)]
    max_pages: usize,
}

#[derive(Args, Debug)]
struct DownloadArgs {
    /// Metadata table written by get-metadata.
    #[arg(default_value = DEFAULT_METADATA_FILE)]
    metadata_file: PathBuf,

    /// Directory for the .txt files; created if missing.
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    output_dir_txt: PathBuf,

    /// Pause before each download, in milliseconds.
    #[arg(long, default_value_t = ombudsman_decisions::config::DEFAULT_REQUEST_DELAY_MS)]
    delay_ms: u64,

    /// Abort on the first decision that fails.
    #[arg(long)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = &cli.global;

    // ── Logging setup ────────────────────────────────────────────────────
    // Progress bars replace INFO logs unless verbose output was requested.
    let show_progress = !global.quiet && !global.no_progress && !global.json;
    let filter = if global.verbose {
        "debug"
    } else if global.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let client = ReqwestFetcher::new(&HttpClientConfig {
        user_agent: global.user_agent.clone(),
        timeout_secs: global.timeout,
    })
    .context("Failed to create HTTP client")?;

    match &cli.command {
        Commands::GetMetadata(args) => get_metadata(&client, args, global, show_progress).await,
        Commands::DownloadAndConvertDecisions(args) => {
            download_decisions(&client, args, global, show_progress).await
        }
    }
}

async fn get_metadata(
    client: &ReqwestFetcher,
    args: &GetMetadataArgs,
    global: &GlobalArgs,
    show_progress: bool,
) -> Result<()> {
    let query = build_query(args)?;

    let mut builder = HarvestConfig::builder().max_pages(args.max_pages);
    if show_progress {
        builder = builder.progress(CliHarvestProgress::new());
    }
    let config = builder.build().context("Invalid configuration")?;

    let stats = harvest_to_file(client, &query, &config, &args.output)
        .await
        .context("Harvest failed")?;

    if global.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !global.quiet {
        if stats.records == 0 {
            eprintln!("{} No results found", cyan("⚠"));
        } else {
            eprintln!(
                "{}  {} entries  →  {}",
                green("✔"),
                stats.records,
                bold(&args.output.display().to_string()),
            );
        }
        if stats.malformed > 0 {
            eprintln!("   {} malformed entries skipped", red(&stats.malformed.to_string()));
        }
    }

    Ok(())
}

async fn download_decisions(
    client: &ReqwestFetcher,
    args: &DownloadArgs,
    global: &GlobalArgs,
    show_progress: bool,
) -> Result<()> {
    let mut builder = FetchConfig::builder()
        .request_delay_ms(args.delay_ms)
        .fail_fast(args.fail_fast);
    if show_progress {
        builder = builder.progress(CliFetchProgress::new());
    }
    let config = builder.build().context("Invalid configuration")?;

    let report = download_and_convert(client, &args.metadata_file, &args.output_dir_txt, &config)
        .await
        .with_context(|| format!("Conversion of {:?} failed", args.metadata_file))?;

    if global.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !global.quiet && !show_progress {
        eprintln!(
            "Converted {}, skipped {}, failed {} of {} rows",
            report.stats.converted,
            report.stats.skipped,
            report.stats.failed,
            report.stats.total_rows
        );
    }

    if !global.quiet && !global.json {
        for failure in &report.failures {
            eprintln!("  {} {}: {}", red("✗"), failure.decision_id, failure.error);
        }
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} decisions failed",
            report.stats.failed,
            report.stats.total_rows
        );
    }

    Ok(())
}

/// Map CLI args to a `SearchQuery`.
fn build_query(args: &GetMetadataArgs) -> Result<SearchQuery> {
    let upheld = match (args.upheld, args.no_upheld) {
        (true, _) => UpheldFilter::Upheld,
        (false, true) => UpheldFilter::NotUpheld,
        (false, false) => UpheldFilter::Either,
    };

    let mut builder = SearchQuery::builder().upheld(upheld);
    if let Some(ref list) = args.industry_sector {
        builder = builder.sectors(IndustrySector::parse_list(list)?);
    }
    if let Some(ref keyword) = args.keyword {
        builder = builder.keyword(keyword.clone());
    }
    if let Some(from) = args.from {
        builder = builder.date_from(from);
    }
    if let Some(to) = args.to {
        builder = builder.date_to(to);
    }

    builder.build().context("Invalid search query")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn get_metadata_defaults() {
        let cli = parse(&["ombudsman", "get-metadata"]);
        let Commands::GetMetadata(args) = cli.command else {
            panic!("expected get-metadata");
        };
        assert_eq!(args.output, PathBuf::from(DEFAULT_METADATA_FILE));
        let query = build_query(&args).unwrap();
        assert_eq!(query.upheld, UpheldFilter::Either);
        assert_eq!(query.sectors.len(), 6);
    }

    #[test]
    fn get_metadata_filters() {
        let cli = parse(&[
            "ombudsman",
            "get-metadata",
            "--keyword",
            "flood",
            "--from",
            "2015-01-01",
            "--to",
            "2015-12-31",
            "--no-upheld",
            "--industry-sector",
            "insurance,funeral-plans",
        ]);
        let Commands::GetMetadata(args) = cli.command else {
            panic!("expected get-metadata");
        };
        let query = build_query(&args).unwrap();
        assert_eq!(query.keyword.as_deref(), Some("flood"));
        assert_eq!(query.upheld, UpheldFilter::NotUpheld);
        assert!(query.sectors.contains(&IndustrySector::Insurance));
        assert!(query.sectors.contains(&IndustrySector::FuneralPlans));
        assert_eq!(query.sectors.len(), 2);
        assert_eq!(query.date_from.to_string(), "2015-01-01");
    }

    #[test]
    fn upheld_flags_conflict() {
        assert!(Cli::try_parse_from(["ombudsman", "get-metadata", "--upheld", "--no-upheld"])
            .is_err());
    }

    #[test]
    fn unknown_sector_rejected() {
        let cli = parse(&["ombudsman", "get-metadata", "--industry-sector", "insurance,pets"]);
        let Commands::GetMetadata(args) = cli.command else {
            panic!("expected get-metadata");
        };
        let err = build_query(&args).unwrap_err();
        assert!(err.to_string().contains("pets"), "got {err:#}");
    }

    #[test]
    fn sector_list_tolerates_spaces_and_case() {
        let cli = parse(&[
            "ombudsman",
            "get-metadata",
            "--industry-sector",
            "Insurance, funeral-plans",
        ]);
        let Commands::GetMetadata(args) = cli.command else {
            panic!("expected get-metadata");
        };
        let query = build_query(&args).unwrap();
        assert_eq!(
            query.sectors.into_iter().collect::<Vec<_>>(),
            vec![IndustrySector::Insurance, IndustrySector::FuneralPlans]
        );
    }

    #[test]
    fn download_positional_defaults() {
        let cli = parse(&["ombudsman", "download-and-convert-decisions"]);
        let Commands::DownloadAndConvertDecisions(args) = cli.command else {
            panic!("expected download-and-convert-decisions");
        };
        assert_eq!(args.metadata_file, PathBuf::from(DEFAULT_METADATA_FILE));
        assert_eq!(args.output_dir_txt, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(args.delay_ms, 1000);
        assert!(!args.fail_fast);
    }

    #[test]
    fn download_positionals_and_global_flags() {
        let cli = parse(&[
            "ombudsman",
            "download-and-convert-decisions",
            "insurance.csv",
            "insurance_txt",
            "--fail-fast",
            "--quiet",
        ]);
        assert!(cli.global.quiet);
        let Commands::DownloadAndConvertDecisions(args) = cli.command else {
            panic!("expected download-and-convert-decisions");
        };
        assert_eq!(args.metadata_file, PathBuf::from("insurance.csv"));
        assert!(args.fail_fast);
    }
}
