//! CLI binary for edgequake-pdfsplit.
//!
//! A thin shim over the library crate that maps CLI flags to `SplitConfig`,
//! runs a scan or a split and prints the results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfsplit::{
    inspect, scan_file_async, split_file_async, OutputSummary, ProgressCallback, ScanReport,
    SplitConfig, SplitOutcome, SplitProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per phase (scan, then write).
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn start_phase(&self, prefix: &str, total: usize, unit: &str) {
        let style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>4}}/{{len}} {unit}  \
             ⏱ {{elapsed_precise}}  ETA {{eta_precise}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        let bar = ProgressBar::new(total as u64);
        bar.set_style(style);
        bar.set_prefix(prefix.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.bar.lock().unwrap() = Some(bar);
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            f(bar);
        }
    }

    fn finish_phase(&self) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

fn truncate(msg: &str) -> String {
    if msg.chars().count() > 80 {
        format!("{}\u{2026}", msg.chars().take(79).collect::<String>())
    } else {
        msg.to_string()
    }
}

impl SplitProgressCallback for CliProgressCallback {
    fn on_scan_start(&self, total_pages: usize) {
        self.start_phase("Scanning", total_pages, "pages");
    }

    fn on_page_scanned(&self, page_num: usize, total_pages: usize, is_candidate: bool) {
        self.with_bar(|bar| {
            if is_candidate {
                bar.println(format!(
                    "  {} Page {:>4}/{:<4} {}",
                    cyan("◆"),
                    page_num,
                    total_pages,
                    dim("looks like a document end")
                ));
            }
            bar.inc(1);
        });
    }

    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        self.with_bar(|bar| {
            bar.println(format!(
                "  {} Page {:>4}/{:<4} {}",
                red("✗"),
                page_num,
                total_pages,
                red(&truncate(error))
            ));
        });
    }

    fn on_scan_complete(&self, _total_pages: usize, _candidate_count: usize) {
        self.finish_phase();
    }

    fn on_split_start(&self, total_segments: usize) {
        self.start_phase("Writing", total_segments, "files");
    }

    fn on_segment_written(&self, _segment_num: usize, _total: usize, path: &Path) {
        self.with_bar(|bar| {
            bar.println(format!("  {} {}", green("✓"), path.display()));
            bar.inc(1);
        });
    }

    fn on_segment_error(&self, _segment_num: usize, _total: usize, error: &str) {
        self.with_bar(|bar| {
            bar.println(format!("  {} {}", red("✗"), red(&truncate(error))));
            bar.inc(1);
        });
    }

    fn on_split_complete(&self, _total_segments: usize, _written: usize) {
        self.finish_phase();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scan a bundle and list suggested split points
  pdfsplit bundle.pdf

  # Split before pages 4 and 11 into ./out
  pdfsplit bundle.pdf --splits 4,11 -o out

  # Scan, then split at every suggestion
  pdfsplit bundle.pdf --use-suggested -o out

  # Name the outputs after the original upload
  pdfsplit /tmp/upload_7f3a.pdf --splits 3 --name "Escrituras 2019.pdf"

  # Page count and size policy only
  pdfsplit --inspect-only bundle.pdf

  # Machine-readable output
  pdfsplit bundle.pdf --use-suggested --json > result.json

SPLIT POINTS:
  A split point is a 1-based page number that starts a new document.
  On a 5-page file, --splits 3 writes "<name>-1-2.pdf" and "<name>-3-5.pdf".

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Directory holding libpdfium (else ./ then system)
  PDFSPLIT_OUTPUT_DIR     Default output directory
  PDFSPLIT_ZOOM           Scan zoom factor
  PDFSPLIT_PASSWORD       PDF user password
  RUST_LOG                Override the log filter
"#;

/// Find document boundaries in scanned PDF bundles and split them.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsplit",
    version,
    about = "Find document boundaries in scanned PDF bundles and split them",
    long_about = "Scan every page of a PDF for signature blocks, stamps and dense footers, \
suggest where one document ends and the next begins, and split the file into \
page-range documents.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory for the split documents.
    #[arg(short, long, env = "PDFSPLIT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Split points: comma-separated 1-based pages that start a new document.
    #[arg(long, env = "PDFSPLIT_SPLITS", conflicts_with = "use_suggested")]
    splits: Option<String>,

    /// Scan first, then split at every suggested point.
    #[arg(long)]
    use_suggested: bool,

    /// Original filename to name the outputs after.
    #[arg(long, env = "PDFSPLIT_NAME")]
    name: Option<String>,

    /// Zoom factor used to render pages for the scan.
    #[arg(long, env = "PDFSPLIT_ZOOM", default_value_t = 0.5)]
    zoom: f32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFSPLIT_PASSWORD")]
    password: Option<String>,

    /// Output structured JSON instead of text.
    #[arg(long, env = "PDFSPLIT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFSPLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Print page count and size policy only.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSPLIT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless the user asks for them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn SplitProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let path = cli.input.clone();
        let cfg = config.clone();
        let info = tokio::task::spawn_blocking(move || inspect(&path, &cfg))
            .await
            .context("Inspect task panicked")?
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialise document info")?
            );
        } else {
            println!("File:              {}", info.path.display());
            println!("Pages:             {}", info.page_count);
            println!("Size:              {:.1} KB", info.byte_len as f64 / 1024.0);
            println!("Memory-optimized:  {}", info.memory_optimized);
            println!("Batched copying:   {}", info.large);
        }
        return Ok(());
    }

    // ── Explicit split points ────────────────────────────────────────────
    if let Some(ref raw) = cli.splits {
        let points = parse_splits(raw)?;
        let outcome = run_split(&cli, points, config).await?;
        report_split(&cli, &outcome)?;
        return Ok(());
    }

    // ── Scan (and optionally split at the suggestions) ───────────────────
    let report = scan_file_async(cli.input.clone(), config.clone())
        .await
        .context("Scan failed")?;

    if cli.use_suggested {
        if !cli.quiet && !cli.json {
            eprintln!("{} {}", cyan("◆"), report.summary());
        }
        let outcome = run_split(&cli, report.suggested_splits.clone(), config).await?;
        report_split(&cli, &outcome)?;
    } else {
        report_scan(&cli, &report)?;
    }

    Ok(())
}

async fn run_split(cli: &Cli, points: Vec<usize>, config: SplitConfig) -> Result<SplitOutcome> {
    split_file_async(
        cli.input.clone(),
        points,
        cli.output_dir.clone(),
        cli.name.clone(),
        config,
    )
    .await
    .context("Split failed")
}

fn report_scan(cli: &Cli, report: &ScanReport) -> Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to serialise scan report")?
        );
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    eprintln!("{} {}", green("✔"), report.summary());
    if report.suggested_splits.is_empty() {
        println!("No split points suggested.");
    } else {
        let list: Vec<String> = report.suggested_splits.iter().map(|p| p.to_string()).collect();
        println!("Suggested split points: {}", bold(&list.join(",")));
        println!(
            "{}",
            dim(&format!(
                "Run again with --splits {} (or --use-suggested) to split.",
                list.join(",")
            ))
        );
    }
    Ok(())
}

fn report_split(cli: &Cli, outcome: &SplitOutcome) -> Result<()> {
    let summaries = outcome
        .summaries()
        .context("Failed to read written documents")?;

    if cli.json {
        let value = serde_json::json!({
            "outcome": outcome,
            "files": summaries,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to serialise split outcome")?
        );
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    if outcome.segments_total == 0 {
        println!("No split points; nothing written.");
        return Ok(());
    }

    print_table(&summaries);
    eprintln!(
        "{} {}",
        if outcome.is_complete() {
            green("✔")
        } else {
            cyan("⚠")
        },
        outcome.summary()
    );
    for failure in &outcome.failures {
        eprintln!("  {} {}", red("✗"), failure);
    }
    Ok(())
}

fn print_table(summaries: &[OutputSummary]) {
    let width = summaries
        .iter()
        .map(|s| s.file_name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    println!("{:<width$}  {:<14}  {:>10}", "File", "Pages", "Size");
    println!("{:<width$}  {:<14}  {:>10}", "─".repeat(width), "─".repeat(14), "─".repeat(10));
    for s in summaries {
        println!(
            "{:<width$}  {:<14}  {:>10}",
            s.file_name,
            s.range_label(),
            s.size_label()
        );
    }
}

/// Map CLI args to `SplitConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SplitConfig> {
    let mut builder = SplitConfig::builder().default_zoom(cli.zoom);
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

/// Parse `--splits` (`"4,11,20"`) into 1-based page numbers.
fn parse_splits(s: &str) -> Result<Vec<usize>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|p| {
            let p = p.trim();
            p.parse::<usize>()
                .with_context(|| format!("Invalid split point: '{p}'"))
        })
        .collect()
}
