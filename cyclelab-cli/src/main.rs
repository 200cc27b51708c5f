//! CycleLab CLI — single-cycle analysis and dated-log history commands.
//!
//! Commands:
//! - `analyze` — detect ovulation and partition one cycle from CSV or JSON
//! - `history` — segment a dated log into cycles, analyze all, summarize

mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;

use cyclelab_core::{AnalysisObserver, CyclePhaseResult, OvulationDay, PhaseGroup, TracingObserver};
use cyclelab_runner::export::save_report;
use cyclelab_runner::{
    load_cycle_file, load_history_csv, run_history, run_single, HistoryReport, LabConfig,
};

#[derive(Parser)]
#[command(
    name = "cyclelab",
    version,
    about = "CycleLab CLI — basal body temperature cycle analysis"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML lab config. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single cycle (.csv with day,temperature or .json document).
    Analyze {
        file: PathBuf,

        /// Known ovulation day; skips detection.
        #[arg(long)]
        ovulation_day: Option<u32>,

        /// Print the full result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Analyze every cycle in a dated log (.csv with date,temperature,is_period).
    History {
        file: PathBuf,

        /// Close the running cycle on this date (YYYY-MM-DD). Defaults to the last record.
        #[arg(long)]
        as_of: Option<String>,

        /// Write report.json and CSV files under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let observer: Arc<dyn AnalysisObserver> = Arc::new(TracingObserver);

    match cli.command {
        Commands::Analyze {
            file,
            ovulation_day,
            json,
        } => run_analyze(&file, ovulation_day, json, &config, observer),
        Commands::History {
            file,
            as_of,
            output_dir,
            json,
        } => run_history_cmd(&file, as_of.as_deref(), output_dir, json, &config, observer),
    }
}

fn load_config(path: Option<&Path>) -> Result<LabConfig> {
    match path {
        Some(path) => {
            let config = LabConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            debug!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => Ok(LabConfig::default()),
    }
}

fn run_analyze(
    file: &Path,
    ovulation_day: Option<u32>,
    json: bool,
    config: &LabConfig,
    observer: Arc<dyn AnalysisObserver>,
) -> Result<()> {
    let mut input =
        load_cycle_file(file).with_context(|| format!("loading cycle {}", file.display()))?;
    if ovulation_day.is_some() {
        input.ovulation_day = ovulation_day;
    }

    let result = run_single(&input, config, observer)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_phase_summary(&result);
    }
    Ok(())
}

fn run_history_cmd(
    file: &Path,
    as_of: Option<&str>,
    output_dir: Option<PathBuf>,
    json: bool,
    config: &LabConfig,
    observer: Arc<dyn AnalysisObserver>,
) -> Result<()> {
    let as_of = as_of
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--as-of must be YYYY-MM-DD")?;

    let readings =
        load_history_csv(file).with_context(|| format!("loading log {}", file.display()))?;
    let report = run_history(&readings, as_of, config, observer)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_history_summary(&report);
    }

    if let Some(dir) = output_dir {
        let bundle = save_report(&report, &dir)?;
        println!("Report saved to: {}", bundle.display());
    }
    Ok(())
}

fn format_ovulation(ov: &OvulationDay) -> String {
    match ov {
        OvulationDay::Known { day, method } => format!("day {day} ({method})"),
        OvulationDay::Unknown => "unknown".to_string(),
    }
}

fn format_days(group: &PhaseGroup) -> String {
    match (group.days.first(), group.days.last()) {
        (Some(first), Some(last)) => format!("days {first}-{last} ({} recorded)", group.len()),
        _ => "no days".to_string(),
    }
}

fn print_phase_summary(result: &CyclePhaseResult) {
    println!();
    println!("=== Cycle Analysis ===");
    println!("Ovulation:    {}", format_ovulation(&result.ovulation_day));
    if result.split.estimated {
        println!("Split day:    {} (estimated)", result.split.day);
    }
    println!(
        "Follicular:   {:<28} avg {:.2}°F",
        format_days(&result.follicular),
        result.follicular.average
    );
    println!(
        "Luteal:       {:<28} avg {:.2}°F",
        format_days(&result.luteal),
        result.luteal.average
    );
    match (result.fertile_window.start(), result.fertile_window.end()) {
        (Some(start), Some(end)) => println!("Fertile:      days {start}-{end}"),
        _ => println!("Fertile:      no recorded days"),
    }
    if let Some(shift) = result.temperature_shift() {
        println!("Temp shift:   {shift:+.2}°F");
    }
    println!();
}

fn print_history_summary(report: &HistoryReport) {
    let summary = &report.summary;

    println!();
    println!("=== Cycle History (as of {}) ===", report.as_of);
    println!(
        "Cycles:           {} ({} completed)",
        summary.cycle_count, summary.completed_cycles
    );
    println!("Avg cycle length: {:.1} days", summary.average_cycle_length);
    println!(
        "Avg phases:       follicular {:.1} / luteal {:.1} days",
        summary.average_follicular_days, summary.average_luteal_days
    );
    if let Some(day) = report.current_cycle_day {
        println!("Current day:      {day}");
    }
    if report.dropped_readings > 0 {
        println!(
            "Dropped:          {} readings before the first period",
            report.dropped_readings
        );
    }
    println!();
    println!(
        "{:>3}  {:<10}  {:>6}  {:<30}  {:>7}",
        "#", "Start", "Length", "Ovulation", "Shift"
    );
    println!("{}", "-".repeat(64));
    for (cycle, stats) in report.cycles.iter().zip(&summary.cycles) {
        let length = if cycle.complete {
            cycle.length_days.to_string()
        } else {
            format!("{}+", cycle.length_days)
        };
        let shift = stats
            .temperature_shift
            .map(|s| format!("{s:+.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}  {:<10}  {:>6}  {:<30}  {:>7}",
            cycle.index + 1,
            cycle.start_date.to_string(),
            length,
            format_ovulation(&cycle.result.ovulation_day),
            shift
        );
    }
    println!();
}
