//! fibrolog-analyze - CLI tool to summarize a fibromyalgia symptom log
//!
//! Loads entries from JSON / JSONL exports, runs the analytics engine and
//! prints the summary as text or JSON.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::Parser;
use fibrolog_core::analytics::{Analytics, AnalyticsEngine, FlareEpisode, SymptomTrend};
use fibrolog_core::config::OutputFormat;
use fibrolog_core::{Config, Entry, LoadResult};
use std::path::Path;

#[derive(Parser)]
#[command(name = "fibrolog-analyze")]
#[command(about = "Summarize a fibromyalgia symptom log")]
#[command(version)]
struct Args {
    /// Entry file (JSON array or JSONL) or glob pattern; may be repeated
    #[arg(short, long = "input", required = true)]
    inputs: Vec<String>,

    /// Output format: text or json (defaults to the configured format)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// List individual flare episodes
    #[arg(short, long)]
    episodes: bool,

    /// Bucket calendar days in UTC instead of the configured timezone
    #[arg(long)]
    utc: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        fibrolog_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let loaded = load_inputs(&args.inputs)?;
    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    let options = ReportOptions {
        format: args.format.unwrap_or(config.report.format),
        episodes: args.episodes || config.report.show_episodes,
        files: loaded.files.len(),
    };

    // The engine is generic over the timezone, so each choice gets its own
    // monomorphized report.
    if args.utc {
        report(&AnalyticsEngine::with_timezone(Utc), &loaded.entries, &options)
    } else if let Some(offset) = config
        .analytics
        .fixed_offset()
        .context("invalid analytics.utc_offset")?
    {
        report(&AnalyticsEngine::with_timezone(offset), &loaded.entries, &options)
    } else {
        report(&AnalyticsEngine::new(), &loaded.entries, &options)
    }
}

/// Load every input, treating arguments with glob characters as patterns.
fn load_inputs(inputs: &[String]) -> Result<LoadResult> {
    let mut combined = LoadResult::default();

    for input in inputs {
        let loaded = if is_pattern(input) && !Path::new(input).exists() {
            fibrolog_core::load_entries_glob(input)
                .with_context(|| format!("failed to load entries matching '{}'", input))?
        } else {
            fibrolog_core::load_entries(Path::new(input))
                .with_context(|| format!("failed to load entries from '{}'", input))?
        };

        tracing::info!(
            input = %input,
            files = loaded.files.len(),
            entries = loaded.entries.len(),
            "Loaded input"
        );

        combined.merge(loaded);
    }

    Ok(combined)
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

struct ReportOptions {
    format: OutputFormat,
    episodes: bool,
    files: usize,
}

fn report<Tz: TimeZone>(
    engine: &AnalyticsEngine<Tz>,
    entries: &[Entry],
    options: &ReportOptions,
) -> Result<()> {
    let analytics = engine.compute(entries);
    let episodes = if options.episodes {
        Some(engine.flare_report(entries).episodes)
    } else {
        None
    };

    match options.format {
        OutputFormat::Json => print_json(&analytics, episodes.as_deref()),
        OutputFormat::Text => {
            print_text(&analytics, entries.len(), options.files, episodes.as_deref());
            Ok(())
        }
    }
}

fn print_json(analytics: &Analytics, episodes: Option<&[FlareEpisode]>) -> Result<()> {
    let output = match episodes {
        Some(episodes) => serde_json::json!({
            "analytics": analytics,
            "episodes": episodes,
        }),
        None => serde_json::to_value(analytics)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(
    analytics: &Analytics,
    entry_count: usize,
    file_count: usize,
    episodes: Option<&[FlareEpisode]>,
) {
    println!(
        "Symptom log: {} entries from {} file(s)\n",
        entry_count, file_count
    );

    if entry_count == 0 {
        println!("No entries found.");
        return;
    }

    println!("Diagnostic (latest entry)");
    println!(
        "  WPI {}/18  SSS {}/12  criteria met: {}",
        analytics.wpi_score,
        analytics.sss_score,
        if analytics.meets_diagnostic_criteria {
            "yes"
        } else {
            "no"
        }
    );

    println!("\nMost affected regions");
    if analytics.most_affected_regions.is_empty() {
        println!("  (none)");
    }
    for region in &analytics.most_affected_regions {
        println!(
            "  {:<16} {:>4}  ({:.1}%)",
            region.region.as_str(),
            region.frequency,
            region.percentage
        );
    }

    println!("\nCommon triggers");
    if analytics.common_triggers.is_empty() {
        println!("  (none)");
    }
    for trigger in &analytics.common_triggers {
        println!("  {:<24} {:>4}", trigger.trigger, trigger.frequency);
    }

    println!("\nSymptom trends (recent entries)");
    let trends = &analytics.symptom_trends;
    print_trend("fatigue", &trends.fatigue);
    print_trend("cognition", &trends.cognition);
    print_trend("sleep", &trends.sleep);

    println!("\nFlares");
    println!(
        "  {:.2} per month  avg {:.1} days  intensity {}",
        analytics.flare_frequency,
        analytics.average_flare_duration,
        analytics.flare_intensity.as_str()
    );
    if let Some(episodes) = episodes {
        if episodes.is_empty() {
            println!("  (no episodes)");
        }
        for episode in episodes {
            println!(
                "  {} .. {}  {} day(s)  {}",
                episode.start_day,
                episode.end_day,
                episode.duration_days,
                episode.max_severity.as_str()
            );
        }
    }

    let capacity = &analytics.functional_capacity;
    println!("\nFunctional capacity");
    println!(
        "  avg {:.2}  good days {}  bad days {}  bedridden {}",
        capacity.average, capacity.good_days, capacity.bad_days, capacity.bedridden
    );

    println!("\nEffective interventions");
    if analytics.effective_interventions.is_empty() {
        println!("  (none)");
    }
    for intervention in &analytics.effective_interventions {
        println!(
            "  {:<28} {:+.2}",
            intervention.intervention, intervention.correlation_with_improvement
        );
    }
}

fn print_trend(name: &str, trend: &SymptomTrend) {
    println!(
        "  {:<10} current {}  avg {:.2}  {}",
        name,
        trend.current,
        trend.average,
        trend.trend.as_str()
    );
}
