//! Command-line interface for the collector.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::{run_batch, BatchPlan, UnitOutcome};
use crate::collector::Collector;
use crate::config::{
    CollectorConfig, SiteLayout, DEFAULT_BATCH_CITIES, DEFAULT_BATCH_YEARS, DEFAULT_MUNICIPALITY,
    DEFAULT_OUTPUT_DIR, DEFAULT_START_DATE,
};
use crate::error::{CollectorError, Result};
use crate::index::update_files_index;
use crate::publish::build_site;
use crate::stats::{load_datasets, DatasetStats};

/// SIMBA collector - Collect wildlife occurrence data and publish it for the web viewer.
#[derive(Parser)]
#[command(name = "simba-collector")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect occurrences for one municipality and save them as JSON.
    Collect {
        /// Start date in YYYY-MM-DD format
        #[arg(long, default_value = DEFAULT_START_DATE)]
        start_date: String,

        /// Municipality to filter by
        #[arg(long, default_value = DEFAULT_MUNICIPALITY)]
        municipality: String,

        /// Output file name (default: derived from municipality and dates)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory relative output names are resolved against
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },

    /// Collect every configured city for every configured year.
    CollectAll {
        /// City to collect (repeatable, default: Penha)
        #[arg(long = "city")]
        cities: Vec<String>,

        /// Year to collect (repeatable, default: 2021-2025)
        #[arg(long = "year")]
        years: Vec<u16>,

        /// Pause between API calls in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,

        /// Directory collected files are written to
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },

    /// Move collected files into data/, rewrite the files index and copy data into docs/.
    Index {
        /// Project root containing output/, data/ and docs/
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Copy the viewer from src/ into docs/ and refresh the data files.
    Build {
        /// Project root containing src/, output/, data/ and docs/
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Print yearly, species and seasonal statistics for published data.
    Stats {
        /// Directory holding the dataset files
        #[arg(long, default_value = "docs")]
        data_dir: PathBuf,

        /// Only count occurrences at this locality
        #[arg(long)]
        locality: Option<String>,

        /// Number of species to list
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Collect {
            start_date,
            municipality,
            output,
            output_dir,
        } => collect_command(&municipality, &start_date, output.as_deref(), output_dir),
        Commands::CollectAll {
            cities,
            years,
            delay_ms,
            output_dir,
        } => collect_all_command(cities, years, delay_ms, output_dir),
        Commands::Index { root } => index_command(&root),
        Commands::Build { root } => build_command(&root),
        Commands::Stats {
            data_dir,
            locality,
            top,
        } => stats_command(&data_dir, locality.as_deref(), top),
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Execute the collect command.
fn collect_command(
    municipality: &str,
    start_date: &str,
    output: Option<&Path>,
    output_dir: PathBuf,
) -> Result<()> {
    let config = CollectorConfig::from_env().with_output_dir(output_dir);
    let collector = Collector::new(config)?;

    println!(
        "{} occurrences for {} since {}",
        style("Collecting").bold(),
        style(municipality).cyan(),
        style(start_date).green()
    );

    let pb = spinner();
    pb.set_message("Requesting occurrences...");

    let result = match collector.collect(municipality, start_date) {
        Ok(result) => result,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Saving JSON...");
    let path = match collector.save(&result, output) {
        Ok(path) => path,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    println!("  Occurrences: {}", style(result.count()).green());
    println!("  Period: {} to {}", start_date, result.end_date());
    println!();
    println!("{} {}", style("Saved to:").green().bold(), path.display());

    Ok(())
}

/// Execute the collect-all command.
fn collect_all_command(
    cities: Vec<String>,
    years: Vec<u16>,
    delay_ms: u64,
    output_dir: PathBuf,
) -> Result<()> {
    let cities = if cities.is_empty() {
        DEFAULT_BATCH_CITIES.iter().map(|c| c.to_string()).collect()
    } else {
        cities
    };
    let years = if years.is_empty() {
        DEFAULT_BATCH_YEARS.to_vec()
    } else {
        years
    };
    let plan = BatchPlan::default()
        .with_cities(cities)
        .with_years(years)
        .with_delay(Duration::from_millis(delay_ms));

    let config = CollectorConfig::from_env().with_output_dir(&output_dir);
    let collector = Collector::new(config)?;

    println!(
        "{} {} city-year pairs",
        style("Collecting").bold(),
        plan.units().len()
    );
    println!("  Cities: {}", plan.cities.join(", "));
    println!(
        "  Years: {}",
        plan.years
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    let summary = run_batch(&collector, &plan, |unit, outcome| {
        let status = match outcome {
            UnitOutcome::Saved { records, .. } => style(format!("{records} records")).green(),
            UnitOutcome::Empty { .. } => style("no data available".to_string()).yellow(),
            UnitOutcome::Failed(e) => style(format!("failed: {e}")).red(),
        };
        println!("  {} {}: {}", unit.city, unit.year, status);
    });

    println!();
    println!(
        "{} {}/{}",
        style("Successful:").bold(),
        summary.succeeded(),
        summary.attempted()
    );
    println!("  Data saved to: {}", output_dir.display());

    if summary.attempted() > 0 && summary.succeeded() == 0 {
        return Err(CollectorError::BatchFailed {
            attempted: summary.attempted(),
        });
    }
    Ok(())
}

/// Execute the index command.
fn index_command(root: &Path) -> Result<()> {
    let layout = SiteLayout::new(root);
    let report = update_files_index(&layout)?;

    for name in &report.moved {
        println!("  Moved: {name}");
    }
    println!(
        "{} files index with {} files:",
        style("Updated").green().bold(),
        report.manifest.count()
    );
    for name in report.manifest.files() {
        println!("  - {name}");
    }
    println!("  Index: {}", report.manifest_path.display());

    Ok(())
}

/// Execute the build command.
fn build_command(root: &Path) -> Result<()> {
    let layout = SiteLayout::new(root);

    println!("{} static site...", style("Building").bold());
    let report = build_site(&layout)?;

    if let Some(error) = &report.index_error {
        println!(
            "{} files index not updated: {}",
            style("Warning:").yellow().bold(),
            error
        );
    }

    println!(
        "{} {}",
        style("Built to:").green().bold(),
        layout.publish_dir.display()
    );
    println!("  HTML: {} file(s)", report.html_files);
    println!("  CSS:  {} file(s)", report.css_files);
    println!("  JS:   {} file(s)", report.js_files);
    println!("  Data: {} file(s)", report.data_files);

    Ok(())
}

/// Execute the stats command.
fn stats_command(data_dir: &Path, locality: Option<&str>, top: usize) -> Result<()> {
    let stats = DatasetStats::new(load_datasets(data_dir)?);

    match locality {
        Some(l) => println!("{} at {}", style("Occurrences per year").bold(), style(l).cyan()),
        None => println!("{}", style("Occurrences per year").bold()),
    }
    for (year, count) in stats.yearly_occurrences(locality) {
        println!("  {year}: {count}");
    }

    println!();
    println!("{}", style("Most frequent species").bold());
    for (species, count) in stats.top_species(top) {
        println!("  {species}: {count}");
    }

    if let Some((month, count)) = stats.seasonal_peak() {
        println!();
        println!(
            "{} month {} ({} occurrences)",
            style("Seasonal peak:").bold(),
            month,
            count
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_collect_defaults() {
        let cli = Cli::parse_from(["simba-collector", "collect"]);

        let Commands::Collect {
            start_date,
            municipality,
            output,
            output_dir,
        } = cli.command
        else {
            unreachable!("expected collect command");
        };
        assert_eq!(start_date, "2025-01-01");
        assert_eq!(municipality, "Penha");
        assert!(output.is_none());
        assert_eq!(output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_cli_parse_collect_with_flags() {
        let cli = Cli::parse_from([
            "simba-collector",
            "collect",
            "--start-date",
            "2023-06-01",
            "--municipality",
            "Navegantes",
        ]);

        let Commands::Collect {
            start_date,
            municipality,
            ..
        } = cli.command
        else {
            unreachable!("expected collect command");
        };
        assert_eq!(start_date, "2023-06-01");
        assert_eq!(municipality, "Navegantes");
    }

    #[test]
    fn test_cli_parse_collect_all_repeated_flags() {
        let cli = Cli::parse_from([
            "simba-collector",
            "collect-all",
            "--city",
            "Penha",
            "--city",
            "Piçarras",
            "--year",
            "2024",
            "--delay-ms",
            "0",
        ]);

        let Commands::CollectAll {
            cities,
            years,
            delay_ms,
            ..
        } = cli.command
        else {
            unreachable!("expected collect-all command");
        };
        assert_eq!(cities, vec!["Penha".to_string(), "Piçarras".to_string()]);
        assert_eq!(years, vec![2024]);
        assert_eq!(delay_ms, 0);
    }

    #[test]
    fn test_cli_parse_stats() {
        let cli = Cli::parse_from(["simba-collector", "stats", "--locality", "Armação"]);

        let Commands::Stats {
            data_dir,
            locality,
            top,
        } = cli.command
        else {
            unreachable!("expected stats command");
        };
        assert_eq!(data_dir, PathBuf::from("docs"));
        assert_eq!(locality.as_deref(), Some("Armação"));
        assert_eq!(top, 5);
    }
}
