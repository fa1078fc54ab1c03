//! # pepcover
//!
//! Count precursors and peptides per sample in proteomics search-engine
//! reports, filter protein groups by peptide coverage, and show the coverage
//! of a ring trial as a heatmap.
//!
//! ## Usage
//!
//! ```bash
//! # Combined precursor/peptide counts
//! pepcover counts report.pr_matrix.tsv -o counts.tsv
//!
//! # Protein groups with >= 2 peptides in >= 80 % of samples
//! pepcover filter report.pr_matrix.tsv report.pg_matrix.tsv --percent 80 --n-pep-min 2
//!
//! # Full ring-trial sweep with heatmap viewer
//! pepcover ringtrial --config pepcover.toml
//! ```

mod app;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use eframe::egui;
use log::info;

use pepcover::data::loader::load_table;
use pepcover::data::writer::{write_delimited, write_table};
use pepcover::data::{combined_counts, filter_by_coverage};
use pepcover::labels::{relabel_samples, SampleLabeler, DEFAULT_LABEL_PATTERN};
use pepcover::render::save_heatmap_png;
use pepcover::{RingTrial, RingTrialConfig, Table};

use app::PepcoverApp;
use state::AppState;

/// pepcover - peptide coverage of protein groups across samples
#[derive(Parser)]
#[command(name = "pepcover")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Column options shared by the table commands.
#[derive(clap::Args)]
struct ColumnArgs {
    /// Substring marking sample columns
    #[arg(short = 'm', long, default_value = "MS_data")]
    marker: String,

    /// Identifier column (aggregation and join key)
    #[arg(long, default_value = "Protein.Group")]
    id_column: String,

    /// Peptide sequence column of the precursor report
    #[arg(long, default_value = "Stripped.Sequence")]
    peptide_column: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Count precursors and peptides per identifier and sample
    Counts {
        /// Precursor-level report (.tsv, .csv or .parquet)
        #[arg(value_name = "REPORT")]
        report: PathBuf,

        /// Output TSV file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        columns: ColumnArgs,
    },

    /// Join counts onto a protein report and keep well-covered groups
    Filter {
        /// Precursor-level report
        #[arg(value_name = "PRECURSORS")]
        precursors: PathBuf,

        /// Protein-level report
        #[arg(value_name = "PROTEINS")]
        proteins: PathBuf,

        /// Percentage of samples that must reach the minimum (10-100)
        #[arg(short, long)]
        percent: u32,

        /// Minimum peptide count per sample (1-10)
        #[arg(short, long)]
        n_pep_min: u32,

        /// Regex whose first capture group is the sample label of a
        /// protein-report column
        #[arg(long, value_name = "REGEX", default_value = DEFAULT_LABEL_PATTERN)]
        label_pattern: String,

        /// Output TSV file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        columns: ColumnArgs,
    },

    /// Sweep coverage thresholds over a ring trial and show the heatmap
    Ringtrial {
        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Folder holding the reports (overrides the config file)
        #[arg(long, value_name = "DIR")]
        folder: Option<PathBuf>,

        /// Write the heatmap as PNG
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Write the coverage matrix as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Do not open the viewer window
        #[arg(long)]
        no_window: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Counts {
            report,
            output,
            columns,
        } => run_counts(report, output, columns),
        Commands::Filter {
            precursors,
            proteins,
            percent,
            n_pep_min,
            label_pattern,
            output,
            columns,
        } => {
            let labeler = SampleLabeler::new(&label_pattern)?;
            run_filter(precursors, proteins, percent, n_pep_min, &labeler, output, columns)
        }
        Commands::Ringtrial {
            config,
            folder,
            png,
            json,
            no_window,
        } => run_ringtrial(config, folder, png, json, no_window),
    }
}

fn emit(table: &Table, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            write_table(&path, table)?;
            info!("Wrote {} rows to {}", table.n_rows(), path.display());
            Ok(())
        }
        None => write_delimited(std::io::stdout().lock(), table),
    }
}

fn run_counts(report: PathBuf, output: Option<PathBuf>, columns: ColumnArgs) -> Result<()> {
    let table = load_table(&report)?;
    let counts = combined_counts(&table, &columns.marker, &columns.id_column, &columns.peptide_column)?;
    emit(&counts.into_table()?, output)
}

fn run_filter(
    precursors: PathBuf,
    proteins: PathBuf,
    percent: u32,
    n_pep_min: u32,
    labeler: &SampleLabeler,
    output: Option<PathBuf>,
    columns: ColumnArgs,
) -> Result<()> {
    let precursor_table = load_table(&precursors)?;
    let protein_table = load_table(&proteins)?;

    let counts = combined_counts(
        &precursor_table,
        &columns.marker,
        &columns.id_column,
        &columns.peptide_column,
    )?;
    let labelled = relabel_samples(&protein_table, &columns.marker, labeler)?;
    let joined = labelled.join_counts(&counts, &columns.id_column)?;
    let filtered = filter_by_coverage(&joined, percent, n_pep_min)?;
    info!(
        "{} of {} protein groups have >= {n_pep_min} peptides in >= {percent}% of samples",
        filtered.n_rows(),
        joined.n_rows()
    );
    emit(&filtered, output)
}

fn run_ringtrial(
    config: Option<PathBuf>,
    folder: Option<PathBuf>,
    png: Option<PathBuf>,
    json: Option<PathBuf>,
    no_window: bool,
) -> Result<()> {
    let mut config = match config {
        Some(path) => RingTrialConfig::from_file(&path)?,
        None => RingTrialConfig::default(),
    };
    if let Some(folder) = folder {
        config.input.folder = folder;
    }

    let trial = RingTrial::run(config)?;

    if let Some(path) = png {
        save_heatmap_png(&trial.matrix, &path)?;
        info!("Wrote heatmap to {}", path.display());
    }
    if let Some(path) = json {
        trial.write_matrix_json(&path)?;
        info!("Wrote coverage matrix to {}", path.display());
    }

    if no_window {
        for (percent, counts) in trial.matrix.rows_descending() {
            let cells: Vec<String> = counts.iter().map(|c| c.to_string()).collect();
            println!("{percent:>4}%\t{}", cells.join("\t"));
        }
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "pepcover – Ring Trial Coverage",
        options,
        Box::new(|_cc| Ok(Box::new(PepcoverApp::new(AppState::new(trial))))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
    .context("running heatmap viewer")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRECURSORS: &str = "\
Protein.Group\tStripped.Sequence\tD:\\MS_data\\CSF_R01.raw\tD:\\MS_data\\CSF_R02.raw
P1\tAAAK\t1.0\t2.0
P2\tCCDR\t3.0\t
";

    const PROTEINS: &str = "\
Protein.Group\tD:\\MS_data\\CSF_R01.raw\tD:\\MS_data\\CSF_R02.raw
P1\t10.0\t20.0
P2\t30.0\t
";

    fn filter_args(extra: &[&str]) -> Commands {
        let mut args = vec!["pepcover", "filter", "pr.tsv", "pg.tsv", "-p", "100", "-n", "1"];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_label_pattern_defaults() {
        match filter_args(&[]) {
            Commands::Filter { label_pattern, .. } => assert_eq!(label_pattern, DEFAULT_LABEL_PATTERN),
            _ => panic!("expected filter command"),
        }
    }

    #[test]
    fn test_filter_uses_label_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let precursors = dir.path().join("pr.tsv");
        let proteins = dir.path().join("pg.tsv");
        let output = dir.path().join("out.tsv");
        std::fs::write(&precursors, PRECURSORS).unwrap();
        std::fs::write(&proteins, PROTEINS).unwrap();

        let label_pattern = match filter_args(&["--label-pattern", r"_(R\d+)\.raw$"]) {
            Commands::Filter { label_pattern, .. } => label_pattern,
            _ => panic!("expected filter command"),
        };
        let labeler = SampleLabeler::new(&label_pattern).unwrap();
        let columns = ColumnArgs {
            marker: "MS_data".to_string(),
            id_column: "Protein.Group".to_string(),
            peptide_column: "Stripped.Sequence".to_string(),
        };
        run_filter(precursors, proteins, 100, 1, &labeler, Some(output.clone()), columns).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let header = written.lines().next().unwrap();
        assert!(header.starts_with("Protein.Group\tR01\tR02\t"));
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn test_label_pattern_without_group_is_rejected() {
        assert!(SampleLabeler::new(r"\.raw$").is_err());
    }
}
