//! Command line front end for the fetch-kaggle pipeline.
//!
//! Every subcommand maps onto one library workflow. [`run`] turns the outcome
//! into a process exit code: 0 on success, 1 on any failure.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, SecondsFormat, Utc};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, Level};

use fetch_kaggle::config::PipelineConfig;
use fetch_kaggle::download::{
    run_download, snapshot_name, validate_completion, DatasetFetcher, DownloadOutcome,
    DryRunFetcher, KaggleCliFetcher,
};
use fetch_kaggle::inventory::{analyze_directory, InventoryReport};
use fetch_kaggle::logging::setup::LoggingConfig;
use fetch_kaggle::logging::LogConfig;
use fetch_kaggle::paths::find_latest_snapshot;
use fetch_kaggle::profile::{run_profile, CsvOptions, FileErrorPolicy, ProfileOptions};

/// Kaggle dataset fetching and profiling tool.
#[derive(Debug, Parser)]
#[command(name = "fetch-kaggle", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding one YYYYMMDD sub-directory per snapshot
    #[arg(long, global = true, default_value = "./data/kaggle_raw")]
    pub data_root: PathBuf,

    /// Directory for inventory reports
    #[arg(long, global = true, default_value = "./data/reports")]
    pub reports_dir: PathBuf,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Increase log detail (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the dataset into a dated snapshot and write its manifest
    Download {
        /// Kaggle dataset ID (owner/name)
        #[arg(long)]
        dataset_id: Option<String>,
        /// Write a small sample instead of calling the kaggle CLI
        #[arg(long)]
        dry_run: bool,
    },
    /// Analyze a snapshot's manifest and write a Markdown report
    Inventory {
        /// Snapshot directory; defaults to the latest snapshot
        dir: Option<PathBuf>,
        /// Report path; defaults to the reports directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Profile the schema of a snapshot and write it as JSON
    Profile {
        /// Snapshot directory; defaults to the latest snapshot
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Profile path; defaults to <data-dir>/metadata
        #[arg(long)]
        output: Option<PathBuf>,
        /// Number of files read at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
        /// Record unreadable files instead of failing
        #[arg(long)]
        skip_failed_files: bool,
        /// Keep trailing carriage returns in CSV fields
        #[arg(long)]
        keep_carriage_returns: bool,
    },
    /// Check that a snapshot holds a complete manifest
    Validate {
        /// Snapshot directory; defaults to the latest snapshot
        dir: Option<PathBuf>,
    },
    /// Run download, inventory and profile in sequence
    All {
        #[arg(long)]
        dataset_id: Option<String>,
        #[arg(long)]
        dry_run: bool,
        /// Snapshot to analyze; defaults to the one just downloaded
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Profile path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Subscriber settings derived from `--json-logs` and `-v`.
    pub fn logging_config(&self) -> LoggingConfig {
        let config = match self.verbose {
            0 => LoggingConfig::default(),
            1 => LoggingConfig::default().with_crate_level(Level::DEBUG),
            _ => LoggingConfig::development().with_crate_level(Level::TRACE),
        };
        config.with_json_format(self.json_logs)
    }

    fn pipeline_config(&self, dataset_id: Option<&str>) -> Result<PipelineConfig> {
        let mut builder = PipelineConfig::builder()
            .data_root(&self.data_root)
            .reports_dir(&self.reports_dir);
        if let Some(id) = dataset_id {
            builder = builder.dataset_id(id);
        }
        Ok(builder.build()?)
    }

    fn profile_log(&self) -> LogConfig {
        if self.verbose > 0 {
            LogConfig::verbose()
        } else {
            LogConfig::default()
        }
    }
}

/// Runs the parsed command and returns the process exit code.
pub async fn run(cli: Cli) -> i32 {
    match dispatch(&cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("✗ {e:#}");
            1
        }
    }
}

async fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Download {
            dataset_id,
            dry_run,
        } => {
            let config = cli.pipeline_config(dataset_id.as_deref())?;
            download(&config, *dry_run).await.map(|_| ())
        }
        Command::Inventory { dir, output } => {
            let config = cli.pipeline_config(None)?;
            let dir = resolve_dir(&config, dir.as_deref()).await?;
            inventory(&config, &dir, output.as_deref()).await
        }
        Command::Profile {
            data_dir,
            output,
            concurrency,
            skip_failed_files,
            keep_carriage_returns,
        } => {
            let config = cli.pipeline_config(None)?;
            let dir = resolve_dir(&config, data_dir.as_deref()).await?;
            let options = ProfileOptions::builder()
                .max_concurrent_files(*concurrency)
                .on_file_error(if *skip_failed_files {
                    FileErrorPolicy::Skip
                } else {
                    FileErrorPolicy::Abort
                })
                .csv(if *keep_carriage_returns {
                    CsvOptions::raw()
                } else {
                    CsvOptions::default()
                })
                .log(cli.profile_log())
                .build()?;
            profile(&dir, output.as_deref(), &options).await
        }
        Command::Validate { dir } => {
            let config = cli.pipeline_config(None)?;
            let dir = resolve_dir(&config, dir.as_deref()).await?;
            validate(&dir).await
        }
        Command::All {
            dataset_id,
            dry_run,
            data_dir,
            output,
        } => {
            let config = cli.pipeline_config(dataset_id.as_deref())?;
            let options = ProfileOptions::builder().log(cli.profile_log()).build()?;
            all(&config, *dry_run, data_dir.as_deref(), output.as_deref(), &options).await
        }
    }
}

async fn resolve_dir(config: &PipelineConfig, dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => find_latest_snapshot(&config.data_root)
            .await
            .context("run download first"),
    }
}

async fn download(config: &PipelineConfig, dry_run: bool) -> Result<DownloadOutcome> {
    let fetcher: Box<dyn DatasetFetcher> = if dry_run {
        println!("DRY RUN MODE - no files will be downloaded");
        Box::new(DryRunFetcher)
    } else {
        Box::new(KaggleCliFetcher::from_config(config))
    };
    let today = Local::now().date_naive();
    println!(
        "Downloading {} into {}",
        config.dataset_id,
        config.snapshot_dir(&snapshot_name(today)).display()
    );

    let outcome = run_download(config, fetcher.as_ref(), today).await?;
    println!("{}", outcome.validation);
    if !outcome.passed() {
        bail!("download validation failed for {}", outcome.directory.display());
    }
    println!(
        "✓ Downloaded {} file(s), manifest at {}",
        outcome.files,
        outcome.manifest_path.display()
    );
    Ok(outcome)
}

async fn inventory(config: &PipelineConfig, dir: &Path, output: Option<&Path>) -> Result<()> {
    println!("Analyzing directory: {}", dir.display());
    let Some(analysis) = analyze_directory(dir).await? else {
        bail!(
            "failed to analyze {}: manifest may be missing or invalid",
            dir.display()
        );
    };

    println!("Found {} files", analysis.summary.total_files);
    println!("Unique patterns: {}", analysis.pattern_count());
    println!(
        "Chains: {}",
        analysis.chains.keys().cloned().collect::<Vec<_>>().join(", ")
    );
    println!(
        "File types: {}",
        analysis.file_types.keys().cloned().collect::<Vec<_>>().join(", ")
    );

    let report_path = match output {
        Some(path) => path.to_path_buf(),
        None => config.inventory_report_path(&Utc::now().format("%Y%m%d").to_string()),
    };
    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let saved = InventoryReport::new(&analysis, dir, generated_at)
        .write(&report_path)
        .await?;
    println!("✓ Report saved to: {}", saved.display());
    Ok(())
}

async fn profile(dir: &Path, output: Option<&Path>, options: &ProfileOptions) -> Result<()> {
    println!("Profiling dataset schema in {}", dir.display());
    let run = run_profile(dir, output, options)
        .await
        .with_context(|| format!("failed to profile {}", dir.display()))?;

    for failed in &run.profile.failed_files {
        println!("  skipped {}: {}", failed.filename, failed.error);
    }
    println!(
        "✓ Profiled {} file(s) with {} pattern(s)",
        run.profile.profiles.len(),
        run.profile.total_patterns
    );
    println!("Profile saved to: {}", run.output_path.display());
    Ok(())
}

async fn validate(dir: &Path) -> Result<()> {
    let report = validate_completion(dir).await?;
    println!("{report}");
    if !report.passed {
        bail!("validation failed for {}", dir.display());
    }
    Ok(())
}

async fn all(
    config: &PipelineConfig,
    dry_run: bool,
    data_dir: Option<&Path>,
    output: Option<&Path>,
    options: &ProfileOptions,
) -> Result<()> {
    println!("Step 1/3: Downloading dataset...");
    let outcome = download(config, dry_run)
        .await
        .context("download failed, aborting workflow")?;
    let dir = data_dir.map_or(outcome.directory, Path::to_path_buf);
    debug!(dir = %dir.display(), "Continuing with snapshot");

    println!("\nStep 2/3: Analyzing inventory...");
    inventory(config, &dir, None)
        .await
        .context("inventory analysis failed, aborting workflow")?;

    println!("\nStep 3/3: Profiling schema...");
    profile(&dir, output, options)
        .await
        .context("schema profiling failed, aborting workflow")?;

    println!("\n✓ Workflow completed successfully");
    Ok(())
}
