use anyhow::Context;
use clap::Parser;
use generator::profile::build_swath;
use log::info;
use std::path::PathBuf;
use workflow::config::{JobConfig, OperationKind};
use workflow::report::JobReport;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the swath regridding core")]
struct Args {
    /// Load the job (generator settings and operation) from YAML
    #[arg(long)]
    job: Option<PathBuf>,
    /// Operation to run when no job file is given
    #[arg(long, value_enum, default_value_t = OperationKind::Scatter)]
    operation: OperationKind,
    #[arg(long, default_value_t = 512)]
    rays: usize,
    #[arg(long, default_value_t = 125)]
    bins: usize,
    /// Output altitude levels for the resample and layers operations
    #[arg(long, default_value_t = 250)]
    levels: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write a JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,
    /// Include the full output grid in the JSON report
    #[arg(long, default_value_t = false)]
    include_grid: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let job = if let Some(path) = args.job {
        JobConfig::load(path)?
    } else {
        JobConfig::from_args(args.operation, args.rays, args.bins, args.levels, args.seed)
    };

    let swath = build_swath(&job.generator).context("generating synthetic swath")?;
    info!(
        "generated swath {}x{} (seed {})",
        swath.rays(),
        swath.bins(),
        job.generator.seed
    );

    let runner = Runner::new(job);
    let result = runner.execute(&swath)?;
    let report = JobReport::new(&result, runner.metrics(), args.include_grid);
    println!("{}", report.summary());

    if let Some(path) = args.report {
        report.write_json(&path)?;
        info!("report written to {}", path.display());
    }

    Ok(())
}
