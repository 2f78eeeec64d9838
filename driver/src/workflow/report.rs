use crate::workflow::runner::JobResult;
use anyhow::Context;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use swathcore::math::FieldStats;
use swathcore::telemetry::MetricsSnapshot;
use swathcore::Field2D;

/// Serializable summary of one job, optionally carrying the output grid.
#[derive(Debug, Serialize)]
pub struct JobReport<'a> {
    pub operation: &'static str,
    pub shape: [usize; 2],
    pub stats: FieldStats,
    pub metrics: MetricsSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<&'a Field2D>,
}

impl<'a> JobReport<'a> {
    pub fn new(result: &'a JobResult, metrics: MetricsSnapshot, include_grid: bool) -> Self {
        let (rows, cols) = result.grid.dim();
        Self {
            operation: result.operation,
            shape: [rows, cols],
            stats: result.stats,
            metrics,
            grid: include_grid.then_some(&result.grid),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} -> {}x{} grid, {} valid cells ({:.1}% coverage), range {:?}..{:?}",
            self.operation,
            self.shape[0],
            self.shape[1],
            self.stats.valid,
            self.stats.coverage() * 100.0,
            self.stats.min,
            self.stats.max
        )
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let file = File::create(path_ref)
            .with_context(|| format!("creating report {}", path_ref.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("writing report {}", path_ref.display()))?;
        Ok(())
    }
}
