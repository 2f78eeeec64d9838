use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use swathcore::grid::ScatterMode;

use crate::generator::profile::GeneratorConfig;

/// Operation selected on the command line when no job file is given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OperationKind {
    Upsample,
    Resample,
    Scatter,
    Layers,
}

/// One regridding operation and its grid parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationConfig {
    /// Densify coarse geolocation to the profile resolution.
    Upsample {
        #[serde(default)]
        offset: i32,
        #[serde(default = "cyclic_default")]
        cyclic: bool,
    },
    /// Nearest-bin resampling of the profile onto `levels` evenly spaced altitudes.
    Resample { levels: usize },
    /// Gridding of the profile swath onto a lon/lat raster.
    Scatter {
        width: usize,
        height: usize,
        /// Physical footprint of one sample in degrees; sets the splat radius.
        footprint_deg: f32,
        #[serde(default)]
        mode: ScatterMode,
    },
    /// Rasterization of the layer product onto `levels` altitude cells.
    Layers { levels: usize },
}

fn cyclic_default() -> bool {
    true
}

impl OperationConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upsample { .. } => "upsample",
            Self::Resample { .. } => "resample",
            Self::Scatter { .. } => "scatter",
            Self::Layers { .. } => "layers",
        }
    }

    pub fn from_kind(kind: OperationKind, levels: usize) -> Self {
        match kind {
            OperationKind::Upsample => Self::Upsample {
                offset: 0,
                cyclic: true,
            },
            OperationKind::Resample => Self::Resample { levels },
            OperationKind::Scatter => Self::Scatter {
                width: 360,
                height: 180,
                footprint_deg: 0.1,
                mode: ScatterMode::Nearest,
            },
            OperationKind::Layers => Self::Layers { levels },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(flatten)]
    pub operation: OperationConfig,
}

impl JobConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading job config {}", path_ref.display()))?;
        let config: JobConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing job config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        kind: OperationKind,
        rays: usize,
        bins: usize,
        levels: usize,
        seed: u64,
    ) -> Self {
        Self {
            generator: GeneratorConfig {
                rays,
                bins,
                seed,
                ..Default::default()
            },
            operation: OperationConfig::from_kind(kind, levels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_uses_generator_defaults() {
        let cfg = JobConfig::from_args(OperationKind::Layers, 64, 32, 100, 3);
        assert_eq!(cfg.generator.rays, 64);
        assert_eq!(cfg.generator.geo_stride, GeneratorConfig::default().geo_stride);
        assert_eq!(cfg.operation, OperationConfig::Layers { levels: 100 });
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"operation: scatter\nwidth: 64\nheight: 32\nfootprint_deg: 0.5\nmode: inverse_distance\ngenerator:\n  rays: 128\n  bins: 40\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = JobConfig::load(&path).unwrap();
        assert_eq!(cfg.generator.rays, 128);
        assert_eq!(cfg.generator.top_altitude_km, 25.0);
        assert_eq!(
            cfg.operation,
            OperationConfig::Scatter {
                width: 64,
                height: 32,
                footprint_deg: 0.5,
                mode: ScatterMode::InverseDistance,
            }
        );
    }

    #[test]
    fn upsample_defaults_to_cyclic() {
        let cfg: JobConfig = serde_yaml::from_str("operation: upsample\n").unwrap();
        assert_eq!(
            cfg.operation,
            OperationConfig::Upsample {
                offset: 0,
                cyclic: true
            }
        );
    }

    #[test]
    fn unknown_operation_is_an_error() {
        assert!(serde_yaml::from_str::<JobConfig>("operation: render\n").is_err());
    }
}
