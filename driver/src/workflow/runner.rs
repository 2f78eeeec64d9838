use crate::generator::profile::SyntheticSwath;
use crate::workflow::config::{JobConfig, OperationConfig};
use anyhow::Context;
use log::warn;
use ndarray::{s, Array1};
use swathcore::grid::{AxisExtent, AxisStride, ColumnCoordinates, LayerSet};
use swathcore::math::FieldStats;
use swathcore::processing::{
    normalize_cyclic, DimensionUpsampler, LayerRasterizer, ScatteredGridder,
};
use swathcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use swathcore::{resample_column, Field2D};

pub struct JobResult {
    pub operation: &'static str,
    pub grid: Field2D,
    pub stats: FieldStats,
}

pub struct Runner {
    config: JobConfig,
    metrics: MetricsRecorder,
}

impl Runner {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn execute(&self, swath: &SyntheticSwath) -> anyhow::Result<JobResult> {
        let operation = &self.config.operation;
        let grid = match *operation {
            OperationConfig::Upsample { offset, cyclic } => {
                self.geolocate(swath, offset, cyclic)?.0
            }
            OperationConfig::Resample { levels } => self.resample(swath, levels)?,
            OperationConfig::Scatter {
                width,
                height,
                footprint_deg,
                mode,
            } => {
                let (longitude, latitude) = self.geolocate(swath, 0, true)?;
                let lon_stats = FieldStats::of(longitude.view());
                let lat_stats = FieldStats::of(latitude.view());
                let x = AxisExtent::new(
                    lon_stats.min.context("no valid longitudes")?,
                    lon_stats.max.context("no valid longitudes")?,
                    width,
                );
                let y = AxisExtent::new(
                    lat_stats.min.context("no valid latitudes")?,
                    lat_stats.max.context("no valid latitudes")?,
                    height,
                );
                let gridder = ScatteredGridder::new(x, y)
                    .with_radius(
                        x.footprint_radius(footprint_deg),
                        y.footprint_radius(footprint_deg),
                    )
                    .with_mode(mode);
                let gridded =
                    gridder.apply(swath.profile.view(), longitude.view(), latitude.view());
                self.metrics
                    .observe(gridded)
                    .context("gridding swath")?
            }
            OperationConfig::Layers { levels } => {
                let layers = LayerSet::new(
                    swath.layer_count.view(),
                    swath.layer_base.view(),
                    swath.layer_top.view(),
                );
                let rasterizer =
                    LayerRasterizer::new(AxisExtent::new(0.0, top_altitude(swath), levels));
                self.metrics
                    .observe(rasterizer.apply(swath.layer_value.view(), &layers))
                    .context("rasterizing layers")?
            }
        };

        let stats = FieldStats::of(grid.view());
        Ok(JobResult {
            operation: operation.name(),
            grid,
            stats,
        })
    }

    /// Upsamples the coarse geolocation to one lon/lat pair per profile cell.
    fn geolocate(
        &self,
        swath: &SyntheticSwath,
        offset: i32,
        cyclic: bool,
    ) -> anyhow::Result<(Field2D, Field2D)> {
        let stride = i32::try_from(swath.geo_stride).context("geo_stride too large")?;
        let axis = AxisStride::new(offset, stride);
        let mut upsampler = DimensionUpsampler::new(axis, axis);
        if cyclic {
            upsampler = upsampler.cyclic(360.0);
        }

        let (rays, bins) = (swath.rays(), swath.bins());
        let mut longitude = self
            .metrics
            .observe(upsampler.apply(swath.coarse_longitude.view()))
            .context("upsampling longitude")?
            .slice(s![..rays, ..bins])
            .to_owned();
        let mut latitude = self
            .metrics
            .observe(upsampler.apply(swath.coarse_latitude.view()))
            .context("upsampling latitude")?
            .slice(s![..rays, ..bins])
            .to_owned();

        if cyclic {
            normalize_cyclic(longitude.view_mut(), -180.0, 360.0);
            normalize_cyclic(latitude.view_mut(), -90.0, 180.0);
        }
        Ok((longitude, latitude))
    }

    fn resample(&self, swath: &SyntheticSwath, levels: usize) -> anyhow::Result<Field2D> {
        let targets = Array1::linspace(0.0, top_altitude(swath), levels);
        let coords_in = ColumnCoordinates::Shared(swath.altitude.view());
        if !coords_in.is_monotonic() {
            warn!("profile altitudes are not increasing; nearest-bin search may stop early");
        }
        let resampled = resample_column(swath.profile.view(), coords_in, targets.view());
        self.metrics
            .observe(resampled)
            .context("resampling profile")
    }
}

fn top_altitude(swath: &SyntheticSwath) -> f32 {
    swath.altitude.last().copied().unwrap_or(0.0)
}
