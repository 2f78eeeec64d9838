use anyhow::{ensure, Context};
use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Configuration for generating a synthetic profile swath.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub rays: usize,
    pub bins: usize,
    /// Top of the profile in km; bins are spread evenly from 0.
    pub top_altitude_km: f32,
    /// Geolocation is provided every `geo_stride` rays and bins.
    pub geo_stride: usize,
    pub start_longitude: f32,
    pub start_latitude: f32,
    /// Degrees of longitude covered by the whole swath.
    pub track_length_deg: f32,
    pub max_layers: usize,
    pub noise: f32,
    /// Fraction of profile cells replaced by NaN.
    pub gap_fraction: f32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rays: 512,
            bins: 125,
            top_altitude_km: 25.0,
            geo_stride: 8,
            start_longitude: 170.0,
            start_latitude: -10.0,
            track_length_deg: 20.0,
            max_layers: 5,
            noise: 0.5,
            gap_fraction: 0.05,
            seed: 0,
        }
    }
}

/// Profile data, geolocation and layer product for one synthetic overpass.
#[derive(Debug, Clone)]
pub struct SyntheticSwath {
    /// Reflectivity-like values, shape (rays, bins).
    pub profile: Array2<f32>,
    /// Bin altitudes in km, increasing.
    pub altitude: Array1<f32>,
    pub geo_stride: usize,
    /// Coarse geolocation in degrees, longitudes may cross the antimeridian.
    pub coarse_longitude: Array2<f32>,
    pub coarse_latitude: Array2<f32>,
    pub layer_count: Array1<u8>,
    pub layer_base: Array2<f32>,
    pub layer_top: Array2<f32>,
    pub layer_value: Array2<f32>,
}

impl SyntheticSwath {
    pub fn rays(&self) -> usize {
        self.profile.nrows()
    }

    pub fn bins(&self) -> usize {
        self.profile.ncols()
    }
}

fn build_profile(config: &GeneratorConfig, rng: &mut StdRng) -> Array2<f32> {
    let rays = config.rays as f32;
    let bins = config.bins as f32;
    Array2::from_shape_fn((config.rays, config.bins), |(ray, bin)| {
        if rng.gen::<f32>() < config.gap_fraction {
            return f32::NAN;
        }
        let along = ray as f32 / rays;
        let height = bin as f32 / bins;
        let cloud = (along * 6.0 * PI).sin() * (1.0 - height) * 20.0;
        let jitter = if config.noise > 0.0 {
            rng.gen_range(-config.noise..config.noise)
        } else {
            0.0
        };
        cloud - 10.0 + jitter
    })
}

fn build_geolocation(config: &GeneratorConfig) -> (Array2<f32>, Array2<f32>) {
    let stride = config.geo_stride;
    let shape = (config.rays.div_ceil(stride), config.bins.div_ceil(stride));
    let deg_per_ray = config.track_length_deg / config.rays as f32;

    let longitude = Array2::from_shape_fn(shape, |(i, j)| {
        let lon = config.start_longitude + (i * stride) as f32 * deg_per_ray
            + (j * stride) as f32 * 0.01;
        // Folded back into [-180, 180) as a geolocation product would be.
        (lon + 180.0).rem_euclid(360.0) - 180.0
    });
    let latitude = Array2::from_shape_fn(shape, |(i, j)| {
        config.start_latitude + (i * stride) as f32 * deg_per_ray * 0.5
            - (j * stride) as f32 * 0.01
    });
    (longitude, latitude)
}

type LayerArrays = (Array1<u8>, Array2<f32>, Array2<f32>, Array2<f32>);

fn build_layers(config: &GeneratorConfig, rng: &mut StdRng) -> anyhow::Result<LayerArrays> {
    let max_layers = u8::try_from(config.max_layers).context("max_layers must fit in a byte")?;
    let shape = (config.rays, config.max_layers);
    let mut base = Array2::from_elem(shape, f32::NAN);
    let mut top = Array2::from_elem(shape, f32::NAN);
    let mut value = Array2::from_elem(shape, f32::NAN);

    let counts = Array1::from_shape_fn(config.rays, |ray| {
        let count = rng.gen_range(0..=max_layers);
        let mut floor = 0.0f32;
        for layer in 0..usize::from(count) {
            let thickness = rng.gen_range(0.2f32..2.0);
            let lower = floor + rng.gen_range(0.0f32..3.0);
            base[[ray, layer]] = lower.min(config.top_altitude_km);
            top[[ray, layer]] = (lower + thickness).min(config.top_altitude_km);
            value[[ray, layer]] = f32::from(rng.gen_range(1u8..=4));
            floor = lower + thickness * 0.5;
        }
        count
    });

    Ok((counts, base, top, value))
}

pub fn build_swath(config: &GeneratorConfig) -> anyhow::Result<SyntheticSwath> {
    ensure!(config.rays > 0 && config.bins > 0, "swath must have rays and bins");
    ensure!(config.geo_stride > 0, "geo_stride must be positive");
    ensure!(config.top_altitude_km > 0.0, "top_altitude_km must be positive");
    config
        .rays
        .checked_mul(config.bins)
        .context("overflow computing swath size")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let profile = build_profile(config, &mut rng);
    let altitude = Array1::linspace(0.0, config.top_altitude_km, config.bins);
    let (coarse_longitude, coarse_latitude) = build_geolocation(config);
    let (layer_count, layer_base, layer_top, layer_value) = build_layers(config, &mut rng)?;

    Ok(SyntheticSwath {
        profile,
        altitude,
        geo_stride: config.geo_stride,
        coarse_longitude,
        coarse_latitude,
        layer_count,
        layer_base,
        layer_top,
        layer_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_shapes() {
        let config = GeneratorConfig {
            rays: 40,
            bins: 20,
            geo_stride: 8,
            ..Default::default()
        };
        let swath = build_swath(&config).unwrap();
        assert_eq!(swath.profile.dim(), (40, 20));
        assert_eq!(swath.altitude.len(), 20);
        assert_eq!(swath.coarse_longitude.dim(), (5, 3));
        assert_eq!(swath.layer_count.len(), 40);
        assert_eq!(swath.layer_base.dim(), (40, config.max_layers));
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = GeneratorConfig {
            rays: 16,
            bins: 8,
            seed: 7,
            ..Default::default()
        };
        let a = build_swath(&config).unwrap();
        let b = build_swath(&config).unwrap();
        assert_eq!(a.layer_count, b.layer_count);
        assert_eq!(
            a.profile.iter().filter(|v| v.is_nan()).count(),
            b.profile.iter().filter(|v| v.is_nan()).count()
        );
    }

    #[test]
    fn longitudes_cross_the_antimeridian() {
        let swath = build_swath(&GeneratorConfig::default()).unwrap();
        let column = swath.coarse_longitude.column(0);
        assert!(column.iter().any(|&lon| lon > 170.0));
        assert!(column.iter().any(|&lon| lon < -170.0));
    }

    #[test]
    fn layers_stay_ordered_within_ray() {
        let swath = build_swath(&GeneratorConfig::default()).unwrap();
        for ray in 0..swath.rays() {
            for layer in 0..usize::from(swath.layer_count[ray]) {
                assert!(swath.layer_base[[ray, layer]] <= swath.layer_top[[ray, layer]]);
            }
        }
    }

    #[test]
    fn zero_rays_is_rejected() {
        let config = GeneratorConfig {
            rays: 0,
            ..Default::default()
        };
        assert!(build_swath(&config).is_err());
    }
}
