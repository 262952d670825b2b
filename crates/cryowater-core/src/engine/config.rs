use crate::core::models::material::{Material, MaterialProperties};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seed used when the caller does not provide one, so repeated runs are reproducible.
pub const DEFAULT_SEED: u64 = 3_141_592_653;

/// Per-axis standard deviation of the thermal step, per unit of dose per frame.
///
/// Converts an intended 3-D RMS displacement into a direction-independent per-axis sigma;
/// the factor is an approximation awaiting calibration against measured beam-induced motion.
pub const DOSE_TO_SIGMA: f64 = 1.5;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// The axis the specimen is tilted about during the simulated tilt series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltAxis {
    X,
    #[default]
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TiltConfig {
    /// Largest tilt of the series, in degrees. For a support layer this slot carries the film
    /// thickness in angstroms instead.
    pub max_tilt_degrees: f64,
    /// Rotation of the tilt axis within the image plane, in degrees.
    pub in_plane_rotation_degrees: f64,
    pub axis: TiltAxis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolventConfig {
    pub material: Material,
    pub material_properties: MaterialProperties,
    /// Half-width, in voxels, of the local window kept around every atom; atoms stay at least
    /// this far from every face of the volume.
    pub neighborhood_half_width: usize,
    /// Voxel edge length in angstroms.
    pub pixel_size: f64,
    pub dose_per_frame: f64,
    pub tilt: TiltConfig,
    /// Worker count for seeding; the seeding task list has `threads * threads` tiles.
    pub threads: usize,
    pub seed: u64,
}

impl SolventConfig {
    /// Per-axis standard deviation, in voxels, of one frame's thermal displacement.
    pub fn perturbation_sigma(&self) -> f64 {
        DOSE_TO_SIGMA * self.dose_per_frame
    }
}

#[derive(Default)]
pub struct SolventConfigBuilder {
    material: Option<Material>,
    material_properties: Option<MaterialProperties>,
    neighborhood_half_width: Option<usize>,
    pixel_size: Option<f64>,
    dose_per_frame: Option<f64>,
    max_tilt_degrees: Option<f64>,
    in_plane_rotation_degrees: Option<f64>,
    tilt_axis: Option<TiltAxis>,
    threads: Option<usize>,
    seed: Option<u64>,
}

impl SolventConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }
    /// Overrides the tabulated density and molar mass of the material.
    pub fn material_properties(mut self, properties: MaterialProperties) -> Self {
        self.material_properties = Some(properties);
        self
    }
    pub fn neighborhood_half_width(mut self, half_width: usize) -> Self {
        self.neighborhood_half_width = Some(half_width);
        self
    }
    pub fn pixel_size(mut self, pixel_size: f64) -> Self {
        self.pixel_size = Some(pixel_size);
        self
    }
    pub fn dose_per_frame(mut self, dose: f64) -> Self {
        self.dose_per_frame = Some(dose);
        self
    }
    pub fn max_tilt_degrees(mut self, degrees: f64) -> Self {
        self.max_tilt_degrees = Some(degrees);
        self
    }
    pub fn in_plane_rotation_degrees(mut self, degrees: f64) -> Self {
        self.in_plane_rotation_degrees = Some(degrees);
        self
    }
    pub fn tilt_axis(mut self, axis: TiltAxis) -> Self {
        self.tilt_axis = Some(axis);
        self
    }
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<SolventConfig, ConfigError> {
        let material = self
            .material
            .ok_or(ConfigError::MissingParameter("material"))?;
        let material_properties = self
            .material_properties
            .unwrap_or_else(|| material.properties());
        let pixel_size = self
            .pixel_size
            .ok_or(ConfigError::MissingParameter("pixel_size"))?;
        let dose_per_frame = self
            .dose_per_frame
            .ok_or(ConfigError::MissingParameter("dose_per_frame"))?;
        let neighborhood_half_width = self
            .neighborhood_half_width
            .ok_or(ConfigError::MissingParameter("neighborhood_half_width"))?;
        let threads = self.threads.unwrap_or(1);

        require_positive("pixel_size", pixel_size)?;
        require_positive("density", material_properties.density)?;
        require_positive("molar_mass", material_properties.molar_mass)?;
        if !dose_per_frame.is_finite() || dose_per_frame < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "dose_per_frame",
                reason: format!("must be a finite, non-negative number (got {})", dose_per_frame),
            });
        }
        if threads == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "threads",
                reason: "at least one worker thread is required".to_string(),
            });
        }

        let tilt = TiltConfig {
            max_tilt_degrees: self.max_tilt_degrees.unwrap_or(0.0),
            in_plane_rotation_degrees: self.in_plane_rotation_degrees.unwrap_or(0.0),
            axis: self.tilt_axis.unwrap_or_default(),
        };
        if !tilt.max_tilt_degrees.is_finite() || !tilt.in_plane_rotation_degrees.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "tilt",
                reason: "tilt and in-plane rotation angles must be finite".to_string(),
            });
        }

        Ok(SolventConfig {
            material,
            material_properties,
            neighborhood_half_width,
            pixel_size,
            dose_per_frame,
            tilt,
            threads,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
        })
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a finite, positive number (got {})", value),
        })
    }
}
