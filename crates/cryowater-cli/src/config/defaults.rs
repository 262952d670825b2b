use cryowater::core::models::material::Material;
use cryowater::engine::config::{DEFAULT_SEED, TiltAxis};

/// Values used for anything neither the config file, a flag nor `--set` provides.
pub struct DefaultsConfig {
    pub material: Material,
    pub pixel_size: f64,
    pub neighborhood_half_width: usize,
    pub dose_per_frame: f64,
    pub frames: usize,
    pub seed: u64,
    pub max_tilt: f64,
    pub in_plane_rotation: f64,
    pub tilt_axis: TiltAxis,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            material: Material::Solvent,
            pixel_size: 1.0,
            neighborhood_half_width: 3,
            dose_per_frame: 1.0,
            frames: 1,
            seed: DEFAULT_SEED,
            max_tilt: 0.0,
            in_plane_rotation: 0.0,
            tilt_axis: TiltAxis::Y,
        }
    }
}
