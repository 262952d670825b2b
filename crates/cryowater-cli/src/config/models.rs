use cryowater::core::models::specimen::{SpecimenBox, SpecimenGeometry};
use cryowater::engine::config::SolventConfig;

pub struct AppConfig {
    pub core_config: SolventConfig,
    pub specimen: Option<SpecimenBox>,
    pub frames: usize,
}

impl AppConfig {
    pub fn specimen(&self) -> Option<&dyn SpecimenGeometry> {
        self.specimen.as_ref().map(|s| s as &dyn SpecimenGeometry)
    }
}
