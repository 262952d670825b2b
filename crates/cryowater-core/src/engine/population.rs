use super::geometry::VolumeGeometry;
use crate::core::models::material::MaterialProperties;
use serde::Serialize;
use tracing::info;

/// Headroom above the physical expectation, since seeding is probabilistic and may overshoot.
pub const CAPACITY_SAFETY_FACTOR: f64 = 1.05;

/// Expected size of the atom population for a material filling a volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopulationEstimate {
    pub atoms_per_cubic_angstrom: f64,
    pub volume_cubic_angstroms: f64,
    /// Physical expectation `N_lower`.
    pub expected_atoms: f64,
    /// Storage to preallocate, `floor(1.05 * N_lower)`.
    pub capacity: usize,
}

impl PopulationEstimate {
    pub fn for_volume(properties: &MaterialProperties, volume_cubic_angstroms: f64) -> Self {
        let atoms_per_cubic_angstrom = properties.atoms_per_cubic_angstrom();
        let expected_atoms = atoms_per_cubic_angstrom * volume_cubic_angstroms;
        let capacity = (CAPACITY_SAFETY_FACTOR * expected_atoms).floor() as usize;

        info!(
            "Atoms per nm^3 {:.3}, volume {:.3e} nm^3, expecting {:.3e} atoms",
            atoms_per_cubic_angstrom * 1000.0,
            volume_cubic_angstroms / 1000.0,
            expected_atoms
        );

        Self {
            atoms_per_cubic_angstrom,
            volume_cubic_angstroms,
            expected_atoms,
            capacity,
        }
    }

    pub fn new(properties: &MaterialProperties, geometry: &VolumeGeometry) -> Self {
        Self::for_volume(properties, geometry.volume_cubic_angstroms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::material::Material;

    #[test]
    fn water_box_expectation_matches_reference_value() {
        let estimate =
            PopulationEstimate::for_volume(&Material::Solvent.properties(), 1000.0 * 1000.0 * 300.0);

        let expected = 0.94 * 0.6022140857 / 18.01528 * 3.0e8;
        assert!((estimate.expected_atoms - expected).abs() < 1e-3);
        assert!((estimate.expected_atoms - 9.4267e6).abs() < 1.0e3);
        assert_eq!(estimate.capacity, (1.05 * expected).floor() as usize);
    }

    #[test]
    fn capacity_has_five_percent_headroom() {
        let estimate = PopulationEstimate::for_volume(&Material::AmorphousCarbon.properties(), 1.0e6);
        let ratio = estimate.capacity as f64 / estimate.expected_atoms;
        assert!(ratio <= 1.05 && ratio > 1.0499);
    }

    #[test]
    fn empty_volume_needs_no_storage() {
        let estimate = PopulationEstimate::for_volume(&Material::Solvent.properties(), 0.0);
        assert_eq!(estimate.expected_atoms, 0.0);
        assert_eq!(estimate.capacity, 0);
    }

    #[test]
    fn estimate_from_geometry_uses_physical_extent() {
        let geometry = VolumeGeometry::support_layer(1.0, 100.0, 2).unwrap();
        let properties = Material::AmorphousCarbon.properties();
        let estimate = PopulationEstimate::new(&properties, &geometry);
        assert!((estimate.volume_cubic_angstroms - 2000.0 * 2000.0 * 100.0).abs() < 1e-6);
        assert!(
            (estimate.expected_atoms - properties.atoms_per_cubic_angstrom() * 4.0e8).abs() < 1e-3
        );
    }
}
