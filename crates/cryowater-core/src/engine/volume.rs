use super::config::SolventConfig;
use super::error::EngineError;
use super::geometry::{GeometryError, Padding, VolumeGeometry};
use super::population::PopulationEstimate;
use super::progress::ProgressReporter;
use super::tasks::perturbation::{self, PerturbationStats};
use super::tasks::seeding;
use crate::core::models::atom::AtomCollection;
use crate::core::models::specimen::SpecimenGeometry;
use tracing::{info, instrument};

/// The simulated solvent (or support film) volume and the atoms filling it.
///
/// Geometry is fixed at construction. The atom collection is created once by
/// [`SolventVolume::seed_initial_positions`] and then evolved in place, one
/// [`SolventVolume::perturb`] call per exposure frame.
#[derive(Debug, Clone)]
pub struct SolventVolume {
    config: SolventConfig,
    geometry: VolumeGeometry,
    padding: Padding,
    population: PopulationEstimate,
    atoms: Option<AtomCollection>,
    frames_perturbed: u64,
}

impl SolventVolume {
    /// Sizes the volume for the configured material.
    ///
    /// A support layer ignores `specimen`; solvent requires it and is padded around it for the
    /// configured tilt series.
    #[instrument(skip_all, name = "solvent_volume_setup", fields(material = %config.material))]
    pub fn new(
        config: SolventConfig,
        specimen: Option<&dyn SpecimenGeometry>,
    ) -> Result<Self, EngineError> {
        let margin = config.neighborhood_half_width;

        let (geometry, padding) = if config.material.is_support_layer() {
            let geometry = VolumeGeometry::support_layer(
                config.pixel_size,
                config.tilt.max_tilt_degrees,
                margin,
            )?;
            (geometry, Padding::default())
        } else {
            let specimen = specimen.ok_or(GeometryError::MissingSpecimen)?;
            VolumeGeometry::enclosing_specimen(specimen, &config.tilt, config.pixel_size, margin)?
        };

        let population = PopulationEstimate::new(&config.material_properties, &geometry);

        Ok(Self {
            config,
            geometry,
            padding,
            population,
            atoms: None,
            frames_perturbed: 0,
        })
    }

    pub fn config(&self) -> &SolventConfig {
        &self.config
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn population(&self) -> &PopulationEstimate {
        &self.population
    }

    pub fn atoms(&self) -> Option<&AtomCollection> {
        self.atoms.as_ref()
    }

    pub fn into_atoms(self) -> Option<AtomCollection> {
        self.atoms
    }

    pub fn frames_perturbed(&self) -> u64 {
        self.frames_perturbed
    }

    pub fn perturbation_sigma(&self) -> f64 {
        self.config.perturbation_sigma()
    }

    /// Places the initial atom field. Must be called exactly once, before any perturbation.
    pub fn seed_initial_positions(
        &mut self,
        reporter: &ProgressReporter,
    ) -> Result<&AtomCollection, EngineError> {
        if self.atoms.is_some() {
            return Err(EngineError::AlreadySeeded);
        }

        let atoms = seeding::run(
            &self.geometry,
            &self.population,
            self.config.threads,
            self.config.seed,
            reporter,
        )?;
        Ok(self.atoms.insert(atoms))
    }

    /// Applies one frame of thermal motion to every atom.
    ///
    /// `threads` is capped at four workers.
    pub fn perturb(&mut self, threads: usize) -> Result<PerturbationStats, EngineError> {
        let sigma = self.config.perturbation_sigma();
        let atoms = self.atoms.as_mut().ok_or(EngineError::NotSeeded)?;

        let stats = perturbation::run(
            atoms,
            &self.geometry,
            sigma,
            threads,
            self.config.seed,
            self.frames_perturbed,
        )?;
        self.frames_perturbed += 1;

        info!(
            frame = stats.frame,
            wrapped = stats.wrapped,
            "Perturbed {} atoms with an rmsd of {:.4}.",
            stats.atoms,
            sigma
        );
        Ok(stats)
    }
}
