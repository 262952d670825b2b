use crate::core::models::material::Material;
use crate::core::models::specimen::SpecimenGeometry;
use crate::engine::config::SolventConfig;
use crate::engine::error::EngineError;
use crate::engine::geometry::{Padding, VolumeGeometry};
use crate::engine::population::PopulationEstimate;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::perturbation::PerturbationStats;
use crate::engine::volume::SolventVolume;
use serde::Serialize;
use tracing::{info, instrument};

/// Summary of a run, suitable for logging or writing next to simulated images.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub material: Material,
    pub seed: u64,
    pub sigma_voxels: f64,
    pub seeded_atoms: usize,
    pub geometry: VolumeGeometry,
    pub padding: Padding,
    pub population: PopulationEstimate,
    pub frames: Vec<PerturbationStats>,
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub volume: SolventVolume,
    pub report: SimulationReport,
}

#[instrument(skip_all, name = "simulation_workflow", fields(frames = frames))]
pub fn run(
    config: &SolventConfig,
    specimen: Option<&dyn SpecimenGeometry>,
    frames: usize,
    reporter: &ProgressReporter,
) -> Result<SimulationResult, EngineError> {
    // === Phase 1: Volume geometry ===
    let mut volume = reporter.phase("Sizing volume", || {
        SolventVolume::new(config.clone(), specimen)
    })?;

    // === Phase 2: Initial placement ===
    let seeded_atoms = reporter.phase("Seeding atoms", || {
        volume.seed_initial_positions(reporter).map(|atoms| atoms.len())
    })?;

    // === Phase 3: Thermal motion, one perturbation per frame ===
    let frame_stats = reporter.phase("Perturbing frames", || {
        reporter.report(Progress::TaskStart {
            total_steps: frames as u64,
        });
        let mut stats = Vec::with_capacity(frames);
        for _ in 0..frames {
            stats.push(volume.perturb(config.threads)?);
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);
        Ok::<_, EngineError>(stats)
    })?;

    let report = SimulationReport {
        material: config.material,
        seed: config.seed,
        sigma_voxels: volume.perturbation_sigma(),
        seeded_atoms,
        geometry: volume.geometry().clone(),
        padding: volume.padding(),
        population: *volume.population(),
        frames: frame_stats,
    };

    info!(
        "Simulation complete: {} atoms seeded, {} frame(s) perturbed.",
        report.seeded_atoms,
        report.frames.len()
    );

    Ok(SimulationResult { volume, report })
}
