use crate::core::models::atom::{AtomCollection, AtomPosition, CapacityError};
use crate::engine::error::EngineError;
use crate::engine::geometry::VolumeGeometry;
use crate::engine::population::PopulationEstimate;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::utils::streams::{StreamKind, worker_rng};
use rand::distributions::{Distribution, Uniform};
use std::ops::Range;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use crate::engine::utils::pool::worker_pool;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

const AXIS_NAMES: [&str; 3] = ["X", "Y", "Z"];

/// One work item of the seeding task: a lateral tile and the full usable Z range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub x: Range<usize>,
    pub y: Range<usize>,
    pub z: Range<usize>,
}

impl Tile {
    pub fn sites(&self) -> usize {
        self.x.len() * self.y.len() * self.z.len()
    }
}

/// Splits the usable lateral extent into at most `threads * threads` disjoint tiles.
///
/// Tiles are `ceil(nX / threads)` by `ceil(nY / threads)` voxels, starting at the margin and
/// clipped to the usable band; tiles that fall entirely outside it are dropped.
pub fn plan_tiles(geometry: &VolumeGeometry, threads: usize) -> Vec<Tile> {
    let threads = threads.max(1);
    let usable_x = geometry.usable_range(0);
    let usable_y = geometry.usable_range(1);
    let usable_z = geometry.usable_range(2);

    let inc_x = geometry.dims[0].div_ceil(threads).max(1);
    let inc_y = geometry.dims[1].div_ceil(threads).max(1);

    let clip = |range: &Range<usize>, block: usize, inc: usize| -> Range<usize> {
        let lower = (range.start + block * inc).min(range.end);
        let upper = (range.start + (block + 1) * inc).min(range.end);
        lower..upper
    };

    let mut tiles = Vec::with_capacity(threads * threads);
    for i in 0..threads {
        let x = clip(&usable_x, i, inc_x);
        for j in 0..threads {
            let y = clip(&usable_y, j, inc_y);
            let tile = Tile {
                index: tiles.len(),
                x: x.clone(),
                y,
                z: usable_z.clone(),
            };
            if tile.sites() > 0 {
                tiles.push(tile);
            }
        }
    }
    tiles
}

/// Uniform deviates above this value accept a site.
///
/// Chosen so the expected number of accepted sites equals `expected_atoms`. Negative when the
/// lattice is too sparse for the requested density, in which case every site is accepted.
pub fn acceptance_cutoff(expected_atoms: f64, usable_sites: usize) -> f64 {
    1.0 - expected_atoms / usable_sites as f64
}

fn seed_tile(tile: &Tile, cutoff: f64, base_seed: u64) -> Vec<AtomPosition> {
    let mut rng = worker_rng(base_seed, StreamKind::Seeding, tile.index);
    let uniform = Uniform::new(0.0f64, 1.0);

    let acceptance = (1.0 - cutoff).clamp(0.0, 1.0);
    let mut accepted =
        Vec::with_capacity((tile.sites() as f64 * acceptance * 1.05).ceil() as usize);

    // Z outermost keeps one worker's writes confined to its own column of the volume.
    for k in tile.z.clone() {
        for i in tile.x.clone() {
            for j in tile.y.clone() {
                if uniform.sample(&mut rng) > cutoff {
                    accepted.push(AtomPosition::new(i as f32, j as f32, k as f32));
                }
            }
        }
    }
    accepted
}

/// Places the initial atom field on the integer lattice inside the margin.
///
/// Each tile is seeded into a private buffer with its own random stream; the buffers are then
/// merged in tile order, so the result only depends on the seed and the worker count.
#[instrument(skip_all, name = "density_seeding_task", fields(threads = threads, seed = seed))]
pub fn run(
    geometry: &VolumeGeometry,
    population: &PopulationEstimate,
    threads: usize,
    seed: u64,
    reporter: &ProgressReporter,
) -> Result<AtomCollection, EngineError> {
    let mut atoms = AtomCollection::with_capacity(population.capacity);

    for axis in 0..3 {
        if geometry.usable_range(axis).is_empty() {
            warn!(
                "Volume is {} voxels along {} with a margin of {}; no atoms can be seeded.",
                geometry.dims[axis], AXIS_NAMES[axis], geometry.margin
            );
        }
    }

    let usable_sites = geometry.usable_sites();
    if usable_sites == 0 {
        return Ok(atoms);
    }

    let cutoff = acceptance_cutoff(population.expected_atoms, usable_sites);
    debug!(
        expected = population.expected_atoms,
        usable_sites, cutoff, "Computed lattice acceptance cutoff."
    );

    let tiles = plan_tiles(geometry, threads);
    info!(
        tiles = tiles.len(),
        "Seeding {} candidate sites.", usable_sites
    );
    reporter.report(Progress::TaskStart {
        total_steps: tiles.len() as u64,
    });

    let seed_and_report = |tile: &Tile| {
        let batch = seed_tile(tile, cutoff, seed);
        reporter.report(Progress::TaskIncrement);
        batch
    };

    #[cfg(feature = "parallel")]
    let batches: Vec<Vec<AtomPosition>> =
        worker_pool(threads.max(1))?.install(|| tiles.par_iter().map(seed_and_report).collect());

    #[cfg(not(feature = "parallel"))]
    let batches: Vec<Vec<AtomPosition>> = tiles.iter().map(seed_and_report).collect();

    reporter.report(Progress::TaskFinish);

    let accepted: usize = batches.iter().map(Vec::len).sum();
    if accepted > atoms.capacity() {
        let err = CapacityError {
            requested: accepted,
            capacity: atoms.capacity(),
        };
        warn!(
            "Seeded {} atoms, {:.2}% over the capacity of {} ({:.0} expected). Small volumes can exceed the 5% headroom by chance.",
            accepted,
            100.0 * err.overshoot(),
            err.capacity,
            population.expected_atoms
        );
        return Err(err.into());
    }
    for batch in &batches {
        atoms.extend_within_capacity(batch)?;
    }

    let percent = if population.expected_atoms > 0.0 {
        100.0 * atoms.len() as f64 / population.expected_atoms
    } else {
        0.0
    };
    info!("Atoms added {:.3e} ({:.2}%)", atoms.len() as f64, percent);

    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::material::Material;
    use crate::core::models::specimen::SpecimenBox;
    use crate::engine::config::TiltConfig;
    use std::collections::HashSet;

    fn solvent_geometry(nx: usize, ny: usize, nz: usize, margin: usize) -> VolumeGeometry {
        let specimen = SpecimenBox::new(nx, ny, nz, 1.0);
        VolumeGeometry::enclosing_specimen(&specimen, &TiltConfig::default(), 1.0, margin)
            .unwrap()
            .0
    }

    fn solvent_population(geometry: &VolumeGeometry) -> PopulationEstimate {
        PopulationEstimate::new(&Material::Solvent.properties(), geometry)
    }

    #[test]
    fn tiles_are_disjoint_and_cover_the_usable_lattice() {
        let geometry = solvent_geometry(37, 23, 9, 3);
        for threads in 1..=5 {
            let tiles = plan_tiles(&geometry, threads);
            assert!(tiles.len() <= threads * threads);

            let mut seen = HashSet::new();
            for tile in &tiles {
                for i in tile.x.clone() {
                    for j in tile.y.clone() {
                        assert!(seen.insert((i, j)), "column ({i}, {j}) in two tiles");
                    }
                }
                assert_eq!(tile.z, 3..6);
            }
            assert_eq!(seen.len(), 31 * 17);
            assert_eq!(
                tiles.iter().map(Tile::sites).sum::<usize>(),
                geometry.usable_sites()
            );
        }
    }

    #[test]
    fn tile_indices_are_dense() {
        let geometry = solvent_geometry(10, 10, 10, 4);
        let tiles = plan_tiles(&geometry, 4);
        for (position, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.index, position);
        }
    }

    #[test]
    fn cutoff_matches_expected_fraction() {
        assert!((acceptance_cutoff(25.0, 100) - 0.75).abs() < 1e-12);
        assert!(acceptance_cutoff(200.0, 100) < 0.0);
    }

    #[test]
    fn seeded_atoms_stay_inside_the_margin() {
        let geometry = solvent_geometry(80, 70, 40, 5);
        let population = solvent_population(&geometry);
        let atoms = run(&geometry, &population, 3, 11, &ProgressReporter::new()).unwrap();

        assert!(!atoms.is_empty());
        for atom in &atoms {
            for (axis, c) in atom.coords().into_iter().enumerate() {
                assert!(c >= 5.0 && c < (geometry.dims[axis] - 5) as f32);
                assert_eq!(c.fract(), 0.0);
            }
        }
    }

    #[test]
    fn seeded_count_tracks_expected_population() {
        let geometry = solvent_geometry(100, 100, 60, 2);
        let population = solvent_population(&geometry);
        let atoms = run(&geometry, &population, 4, 2024, &ProgressReporter::new()).unwrap();

        assert!(atoms.len() <= atoms.capacity());
        let ratio = atoms.len() as f64 / population.expected_atoms;
        assert!((ratio - 1.0).abs() < 0.05, "ratio was {ratio}");
    }

    #[test]
    fn mean_count_over_many_seeds_is_unbiased() {
        let geometry = solvent_geometry(80, 80, 40, 2);
        let population = solvent_population(&geometry);
        let runs = 20;
        let total: usize = (0..runs)
            .map(|seed| {
                run(&geometry, &population, 2, seed, &ProgressReporter::new())
                    .unwrap()
                    .len()
            })
            .sum();
        let mean = total as f64 / runs as f64;
        assert!(
            (mean / population.expected_atoms - 1.0).abs() < 0.01,
            "mean {mean} vs expected {}",
            population.expected_atoms
        );
    }

    #[test]
    fn count_variance_over_many_seeds_matches_bernoulli_sites() {
        let geometry = solvent_geometry(40, 40, 20, 2);
        let mut population = solvent_population(&geometry);
        population.capacity = geometry.usable_sites();
        let sites = geometry.usable_sites() as f64;
        let p = 1.0 - acceptance_cutoff(population.expected_atoms, geometry.usable_sites());
        let expected_variance = sites * p * (1.0 - p);

        let runs = 200;
        let counts: Vec<f64> = (0..runs)
            .map(|seed| {
                run(&geometry, &population, 2, 1000 + seed, &ProgressReporter::new())
                    .unwrap()
                    .len() as f64
            })
            .collect();
        let mean = counts.iter().sum::<f64>() / runs as f64;
        let variance =
            counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (runs - 1) as f64;

        // chi-square with 199 degrees of freedom, about four standard deviations either side
        let ratio = variance / expected_variance;
        assert!(
            (0.6..1.45).contains(&ratio),
            "sample variance {variance:.1} vs binomial {expected_variance:.1}"
        );
    }

    #[test]
    fn same_seed_and_threads_reproduce_positions() {
        let geometry = solvent_geometry(80, 80, 40, 2);
        let population = solvent_population(&geometry);
        let a = run(&geometry, &population, 3, 99, &ProgressReporter::new()).unwrap();
        let b = run(&geometry, &population, 3, 99, &ProgressReporter::new()).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());

        let c = run(&geometry, &population, 3, 100, &ProgressReporter::new()).unwrap();
        assert_ne!(a.as_slice(), c.as_slice());
    }

    #[test]
    fn degenerate_volume_yields_no_atoms() {
        let geometry = solvent_geometry(30, 30, 8, 4);
        let population = solvent_population(&geometry);
        let atoms = run(&geometry, &population, 2, 1, &ProgressReporter::new()).unwrap();
        assert!(atoms.is_empty());
        assert_eq!(atoms.capacity(), population.capacity);
    }

    #[test]
    fn overflowing_capacity_is_an_error() {
        let geometry = solvent_geometry(30, 30, 20, 2);
        let mut population = solvent_population(&geometry);
        population.expected_atoms = geometry.usable_sites() as f64;
        population.capacity = 10;

        let err = run(&geometry, &population, 2, 5, &ProgressReporter::new()).unwrap_err();
        let EngineError::Capacity { source } = err else {
            panic!("expected a capacity error, got {err:?}");
        };
        assert_eq!(source.capacity, 10);
        assert!(source.requested > 10);
        assert!(source.overshoot() > 0.0);
    }

    #[test]
    fn every_site_is_taken_when_density_exceeds_lattice() {
        let geometry = solvent_geometry(12, 12, 12, 2);
        let mut population = solvent_population(&geometry);
        population.expected_atoms = 10.0 * geometry.usable_sites() as f64;
        population.capacity = 11 * geometry.usable_sites();

        let atoms = run(&geometry, &population, 2, 5, &ProgressReporter::new()).unwrap();
        assert_eq!(atoms.len(), geometry.usable_sites());
    }
}
