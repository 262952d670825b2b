use crate::core::models::atom::{AtomCollection, AtomPosition};
use crate::engine::error::EngineError;
use crate::engine::geometry::VolumeGeometry;
use crate::engine::utils::streams::{StreamKind, worker_rng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use crate::engine::utils::pool::worker_pool;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Beyond four workers the per-atom update is memory bound and extra threads only contend.
pub const MAX_PERTURBATION_THREADS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PerturbationStats {
    pub frame: u64,
    pub atoms: usize,
    /// Atoms that left the usable band on at least one axis and were folded back in.
    pub wrapped: usize,
}

pub fn effective_threads(requested: usize) -> usize {
    requested.clamp(1, MAX_PERTURBATION_THREADS)
}

/// Folds a coordinate back into the half-open band `[lower, upper)` with a single periodic
/// shift. Returns the new coordinate and whether a shift was applied.
///
/// A step long enough to cross the whole band is not folded twice. A shift that rounds onto
/// or past the opposite edge is clamped to the nearest representable coordinate inside.
#[inline]
pub fn wrap_into_band(coord: f32, lower: f32, upper: f32) -> (f32, bool) {
    let width = upper - lower;
    if coord < lower {
        let folded = coord + width;
        (if folded >= upper { below(upper, lower) } else { folded }, true)
    } else if coord >= upper {
        (f32::max(coord - width, lower), true)
    } else {
        (coord, false)
    }
}

/// Largest `f32` strictly below `upper`, but never below `lower`.
#[inline]
fn below(upper: f32, lower: f32) -> f32 {
    let step_down = if upper > 0.0 {
        f32::from_bits(upper.to_bits() - 1)
    } else if upper == 0.0 {
        -f32::from_bits(1)
    } else {
        f32::from_bits(upper.to_bits() + 1)
    };
    step_down.max(lower)
}

fn perturb_chunk<R: rand::Rng>(
    chunk: &mut [AtomPosition],
    normal: &Normal<f32>,
    rng: &mut R,
    bands: &[(f32, f32); 3],
) -> usize {
    let mut wrapped = 0;
    for atom in chunk.iter_mut() {
        let mut any_wrapped = false;
        for (coord, &(lower, upper)) in atom.coords_mut().into_iter().zip(bands) {
            let (folded, shifted) = wrap_into_band(*coord + normal.sample(rng), lower, upper);
            *coord = folded;
            any_wrapped |= shifted;
        }
        wrapped += usize::from(any_wrapped);
    }
    wrapped
}

/// Displaces every atom by an independent Gaussian step of standard deviation `sigma` voxels
/// per axis, folding atoms that leave the usable band back in.
///
/// The atom buffer is cut into one contiguous chunk per worker and every chunk draws from its
/// own stream, derived from the seed, the frame and the chunk index.
#[instrument(skip_all, name = "thermal_perturbation_task", fields(frame = frame, sigma = sigma))]
pub fn run(
    atoms: &mut AtomCollection,
    geometry: &VolumeGeometry,
    sigma: f64,
    threads: usize,
    seed: u64,
    frame: u64,
) -> Result<PerturbationStats, EngineError> {
    let mut stats = PerturbationStats {
        frame,
        atoms: atoms.len(),
        wrapped: 0,
    };
    if sigma == 0.0 || atoms.is_empty() {
        return Ok(stats);
    }

    let normal =
        Normal::new(0.0f32, sigma as f32).map_err(|e| EngineError::Distribution(e.to_string()))?;
    let bands = [0, 1, 2].map(|axis| geometry.usable_band(axis));

    let workers = effective_threads(threads);
    let chunk_size = atoms.len().div_ceil(workers).max(1);
    info!(
        workers,
        "Perturbing {} atoms with a per-axis sigma of {:.4} voxels.",
        atoms.len(),
        sigma
    );

    let perturb = |(index, chunk): (usize, &mut [AtomPosition])| {
        let mut rng = worker_rng(seed, StreamKind::Perturbation { frame }, index);
        perturb_chunk(chunk, &normal, &mut rng, &bands)
    };

    #[cfg(feature = "parallel")]
    let wrapped: usize = worker_pool(workers)?.install(|| {
        atoms
            .as_mut_slice()
            .par_chunks_mut(chunk_size)
            .enumerate()
            .map(perturb)
            .sum()
    });

    #[cfg(not(feature = "parallel"))]
    let wrapped: usize = atoms
        .as_mut_slice()
        .chunks_mut(chunk_size)
        .enumerate()
        .map(perturb)
        .sum();

    stats.wrapped = wrapped;
    Ok(stats)
}
