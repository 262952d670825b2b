//! # Engine Module
//!
//! The stateful layer that turns a configuration into an atom field and evolves it frame by
//! frame.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Material, exposure, tilt geometry and worker settings
//! - **Volume Geometry** ([`geometry`]) - Physical extents, voxel grid and tilt/rotation padding
//! - **Population Model** ([`population`]) - Density to expected atom count and storage capacity
//! - **Volume Model** ([`volume`]) - `SolventVolume`, the owner of geometry and atoms
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Engine-level error type
//!
//! The heavy lifting happens in the internal `tasks` module: tiled density seeding and the
//! per-frame thermal perturbation, both run on a fixed-size worker pool with one owned random
//! stream per work item.

pub mod config;
pub mod error;
pub mod geometry;
pub mod population;
pub mod progress;
pub(crate) mod tasks;
pub(crate) mod utils;
pub mod volume;

pub use tasks::perturbation::PerturbationStats;
