//! Computational tasks run on the worker pool.
//!
//! - [`seeding`] places the initial atom field on the voxel lattice, one disjoint tile per
//!   work item.
//! - [`perturbation`] applies one frame of thermal motion to every atom, one contiguous chunk
//!   of the atom buffer per worker.

pub mod perturbation;
pub mod seeding;
