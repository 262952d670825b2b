//! # cryowater Core Library
//!
//! Generates and perturbs the solvent (or amorphous-carbon support film) atom field that
//! surrounds a specimen in electron-microscopy image simulation.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Plain data models (`AtomPosition`, `AtomCollection`,
//!   `Material`, `SpecimenGeometry`) and stateless geometry utilities.
//!
//! - **[`engine`]: The Logic Core.** Volume geometry and tilt padding, the population model,
//!   the tiled density seeder and the per-frame thermal perturbation, all owned by
//!   `SolventVolume`.
//!
//! - **[`workflows`]: The Public API.** Drives a complete run (construct, seed, perturb frame by
//!   frame) and returns a serializable report.

pub mod core;
pub mod engine;
pub mod workflows;
