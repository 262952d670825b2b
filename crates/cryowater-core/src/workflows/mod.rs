//! # Workflows Module
//!
//! High-level entry points that drive a [`SolventVolume`](crate::engine::volume::SolventVolume)
//! through a complete run for callers that do not need frame-by-frame control.
//!
//! - **Simulation Workflow** ([`simulate`]) - Construct the volume, seed it, then apply a
//!   caller-chosen number of perturbation frames and summarize the run.

pub mod simulate;
