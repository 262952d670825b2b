//! # Core Module
//!
//! Fundamental data structures and stateless utilities shared by the engine.
//!
//! - **Data Models** ([`models`]) - Atom positions, the fixed-capacity atom collection,
//!   materials and the specimen geometry interface
//! - **Utilities** ([`utils`]) - Euler rotations used by the tilt padding computation

pub mod models;
pub mod utils;
