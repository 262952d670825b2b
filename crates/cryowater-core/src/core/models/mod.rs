//! Data models for the simulated atom field.
//!
//! Atoms carry no identity beyond their index in an [`atom::AtomCollection`]; the collection
//! itself is sized once from the population model and never grows afterwards.

pub mod atom;
pub mod material;
pub mod specimen;
