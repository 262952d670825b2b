//! Utility functions for the engine module.
//!
//! Random stream derivation for work items and construction of the worker pools the tasks
//! run on.

#[cfg(feature = "parallel")]
pub mod pool;
pub mod streams;
