use super::config::ConfigError;
use super::geometry::GeometryError;
use crate::core::models::atom::CapacityError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Volume geometry error: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Seeded atoms overflowed the preallocated collection: {source}")]
    Capacity {
        #[from]
        source: CapacityError,
    },

    #[error("Initial positions have already been seeded for this volume")]
    AlreadySeeded,

    #[error("Initial positions must be seeded before the atoms can be perturbed")]
    NotSeeded,

    #[error("Invalid displacement distribution: {0}")]
    Distribution(String),

    #[error("Failed to build worker pool with {threads} threads: {reason}")]
    WorkerPool { threads: usize, reason: String },
}
