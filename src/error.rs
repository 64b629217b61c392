//! Crate-wide error type.

/// Errors produced while building graphs, converting chromosomes,
/// or running the baseline scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed graph input (duplicate ids, dangling parents,
    /// inseparable fan-out, cycles).
    #[error("Structural error: {0}")]
    Structural(String),

    /// A node, work or contractor id is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The chromosome is not decodable against the graph and contractors.
    #[error("Invalid chromosome: {0}")]
    InvalidChromosome(String),

    /// No contractor can staff a work unit.
    #[error("No suitable contractor for work '{0}'")]
    NoSuitableContractor(String),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
