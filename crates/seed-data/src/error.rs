//! Error types for demo data generation.

/// Failures raised while generating demo data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The requested customer count exceeds what the generator supports.
    #[error("demo account count {requested} exceeds the maximum of {max}")]
    TooManyAccounts {
        /// Number of customer accounts requested.
        requested: usize,
        /// Largest supported customer count.
        max: usize,
    },
    /// A generated account email collided after exhausting retries.
    #[error("could not derive a unique email after {attempts} attempts")]
    EmailCollision {
        /// Number of attempts made before giving up.
        attempts: usize,
    },
}
