//! Registry configuration.

/// Tuning knobs for `StatementSetRegistry`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Failures after a set's newest member at which the set is abandoned.
    pub failure_threshold: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            failure_threshold: 3,
        }
    }
}

impl RegistryConfig {
    /// Never abandon a set.
    pub fn persistent() -> Self {
        RegistryConfig {
            failure_threshold: usize::MAX,
        }
    }
}
