//! Mapper configuration.

use scry_registry::RegistryConfig;
use scry_tree::MatcherConfig;

/// Tuning knobs for `ScriptVersionMapper`.
#[derive(Clone, Debug, PartialEq)]
pub struct MapperConfig {
    /// Preceding versions considered when mapping a new version.
    pub lookback: usize,
    /// Diffs kept per mapper; parsed trees and scripts get twice as many.
    pub diff_cache_capacity: usize,
    pub matcher: MatcherConfig,
    pub registry: RegistryConfig,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            lookback: 4,
            diff_cache_capacity: 64,
            matcher: MatcherConfig::default(),
            registry: RegistryConfig::default(),
        }
    }
}

impl MapperConfig {
    /// Look further back and match more carefully; for scripts that change
    /// a lot between deploys.
    pub fn thorough() -> Self {
        MapperConfig {
            lookback: 8,
            matcher: MatcherConfig::strict(),
            ..MapperConfig::default()
        }
    }
}
