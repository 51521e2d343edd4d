use serde::{Deserialize, Serialize};

/// Layer width used as threshold to decide whether a layer is hashed on the
/// rayon pool. Narrow layers are hashed on the calling thread, where the cost
/// of splitting the work is higher than the hashing itself.
// FIXME: Hand-picked constant, pick it from benchmarks of the bundled providers.
pub const SMALL_TREE_BUILD: usize = 1024;

/// Tree build settings.
///
/// Settings only change how the work is scheduled; the resulting layers and
/// root are identical for every configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Minimum number of nodes in a layer for it to be hashed in parallel.
    pub parallel_threshold: usize,
}

impl BuildConfig {
    /// Creates a config hashing layers of at least `parallel_threshold` nodes
    /// in parallel.
    pub fn new(parallel_threshold: usize) -> BuildConfig {
        BuildConfig { parallel_threshold }
    }

    /// Creates a config that never leaves the calling thread.
    pub fn sequential() -> BuildConfig {
        BuildConfig::new(usize::MAX)
    }

    #[inline]
    pub(crate) fn is_parallel(&self, width: usize) -> bool {
        width >= self.parallel_threshold
    }
}

impl Default for BuildConfig {
    fn default() -> BuildConfig {
        BuildConfig::new(SMALL_TREE_BUILD)
    }
}

#[test]
fn test_build_config_defaults() {
    let config: BuildConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, BuildConfig::default());
    assert_eq!(config.parallel_threshold, SMALL_TREE_BUILD);

    let config: BuildConfig = serde_json::from_str(r#"{"parallel_threshold": 2}"#).unwrap();
    assert!(config.is_parallel(2));
    assert!(!config.is_parallel(1));

    assert!(!BuildConfig::sequential().is_parallel(usize::MAX - 1));
}
