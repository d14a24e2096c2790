//! World configuration.
//!
//! Everything is fixed at construction time. Values can be set in code through the
//! `with_*` builders or, for the seed and the render distance, from the
//! environment with [`WorldConfig::from_env`].

use std::{env, str::FromStr};

use log::warn;

use super::{error::WorldError, task_management};

/// Environment variable overriding [`WorldConfig::seed`].
pub const SEED_ENV: &str = "VOXEL_WORLD_SEED";
/// Environment variable overriding [`WorldConfig::render_distance`].
pub const RENDER_DISTANCE_ENV: &str = "VOXEL_RENDER_DISTANCE";

/// Smallest allowed gap between the load and the unload radius.
pub const MIN_HYSTERESIS_MARGIN: i32 = 2;

/// Construction parameters of a [`World`](super::voxels::world::World).
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Load radius in chunks
    pub render_distance: i32,
    /// Terrain seed
    pub seed: u32,
    /// Extra chunks beyond `render_distance` before a chunk is unloaded
    pub hysteresis_margin: i32,
    /// Distance the observer must move before the load set is recomputed
    pub movement_threshold: f32,
    /// Finished chunks materialised per `update` call
    pub max_results_per_update: usize,
    /// Number of generation threads
    pub worker_count: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            render_distance: 5,
            seed: 12345,
            hysteresis_margin: MIN_HYSTERESIS_MARGIN,
            movement_threshold: 8.0,
            max_results_per_update: 2,
            worker_count: task_management::default_worker_count(),
        }
    }
}

impl WorldConfig {
    /// Defaults overridden by `VOXEL_WORLD_SEED` and `VOXEL_RENDER_DISTANCE` when set.
    pub fn from_env() -> Result<Self, WorldError> {
        let mut config = Self::default();
        if let Some(seed) = parse_env(SEED_ENV)? {
            config.seed = seed;
        }
        if let Some(render_distance) = parse_env(RENDER_DISTANCE_ENV)? {
            config = config.with_render_distance(render_distance);
        }
        Ok(config)
    }

    /// Sets the load radius. Negative values are treated as zero.
    pub fn with_render_distance(mut self, render_distance: i32) -> Self {
        self.render_distance = render_distance.max(0);
        self
    }

    /// Sets the terrain seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the unload margin, raising it to the minimum if needed.
    pub fn with_hysteresis_margin(mut self, margin: i32) -> Self {
        if margin < MIN_HYSTERESIS_MARGIN {
            warn!("Hysteresis margin {margin} is too small, using {MIN_HYSTERESIS_MARGIN}");
        }
        self.hysteresis_margin = margin.max(MIN_HYSTERESIS_MARGIN);
        self
    }

    /// Sets the movement threshold in world units.
    pub fn with_movement_threshold(mut self, threshold: f32) -> Self {
        self.movement_threshold = threshold.max(0.0);
        self
    }

    /// Sets how many finished chunks are materialised per update (at least one).
    pub fn with_max_results_per_update(mut self, max: usize) -> Self {
        self.max_results_per_update = max.max(1);
        self
    }

    /// Sets the number of generation threads (at least one).
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    /// Applies the same limits as the `with_*` builders to every field.
    ///
    /// Fields are public, so a struct literal can bypass the builders. The world
    /// runs its configuration through here before using it.
    pub fn validated(self) -> Self {
        if self.render_distance < 0 {
            warn!("Render distance {} is negative, using 0", self.render_distance);
        }
        if self.max_results_per_update == 0 {
            warn!("Max results per update is 0, using 1");
        }
        if self.worker_count == 0 {
            warn!("Worker count is 0, using 1");
        }
        let movement_threshold = if self.movement_threshold.is_finite() {
            self.movement_threshold
        } else {
            warn!("Movement threshold {} is not finite, using 0", self.movement_threshold);
            0.0
        };

        let render_distance = self.render_distance;
        let margin = self.hysteresis_margin;
        let max_results = self.max_results_per_update;
        let worker_count = self.worker_count;
        self.with_render_distance(render_distance)
            .with_hysteresis_margin(margin)
            .with_movement_threshold(movement_threshold)
            .with_max_results_per_update(max_results)
            .with_worker_count(worker_count)
    }

    /// Radius beyond which loaded chunks are dropped.
    pub fn unload_distance(&self) -> i32 {
        self.render_distance + self.hysteresis_margin
    }
}

/// Reads and parses an environment variable. Unset is `Ok(None)`.
pub(crate) fn parse_env<T: FromStr>(key: &'static str) -> Result<Option<T>, WorldError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| WorldError::InvalidConfig { key, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.render_distance, 5);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.hysteresis_margin, 2);
        assert_eq!(config.movement_threshold, 8.0);
        assert_eq!(config.max_results_per_update, 2);
        assert!(config.worker_count >= 1);
        assert_eq!(config.unload_distance(), 7);
    }

    #[test]
    fn test_builders_clamp() {
        let config = WorldConfig::default()
            .with_hysteresis_margin(0)
            .with_max_results_per_update(0)
            .with_worker_count(0)
            .with_render_distance(-3);
        assert_eq!(config.hysteresis_margin, MIN_HYSTERESIS_MARGIN);
        assert_eq!(config.max_results_per_update, 1);
        assert_eq!(config.worker_count, 1);
        assert_eq!(config.render_distance, 0);

        let config = WorldConfig::default().with_hysteresis_margin(4).with_seed(9);
        assert_eq!(config.hysteresis_margin, 4);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn test_validated_clamps_struct_literal() {
        let config = WorldConfig {
            render_distance: -4,
            seed: 7,
            hysteresis_margin: 0,
            movement_threshold: f32::NAN,
            max_results_per_update: 0,
            worker_count: 0,
        }
        .validated();

        assert_eq!(config.render_distance, 0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.hysteresis_margin, MIN_HYSTERESIS_MARGIN);
        assert_eq!(config.movement_threshold, 0.0);
        assert_eq!(config.max_results_per_update, 1);
        assert_eq!(config.worker_count, 1);

        // Valid values pass through untouched.
        let config = WorldConfig::default().with_hysteresis_margin(5);
        assert_eq!(config.clone().validated(), config);
    }

    #[test]
    fn test_parse_env() {
        // Keys are unique to this test so parallel tests cannot interfere.
        env::set_var("VOXEL_TEST_PARSE_OK", " 42 ");
        env::set_var("VOXEL_TEST_PARSE_BAD", "forty-two");

        assert_eq!(parse_env::<u32>("VOXEL_TEST_PARSE_OK").unwrap(), Some(42));
        assert_eq!(parse_env::<u32>("VOXEL_TEST_PARSE_UNSET").unwrap(), None);
        match parse_env::<u32>("VOXEL_TEST_PARSE_BAD") {
            Err(WorldError::InvalidConfig { key, value }) => {
                assert_eq!(key, "VOXEL_TEST_PARSE_BAD");
                assert_eq!(value, "forty-two");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
