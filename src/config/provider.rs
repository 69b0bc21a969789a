//! Configuration Provider Trait

use super::ConfigResult;

/// A source of raw configuration values, keyed by snake_case field name.
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;
}
