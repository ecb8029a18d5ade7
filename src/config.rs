//! Governor and quota configuration.
//!
//! Defaults come from the synced-storage platform: 512 keys and 8 KiB per
//! item. The ceiling leaves headroom below the hard key limit so that
//! non-bookmark keys (pinned lists, settings) still fit.
//!
//! ```ignore
//! let config = GovernorConfig::from_toml_str(r#"
//!     ceiling = 400
//!     batch_size = 10
//! "#)?;
//! ```

use crate::error::{Error, Result};
use pinmark_primitives::DEFAULT_EXAMINE_FACTOR;
use serde::{Deserialize, Serialize};

/// Default bookmark key ceiling
pub const DEFAULT_CEILING: usize = 500;

/// Default number of collections evicted per pass
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default per-item quota in bytes
pub const DEFAULT_PER_ITEM_QUOTA: usize = 8192;

/// Capacity and quota settings for [`Bookmarks`](crate::Bookmarks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GovernorConfig {
    /// Bookmark key count at which eviction starts
    pub ceiling: usize,
    /// Collections evicted per pass
    pub batch_size: usize,
    /// Maximum serialized size of one collection in bytes
    pub per_item_quota: usize,
    /// Candidates examined per batch slot before giving up
    pub examine_factor: usize,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_CEILING,
            batch_size: DEFAULT_BATCH_SIZE,
            per_item_quota: DEFAULT_PER_ITEM_QUOTA,
            examine_factor: DEFAULT_EXAMINE_FACTOR,
        }
    }
}

impl GovernorConfig {
    /// Parse a TOML document; missing fields take their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the key ceiling.
    pub fn ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Set the eviction batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the per-item quota in bytes.
    pub fn per_item_quota(mut self, per_item_quota: usize) -> Self {
        self.per_item_quota = per_item_quota;
        self
    }

    /// Set the examine factor.
    pub fn examine_factor(mut self, examine_factor: usize) -> Self {
        self.examine_factor = examine_factor;
        self
    }

    /// Reject settings the governor cannot work with
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("ceiling", self.ceiling),
            ("batch_size", self.batch_size),
            ("per_item_quota", self.per_item_quota),
            ("examine_factor", self.examine_factor),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{name} must be greater than 0")));
            }
        }
        if self.batch_size > self.ceiling {
            return Err(Error::InvalidConfig(format!(
                "batch_size ({}) must not exceed ceiling ({})",
                self.batch_size, self.ceiling
            )));
        }
        Ok(())
    }
}
