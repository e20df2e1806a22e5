//! Engine configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{GraphError, Result};

const MAX_FRIENDS_VAR: &str = "FRIEND_FOREST_MAX_FRIENDS";
const DATA_DIR_VAR: &str = "FRIEND_FOREST_DATA_DIR";

const FRIENDS_FILE: &str = "friends.json";
const PENDING_FILE: &str = "pending_requests.json";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Upper bound on a single user's friend count. `None` means unbounded.
    pub max_friends: Option<usize>,
    /// Directory holding the persisted friend and pending-request files.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_friends: None,
            data_dir: PathBuf::from("database"),
        }
    }
}

impl Config {
    /// Reads the configuration from the environment, falling back to the
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidConfig`] if a variable is set but does not
    /// parse.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_friends: try_load::<usize>(MAX_FRIENDS_VAR)?.or(defaults.max_friends),
            data_dir: try_load::<PathBuf>(DATA_DIR_VAR)?.unwrap_or(defaults.data_dir),
        })
    }

    #[must_use]
    pub fn friends_path(&self) -> PathBuf {
        self.data_dir.join(FRIENDS_FILE)
    }

    #[must_use]
    pub fn pending_path(&self) -> PathBuf {
        self.data_dir.join(PENDING_FILE)
    }
}

fn try_load<T: FromStr>(key: &'static str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    let raw = match env::var(key) {
        Ok(raw) => raw,
        Err(env::VarError::NotPresent) => {
            info!("{key} not set, using default");
            return Ok(None);
        }
        Err(e) => {
            warn!("Invalid {key} value: {e}");
            return Err(GraphError::InvalidConfig {
                key,
                reason: e.to_string(),
            });
        }
    };

    raw.trim().parse().map(Some).map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        GraphError::InvalidConfig {
            key,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_paths_live_under_data_dir() {
        let config = Config::default();
        assert_eq!(config.friends_path(), PathBuf::from("database/friends.json"));
        assert_eq!(config.pending_path(), PathBuf::from("database/pending_requests.json"));
        assert_eq!(config.max_friends, None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "max_friends": 5 }"#).unwrap();
        assert_eq!(config.max_friends, Some(5));
        assert_eq!(config.data_dir, PathBuf::from("database"));
    }
}
