//! Engine configuration.
//!
//! Plain structs with defaults; every field may be omitted from a JSON
//! config file.

use crate::alias::AliasPolicy;
use crate::errors::ConfigError;
use crate::simplify::Simplifier;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Default cap on fixpoint iterations.
pub const MAX_ITERATIONS: usize = 40;

/// Settings for [`Simplifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifierConfig {
    /// Passes [`Simplifier::simplify_to_fixpoint`] runs before giving up.
    pub max_iterations: usize,
    /// Log every rewrite at debug level instead of trace.
    pub trace_rewrites: bool,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        SimplifierConfig {
            max_iterations: MAX_ITERATIONS,
            trace_rewrites: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simplifier: SimplifierConfig,
    /// JSON target description with the register alias table.  Relative
    /// paths are resolved against the config file's directory when loaded
    /// with [`EngineConfig::from_file`].
    pub alias_policy: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&text)?;
        if let (Some(policy), Some(dir)) = (&config.alias_policy, path.parent()) {
            if policy.is_relative() {
                config.alias_policy = Some(dir.join(policy));
            }
        }
        Ok(config)
    }

    /// Load the configured alias policy, or an empty one if none is set.
    pub fn load_alias_policy(&self) -> Result<Rc<AliasPolicy>, ConfigError> {
        match &self.alias_policy {
            Some(path) => Ok(Rc::new(AliasPolicy::from_file(path)?)),
            None => Ok(Rc::new(AliasPolicy::none())),
        }
    }

    /// A standard simplifier using these settings.
    pub fn simplifier(&self) -> Simplifier {
        Simplifier::with_config(self.simplifier.clone())
    }
}
