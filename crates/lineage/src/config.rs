//! Configuration of a root error family

use serde::{Deserialize, Serialize};

use crate::error::{LineageError, Result};
use crate::transport::StackPolicy;

/// Default maximum depth of an error type chain
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Root family configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    /// Display name of the root type
    pub root_name: String,

    /// Message template of the root type
    pub default_message: String,

    /// Types at this depth or deeper cannot be created
    pub max_depth: usize,

    /// Stack inclusion used by `ErrorInstance::transport`
    pub stack_policy: StackPolicy,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            root_name: "LineageError".to_owned(),
            default_message: "{{name}} aggregated error".to_owned(),
            max_depth: DEFAULT_MAX_DEPTH,
            stack_policy: StackPolicy::Own,
        }
    }
}

impl LineageConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| LineageError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_stack_policy(mut self, policy: StackPolicy) -> Self {
        self.stack_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.root_name.is_empty() {
            return Err(LineageError::InvalidConfig("root_name must not be empty".into()));
        }
        if self.max_depth == 0 {
            return Err(LineageError::InvalidConfig("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}
