//! Analysis configuration.
//!
//! Defaults suit a normal build. The environment can override them:
//!
//! - `DSEM_INFER`: comma-separated attributes that may be inferred
//!   (`pure`, `safe`, `nothrow`, `nogc`), or `all` / `none`
//! - `DSEM_NO_INVARIANTS`: `1` or `true` to stop inserting invariant calls
//!
//! Example: `DSEM_INFER=pure,nothrow`

use thiserror::Error;

use crate::infer::AttrSet;

/// Attributes that may be inferred.
pub type InferFlags = AttrSet;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown attribute `{0}`; expected pure, safe, nothrow, nogc, all or none")]
    UnknownAttribute(String),
    #[error("invalid value `{value}` for {var}; expected 0, 1, true or false")]
    InvalidBool { var: &'static str, value: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Insert invariant checks around public member functions.
    pub use_invariants: bool,
    /// Attributes inference may conclude. The others are "not proven" for
    /// every function that does not spell them out.
    pub infer: InferFlags,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            use_invariants: true,
            infer: InferFlags::all(),
        }
    }
}

impl AnalysisConfig {
    pub const INFER_VAR: &'static str = "DSEM_INFER";
    pub const NO_INVARIANTS_VAR: &'static str = "DSEM_NO_INVARIANTS";

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(Self::INFER_VAR) {
            config.infer = InferFlags::parse(&value)?;
        }
        if let Some(value) = lookup(Self::NO_INVARIANTS_VAR) {
            config.use_invariants = !parse_bool(Self::NO_INVARIANTS_VAR, &value)?;
        }
        tracing::debug!(?config, "analysis configuration");
        Ok(config)
    }
}

impl AttrSet {
    /// Parse a comma-separated attribute list.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let mut flags = AttrSet::empty();
        for part in s.split(',') {
            match part.trim().to_lowercase().as_str() {
                "" | "none" => {}
                "pure" => flags |= AttrSet::PURITY,
                "safe" | "@safe" => flags |= AttrSet::SAFETY,
                "nothrow" => flags |= AttrSet::NOTHROW,
                "nogc" | "@nogc" => flags |= AttrSet::NOGC,
                "all" => flags |= AttrSet::all(),
                other => return Err(ConfigError::UnknownAttribute(other.to_owned())),
            }
        }
        Ok(flags)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests;
