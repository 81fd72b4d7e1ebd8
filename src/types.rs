//! Configuration types.

use std::env::VarError;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Number of instance slots a registry gets unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Largest capacity accepted from configuration. Slots are allocated up
/// front, so this bounds the memory a registry can claim.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Environment variable read by [`RegistryOptions::from_env`].
pub const CAPACITY_ENV_VAR: &str = "FGEN_EXAMPLE_N_INSTANCES";

/// Options for creating an instance registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryOptions {
    /// Maximum number of simultaneously allocated instances.
    pub capacity: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl RegistryOptions {
    /// Read options from the environment, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_var(std::env::var(CAPACITY_ENV_VAR))
    }

    fn from_var(var: std::result::Result<String, VarError>) -> Result<Self> {
        match var {
            Ok(raw) => Self::parse_capacity(&raw),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => Err(Error::InvalidArgument(format!(
                "{CAPACITY_ENV_VAR} is not valid unicode: {raw:?}"
            ))),
        }
    }

    fn parse_capacity(raw: &str) -> Result<Self> {
        let capacity: usize = raw.trim().parse().map_err(|_| {
            Error::InvalidArgument(format!(
                "{CAPACITY_ENV_VAR} must be a non-negative integer, got {raw:?}"
            ))
        })?;
        if capacity > MAX_CAPACITY {
            return Err(Error::InvalidArgument(format!(
                "{CAPACITY_ENV_VAR} must be at most {MAX_CAPACITY}, got {capacity}"
            )));
        }
        Ok(Self { capacity })
    }
}
