//! # Bridge Configuration
//!
//! Runtime knobs of the bridge, read from the environment.
//!
//! ## Environment Variables
//!
//! - `CONDUIT_PAGE_SIZE`: Page size used by the instruction reader (default: `4096`,
//!   accepts decimal or `0x` hex)
//! - `CONDUIT_MAX_INSTRUCTION_SIZE`: Longest instruction encoding in bytes (default: `15`)
//! - `CONDUIT_DISASSEMBLY_FLAVOR`: Flavor used when a request does not name one
//!   (default: `intel`)

use std::env;

/// Environment variable holding the page size.
pub const PAGE_SIZE_ENV: &str = "CONDUIT_PAGE_SIZE";
/// Environment variable holding the longest instruction encoding.
pub const MAX_INSTRUCTION_SIZE_ENV: &str = "CONDUIT_MAX_INSTRUCTION_SIZE";
/// Environment variable holding the default disassembly flavor.
pub const DISASSEMBLY_FLAVOR_ENV: &str = "CONDUIT_DISASSEMBLY_FLAVOR";

/// Bridge settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig
{
    /// Page size in bytes.
    pub page_size: u64,
    /// Longest instruction encoding in bytes.
    pub max_instruction_size: u64,
    /// Disassembly flavor for requests that leave it empty.
    pub disassembly_flavor: String,
}

impl Default for BridgeConfig
{
    fn default() -> Self
    {
        Self {
            page_size: 4096,
            max_instruction_size: 15,
            disassembly_flavor: "intel".to_string(),
        }
    }
}

impl BridgeConfig
{
    /// Read the configuration from the process environment.
    ///
    /// Unset variables keep their defaults. Only the syntax is checked here; the
    /// instruction reader rejects page geometry it cannot use.
    ///
    /// ## Errors
    ///
    /// `InvalidValue` for unparsable numbers.
    pub fn from_env() -> Result<Self, ConfigError>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// ## Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(PAGE_SIZE_ENV) {
            config.page_size = parse_size(PAGE_SIZE_ENV, &value)?;
        }
        if let Some(value) = lookup(MAX_INSTRUCTION_SIZE_ENV) {
            config.max_instruction_size = parse_size(MAX_INSTRUCTION_SIZE_ENV, &value)?;
        }
        if let Some(value) = lookup(DISASSEMBLY_FLAVOR_ENV) {
            let value = value.trim();
            if !value.is_empty() {
                config.disassembly_flavor = value.to_string();
            }
        }
        Ok(config)
    }

    /// `flavor` if non-empty, else the configured default.
    #[must_use]
    pub fn flavor_or_default<'a>(&'a self, flavor: &'a str) -> &'a str
    {
        if flavor.is_empty() {
            &self.disassembly_flavor
        } else {
            flavor
        }
    }
}

fn parse_size(key: &'static str, value: &str) -> Result<u64, ConfigError>
{
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|e| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError
{
    /// A variable could not be parsed
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue
    {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },
}
