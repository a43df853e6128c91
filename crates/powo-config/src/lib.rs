//! Configuration for the PoWo service.
//!
//! Configuration is TOML with three sections, all optional:
//!
//! ```toml
//! [domain]
//! name = "Gateway Powo"
//! version = "1"
//! chain_id = 1
//!
//! [token]
//! lifetime_minutes = 30
//! gatekeeper_address = "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
//! gatekeeper_url = "https://api.civic.com/asdf"
//!
//! [signer]
//! primary = "local"
//! [signer.implementations.local]
//! private_key = "${POWO_PRIVATE_KEY}"
//! ```
//!
//! ## Modular Configuration Support
//!
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files
//! - `${VAR}` and `${VAR:-default}` are replaced from the environment

#[cfg(any(test, feature = "testing"))]
pub mod builders {
	pub mod config;
}
mod loader;

use powo_types::{parse_address, Address, Domain, DEFAULT_CHAIN_ID, DOMAIN_NAME, DOMAIN_VERSION};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// EIP-712 signing domain.
	#[serde(default)]
	pub domain: DomainConfig,
	/// Issuance parameters.
	#[serde(default)]
	pub token: TokenConfig,
	/// Signer used by `issue`. Not needed for digest computation or verification.
	pub signer: Option<SignerConfig>,
}

/// EIP-712 domain parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
	#[serde(default = "default_domain_name")]
	pub name: String,
	#[serde(default = "default_domain_version")]
	pub version: String,
	#[serde(default = "default_chain_id")]
	pub chain_id: u64,
}

impl Default for DomainConfig {
	fn default() -> Self {
		Self {
			name: default_domain_name(),
			version: default_domain_version(),
			chain_id: default_chain_id(),
		}
	}
}

impl DomainConfig {
	pub fn to_domain(&self) -> Domain {
		Domain::new(self.name.clone(), self.version.clone(), self.chain_id)
	}
}

fn default_domain_name() -> String {
	DOMAIN_NAME.to_string()
}

fn default_domain_version() -> String {
	DOMAIN_VERSION.to_string()
}

fn default_chain_id() -> u64 {
	DEFAULT_CHAIN_ID
}

/// Token issuance parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
	/// Validity window of issued tokens in minutes.
	/// Defaults to 30 minutes if not specified.
	#[serde(default = "default_lifetime_minutes")]
	pub lifetime_minutes: u64,
	/// Gatekeeper used when the caller does not name one.
	pub gatekeeper_address: Option<String>,
	/// Gatekeeper endpoint used when the caller does not name one.
	pub gatekeeper_url: Option<String>,
}

impl Default for TokenConfig {
	fn default() -> Self {
		Self {
			lifetime_minutes: default_lifetime_minutes(),
			gatekeeper_address: None,
			gatekeeper_url: None,
		}
	}
}

impl TokenConfig {
	/// Parsed default gatekeeper address, if configured.
	pub fn gatekeeper(&self) -> Result<Option<Address>, ConfigError> {
		self.gatekeeper_address
			.as_deref()
			.map(|text| {
				parse_address(text).map_err(|e| {
					ConfigError::Validation(format!("token.gatekeeper_address: {}", e))
				})
			})
			.transpose()
	}
}

fn default_lifetime_minutes() -> u64 {
	30
}

/// Signer selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignerConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of signer implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

impl SignerConfig {
	/// Configuration table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to bound regex work.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Signing domain described by this configuration.
	pub fn domain(&self) -> Domain {
		self.domain.to_domain()
	}

	/// Validates the configuration:
	/// - Domain name and version are not empty and the chain ID is positive
	/// - Token lifetime is between 1 minute and 24 hours
	/// - A configured default gatekeeper address parses
	/// - The primary signer is one of the configured implementations
	fn validate(&self) -> Result<(), ConfigError> {
		if self.domain.name.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Domain name cannot be empty".into(),
			));
		}
		if self.domain.version.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Domain version cannot be empty".into(),
			));
		}
		if self.domain.chain_id == 0 {
			return Err(ConfigError::Validation(
				"Domain chain_id must be greater than 0".into(),
			));
		}

		if self.token.lifetime_minutes == 0 {
			return Err(ConfigError::Validation(
				"Token lifetime_minutes must be at least 1".into(),
			));
		}
		if self.token.lifetime_minutes > 1440 {
			return Err(ConfigError::Validation(
				"Token lifetime_minutes cannot exceed 1440 (24 hours)".into(),
			));
		}
		self.token.gatekeeper()?;

		if let Some(signer) = &self.signer {
			if signer.primary.is_empty() {
				return Err(ConfigError::Validation(
					"Signer primary implementation cannot be empty".into(),
				));
			}
			if !signer.implementations.contains_key(&signer.primary) {
				return Err(ConfigError::Validation(format!(
					"Primary signer '{}' not found in implementations",
					signer.primary
				)));
			}
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
