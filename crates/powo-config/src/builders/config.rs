//! Configuration builder for tests and local development.

use crate::{Config, DomainConfig, SignerConfig, TokenConfig};
use std::collections::HashMap;

/// Anvil's first development key. Never use it for anything real.
pub const DEV_PRIVATE_KEY: &str =
	"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Builder for creating `Config` instances with a fluent API.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	chain_id: u64,
	lifetime_minutes: u64,
	gatekeeper_address: Option<String>,
	gatekeeper_url: Option<String>,
	private_key: Option<String>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Mainnet domain, 30 minute tokens, local signer with the development key.
	pub fn new() -> Self {
		Self {
			chain_id: 1,
			lifetime_minutes: 30,
			gatekeeper_address: None,
			gatekeeper_url: None,
			private_key: Some(DEV_PRIVATE_KEY.to_string()),
		}
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	pub fn lifetime_minutes(mut self, minutes: u64) -> Self {
		self.lifetime_minutes = minutes;
		self
	}

	pub fn gatekeeper(mut self, address: impl Into<String>, url: impl Into<String>) -> Self {
		self.gatekeeper_address = Some(address.into());
		self.gatekeeper_url = Some(url.into());
		self
	}

	/// Drops the signer section.
	pub fn without_signer(mut self) -> Self {
		self.private_key = None;
		self
	}

	pub fn build(self) -> Config {
		let signer = self.private_key.map(|key| {
			let mut local = toml::map::Map::new();
			local.insert("private_key".to_string(), toml::Value::String(key));
			let mut implementations = HashMap::new();
			implementations.insert("local".to_string(), toml::Value::Table(local));
			SignerConfig {
				primary: "local".to_string(),
				implementations,
			}
		});

		Config {
			domain: DomainConfig {
				chain_id: self.chain_id,
				..DomainConfig::default()
			},
			token: TokenConfig {
				lifetime_minutes: self.lifetime_minutes,
				gatekeeper_address: self.gatekeeper_address,
				gatekeeper_url: self.gatekeeper_url,
			},
			signer,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_defaults() {
		let config = ConfigBuilder::new().build();
		assert_eq!(config.domain.chain_id, 1);
		assert_eq!(config.domain.name, "Gateway Powo");
		let signer = config.signer.unwrap();
		assert!(signer.primary_config().is_some());
	}

	#[test]
	fn test_builder_without_signer() {
		let config = ConfigBuilder::new().chain_id(5).without_signer().build();
		assert_eq!(config.domain.chain_id, 5);
		assert!(config.signer.is_none());
	}
}
