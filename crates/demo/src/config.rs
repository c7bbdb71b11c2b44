use std::path::Path;

use anyhow::Context;
use partial_presence::PresenceOptions;
use serde::Deserialize;

/// Contents of the optional `--config` TOML file.
///
/// ```toml
/// log = "partial=trace,info"
///
/// [presence]
/// unknown-keys = "reject"
/// ```
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
	/// Default tracing filter, used when `RUST_LOG` is unset.
	pub log: Option<String>,
	pub presence: PresenceOptions,
}

impl DemoConfig {
	pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(text)
	}

	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let text = std::fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
		Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
	}
}
