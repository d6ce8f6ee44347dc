//! Resolution settings
//!
//! Settings can be built in code, parsed from TOML or JSON, or read from the
//! environment:
//!
//! ```toml
//! ambiguity = "reject"
//! interface_fallback = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable selecting the [`AmbiguityPolicy`].
pub const AMBIGUITY_ENV: &str = "TAGWIRE_AMBIGUITY";
/// Environment variable toggling the interface-satisfaction fallback.
pub const INTERFACE_FALLBACK_ENV: &str = "TAGWIRE_INTERFACE_FALLBACK";

/// What the resolver does when several registered types satisfy an
/// interface query at the same qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
	/// Pick the type registered first in the scope.
	#[default]
	FirstRegistered,
	/// Report [`DiError::AmbiguousMatch`](crate::DiError::AmbiguousMatch).
	Reject,
}

impl std::str::FromStr for AmbiguityPolicy {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"first_registered" | "first-registered" | "first" => Ok(Self::FirstRegistered),
			"reject" | "error" => Ok(Self::Reject),
			other => Err(SettingsError::InvalidValue(format!(
				"{AMBIGUITY_ENV}: unknown ambiguity policy `{other}`"
			))),
		}
	}
}

/// Registry resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
	pub ambiguity: AmbiguityPolicy,
	/// Scan concrete entries for interface queries that miss exactly.
	pub interface_fallback: bool,
}

impl Default for RegistrySettings {
	fn default() -> Self {
		Self {
			ambiguity: AmbiguityPolicy::FirstRegistered,
			interface_fallback: true,
		}
	}
}

impl RegistrySettings {
	pub fn with_ambiguity(mut self, ambiguity: AmbiguityPolicy) -> Self {
		self.ambiguity = ambiguity;
		self
	}

	pub fn with_interface_fallback(mut self, enabled: bool) -> Self {
		self.interface_fallback = enabled;
		self
	}

	/// Parse settings from a TOML document. Missing keys keep their defaults.
	///
	/// # Examples
	///
	/// ```
	/// use tagwire_di::{AmbiguityPolicy, RegistrySettings};
	///
	/// let settings = RegistrySettings::from_toml_str(r#"ambiguity = "reject""#).unwrap();
	/// assert_eq!(settings.ambiguity, AmbiguityPolicy::Reject);
	/// assert!(settings.interface_fallback);
	/// ```
	pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
		toml::from_str(contents)
			.map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))
	}

	/// Load settings from a `.toml` or `.json` file.
	pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			SettingsError::FileError(format!("Failed to read {}: {}", path.display(), e))
		})?;

		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml_str(&contents),
			Some("json") => serde_json::from_str(&contents)
				.map_err(|e| SettingsError::ParseError(format!("JSON parse error: {}", e))),
			_ => Err(SettingsError::UnsupportedFormat(
				"Supported formats: .toml, .json".to_string(),
			)),
		}
	}

	/// Defaults overridden by `TAGWIRE_AMBIGUITY` and `TAGWIRE_INTERFACE_FALLBACK`.
	pub fn from_env() -> Result<Self, SettingsError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Like [`from_env`](Self::from_env), reading variables through `lookup`.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
		let mut settings = Self::default();

		if let Some(policy) = lookup(AMBIGUITY_ENV) {
			settings.ambiguity = policy.parse()?;
		}

		if let Some(flag) = lookup(INTERFACE_FALLBACK_ENV) {
			settings.interface_fallback = parse_flag(&flag).ok_or_else(|| {
				SettingsError::InvalidValue(format!(
					"{INTERFACE_FALLBACK_ENV}: expected a boolean, got `{flag}`"
				))
			})?;
		}

		Ok(settings)
	}
}

fn parse_flag(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

/// Settings error
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("File error: {0}")]
	FileError(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),

	#[error("Invalid value: {0}")]
	InvalidValue(String),
}
