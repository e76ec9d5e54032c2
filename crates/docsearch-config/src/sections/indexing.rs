// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rebuild tuning and policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const DEFAULT_BATCH_SIZE: usize = 500;
const DEFAULT_CONCURRENCY: usize = 8;

/// What happens to a generation whose population failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
	/// Leave it in the engine for inspection.
	#[default]
	Keep,
	Delete,
}

impl FromStr for OnFailure {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"keep" => Ok(OnFailure::Keep),
			"delete" => Ok(OnFailure::Delete),
			other => Err(format!("expected 'keep' or 'delete', got '{other}'")),
		}
	}
}

impl fmt::Display for OnFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OnFailure::Keep => write!(f, "keep"),
			OnFailure::Delete => write!(f, "delete"),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IndexingConfigLayer {
	#[serde(default)]
	pub batch_size: Option<usize>,
	#[serde(default)]
	pub concurrency: Option<usize>,
	#[serde(default)]
	pub on_failure: Option<OnFailure>,
	#[serde(default)]
	pub sweep_orphans: Option<bool>,
}

impl IndexingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.batch_size.is_some() {
			self.batch_size = other.batch_size;
		}
		if other.concurrency.is_some() {
			self.concurrency = other.concurrency;
		}
		if other.on_failure.is_some() {
			self.on_failure = other.on_failure;
		}
		if other.sweep_orphans.is_some() {
			self.sweep_orphans = other.sweep_orphans;
		}
	}

	pub fn finalize(self) -> IndexingConfig {
		IndexingConfig {
			batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
			concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
			on_failure: self.on_failure.unwrap_or_default(),
			sweep_orphans: self.sweep_orphans.unwrap_or(false),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexingConfig {
	/// Documents per bulk request.
	pub batch_size: usize,
	/// Pages rendered at once.
	pub concurrency: usize,
	pub on_failure: OnFailure,
	/// Delete leftover `<alias>_*` generations before building.
	pub sweep_orphans: bool,
}

impl Default for IndexingConfig {
	fn default() -> Self {
		IndexingConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = IndexingConfig::default();
		assert_eq!(config.batch_size, 500);
		assert_eq!(config.concurrency, 8);
		assert_eq!(config.on_failure, OnFailure::Keep);
		assert!(!config.sweep_orphans);
	}

	#[test]
	fn on_failure_parses_case_insensitively() {
		assert_eq!("Delete".parse::<OnFailure>(), Ok(OnFailure::Delete));
		assert_eq!(" keep ".parse::<OnFailure>(), Ok(OnFailure::Keep));
		assert!("purge".parse::<OnFailure>().is_err());
	}

	#[test]
	fn on_failure_from_toml() {
		let layer: IndexingConfigLayer = toml::from_str("on_failure = \"delete\"").unwrap();
		assert_eq!(layer.on_failure, Some(OnFailure::Delete));
	}
}
