// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Public site layout.

use docsearch_core::DEFAULT_BASE_PATH;
use serde::{Deserialize, Serialize};

/// Ensures `path` starts and ends with `/`.
pub fn normalize_base_path(path: &str) -> String {
	let trimmed = path.trim().trim_matches('/');
	if trimmed.is_empty() {
		"/".to_string()
	} else {
		format!("/{trimmed}/")
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SiteConfigLayer {
	#[serde(default)]
	pub base_path: Option<String>,
}

impl SiteConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.base_path.is_some() {
			self.base_path = other.base_path;
		}
	}

	pub fn finalize(self) -> SiteConfig {
		SiteConfig {
			base_path: self
				.base_path
				.map(|p| normalize_base_path(&p))
				.unwrap_or_else(|| DEFAULT_BASE_PATH.to_string()),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
	/// URL prefix every page url starts with, e.g. `/guide/`.
	pub base_path: String,
}

impl Default for SiteConfig {
	fn default() -> Self {
		SiteConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_base_path() {
		assert_eq!(SiteConfig::default().base_path, "/guide/");
	}

	#[test]
	fn base_path_is_normalized() {
		assert_eq!(normalize_base_path("guide"), "/guide/");
		assert_eq!(normalize_base_path("/docs"), "/docs/");
		assert_eq!(normalize_base_path("en/guide/"), "/en/guide/");
		assert_eq!(normalize_base_path("/"), "/");
		assert_eq!(normalize_base_path(""), "/");
	}
}
