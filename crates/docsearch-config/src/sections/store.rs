// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Search engine connection section.

use docsearch_common_config::SecretString;
use serde::{Deserialize, Serialize};

const DEFAULT_URL: &str = "http://localhost:9200";
const DEFAULT_ALIAS: &str = "docs";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub password: Option<SecretString>,
	#[serde(default)]
	pub alias: Option<String>,
	#[serde(default)]
	pub doc_type: Option<String>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
	#[serde(default)]
	pub max_attempts: Option<u32>,
}

impl StoreConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.alias.is_some() {
			self.alias = other.alias;
		}
		if other.doc_type.is_some() {
			self.doc_type = other.doc_type;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
		if other.max_attempts.is_some() {
			self.max_attempts = other.max_attempts;
		}
	}

	pub fn finalize(self) -> StoreConfig {
		StoreConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
			username: self.username,
			password: self.password,
			alias: self.alias.unwrap_or_else(|| DEFAULT_ALIAS.to_string()),
			doc_type: self.doc_type,
			request_timeout_secs: self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
			max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
		}
	}
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
	pub url: String,
	pub username: Option<String>,
	pub password: Option<SecretString>,
	/// The stable name readers query; generations are named `<alias>_<timestamp>`.
	pub alias: String,
	pub doc_type: Option<String>,
	pub request_timeout_secs: u64,
	pub max_attempts: u32,
}

impl Default for StoreConfig {
	fn default() -> Self {
		StoreConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use docsearch_common_config::Secret;

	#[test]
	fn defaults() {
		let config = StoreConfig::default();
		assert_eq!(config.url, "http://localhost:9200");
		assert_eq!(config.alias, "docs");
		assert_eq!(config.request_timeout_secs, 60);
		assert_eq!(config.max_attempts, 3);
		assert!(config.username.is_none());
	}

	#[test]
	fn merge_keeps_unset_fields() {
		let mut base = StoreConfigLayer {
			url: Some("http://es:9200".to_string()),
			username: Some("elastic".to_string()),
			..Default::default()
		};
		base.merge(StoreConfigLayer {
			password: Some(Secret::new("changeme".to_string())),
			alias: Some("guide".to_string()),
			..Default::default()
		});

		let config = base.finalize();
		assert_eq!(config.url, "http://es:9200");
		assert_eq!(config.alias, "guide");
		assert_eq!(
			config.password.as_ref().map(|p| p.expose().as_str()),
			Some("changeme")
		);
	}

	#[test]
	fn password_is_redacted_in_debug() {
		let config = StoreConfigLayer {
			password: Some(Secret::new("hunter2".to_string())),
			..Default::default()
		}
		.finalize();
		assert!(!format!("{config:?}").contains("hunter2"));
	}
}
