// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request and response types shared by store implementations.

use serde::{Deserialize, Serialize};

/// One step of an atomic alias update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasAction {
	Add { alias: String, index: String },
	Remove { alias: String, index: String },
}

impl AliasAction {
	pub fn add(alias: impl Into<String>, index: impl Into<String>) -> Self {
		AliasAction::Add {
			alias: alias.into(),
			index: index.into(),
		}
	}

	pub fn remove(alias: impl Into<String>, index: impl Into<String>) -> Self {
		AliasAction::Remove {
			alias: alias.into(),
			index: index.into(),
		}
	}
}

/// A document the engine refused during a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemError {
	pub id: String,
	pub status: u16,
	pub reason: String,
}

impl std::fmt::Display for BulkItemError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} ({}): {}", self.id, self.status, self.reason)
	}
}

/// Outcome of a bulk upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkResponse {
	pub items: usize,
	pub errors: Vec<BulkItemError>,
}

impl BulkResponse {
	pub fn is_clean(&self) -> bool {
		self.errors.is_empty()
	}
}
