// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rebuild failures and warnings.

use std::fmt;

use docsearch_core::BuildError;
use docsearch_store::{BulkItemError, StoreError};
use thiserror::Error;

/// How many failed documents an error message names before summarizing.
const SHOWN_FAILURES: usize = 5;

/// One or more documents could not be written to the new generation.
#[derive(Debug, Error)]
pub struct IndexingError {
	pub generation: String,
	pub failures: Vec<BulkItemError>,
}

impl fmt::Display for IndexingError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} document(s) failed to index into {}",
			self.failures.len(),
			self.generation
		)?;
		for failure in self.failures.iter().take(SHOWN_FAILURES) {
			write!(f, "; {failure}")?;
		}
		if self.failures.len() > SHOWN_FAILURES {
			write!(f, "; and {} more", self.failures.len() - SHOWN_FAILURES)?;
		}
		Ok(())
	}
}

/// The atomic alias update failed. The new generation exists but is not live.
#[derive(Debug, Error)]
#[error("failed to point alias {alias} at {generation}: {source}")]
pub struct AliasSwapError {
	pub alias: String,
	pub generation: String,
	#[source]
	pub source: StoreError,
}

#[derive(Debug, Error)]
pub enum RebuildError {
	#[error(transparent)]
	Build(#[from] BuildError),

	#[error("failed to create index {generation}: {source}")]
	CreateIndex {
		generation: String,
		#[source]
		source: StoreError,
	},

	#[error(transparent)]
	Indexing(#[from] IndexingError),

	#[error("failed to read alias {alias}: {source}")]
	AliasLookup {
		alias: String,
		#[source]
		source: StoreError,
	},

	#[error(transparent)]
	AliasSwap(#[from] AliasSwapError),
}

/// A best-effort cleanup step that did not succeed. Never fails a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
	pub index: String,
	pub reason: String,
}

impl fmt::Display for CleanupWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "could not delete index {}: {}", self.index, self.reason)
	}
}
