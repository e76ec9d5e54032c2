// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The search engine operations a rebuild depends on.

use async_trait::async_trait;
use docsearch_core::{IndexDocument, IndexSchema};

use crate::error::StoreError;
use crate::types::{AliasAction, BulkResponse};

/// A search engine document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Creates `name` with the given analysis settings and mappings.
	async fn create_index(&self, name: &str, schema: &IndexSchema) -> Result<(), StoreError>;

	/// Deletes `name`. A missing index is only an error if `ignore_missing` is false.
	async fn delete_index(&self, name: &str, ignore_missing: bool) -> Result<(), StoreError>;

	/// Inserts or replaces `documents` in `index`, keyed by document url.
	///
	/// Item-level rejections are reported in the response, not as `Err`.
	async fn bulk_upsert(
		&self,
		index: &str,
		documents: &[IndexDocument],
	) -> Result<BulkResponse, StoreError>;

	/// Returns the index `alias` points at, if any.
	async fn get_alias_target(
		&self,
		alias: &str,
		ignore_missing: bool,
	) -> Result<Option<String>, StoreError>;

	/// Applies all `actions` as one atomic update.
	async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), StoreError>;

	/// Lists index names matching `pattern` (a literal name or `prefix*`), sorted.
	async fn list_indices(&self, pattern: &str) -> Result<Vec<String>, StoreError>;
}
