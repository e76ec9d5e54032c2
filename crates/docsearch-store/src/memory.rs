// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process document store.
//!
//! Used for `rebuild --dry-run` and as the test double for the rebuild
//! orchestrator. Alias updates are applied atomically, and individual
//! failures can be injected to exercise error paths.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use docsearch_core::{IndexDocument, IndexSchema};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::store::DocumentStore;
use crate::types::{AliasAction, BulkItemError, BulkResponse};

#[derive(Debug, Default)]
struct MemoryIndex {
	schema: Option<IndexSchema>,
	documents: BTreeMap<String, IndexDocument>,
}

#[derive(Debug, Default)]
struct Faults {
	rejected_books: BTreeSet<String>,
	fail_alias_updates: bool,
	fail_bulk_requests: bool,
	fail_delete_of: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct State {
	indices: BTreeMap<String, MemoryIndex>,
	aliases: BTreeMap<String, BTreeSet<String>>,
	faults: Faults,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
	state: Mutex<State>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Rejects every document of `book` with a 400 item error.
	pub async fn reject_book(&self, book: impl Into<String>) {
		self.state.lock().await.faults.rejected_books.insert(book.into());
	}

	/// Fails every bulk request outright, as if the engine were unreachable.
	pub async fn fail_bulk_requests(&self, fail: bool) {
		self.state.lock().await.faults.fail_bulk_requests = fail;
	}

	pub async fn fail_alias_updates(&self, fail: bool) {
		self.state.lock().await.faults.fail_alias_updates = fail;
	}

	pub async fn fail_delete_of(&self, index: impl Into<String>) {
		self.state.lock().await.faults.fail_delete_of.insert(index.into());
	}

	/// Creates `name` with an empty schema and points `alias` at it.
	pub async fn seed_alias(&self, alias: &str, name: &str) {
		let mut state = self.state.lock().await;
		state.indices.entry(name.to_string()).or_default();
		state
			.aliases
			.entry(alias.to_string())
			.or_default()
			.insert(name.to_string());
	}

	pub async fn index_names(&self) -> Vec<String> {
		self.state.lock().await.indices.keys().cloned().collect()
	}

	pub async fn has_index(&self, name: &str) -> bool {
		self.state.lock().await.indices.contains_key(name)
	}

	pub async fn documents(&self, index: &str) -> Vec<IndexDocument> {
		self.state
			.lock()
			.await
			.indices
			.get(index)
			.map(|i| i.documents.values().cloned().collect())
			.unwrap_or_default()
	}

	pub async fn schema_of(&self, index: &str) -> Option<IndexSchema> {
		self.state
			.lock()
			.await
			.indices
			.get(index)
			.and_then(|i| i.schema.clone())
	}

	/// All indices `alias` is bound to.
	pub async fn alias_bindings(&self, alias: &str) -> Vec<String> {
		self.state
			.lock()
			.await
			.aliases
			.get(alias)
			.map(|s| s.iter().cloned().collect())
			.unwrap_or_default()
	}
}

fn matches_pattern(pattern: &str, name: &str) -> bool {
	match pattern.strip_suffix('*') {
		Some(prefix) => name.starts_with(prefix),
		None => name == pattern,
	}
}

fn injected(operation: &str) -> StoreError {
	StoreError::Api {
		status: 500,
		message: format!("injected {operation} failure"),
	}
}

impl State {
	fn apply(&mut self, actions: &[AliasAction]) -> Result<(), StoreError> {
		let mut aliases = self.aliases.clone();
		for action in actions {
			match action {
				AliasAction::Add { alias, index } => {
					if !self.indices.contains_key(index) {
						return Err(StoreError::NotFound(index.clone()));
					}
					aliases.entry(alias.clone()).or_default().insert(index.clone());
				}
				AliasAction::Remove { alias, index } => {
					let removed = aliases
						.get_mut(alias)
						.map(|bound| bound.remove(index))
						.unwrap_or(false);
					if !removed {
						return Err(StoreError::NotFound(format!("{alias} -> {index}")));
					}
				}
			}
		}
		aliases.retain(|_, bound| !bound.is_empty());
		self.aliases = aliases;
		Ok(())
	}
}

#[async_trait]
impl DocumentStore for MemoryStore {
	async fn create_index(&self, name: &str, schema: &IndexSchema) -> Result<(), StoreError> {
		let mut state = self.state.lock().await;
		if state.indices.contains_key(name) || state.aliases.contains_key(name) {
			return Err(StoreError::Api {
				status: 400,
				message: format!("resource_already_exists_exception: {name}"),
			});
		}
		state.indices.insert(
			name.to_string(),
			MemoryIndex {
				schema: Some(schema.clone()),
				documents: BTreeMap::new(),
			},
		);
		debug!(index = %name, "memory index created");
		Ok(())
	}

	async fn delete_index(&self, name: &str, ignore_missing: bool) -> Result<(), StoreError> {
		let mut state = self.state.lock().await;
		if state.faults.fail_delete_of.contains(name) {
			return Err(injected("delete"));
		}
		if state.indices.remove(name).is_none() {
			return if ignore_missing {
				Ok(())
			} else {
				Err(StoreError::NotFound(name.to_string()))
			};
		}
		for bound in state.aliases.values_mut() {
			bound.remove(name);
		}
		state.aliases.retain(|_, bound| !bound.is_empty());
		Ok(())
	}

	async fn bulk_upsert(
		&self,
		index: &str,
		documents: &[IndexDocument],
	) -> Result<BulkResponse, StoreError> {
		let mut state = self.state.lock().await;
		if state.faults.fail_bulk_requests {
			return Err(injected("bulk"));
		}

		let State {
			indices, faults, ..
		} = &mut *state;
		let target = indices
			.get_mut(index)
			.ok_or_else(|| StoreError::NotFound(index.to_string()))?;

		let mut errors = Vec::new();
		for doc in documents {
			if faults.rejected_books.contains(&doc.book) {
				errors.push(BulkItemError {
					id: doc.id().to_string(),
					status: 400,
					reason: format!("book {} rejected", doc.book),
				});
				continue;
			}
			target.documents.insert(doc.id().to_string(), doc.clone());
		}

		Ok(BulkResponse {
			items: documents.len(),
			errors,
		})
	}

	async fn get_alias_target(
		&self,
		alias: &str,
		ignore_missing: bool,
	) -> Result<Option<String>, StoreError> {
		let state = self.state.lock().await;
		let Some(bound) = state.aliases.get(alias) else {
			return if ignore_missing {
				Ok(None)
			} else {
				Err(StoreError::NotFound(alias.to_string()))
			};
		};
		if bound.len() > 1 {
			return Err(StoreError::InvalidResponse(format!(
				"alias {alias} is bound to {} indices",
				bound.len()
			)));
		}
		Ok(bound.iter().next().cloned())
	}

	async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), StoreError> {
		let mut state = self.state.lock().await;
		if state.faults.fail_alias_updates {
			return Err(injected("alias update"));
		}
		state.apply(actions)
	}

	async fn list_indices(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
		let state = self.state.lock().await;
		Ok(state
			.indices
			.keys()
			.filter(|name| matches_pattern(pattern, name))
			.cloned()
			.collect())
	}
}
