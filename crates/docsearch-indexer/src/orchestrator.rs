// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Full rebuild with atomic alias cutover.
//!
//! A rebuild writes every book into a fresh generation and only then points
//! the alias at it, in one alias update that also unbinds the previous
//! generation. The live generation is never written to, so readers of the
//! alias are unaffected by a rebuild in progress or a failed one.
//!
//! ```text
//! CREATING -> POPULATING -> FAILED
//!                        -> READY -> SWAPPING -> DONE
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use docsearch_config::{DocsearchConfig, OnFailure};
use docsearch_core::{schema, Book, DocumentBuilder, IndexDocument};
use docsearch_store::{AliasAction, BulkItemError, DocumentStore, StoreError};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{AliasSwapError, CleanupWarning, IndexingError, RebuildError};
use crate::generation::{generation_name, generation_pattern, is_generation_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildState {
	Creating,
	Populating,
	Failed,
	Ready,
	Swapping,
	Done,
}

impl fmt::Display for RebuildState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			RebuildState::Creating => "CREATING",
			RebuildState::Populating => "POPULATING",
			RebuildState::Failed => "FAILED",
			RebuildState::Ready => "READY",
			RebuildState::Swapping => "SWAPPING",
			RebuildState::Done => "DONE",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone)]
pub struct ReindexOptions {
	pub alias: String,
	/// Documents per bulk request.
	pub batch_size: usize,
	pub on_failure: OnFailure,
	pub sweep_orphans: bool,
}

impl ReindexOptions {
	pub fn from_config(config: &DocsearchConfig) -> Self {
		Self {
			alias: config.store.alias.clone(),
			batch_size: config.indexing.batch_size,
			on_failure: config.indexing.on_failure,
			sweep_orphans: config.indexing.sweep_orphans,
		}
	}
}

impl Default for ReindexOptions {
	fn default() -> Self {
		Self {
			alias: "docs".to_string(),
			batch_size: 500,
			on_failure: OnFailure::Keep,
			sweep_orphans: false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookReport {
	pub prefix: String,
	pub documents: usize,
}

/// What a successful rebuild did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
	/// The generation the alias now points at.
	pub generation: String,
	/// The generation the alias pointed at before, if any.
	pub previous: Option<String>,
	pub books: Vec<BookReport>,
	pub documents: usize,
	/// Leftover generations deleted before building.
	pub swept: Vec<String>,
	pub warnings: Vec<CleanupWarning>,
}

pub struct Reindexer {
	store: Arc<dyn DocumentStore>,
	builder: DocumentBuilder,
	options: ReindexOptions,
}

impl Reindexer {
	pub fn new(store: Arc<dyn DocumentStore>, builder: DocumentBuilder, options: ReindexOptions) -> Self {
		Self {
			store,
			builder,
			options: ReindexOptions {
				batch_size: options.batch_size.max(1),
				..options
			},
		}
	}

	/// Rebuilds the index from `books` and publishes it under the alias.
	#[instrument(skip(self, books), fields(alias = %self.options.alias, books = books.len()))]
	pub async fn rebuild(&self, books: &[Book]) -> Result<RebuildReport, RebuildError> {
		let mut warnings = Vec::new();
		let swept = if self.options.sweep_orphans {
			self.sweep_orphans(&mut warnings).await
		} else {
			Vec::new()
		};

		let generation = generation_name(&self.options.alias, Utc::now());
		self.transition(&generation, RebuildState::Creating);
		if let Err(e) = self.create_generation(&generation).await {
			return Err(self.fail(&generation, e).await);
		}

		self.transition(&generation, RebuildState::Populating);
		let (book_reports, failures) = match self.populate(&generation, books).await {
			Ok(populated) => populated,
			Err(e) => return Err(self.fail(&generation, e.into()).await),
		};
		if !failures.is_empty() {
			let err = IndexingError {
				generation: generation.clone(),
				failures,
			};
			return Err(self.fail(&generation, err.into()).await);
		}
		let documents = book_reports.iter().map(|b| b.documents).sum();
		self.transition(&generation, RebuildState::Ready);

		let previous = match self.store.get_alias_target(&self.options.alias, true).await {
			Ok(previous) => previous,
			Err(source) => {
				let err = RebuildError::AliasLookup {
					alias: self.options.alias.clone(),
					source,
				};
				return Err(self.fail(&generation, err).await);
			}
		};

		self.transition(&generation, RebuildState::Swapping);
		let mut actions = vec![AliasAction::add(&self.options.alias, &generation)];
		if let Some(previous) = &previous {
			actions.push(AliasAction::remove(&self.options.alias, previous));
		}
		if let Err(source) = self.store.update_aliases(&actions).await {
			let err = AliasSwapError {
				alias: self.options.alias.clone(),
				generation: generation.clone(),
				source,
			};
			return Err(self.fail(&generation, err.into()).await);
		}

		if let Some(previous) = &previous {
			if let Err(e) = self.store.delete_index(previous, false).await {
				let warning = CleanupWarning {
					index: previous.clone(),
					reason: e.to_string(),
				};
				warn!(%warning, "previous generation left behind");
				warnings.push(warning);
			}
		}

		self.transition(&generation, RebuildState::Done);
		info!(
			generation = %generation,
			previous = previous.as_deref().unwrap_or("-"),
			documents,
			warnings = warnings.len(),
			"alias {} now points at {}",
			self.options.alias,
			generation
		);

		Ok(RebuildReport {
			generation,
			previous,
			books: book_reports,
			documents,
			swept,
			warnings,
		})
	}

	fn transition(&self, generation: &str, state: RebuildState) {
		if state == RebuildState::Failed {
			error!(generation = %generation, state = %state, "rebuild state");
		} else {
			info!(generation = %generation, state = %state, "rebuild state");
		}
	}

	async fn create_generation(&self, generation: &str) -> Result<(), RebuildError> {
		let create_err = |source| RebuildError::CreateIndex {
			generation: generation.to_string(),
			source,
		};

		self.store
			.delete_index(generation, true)
			.await
			.map_err(create_err)?;
		self.store
			.create_index(generation, &schema())
			.await
			.map_err(create_err)
	}

	/// Writes every book into `generation`, collecting item failures across
	/// all books. A book that fails to build stops the rebuild.
	async fn populate(
		&self,
		generation: &str,
		books: &[Book],
	) -> Result<(Vec<BookReport>, Vec<BulkItemError>), docsearch_core::BuildError> {
		let mut reports = Vec::with_capacity(books.len());
		let mut failures = Vec::new();

		for book in books {
			let documents = self.builder.build_documents(book).await?;
			info!(book = %book.prefix, documents = documents.len(), "indexing book");

			for batch in documents.chunks(self.options.batch_size) {
				let rejected = self.upsert_batch(generation, batch).await;
				debug!(
					book = %book.prefix,
					documents = batch.len(),
					rejected = rejected.len(),
					"batch written"
				);
				failures.extend(rejected);
			}

			reports.push(BookReport {
				prefix: book.prefix.clone(),
				documents: documents.len(),
			});
		}

		Ok((reports, failures))
	}

	/// Returns the documents of `batch` the store did not accept.
	async fn upsert_batch(&self, generation: &str, batch: &[IndexDocument]) -> Vec<BulkItemError> {
		match self.store.bulk_upsert(generation, batch).await {
			Ok(response) => response.errors,
			Err(e) => {
				error!(error = %e, documents = batch.len(), "bulk request failed");
				let status = match &e {
					StoreError::Api { status, .. } => *status,
					_ => 0,
				};
				batch
					.iter()
					.map(|doc| BulkItemError {
						id: doc.id().to_string(),
						status,
						reason: e.to_string(),
					})
					.collect()
			}
		}
	}

	/// Marks the rebuild failed and applies the failure policy to the
	/// unpublished generation.
	async fn fail(&self, generation: &str, err: RebuildError) -> RebuildError {
		self.transition(generation, RebuildState::Failed);
		error!(error = %err, "rebuild failed, alias unchanged");

		match self.options.on_failure {
			OnFailure::Keep => {
				info!(generation = %generation, "failed generation kept for inspection");
			}
			OnFailure::Delete => {
				if let Err(e) = self.store.delete_index(generation, true).await {
					warn!(generation = %generation, error = %e, "could not delete failed generation");
				}
			}
		}
		err
	}

	/// Deletes generations of the alias that the alias does not point at.
	///
	/// Nothing is deleted when the alias target cannot be determined.
	async fn sweep_orphans(&self, warnings: &mut Vec<CleanupWarning>) -> Vec<String> {
		let alias = &self.options.alias;
		let live = match self.store.get_alias_target(alias, true).await {
			Ok(live) => live,
			Err(e) => {
				warn!(error = %e, "cannot read alias, skipping orphan sweep");
				return Vec::new();
			}
		};
		let candidates = match self.store.list_indices(&generation_pattern(alias)).await {
			Ok(names) => names,
			Err(e) => {
				warn!(error = %e, "cannot list generations, skipping orphan sweep");
				return Vec::new();
			}
		};

		let mut swept = Vec::new();
		for index in candidates {
			if live.as_deref() == Some(index.as_str()) || !is_generation_of(alias, &index) {
				continue;
			}
			match self.store.delete_index(&index, true).await {
				Ok(()) => {
					info!(index = %index, "deleted orphaned generation");
					swept.push(index);
				}
				Err(e) => {
					let warning = CleanupWarning {
						index,
						reason: e.to_string(),
					};
					warn!(%warning, "orphaned generation left behind");
					warnings.push(warning);
				}
			}
		}
		swept
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn states_display_in_upper_case() {
		let states = [
			RebuildState::Creating,
			RebuildState::Populating,
			RebuildState::Failed,
			RebuildState::Ready,
			RebuildState::Swapping,
			RebuildState::Done,
		];
		let names: Vec<String> = states.iter().map(|s| s.to_string()).collect();
		assert_eq!(
			names,
			vec!["CREATING", "POPULATING", "FAILED", "READY", "SWAPPING", "DONE"]
		);
	}

	#[test]
	fn options_follow_config() {
		let mut config = docsearch_config::finalize(Default::default()).unwrap();
		config.store.alias = "guide".to_string();
		config.indexing.batch_size = 25;
		config.indexing.on_failure = OnFailure::Delete;

		let options = ReindexOptions::from_config(&config);
		assert_eq!(options.alias, "guide");
		assert_eq!(options.batch_size, 25);
		assert_eq!(options.on_failure, OnFailure::Delete);
		assert!(!options.sweep_orphans);
	}
}
