// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Builds the search documents for one book.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::book::Book;
use crate::document::{document_for, IndexDocument, DEFAULT_BASE_PATH};
use crate::page::Page;
use crate::render::{RenderError, Renderer};
use crate::section::{segment, ParseError};

pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Error)]
pub enum BuildError {
	#[error("failed to list pages in {path}: {source}")]
	ListPages {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to render {path}: {source}")]
	Render {
		path: PathBuf,
		#[source]
		source: RenderError,
	},

	#[error("failed to segment {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: ParseError,
	},
}

impl BuildError {
	/// The file or directory the failure is about.
	pub fn path(&self) -> &Path {
		match self {
			BuildError::ListPages { path, .. }
			| BuildError::Render { path, .. }
			| BuildError::Parse { path, .. } => path,
		}
	}
}

/// Walks book directories and turns their pages into [`IndexDocument`]s.
///
/// Pages of a book are rendered concurrently, bounded by `concurrency`, and
/// their documents are returned in file-name order.
#[derive(Clone)]
pub struct DocumentBuilder {
	build_root: PathBuf,
	base_path: String,
	renderer: Arc<dyn Renderer>,
	concurrency: usize,
}

impl DocumentBuilder {
	pub fn new(build_root: impl Into<PathBuf>, renderer: Arc<dyn Renderer>) -> Self {
		Self {
			build_root: build_root.into(),
			base_path: DEFAULT_BASE_PATH.to_string(),
			renderer,
			concurrency: DEFAULT_CONCURRENCY,
		}
	}

	pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
		self.base_path = base_path.into();
		self
	}

	pub fn with_concurrency(mut self, concurrency: usize) -> Self {
		self.concurrency = concurrency.max(1);
		self
	}

	/// `<build root>/<prefix>/current`
	pub fn content_dir(&self, book: &Book) -> PathBuf {
		self.build_root.join(&book.prefix).join("current")
	}

	/// Lists the indexable pages of `book`, sorted by file name.
	pub async fn pages(&self, book: &Book) -> Result<Vec<Page>, BuildError> {
		let dir = self.content_dir(book);
		let list_err = |source| BuildError::ListPages {
			path: dir.clone(),
			source,
		};

		let mut entries = tokio::fs::read_dir(&dir).await.map_err(list_err)?;
		let mut pages = Vec::new();
		while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
			let file_type = entry.file_type().await.map_err(list_err)?;
			if !file_type.is_file() {
				continue;
			}
			if let Some(page) = Page::from_path(&entry.path()) {
				if page.is_indexed_in(book) {
					pages.push(page);
				}
			}
		}

		pages.sort_by(|a, b| a.file_name.cmp(&b.file_name));
		Ok(pages)
	}

	/// Builds every document of `book`. The first failing page aborts the book.
	#[instrument(skip(self, book), fields(book = %book.prefix))]
	pub async fn build_documents(&self, book: &Book) -> Result<Vec<IndexDocument>, BuildError> {
		let pages = self.pages(book).await?;
		debug!(pages = pages.len(), "building book");

		let per_page: Vec<Vec<IndexDocument>> = stream::iter(pages.iter())
			.map(|page| self.build_page(book, page))
			.buffered(self.concurrency)
			.try_collect()
			.await?;

		Ok(per_page.into_iter().flatten().collect())
	}

	async fn build_page(&self, book: &Book, page: &Page) -> Result<Vec<IndexDocument>, BuildError> {
		let text = self
			.renderer
			.render(&page.path)
			.await
			.map_err(|source| BuildError::Render {
				path: page.path.clone(),
				source,
			})?;

		let sections = segment(&text).map_err(|source| BuildError::Parse {
			path: page.path.clone(),
			source,
		})?;
		debug!(page = %page.file_name, sections = sections.len(), "segmented page");

		Ok(sections
			.into_iter()
			.map(|section| document_for(&self.base_path, book, page, section))
			.collect())
	}
}
