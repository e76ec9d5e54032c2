// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rendered pages and the rules for which ones are indexed.

use std::path::{Path, PathBuf};

use crate::book::Book;

const INDEX_PAGE: &str = "index";
const WIDGET_PAGE: &str = "sense_widget";
const HTML_EXTENSION: &str = "html";

/// One rendered HTML file of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
	/// Absolute (or build-root based) location on disk.
	pub path: PathBuf,
	/// File name without extension.
	pub name: String,
	/// File name including extension.
	pub file_name: String,
}

impl Page {
	/// Builds a page from a file path, or `None` for non-HTML files.
	pub fn from_path(path: &Path) -> Option<Self> {
		let extension = path.extension()?.to_str()?;
		if !extension.eq_ignore_ascii_case(HTML_EXTENSION) {
			return None;
		}

		Some(Self {
			path: path.to_path_buf(),
			name: path.file_stem()?.to_str()?.to_string(),
			file_name: path.file_name()?.to_str()?.to_string(),
		})
	}

	/// Whether this page contributes documents for `book`.
	pub fn is_indexed_in(&self, book: &Book) -> bool {
		match self.name.as_str() {
			WIDGET_PAGE => false,
			INDEX_PAGE => book.single,
			_ => true,
		}
	}
}
