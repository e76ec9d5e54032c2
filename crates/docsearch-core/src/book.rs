// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The configured documentation tree.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Containers deeper than this are rejected.
pub const MAX_TREE_DEPTH: usize = 32;

/// A single documentation book rooted at `<build>/<prefix>/current`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
	pub title: String,
	pub prefix: String,
	pub abbr: String,
	/// The book is one page, so its `index.html` is indexed.
	#[serde(default)]
	pub single: bool,
}

/// A node of the content tree: either a book or a group of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookEntry {
	Container {
		#[serde(default)]
		title: Option<String>,
		sections: Vec<BookEntry>,
	},
	Leaf(Book),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookTreeError {
	#[error("content tree nests deeper than {max} levels")]
	TooDeep { max: usize },

	#[error("duplicate book prefix: {0}")]
	DuplicatePrefix(String),

	#[error("book '{title}' has an empty prefix")]
	EmptyPrefix { title: String },
}

/// Flattens the content tree into books in document order.
pub fn flatten(entries: &[BookEntry]) -> Result<Vec<Book>, BookTreeError> {
	let mut books = Vec::new();
	let mut seen = HashSet::new();
	collect(entries, 0, &mut books, &mut seen)?;
	Ok(books)
}

fn collect(
	entries: &[BookEntry],
	depth: usize,
	books: &mut Vec<Book>,
	seen: &mut HashSet<String>,
) -> Result<(), BookTreeError> {
	if depth > MAX_TREE_DEPTH {
		return Err(BookTreeError::TooDeep {
			max: MAX_TREE_DEPTH,
		});
	}

	for entry in entries {
		match entry {
			BookEntry::Container { sections, .. } => collect(sections, depth + 1, books, seen)?,
			BookEntry::Leaf(book) => {
				if book.prefix.trim().is_empty() {
					return Err(BookTreeError::EmptyPrefix {
						title: book.title.clone(),
					});
				}
				if !seen.insert(book.prefix.clone()) {
					return Err(BookTreeError::DuplicatePrefix(book.prefix.clone()));
				}
				books.push(book.clone());
			}
		}
	}

	Ok(())
}
