// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Documents written to the search engine.

use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::page::Page;
use crate::section::{Section, TITLE_SEPARATOR};

/// Default URL prefix under which books are published.
pub const DEFAULT_BASE_PATH: &str = "/guide/";

/// One search document. Its engine `_id` is its `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
	pub book: String,
	pub title: String,
	pub text: String,
	pub url: String,
	pub path: String,
}

impl IndexDocument {
	pub fn id(&self) -> &str {
		&self.url
	}
}

/// `<base_path><prefix>/current/<page name>`
pub fn page_url(base_path: &str, book: &Book, page: &Page) -> String {
	format!("{base_path}{}/current/{}", book.prefix, page.name)
}

/// Builds the document for one section of `page`.
pub fn document_for(base_path: &str, book: &Book, page: &Page, section: Section) -> IndexDocument {
	let url = format!("{}{}", page_url(base_path, book, page), section.anchor);
	IndexDocument {
		book: book.prefix.clone(),
		title: format!("{}{TITLE_SEPARATOR}{}", section.title, book.abbr),
		text: section.body,
		url,
		path: format!("current/{}", page.file_name),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::Path;

	fn reference() -> Book {
		Book {
			title: "Reference".to_string(),
			prefix: "ref".to_string(),
			abbr: "R".to_string(),
			single: false,
		}
	}

	#[test]
	fn root_section_url_has_no_fragment() {
		let page = Page::from_path(Path::new("/build/ref/current/guide.html")).unwrap();
		let doc = document_for(
			DEFAULT_BASE_PATH,
			&reference(),
			&page,
			Section {
				anchor: String::new(),
				title: "Getting Started".to_string(),
				body: "Welcome text.".to_string(),
			},
		);

		assert_eq!(doc.id(), "/guide/ref/current/guide");
		assert_eq!(doc.title, "Getting Started » R");
		assert_eq!(doc.book, "ref");
		assert_eq!(doc.path, "current/guide.html");
		assert_eq!(doc.text, "Welcome text.");
	}

	#[test]
	fn child_section_url_carries_anchor() {
		let page = Page::from_path(Path::new("/build/ref/current/guide.html")).unwrap();
		let doc = document_for(
			"/docs/",
			&reference(),
			&page,
			Section {
				anchor: "#s1".to_string(),
				title: "Install » Getting Started".to_string(),
				body: "Run the installer.".to_string(),
			},
		);

		assert_eq!(doc.url, "/docs/ref/current/guide#s1");
		assert_eq!(doc.title, "Install » Getting Started » R");
	}

	#[test]
	fn serializes_engine_fields_only() {
		let doc = IndexDocument {
			book: "ref".to_string(),
			title: "T » R".to_string(),
			text: "body".to_string(),
			url: "/guide/ref/current/t".to_string(),
			path: "current/t.html".to_string(),
		};
		let json = serde_json::to_value(&doc).unwrap();
		let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
		keys.sort();
		assert_eq!(keys, vec!["book", "path", "text", "title", "url"]);
	}
}
