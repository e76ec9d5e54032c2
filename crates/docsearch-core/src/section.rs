// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Section segmentation of rendered page text.
//!
//! The render step emits plain text in which lines made of four or more `=`
//! characters (optionally indented) separate chunks. The first non-blank line
//! of a chunk is its header; the rest is its body. A header that starts with
//! `#token` carries an anchor.
//!
//! Segmentation runs in two stages so each rule can be tested on its own:
//! [`tokenize`] turns text into [`SectionRecord`]s and [`assemble`] folds the
//! records into [`Section`]s.

use thiserror::Error;

/// Separator placed between a section heading and the page title.
pub const TITLE_SEPARATOR: &str = " » ";

const MIN_MARKER_LEN: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
	#[error("page text contains no title header")]
	MissingTitle,
	#[error("anchor {0} is used by more than one section")]
	DuplicateAnchor(String),
}

/// One header/body chunk as produced by the render step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
	pub anchor: Option<String>,
	pub heading: String,
	pub body: String,
}

/// An independently indexable slice of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
	/// Empty for the root section, otherwise `#fragment`.
	pub anchor: String,
	pub title: String,
	pub body: String,
}

/// Returns true for a section boundary line.
pub fn is_marker(line: &str) -> bool {
	let trimmed = line.trim();
	trimmed.len() >= MIN_MARKER_LEN && trimmed.bytes().all(|b| b == b'=')
}

/// Splits a header line into its optional anchor and heading text.
///
/// `#install Installing` yields `(Some("#install"), "Installing")`. A lone
/// `#` or `# text` has no anchor and the whole line is the heading.
pub fn parse_header(line: &str) -> (Option<String>, String) {
	let line = line.trim();
	let Some(rest) = line.strip_prefix('#') else {
		return (None, line.to_string());
	};

	match rest.chars().next() {
		Some(c) if !c.is_whitespace() => {
			let end = line.find(char::is_whitespace).unwrap_or(line.len());
			let (anchor, heading) = line.split_at(end);
			(Some(anchor.to_string()), heading.trim().to_string())
		}
		_ => (None, line.to_string()),
	}
}

/// Splits rendered text into header/body records.
///
/// The chunk before the first marker is dropped when blank, and chunks that
/// have no header line (consecutive markers) are skipped.
pub fn tokenize(raw: &str) -> Vec<SectionRecord> {
	let mut chunks: Vec<Vec<&str>> = vec![Vec::new()];
	for line in raw.lines() {
		if is_marker(line) {
			chunks.push(Vec::new());
		} else if let Some(current) = chunks.last_mut() {
			current.push(line);
		}
	}

	chunks
		.into_iter()
		.filter_map(|lines| record_from_chunk(&lines))
		.collect()
}

fn record_from_chunk(lines: &[&str]) -> Option<SectionRecord> {
	let header_at = lines.iter().position(|l| !l.trim().is_empty())?;
	let (anchor, heading) = parse_header(lines[header_at]);
	let body = lines[header_at + 1..].join("\n").trim().to_string();

	Some(SectionRecord {
		anchor,
		heading,
		body,
	})
}

/// Folds records into sections.
///
/// The first record establishes the page title and the root section. Later
/// records without an anchor extend the root body; records with an anchor
/// become their own section titled `<heading> » <page title>`. The root anchor
/// is always empty, and an anchor may label only one section since it becomes
/// part of the document id.
pub fn assemble(records: Vec<SectionRecord>) -> Result<Vec<Section>, ParseError> {
	let mut records = records.into_iter();
	let first = records.next().ok_or(ParseError::MissingTitle)?;

	let page_title = first.heading;
	let mut sections = vec![Section {
		anchor: first.anchor.unwrap_or_default(),
		title: page_title.clone(),
		body: first.body,
	}];

	for record in records {
		match record.anchor {
			Some(anchor) if sections[1..].iter().any(|s| s.anchor == anchor) => {
				return Err(ParseError::DuplicateAnchor(anchor));
			}
			Some(anchor) => sections.push(Section {
				anchor,
				title: format!("{}{TITLE_SEPARATOR}{page_title}", record.heading),
				body: record.body,
			}),
			None => append_paragraph(&mut sections[0].body, &record.body),
		}
	}

	sections[0].anchor.clear();
	Ok(sections)
}

/// Segments one page's rendered text.
pub fn segment(raw: &str) -> Result<Vec<Section>, ParseError> {
	assemble(tokenize(raw))
}

fn append_paragraph(body: &mut String, extra: &str) {
	if extra.is_empty() {
		return;
	}
	if !body.is_empty() {
		body.push_str("\n\n");
	}
	body.push_str(extra);
}
