// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The partial configuration each source produces.

use docsearch_core::BookEntry;
use serde::Deserialize;

use crate::sections::{
	IndexingConfigLayer, LoggingConfigLayer, MarkerConfigLayer, PathsConfigLayer,
	RenderConfigLayer, SiteConfigLayer, StoreConfigLayer,
};

/// One source's view of the configuration. Unset fields are `None` and do
/// not override lower-precedence sources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocsearchConfigLayer {
	#[serde(default)]
	pub store: Option<StoreConfigLayer>,
	#[serde(default)]
	pub paths: Option<PathsConfigLayer>,
	#[serde(default)]
	pub site: Option<SiteConfigLayer>,
	#[serde(default)]
	pub indexing: Option<IndexingConfigLayer>,
	#[serde(default)]
	pub render: Option<RenderConfigLayer>,
	#[serde(default)]
	pub marker: Option<MarkerConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	/// The book tree. Replaced wholesale, never merged entry by entry.
	#[serde(default)]
	pub contents: Option<Vec<BookEntry>>,
}

fn merge_section<T>(target: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T))
where
	T: Default,
{
	if let Some(other) = other {
		merge(target.get_or_insert_with(Default::default), other);
	}
}

impl DocsearchConfigLayer {
	pub fn merge(&mut self, other: DocsearchConfigLayer) {
		merge_section(&mut self.store, other.store, StoreConfigLayer::merge);
		merge_section(&mut self.paths, other.paths, PathsConfigLayer::merge);
		merge_section(&mut self.site, other.site, SiteConfigLayer::merge);
		merge_section(&mut self.indexing, other.indexing, IndexingConfigLayer::merge);
		merge_section(&mut self.render, other.render, RenderConfigLayer::merge);
		merge_section(&mut self.marker, other.marker, MarkerConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		if other.contents.is_some() {
			self.contents = other.contents;
		}
	}
}
