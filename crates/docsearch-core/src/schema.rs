// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Analysis settings and field mappings attached to every new index.
//!
//! Four analyzers share the `shape` filter, which captures lowercase runs,
//! camel-case words, upper-case runs and digit runs as separate tokens:
//!
//! - `content`: stemmed full text; each token is repeated, one copy stemmed,
//!   and identical tokens at the same position collapsed
//! - `shingles`: word pairs and triples, no single words
//! - `ngrams`: front edge n-grams (1..=20) of non-stopword tokens
//! - `ngrams_search`: query side of `ngrams`, lowercasing only

use serde::Serialize;
use serde_json::{json, Value};

pub const CONTENT_ANALYZER: &str = "content";
pub const SHINGLES_ANALYZER: &str = "shingles";
pub const NGRAMS_ANALYZER: &str = "ngrams";
pub const NGRAMS_SEARCH_ANALYZER: &str = "ngrams_search";

pub const MIN_NGRAM: u32 = 1;
pub const MAX_NGRAM: u32 = 20;

/// Fields analysed with the three retrieval strategies.
pub const TEXT_FIELDS: [&str; 2] = ["title", "text"];
/// Fields matched exactly.
pub const KEYWORD_FIELDS: [&str; 2] = ["book", "path"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSchema {
	pub settings: Value,
	pub mappings: Value,
}

/// Returns the settings and mappings for a new generation.
pub fn schema() -> IndexSchema {
	IndexSchema {
		settings: settings(),
		mappings: mappings(),
	}
}

fn settings() -> Value {
	json!({
		"analysis": {
			"filter": {
				"shape": {
					"type": "pattern_capture",
					"preserve_original": true,
					"patterns": [
						"(\\p{Ll}+|\\p{Lu}\\p{Ll}+|\\p{Lu}+)",
						"(\\d+)"
					]
				},
				"english_stemmer": {
					"type": "stemmer",
					"language": "english"
				},
				"unique_stem": {
					"type": "unique",
					"only_on_same_position": true
				},
				"shingle_only": {
					"type": "shingle",
					"min_shingle_size": 2,
					"max_shingle_size": 3,
					"output_unigrams": false
				},
				"front_ngrams": {
					"type": "edge_ngram",
					"min_gram": MIN_NGRAM,
					"max_gram": MAX_NGRAM
				}
			},
			"analyzer": {
				CONTENT_ANALYZER: {
					"type": "custom",
					"tokenizer": "standard",
					"filter": ["shape", "lowercase", "keyword_repeat", "english_stemmer", "unique_stem"]
				},
				SHINGLES_ANALYZER: {
					"type": "custom",
					"tokenizer": "standard",
					"filter": ["shape", "lowercase", "shingle_only"]
				},
				NGRAMS_ANALYZER: {
					"type": "custom",
					"tokenizer": "standard",
					"filter": ["shape", "lowercase", "stop", "front_ngrams"]
				},
				NGRAMS_SEARCH_ANALYZER: {
					"type": "custom",
					"tokenizer": "standard",
					"filter": ["shape", "lowercase"]
				}
			}
		}
	})
}

fn analysed_text() -> Value {
	json!({
		"type": "text",
		"analyzer": CONTENT_ANALYZER,
		"fields": {
			SHINGLES_ANALYZER: {
				"type": "text",
				"analyzer": SHINGLES_ANALYZER
			},
			NGRAMS_ANALYZER: {
				"type": "text",
				"analyzer": NGRAMS_ANALYZER,
				"search_analyzer": NGRAMS_SEARCH_ANALYZER
			}
		}
	})
}

fn mappings() -> Value {
	let mut properties = serde_json::Map::new();
	for field in KEYWORD_FIELDS {
		properties.insert(field.to_string(), json!({ "type": "keyword" }));
	}
	for field in TEXT_FIELDS {
		properties.insert(field.to_string(), analysed_text());
	}
	properties.insert(
		"url".to_string(),
		json!({ "type": "keyword", "index": false }),
	);

	json!({ "properties": properties })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn analyzer_filters(schema: &IndexSchema, name: &str) -> Vec<String> {
		schema.settings["analysis"]["analyzer"][name]["filter"]
			.as_array()
			.unwrap()
			.iter()
			.map(|f| f.as_str().unwrap().to_string())
			.collect()
	}

	#[test]
	fn every_analyzer_starts_with_shape_then_lowercase() {
		let schema = schema();
		for name in [
			CONTENT_ANALYZER,
			SHINGLES_ANALYZER,
			NGRAMS_ANALYZER,
			NGRAMS_SEARCH_ANALYZER,
		] {
			let filters = analyzer_filters(&schema, name);
			assert_eq!(&filters[..2], ["shape", "lowercase"], "analyzer {name}");
		}
	}

	#[test]
	fn content_analyzer_stems_a_repeated_stream() {
		let filters = analyzer_filters(&schema(), CONTENT_ANALYZER);
		assert_eq!(
			&filters[2..],
			["keyword_repeat", "english_stemmer", "unique_stem"]
		);
		let unique = &schema().settings["analysis"]["filter"]["unique_stem"];
		assert_eq!(unique["only_on_same_position"], true);
	}

	#[test]
	fn shingles_drop_unigrams() {
		let shingle = &schema().settings["analysis"]["filter"]["shingle_only"];
		assert_eq!(shingle["output_unigrams"], false);
	}

	#[test]
	fn ngram_search_side_does_not_expand() {
		let schema = schema();
		let index_side = analyzer_filters(&schema, NGRAMS_ANALYZER);
		let search_side = analyzer_filters(&schema, NGRAMS_SEARCH_ANALYZER);
		assert!(index_side.contains(&"front_ngrams".to_string()));
		assert!(index_side.contains(&"stop".to_string()));
		assert!(!search_side.contains(&"front_ngrams".to_string()));

		let ngrams = &schema.settings["analysis"]["filter"]["front_ngrams"];
		assert_eq!(ngrams["min_gram"], 1);
		assert_eq!(ngrams["max_gram"], 20);
	}

	#[test]
	fn text_fields_have_three_strategies() {
		let schema = schema();
		for field in TEXT_FIELDS {
			let mapping = &schema.mappings["properties"][field];
			assert_eq!(mapping["analyzer"], CONTENT_ANALYZER);
			assert_eq!(mapping["fields"]["shingles"]["analyzer"], SHINGLES_ANALYZER);
			assert_eq!(mapping["fields"]["ngrams"]["analyzer"], NGRAMS_ANALYZER);
			assert_eq!(
				mapping["fields"]["ngrams"]["search_analyzer"],
				NGRAMS_SEARCH_ANALYZER
			);
		}
	}

	#[test]
	fn exact_match_fields_are_keywords() {
		let schema = schema();
		for field in KEYWORD_FIELDS {
			assert_eq!(schema.mappings["properties"][field]["type"], "keyword");
		}
	}

	#[test]
	fn schema_is_pure() {
		assert_eq!(schema(), schema());
	}
}
