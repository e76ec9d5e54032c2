// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the docsearch reindexer.
//!
//! Configuration is layered from built-in defaults, a TOML file
//! (`./docsearch.toml` unless another path is given), and `DOCSEARCH_*`
//! environment variables, in increasing precedence.
//!
//! # Usage
//!
//! ```ignore
//! use docsearch_config::load_config;
//!
//! let config = load_config()?;
//! for book in &config.books {
//!     println!("{} -> {}", book.prefix, config.paths.build.display());
//! }
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::DocsearchConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;

use docsearch_core::{flatten, Book, BookEntry};
use tracing::{debug, info};

/// Config file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "docsearch.toml";

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct DocsearchConfig {
	pub store: StoreConfig,
	pub paths: PathsConfig,
	pub site: SiteConfig,
	pub indexing: IndexingConfig,
	pub render: RenderConfig,
	pub marker: MarkerConfig,
	pub logging: LoggingConfig,
	/// The configured content tree.
	pub contents: Vec<BookEntry>,
	/// `contents` flattened in document order.
	pub books: Vec<Book>,
}

impl DocsearchConfig {
	/// Checks what a rebuild needs beyond what every command needs.
	pub fn validate_for_rebuild(&self) -> Result<(), ConfigError> {
		if !self.render.is_configured() {
			return Err(ConfigError::Validation(
				"render.command is required to rebuild (set it in the config file or \
				 DOCSEARCH_RENDER_COMMAND)"
					.to_string(),
			));
		}
		if self.books.is_empty() {
			return Err(ConfigError::Validation(
				"contents defines no books to index".to_string(),
			));
		}
		Ok(())
	}
}

/// Load configuration with the default config file, which may be absent.
pub fn load_config() -> Result<DocsearchConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(DEFAULT_CONFIG_FILE)),
		Box::new(EnvSource),
	])
}

/// Load configuration with an explicit config file, which must exist.
pub fn load_config_with_file(
	config_path: impl Into<PathBuf>,
) -> Result<DocsearchConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::required(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<DocsearchConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = DocsearchConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Resolve defaults and validate.
pub fn finalize(layer: DocsearchConfigLayer) -> Result<DocsearchConfig, ConfigError> {
	let store = layer.store.unwrap_or_default().finalize();
	let paths = layer.paths.unwrap_or_default().finalize();
	let site = layer.site.unwrap_or_default().finalize();
	let indexing = layer.indexing.unwrap_or_default().finalize();
	let render = layer.render.unwrap_or_default().finalize();
	let marker = layer.marker.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let contents = layer.contents.unwrap_or_default();

	validate_config(&store, &indexing)?;
	let books = flatten(&contents)?;

	info!(
		store = %store.url,
		alias = %store.alias,
		build = %paths.build.display(),
		books = books.len(),
		batch_size = indexing.batch_size,
		concurrency = indexing.concurrency,
		on_failure = %indexing.on_failure,
		sweep_orphans = indexing.sweep_orphans,
		"configuration loaded"
	);

	Ok(DocsearchConfig {
		store,
		paths,
		site,
		indexing,
		render,
		marker,
		logging,
		contents,
		books,
	})
}

fn validate_config(store: &StoreConfig, indexing: &IndexingConfig) -> Result<(), ConfigError> {
	if indexing.batch_size == 0 {
		return Err(ConfigError::Validation(
			"indexing.batch_size must be at least 1".to_string(),
		));
	}
	if indexing.concurrency == 0 {
		return Err(ConfigError::Validation(
			"indexing.concurrency must be at least 1".to_string(),
		));
	}
	validate_alias(&store.alias)?;
	if store.max_attempts == 0 {
		return Err(ConfigError::Validation(
			"store.max_attempts must be at least 1".to_string(),
		));
	}
	Ok(())
}

const ALIAS_FORBIDDEN: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ':'];

/// Generations are named `<alias>_<timestamp>`, so the alias must be a valid
/// index name prefix.
fn validate_alias(alias: &str) -> Result<(), ConfigError> {
	let invalid = |reason: &str| -> Result<(), ConfigError> {
		Err(ConfigError::Validation(format!(
			"store.alias '{alias}' is not a valid index name: {reason}"
		)))
	};

	if alias.trim().is_empty() {
		return Err(ConfigError::Validation("store.alias must not be empty".to_string()));
	}
	if alias.chars().any(char::is_uppercase) {
		return invalid("it must be lowercase");
	}
	if alias.chars().any(char::is_whitespace) || alias.contains(ALIAS_FORBIDDEN) {
		return invalid("it contains a reserved character");
	}
	if alias.starts_with(['-', '_', '+']) || alias == "." || alias == ".." {
		return invalid("it must not start with '-', '_' or '+'");
	}
	Ok(())
}
