// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file, and environment variables.

use std::path::PathBuf;

use docsearch_common_config::load_secret_env;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::DocsearchConfigLayer;
use crate::sections::{
	IndexingConfigLayer, LoggingConfigLayer, MarkerConfigLayer, OnFailure, PathsConfigLayer,
	RenderConfigLayer, SiteConfigLayer, StoreConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<DocsearchConfigLayer, ConfigError>;
}

/// Built-in defaults. Every default is applied at finalize time, so this
/// layer is empty.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<DocsearchConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(DocsearchConfigLayer::default())
	}
}

pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file that is skipped when absent.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// A file that must exist.
	pub fn required(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<DocsearchConfigLayer, ConfigError> {
		if !self.required && !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(DocsearchConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: DocsearchConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `DOCSEARCH_<FIELD>`. The book tree is TOML only.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<DocsearchConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(DocsearchConfigLayer {
			store: Some(load_store_from_env()?),
			paths: Some(load_paths_from_env()),
			site: Some(SiteConfigLayer {
				base_path: env_var("DOCSEARCH_BASE_PATH"),
			}),
			indexing: Some(load_indexing_from_env()?),
			render: Some(RenderConfigLayer {
				command: env_argv("DOCSEARCH_RENDER_COMMAND"),
			}),
			marker: Some(MarkerConfigLayer {
				file: env_var("DOCSEARCH_MARKER_FILE").map(PathBuf::from),
				command: env_argv("DOCSEARCH_MARKER_COMMAND"),
				dir: None,
			}),
			logging: Some(LoggingConfigLayer {
				level: env_var("DOCSEARCH_LOG_LEVEL"),
			}),
			contents: None,
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

/// A whitespace-separated command line.
fn env_argv(name: &str) -> Option<Vec<String>> {
	env_var(name)
		.map(|v| v.split_whitespace().map(str::to_string).collect::<Vec<_>>())
		.filter(|argv| !argv.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid {kind} value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_store_from_env() -> Result<StoreConfigLayer, ConfigError> {
	Ok(StoreConfigLayer {
		url: env_var("DOCSEARCH_STORE_URL"),
		username: env_var("DOCSEARCH_STORE_USERNAME"),
		password: load_secret_env("DOCSEARCH_STORE_PASSWORD")
			.map_err(|e| ConfigError::Secret(e.to_string()))?,
		alias: env_var("DOCSEARCH_ALIAS"),
		doc_type: env_var("DOCSEARCH_DOC_TYPE"),
		request_timeout_secs: env_parse("DOCSEARCH_STORE_TIMEOUT_SECS", "u64")?,
		max_attempts: env_parse("DOCSEARCH_STORE_MAX_ATTEMPTS", "u32")?,
	})
}

fn load_paths_from_env() -> PathsConfigLayer {
	PathsConfigLayer {
		build: env_var("DOCSEARCH_BUILD_DIR").map(PathBuf::from),
		state_file: env_var("DOCSEARCH_STATE_FILE").map(PathBuf::from),
	}
}

fn load_indexing_from_env() -> Result<IndexingConfigLayer, ConfigError> {
	let on_failure = match env_var("DOCSEARCH_ON_FAILURE") {
		Some(v) => Some(v.parse::<OnFailure>().map_err(|message| ConfigError::InvalidValue {
			key: "DOCSEARCH_ON_FAILURE".to_string(),
			message,
		})?),
		None => None,
	};

	Ok(IndexingConfigLayer {
		batch_size: env_parse("DOCSEARCH_BATCH_SIZE", "usize")?,
		concurrency: env_parse("DOCSEARCH_CONCURRENCY", "usize")?,
		on_failure,
		sweep_orphans: env_bool("DOCSEARCH_SWEEP_ORPHANS"),
	})
}
