// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filesystem locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_BUILD_DIR: &str = "./html";

/// `<data dir>/docsearch/state.json`, or `./.docsearch/state.json` when the
/// platform has no data directory.
pub fn default_state_file() -> PathBuf {
	dirs::data_dir()
		.map(|d| d.join("docsearch"))
		.unwrap_or_else(|| PathBuf::from(".docsearch"))
		.join("state.json")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathsConfigLayer {
	#[serde(default)]
	pub build: Option<PathBuf>,
	#[serde(default)]
	pub state_file: Option<PathBuf>,
}

impl PathsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.build.is_some() {
			self.build = other.build;
		}
		if other.state_file.is_some() {
			self.state_file = other.state_file;
		}
	}

	pub fn finalize(self) -> PathsConfig {
		PathsConfig {
			build: self.build.unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR)),
			state_file: self.state_file.unwrap_or_else(default_state_file),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathsConfig {
	/// Root of the rendered site; books live at `<build>/<prefix>/current`.
	pub build: PathBuf,
	/// Where the staleness gate records the last indexed marker.
	pub state_file: PathBuf,
}

impl Default for PathsConfig {
	fn default() -> Self {
		PathsConfigLayer::default().finalize()
	}
}
