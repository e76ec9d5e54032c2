// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Where the content-version marker comes from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MARKER_COMMAND: [&str; 3] = ["git", "rev-parse", "HEAD"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarkerConfigLayer {
	#[serde(default)]
	pub file: Option<PathBuf>,
	#[serde(default)]
	pub command: Option<Vec<String>>,
	/// Working directory for `command`.
	#[serde(default)]
	pub dir: Option<PathBuf>,
}

impl MarkerConfigLayer {
	/// A layer that names a marker source replaces the source of the layers
	/// below it, so a higher-precedence command displaces a lower file.
	pub fn merge(&mut self, other: Self) {
		if other.file.is_some() || other.command.is_some() {
			self.file = other.file;
			self.command = other.command;
		}
		if other.dir.is_some() {
			self.dir = other.dir;
		}
	}

	/// Within one layer a configured file wins over a command.
	pub fn finalize(self) -> MarkerConfig {
		match self.file {
			Some(path) => MarkerConfig::File(path),
			None => MarkerConfig::Command {
				argv: self.command.unwrap_or_else(|| {
					DEFAULT_MARKER_COMMAND.iter().map(|s| s.to_string()).collect()
				}),
				dir: self.dir,
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerConfig {
	/// The trimmed contents of a file.
	File(PathBuf),
	/// The trimmed stdout of a command.
	Command {
		argv: Vec<String>,
		dir: Option<PathBuf>,
	},
}

impl Default for MarkerConfig {
	fn default() -> Self {
		MarkerConfigLayer::default().finalize()
	}
}
