// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! External HTML-to-text command.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RenderConfigLayer {
	/// Program and arguments; `{file}` is replaced by the page path.
	#[serde(default)]
	pub command: Option<Vec<String>>,
}

impl RenderConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.command.is_some() {
			self.command = other.command;
		}
	}

	pub fn finalize(self) -> RenderConfig {
		RenderConfig {
			command: self.command.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderConfig {
	pub command: Vec<String>,
}

impl RenderConfig {
	pub fn is_configured(&self) -> bool {
		self.command.first().is_some_and(|program| !program.trim().is_empty())
	}
}
