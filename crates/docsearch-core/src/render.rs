// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The HTML-to-marked-text render step.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::trace;

/// Placeholder replaced by the page path in [`CommandRenderer`] arguments.
pub const FILE_PLACEHOLDER: &str = "{file}";

#[derive(Debug, Error)]
pub enum RenderError {
	#[error("failed to start renderer '{program}': {source}")]
	Spawn {
		program: String,
		#[source]
		source: std::io::Error,
	},

	#[error("renderer rejected {path} ({status}): {stderr}")]
	Failed {
		path: PathBuf,
		status: String,
		stderr: String,
	},

	#[error("renderer output for {path} is not UTF-8")]
	InvalidUtf8 { path: PathBuf },

	#[error("render command is empty")]
	EmptyCommand,
}

/// Turns one rendered HTML file into marked plain text.
#[async_trait]
pub trait Renderer: Send + Sync {
	async fn render(&self, path: &Path) -> Result<String, RenderError>;
}

/// Runs an external program per page and captures its stdout.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
	program: String,
	args: Vec<String>,
}

impl CommandRenderer {
	/// `argv[0]` is the program. Any argument equal to `{file}` is replaced by
	/// the page path; without one the path is appended.
	pub fn new(argv: &[String]) -> Result<Self, RenderError> {
		let (program, args) = argv.split_first().ok_or(RenderError::EmptyCommand)?;
		if program.trim().is_empty() {
			return Err(RenderError::EmptyCommand);
		}

		Ok(Self {
			program: program.clone(),
			args: args.to_vec(),
		})
	}

	fn args_for(&self, path: &Path) -> Vec<String> {
		let file = path.to_string_lossy().into_owned();
		if self.args.iter().any(|a| a == FILE_PLACEHOLDER) {
			self.args
				.iter()
				.map(|a| if a == FILE_PLACEHOLDER { file.clone() } else { a.clone() })
				.collect()
		} else {
			let mut args = self.args.clone();
			args.push(file);
			args
		}
	}
}

#[async_trait]
impl Renderer for CommandRenderer {
	async fn render(&self, path: &Path) -> Result<String, RenderError> {
		let args = self.args_for(path);
		trace!(program = %self.program, ?args, "rendering page");

		let output = Command::new(&self.program)
			.args(&args)
			.stdin(Stdio::null())
			.output()
			.await
			.map_err(|source| RenderError::Spawn {
				program: self.program.clone(),
				source,
			})?;

		if !output.status.success() {
			return Err(RenderError::Failed {
				path: path.to_path_buf(),
				status: output.status.to_string(),
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
			});
		}

		String::from_utf8(output.stdout).map_err(|_| RenderError::InvalidUtf8 {
			path: path.to_path_buf(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn argv(parts: &[&str]) -> Vec<String> {
		parts.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn empty_command_is_rejected() {
		assert!(matches!(CommandRenderer::new(&[]), Err(RenderError::EmptyCommand)));
		assert!(matches!(
			CommandRenderer::new(&argv(&[" "])),
			Err(RenderError::EmptyCommand)
		));
	}

	#[test]
	fn placeholder_is_substituted() {
		let renderer = CommandRenderer::new(&argv(&["html2marked", "--in", "{file}", "--utf8"])).unwrap();
		assert_eq!(
			renderer.args_for(Path::new("/b/ref/current/a.html")),
			argv(&["--in", "/b/ref/current/a.html", "--utf8"])
		);
	}

	#[test]
	fn path_is_appended_without_placeholder() {
		let renderer = CommandRenderer::new(&argv(&["html2marked", "--utf8"])).unwrap();
		assert_eq!(
			renderer.args_for(Path::new("a.html")),
			argv(&["--utf8", "a.html"])
		);
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn captures_stdout_of_successful_command() {
		let dir = tempfile::tempdir().unwrap();
		let page = dir.path().join("page.html");
		std::fs::write(&page, "====\nTitle\nBody\n").unwrap();

		let renderer = CommandRenderer::new(&argv(&["cat"])).unwrap();
		let text = renderer.render(&page).await.unwrap();
		assert_eq!(text, "====\nTitle\nBody\n");
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn non_zero_exit_is_a_render_error() {
		let renderer = CommandRenderer::new(&argv(&["cat"])).unwrap();
		let err = renderer
			.render(Path::new("/definitely/not/here.html"))
			.await
			.unwrap_err();
		assert!(matches!(err, RenderError::Failed { .. }));
	}

	#[tokio::test]
	async fn missing_program_is_a_spawn_error() {
		let renderer = CommandRenderer::new(&argv(&["docsearch-no-such-renderer"])).unwrap();
		let err = renderer.render(Path::new("a.html")).await.unwrap_err();
		assert!(matches!(err, RenderError::Spawn { .. }));
	}
}
