// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Skips rebuilds when the content has not changed since the last one.
//!
//! The content marker (for example the source revision) is compared with the
//! marker recorded in a JSON state file after the last successful rebuild.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use docsearch_config::MarkerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum GateError {
	#[error("failed to run marker command {program}: {source}")]
	Spawn {
		program: String,
		#[source]
		source: std::io::Error,
	},

	#[error("marker command {program} exited with {status}: {stderr}")]
	CommandFailed {
		program: String,
		status: std::process::ExitStatus,
		stderr: String,
	},

	#[error("marker command is empty")]
	EmptyCommand,

	#[error("failed to read marker file {path}: {source}")]
	ReadMarker {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("content marker is empty")]
	EmptyMarker,

	#[error("failed to read state file {path}: {source}")]
	ReadState {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write state file {path}: {source}")]
	WriteState {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to encode state: {0}")]
	Encode(#[from] serde_json::Error),
}

/// What the last successful rebuild indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexState {
	pub marker: String,
	pub generation: String,
	pub recorded_at: DateTime<Utc>,
}

/// Result of comparing the current marker with the recorded one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staleness {
	pub current: String,
	pub recorded: Option<IndexState>,
	pub needs_rebuild: bool,
}

pub struct StalenessGate {
	marker: MarkerConfig,
	state_file: PathBuf,
}

impl StalenessGate {
	pub fn new(marker: MarkerConfig, state_file: impl Into<PathBuf>) -> Self {
		Self {
			marker,
			state_file: state_file.into(),
		}
	}

	pub fn state_file(&self) -> &Path {
		&self.state_file
	}

	/// True when `force` is set or the content marker differs from the
	/// recorded one.
	pub async fn needs_rebuild(&self, force: bool) -> Result<bool, GateError> {
		if force {
			return Ok(true);
		}
		Ok(self.check(false).await?.needs_rebuild)
	}

	/// Reads both markers and compares them.
	pub async fn check(&self, force: bool) -> Result<Staleness, GateError> {
		let current = self.current_marker().await?;
		let recorded = self.recorded().await?;
		let needs_rebuild = force || recorded.as_ref().map(|r| r.marker != current).unwrap_or(true);

		debug!(
			current = %current,
			recorded = recorded.as_ref().map(|r| r.marker.as_str()).unwrap_or("-"),
			force,
			needs_rebuild,
			"staleness check"
		);

		Ok(Staleness {
			current,
			recorded,
			needs_rebuild,
		})
	}

	/// The current content marker.
	pub async fn current_marker(&self) -> Result<String, GateError> {
		let raw = match &self.marker {
			MarkerConfig::File(path) => {
				tokio::fs::read_to_string(path)
					.await
					.map_err(|source| GateError::ReadMarker {
						path: path.clone(),
						source,
					})?
			}
			MarkerConfig::Command { argv, dir } => run_marker_command(argv, dir.as_deref()).await?,
		};

		let marker = raw.trim();
		if marker.is_empty() {
			return Err(GateError::EmptyMarker);
		}
		Ok(marker.to_string())
	}

	/// The state recorded after the last successful rebuild.
	///
	/// A missing state file means nothing was recorded. An unreadable one is
	/// treated the same, with a warning, so the next rebuild replaces it.
	pub async fn recorded(&self) -> Result<Option<IndexState>, GateError> {
		let contents = match tokio::fs::read_to_string(&self.state_file).await {
			Ok(contents) => contents,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!(path = %self.state_file.display(), "no recorded state");
				return Ok(None);
			}
			Err(source) => {
				return Err(GateError::ReadState {
					path: self.state_file.clone(),
					source,
				})
			}
		};

		match serde_json::from_str(&contents) {
			Ok(state) => Ok(Some(state)),
			Err(e) => {
				warn!(path = %self.state_file.display(), error = %e, "ignoring unreadable state file");
				Ok(None)
			}
		}
	}

	/// Records `marker` as indexed by `generation`. Call only after the alias
	/// points at `generation`.
	pub async fn record(&self, marker: &str, generation: &str) -> Result<IndexState, GateError> {
		let state = IndexState {
			marker: marker.to_string(),
			generation: generation.to_string(),
			recorded_at: Utc::now(),
		};
		let write_err = |source| GateError::WriteState {
			path: self.state_file.clone(),
			source,
		};

		if let Some(parent) = self.state_file.parent().filter(|p| !p.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
		}

		let json = serde_json::to_string_pretty(&state)?;
		let mut tmp_path = self.state_file.clone().into_os_string();
		tmp_path.push(".tmp");
		let tmp_path = PathBuf::from(tmp_path);

		tokio::fs::write(&tmp_path, &json).await.map_err(write_err)?;
		tokio::fs::rename(&tmp_path, &self.state_file)
			.await
			.map_err(write_err)?;

		info!(
			marker = %state.marker,
			generation = %state.generation,
			path = %self.state_file.display(),
			"recorded indexed marker"
		);
		Ok(state)
	}
}

async fn run_marker_command(argv: &[String], dir: Option<&Path>) -> Result<String, GateError> {
	let (program, args) = argv.split_first().ok_or(GateError::EmptyCommand)?;

	let mut command = tokio::process::Command::new(program);
	command.args(args);
	if let Some(dir) = dir {
		command.current_dir(dir);
	}

	let output = command.output().await.map_err(|source| GateError::Spawn {
		program: program.clone(),
		source,
	})?;
	if !output.status.success() {
		return Err(GateError::CommandFailed {
			program: program.clone(),
			status: output.status,
			stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
		});
	}
	Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn file_gate(dir: &TempDir, marker: &str) -> StalenessGate {
		let marker_path = dir.path().join("REVISION");
		std::fs::write(&marker_path, marker).unwrap();
		StalenessGate::new(
			MarkerConfig::File(marker_path),
			dir.path().join("state/state.json"),
		)
	}

	#[tokio::test]
	async fn first_run_needs_rebuild() {
		let dir = TempDir::new().unwrap();
		let gate = file_gate(&dir, "abc123\n");

		let staleness = gate.check(false).await.unwrap();
		assert_eq!(staleness.current, "abc123");
		assert_eq!(staleness.recorded, None);
		assert!(staleness.needs_rebuild);
	}

	#[tokio::test]
	async fn recorded_marker_short_circuits() {
		let dir = TempDir::new().unwrap();
		let gate = file_gate(&dir, "abc123");

		gate.record("abc123", "docs_20260101_000000_000").await.unwrap();
		assert!(!gate.needs_rebuild(false).await.unwrap());
		assert!(gate.needs_rebuild(true).await.unwrap());

		let recorded = gate.recorded().await.unwrap().unwrap();
		assert_eq!(recorded.generation, "docs_20260101_000000_000");
	}

	#[tokio::test]
	async fn changed_marker_needs_rebuild() {
		let dir = TempDir::new().unwrap();
		let gate = file_gate(&dir, "def456");
		gate.record("abc123", "docs_1").await.unwrap();

		assert!(gate.needs_rebuild(false).await.unwrap());
	}

	#[tokio::test]
	async fn force_skips_marker_lookup() {
		let dir = TempDir::new().unwrap();
		let gate = StalenessGate::new(
			MarkerConfig::File(dir.path().join("missing")),
			dir.path().join("state.json"),
		);

		assert!(gate.needs_rebuild(true).await.unwrap());
		assert!(matches!(
			gate.needs_rebuild(false).await,
			Err(GateError::ReadMarker { .. })
		));
	}

	#[tokio::test]
	async fn blank_marker_is_an_error() {
		let dir = TempDir::new().unwrap();
		let gate = file_gate(&dir, "  \n");
		assert!(matches!(
			gate.current_marker().await,
			Err(GateError::EmptyMarker)
		));
	}

	#[tokio::test]
	async fn corrupt_state_is_ignored() {
		let dir = TempDir::new().unwrap();
		let gate = file_gate(&dir, "abc123");
		std::fs::create_dir_all(dir.path().join("state")).unwrap();
		std::fs::write(gate.state_file(), "{ not json").unwrap();

		assert_eq!(gate.recorded().await.unwrap(), None);
		assert!(gate.needs_rebuild(false).await.unwrap());
	}

	#[tokio::test]
	async fn command_marker_uses_stdout() {
		let dir = TempDir::new().unwrap();
		let gate = StalenessGate::new(
			MarkerConfig::Command {
				argv: vec!["echo".to_string(), "rev-42".to_string()],
				dir: Some(dir.path().to_path_buf()),
			},
			dir.path().join("state.json"),
		);
		assert_eq!(gate.current_marker().await.unwrap(), "rev-42");
	}

	#[tokio::test]
	async fn failing_command_reports_status() {
		let dir = TempDir::new().unwrap();
		let gate = StalenessGate::new(
			MarkerConfig::Command {
				argv: vec!["false".to_string()],
				dir: None,
			},
			dir.path().join("state.json"),
		);
		assert!(matches!(
			gate.current_marker().await,
			Err(GateError::CommandFailed { .. })
		));
	}
}
