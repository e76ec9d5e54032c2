// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Rebuilds the documentation search index and swaps it in atomically.
#[derive(Parser, Debug)]
#[command(name = "docsearch", about = "Documentation search reindexer", version)]
pub struct Args {
	/// Config file (default: ./docsearch.toml when present)
	#[arg(long, global = true, env = "DOCSEARCH_CONFIG")]
	pub config: Option<PathBuf>,

	/// Log filter used when RUST_LOG is unset (overrides logging.level)
	#[arg(long, global = true)]
	pub log_level: Option<String>,

	/// Emit logs as JSON lines
	#[arg(long, global = true)]
	pub json_logs: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
	/// Rebuild the index if the content changed since the last rebuild
	Rebuild {
		/// Rebuild even if the content marker is unchanged
		#[arg(long)]
		force: bool,

		/// Log per-book and per-batch progress
		#[arg(long, short)]
		verbose: bool,

		/// Build every document against an in-memory store without touching the engine
		#[arg(long)]
		dry_run: bool,
	},

	/// Show the live generation and the recorded content marker
	Status,

	/// Show version information
	Version,
}
