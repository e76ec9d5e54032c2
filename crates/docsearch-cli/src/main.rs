// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `docsearch` binary.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

mod args;
mod commands;
mod logging;
mod version;

use args::{Args, Command};
use commands::RebuildFlags;

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return ExitCode::SUCCESS;
	}

	match run(args).await {
		Ok(code) => code,
		Err(e) => {
			tracing::error!(error = %format!("{e:#}"), "docsearch failed");
			eprintln!("error: {e:#}");
			ExitCode::FAILURE
		}
	}
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
	let config = match &args.config {
		Some(path) => docsearch_config::load_config_with_file(path),
		None => docsearch_config::load_config(),
	}
	.context("failed to load configuration")?;

	let verbose = matches!(args.command, Command::Rebuild { verbose: true, .. });
	let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
	logging::init(level, verbose, args.json_logs);

	tracing::info!(
		alias = %config.store.alias,
		store = %config.store.url,
		books = config.books.len(),
		"starting docsearch"
	);

	match args.command {
		Command::Rebuild { force, dry_run, .. } => {
			commands::rebuild(&config, RebuildFlags { force, dry_run }).await
		}
		Command::Status => commands::status(&config).await,
		Command::Version => Ok(ExitCode::SUCCESS),
	}
}
