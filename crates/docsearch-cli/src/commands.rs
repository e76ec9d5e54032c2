// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use docsearch_common_http::RetryConfig;
use docsearch_config::{DocsearchConfig, StoreConfig};
use docsearch_core::{CommandRenderer, DocumentBuilder};
use docsearch_indexer::{RebuildReport, ReindexOptions, Reindexer, StalenessGate};
use docsearch_store::{Credentials, DocumentStore, ElasticStore, MemoryStore};
use tracing::{info, warn};

pub struct RebuildFlags {
	pub force: bool,
	pub dry_run: bool,
}

fn elastic_store(config: &StoreConfig) -> Result<ElasticStore> {
	let mut store =
		ElasticStore::with_timeout(&config.url, Duration::from_secs(config.request_timeout_secs))
			.context("failed to build search engine client")?
			.with_retry_config(RetryConfig::default().with_max_attempts(config.max_attempts));

	if let Some(username) = &config.username {
		store = store.with_credentials(Credentials {
			username: username.clone(),
			password: config.password.clone(),
		});
	}
	if let Some(doc_type) = &config.doc_type {
		store = store.with_doc_type(doc_type);
	}
	Ok(store)
}

fn gate(config: &DocsearchConfig) -> StalenessGate {
	StalenessGate::new(config.marker.clone(), config.paths.state_file.clone())
}

pub async fn rebuild(config: &DocsearchConfig, flags: RebuildFlags) -> Result<ExitCode> {
	config.validate_for_rebuild()?;
	let gate = gate(config);

	let marker = if flags.dry_run {
		None
	} else {
		match gate.check(flags.force).await {
			Ok(staleness) if !staleness.needs_rebuild => {
				info!(marker = %staleness.current, "index already up to date");
				println!("already up to date ({})", staleness.current);
				return Ok(ExitCode::SUCCESS);
			}
			Ok(staleness) => Some(staleness.current),
			Err(e) if flags.force => {
				warn!(error = %e, "cannot read content marker, rebuilding without recording it");
				None
			}
			Err(e) => return Err(e).context("staleness check failed"),
		}
	};

	let renderer = CommandRenderer::new(&config.render.command).context("invalid render.command")?;
	let builder = DocumentBuilder::new(&config.paths.build, Arc::new(renderer))
		.with_base_path(config.site.base_path.clone())
		.with_concurrency(config.indexing.concurrency);

	let store: Arc<dyn DocumentStore> = if flags.dry_run {
		info!("dry run, documents go to an in-memory store");
		Arc::new(MemoryStore::new())
	} else {
		Arc::new(elastic_store(&config.store)?)
	};

	let reindexer = Reindexer::new(store, builder, ReindexOptions::from_config(config));
	let report = reindexer
		.rebuild(&config.books)
		.await
		.context("rebuild failed")?;

	if let Some(marker) = marker {
		gate.record(&marker, &report.generation)
			.await
			.context("rebuild succeeded but the content marker was not recorded")?;
	}

	print_report(&report, flags.dry_run);
	Ok(ExitCode::SUCCESS)
}

fn print_report(report: &RebuildReport, dry_run: bool) {
	for book in &report.books {
		println!("{:<24} {:>8} documents", book.prefix, book.documents);
	}
	if dry_run {
		println!(
			"dry run: {} documents built, nothing published",
			report.documents
		);
		return;
	}

	println!(
		"published {} ({} documents)",
		report.generation, report.documents
	);
	if let Some(previous) = &report.previous {
		println!("retired {previous}");
	}
	for index in &report.swept {
		println!("swept orphaned generation {index}");
	}
	for warning in &report.warnings {
		println!("warning: {warning}");
	}
}

pub async fn status(config: &DocsearchConfig) -> Result<ExitCode> {
	let store = elastic_store(&config.store)?;
	let gate = gate(config);

	let live = store
		.get_alias_target(&config.store.alias, true)
		.await
		.with_context(|| format!("failed to read alias {}", config.store.alias))?;
	println!(
		"alias:      {} -> {}",
		config.store.alias,
		live.as_deref().unwrap_or("(unbound)")
	);

	match gate.recorded().await? {
		Some(state) => {
			println!("recorded:   {} ({})", state.marker, state.generation);
			println!("indexed at: {}", state.recorded_at.to_rfc3339());
			if live.as_deref() != Some(state.generation.as_str()) {
				println!("note:       recorded generation is not the live one");
			}
		}
		None => println!("recorded:   (none)"),
	}

	match gate.current_marker().await {
		Ok(marker) => println!("current:    {marker}"),
		Err(e) => println!("current:    unavailable ({e})"),
	}
	Ok(ExitCode::SUCCESS)
}
