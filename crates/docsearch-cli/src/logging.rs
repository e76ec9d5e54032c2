// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Matches every `docsearch_*` target, since targets match by prefix.
const VERBOSE_DIRECTIVE: &str = "docsearch=debug";

/// The filter used when `RUST_LOG` is unset. Verbose raises docsearch's own
/// crates to `debug`.
pub fn filter_directive(level: &str, verbose: bool) -> String {
	if verbose {
		format!("{level},{VERBOSE_DIRECTIVE}")
	} else {
		level.to_string()
	}
}

pub fn init(level: &str, verbose: bool, json: bool) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(filter_directive(level, verbose)));

	let registry = tracing_subscriber::registry().with(filter);
	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}
