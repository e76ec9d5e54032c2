// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};

/// Creates a new HTTP client builder with the standard docsearch User-Agent header.
///
/// Use this when you need to customize the client (e.g., set timeout or TLS options).
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Returns the standard docsearch User-Agent string.
///
/// Format: `docsearch/{version} ({os}-{arch})`
pub fn user_agent() -> String {
	format!(
		"docsearch/{} ({}-{})",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}
