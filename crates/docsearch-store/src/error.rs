// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for document store operations.

use docsearch_common_http::{is_retryable_status, RetryableError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
	/// Network-level error during HTTP communication.
	#[error("network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("request timed out")]
	Timeout,

	/// The engine answered with a non-success status.
	#[error("search engine error: {status} - {message}")]
	Api { status: u16, message: String },

	#[error("not found: {0}")]
	NotFound(String),

	#[error("invalid response from search engine: {0}")]
	InvalidResponse(String),
}

impl RetryableError for StoreError {
	fn is_retryable(&self) -> bool {
		match self {
			StoreError::Network(e) => e.is_retryable(),
			StoreError::Timeout => true,
			StoreError::Api { status, .. } => is_retryable_status(*status),
			StoreError::NotFound(_) => false,
			StoreError::InvalidResponse(_) => false,
		}
	}
}
