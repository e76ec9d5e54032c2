// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Search engine access for docsearch.
//!
//! [`DocumentStore`] is the seam the rebuild orchestrator talks to.
//! [`ElasticStore`] speaks the Elasticsearch REST API; [`MemoryStore`]
//! keeps everything in process.

pub mod elastic;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use elastic::{Credentials, ElasticStore, DEFAULT_BASE_URL};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::DocumentStore;
pub use types::{AliasAction, BulkItemError, BulkResponse};
