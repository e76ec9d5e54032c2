// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rebuilds the documentation search index.
//!
//! - [`Reindexer`]: builds a fresh generation and swaps the alias onto it
//! - [`StalenessGate`]: decides whether a rebuild is needed at all

pub mod error;
pub mod gate;
pub mod generation;
pub mod orchestrator;

pub use error::{AliasSwapError, CleanupWarning, IndexingError, RebuildError};
pub use gate::{GateError, IndexState, Staleness, StalenessGate};
pub use generation::{generation_name, generation_pattern, is_generation_of};
pub use orchestrator::{BookReport, RebuildReport, RebuildState, ReindexOptions, Reindexer};
