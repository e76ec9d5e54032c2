// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a partial `*ConfigLayer` for merging and a
//! resolved `*Config`.

mod indexing;
mod logging;
mod marker;
mod paths;
mod render;
mod site;
mod store;

pub use indexing::{IndexingConfig, IndexingConfigLayer, OnFailure};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use marker::{MarkerConfig, MarkerConfigLayer, DEFAULT_MARKER_COMMAND};
pub use paths::{PathsConfig, PathsConfigLayer};
pub use render::{RenderConfig, RenderConfigLayer};
pub use site::{normalize_base_path, SiteConfig, SiteConfigLayer};
pub use store::{StoreConfig, StoreConfigLayer};
