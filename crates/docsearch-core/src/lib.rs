// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core of the docsearch reindexer.
//!
//! This crate turns statically generated documentation into search documents:
//! - [`section`]: splits one page's rendered text into titled sections
//! - [`book`]: the configured content tree and its flattening
//! - [`page`]: which rendered files are indexed
//! - [`builder`]: renders and segments every page of a book
//! - [`schema`]: analysis settings and mappings for new indices

pub mod book;
pub mod builder;
pub mod document;
pub mod page;
pub mod render;
pub mod schema;
pub mod section;

pub use book::{flatten, Book, BookEntry, BookTreeError};
pub use builder::{BuildError, DocumentBuilder};
pub use document::{IndexDocument, DEFAULT_BASE_PATH};
pub use page::Page;
pub use render::{CommandRenderer, RenderError, Renderer};
pub use schema::{schema, IndexSchema};
pub use section::{segment, ParseError, Section};
