// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use docsearch_config::OnFailure;
use docsearch_core::{Book, DocumentBuilder, RenderError, Renderer};
use docsearch_indexer::{is_generation_of, RebuildError, ReindexOptions, Reindexer};
use docsearch_store::{DocumentStore, MemoryStore};
use tempfile::TempDir;

const OLD: &str = "docs_20200101_000000_000";
const ORPHAN: &str = "docs_20200102_000000_000";

/// Treats the page file itself as already-rendered text.
struct FileText;

#[async_trait]
impl Renderer for FileText {
	async fn render(&self, path: &Path) -> Result<String, RenderError> {
		tokio::fs::read_to_string(path)
			.await
			.map_err(|source| RenderError::Spawn {
				program: "read".to_string(),
				source,
			})
	}
}

fn book(prefix: &str, abbr: &str) -> Book {
	Book {
		title: prefix.to_uppercase(),
		prefix: prefix.to_string(),
		abbr: abbr.to_string(),
		single: false,
	}
}

fn write_page(root: &Path, prefix: &str, file: &str, text: &str) {
	let dir = root.join(prefix).join("current");
	std::fs::create_dir_all(&dir).unwrap();
	std::fs::write(dir.join(file), text).unwrap();
}

struct Fixture {
	_build: TempDir,
	store: Arc<MemoryStore>,
	books: Vec<Book>,
	builder: DocumentBuilder,
}

impl Fixture {
	fn new() -> Self {
		let build = TempDir::new().unwrap();
		write_page(
			build.path(),
			"ref",
			"guide.html",
			"#intro Getting Started\nWelcome text.\n====\n#s1 Install\nRun the installer.\n====\n#s2 Config\nEdit the file.",
		);
		write_page(build.path(), "ref", "index.html", "Index\nskipped");
		write_page(build.path(), "java", "client.html", "Java Client\nConnect.\n====\n#auth Auth\nUse a token.");

		let builder = DocumentBuilder::new(build.path(), Arc::new(FileText));
		Self {
			_build: build,
			store: Arc::new(MemoryStore::new()),
			books: vec![book("ref", "R"), book("java", "Java")],
			builder,
		}
	}

	fn reindexer(&self, options: ReindexOptions) -> Reindexer {
		Reindexer::new(self.store.clone(), self.builder.clone(), options)
	}

	fn default_reindexer(&self) -> Reindexer {
		self.reindexer(ReindexOptions::default())
	}

	async fn seed_live(&self) {
		self.store.seed_alias("docs", OLD).await;
	}
}

#[tokio::test]
async fn first_rebuild_binds_alias_to_new_generation() {
	let fx = Fixture::new();

	let report = fx.default_reindexer().rebuild(&fx.books).await.unwrap();

	assert!(is_generation_of("docs", &report.generation));
	assert_eq!(report.previous, None);
	assert_eq!(report.documents, 5);
	assert_eq!(report.books[0].prefix, "ref");
	assert_eq!(report.books[0].documents, 3);
	assert_eq!(report.books[1].documents, 2);
	assert!(report.warnings.is_empty());

	assert_eq!(
		fx.store.get_alias_target("docs", false).await.unwrap(),
		Some(report.generation.clone())
	);
	assert_eq!(fx.store.schema_of(&report.generation).await, Some(docsearch_core::schema()));
}

#[tokio::test]
async fn documents_carry_section_titles_and_urls() {
	let fx = Fixture::new();
	let report = fx.default_reindexer().rebuild(&fx.books).await.unwrap();

	let docs = fx.store.documents(&report.generation).await;
	let find = |url: &str| docs.iter().find(|d| d.url == url).unwrap();

	let root = find("/guide/ref/current/guide");
	assert_eq!(root.title, "Getting Started » R");
	assert_eq!(root.text, "Welcome text.");
	assert_eq!(root.book, "ref");
	assert_eq!(root.path, "current/guide.html");

	assert_eq!(find("/guide/ref/current/guide#s1").title, "Install » Getting Started » R");
	assert_eq!(find("/guide/ref/current/guide#s2").text, "Edit the file.");
	assert_eq!(find("/guide/java/current/client#auth").title, "Auth » Java Client » Java");
	assert!(docs.iter().all(|d| !d.url.contains("/index")));
}

#[tokio::test]
async fn rebuild_replaces_and_retires_previous_generation() {
	let fx = Fixture::new();
	fx.seed_live().await;

	let report = fx.default_reindexer().rebuild(&fx.books).await.unwrap();

	assert_eq!(report.previous.as_deref(), Some(OLD));
	assert_eq!(fx.store.alias_bindings("docs").await, vec![report.generation.clone()]);
	assert!(!fx.store.has_index(OLD).await);
	assert_eq!(fx.store.index_names().await, vec![report.generation]);
}

#[tokio::test]
async fn item_errors_leave_alias_untouched() {
	let fx = Fixture::new();
	fx.seed_live().await;
	fx.store.reject_book("java").await;

	let err = fx.default_reindexer().rebuild(&fx.books).await.unwrap_err();

	let indexing = match err {
		RebuildError::Indexing(indexing) => indexing,
		other => panic!("expected indexing error, got {other}"),
	};
	let mut ids: Vec<&str> = indexing.failures.iter().map(|f| f.id.as_str()).collect();
	ids.sort();
	assert_eq!(ids, vec!["/guide/java/current/client", "/guide/java/current/client#auth"]);

	assert_eq!(fx.store.alias_bindings("docs").await, vec![OLD]);
	assert!(fx.store.has_index(OLD).await);
	// Kept for inspection.
	assert!(fx.store.has_index(&indexing.generation).await);
}

#[tokio::test]
async fn delete_policy_removes_failed_generation() {
	let fx = Fixture::new();
	fx.seed_live().await;
	fx.store.reject_book("ref").await;

	let reindexer = fx.reindexer(ReindexOptions {
		on_failure: OnFailure::Delete,
		..Default::default()
	});
	let err = reindexer.rebuild(&fx.books).await.unwrap_err();

	assert!(matches!(err, RebuildError::Indexing(_)));
	assert_eq!(fx.store.index_names().await, vec![OLD]);
	assert_eq!(fx.store.alias_bindings("docs").await, vec![OLD]);
}

#[tokio::test]
async fn failed_bulk_request_fails_every_document_in_batch() {
	let fx = Fixture::new();
	fx.store.fail_bulk_requests(true).await;

	let reindexer = fx.reindexer(ReindexOptions {
		batch_size: 2,
		..Default::default()
	});
	let err = reindexer.rebuild(&fx.books).await.unwrap_err();

	match err {
		RebuildError::Indexing(indexing) => {
			assert_eq!(indexing.failures.len(), 5);
			assert!(indexing.failures.iter().all(|f| f.status == 500));
		}
		other => panic!("expected indexing error, got {other}"),
	}
	assert_eq!(fx.store.get_alias_target("docs", true).await.unwrap(), None);
}

#[tokio::test]
async fn small_batches_write_every_document() {
	let fx = Fixture::new();
	let reindexer = fx.reindexer(ReindexOptions {
		batch_size: 1,
		..Default::default()
	});

	let report = reindexer.rebuild(&fx.books).await.unwrap();
	assert_eq!(fx.store.documents(&report.generation).await.len(), 5);
}

#[tokio::test]
async fn build_error_aborts_before_alias_mutation() {
	let fx = Fixture::new();
	fx.seed_live().await;
	let mut books = fx.books.clone();
	books.push(book("missing", "M"));

	let err = fx.default_reindexer().rebuild(&books).await.unwrap_err();

	match err {
		RebuildError::Build(build) => assert!(build.path().ends_with("missing/current")),
		other => panic!("expected build error, got {other}"),
	}
	assert_eq!(fx.store.alias_bindings("docs").await, vec![OLD]);
}

#[tokio::test]
async fn alias_swap_failure_keeps_previous_generation_live() {
	let fx = Fixture::new();
	fx.seed_live().await;
	fx.store.fail_alias_updates(true).await;

	let err = fx.default_reindexer().rebuild(&fx.books).await.unwrap_err();

	match err {
		RebuildError::AliasSwap(swap) => {
			assert_eq!(swap.alias, "docs");
			assert!(fx.store.has_index(&swap.generation).await);
		}
		other => panic!("expected alias swap error, got {other}"),
	}
	assert_eq!(fx.store.alias_bindings("docs").await, vec![OLD]);
}

#[tokio::test]
async fn failed_retirement_is_a_warning() {
	let fx = Fixture::new();
	fx.seed_live().await;
	fx.store.fail_delete_of(OLD).await;

	let report = fx.default_reindexer().rebuild(&fx.books).await.unwrap();

	assert_eq!(report.warnings.len(), 1);
	assert_eq!(report.warnings[0].index, OLD);
	assert_eq!(fx.store.alias_bindings("docs").await, vec![report.generation.clone()]);
	assert!(fx.store.has_index(OLD).await);
}

#[tokio::test]
async fn sweep_deletes_only_unbound_generations() {
	let fx = Fixture::new();
	fx.seed_live().await;
	let schema = docsearch_core::schema();
	fx.store.create_index(ORPHAN, &schema).await.unwrap();
	fx.store.create_index("docs_archive", &schema).await.unwrap();

	let reindexer = fx.reindexer(ReindexOptions {
		sweep_orphans: true,
		..Default::default()
	});
	let report = reindexer.rebuild(&fx.books).await.unwrap();

	assert_eq!(report.swept, vec![ORPHAN]);
	assert_eq!(report.previous.as_deref(), Some(OLD));
	assert_eq!(
		fx.store.index_names().await,
		vec![report.generation.clone(), "docs_archive".to_string()]
	);
}

#[tokio::test]
async fn orphans_survive_without_sweep() {
	let fx = Fixture::new();
	fx.store
		.create_index(ORPHAN, &docsearch_core::schema())
		.await
		.unwrap();

	let report = fx.default_reindexer().rebuild(&fx.books).await.unwrap();

	assert!(report.swept.is_empty());
	assert!(fx.store.has_index(ORPHAN).await);
}

#[tokio::test]
async fn sweep_failure_is_a_warning() {
	let fx = Fixture::new();
	fx.store
		.create_index(ORPHAN, &docsearch_core::schema())
		.await
		.unwrap();
	fx.store.fail_delete_of(ORPHAN).await;

	let reindexer = fx.reindexer(ReindexOptions {
		sweep_orphans: true,
		..Default::default()
	});
	let report = reindexer.rebuild(&fx.books).await.unwrap();

	assert!(report.swept.is_empty());
	assert_eq!(report.warnings.len(), 1);
	assert_eq!(report.warnings[0].index, ORPHAN);
}
