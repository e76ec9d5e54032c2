// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Elasticsearch REST client.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use docsearch_common_config::SecretString;
use docsearch_common_http::{retry, RetryConfig};
use docsearch_core::{IndexDocument, IndexSchema};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, instrument, trace};

use crate::error::StoreError;
use crate::store::DocumentStore;
use crate::types::{AliasAction, BulkItemError, BulkResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:9200";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Basic-auth credentials for the engine.
#[derive(Debug, Clone)]
pub struct Credentials {
	pub username: String,
	pub password: Option<SecretString>,
}

/// Client for an Elasticsearch-compatible engine.
#[derive(Debug, Clone)]
pub struct ElasticStore {
	http_client: Client,
	base_url: String,
	credentials: Option<Credentials>,
	doc_type: Option<String>,
	retry_config: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct BulkApiResponse {
	#[serde(default)]
	errors: bool,
	#[serde(default)]
	items: Vec<BTreeMap<String, BulkApiItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkApiItem {
	#[serde(rename = "_id", default)]
	id: Option<String>,
	#[serde(default)]
	status: u16,
	#[serde(default)]
	error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CatIndexRow {
	index: String,
}

impl ElasticStore {
	/// Creates a client for the engine at `base_url`.
	pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
		Self::with_timeout(base_url, DEFAULT_TIMEOUT)
	}

	/// Creates a client whose requests time out after `timeout`.
	pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
		let http_client = docsearch_common_http::builder().timeout(timeout).build()?;

		Ok(Self {
			http_client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			credentials: None,
			doc_type: None,
			retry_config: RetryConfig::default(),
		})
	}

	pub fn with_credentials(mut self, credentials: Credentials) -> Self {
		self.credentials = Some(credentials);
		self
	}

	/// Uses a mapping type for engines that still require one.
	pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
		self.doc_type = Some(doc_type.into());
		self
	}

	pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn request(&self, method: Method, path: &str) -> RequestBuilder {
		let request = self
			.http_client
			.request(method, format!("{}/{}", self.base_url, path.trim_start_matches('/')));

		match &self.credentials {
			Some(creds) => request.basic_auth(
				&creds.username,
				creds.password.as_ref().map(|p| p.expose().as_str()),
			),
			None => request,
		}
	}

	async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
		request.send().await.map_err(|e| {
			if e.is_timeout() {
				error!("request to search engine timed out");
				return StoreError::Timeout;
			}
			error!(error = %e, "network error talking to search engine");
			StoreError::Network(e)
		})
	}

	async fn read_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, StoreError> {
		let body = response.text().await?;
		trace!(body = %body, "response body");
		serde_json::from_str(&body)
			.map_err(|e| StoreError::InvalidResponse(format!("JSON parse error: {e}")))
	}

	async fn api_error(response: Response) -> StoreError {
		let status = response.status().as_u16();
		let message = response.text().await.unwrap_or_default();
		error!(status, body = %message, "search engine error");
		StoreError::Api { status, message }
	}

	fn mappings_body(&self, schema: &IndexSchema) -> Value {
		match &self.doc_type {
			Some(doc_type) => {
				let mut wrapped = serde_json::Map::new();
				wrapped.insert(doc_type.clone(), schema.mappings.clone());
				Value::Object(wrapped)
			}
			None => schema.mappings.clone(),
		}
	}

	fn bulk_body(&self, index: &str, documents: &[IndexDocument]) -> Result<String, StoreError> {
		let mut body = String::new();
		for doc in documents {
			let mut meta = json!({ "_index": index, "_id": doc.id() });
			if let Some(doc_type) = &self.doc_type {
				meta["_type"] = json!(doc_type);
			}
			let action = json!({ "index": meta });

			for line in [action.to_string(), to_json(doc)?] {
				body.push_str(&line);
				body.push('\n');
			}
		}
		Ok(body)
	}

	async fn create_index_once(&self, name: &str, body: &Value) -> Result<(), StoreError> {
		let response = self.send(self.request(Method::PUT, name).json(body)).await?;
		if !response.status().is_success() {
			return Err(Self::api_error(response).await);
		}
		Ok(())
	}

	async fn delete_index_once(&self, name: &str, ignore_missing: bool) -> Result<(), StoreError> {
		let response = self.send(self.request(Method::DELETE, name)).await?;
		match response.status() {
			s if s.is_success() => Ok(()),
			StatusCode::NOT_FOUND if ignore_missing => {
				debug!(index = %name, "index already absent");
				Ok(())
			}
			StatusCode::NOT_FOUND => Err(StoreError::NotFound(name.to_string())),
			_ => Err(Self::api_error(response).await),
		}
	}

	async fn bulk_once(&self, body: &str) -> Result<BulkResponse, StoreError> {
		let response = self
			.send(
				self.request(Method::POST, "_bulk")
					.header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
					.body(body.to_string()),
			)
			.await?;
		if !response.status().is_success() {
			return Err(Self::api_error(response).await);
		}

		let parsed: BulkApiResponse = Self::read_json(response).await?;
		Ok(collect_bulk_errors(parsed))
	}

	async fn alias_target_once(
		&self,
		alias: &str,
		ignore_missing: bool,
	) -> Result<Option<String>, StoreError> {
		let response = self
			.send(self.request(Method::GET, &format!("_alias/{alias}")))
			.await?;
		match response.status() {
			s if s.is_success() => {}
			StatusCode::NOT_FOUND if ignore_missing => return Ok(None),
			StatusCode::NOT_FOUND => return Err(StoreError::NotFound(alias.to_string())),
			_ => return Err(Self::api_error(response).await),
		}

		let bound: BTreeMap<String, Value> = Self::read_json(response).await?;
		let mut indices = bound.into_keys();
		match (indices.next(), indices.next()) {
			(None, _) => Ok(None),
			(Some(index), None) => Ok(Some(index)),
			(Some(first), Some(second)) => Err(StoreError::InvalidResponse(format!(
				"alias {alias} is bound to more than one index ({first}, {second}, ...)"
			))),
		}
	}

	async fn update_aliases_once(&self, body: &Value) -> Result<(), StoreError> {
		let response = self
			.send(self.request(Method::POST, "_aliases").json(body))
			.await?;
		if !response.status().is_success() {
			return Err(Self::api_error(response).await);
		}
		Ok(())
	}

	async fn list_indices_once(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
		let response = self
			.send(
				self.request(Method::GET, &format!("_cat/indices/{pattern}"))
					.query(&[("format", "json"), ("h", "index")]),
			)
			.await?;
		match response.status() {
			s if s.is_success() => {}
			StatusCode::NOT_FOUND => return Ok(Vec::new()),
			_ => return Err(Self::api_error(response).await),
		}

		let rows: Vec<CatIndexRow> = Self::read_json(response).await?;
		let mut names: Vec<String> = rows.into_iter().map(|r| r.index).collect();
		names.sort();
		Ok(names)
	}
}

fn to_json(doc: &IndexDocument) -> Result<String, StoreError> {
	serde_json::to_string(doc)
		.map_err(|e| StoreError::InvalidResponse(format!("cannot encode document {}: {e}", doc.id())))
}

fn error_reason(error: &Value) -> String {
	match error {
		Value::String(s) => s.clone(),
		Value::Object(obj) => {
			let kind = obj.get("type").and_then(Value::as_str);
			let reason = obj.get("reason").and_then(Value::as_str);
			match (kind, reason) {
				(Some(kind), Some(reason)) => format!("{kind}: {reason}"),
				(None, Some(reason)) => reason.to_string(),
				(Some(kind), None) => kind.to_string(),
				(None, None) => error.to_string(),
			}
		}
		other => other.to_string(),
	}
}

fn collect_bulk_errors(parsed: BulkApiResponse) -> BulkResponse {
	let items = parsed.items.len();
	let errors = if parsed.errors {
		parsed
			.items
			.into_iter()
			.flat_map(|item| item.into_values())
			.filter_map(|item| {
				let error = item.error?;
				Some(BulkItemError {
					id: item.id.unwrap_or_default(),
					status: item.status,
					reason: error_reason(&error),
				})
			})
			.collect()
	} else {
		Vec::new()
	};

	BulkResponse { items, errors }
}

#[async_trait]
impl DocumentStore for ElasticStore {
	#[instrument(skip(self, schema))]
	async fn create_index(&self, name: &str, schema: &IndexSchema) -> Result<(), StoreError> {
		let body = json!({
			"settings": schema.settings,
			"mappings": self.mappings_body(schema),
		});
		retry(&self.retry_config, "create_index", || {
			self.create_index_once(name, &body)
		})
		.await?;
		debug!(index = %name, "index created");
		Ok(())
	}

	#[instrument(skip(self))]
	async fn delete_index(&self, name: &str, ignore_missing: bool) -> Result<(), StoreError> {
		retry(&self.retry_config, "delete_index", || {
			self.delete_index_once(name, ignore_missing)
		})
		.await
	}

	#[instrument(skip(self, documents), fields(documents = documents.len()))]
	async fn bulk_upsert(
		&self,
		index: &str,
		documents: &[IndexDocument],
	) -> Result<BulkResponse, StoreError> {
		if documents.is_empty() {
			return Ok(BulkResponse::default());
		}

		let body = self.bulk_body(index, documents)?;
		let response = retry(&self.retry_config, "bulk_upsert", || self.bulk_once(&body)).await?;
		debug!(
			items = response.items,
			rejected = response.errors.len(),
			"bulk request completed"
		);
		Ok(response)
	}

	#[instrument(skip(self))]
	async fn get_alias_target(
		&self,
		alias: &str,
		ignore_missing: bool,
	) -> Result<Option<String>, StoreError> {
		retry(&self.retry_config, "get_alias", || {
			self.alias_target_once(alias, ignore_missing)
		})
		.await
	}

	#[instrument(skip(self))]
	async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), StoreError> {
		let body = json!({ "actions": actions });
		retry(&self.retry_config, "update_aliases", || {
			self.update_aliases_once(&body)
		})
		.await
	}

	#[instrument(skip(self))]
	async fn list_indices(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
		retry(&self.retry_config, "list_indices", || {
			self.list_indices_once(pattern)
		})
		.await
	}
}
