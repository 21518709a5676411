pub mod actions;
pub mod analyzer;
pub mod candidates;
pub mod citations;
pub mod extractors;
pub mod jobs;
pub mod promises;
pub mod time_serde;

mod dedup;
mod embedding;
mod error;
mod linking;
mod prompts;

pub use actions::{ActionResponse, CreateActionRequest, UpdateActionRequest};
pub use analyzer::{AnalysisReport, CandidateRef, KindReport, SourceAnalyzer};
pub use candidates::{CandidateResponse, CreateCandidateRequest};
pub use citations::{CitationInput, CitationResponse};
pub use error::{Error, Result};
pub use extractors::{
	ActionExtractor, DraftCitation, DraftEntity, EntityExtractor, PromiseExtractor,
};
pub use jobs::{AnalyzeSourcesRequest, AnalyzeSourcesResponse, JobResponse};
pub use promises::{CreatePromiseRequest, PromiseResponse, UpdatePromiseRequest};

use std::{future::Future, pin::Pin, sync::Arc};

use serde::Deserialize;
use serde_json::Value;

use ptracker_config::{Config, EmbeddingProviderConfig, Fetch, LlmProviderConfig};
use ptracker_providers::{embedding as provider_embedding, extractor, fetch};
use ptracker_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const MAX_PAGE_LIMIT: i64 = 100;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		dimensions: u32,
		texts: &'a [String],
	) -> BoxFuture<'a, ptracker_providers::Result<Vec<Vec<f32>>>>;
}

pub trait ExtractorProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
		response_format: &'a Value,
	) -> BoxFuture<'a, ptracker_providers::Result<Value>>;
}

pub trait PageFetcher
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a Fetch,
		url: &'a str,
	) -> BoxFuture<'a, ptracker_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub extractor: Arc<dyn ExtractorProvider>,
	pub fetcher: Arc<dyn PageFetcher>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		extractor: Arc<dyn ExtractorProvider>,
		fetcher: Arc<dyn PageFetcher>,
	) -> Self {
		Self { embedding, extractor, fetcher }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), extractor: provider.clone(), fetcher: provider }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		dimensions: u32,
		texts: &'a [String],
	) -> BoxFuture<'a, ptracker_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(provider_embedding::embed(cfg, dimensions, texts))
	}
}
impl ExtractorProvider for DefaultProviders {
	fn extract<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
		response_format: &'a Value,
	) -> BoxFuture<'a, ptracker_providers::Result<Value>> {
		Box::pin(extractor::extract(cfg, messages, response_format))
	}
}
impl PageFetcher for DefaultProviders {
	fn fetch<'a>(
		&'a self,
		cfg: &'a Fetch,
		url: &'a str,
	) -> BoxFuture<'a, ptracker_providers::Result<String>> {
		Box::pin(fetch::fetch_page_text(cfg, url))
	}
}

pub struct PtrackerService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl PtrackerService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	/// Borrows the service's collaborators for one unit of work.
	pub fn context(&self) -> AnalysisContext<'_> {
		AnalysisContext::new(&self.cfg, &self.db, &self.providers)
	}
}

/// Everything a pipeline run talks to. Built per run and dropped with it.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
	pub cfg: &'a Config,
	pub db: &'a Db,
	pub providers: &'a Providers,
}
impl<'a> AnalysisContext<'a> {
	pub fn new(cfg: &'a Config, db: &'a Db, providers: &'a Providers) -> Self {
		Self { cfg, db, providers }
	}
}

/// Offset pagination. `after` is the number of rows to skip.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Page {
	pub after: Option<i64>,
	pub limit: Option<i64>,
}
impl Page {
	pub fn offset(&self) -> i64 {
		self.after.unwrap_or(0).max(0)
	}

	pub fn limit(&self) -> i64 {
		self.limit.unwrap_or(MAX_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
	}
}

pub(crate) fn validate_http_url(field: &str, raw: &str) -> Result<url::Url> {
	let parsed = url::Url::parse(raw.trim()).map_err(|_| Error::InvalidRequest {
		message: format!("{field} must be an absolute URL."),
	})?;

	if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
		return Err(Error::InvalidRequest {
			message: format!("{field} must be an http or https URL."),
		});
	}

	Ok(parsed)
}

pub(crate) fn require_non_empty<'a>(field: &str, raw: &'a str) -> Result<&'a str> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return Err(Error::InvalidRequest { message: format!("{field} must be non-empty.") });
	}

	Ok(trimmed)
}
