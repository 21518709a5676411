use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_USER_AGENT: &str = concat!("ptracker/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub fetch: Fetch,
	pub pipeline: Pipeline,
	#[serde(default)]
	pub worker: Worker,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm_extractor: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	/// Vector width used for promise embeddings.
	pub promise_dimensions: u32,
	/// Vector width used for action embeddings. May differ from `promise_dimensions`.
	pub action_dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_top_p")]
	pub top_p: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Fetch {
	#[serde(default = "default_fetch_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
}
impl Default for Fetch {
	fn default() -> Self {
		Self { timeout_ms: default_fetch_timeout_ms(), user_agent: default_user_agent() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Pipeline {
	/// Chunk stride in characters. Each chunk spans twice this length.
	pub extract_length: usize,
	/// Cosine distance below which two claims of the same kind are one claim.
	pub duplicate_dist_threshold: f32,
	/// Cosine distance below which a promise and an action are auto-linked.
	pub promise_action_dist_threshold: f32,
}
impl Pipeline {
	pub fn duplicate_sim_threshold(&self) -> f32 {
		1.0 - self.duplicate_dist_threshold
	}
}

#[derive(Debug, Deserialize)]
pub struct Worker {
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}
impl Default for Worker {
	fn default() -> Self {
		Self { poll_interval_ms: default_poll_interval_ms() }
	}
}

fn default_top_p() -> f32 {
	0.95
}

fn default_max_tokens() -> u32 {
	1_200
}

fn default_fetch_timeout_ms() -> u64 {
	30_000
}

pub(crate) fn default_user_agent() -> String {
	DEFAULT_USER_AGENT.to_string()
}

fn default_poll_interval_ms() -> u64 {
	1_000
}
