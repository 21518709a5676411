mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_USER_AGENT, EmbeddingProviderConfig, Fetch, LlmProviderConfig, Pipeline,
	Postgres, Providers, Service, Storage, Worker,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.promise_dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.promise_dimensions must be greater than zero."
				.to_string(),
		});
	}
	if cfg.providers.embedding.action_dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.action_dimensions must be greater than zero."
				.to_string(),
		});
	}
	if !cfg.providers.llm_extractor.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.llm_extractor.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.providers.llm_extractor.top_p) {
		return Err(Error::Validation {
			message: "providers.llm_extractor.top_p must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.providers.llm_extractor.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.llm_extractor.max_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.extract_length == 0 {
		return Err(Error::Validation {
			message: "pipeline.extract_length must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("pipeline.duplicate_dist_threshold", cfg.pipeline.duplicate_dist_threshold),
		("pipeline.promise_action_dist_threshold", cfg.pipeline.promise_action_dist_threshold),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		// Cosine distance lives in [0, 2]; a threshold of 0 or 2 would match nothing or everything.
		if value <= 0.0 || value >= 2.0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than 0.0 and less than 2.0."),
			});
		}
	}

	if cfg.worker.poll_interval_ms == 0 {
		return Err(Error::Validation {
			message: "worker.poll_interval_ms must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("llm_extractor", &cfg.providers.llm_extractor.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.fetch.user_agent.trim().is_empty() {
		cfg.fetch.user_agent = types::default_user_agent();
	}
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
