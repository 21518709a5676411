//! Chat completion with a JSON-schema constrained response.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Sends one completion request and returns the parsed JSON content.
///
/// A single attempt is made. Truncated output, refusals and unparseable content are
/// reported as errors so the caller can skip the unit of work.
pub async fn extract(
	cfg: &ptracker_config::LlmProviderConfig,
	messages: &[Value],
	response_format: &Value,
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"top_p": cfg.top_p,
		"max_tokens": cfg.max_tokens,
		"messages": messages,
		"response_format": response_format,
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion_json(json)
}

/// Wraps a JSON schema in the `response_format` envelope for structured output.
pub fn json_schema_format(name: &str, schema: Value) -> Value {
	serde_json::json!({
		"type": "json_schema",
		"json_schema": {
			"name": name,
			"strict": true,
			"schema": schema,
		},
	})
}

fn parse_completion_json(json: Value) -> Result<Value> {
	let choice = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing choices.".to_string(),
		})?;

	if choice.get("finish_reason").and_then(|v| v.as_str()) == Some("length") {
		return Err(Error::Truncated);
	}

	let message = choice.get("message").ok_or_else(|| Error::InvalidResponse {
		message: "Completion choice is missing message.".to_string(),
	})?;

	if let Some(refusal) = message.get("refusal").and_then(|v| v.as_str()) {
		return Err(Error::Refusal { message: refusal.to_string() });
	}

	let content = message.get("content").and_then(|c| c.as_str()).ok_or_else(|| {
		Error::InvalidResponse { message: "Completion message is missing content.".to_string() }
	})?;
	let parsed: Value = serde_json::from_str(content).map_err(|_| Error::InvalidResponse {
		message: "Completion content is not valid JSON.".to_string(),
	})?;

	if !parsed.is_object() {
		return Err(Error::InvalidResponse {
			message: "Completion content must be a JSON object.".to_string(),
		});
	}

	Ok(parsed)
}
