use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// One completion call. `system_message` and the sampling knobs override the
/// provider config defaults when set.
#[derive(Clone, Debug, Default)]
pub struct GenerationRequest<'a> {
	pub prompt: &'a str,
	pub system_message: Option<&'a str>,
	pub max_tokens: Option<u32>,
	pub temperature: Option<f32>,
}

pub async fn generate(
	cfg: &gazette_config::GenerationProviderConfig,
	request: GenerationRequest<'_>,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut messages = Vec::new();

	if let Some(system) = request.system_message {
		messages.push(serde_json::json!({ "role": "system", "content": system }));
	}

	messages.push(serde_json::json!({ "role": "user", "content": request.prompt }));

	let body = serde_json::json!({
		"model": cfg.model,
		"messages": messages,
		"max_tokens": request.max_tokens.unwrap_or(cfg.max_tokens),
		"temperature": request.temperature.unwrap_or(cfg.temperature),
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_generation_response(json)
}

fn parse_generation_response(json: Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Generation response is missing message content.".to_string(),
		})?;

	Ok(content.to_string())
}
