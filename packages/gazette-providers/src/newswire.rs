use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, Result};

/// One article as delivered by the newswire, before it becomes a store
/// record.
#[derive(Clone, Debug)]
pub struct FetchedArticle {
	pub title: String,
	pub description: String,
	pub body: String,
	pub url: String,
	pub source: String,
	pub author: String,
	pub published_at: Option<String>,
}

/// Keyword search over the newswire's article archive within a date window.
pub async fn fetch(
	cfg: &gazette_config::NewswireProviderConfig,
	query: &str,
	from: OffsetDateTime,
	to: OffsetDateTime,
) -> Result<Vec<FetchedArticle>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/everything", cfg.api_base);
	let from = from.format(&Rfc3339).map_err(|_| Error::InvalidResponse {
		message: "Failed to format the from date.".to_string(),
	})?;
	let to = to.format(&Rfc3339).map_err(|_| Error::InvalidResponse {
		message: "Failed to format the to date.".to_string(),
	})?;
	let mut params = vec![
		("q".to_string(), query.to_string()),
		("from".to_string(), from),
		("to".to_string(), to),
		("language".to_string(), cfg.language.clone()),
		("pageSize".to_string(), cfg.page_size.to_string()),
		("sortBy".to_string(), "relevancy".to_string()),
	];

	if let Some(sources) = cfg.sources.as_deref().filter(|sources| !sources.trim().is_empty()) {
		params.push(("sources".to_string(), sources.to_string()));
	}

	let res = client
		.get(url)
		.header("X-Api-Key", cfg.api_key.as_str())
		.query(&params)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_newswire_response(json)
}

fn parse_newswire_response(json: Value) -> Result<Vec<FetchedArticle>> {
	let articles = json.get("articles").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Newswire response is missing articles array.".to_string() }
	})?;

	let mut out = Vec::with_capacity(articles.len());

	for item in articles {
		let Some(url) = field_str(item, "url") else {
			// Articles without a url have no identity; skip them.
			continue;
		};

		out.push(FetchedArticle {
			title: field_str(item, "title").unwrap_or_default(),
			description: field_str(item, "description").unwrap_or_default(),
			body: field_str(item, "content").unwrap_or_default(),
			url,
			source: item
				.get("source")
				.and_then(|source| source.get("name"))
				.and_then(|name| name.as_str())
				.unwrap_or("Unknown")
				.to_string(),
			author: field_str(item, "author").unwrap_or_else(|| "Unknown".to_string()),
			published_at: field_str(item, "publishedAt"),
		});
	}

	Ok(out)
}

fn field_str(item: &Value, key: &str) -> Option<String> {
	item.get(key).and_then(|v| v.as_str()).map(str::to_string)
}
