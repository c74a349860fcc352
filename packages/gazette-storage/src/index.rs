use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{BoxFuture, Result};

/// Metadata snapshot stored alongside each vector. Body text is truncated by
/// the caller to respect the per-entry payload ceiling.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EntryMetadata {
	pub title: String,
	pub source: String,
	pub url: String,
	pub published_at: String,
	pub body: String,
}

#[derive(Clone, Debug)]
pub struct IndexEntry {
	pub article_id: String,
	pub vector: Vec<f32>,
	pub metadata: EntryMetadata,
}

#[derive(Clone, Debug)]
pub struct IndexHit {
	pub article_id: String,
	pub similarity: f32,
	pub metadata: EntryMetadata,
}

/// Nearest-neighbor index keyed by article id. Upserts are last-write-wins
/// per id, so re-delivery is idempotent.
pub trait SemanticIndex
where
	Self: Send + Sync,
{
	fn upsert_batch<'a>(&'a self, entries: &'a [IndexEntry]) -> BoxFuture<'a, Result<()>>;

	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		top_k: u32,
		source: Option<&'a str>,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>>;

	/// Bulk peek of the ids currently present, up to `limit`.
	fn ids(&self, limit: usize) -> BoxFuture<'_, Result<HashSet<String>>>;

	fn delete<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<()>>;

	fn count(&self) -> BoxFuture<'_, Result<u64>>;
}

pub fn estimate_metadata_size(metadata: &EntryMetadata) -> usize {
	serde_json::to_string(metadata).map(|raw| raw.len()).unwrap_or(usize::MAX)
}

/// Enforces the per-entry payload ceiling with a bounded one-shot shrink: if
/// the snapshot is over the ceiling, the body text is halved and re-measured
/// once. Returns whether the snapshot fits afterwards.
pub fn enforce_metadata_ceiling(metadata: &mut EntryMetadata, ceiling_bytes: usize) -> bool {
	if estimate_metadata_size(metadata) <= ceiling_bytes {
		return true;
	}

	let half = metadata.body.chars().count() / 2;

	metadata.body = metadata.body.chars().take(half).collect();

	estimate_metadata_size(metadata) <= ceiling_bytes
}

#[cfg(test)]
mod tests {
	use super::*;

	fn metadata(body: String) -> EntryMetadata {
		EntryMetadata {
			title: "Title".to_string(),
			source: "Example".to_string(),
			url: "https://example.com/a".to_string(),
			published_at: "2026-01-08T12:00:00Z".to_string(),
			body,
		}
	}

	#[test]
	fn small_snapshots_pass_untouched() {
		let mut meta = metadata("short body".to_string());

		assert!(enforce_metadata_ceiling(&mut meta, 40_960));
		assert_eq!(meta.body, "short body");
	}

	#[test]
	fn oversized_snapshots_are_halved_once() {
		let mut meta = metadata("x".repeat(1_000));

		assert!(enforce_metadata_ceiling(&mut meta, 700));
		assert_eq!(meta.body.chars().count(), 500);
	}

	#[test]
	fn shrink_is_one_shot_even_when_still_over() {
		let mut meta = metadata("x".repeat(4_000));

		assert!(!enforce_metadata_ceiling(&mut meta, 100));
		assert_eq!(meta.body.chars().count(), 2_000);
	}
}
