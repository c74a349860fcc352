use std::{
	collections::{BTreeMap, HashSet},
	sync::Mutex,
};

use time::OffsetDateTime;

use gazette_storage::{
	BoxFuture, Result,
	index::{IndexEntry, IndexHit, SemanticIndex},
	models::NewArticle,
};

/// In-memory stand-in for the vector index: exact cosine search over a map
/// keyed by article id. Upserts overwrite by id, like the real thing.
#[derive(Default)]
pub struct MemoryIndex {
	entries: Mutex<BTreeMap<String, IndexEntry>>,
}
impl MemoryIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn id_set(&self) -> HashSet<String> {
		let entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());

		entries.keys().cloned().collect()
	}
}
impl SemanticIndex for MemoryIndex {
	fn upsert_batch<'a>(&'a self, entries: &'a [IndexEntry]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut stored = self.entries.lock().unwrap_or_else(|err| err.into_inner());

			for entry in entries {
				stored.insert(entry.article_id.clone(), entry.clone());
			}

			Ok(())
		})
	}

	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		top_k: u32,
		source: Option<&'a str>,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>> {
		Box::pin(async move {
			let stored = self.entries.lock().unwrap_or_else(|err| err.into_inner());
			let mut hits: Vec<IndexHit> = stored
				.values()
				.filter(|entry| source.is_none_or(|source| entry.metadata.source == source))
				.map(|entry| IndexHit {
					article_id: entry.article_id.clone(),
					similarity: cosine_similarity(vector, &entry.vector).clamp(0.0, 1.0),
					metadata: entry.metadata.clone(),
				})
				.collect();

			hits.sort_by(|a, b| {
				b.similarity
					.partial_cmp(&a.similarity)
					.unwrap_or(std::cmp::Ordering::Equal)
					.then_with(|| a.article_id.cmp(&b.article_id))
			});
			hits.truncate(top_k as usize);

			Ok(hits)
		})
	}

	fn ids(&self, limit: usize) -> BoxFuture<'_, Result<HashSet<String>>> {
		Box::pin(async move {
			let stored = self.entries.lock().unwrap_or_else(|err| err.into_inner());

			Ok(stored.keys().take(limit).cloned().collect())
		})
	}

	fn delete<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut stored = self.entries.lock().unwrap_or_else(|err| err.into_inner());

			for id in ids {
				stored.remove(id);
			}

			Ok(())
		})
	}

	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let stored = self.entries.lock().unwrap_or_else(|err| err.into_inner());

			Ok(stored.len() as u64)
		})
	}
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
	let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
	let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	dot / (norm_a * norm_b)
}

/// Deterministic toy embedding: a normalized byte histogram folded into
/// `dim` buckets. Similar texts land near each other, which is all the
/// tests need.
pub fn toy_embedding(text: &str, dim: usize) -> Vec<f32> {
	let mut out = vec![0.0_f32; dim.max(1)];

	for byte in text.to_lowercase().bytes() {
		out[byte as usize % dim.max(1)] += 1.0;
	}

	let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();

	if norm > 0.0 {
		for value in &mut out {
			*value /= norm;
		}
	}

	out
}

pub fn article_fixture(url: &str, source: &str, published_at: Option<&str>) -> NewArticle {
	NewArticle {
		title: format!("Headline for {url}"),
		description: "What happened and why it matters.".to_string(),
		body: "Full body text describing the development in detail.".to_string(),
		url: url.to_string(),
		source: source.to_string(),
		author: "Staff Reporter".to_string(),
		published_at: published_at.map(str::to_string),
		fetched_at: OffsetDateTime::now_utc(),
	}
}
