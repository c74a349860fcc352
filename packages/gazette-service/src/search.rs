use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, GazetteService, Result};
use gazette_domain::rank;
use gazette_storage::index::EntryMetadata;

/// Per-article slice of body text included in the summarization context.
const ARTICLE_SNIPPET_CHARS: usize = 500;
/// Rough context cap, about 2,000 tokens at four characters per token.
const MAX_CONTEXT_CHARS: usize = 8_000;

/// Single-word topics match broadly, so they get a lower similarity floor.
const MIN_SIMILARITY_BROAD: f32 = 0.2;
const MIN_SIMILARITY_SPECIFIC: f32 = 0.4;

#[derive(Clone, Debug)]
pub struct RetrievalCandidate {
	pub article_id: String,
	pub similarity: f32,
	pub metadata: EntryMetadata,
}
impl RetrievalCandidate {
	pub fn published_at(&self) -> Option<&str> {
		let raw = self.metadata.published_at.trim();

		if raw.is_empty() { None } else { Some(raw) }
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceInfo {
	pub title: String,
	pub source: String,
	pub url: String,
	pub published_at: String,
	pub similarity: f32,
}

#[derive(Clone, Debug)]
pub struct RetrievedContext {
	pub topic: String,
	pub context: String,
	pub sources: Vec<SourceInfo>,
	pub article_count: usize,
}

impl GazetteService {
	/// Embeds the query and returns index hits at or above the similarity
	/// floor, in the index's similarity order.
	pub async fn retrieve_for_query(
		&self,
		query: &str,
		top_k: u32,
		source_filter: Option<&str>,
		min_similarity: f32,
	) -> Result<Vec<RetrievalCandidate>> {
		let vector = self.embed_query(query).await?;
		let hits = self.index.query(&vector, top_k, source_filter).await?;
		let candidates: Vec<RetrievalCandidate> = hits
			.into_iter()
			.filter(|hit| hit.similarity >= min_similarity)
			.map(|hit| RetrievalCandidate {
				article_id: hit.article_id,
				similarity: hit.similarity,
				metadata: hit.metadata,
			})
			.collect();

		tracing::info!(count = candidates.len(), query, "Retrieved candidates.");

		Ok(candidates)
	}

	/// Re-ranks candidates by the similarity/recency composite and truncates
	/// to `count`. Ties keep the upstream similarity order.
	pub fn rank_candidates(
		&self,
		candidates: Vec<RetrievalCandidate>,
		count: usize,
		now: OffsetDateTime,
	) -> Vec<RetrievalCandidate> {
		let scores: Vec<f32> = candidates
			.iter()
			.map(|candidate| {
				let decay =
					rank::freshness_decay(&self.cfg.ranking, candidate.published_at(), now);

				rank::composite(&self.cfg.ranking, candidate.similarity, decay)
			})
			.collect();
		let order = rank::rank_top(&scores, count);
		let mut slots: Vec<Option<RetrievalCandidate>> =
			candidates.into_iter().map(Some).collect();

		order.into_iter().filter_map(|index| slots[index].take()).collect()
	}

	/// Retrieves, ranks, and formats the context block handed to the
	/// generation provider.
	pub async fn retrieve_context(
		&self,
		topic: &str,
		max_articles: u32,
	) -> Result<RetrievedContext> {
		let min_similarity = min_similarity_for(topic);
		let candidates =
			self.retrieve_for_query(topic, max_articles * 2, None, min_similarity).await?;
		let ranked =
			self.rank_candidates(candidates, max_articles as usize, OffsetDateTime::now_utc());

		if ranked.is_empty() {
			return Ok(RetrievedContext {
				topic: topic.to_string(),
				context: String::new(),
				sources: Vec::new(),
				article_count: 0,
			});
		}

		let mut blocks = Vec::with_capacity(ranked.len());
		let mut sources = Vec::with_capacity(ranked.len());

		for (position, candidate) in ranked.iter().enumerate() {
			let meta = &candidate.metadata;
			let snippet: String = meta.body.chars().take(ARTICLE_SNIPPET_CHARS).collect();

			blocks.push(format!(
				"Article {number}:\nTitle: {title}\nSource: {source}\nContent: {snippet}...\nURL: {url}",
				number = position + 1,
				title = meta.title,
				source = meta.source,
				url = meta.url,
			));
			sources.push(SourceInfo {
				title: meta.title.clone(),
				source: meta.source.clone(),
				url: meta.url.clone(),
				published_at: meta.published_at.clone(),
				similarity: candidate.similarity,
			});
		}

		let mut context = blocks.join("\n\n---\n\n");

		if context.chars().count() > MAX_CONTEXT_CHARS {
			context = context.chars().take(MAX_CONTEXT_CHARS).collect();
			context.push_str("...");
		}

		Ok(RetrievedContext { topic: topic.to_string(), context, sources, article_count: ranked.len() })
	}

	pub(crate) async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		let embedded = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &[text.to_string()])
			.await?;
		let Some(vector) = embedded.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}
}

fn min_similarity_for(topic: &str) -> f32 {
	if topic.split_whitespace().count() <= 1 {
		MIN_SIMILARITY_BROAD
	} else {
		MIN_SIMILARITY_SPECIFIC
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn similarity_floor_depends_on_topic_breadth() {
		assert_eq!(min_similarity_for("technology"), MIN_SIMILARITY_BROAD);
		assert_eq!(min_similarity_for("climate change policy"), MIN_SIMILARITY_SPECIFIC);
	}
}
