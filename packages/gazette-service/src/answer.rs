use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::{GazetteService, Result, SourceInfo, SummarizeRequest, SummaryStyle};
use gazette_domain::{
	freshness::{self, FreshnessVerdict},
	topic,
};
use gazette_providers::newswire::FetchedArticle;
use gazette_storage::models::NewArticle;

const NO_ARTICLES_MESSAGE: &str =
	"No relevant articles found for this topic. Try a different query or check back later.";

#[derive(Clone, Debug)]
pub struct AnswerRequest {
	pub query: String,
	pub max_articles: u32,
	pub summary_words: u32,
	pub style: SummaryStyle,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnswerResponse {
	pub summary: Option<String>,
	pub sources: Vec<SourceInfo>,
	pub articles_used: usize,
	pub newly_fetched: usize,
	pub cached: bool,
	pub topic: String,
	pub freshness: FreshnessVerdict,
	/// Set when no summary could be produced; the response is still a
	/// structured result, never an error.
	pub message: Option<String>,
}

impl GazetteService {
	/// End-to-end query handling: resolve the topic, decide whether cached
	/// knowledge suffices, refetch and sync if not, then summarize.
	pub async fn process_query(&self, request: AnswerRequest) -> Result<AnswerResponse> {
		let topic = topic::resolve(&request.query);

		tracing::info!(query = %request.query, %topic, "Processing query.");

		// Headroom for freshness filtering: retrieve twice the article count.
		let head_k = request.max_articles * 2;
		let mut candidates = self.retrieve_for_query(&topic, head_k, None, 0.0).await?;

		// An empty index may just be out of step with the store; converge
		// once and retry before treating the topic as unknown.
		if candidates.is_empty() {
			match self.sync_index().await {
				Ok(report) if report.synced > 0 => {
					tracing::info!(synced = report.synced, "Synced store to index; re-querying.");

					candidates = self.retrieve_for_query(&topic, head_k, None, 0.0).await?;
				},
				Ok(_) => {},
				Err(err) => {
					tracing::error!(error = %err, "Store-to-index sync failed.");
				},
			}
		}

		let now = OffsetDateTime::now_utc();
		let published: Vec<Option<&str>> =
			candidates.iter().map(|candidate| candidate.published_at()).collect();
		let verdict = freshness::evaluate(&self.cfg.freshness, &published, now);
		let mut newly_fetched = 0;

		if verdict.needs_refetch() {
			tracing::info!(reason = %verdict.reason, "Refetching articles.");

			match self.refetch(&topic).await {
				Ok(count) => newly_fetched = count,
				Err(err) => {
					// Serve whatever we already have; a refetch failure must
					// not take down the query.
					tracing::error!(error = %err, "Refetch failed; serving existing candidates.");
				},
			}
		}

		let summarized = match self
			.summarize_topic(SummarizeRequest {
				topic: topic.clone(),
				max_articles: request.max_articles,
				summary_words: request.summary_words,
				style: request.style,
			})
			.await
		{
			Ok(summarized) => summarized,
			Err(err) => {
				tracing::error!(error = %err, "Summary generation failed.");

				return Ok(AnswerResponse {
					summary: None,
					sources: Vec::new(),
					articles_used: 0,
					newly_fetched,
					cached: newly_fetched == 0,
					topic,
					freshness: verdict,
					message: Some(format!("Error generating summary: {err}")),
				});
			},
		};

		if summarized.summary.is_none() {
			return Ok(AnswerResponse {
				summary: None,
				sources: Vec::new(),
				articles_used: summarized.article_count,
				newly_fetched,
				cached: newly_fetched == 0,
				topic,
				freshness: verdict,
				message: Some(NO_ARTICLES_MESSAGE.to_string()),
			});
		}

		Ok(AnswerResponse {
			summary: summarized.summary,
			sources: summarized.sources,
			articles_used: summarized.article_count,
			newly_fetched,
			cached: newly_fetched == 0,
			topic,
			freshness: verdict,
			message: None,
		})
	}

	/// Fetches fresh articles for the topic, inserts them, and syncs exactly
	/// the inserted ids into the index. Returns how many were new.
	async fn refetch(&self, topic: &str) -> Result<usize> {
		let to = OffsetDateTime::now_utc();
		let from = to - Duration::days(self.cfg.freshness.fetch_lookback_days);
		let fetched = self
			.providers
			.newswire
			.fetch(&self.cfg.providers.newswire, topic, from, to)
			.await?;
		let articles: Vec<NewArticle> =
			fetched.into_iter().map(|article| to_new_article(article, to)).collect();
		let report = self.store.insert_batch(&articles).await?;

		tracing::info!(
			inserted = report.inserted.len(),
			duplicates = report.duplicates,
			"Ingested newswire articles."
		);

		if !report.inserted.is_empty() {
			let sync = self.sync_records(&report.inserted).await?;

			tracing::info!(synced = sync.synced, failed = sync.failed, "Indexed new articles.");
		}

		Ok(report.inserted.len())
	}
}

fn to_new_article(article: FetchedArticle, fetched_at: OffsetDateTime) -> NewArticle {
	NewArticle {
		title: article.title,
		description: article.description,
		body: article.body,
		url: article.url,
		source: article.source,
		author: article.author,
		published_at: article.published_at,
		fetched_at,
	}
}
