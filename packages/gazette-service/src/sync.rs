use std::collections::HashSet;

use serde::Serialize;

use crate::{GazetteService, Result};
use gazette_storage::{
	index::{self, EntryMetadata, IndexEntry},
	models::ArticleRecord,
};

/// Body text is snapshotted into the index payload at most this long before
/// the ceiling check.
const METADATA_BODY_CHARS: usize = 10_000;

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct SyncReport {
	pub synced: u64,
	pub skipped: u64,
	pub failed: u64,
	pub total: u64,
}

impl GazetteService {
	/// Converges the semantic index to one entry per article with indexable
	/// text. Idempotent: a second run with no new records syncs nothing.
	pub async fn sync_index(&self) -> Result<SyncReport> {
		self.sync_with_options(false).await
	}

	/// Full reindex: every record is re-embedded and re-upserted.
	pub async fn rebuild_index(&self) -> Result<SyncReport> {
		self.sync_with_options(true).await
	}

	async fn sync_with_options(&self, force_reindex: bool) -> Result<SyncReport> {
		let all_ids = self.store.list_ids().await?;
		let total = all_ids.len() as u64;

		if all_ids.is_empty() {
			tracing::warn!("No articles in the store to sync.");

			return Ok(SyncReport::default());
		}

		let indexed = if force_reindex { HashSet::new() } else { self.indexed_ids().await };
		let missing: Vec<String> =
			all_ids.into_iter().filter(|id| !indexed.contains(id)).collect();
		let mut report = SyncReport {
			total,
			skipped: total - missing.len() as u64,
			..SyncReport::default()
		};

		for chunk in missing.chunks(self.cfg.sync.batch_size as usize) {
			let records = self.store.get_many(chunk).await?;

			report.failed += (chunk.len() - records.len()) as u64;
			self.sync_batch(&records, &mut report).await;
		}

		tracing::info!(
			synced = report.synced,
			skipped = report.skipped,
			failed = report.failed,
			total = report.total,
			"Sync complete."
		);

		Ok(report)
	}

	/// Narrow sync path for an explicit id set, used right after ingestion.
	/// The caller passes the exact ids it inserted; records that raced away
	/// in the meantime count as failed.
	pub async fn sync_records(&self, article_ids: &[String]) -> Result<SyncReport> {
		let mut report = SyncReport { total: article_ids.len() as u64, ..SyncReport::default() };

		for chunk in article_ids.chunks(self.cfg.sync.batch_size as usize) {
			let records = self.store.get_many(chunk).await?;

			report.failed += (chunk.len() - records.len()) as u64;
			self.sync_batch(&records, &mut report).await;
		}

		Ok(report)
	}

	/// Embeds and upserts one batch. Failures are counted per item and never
	/// abort the batch.
	async fn sync_batch(&self, records: &[ArticleRecord], report: &mut SyncReport) {
		let mut pending: Vec<(&ArticleRecord, String)> = Vec::with_capacity(records.len());

		for record in records {
			let text = record.indexable_text();

			if text.trim().is_empty() {
				tracing::warn!(article_id = %record.article_id, "Article has no indexable text.");

				report.failed += 1;

				continue;
			}

			pending.push((record, text));
		}

		if pending.is_empty() {
			return;
		}

		let texts: Vec<String> = pending.iter().map(|(_, text)| text.clone()).collect();
		let vectors =
			match self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await {
				Ok(vectors) => vectors,
				Err(err) => {
					tracing::error!(error = %err, count = pending.len(), "Batch embedding failed.");

					report.failed += pending.len() as u64;

					return;
				},
			};

		if vectors.len() != pending.len() {
			tracing::error!(
				expected = pending.len(),
				received = vectors.len(),
				"Embedding provider returned a mismatched vector count."
			);

			report.failed += pending.len() as u64;

			return;
		}

		let dim = self.cfg.storage.qdrant.vector_dim as usize;
		let ceiling = self.cfg.sync.metadata_ceiling_bytes;
		let mut entries = Vec::with_capacity(pending.len());

		for ((record, _), vector) in pending.iter().zip(vectors.into_iter()) {
			if vector.len() != dim {
				tracing::warn!(
					article_id = %record.article_id,
					dim = vector.len(),
					"Embedding dimension mismatch."
				);

				report.failed += 1;

				continue;
			}

			let mut metadata = EntryMetadata {
				title: record.title.clone(),
				source: record.source.clone(),
				url: record.url.clone(),
				published_at: record.published_at.clone().unwrap_or_default(),
				body: record.body.chars().take(METADATA_BODY_CHARS).collect(),
			};

			if !index::enforce_metadata_ceiling(&mut metadata, ceiling) {
				tracing::warn!(
					article_id = %record.article_id,
					"Metadata snapshot still exceeds the ceiling after shrink."
				);
			}

			entries.push(IndexEntry { article_id: record.article_id.clone(), vector, metadata });
		}

		if entries.is_empty() {
			return;
		}

		if let Err(err) = self.index.upsert_batch(&entries).await {
			tracing::error!(error = %err, count = entries.len(), "Index upsert failed.");

			report.failed += entries.len() as u64;

			return;
		}

		let model_tag = crate::embedding_model_tag(&self.cfg);

		for entry in &entries {
			match self
				.store
				.update_embedding(&entry.article_id, &entry.vector, &model_tag)
				.await
			{
				Ok(()) => report.synced += 1,
				Err(err) => {
					tracing::warn!(
						error = %err,
						article_id = %entry.article_id,
						"Failed to record the embedding on the article."
					);

					report.failed += 1;
				},
			}
		}
	}

	/// Bulk peek of the ids already indexed. A failed peek degrades to an
	/// empty set: the sync then re-upserts, which is wasted work but not
	/// corruption, since upserts are keyed by id.
	async fn indexed_ids(&self) -> HashSet<String> {
		let count = match self.index.count().await {
			Ok(count) => count,
			Err(err) => {
				tracing::warn!(error = %err, "Could not count indexed entries.");

				return HashSet::new();
			},
		};

		if count == 0 {
			return HashSet::new();
		}

		match self.index.ids(count as usize).await {
			Ok(ids) => ids,
			Err(err) => {
				tracing::warn!(error = %err, "Could not peek indexed ids.");

				HashSet::new()
			},
		}
	}
}
