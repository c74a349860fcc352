use serde::Serialize;

use crate::{GazetteService, Result};
use gazette_storage::models::StoreStats;

#[derive(Debug, Serialize)]
pub struct StatusReport {
	pub store_total: i64,
	pub store_with_embedding: i64,
	pub articles_by_source: Vec<(String, i64)>,
	pub index_count: u64,
	pub in_sync: bool,
	pub difference: i64,
}

impl GazetteService {
	/// Snapshot of both stores and whether they have converged.
	pub async fn status(&self) -> Result<StatusReport> {
		let StoreStats { total, with_embedding, by_source } = self.store.stats().await?;
		let index_count = self.index.count().await?;
		let difference = total - index_count as i64;

		Ok(StatusReport {
			store_total: total,
			store_with_embedding: with_embedding,
			articles_by_source: by_source
				.into_iter()
				.map(|entry| (entry.source, entry.count))
				.collect(),
			index_count,
			in_sync: difference == 0,
			difference,
		})
	}

	/// Deletes a record and, in the same operation, its index entry. The
	/// index delete runs even when the record was already gone, so a
	/// half-deleted pair converges on retry.
	pub async fn delete_article(&self, article_id: &str) -> Result<bool> {
		let deleted = self.store.delete(article_id).await?;

		self.index.delete(&[article_id.to_string()]).await?;

		if deleted {
			tracing::info!(article_id, "Deleted article and its index entry.");
		}

		Ok(deleted)
	}
}
