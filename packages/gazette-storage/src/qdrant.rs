use std::collections::{HashMap, HashSet};

use qdrant_client::{
	client::Payload,
	qdrant::{
		Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance,
		Filter, PointId, PointStruct, Query, QueryPointsBuilder, ScrollPointsBuilder,
		UpsertPointsBuilder, Value, VectorParamsBuilder, point_id::PointIdOptions, value::Kind,
	},
};

use crate::{
	BoxFuture, Result,
	index::{EntryMetadata, IndexEntry, IndexHit, SemanticIndex},
};

const SCROLL_PAGE: u32 = 1_000;

pub struct QdrantIndex {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantIndex {
	pub fn new(cfg: &gazette_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the cosine collection if it does not exist yet.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		let builder = CreateCollectionBuilder::new(self.collection.clone())
			.vectors_config(VectorParamsBuilder::new(u64::from(self.vector_dim), Distance::Cosine));

		self.client.create_collection(builder).await?;

		Ok(())
	}
}
impl SemanticIndex for QdrantIndex {
	fn upsert_batch<'a>(&'a self, entries: &'a [IndexEntry]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			if entries.is_empty() {
				return Ok(());
			}

			let mut points = Vec::with_capacity(entries.len());

			for entry in entries {
				let mut payload = Payload::new();

				payload.insert("title", entry.metadata.title.clone());
				payload.insert("source", entry.metadata.source.clone());
				payload.insert("url", entry.metadata.url.clone());
				payload.insert("published_at", entry.metadata.published_at.clone());
				payload.insert("body", entry.metadata.body.clone());

				points.push(PointStruct::new(
					entry.article_id.clone(),
					entry.vector.clone(),
					payload,
				));
			}

			self.client
				.upsert_points(UpsertPointsBuilder::new(self.collection.clone(), points).wait(true))
				.await?;

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
			let mut builder = QueryPointsBuilder::new(self.collection.clone())
				.query(Query::new_nearest(vector.to_vec()))
				.limit(u64::from(top_k))
				.with_payload(true);

			if let Some(source) = source {
				builder =
					builder.filter(Filter::must([Condition::matches("source", source.to_string())]));
			}

			let response = self.client.query(builder).await?;
			let mut out = Vec::with_capacity(response.result.len());

			for point in response.result {
				let Some(article_id) = point.id.as_ref().and_then(point_id_string) else {
					continue;
				};

				out.push(IndexHit {
					article_id,
					similarity: point.score.clamp(0.0, 1.0),
					metadata: metadata_from_payload(&point.payload),
				});
			}

			Ok(out)
		})
	}

	fn ids(&self, limit: usize) -> BoxFuture<'_, Result<HashSet<String>>> {
		Box::pin(async move {
			let mut out = HashSet::new();
			let mut offset: Option<PointId> = None;

			loop {
				let mut scroll = ScrollPointsBuilder::new(self.collection.clone())
					.limit(SCROLL_PAGE)
					.with_payload(false)
					.with_vectors(false);

				if let Some(position) = offset.take() {
					scroll = scroll.offset(position);
				}

				let response = self.client.scroll(scroll).await?;

				for point in response.result {
					if let Some(id) = point.id.as_ref().and_then(point_id_string) {
						out.insert(id);
					}
				}

				if out.len() >= limit {
					break;
				}

				match response.next_page_offset {
					Some(next) => offset = Some(next),
					None => break,
				}
			}

			Ok(out)
		})
	}

	fn delete<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			if ids.is_empty() {
				return Ok(());
			}

			let points: Vec<PointId> = ids.iter().map(|id| PointId::from(id.clone())).collect();

			self.client
				.delete_points(
					DeletePointsBuilder::new(self.collection.clone()).points(points).wait(true),
				)
				.await?;

			Ok(())
		})
	}

	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let response = self
				.client
				.count(CountPointsBuilder::new(self.collection.clone()).exact(true))
				.await?;

			Ok(response.result.map(|result| result.count).unwrap_or(0))
		})
	}
}

fn point_id_string(point_id: &PointId) -> Option<String> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Some(id.clone()),
		Some(PointIdOptions::Num(id)) => Some(id.to_string()),
		None => None,
	}
}

fn metadata_from_payload(payload: &HashMap<String, Value>) -> EntryMetadata {
	EntryMetadata {
		title: payload_string(payload, "title"),
		source: payload_string(payload, "source"),
		url: payload_string(payload, "url"),
		published_at: payload_string(payload, "published_at"),
		body: payload_string(payload, "body"),
	}
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> String {
	let Some(value) = payload.get(key) else {
		return String::new();
	};

	match &value.kind {
		Some(Kind::StringValue(text)) => text.clone(),
		_ => String::new(),
	}
}
