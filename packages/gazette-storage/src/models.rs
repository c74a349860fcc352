use time::OffsetDateTime;
use uuid::Uuid;

/// Marker appended by some newswire feeds when body text was cut server-side,
/// e.g. `... politics [+2841 chars]`.
pub const TRUNCATION_MARKER: &str = "[+";

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ArticleRecord {
	pub article_id: String,
	pub title: String,
	pub description: String,
	pub body: String,
	pub url: String,
	pub source: String,
	pub author: String,
	pub published_at: Option<String>,
	pub fetched_at: OffsetDateTime,
	pub embedding: Option<Vec<u8>>,
	pub embedding_model: Option<String>,
}
impl ArticleRecord {
	pub fn embedding_vector(&self) -> Option<Vec<f32>> {
		self.embedding.as_deref().map(decode_embedding)
	}

	/// Text used for embedding and indexing: title, description, and body,
	/// with any upstream truncation marker dropped from the body.
	pub fn indexable_text(&self) -> String {
		let mut parts = Vec::new();

		for part in [self.title.as_str(), self.description.as_str()] {
			if !part.trim().is_empty() {
				parts.push(part.trim().to_string());
			}
		}

		let body = match self.body.find(TRUNCATION_MARKER) {
			Some(at) => self.body[..at].trim(),
			None => self.body.trim(),
		};

		if !body.is_empty() {
			parts.push(body.to_string());
		}

		parts.join(" ")
	}
}

#[derive(Clone, Debug)]
pub struct NewArticle {
	pub title: String,
	pub description: String,
	pub body: String,
	pub url: String,
	pub source: String,
	pub author: String,
	pub published_at: Option<String>,
	pub fetched_at: OffsetDateTime,
}
impl NewArticle {
	/// Article identity is the URL; the id is derived from it so re-ingesting
	/// the same article always lands on the same key.
	pub fn article_id(&self) -> String {
		Uuid::new_v5(&Uuid::NAMESPACE_URL, self.url.as_bytes()).to_string()
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InsertOutcome {
	Inserted(String),
	/// The url already exists. Not an error; reported distinctly from success.
	Duplicate,
}

#[derive(Clone, Debug, Default)]
pub struct BatchInsertReport {
	pub inserted: Vec<String>,
	pub duplicates: u64,
}

#[derive(Clone, Debug)]
pub struct SourceCount {
	pub source: String,
	pub count: i64,
}

#[derive(Clone, Debug)]
pub struct StoreStats {
	pub total: i64,
	pub with_embedding: i64,
	pub by_source: Vec<SourceCount>,
}

pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
	let mut out = Vec::with_capacity(vector.len() * 4);

	for value in vector {
		out.extend_from_slice(&value.to_le_bytes());
	}

	out
}

pub fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
	bytes
		.chunks_exact(4)
		.map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
		.collect()
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn record(title: &str, description: &str, body: &str) -> ArticleRecord {
		ArticleRecord {
			article_id: "id".to_string(),
			title: title.to_string(),
			description: description.to_string(),
			body: body.to_string(),
			url: "https://example.com/a".to_string(),
			source: "Example".to_string(),
			author: "".to_string(),
			published_at: None,
			fetched_at: datetime!(2026-01-08 12:00:00 UTC),
			embedding: None,
			embedding_model: None,
		}
	}

	#[test]
	fn embedding_bytes_round_trip() {
		let vector = vec![0.25_f32, -1.5, 3.0];

		assert_eq!(decode_embedding(&encode_embedding(&vector)), vector);
	}

	#[test]
	fn indexable_text_drops_the_truncation_marker() {
		let record = record("Title", "Desc", "Body text here [+2841 chars]");

		assert_eq!(record.indexable_text(), "Title Desc Body text here");
	}

	#[test]
	fn indexable_text_skips_empty_parts() {
		let record = record("Title", "  ", "");

		assert_eq!(record.indexable_text(), "Title");
	}

	#[test]
	fn article_id_is_stable_per_url() {
		let article = NewArticle {
			title: "t".to_string(),
			description: "".to_string(),
			body: "".to_string(),
			url: "https://example.com/a".to_string(),
			source: "".to_string(),
			author: "".to_string(),
			published_at: None,
			fetched_at: datetime!(2026-01-08 12:00:00 UTC),
		};

		assert_eq!(article.article_id(), article.article_id());
	}
}
