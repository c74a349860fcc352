use time::macros::datetime;

use gazette_storage::{
	models::{InsertOutcome, NewArticle},
	store::ArticleStore,
};

fn article(url: &str, source: &str) -> NewArticle {
	NewArticle {
		title: format!("Title for {url}"),
		description: "A description".to_string(),
		body: "Body text".to_string(),
		url: url.to_string(),
		source: source.to_string(),
		author: "Reporter".to_string(),
		published_at: Some("2026-01-08T09:00:00Z".to_string()),
		fetched_at: datetime!(2026-01-08 12:00:00 UTC),
	}
}

async fn memory_store() -> ArticleStore {
	let store =
		ArticleStore::connect_sqlite("sqlite::memory:").await.expect("Failed to open sqlite.");

	store.ensure_schema().await.expect("Failed to apply schema.");

	store
}

#[tokio::test]
async fn insert_get_and_delete_round_trip() {
	let store = memory_store().await;
	let outcome = store.insert(&article("https://example.com/a", "Example")).await.unwrap();
	let InsertOutcome::Inserted(id) = outcome else {
		panic!("First insert must succeed.");
	};

	let fetched = store.get(&id).await.unwrap().expect("Inserted article must be readable.");

	assert_eq!(fetched.url, "https://example.com/a");
	assert_eq!(fetched.source, "Example");
	assert!(fetched.embedding.is_none());

	let by_url = store.get_by_url("https://example.com/a").await.unwrap();

	assert!(by_url.is_some());
	assert!(store.delete(&id).await.unwrap());
	assert!(store.get(&id).await.unwrap().is_none());
	assert!(!store.delete(&id).await.unwrap());
}

#[tokio::test]
async fn duplicate_url_is_reported_not_inserted() {
	let store = memory_store().await;

	let first = store.insert(&article("https://example.com/a", "Example")).await.unwrap();
	let second = store.insert(&article("https://example.com/a", "Example")).await.unwrap();

	assert!(matches!(first, InsertOutcome::Inserted(_)));
	assert_eq!(second, InsertOutcome::Duplicate);
	assert_eq!(store.stats().await.unwrap().total, 1);
}

#[tokio::test]
async fn batch_insert_reports_exact_inserted_ids() {
	let store = memory_store().await;
	let batch = vec![
		article("https://example.com/a", "Example"),
		article("https://example.com/b", "Example"),
		article("https://example.com/a", "Example"),
	];
	let report = store.insert_batch(&batch).await.unwrap();

	assert_eq!(report.inserted.len(), 2);
	assert_eq!(report.duplicates, 1);

	let fetched = store.get_many(&report.inserted).await.unwrap();

	assert_eq!(fetched.len(), 2);
}

#[tokio::test]
async fn rejects_articles_without_a_url() {
	let store = memory_store().await;
	let result = store.insert(&article("  ", "Example")).await;

	assert!(matches!(result, Err(gazette_storage::Error::InvalidArgument(_))));
}

#[tokio::test]
async fn update_embedding_writes_vector_and_model_tag() {
	let store = memory_store().await;
	let InsertOutcome::Inserted(id) =
		store.insert(&article("https://example.com/a", "Example")).await.unwrap()
	else {
		panic!("First insert must succeed.");
	};

	store.update_embedding(&id, &[0.1, 0.2, 0.3], "embed-model").await.unwrap();

	let fetched = store.get(&id).await.unwrap().unwrap();

	assert_eq!(fetched.embedding_vector(), Some(vec![0.1, 0.2, 0.3]));
	assert_eq!(fetched.embedding_model.as_deref(), Some("embed-model"));

	let stats = store.stats().await.unwrap();

	assert_eq!(stats.with_embedding, 1);

	let missing = store.update_embedding("no-such-id", &[0.1], "embed-model").await;

	assert!(matches!(missing, Err(gazette_storage::Error::NotFound(_))));
}

#[tokio::test]
async fn stats_group_by_source() {
	let store = memory_store().await;

	store.insert(&article("https://example.com/a", "Alpha")).await.unwrap();
	store.insert(&article("https://example.com/b", "Alpha")).await.unwrap();
	store.insert(&article("https://example.com/c", "Beta")).await.unwrap();

	let stats = store.stats().await.unwrap();

	assert_eq!(stats.total, 3);
	assert_eq!(stats.by_source[0].source, "Alpha");
	assert_eq!(stats.by_source[0].count, 2);

	let alpha = store.list_by_source("Alpha", None).await.unwrap();

	assert_eq!(alpha.len(), 2);
	assert_eq!(store.list_ids().await.unwrap().len(), 3);
}
