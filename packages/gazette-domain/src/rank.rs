use std::cmp::Ordering;

use time::OffsetDateTime;

use crate::dates;
use gazette_config::Ranking as RankingConfig;

/// Linear recency decay over the configured window: 1.0 at publish time,
/// 0.0 once the window has elapsed. Missing or unparsable dates score 0.0,
/// which penalizes undated candidates without excluding them.
pub fn freshness_decay(
	cfg: &RankingConfig,
	published_at: Option<&str>,
	now: OffsetDateTime,
) -> f32 {
	let Some(parsed) = published_at.and_then(dates::parse_published) else {
		return 0.0;
	};
	let age_hours = dates::age_hours(parsed, now);

	(1.0 - age_hours / cfg.decay_window_hours).max(0.0) as f32
}

pub fn composite(cfg: &RankingConfig, similarity: f32, decay: f32) -> f32 {
	cfg.similarity_weight * similarity + cfg.freshness_weight * decay
}

/// Stable argsort descending, truncated to `count`. Ties keep their original
/// relative order, so the upstream similarity ranking is the tie-break.
pub fn rank_top(scores: &[f32], count: usize) -> Vec<usize> {
	let mut order: Vec<usize> = (0..scores.len()).collect();

	order.sort_by(|&a, &b| cmp_f32_desc(scores[a], scores[b]));
	order.truncate(count);

	order
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
