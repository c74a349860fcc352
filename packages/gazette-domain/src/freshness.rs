use serde::Serialize;
use time::OffsetDateTime;

use crate::dates;
use gazette_config::Freshness as FreshnessConfig;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessState {
	Empty,
	Insufficient,
	Stale,
	Fresh,
	Indeterminate,
}

#[derive(Clone, Debug, Serialize)]
pub struct FreshnessVerdict {
	pub state: FreshnessState,
	pub reason: String,
}
impl FreshnessVerdict {
	pub fn needs_refetch(&self) -> bool {
		matches!(
			self.state,
			FreshnessState::Empty | FreshnessState::Insufficient | FreshnessState::Stale
		)
	}
}

/// Classifies a candidate set as fresh enough to serve or in need of a
/// refetch. `published` carries one entry per candidate: the raw publish
/// timestamp, if the candidate has one.
///
/// Candidates whose freshness cannot be determined are served from cache
/// rather than refetched; malformed feed data must not trigger refetch
/// storms. An individual unparsable timestamp falls back to `now` when
/// computing the most recent publish time, so one bad date never marks an
/// otherwise fresh set stale.
pub fn evaluate(
	cfg: &FreshnessConfig,
	published: &[Option<&str>],
	now: OffsetDateTime,
) -> FreshnessVerdict {
	let count = published.len();

	if count == 0 {
		return FreshnessVerdict {
			state: FreshnessState::Empty,
			reason: "No existing articles found.".to_string(),
		};
	}
	if count < cfg.min_articles as usize {
		return FreshnessVerdict {
			state: FreshnessState::Insufficient,
			reason: format!("Only {count} articles found (need {}).", cfg.min_articles),
		};
	}

	let dated: Vec<&str> =
		published.iter().flatten().map(|raw| raw.trim()).filter(|raw| !raw.is_empty()).collect();

	if dated.is_empty() {
		return FreshnessVerdict {
			state: FreshnessState::Indeterminate,
			reason: "No candidates carry a publish date.".to_string(),
		};
	}
	if !dated.iter().any(|raw| dates::parse_published(raw).is_some()) {
		return FreshnessVerdict {
			state: FreshnessState::Indeterminate,
			reason: "Candidate publish dates could not be parsed.".to_string(),
		};
	}

	let latest = dated
		.iter()
		.map(|raw| dates::parse_published(raw).unwrap_or(now))
		.max()
		.unwrap_or(now);
	let age_hours = dates::age_hours(latest, now);

	if age_hours > cfg.max_article_age_hours {
		return FreshnessVerdict {
			state: FreshnessState::Stale,
			reason: format!(
				"Latest article is {age_hours:.1} hours old (threshold: {}h).",
				cfg.max_article_age_hours
			),
		};
	}

	FreshnessVerdict {
		state: FreshnessState::Fresh,
		reason: "Existing articles are fresh and sufficient.".to_string(),
	}
}
