use std::collections::HashSet;

use serde::Serialize;

/// Ideal bands for the quality assessment. Values inside a band earn full
/// credit; the adjacent band earns partial credit; everything else earns the
/// minimum.
pub const IDEAL_COMPRESSION: (f64, f64) = (0.2, 0.4);
pub const IDEAL_READABILITY: (f64, f64) = (60.0, 80.0);
pub const IDEAL_LEXICAL_DIVERSITY: (f64, f64) = (0.6, 0.8);
pub const IDEAL_INFORMATION_DENSITY: (f64, f64) = (0.3, 0.6);
pub const MIN_COHERENCE: f64 = 0.3;

const FULL_CREDIT: u8 = 20;
const PARTIAL_CREDIT: u8 = 15;
const MIN_CREDIT: u8 = 10;

const KEY_TERM_MIN_CHARS: usize = 5;

const STOP_WORDS: &[&str] = &[
	"the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
	"are", "was", "were",
];

const CONNECTIVES: &[&str] = &[
	"however",
	"therefore",
	"moreover",
	"furthermore",
	"additionally",
	"consequently",
	"meanwhile",
	"nevertheless",
	"thus",
	"hence",
	"also",
	"besides",
	"indeed",
	"in addition",
	"for example",
	"similarly",
	"likewise",
	"in contrast",
	"on the other hand",
	"as a result",
	"in fact",
	"specifically",
	"particularly",
];

#[derive(Clone, Debug, Serialize)]
pub struct SummaryMetrics {
	pub compression_ratio: f64,
	pub flesch_reading_ease: f64,
	pub avg_sentence_length: f64,
	pub avg_syllables_per_word: f64,
	pub lexical_diversity: f64,
	pub information_density: f64,
	pub coherence: f64,
	pub summary_words: usize,
	pub source_words: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLabel {
	Excellent,
	Good,
	Fair,
	NeedsImprovement,
}
impl QualityLabel {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Excellent => "excellent",
			Self::Good => "good",
			Self::Fair => "fair",
			Self::NeedsImprovement => "needs improvement",
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct QualityAssessment {
	pub score: u8,
	pub label: QualityLabel,
	pub recommendations: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ValidationReport {
	pub metrics: SummaryMetrics,
	pub quality: QualityAssessment,
}

/// Computes all sub-metrics and the banded quality assessment. Deterministic:
/// identical input always yields identical output.
pub fn evaluate_summary(summary: &str, source: &str) -> ValidationReport {
	let metrics = compute_metrics(summary, source);
	let quality = assess_quality(&metrics);

	ValidationReport { metrics, quality }
}

pub fn compute_metrics(summary: &str, source: &str) -> SummaryMetrics {
	let summary_words = summary.split_whitespace().count();
	let source_words = source.split_whitespace().count();
	let (flesch, avg_sentence_length, avg_syllables_per_word) = readability(summary);

	SummaryMetrics {
		compression_ratio: compression_ratio(summary_words, source_words),
		flesch_reading_ease: flesch,
		avg_sentence_length,
		avg_syllables_per_word,
		lexical_diversity: lexical_diversity(summary),
		information_density: information_density(summary, source),
		coherence: coherence(summary),
		summary_words,
		source_words,
	}
}

pub fn assess_quality(metrics: &SummaryMetrics) -> QualityAssessment {
	let mut score = 0_u8;
	let mut recommendations = Vec::new();

	let compression = metrics.compression_ratio;

	if (IDEAL_COMPRESSION.0..=IDEAL_COMPRESSION.1).contains(&compression) {
		score += FULL_CREDIT;
	} else if (0.1..IDEAL_COMPRESSION.0).contains(&compression)
		|| (compression > IDEAL_COMPRESSION.1 && compression <= 0.5)
	{
		score += PARTIAL_CREDIT;
		recommendations
			.push("COMPRESSION: Consider adjusting summary length. Ideal: 20-40%".to_string());
	} else {
		score += MIN_CREDIT;
		recommendations
			.push("COMPRESSION: Summary length may not be optimal. Ideal: 20-40%".to_string());
	}

	let flesch = metrics.flesch_reading_ease;

	if (IDEAL_READABILITY.0..=IDEAL_READABILITY.1).contains(&flesch) {
		score += FULL_CREDIT;
	} else if (50.0..IDEAL_READABILITY.0).contains(&flesch)
		|| (flesch > IDEAL_READABILITY.1 && flesch <= 90.0)
	{
		score += PARTIAL_CREDIT;
		recommendations
			.push("READABILITY: Slightly outside the ideal range. Ideal: 60-80".to_string());
	} else {
		score += MIN_CREDIT;

		if flesch < 50.0 {
			recommendations
				.push("READABILITY: Summary may be too complex. Ideal: 60-80".to_string());
		} else {
			recommendations.push("READABILITY: Summary may be too simple. Ideal: 60-80".to_string());
		}
	}

	let diversity = metrics.lexical_diversity;

	if (IDEAL_LEXICAL_DIVERSITY.0..=IDEAL_LEXICAL_DIVERSITY.1).contains(&diversity) {
		score += FULL_CREDIT;
	} else if (0.5..IDEAL_LEXICAL_DIVERSITY.0).contains(&diversity)
		|| (diversity > IDEAL_LEXICAL_DIVERSITY.1 && diversity <= 0.9)
	{
		score += PARTIAL_CREDIT;
		recommendations
			.push("LEXICAL DIVERSITY: Slightly outside the ideal range. Ideal: 60-80%".to_string());
	} else {
		score += MIN_CREDIT;

		if diversity < 0.5 {
			recommendations.push(
				"LEXICAL DIVERSITY: Consider using more varied vocabulary. Ideal: 60-80%"
					.to_string(),
			);
		} else {
			recommendations.push(
				"LEXICAL DIVERSITY: Vocabulary may be too varied for a summary. Ideal: 60-80%"
					.to_string(),
			);
		}
	}

	let density = metrics.information_density;

	if (IDEAL_INFORMATION_DENSITY.0..=IDEAL_INFORMATION_DENSITY.1).contains(&density) {
		score += FULL_CREDIT;
	} else if (0.2..IDEAL_INFORMATION_DENSITY.0).contains(&density)
		|| (density > IDEAL_INFORMATION_DENSITY.1 && density <= 0.7)
	{
		score += PARTIAL_CREDIT;
		recommendations.push(
			"INFORMATION DENSITY: Slightly outside the ideal range. Ideal: 30-60%".to_string(),
		);
	} else {
		score += MIN_CREDIT;

		if density < 0.2 {
			recommendations.push(
				"INFORMATION DENSITY: Summary may be missing key information. Ideal: 30-60%"
					.to_string(),
			);
		} else {
			recommendations.push(
				"INFORMATION DENSITY: Summary may copy too much source text. Ideal: 30-60%"
					.to_string(),
			);
		}
	}

	let coherence = metrics.coherence;

	if coherence >= MIN_COHERENCE {
		score += FULL_CREDIT;
	} else if coherence >= 0.2 {
		score += PARTIAL_CREDIT;
		recommendations
			.push("COHERENCE: Consider improving summary coherence. Ideal: > 30%".to_string());
	} else {
		score += MIN_CREDIT;
		recommendations
			.push("COHERENCE: Consider improving summary coherence. Ideal: > 30%".to_string());
	}

	let label = if score >= 85 {
		QualityLabel::Excellent
	} else if score >= 70 {
		QualityLabel::Good
	} else if score >= 55 {
		QualityLabel::Fair
	} else {
		QualityLabel::NeedsImprovement
	};

	if recommendations.is_empty() {
		recommendations.push("QUALITY: Summary quality is good overall.".to_string());
	}

	QualityAssessment { score, label, recommendations }
}

pub fn compression_ratio(summary_words: usize, source_words: usize) -> f64 {
	if source_words == 0 {
		return 0.0;
	}

	summary_words as f64 / source_words as f64
}

/// Flesch Reading Ease with syllables estimated by a vowel-group heuristic.
/// Returns (clamped score, average sentence length, average syllables per
/// word).
pub fn readability(text: &str) -> (f64, f64, f64) {
	let sentences = split_sentences(text);
	let words: Vec<&str> = text.split_whitespace().collect();

	if sentences.is_empty() || words.is_empty() {
		return (0.0, 0.0, 0.0);
	}

	let syllables: usize = words.iter().map(|word| count_syllables(word)).sum();
	let avg_sentence_length = words.len() as f64 / sentences.len() as f64;
	let avg_syllables_per_word = syllables as f64 / words.len() as f64;
	let flesch = 206.835 - 1.015 * avg_sentence_length - 84.6 * avg_syllables_per_word;

	(flesch.clamp(0.0, 100.0), avg_sentence_length, avg_syllables_per_word)
}

pub fn lexical_diversity(text: &str) -> f64 {
	let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();

	if words.is_empty() {
		return 0.0;
	}

	let unique: HashSet<&str> = words.iter().map(String::as_str).collect();

	unique.len() as f64 / words.len() as f64
}

/// Share of the source's key terms (alphabetic words longer than five
/// characters) that survive into the summary.
pub fn information_density(summary: &str, source: &str) -> f64 {
	let summary_terms = key_terms(summary);
	let source_terms = key_terms(source);

	if source_terms.is_empty() {
		return 0.0;
	}

	let overlap = summary_terms.intersection(&source_terms).count();

	overlap as f64 / source_terms.len() as f64
}

/// Word-overlap coherence blended with a discourse-connective rate: 70%
/// mean Jaccard overlap of consecutive sentences (stop words removed), 30%
/// connective count normalized against one connective per two sentences.
pub fn coherence(text: &str) -> f64 {
	let sentences = split_sentences(text);
	let count = sentences.len();

	if count <= 1 {
		return 1.0;
	}

	let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
	let mut overlap_scores = Vec::new();

	for pair in sentences.windows(2) {
		let first = content_words(pair[0], &stop_words);
		let second = content_words(pair[1], &stop_words);

		if first.is_empty() || second.is_empty() {
			continue;
		}

		let intersection = first.intersection(&second).count();
		let union = first.union(&second).count();

		if union > 0 {
			overlap_scores.push(intersection as f64 / union as f64);
		}
	}

	let overlap_score = if overlap_scores.is_empty() {
		0.0
	} else {
		overlap_scores.iter().sum::<f64>() / overlap_scores.len() as f64
	};
	let lowered = text.to_lowercase();
	let connective_count =
		CONNECTIVES.iter().filter(|connective| lowered.contains(**connective)).count();
	let target_rate = (count as f64 / 2.0).max(1.0);
	let connective_score = (connective_count as f64 / target_rate).min(1.0);

	0.7 * overlap_score + 0.3 * connective_score
}

pub fn split_sentences(text: &str) -> Vec<&str> {
	text.split(['.', '!', '?'])
		.map(str::trim)
		.filter(|sentence| !sentence.is_empty())
		.collect()
}

/// Vowel-group syllable estimate with a silent trailing-`e` correction.
/// Never returns less than one.
pub fn count_syllables(word: &str) -> usize {
	let lowered = word.to_lowercase();
	let mut count = 0_usize;
	let mut previous_was_vowel = false;

	for ch in lowered.chars() {
		let is_vowel = matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

		if is_vowel && !previous_was_vowel {
			count += 1;
		}

		previous_was_vowel = is_vowel;
	}

	if lowered.ends_with('e') {
		count = count.saturating_sub(1);
	}

	count.max(1)
}

fn key_terms(text: &str) -> HashSet<String> {
	text.split_whitespace()
		.filter(|word| word.chars().count() > KEY_TERM_MIN_CHARS)
		.filter(|word| word.chars().all(char::is_alphabetic))
		.map(str::to_lowercase)
		.collect()
}

fn content_words<'a>(sentence: &'a str, stop_words: &HashSet<&str>) -> HashSet<String> {
	sentence
		.split_whitespace()
		.map(str::to_lowercase)
		.filter(|word| !stop_words.contains(word.as_str()))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn syllable_estimates() {
		assert_eq!(count_syllables("cat"), 1);
		assert_eq!(count_syllables("hello"), 2);
		assert_eq!(count_syllables("rhythm"), 1);
		// Silent trailing e: "table" counts the vowel groups a/e, minus one.
		assert_eq!(count_syllables("table"), 1);
		assert_eq!(count_syllables("e"), 1);
	}

	#[test]
	fn single_sentence_is_fully_coherent() {
		assert_eq!(coherence("Markets rallied on the news"), 1.0);
	}

	#[test]
	fn sentence_splitting_collapses_repeated_punctuation() {
		let sentences = split_sentences("One. Two!! Three?  ");

		assert_eq!(sentences, vec!["One", "Two", "Three"]);
	}

	#[test]
	fn empty_source_yields_zero_density_and_compression() {
		assert_eq!(compression_ratio(10, 0), 0.0);
		assert_eq!(information_density("longerwords here", ""), 0.0);
	}
}
