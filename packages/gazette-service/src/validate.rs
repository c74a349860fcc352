use serde::Serialize;

use crate::{GazetteService, Result, SourceInfo, SummarizeRequest, SummaryStyle, fidelity::FidelityReport};
use gazette_domain::metrics::{self, ValidationReport};

#[derive(Clone, Debug, Serialize)]
pub struct Evaluation {
	pub report: ValidationReport,
	pub fidelity: Option<FidelityReport>,
}

#[derive(Clone, Debug)]
pub struct TopicEvaluation {
	pub topic: String,
	pub summary: Option<String>,
	pub sources: Vec<SourceInfo>,
	pub article_count: usize,
	pub evaluation: Option<Evaluation>,
}

impl GazetteService {
	/// Deterministic quality scoring of a summary against its source text.
	/// No collaborators are involved; identical input yields identical
	/// output.
	pub fn evaluate_summary(&self, summary: &str, source_text: &str) -> ValidationReport {
		metrics::evaluate_summary(summary, source_text)
	}

	/// Metric scoring plus an optional judge-backed fidelity check. The
	/// fidelity call costs an extra judge invocation, so it is opt-in.
	pub async fn evaluate_summary_against_sources(
		&self,
		summary: &str,
		source_articles: &[String],
		check_fidelity: bool,
	) -> Result<Evaluation> {
		let source_text = source_articles.join("\n\n");
		let report = self.evaluate_summary(summary, &source_text);
		let fidelity = if check_fidelity {
			Some(self.check_fidelity(summary, source_articles, true).await?)
		} else {
			None
		};

		Ok(Evaluation { report, fidelity })
	}

	/// Generates a summary for the topic and scores it against the retrieved
	/// context.
	pub async fn evaluate_topic(
		&self,
		topic: &str,
		max_articles: u32,
		summary_words: u32,
		style: SummaryStyle,
	) -> Result<TopicEvaluation> {
		let response = self
			.summarize_topic(SummarizeRequest {
				topic: topic.to_string(),
				max_articles,
				summary_words,
				style,
			})
			.await?;
		let Some(summary) = response.summary.clone() else {
			return Ok(TopicEvaluation {
				topic: topic.to_string(),
				summary: None,
				sources: response.sources,
				article_count: response.article_count,
				evaluation: None,
			});
		};

		let context = self.retrieve_context(topic, max_articles).await?;
		let report = self.evaluate_summary(&summary, &context.context);

		tracing::info!(
			topic,
			score = u64::from(report.quality.score),
			label = report.quality.label.as_str(),
			"Evaluated summary."
		);

		Ok(TopicEvaluation {
			topic: topic.to_string(),
			summary: Some(summary),
			sources: response.sources,
			article_count: response.article_count,
			evaluation: Some(Evaluation { report, fidelity: None }),
		})
	}
}
