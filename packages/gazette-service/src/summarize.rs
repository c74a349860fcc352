use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{GazetteService, Result, SourceInfo};
use gazette_providers::generation::GenerationRequest;

const ACCURACY_NOTE: &str = "IMPORTANT: If any article content is inaccessible or requires a \
	subscription (NOT just truncated), note which articles are unavailable instead of \
	fabricating information. If articles are truncated but have substantial content, summarize \
	what's available.";

/// The closed set of summary styles. Each variant carries its own prompt and
/// system message, so adding a style is a compile-checked change.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
	Concise,
	Comprehensive,
	BulletPoints,
	Executive,
	Technical,
	Eli5,
}
impl SummaryStyle {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Concise => "concise",
			Self::Comprehensive => "comprehensive",
			Self::BulletPoints => "bullet_points",
			Self::Executive => "executive",
			Self::Technical => "technical",
			Self::Eli5 => "eli5",
		}
	}

	pub fn system_message(&self) -> &'static str {
		match self {
			Self::Concise =>
				"You are a news editor. Write tight, accurate summaries that synthesize \
				multiple articles into one narrative. Never fabricate information - if content \
				is unavailable, say so.",
			Self::Comprehensive =>
				"You are a news analyst. Write thorough summaries that cover the main points \
				and key developments across all provided articles. Never fabricate information \
				- if content is unavailable, say so.",
			Self::BulletPoints =>
				"You are a news editor. Present the key facts as clear, scannable bullet \
				points. Never fabricate information - if content is unavailable, say so.",
			Self::Executive =>
				"You are a business analyst. Provide executive summaries focused on strategic \
				impact and business value where applicable. If content lacks business details, \
				still provide a summary in executive style. Never fabricate information - if \
				content is unavailable, acknowledge it.",
			Self::Technical =>
				"You are a technical analyst. Provide technical summaries with methodologies \
				and technical details where available. If content lacks technical depth, still \
				provide a summary in technical style. Never fabricate information - if content \
				is unavailable, say so.",
			Self::Eli5 =>
				"You are a friendly teacher. Explain the news in very simple words a child \
				could follow. Never fabricate information - if content is unavailable, say so.",
		}
	}

	pub fn build_prompt(&self, topic: &str, context: &str, max_words: u32) -> String {
		match self {
			Self::Concise => format!(
				"Based on the following articles about {topic}, provide a concise summary \
				(max {max_words} words).\nSynthesize the information into a cohesive \
				narrative, not a list of articles.\n\nArticles:\n{context}\n\n{ACCURACY_NOTE}\n\n\
				Concise summary:"
			),
			Self::Comprehensive => format!(
				"Based on the following articles about {topic}, provide a comprehensive \
				summary that covers the main points and key developments (max {max_words} \
				words).\nSynthesize the information into a cohesive narrative, not a list of \
				articles.\n\nArticles:\n{context}\n\n{ACCURACY_NOTE}\n\nComprehensive summary:"
			),
			Self::BulletPoints => format!(
				"Based on the following articles about {topic}, create a summary in bullet \
				points (max {max_words} words).\n\nArticles:\n{context}\n\n{ACCURACY_NOTE}\n\n\
				Summary (bullet points):"
			),
			Self::Executive => format!(
				"Based on the following articles about {topic}, provide an executive summary \
				(max {max_words} words).\nFocus on business impact, key decisions, strategic \
				implications, and actionable insights WHERE APPLICABLE.\nIf the articles don't \
				contain explicit business insights, summarize the key information in an \
				executive style.\nSynthesize the information into a cohesive narrative.\n\n\
				Articles:\n{context}\n\n{ACCURACY_NOTE}\n\nExecutive summary:"
			),
			Self::Technical => format!(
				"Based on the following articles about {topic}, provide a technical summary \
				(max {max_words} words).\nInclude technical details, methodologies, \
				specifications, and key technical insights WHERE AVAILABLE.\nIf the articles \
				don't contain deep technical content, summarize the available information in a \
				technical style.\nSynthesize the information into a cohesive narrative.\n\n\
				Articles:\n{context}\n\n{ACCURACY_NOTE}\n\nTechnical summary:"
			),
			Self::Eli5 => format!(
				"Based on the following articles about {topic}, explain the topic in very \
				simple terms (max {max_words} words).\nUse short sentences (under 15 words \
				each), simple everyday words, and avoid technical jargon.\nWrite as if \
				explaining to a 10-year-old.\nEven if the articles are complex or incomplete, \
				do your best to explain the main idea simply.\n\nArticles:\n{context}\n\n\
				{ACCURACY_NOTE}\n\nSimple explanation:"
			),
		}
	}
}

#[derive(Clone, Debug)]
pub struct SummarizeRequest {
	pub topic: String,
	pub max_articles: u32,
	pub summary_words: u32,
	pub style: SummaryStyle,
}

#[derive(Clone, Debug)]
pub struct SummarizeResponse {
	pub summary: Option<String>,
	pub sources: Vec<SourceInfo>,
	pub article_count: usize,
	pub style: SummaryStyle,
}

impl GazetteService {
	/// Retrieves context for the topic and asks the generation provider for a
	/// summary in the requested style. No retrievable articles yields an
	/// empty response, not an error.
	pub async fn summarize_topic(&self, request: SummarizeRequest) -> Result<SummarizeResponse> {
		let context = self.retrieve_context(&request.topic, request.max_articles).await?;

		if context.article_count == 0 {
			return Ok(SummarizeResponse {
				summary: None,
				sources: Vec::new(),
				article_count: 0,
				style: request.style,
			});
		}

		let prompt =
			request.style.build_prompt(&request.topic, &context.context, request.summary_words);
		let raw = self
			.providers
			.generation
			.generate(&self.cfg.providers.generation, GenerationRequest {
				prompt: &prompt,
				system_message: Some(request.style.system_message()),
				max_tokens: None,
				temperature: None,
			})
			.await?;
		let summary = clean_summary_text(&raw);

		tracing::info!(
			topic = %request.topic,
			style = request.style.as_str(),
			articles = context.article_count,
			"Generated summary."
		);

		Ok(SummarizeResponse {
			summary: if summary.is_empty() { None } else { Some(summary) },
			sources: context.sources,
			article_count: context.article_count,
			style: request.style,
		})
	}
}

/// Repairs spacing artifacts that generation output sometimes carries:
/// glued sentences, doubled spaces, digits running into words.
pub(crate) fn clean_summary_text(text: &str) -> String {
	if text.trim().is_empty() {
		return String::new();
	}

	let mut out = text.to_string();

	for (pattern, replacement) in [
		(r" {2,}", " "),
		(r"([.!?,;:])([A-Za-z])", "$1 $2"),
		(r"(\d)([a-z])", "$1 $2"),
		(r"([a-z])([A-Z])", "$1 $2"),
	] {
		if let Ok(re) = Regex::new(pattern) {
			out = re.replace_all(&out, replacement).into_owned();
		}
	}

	out.trim().to_string()
}
