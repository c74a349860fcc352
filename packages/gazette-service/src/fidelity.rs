use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{GazetteService, Result};
use gazette_providers::generation::GenerationRequest;

const SOURCE_SEPARATOR: &str = "\n\n---SOURCE ARTICLE---\n\n";

/// Score returned when the judge's output cannot be parsed at all. Reports
/// built from it are tagged so callers can tell "the judge said 0.5" apart
/// from "parsing failed".
const NEUTRAL_FIDELITY: f64 = 0.5;

/// How a judge response was recovered into structured data.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum JudgeParse {
	/// The raw response was valid JSON.
	Parsed { data: Value },
	/// Valid JSON after stripping a Markdown fence or extracting the first
	/// brace-delimited block.
	Recovered { data: Value },
	/// Nothing parseable; the raw text is retained for diagnosis.
	Unparsed { raw: String },
}
impl JudgeParse {
	pub fn data(&self) -> Option<&Value> {
		match self {
			Self::Parsed { data } | Self::Recovered { data } => Some(data),
			Self::Unparsed { .. } => None,
		}
	}

	pub fn is_unparsed(&self) -> bool {
		matches!(self, Self::Unparsed { .. })
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
	Supported,
	PartiallySupported,
	Unsupported,
	Contradicted,
}

#[derive(Clone, Debug, Serialize)]
pub struct FidelityReport {
	pub overall_fidelity: f64,
	pub factual_consistency: f64,
	pub hallucination_free: Option<f64>,
	pub proper_attribution: Option<f64>,
	pub balanced_representation: Option<f64>,
	pub issues_found: Vec<String>,
	pub strengths: Vec<String>,
	pub explanation: String,
	pub parse: JudgeParse,
}

#[derive(Clone, Debug, Serialize)]
pub struct Hallucination {
	pub claim: String,
	pub severity: String,
	pub explanation: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct HallucinationReport {
	pub has_hallucinations: Option<bool>,
	pub hallucination_count: u64,
	pub hallucinations: Vec<Hallucination>,
	pub confidence: Option<f64>,
	pub parse: JudgeParse,
}

#[derive(Clone, Debug, Serialize)]
pub struct VerifiedClaim {
	pub claim: String,
	pub status: Option<ClaimStatus>,
	pub evidence: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClaimReport {
	pub total_claims: u64,
	pub verified_claims: u64,
	pub unverified_claims: u64,
	pub claims: Vec<VerifiedClaim>,
	pub verification_rate: Option<f64>,
	pub parse: JudgeParse,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompletenessReport {
	pub total_key_points: u64,
	pub covered_key_points: u64,
	pub missing_key_points: Vec<String>,
	pub completeness_score: Option<f64>,
	pub assessment: String,
	pub parse: JudgeParse,
}

#[derive(Clone, Debug, Serialize)]
pub struct ComprehensiveReport {
	pub fidelity: FidelityReport,
	pub hallucinations: HallucinationReport,
	pub claims: ClaimReport,
	pub completeness: CompletenessReport,
	/// Mean of the headline scores from the sub-checks that produced a
	/// usable number. Failed sub-checks are excluded, not zeroed.
	pub overall_score: Option<f64>,
}

impl GazetteService {
	/// Asks the judge whether the summary is faithful to its sources.
	pub async fn check_fidelity(
		&self,
		summary: &str,
		source_articles: &[String],
		detailed: bool,
	) -> Result<FidelityReport> {
		let sources = source_articles.join(SOURCE_SEPARATOR);
		let prompt = build_fidelity_prompt(summary, &sources, detailed);
		let response = self.call_judge(&prompt).await?;
		let parse = parse_judge_response(&response);

		Ok(build_fidelity_report(parse))
	}

	/// Scans the summary for claims not present in the sources.
	pub async fn check_hallucinations(
		&self,
		summary: &str,
		source_articles: &[String],
	) -> Result<HallucinationReport> {
		let sources = source_articles.join(SOURCE_SEPARATOR);
		let prompt = build_hallucination_prompt(summary, &sources);
		let response = self.call_judge(&prompt).await?;
		let parse = parse_judge_response(&response);
		let data = parse.data().cloned().unwrap_or(Value::Null);

		Ok(HallucinationReport {
			has_hallucinations: data.get("has_hallucinations").and_then(Value::as_bool),
			hallucination_count: num_u64(&data, "hallucination_count"),
			hallucinations: data
				.get("hallucinations")
				.and_then(Value::as_array)
				.map(|items| {
					items
						.iter()
						.map(|item| Hallucination {
							claim: text(item, "claim"),
							severity: text(item, "severity"),
							explanation: text(item, "explanation"),
						})
						.collect()
				})
				.unwrap_or_default(),
			confidence: data.get("confidence").and_then(Value::as_f64),
			parse,
		})
	}

	/// Extracts each claim in the summary and verifies it against sources.
	pub async fn verify_claims(
		&self,
		summary: &str,
		source_articles: &[String],
	) -> Result<ClaimReport> {
		let sources = source_articles.join(SOURCE_SEPARATOR);
		let prompt = build_claim_prompt(summary, &sources);
		let response = self.call_judge(&prompt).await?;
		let parse = parse_judge_response(&response);
		let data = parse.data().cloned().unwrap_or(Value::Null);

		Ok(ClaimReport {
			total_claims: num_u64(&data, "total_claims"),
			verified_claims: num_u64(&data, "verified_claims"),
			unverified_claims: num_u64(&data, "unverified_claims"),
			claims: data
				.get("claims")
				.and_then(Value::as_array)
				.map(|items| {
					items
						.iter()
						.map(|item| VerifiedClaim {
							claim: text(item, "claim"),
							status: item
								.get("status")
								.cloned()
								.and_then(|status| serde_json::from_value(status).ok()),
							evidence: text(item, "evidence"),
						})
						.collect()
				})
				.unwrap_or_default(),
			verification_rate: data.get("verification_rate").and_then(Value::as_f64),
			parse,
		})
	}

	/// Checks whether the summary covers the sources' key points.
	pub async fn check_completeness(
		&self,
		summary: &str,
		source_articles: &[String],
	) -> Result<CompletenessReport> {
		let sources = source_articles.join(SOURCE_SEPARATOR);
		let prompt = build_completeness_prompt(summary, &sources);
		let response = self.call_judge(&prompt).await?;
		let parse = parse_judge_response(&response);
		let data = parse.data().cloned().unwrap_or(Value::Null);

		Ok(CompletenessReport {
			total_key_points: num_u64(&data, "total_key_points"),
			covered_key_points: num_u64(&data, "covered_key_points"),
			missing_key_points: string_list(&data, "missing_key_points"),
			completeness_score: data.get("completeness_score").and_then(Value::as_f64),
			assessment: text(&data, "assessment"),
			parse,
		})
	}

	/// Runs every judge check and folds the usable headline scores into one
	/// overall number.
	pub async fn comprehensive_check(
		&self,
		summary: &str,
		source_articles: &[String],
	) -> Result<ComprehensiveReport> {
		let fidelity = self.check_fidelity(summary, source_articles, true).await?;
		let hallucinations = self.check_hallucinations(summary, source_articles).await?;
		let claims = self.verify_claims(summary, source_articles).await?;
		let completeness = self.check_completeness(summary, source_articles).await?;

		let mut scores = Vec::new();

		if !fidelity.parse.is_unparsed() {
			scores.push(fidelity.overall_fidelity);
		}
		if let Some(rate) = claims.verification_rate {
			scores.push(rate);
		}
		if let Some(score) = completeness.completeness_score {
			scores.push(score);
		}

		let overall_score = if scores.is_empty() {
			None
		} else {
			Some(scores.iter().sum::<f64>() / scores.len() as f64)
		};

		Ok(ComprehensiveReport { fidelity, hallucinations, claims, completeness, overall_score })
	}

	async fn call_judge(&self, prompt: &str) -> Result<String> {
		let response = self
			.providers
			.generation
			.generate(&self.cfg.providers.judge, GenerationRequest {
				prompt,
				system_message: None,
				max_tokens: None,
				temperature: None,
			})
			.await?;

		Ok(response)
	}
}

/// Parses a judge response defensively: direct JSON first, then a fence
/// strip, then the first brace-delimited block. Never fails; the caller gets
/// an `Unparsed` value instead.
pub fn parse_judge_response(response: &str) -> JudgeParse {
	let trimmed = response.trim();

	if let Ok(data) = serde_json::from_str::<Value>(trimmed) {
		return JudgeParse::Parsed { data };
	}

	let unfenced = strip_code_fence(trimmed);

	if unfenced != trimmed
		&& let Ok(data) = serde_json::from_str::<Value>(unfenced)
	{
		return JudgeParse::Recovered { data };
	}

	if let Ok(re) = Regex::new(r"(?s)\{.*\}")
		&& let Some(found) = re.find(response)
		&& let Ok(data) = serde_json::from_str::<Value>(found.as_str())
	{
		return JudgeParse::Recovered { data };
	}

	JudgeParse::Unparsed { raw: response.to_string() }
}

fn strip_code_fence(text: &str) -> &str {
	let mut out = text;

	if let Some(rest) = out.strip_prefix("```json") {
		out = rest;
	} else if let Some(rest) = out.strip_prefix("```") {
		out = rest;
	}

	if let Some(rest) = out.strip_suffix("```") {
		out = rest;
	}

	out.trim()
}

fn build_fidelity_report(parse: JudgeParse) -> FidelityReport {
	let Some(data) = parse.data().cloned() else {
		return FidelityReport {
			overall_fidelity: NEUTRAL_FIDELITY,
			factual_consistency: NEUTRAL_FIDELITY,
			hallucination_free: None,
			proper_attribution: None,
			balanced_representation: None,
			issues_found: Vec::new(),
			strengths: Vec::new(),
			explanation: "Could not parse the judge response.".to_string(),
			parse,
		};
	};

	let factual_consistency =
		data.get("factual_consistency").and_then(Value::as_f64).unwrap_or(NEUTRAL_FIDELITY);
	// A response missing the headline score falls back to factual
	// consistency rather than the neutral default.
	let overall_fidelity =
		data.get("overall_fidelity").and_then(Value::as_f64).unwrap_or(factual_consistency);

	FidelityReport {
		overall_fidelity,
		factual_consistency,
		hallucination_free: data.get("hallucination_free").and_then(Value::as_f64),
		proper_attribution: data.get("proper_attribution").and_then(Value::as_f64),
		balanced_representation: data.get("balanced_representation").and_then(Value::as_f64),
		issues_found: string_list(&data, "issues_found"),
		strengths: string_list(&data, "strengths"),
		explanation: text(&data, "explanation"),
		parse,
	}
}

fn build_fidelity_prompt(summary: &str, sources: &str, detailed: bool) -> String {
	if detailed {
		format!(
			"You are an expert fact-checker evaluating summary fidelity. Analyze if the \
			summary accurately represents the source articles without hallucinations or \
			distortions.\n\nSUMMARY TO EVALUATE:\n{summary}\n\nSOURCE ARTICLES:\n{sources}\n\n\
			Evaluate the summary on these dimensions:\n\
			1. **Factual Consistency**: Are all facts in the summary accurate and supported by sources?\n\
			2. **No Hallucinations**: Does the summary avoid adding information not in sources?\n\
			3. **Proper Attribution**: Are claims properly grounded in the source material?\n\
			4. **Balanced Representation**: Does it fairly represent the sources without bias?\n\n\
			Respond in JSON format:\n{{\n\
			    \"factual_consistency\": 0.0-1.0,\n\
			    \"hallucination_free\": 0.0-1.0,\n\
			    \"proper_attribution\": 0.0-1.0,\n\
			    \"balanced_representation\": 0.0-1.0,\n\
			    \"overall_fidelity\": 0.0-1.0,\n\
			    \"issues_found\": [\"specific issue if any\"],\n\
			    \"strengths\": [\"what the summary does well\"],\n\
			    \"explanation\": \"brief explanation of the assessment\"\n}}"
		)
	} else {
		format!(
			"Evaluate if this summary is faithful to the source articles. Rate fidelity from \
			0.0 (completely unfaithful) to 1.0 (perfectly faithful).\n\nSUMMARY:\n{summary}\n\n\
			SOURCES:\n{sources}\n\nRespond in JSON format:\n{{\n\
			    \"overall_fidelity\": 0.0-1.0,\n\
			    \"factual_consistency\": 0.0-1.0,\n\
			    \"explanation\": \"brief explanation\"\n}}"
		)
	}
}

fn build_hallucination_prompt(summary: &str, sources: &str) -> String {
	format!(
		"You are a fact-checking expert. Analyze if the summary contains any hallucinations \
		or fabricated information not present in the source articles.\n\nSUMMARY TO CHECK:\n\
		{summary}\n\nSOURCE ARTICLES:\n{sources}\n\nIdentify any statements in the summary \
		that are:\n\
		1. Not supported by the source articles\n\
		2. Contradicted by the source articles\n\
		3. Exaggerated or misrepresented\n\n\
		Respond in JSON format:\n{{\n\
		    \"has_hallucinations\": true/false,\n\
		    \"hallucination_count\": 0,\n\
		    \"hallucinations\": [{{\"claim\": \"the hallucinated claim\", \"severity\": \
		\"high/medium/low\", \"explanation\": \"why this is a hallucination\"}}],\n\
		    \"confidence\": 0.0-1.0\n}}"
	)
}

fn build_claim_prompt(summary: &str, sources: &str) -> String {
	format!(
		"You are a fact-checking expert. Extract all factual claims from the summary and \
		verify each against the source articles.\n\nSUMMARY:\n{summary}\n\nSOURCE ARTICLES:\n\
		{sources}\n\nFor each claim in the summary, determine if it is:\n\
		- SUPPORTED: Directly stated or clearly implied in sources\n\
		- PARTIALLY_SUPPORTED: Partially true but missing context\n\
		- UNSUPPORTED: Not found in sources\n\
		- CONTRADICTED: Contradicts information in sources\n\n\
		Respond in JSON format:\n{{\n\
		    \"total_claims\": 0,\n\
		    \"verified_claims\": 0,\n\
		    \"unverified_claims\": 0,\n\
		    \"claims\": [{{\"claim\": \"the factual claim\", \"status\": \
		\"SUPPORTED/PARTIALLY_SUPPORTED/UNSUPPORTED/CONTRADICTED\", \"evidence\": \"quote \
		from source or explanation\"}}],\n\
		    \"verification_rate\": 0.0-1.0\n}}"
	)
}

fn build_completeness_prompt(summary: &str, sources: &str) -> String {
	format!(
		"You are an expert at evaluating summary completeness. Identify the key points in \
		the source articles and check if they are covered in the summary.\n\nSUMMARY:\n\
		{summary}\n\nSOURCE ARTICLES:\n{sources}\n\nAnalyze:\n\
		1. What are the main key points in the source articles?\n\
		2. Which key points are covered in the summary?\n\
		3. Which important points are missing?\n\n\
		Respond in JSON format:\n{{\n\
		    \"total_key_points\": 0,\n\
		    \"covered_key_points\": 0,\n\
		    \"missing_key_points\": [\"important point that was omitted\"],\n\
		    \"completeness_score\": 0.0-1.0,\n\
		    \"assessment\": \"brief assessment of completeness\"\n}}"
	)
}

fn num_u64(data: &Value, key: &str) -> u64 {
	data.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn text(data: &Value, key: &str) -> String {
	data.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn string_list(data: &Value, key: &str) -> Vec<String> {
	data.get(key)
		.and_then(Value::as_array)
		.map(|items| {
			items
				.iter()
				.filter_map(Value::as_str)
				.map(str::to_string)
				.collect()
		})
		.unwrap_or_default()
}
