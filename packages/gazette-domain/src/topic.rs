/// Leading phrases stripped before searching. Each group is applied once, in
/// order, so "can you tell me about X" keeps its inner phrasing after the
/// outer one is removed.
const QUESTION_PHRASES: &[&str] = &[
	"tell me something new about",
	"tell me about",
	"what's new with",
	"whats new with",
	"what is",
	"what are",
	"explain",
	"summarize",
	"find",
	"search for",
	"get news about",
	"news on",
	"news about",
];
const COMMAND_PHRASES: &[&str] = &["can you", "could you", "please", "i want to know about", "give me"];

const MIN_TOPIC_CHARS: usize = 3;

/// Reduces a conversational utterance to a search topic. Falls back to the
/// original utterance when stripping leaves fewer than three characters, so
/// short but meaningful topics such as "AI?" survive.
pub fn resolve(query: &str) -> String {
	let mut topic = query.trim();

	topic = strip_leading_phrase(topic, QUESTION_PHRASES);
	topic = strip_leading_phrase(topic, COMMAND_PHRASES);
	topic = topic.strip_suffix('?').unwrap_or(topic);
	topic = topic.trim();

	if topic.chars().count() < MIN_TOPIC_CHARS {
		return query.to_string();
	}

	topic.to_string()
}

fn strip_leading_phrase<'a>(text: &'a str, phrases: &[&str]) -> &'a str {
	for phrase in phrases {
		let Some(head) = text.get(..phrase.len()) else {
			continue;
		};

		if !head.eq_ignore_ascii_case(phrase) {
			continue;
		}

		let rest = &text[phrase.len()..];

		// The phrase must be a whole leading word, not a prefix of one.
		if rest.starts_with(char::is_whitespace) {
			return rest.trim_start();
		}
	}

	text
}
