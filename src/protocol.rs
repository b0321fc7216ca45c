//! Classification of raw oracle replies into structured outcomes.
//!
//! The oracle is asked for bare JSON but routinely wraps it in a markdown
//! code fence anyway, so fences are stripped before parsing. Classification
//! is a total function: any reply maps to exactly one of question, guess, or
//! error, and malformed input never panics.

use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Fallback shown when the oracle omits the guess description.
pub const DEFAULT_GUESS_DESCRIPTION: &str = "No description provided.";

/// A question posed by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Question text shown to the player. Never empty.
    pub text: String,
    /// Suggested replies in oracle order. Never empty when present.
    pub answers: Option<Vec<String>>,
}

/// The oracle's guess at the player's character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    /// Character name.
    pub name: String,
    /// One-line description. Never empty (defaulted when absent).
    pub description: String,
    /// Oracle-reported confidence in [0, 100].
    pub sureness: u8,
}

/// Outcome of classifying one raw oracle reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// The oracle asked another question.
    Question(Question),
    /// The oracle committed to a guess.
    Guess(Guess),
    /// The reply could not be understood.
    Error {
        /// What went wrong, suitable for logging.
        message: String,
        /// Original reply text, retained for diagnostics only.
        raw: String,
    },
}

/// Wire shape of a `question` reply.
#[derive(Debug, Deserialize)]
struct QuestionReply {
    question: String,
    #[serde(default)]
    answers: Option<Vec<String>>,
}

/// Wire shape of a `guess` reply.
#[derive(Debug, Deserialize)]
struct GuessReply {
    character: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    sureness: Option<f64>,
}

/// Classifies one raw oracle reply.
///
/// Pure: no I/O, no session state, never panics. Fence markers and
/// surrounding whitespace are stripped before structural parsing.
#[instrument(skip(raw), fields(raw_len = raw.len()))]
pub fn classify(raw: &str) -> Classified {
    let cleaned = strip_fences(raw);

    if cleaned.is_empty() {
        warn!("Oracle reply empty after fence stripping");
        return error("empty response", raw);
    }

    let value: serde_json::Value = match serde_json::from_str(&cleaned) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Oracle reply is not valid JSON");
            return error("invalid structured response", raw);
        }
    };

    let Some(tag) = value.get("type").and_then(|t| t.as_str()) else {
        warn!("Oracle reply has no string discriminant field");
        return error("unrecognized response shape", raw);
    };

    match tag {
        "question" => match serde_json::from_value::<QuestionReply>(value.clone()) {
            Ok(reply) => classify_question(reply, raw),
            Err(e) => {
                warn!(error = %e, "Question reply missing required fields");
                error("invalid structured response", raw)
            }
        },
        "guess" => match serde_json::from_value::<GuessReply>(value.clone()) {
            Ok(reply) => classify_guess(reply),
            Err(e) => {
                warn!(error = %e, "Guess reply missing required fields");
                error("invalid structured response", raw)
            }
        },
        other => {
            warn!(discriminant = other, "Unknown reply discriminant");
            error("unrecognized response shape", raw)
        }
    }
}

/// Validates a parsed question reply.
fn classify_question(reply: QuestionReply, raw: &str) -> Classified {
    let text = reply.question.trim().to_string();
    if text.is_empty() {
        warn!("Question reply has empty text");
        return error("question without text", raw);
    }

    // Suggested answers are cosmetic: blank entries are dropped and an
    // empty list collapses to no suggestions at all.
    let answers = reply.answers.and_then(|list| {
        let kept: Vec<String> = list
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if kept.is_empty() { None } else { Some(kept) }
    });

    debug!(question = %text, answer_count = answers.as_ref().map_or(0, Vec::len), "Classified question");
    Classified::Question(Question { text, answers })
}

/// Validates a parsed guess reply, applying cosmetic fallbacks.
fn classify_guess(reply: GuessReply) -> Classified {
    let description = reply
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_GUESS_DESCRIPTION.to_string());

    let sureness = reply.sureness.unwrap_or(0.0).clamp(0.0, 100.0).round() as u8;

    debug!(character = %reply.character, sureness, "Classified guess");
    Classified::Guess(Guess {
        name: reply.character,
        description,
        sureness,
    })
}

/// Removes markdown fence markers and surrounding whitespace.
fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

fn error(message: &str, raw: &str) -> Classified {
    Classified::Error {
        message: message.to_string(),
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_guess_parses_with_defaults() {
        let raw = "```json\n{\"type\":\"guess\",\"character\":\"Ada\"}\n```";
        match classify(raw) {
            Classified::Guess(g) => {
                assert_eq!(g.name, "Ada");
                assert_eq!(g.description, DEFAULT_GUESS_DESCRIPTION);
                assert_eq!(g.sureness, 0);
            }
            other => panic!("Expected guess, got {:?}", other),
        }
    }

    #[test]
    fn sureness_is_clamped_to_percentage_range() {
        let raw = "{\"type\":\"guess\",\"character\":\"Ada\",\"sureness\":250}";
        match classify(raw) {
            Classified::Guess(g) => assert_eq!(g.sureness, 100),
            other => panic!("Expected guess, got {:?}", other),
        }

        let raw = "{\"type\":\"guess\",\"character\":\"Ada\",\"sureness\":-5}";
        match classify(raw) {
            Classified::Guess(g) => assert_eq!(g.sureness, 0),
            other => panic!("Expected guess, got {:?}", other),
        }
    }

    #[test]
    fn blank_answers_are_dropped() {
        let raw = "{\"type\":\"question\",\"question\":\"Is it human?\",\
                   \"answers\":[\"Yes\",\"  \",\"No\",\"\"]}";
        match classify(raw) {
            Classified::Question(q) => {
                assert_eq!(q.answers, Some(vec!["Yes".to_string(), "No".to_string()]));
            }
            other => panic!("Expected question, got {:?}", other),
        }
    }

    #[test]
    fn all_blank_answers_collapse_to_none() {
        let raw = "{\"type\":\"question\",\"question\":\"Is it human?\",\"answers\":[\"\"]}";
        match classify(raw) {
            Classified::Question(q) => assert_eq!(q.answers, None),
            other => panic!("Expected question, got {:?}", other),
        }
    }

    #[test]
    fn empty_question_text_is_an_error() {
        let raw = "{\"type\":\"question\",\"question\":\"   \"}";
        assert!(matches!(classify(raw), Classified::Error { .. }));
    }

    #[test]
    fn unknown_discriminant_is_an_error() {
        let raw = "{\"type\":\"riddle\",\"question\":\"what?\"}";
        match classify(raw) {
            Classified::Error { message, .. } => {
                assert_eq!(message, "unrecognized response shape");
            }
            other => panic!("Expected error, got {:?}", other),
        }
    }

    #[test]
    fn error_retains_original_text() {
        let raw = "not json at all";
        match classify(raw) {
            Classified::Error { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("Expected error, got {:?}", other),
        }
    }
}
