//! Classifier tests over the oracle reply protocol.

use whoami_oracle::{Classified, DEFAULT_GUESS_DESCRIPTION, classify};

#[test]
fn plain_question_parses() {
    let raw = "{\"type\":\"question\",\"question\":\"Is it human?\"}";
    match classify(raw) {
        Classified::Question(q) => {
            assert_eq!(q.text, "Is it human?");
            assert_eq!(q.answers, None);
        }
        other => panic!("Expected question, got {:?}", other),
    }
}

#[test]
fn answers_preserve_oracle_order() {
    let raw = "{\"type\":\"question\",\"question\":\"Is it human?\",\
               \"answers\":[\"Yes\",\"No\",\"Maybe\",\"I don't know\"]}";
    match classify(raw) {
        Classified::Question(q) => {
            assert_eq!(
                q.answers,
                Some(vec![
                    "Yes".to_string(),
                    "No".to_string(),
                    "Maybe".to_string(),
                    "I don't know".to_string(),
                ])
            );
        }
        other => panic!("Expected question, got {:?}", other),
    }
}

#[test]
fn fenced_reply_is_unwrapped() {
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
fn bare_fence_without_language_tag_is_unwrapped() {
    let raw = "```\n{\"type\":\"question\",\"question\":\"Alive?\"}\n```";
    assert!(matches!(classify(raw), Classified::Question(_)));
}

#[test]
fn full_guess_keeps_its_fields() {
    let raw = "{\"type\":\"guess\",\"character\":\"Ada Lovelace\",\
               \"description\":\"19th-century mathematician\",\"sureness\":85}";
    match classify(raw) {
        Classified::Guess(g) => {
            assert_eq!(g.name, "Ada Lovelace");
            assert_eq!(g.description, "19th-century mathematician");
            assert_eq!(g.sureness, 85);
        }
        other => panic!("Expected guess, got {:?}", other),
    }
}

#[test]
fn malformed_input_never_panics() {
    let cases = [
        "",
        "   ",
        "```json```",
        "not json",
        "42",
        "[1,2,3]",
        "{}",
        "{\"type\":42}",
        "{\"type\":\"oracle\"}",
        "{\"type\":\"question\"}",
        "{\"type\":\"guess\"}",
        "{\"question\":\"no discriminant?\"}",
        "{\"type\":\"question\",\"question\":null}",
        "{\"type\":\"guess\",\"character\":null}",
    ];

    for raw in cases {
        assert!(
            matches!(classify(raw), Classified::Error { .. }),
            "expected error for {:?}",
            raw
        );
    }
}

#[test]
fn guess_missing_character_is_an_error() {
    let raw = "{\"type\":\"guess\",\"description\":\"someone\",\"sureness\":50}";
    assert!(matches!(classify(raw), Classified::Error { .. }));
}

#[test]
fn fractional_sureness_rounds() {
    let raw = "{\"type\":\"guess\",\"character\":\"Ada\",\"sureness\":87.6}";
    match classify(raw) {
        Classified::Guess(g) => assert_eq!(g.sureness, 88),
        other => panic!("Expected guess, got {:?}", other),
    }
}
