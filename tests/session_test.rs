//! State machine tests for the game session, driven by a scripted oracle.

use async_trait::async_trait;
use std::collections::VecDeque;
use whoami_oracle::{
    GameMaster, GamePhase, MemoryScoreStore, OracleClient, OracleError, STARTING_LIVES,
    ScoreStore,
};

/// Oracle that replays a fixed script of replies.
struct ScriptedOracle {
    replies: VecDeque<Result<String, OracleError>>,
    conversations_opened: usize,
    messages_sent: Vec<String>,
}

impl ScriptedOracle {
    fn new(replies: Vec<Result<String, OracleError>>) -> Self {
        Self {
            replies: replies.into(),
            conversations_opened: 0,
            messages_sent: Vec::new(),
        }
    }

    fn questions(count: usize) -> Self {
        Self::new((0..count).map(|i| Ok(question(&format!("Question {}?", i)))).collect())
    }
}

#[async_trait]
impl OracleClient for ScriptedOracle {
    fn open_conversation(&mut self, _system: &str) {
        self.conversations_opened += 1;
    }

    async fn send(&mut self, message: &str) -> Result<String, OracleError> {
        self.messages_sent.push(message.to_string());
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::transport("script exhausted".to_string())))
    }
}

fn question(text: &str) -> String {
    format!("{{\"type\":\"question\",\"question\":\"{}\"}}", text)
}

fn guess(name: &str) -> String {
    format!("{{\"type\":\"guess\",\"character\":\"{}\",\"sureness\":90}}", name)
}

#[tokio::test]
async fn start_delivers_first_question() {
    let oracle = ScriptedOracle::new(vec![Ok(
        "{\"type\":\"question\",\"question\":\"Is it human?\"}".to_string(),
    )]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;

    let session = master.session();
    assert_eq!(*session.phase(), GamePhase::AwaitingAnswer);
    assert_eq!(*session.question_count(), 1);
    assert_eq!(*session.lives(), STARTING_LIVES);
    assert_eq!(
        session.current_question().as_ref().map(|q| q.text.as_str()),
        Some("Is it human?")
    );
}

#[tokio::test]
async fn answers_advance_question_count() {
    let oracle = ScriptedOracle::questions(3);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;
    master.submit_answer("yes").await;
    master.submit_answer("no").await;

    assert_eq!(*master.session().phase(), GamePhase::AwaitingAnswer);
    assert_eq!(*master.session().question_count(), 3);
}

#[tokio::test]
async fn guess_reply_moves_to_confirmation() {
    let oracle = ScriptedOracle::new(vec![Ok(question("Is it human?")), Ok(guess("Ada"))]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;
    master.submit_answer("yes").await;

    let session = master.session();
    assert_eq!(*session.phase(), GamePhase::AwaitingGuessConfirmation);
    assert!(session.current_question().is_none());
    assert_eq!(
        session.current_guess().as_ref().map(|g| g.name.as_str()),
        Some("Ada")
    );
}

#[tokio::test]
async fn confirmed_guess_wins_and_records_score() {
    let oracle = ScriptedOracle::new(vec![Ok(question("Q1?")), Ok(guess("Ada"))]);
    let store = MemoryScoreStore::with_scores(vec![10, 5]);
    let mut master = GameMaster::new(oracle, store);

    master.start().await;
    master.submit_answer("yes").await;
    master.confirm_guess(true).await;

    assert_eq!(*master.session().phase(), GamePhase::Won);
    // Guess carried into the win screen.
    assert!(master.session().current_guess().is_some());
    assert_eq!(master.scores(), &[10, 5, 1]);
}

#[tokio::test]
async fn win_appends_question_count_at_confirmation() {
    let oracle = ScriptedOracle::new(vec![
        Ok(question("Q1?")),
        Ok(question("Q2?")),
        Ok(question("Q3?")),
        Ok(question("Q4?")),
        Ok(question("Q5?")),
        Ok(question("Q6?")),
        Ok(question("Q7?")),
        Ok(guess("Ada")),
    ]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::with_scores(vec![10, 5]));

    master.start().await;
    for _ in 0..6 {
        master.submit_answer("yes").await;
    }
    master.submit_answer("no").await;
    assert_eq!(*master.session().question_count(), 7);

    master.confirm_guess(true).await;
    assert_eq!(master.scores(), &[10, 5, 7]);
}

#[tokio::test]
async fn wrong_guess_costs_a_life_and_resumes_questions() {
    let oracle = ScriptedOracle::new(vec![
        Ok(question("Q1?")),
        Ok(guess("Ada")),
        Ok(question("Q2?")),
    ]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;
    master.submit_answer("yes").await;
    master.confirm_guess(false).await;

    let session = master.session();
    assert_eq!(*session.phase(), GamePhase::AwaitingAnswer);
    assert_eq!(*session.lives(), STARTING_LIVES - 1);
    assert!(session.current_guess().is_none());
    // The redirect does not count as a question asked.
    assert_eq!(*session.question_count(), 1);
}

#[tokio::test]
async fn losing_last_life_ends_the_game() {
    // Four wrong guesses burn lives down to one, the fifth loses.
    let mut replies = vec![Ok(question("Q1?"))];
    for _ in 0..4 {
        replies.push(Ok(guess("Wrong")));
        replies.push(Ok(question("Again?")));
    }
    replies.push(Ok(guess("Still wrong")));
    let oracle = ScriptedOracle::new(replies);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;
    for _ in 0..4 {
        master.submit_answer("yes").await;
        master.confirm_guess(false).await;
        assert_eq!(*master.session().phase(), GamePhase::AwaitingAnswer);
    }
    assert_eq!(*master.session().lives(), 1);

    master.submit_answer("yes").await;
    master.confirm_guess(false).await;

    assert_eq!(*master.session().phase(), GamePhase::Lost);
    assert_eq!(*master.session().lives(), 0);
    // A loss records nothing.
    assert!(master.scores().is_empty());
}

#[tokio::test]
async fn transport_failure_on_start_errors_the_session() {
    let oracle = ScriptedOracle::new(vec![Err(OracleError::transport("boom".to_string()))]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;

    let session = master.session();
    assert_eq!(*session.phase(), GamePhase::Errored);
    assert!(session.last_error().is_some());
    assert!(session.current_question().is_none());
    assert!(session.current_guess().is_none());
}

#[tokio::test]
async fn safety_block_produces_distinct_message() {
    let oracle = ScriptedOracle::new(vec![
        Err(OracleError::safety_blocked()),
        Err(OracleError::transport("boom".to_string())),
    ]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;
    let safety_message = master.session().last_error().clone().unwrap();

    master.retry();
    master.start().await;
    let transport_message = master.session().last_error().clone().unwrap();

    assert_ne!(safety_message, transport_message);
}

#[tokio::test]
async fn malformed_reply_errors_the_session() {
    let oracle = ScriptedOracle::new(vec![Ok("not json".to_string())]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;

    assert_eq!(*master.session().phase(), GamePhase::Errored);
    // Raw oracle text is never surfaced to the player.
    assert!(!master.session().last_error().clone().unwrap().contains("not json"));
}

#[tokio::test]
async fn guess_on_start_is_a_protocol_error() {
    let oracle = ScriptedOracle::new(vec![Ok(guess("Ada"))]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;

    assert_eq!(*master.session().phase(), GamePhase::Errored);
    assert!(master.session().current_guess().is_none());
}

#[tokio::test]
async fn retry_clears_the_errored_session() {
    let oracle = ScriptedOracle::new(vec![Err(OracleError::transport("boom".to_string()))]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;
    assert_eq!(*master.session().phase(), GamePhase::Errored);

    master.retry();

    let session = master.session();
    assert_eq!(*session.phase(), GamePhase::NotStarted);
    assert!(session.last_error().is_none());
    assert!(session.current_question().is_none());
    assert!(session.current_guess().is_none());
}

#[tokio::test]
async fn events_in_wrong_phase_are_rejected() {
    let oracle = ScriptedOracle::questions(1);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    // Nothing started yet: these must not move the machine.
    master.submit_answer("yes").await;
    master.confirm_guess(true).await;
    master.retry();
    assert_eq!(*master.session().phase(), GamePhase::NotStarted);
    assert!(master.scores().is_empty());

    master.start().await;
    assert_eq!(*master.session().phase(), GamePhase::AwaitingAnswer);

    // No guess on screen, so confirmation is invalid.
    master.confirm_guess(true).await;
    assert_eq!(*master.session().phase(), GamePhase::AwaitingAnswer);
    assert!(master.scores().is_empty());
}

#[tokio::test]
async fn restart_opens_a_fresh_conversation() {
    let oracle = ScriptedOracle::new(vec![
        Ok(question("Q1?")),
        Ok(guess("Ada")),
        Ok(question("Q1 again?")),
    ]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;
    master.submit_answer("yes").await;
    master.confirm_guess(true).await;
    assert_eq!(*master.session().phase(), GamePhase::Won);

    master.start().await;

    let session = master.session();
    assert_eq!(*session.phase(), GamePhase::AwaitingAnswer);
    assert_eq!(*session.question_count(), 1);
    assert_eq!(*session.lives(), STARTING_LIVES);
    assert!(session.current_guess().is_none());
}

#[tokio::test]
async fn exactly_one_message_per_operation() {
    let oracle = ScriptedOracle::new(vec![
        Ok(question("Q1?")),
        Ok(guess("Ada")),
        Ok(question("Q2?")),
    ]);
    let mut master = GameMaster::new(oracle, MemoryScoreStore::new());

    master.start().await;
    master.submit_answer("yes").await;
    master.confirm_guess(false).await;

    // start + answer + wrong-guess redirect, and nothing else.
    assert_eq!(master.oracle().messages_sent.len(), 3);
    assert_eq!(master.oracle().conversations_opened, 1);
}

/// Store that always fails to persist, to prove persistence never blocks
/// the game outcome.
struct BrokenStore;

impl ScoreStore for BrokenStore {
    fn load(&self) -> Vec<u32> {
        Vec::new()
    }

    fn append(&mut self, _value: u32) {
        // Persistence failure: swallowed by contract.
    }
}

#[tokio::test]
async fn persistence_failure_never_blocks_a_win() {
    let oracle = ScriptedOracle::new(vec![Ok(question("Q1?")), Ok(guess("Ada"))]);
    let mut master = GameMaster::new(oracle, BrokenStore);

    master.start().await;
    master.submit_answer("yes").await;
    master.confirm_guess(true).await;

    assert_eq!(*master.session().phase(), GamePhase::Won);
    assert_eq!(master.scores(), &[1]);
}
