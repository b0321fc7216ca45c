//! Game session state machine.
//!
//! [`GameMaster`] is the sole mutator of [`GameSession`]. Every user event
//! maps to a closed set of transitions: events arriving in the wrong phase
//! or while an oracle call is in flight are rejected without touching state.
//! Every oracle failure of any kind lands in [`GamePhase::Errored`], and the
//! only way out of it is the explicit `retry`, which discards the session.

use crate::oracle::{OracleClient, OracleError, OracleErrorKind};
use crate::prompts::{INITIAL_PROMPT, SYSTEM_INSTRUCTION, WRONG_GUESS_PROMPT};
use crate::protocol::{Classified, Guess, Question, classify};
use crate::scores::ScoreStore;
use derive_getters::Getters;
use tracing::{debug, error, info, instrument, warn};

/// Lives at the start of every session.
pub const STARTING_LIVES: u32 = 5;

/// Player-facing message for a generic oracle failure.
const ERROR_GENERIC: &str = "The oracle did not respond sensibly. Try again.";
/// Player-facing message for a content-safety refusal.
const ERROR_SAFETY: &str = "The oracle declined to answer that for safety reasons.";

/// Phase of one play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No session running; waiting for the player to start.
    NotStarted,
    /// A question is on screen; waiting for the player's answer.
    AwaitingAnswer,
    /// A guess is on screen; waiting for confirm or reject.
    AwaitingGuessConfirmation,
    /// The oracle guessed right.
    Won,
    /// The oracle ran out of lives.
    Lost,
    /// Something went wrong; recoverable only via retry.
    Errored,
}

/// Mutable state of one play-through.
///
/// Read-only outside this module; [`GameMaster`] owns all mutation.
#[derive(Debug, Clone, Getters)]
pub struct GameSession {
    /// Current phase.
    phase: GamePhase,
    /// Questions asked so far this session.
    question_count: u32,
    /// Wrong guesses the oracle can still afford.
    lives: u32,
    /// Present only while awaiting an answer.
    current_question: Option<Question>,
    /// Present while awaiting confirmation, and carried into the win screen.
    current_guess: Option<Guess>,
    /// Present only in the errored phase.
    last_error: Option<String>,
}

impl GameSession {
    fn new() -> Self {
        Self {
            phase: GamePhase::NotStarted,
            question_count: 0,
            lives: STARTING_LIVES,
            current_question: None,
            current_guess: None,
            last_error: None,
        }
    }
}

/// Drives one game session against an oracle.
#[derive(Debug)]
pub struct GameMaster<O, S> {
    oracle: O,
    store: S,
    session: GameSession,
    scores: Vec<u32>,
    busy: bool,
}

impl<O: OracleClient, S: ScoreStore> GameMaster<O, S> {
    /// Creates a game master, loading the score history from the store.
    #[instrument(skip(oracle, store))]
    pub fn new(oracle: O, store: S) -> Self {
        let scores = store.load();
        info!(score_count = scores.len(), "Creating game master");
        Self {
            oracle,
            store,
            session: GameSession::new(),
            scores,
            busy: false,
        }
    }

    /// Current session state.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Win scores, oldest first.
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Whether an oracle call is in flight.
    pub fn busy(&self) -> bool {
        self.busy
    }

    /// The oracle client, for inspection.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Starts a fresh session, discarding any previous conversation.
    ///
    /// Valid from `NotStarted`, `Won`, and `Lost`. Delivers either the first
    /// question (`AwaitingAnswer`) or an error (`Errored`).
    #[instrument(skip(self))]
    pub async fn start(&mut self) {
        if !self.accepts(
            "start",
            &[GamePhase::NotStarted, GamePhase::Won, GamePhase::Lost],
        ) {
            return;
        }

        info!("Starting new session");
        self.busy = true;
        self.session = GameSession::new();
        self.oracle.open_conversation(SYSTEM_INSTRUCTION);
        self.exchange(INITIAL_PROMPT, false).await;
        self.busy = false;
    }

    /// Submits the player's answer to the current question.
    ///
    /// Valid only in `AwaitingAnswer`. Delivers the next question, a guess,
    /// or an error.
    #[instrument(skip(self, answer))]
    pub async fn submit_answer(&mut self, answer: &str) {
        if !self.accepts("submit_answer", &[GamePhase::AwaitingAnswer]) {
            return;
        }

        debug!(answer_len = answer.len(), "Submitting answer");
        self.busy = true;
        self.exchange(answer, true).await;
        self.busy = false;
    }

    /// Confirms or rejects the oracle's current guess.
    ///
    /// Valid only in `AwaitingGuessConfirmation`. A confirmed guess records
    /// the score and wins; a rejected guess costs a life and either loses
    /// the game or sends the oracle back to questioning.
    #[instrument(skip(self))]
    pub async fn confirm_guess(&mut self, is_correct: bool) {
        if !self.accepts("confirm_guess", &[GamePhase::AwaitingGuessConfirmation]) {
            return;
        }

        if is_correct {
            let score = self.session.question_count;
            info!(score, "Guess confirmed, session won");
            self.scores.push(score);
            self.store.append(score);
            self.session.phase = GamePhase::Won;
            return;
        }

        self.session.lives -= 1;
        self.session.current_guess = None;

        if self.session.lives == 0 {
            info!("Out of lives, session lost");
            self.session.phase = GamePhase::Lost;
            return;
        }

        info!(lives = self.session.lives, "Wrong guess, resuming questions");
        self.busy = true;
        self.exchange(WRONG_GUESS_PROMPT, false).await;
        self.busy = false;
    }

    /// Discards the errored session and returns to `NotStarted`.
    #[instrument(skip(self))]
    pub fn retry(&mut self) {
        if !self.accepts("retry", &[GamePhase::Errored]) {
            return;
        }

        info!("Discarding errored session");
        self.session = GameSession::new();
    }

    /// Gate for user events: rejects anything out of phase or while an
    /// oracle call is in flight.
    fn accepts(&self, event: &str, valid: &[GamePhase]) -> bool {
        if self.busy {
            warn!(event, "Event rejected: oracle call in flight");
            return false;
        }
        if !valid.contains(&self.session.phase) {
            warn!(event, phase = ?self.session.phase, "Event rejected: wrong phase");
            return false;
        }
        true
    }

    /// One oracle round trip: send a message, classify the reply, apply it.
    ///
    /// A guess reply is accepted only during an answer exchange
    /// (`allow_guess`); on the opening and wrong-guess framing messages the
    /// oracle is required to come back with a question.
    async fn exchange(&mut self, message: &str, allow_guess: bool) {
        let raw = match self.oracle.send(message).await {
            Ok(raw) => raw,
            Err(e) => {
                self.fail_oracle(e);
                return;
            }
        };

        match classify(&raw) {
            Classified::Question(question) => self.deliver_question(question),
            Classified::Guess(guess) if allow_guess => self.deliver_guess(guess),
            Classified::Guess(guess) => {
                warn!(character = %guess.name, "Guess arrived outside an answer exchange");
                self.fail(ERROR_GENERIC);
            }
            Classified::Error { message, raw } => {
                // Raw text goes to the log only, never to the player.
                error!(reason = %message, raw = %raw, "Unclassifiable oracle reply");
                self.fail(ERROR_GENERIC);
            }
        }
    }

    fn deliver_question(&mut self, question: Question) {
        // The wrong-guess continuation redirects the oracle without a new
        // answer from the player, so it does not count as a question asked.
        if self.session.phase != GamePhase::AwaitingGuessConfirmation {
            self.session.question_count += 1;
        }
        debug!(count = self.session.question_count, "Question delivered");
        self.session.current_question = Some(question);
        self.session.current_guess = None;
        self.session.last_error = None;
        self.session.phase = GamePhase::AwaitingAnswer;
    }

    fn deliver_guess(&mut self, guess: Guess) {
        debug!(character = %guess.name, sureness = guess.sureness, "Guess delivered");
        self.session.current_guess = Some(guess);
        self.session.current_question = None;
        self.session.last_error = None;
        self.session.phase = GamePhase::AwaitingGuessConfirmation;
    }

    fn fail_oracle(&mut self, e: OracleError) {
        error!(error = %e, "Oracle call failed");
        let message = match e.kind {
            OracleErrorKind::SafetyBlocked => ERROR_SAFETY,
            _ => ERROR_GENERIC,
        };
        self.fail(message);
    }

    fn fail(&mut self, message: &str) {
        self.session.current_question = None;
        self.session.current_guess = None;
        self.session.last_error = Some(message.to_string());
        self.session.phase = GamePhase::Errored;
    }
}
