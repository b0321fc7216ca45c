//! Who Am I? - a terminal guess-the-character game.
//!
//! The player thinks of a character and answers yes/no-style questions; an
//! LLM oracle narrows the field and eventually guesses, with a confidence
//! score. Wrong guesses cost the oracle a life; a confirmed guess wins and
//! records the question count as a score.
//!
//! # Architecture
//!
//! - **Session**: the [`GameMaster`] state machine driving one play-through
//! - **Oracle**: conversational LLM client (OpenAI or Anthropic)
//! - **Protocol**: classification of raw oracle replies into question,
//!   guess, or error
//! - **Scores**: append-only win-score persistence
//! - **Tui**: terminal presentation layer

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod oracle;
mod prompts;
mod protocol;
mod scores;
mod session;
mod tui;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - Oracle client
pub use oracle::{LlmOracle, OracleClient, OracleError, OracleErrorKind, OracleProvider};

// Crate-level exports - Reply classification
pub use protocol::{Classified, DEFAULT_GUESS_DESCRIPTION, Guess, Question, classify};

// Crate-level exports - Score persistence
pub use scores::{JsonScoreStore, MemoryScoreStore, ScoreStore, best};

// Crate-level exports - Session state machine
pub use session::{GameMaster, GamePhase, GameSession, STARTING_LIVES};

// Crate-level exports - Prompts
pub use prompts::{INITIAL_PROMPT, SYSTEM_INSTRUCTION, WRONG_GUESS_PROMPT};

// Crate-level exports - Terminal UI
pub use tui::run_game;
