//! UI-side application state.

use crossterm::event::KeyCode;
use tracing::debug;

use crate::oracle::OracleClient;
use crate::scores::ScoreStore;
use crate::session::{GameMaster, GamePhase, GameSession};

/// User events the UI can dispatch to the game worker.
#[derive(Debug, Clone)]
pub enum UiCommand {
    /// Start a new session.
    Start,
    /// Submit an answer to the current question.
    Answer(String),
    /// Confirm or reject the current guess.
    Confirm(bool),
    /// Discard an errored session.
    Retry,
}

/// Read-only snapshot of the game state, taken after each worker step.
#[derive(Debug, Clone)]
pub struct SessionView {
    /// Session state at snapshot time.
    pub session: GameSession,
    /// Win scores, oldest first.
    pub scores: Vec<u32>,
}

impl SessionView {
    /// Snapshots the given game master.
    pub fn of<O: OracleClient, S: ScoreStore>(master: &GameMaster<O, S>) -> Self {
        Self {
            session: master.session().clone(),
            scores: master.scores().to_vec(),
        }
    }
}

/// Main application state.
pub struct App {
    view: SessionView,
    loading: bool,
    input: String,
    selected: usize,
    should_quit: bool,
}

impl App {
    /// Creates the application from the initial snapshot.
    pub fn new(view: SessionView) -> Self {
        Self {
            view,
            loading: false,
            input: String::new(),
            selected: 0,
            should_quit: false,
        }
    }

    /// Latest snapshot.
    pub fn view(&self) -> &SessionView {
        &self.view
    }

    /// Whether a command is awaiting its snapshot.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Free-text answer being typed.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Index of the highlighted suggested answer.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Whether the player asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Applies a snapshot from the worker and clears the loading flag.
    pub fn apply_snapshot(&mut self, view: SessionView) {
        debug!(phase = ?view.session.phase(), "Applying snapshot");
        self.view = view;
        self.loading = false;
        self.input.clear();
        self.selected = 0;
    }

    /// Maps a key press to a command, if any.
    ///
    /// All game input is dropped while a command is in flight; only quitting
    /// stays available.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<UiCommand> {
        if key == KeyCode::Esc {
            self.should_quit = true;
            return None;
        }
        if self.loading {
            debug!("Input dropped while loading");
            return None;
        }

        match self.view.session.phase() {
            GamePhase::NotStarted | GamePhase::Won | GamePhase::Lost => match key {
                KeyCode::Enter => self.dispatch(UiCommand::Start),
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    None
                }
                _ => None,
            },
            GamePhase::Errored => match key {
                KeyCode::Enter | KeyCode::Char('r') => self.dispatch(UiCommand::Retry),
                _ => None,
            },
            GamePhase::AwaitingAnswer => self.handle_answer_key(key),
            GamePhase::AwaitingGuessConfirmation => match key {
                KeyCode::Char('y') => self.dispatch(UiCommand::Confirm(true)),
                KeyCode::Char('n') => self.dispatch(UiCommand::Confirm(false)),
                _ => None,
            },
        }
    }

    /// Key handling for the question screen: pick a suggested answer with
    /// Up/Down, or type a free-text answer. Enter submits whichever the
    /// player committed to.
    fn handle_answer_key(&mut self, key: KeyCode) -> Option<UiCommand> {
        let suggestions = self
            .view
            .session
            .current_question()
            .as_ref()
            .and_then(|q| q.answers.clone())
            .unwrap_or_default();

        match key {
            KeyCode::Up => {
                if !suggestions.is_empty() {
                    self.selected = self.selected.checked_sub(1).unwrap_or(suggestions.len() - 1);
                }
                None
            }
            KeyCode::Down => {
                if !suggestions.is_empty() {
                    self.selected = (self.selected + 1) % suggestions.len();
                }
                None
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            KeyCode::Enter => {
                let answer = if self.input.trim().is_empty() {
                    suggestions.get(self.selected).cloned()?
                } else {
                    self.input.trim().to_string()
                };
                self.dispatch(UiCommand::Answer(answer))
            }
            _ => None,
        }
    }

    fn dispatch(&mut self, cmd: UiCommand) -> Option<UiCommand> {
        debug!(?cmd, "Dispatching command");
        self.loading = true;
        Some(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleError;
    use crate::scores::MemoryScoreStore;
    use async_trait::async_trait;

    struct SilentOracle;

    #[async_trait]
    impl OracleClient for SilentOracle {
        fn open_conversation(&mut self, _system: &str) {}
        async fn send(&mut self, _message: &str) -> Result<String, OracleError> {
            Err(OracleError::empty_reply())
        }
    }

    fn fresh_app() -> App {
        let master = GameMaster::new(SilentOracle, MemoryScoreStore::new());
        App::new(SessionView::of(&master))
    }

    #[test]
    fn enter_starts_from_not_started() {
        let mut app = fresh_app();
        assert!(matches!(app.handle_key(KeyCode::Enter), Some(UiCommand::Start)));
        assert!(app.loading());
    }

    #[test]
    fn input_dropped_while_loading() {
        let mut app = fresh_app();
        app.handle_key(KeyCode::Enter);
        assert!(app.handle_key(KeyCode::Enter).is_none());
    }

    #[test]
    fn esc_quits_even_while_loading() {
        let mut app = fresh_app();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit());
    }
}
