//! Terminal UI for the guessing game.
//!
//! The UI never touches the [`GameMaster`] directly: a worker task owns it
//! and processes one command at a time, sending back a state snapshot after
//! each. The UI keeps a loading flag between dispatching a command and
//! receiving its snapshot, and drops all input in between. That is the only
//! concurrency gate the game needs, since the worker is strictly sequential.

mod app;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::oracle::OracleClient;
use crate::scores::ScoreStore;
use crate::session::GameMaster;
use app::{App, SessionView, UiCommand};

/// Runs the game in the terminal until the player quits.
pub async fn run_game<O, S>(master: GameMaster<O, S>) -> Result<()>
where
    O: OracleClient + 'static,
    S: ScoreStore + 'static,
{
    // Log to a file so tracing output never corrupts the terminal.
    let log_file = std::fs::File::create("whoami_oracle.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!("Starting terminal UI");

    let initial = SessionView::of(&master);
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (snap_tx, snap_rx) = mpsc::unbounded_channel();
    spawn_worker(master, cmd_rx, snap_tx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, App::new(initial), cmd_tx, snap_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "UI loop error");
    }
    res
}

/// Spawns the task that owns the game master and serializes all events.
fn spawn_worker<O, S>(
    mut master: GameMaster<O, S>,
    mut cmd_rx: mpsc::UnboundedReceiver<UiCommand>,
    snap_tx: mpsc::UnboundedSender<SessionView>,
) where
    O: OracleClient + 'static,
    S: ScoreStore + 'static,
{
    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            debug!(?cmd, "Worker handling command");
            match cmd {
                UiCommand::Start => master.start().await,
                UiCommand::Answer(text) => master.submit_answer(&text).await,
                UiCommand::Confirm(is_correct) => master.confirm_guess(is_correct).await,
                UiCommand::Retry => master.retry(),
            }
            if snap_tx.send(SessionView::of(&master)).is_err() {
                debug!("UI gone, stopping worker");
                break;
            }
        }
    });
}

/// Draw/input loop.
async fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    cmd_tx: mpsc::UnboundedSender<UiCommand>,
    mut snap_rx: mpsc::UnboundedReceiver<SessionView>,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        while let Ok(view) = snap_rx.try_recv() {
            app.apply_snapshot(view);
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = app.handle_key(key.code) {
                        cmd_tx.send(cmd)?;
                    }
                }
            }
        }

        if app.should_quit() {
            info!("Player quit");
            return Ok(());
        }
    }
}
