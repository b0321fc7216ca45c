//! Stateless screen rendering.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::scores;
use crate::session::GamePhase;

use super::app::App;

/// Renders the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(10),   // Body
            Constraint::Length(3), // Status
        ])
        .split(area);

    let title = Paragraph::new("Who Am I? - Character Oracle")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    if app.loading() {
        draw_loading(frame, chunks[1]);
    } else {
        draw_body(frame, chunks[1], app);
    }

    draw_status(frame, chunks[2], app);
}

fn draw_loading(frame: &mut Frame, area: Rect) {
    let text = Paragraph::new("The oracle is thinking...")
        .style(Style::default().fg(Color::Magenta))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(text, pad_top(area));
}

fn draw_body(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.view().session;
    match session.phase() {
        GamePhase::NotStarted => draw_start(frame, area, app),
        GamePhase::AwaitingAnswer => draw_question(frame, area, app),
        GamePhase::AwaitingGuessConfirmation => draw_guess(frame, area, app),
        GamePhase::Won => draw_won(frame, area, app),
        GamePhase::Lost => draw_lost(frame, area),
        GamePhase::Errored => draw_error(frame, area, app),
    }
}

fn draw_start(frame: &mut Frame, area: Rect, app: &App) {
    let scores = &app.view().scores;
    let mut lines = vec![
        Line::from("Think of a real or fictional character."),
        Line::from("The oracle will try to read your mind."),
        Line::from(""),
    ];
    match scores::best(scores) {
        Some(best) => {
            lines.push(Line::from(format!(
                "Games won: {}   Best: guessed in {} questions",
                scores.len(),
                best
            )));
        }
        None => lines.push(Line::from("No wins recorded yet.")),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter to start",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));

    frame.render_widget(centered_paragraph(lines), pad_top(area));
}

fn draw_question(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.view().session;
    let Some(question) = session.current_question() else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            question.text.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(answers) = &question.answers {
        for (i, answer) in answers.iter().enumerate() {
            let style = if i == app.selected() {
                Style::default().bg(Color::White).fg(Color::Black)
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::from(Span::styled(format!("  {}  ", answer), style)));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(format!("Your answer: {}_", app.input())));

    let block = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Question {}",
            session.question_count()
        )));
    frame.render_widget(block, area);
}

fn draw_guess(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.view().session;
    let Some(guess) = session.current_guess() else {
        return;
    };

    let lines = vec![
        Line::from("I know who it is!"),
        Line::from(""),
        Line::from(Span::styled(
            guess.name.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(guess.description.clone()),
        Line::from(format!("Sureness: {}%", guess.sureness)),
        Line::from(""),
        Line::from("Am I right? (y/n)"),
    ];

    let block = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("The oracle guesses"));
    frame.render_widget(block, area);
}

fn draw_won(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.view().session;
    let name = session
        .current_guess()
        .as_ref()
        .map(|g| g.name.clone())
        .unwrap_or_default();

    let lines = vec![
        Line::from(Span::styled(
            "The oracle wins!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(name),
        Line::from(format!("Guessed in {} questions.", session.question_count())),
        Line::from(""),
        Line::from("Press Enter to play again, q to quit."),
    ];
    frame.render_widget(centered_paragraph(lines), pad_top(area));
}

fn draw_lost(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "You win - the oracle gives up!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from("Your mind was too hard to read."),
        Line::from(""),
        Line::from("Press Enter to play again, q to quit."),
    ];
    frame.render_widget(centered_paragraph(lines), pad_top(area));
}

fn draw_error(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.view().session;
    let message = session
        .last_error()
        .clone()
        .unwrap_or_else(|| "Something went wrong.".to_string());

    let lines = vec![
        Line::from(Span::styled(
            "Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(message),
        Line::from(""),
        Line::from("Press Enter to try again."),
    ];
    frame.render_widget(centered_paragraph(lines), pad_top(area));
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.view().session;
    let status = match session.phase() {
        GamePhase::AwaitingAnswer | GamePhase::AwaitingGuessConfirmation => format!(
            "Lives: {}   Questions: {}   Esc to quit",
            "\u{2665} ".repeat(*session.lives() as usize).trim_end(),
            session.question_count()
        ),
        _ => "Esc to quit".to_string(),
    };

    let widget = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn centered_paragraph(lines: Vec<Line<'static>>) -> Paragraph<'static> {
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

/// Pushes short content below the top edge so it sits nearer the middle.
fn pad_top(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(area.height / 4), Constraint::Min(1)])
        .split(area);
    chunks[1]
}
