//! Interactive research console.
//!
//! A TUI where the user types a question, presses Enter, and reads the
//! agent's topic, summary, tools and sources. Requests run on background
//! tasks; their outcomes come back over a channel tagged with the sequence
//! number they were issued under, and [`QueryView::complete`] drops any that
//! a newer submission has superseded.
//!
//! Launch with `scout` or `scout console`.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use scout_client::AgentClient;
use scout_protocol::{AgentResponse, ResearchError};

use crate::archive;
use crate::config::ScoutConfig;
use crate::render::{RenderModel, ResultBlock};
use crate::view::{QueryView, Submission};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const MAX_CONSOLE_MESSAGES: usize = 500;

/// Words handled by the console itself. Anything else is sent to the agent.
const COMMANDS: [&str; 7] = ["/help", "/save", "/clear", "/history", "/quit", "/exit", "/q"];

type Outcome = (u64, Result<AgentResponse, ResearchError>);

struct ResearchConsole {
    view: QueryView,
    client: AgentClient,
    archive_path: PathBuf,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    /// Messages displayed in the console output area.
    console_messages: Vec<(chrono::DateTime<chrono::Utc>, String, Color)>,
    /// Scroll offset for the result panel.
    result_scroll: u16,
    /// Advances once per tick while a request is in flight.
    spinner_frame: usize,
}

impl ResearchConsole {
    fn new(
        client: AgentClient,
        archive_path: PathBuf,
        outcome_tx: mpsc::UnboundedSender<Outcome>,
    ) -> Self {
        let mut console = Self {
            view: QueryView::new(),
            client,
            archive_path,
            outcome_tx,
            console_messages: Vec::new(),
            result_scroll: 0,
            spinner_frame: 0,
        };
        console.add_message(
            &format!("Scout ready. Agent endpoint: {}", console.client.endpoint()),
            Color::Cyan,
        );
        console.add_message("Commands: /help, /save, /clear, /quit", Color::DarkGray);
        console
    }

    /// Handle Enter: a slash command or a research query.
    fn process_input(&mut self) {
        if !self.view.input_enabled() {
            return;
        }

        let input = self.view.query().trim().to_string();
        if is_command(&input) {
            self.process_command(&input);
            self.view.clear_query();
            return;
        }

        if let Some(submission) = self.view.begin_submit() {
            self.add_message(&format!("Researching: {}", submission.query), Color::Yellow);
            self.result_scroll = 0;
            self.spawn_request(submission);
        }
    }

    fn spawn_request(&self, submission: Submission) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = client.research(&submission.query).await;
            let _ = tx.send((submission.seq, outcome));
        });
    }

    /// Apply a finished request to the view.
    fn apply_outcome(&mut self, seq: u64, outcome: Result<AgentResponse, ResearchError>) {
        let summary = match &outcome {
            Ok(resp) => (format!("Result: {}", resp.topic), Color::Green),
            Err(e) => (format!("Error: {e}"), Color::Red),
        };
        if self.view.complete(seq, outcome) {
            self.add_message(&summary.0, summary.1);
        }
    }

    fn process_command(&mut self, cmd: &str) {
        let command = cmd.split_whitespace().next().unwrap_or(cmd);

        match command {
            "/help" => {
                self.add_message("Available commands:", Color::Cyan);
                self.add_message("  <text>     - Ask the research agent", Color::White);
                self.add_message("  /save      - Append the current result to the archive", Color::White);
                self.add_message("  /clear     - Clear the input, result and error", Color::White);
                self.add_message("  /history   - List previous queries", Color::White);
                self.add_message("  /help      - Show this help message", Color::White);
                self.add_message("  /quit      - Exit the console", Color::White);
            }
            "/save" => {
                let saved = self
                    .view
                    .result()
                    .map(|result| archive::append_result(&self.archive_path, result));
                match saved {
                    None => self.add_message("Nothing to save yet.", Color::Yellow),
                    Some(Ok(())) => {
                        let msg = format!("Saved to {}", self.archive_path.display());
                        self.add_message(&msg, Color::Green);
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Failed to archive result");
                        self.add_message(&format!("Save failed: {e}"), Color::Red);
                    }
                }
            }
            "/clear" => {
                self.view.reset_output();
                self.result_scroll = 0;
            }
            "/history" => {
                let history = self.view.history().to_vec();
                if history.is_empty() {
                    self.add_message("No previous queries.", Color::Yellow);
                } else {
                    self.add_message(&format!("Previous queries ({}):", history.len()), Color::Cyan);
                    for (i, q) in history.iter().enumerate() {
                        self.add_message(&format!("  {}. {}", i + 1, q), Color::White);
                    }
                }
            }
            _ => {
                // /quit, /exit and /q are handled in the event loop.
            }
        }
    }

    fn add_message(&mut self, msg: &str, color: Color) {
        self.console_messages
            .push((chrono::Utc::now(), msg.to_string(), color));
        if self.console_messages.len() > MAX_CONSOLE_MESSAGES {
            self.console_messages.remove(0);
        }
    }

    /// Render the full console layout.
    fn render(&self, frame: &mut Frame) {
        let model = RenderModel::from_view(&self.view);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(8),    // Result / error
                Constraint::Length(7), // Console output
                Constraint::Length(5), // Input area
            ])
            .split(frame.area());

        self.render_status_bar(frame, outer[0], &model);
        self.render_output(frame, outer[1], &model);
        self.render_console_output(frame, outer[2]);
        self.render_input(frame, outer[3], &model);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, model: &RenderModel) {
        let block = Block::default()
            .title(" Scout Research Agent ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let (status, status_color) = if model.loading {
            (
                format!("{} Researching...", SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]),
                Color::Yellow,
            )
        } else if model.error.is_some() {
            ("Error".to_string(), Color::Red)
        } else if model.result.is_some() {
            ("Done".to_string(), Color::Green)
        } else {
            ("Idle".to_string(), Color::Gray)
        };

        let line = Line::from(vec![
            Span::styled("  Agent: ", Style::default().fg(Color::Gray)),
            Span::styled(self.client.endpoint(), Style::default().fg(Color::White)),
            Span::styled("  |  Status: ", Style::default().fg(Color::Gray)),
            Span::styled(status, Style::default().fg(status_color)),
            Span::styled("  |  Queries: ", Style::default().fg(Color::Gray)),
            Span::styled(
                self.view.history().len().to_string(),
                Style::default().fg(Color::Magenta),
            ),
        ]);

        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    /// Error block and result block, each shown only when present.
    fn render_output(&self, frame: &mut Frame, area: Rect, model: &RenderModel) {
        let mut lines: Vec<Line> = Vec::new();

        if let Some(error) = model.error {
            lines.push(Line::from(vec![
                Span::styled(
                    "  ✗ ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(error, Style::default().fg(Color::Red)),
            ]));
            lines.push(Line::from(""));
        }

        if let Some(result) = &model.result {
            result_lines(result, &mut lines);
        }

        let block = Block::default()
            .title(" Research Result ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        if lines.is_empty() {
            let hint = if model.loading {
                "  Waiting for the agent..."
            } else {
                "  Ask anything, e.g. 'What is the capital of Tunisia?'"
            };
            let text = Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(text, area);
            return;
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.result_scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_console_output(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Console Output ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        let inner_height = area.height.saturating_sub(2) as usize;
        let start = self.console_messages.len().saturating_sub(inner_height);

        let lines: Vec<Line> = self.console_messages[start..]
            .iter()
            .map(|(ts, msg, color)| {
                Line::from(vec![
                    Span::styled(
                        format!("  [{}] ", ts.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(msg.as_str(), Style::default().fg(*color)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, model: &RenderModel) {
        let border = if model.input_enabled {
            Color::Green
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .title(" Query (Enter = ask, /help = commands) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let input_display = if model.query.is_empty() {
            Line::from(vec![
                Span::styled("  > ", Style::default().fg(border)),
                Span::styled(
                    "Ask anything, e.g. 'Explain quantum computing'",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled("  > ", Style::default().fg(border)),
                Span::styled(
                    model.query,
                    Style::default().fg(if model.input_enabled {
                        Color::White
                    } else {
                        Color::DarkGray
                    }),
                ),
            ])
        };

        let mut hints = vec![Span::styled(
            "  Ctrl+C or /quit to exit  |  Up/Down for history",
            Style::default().fg(Color::DarkGray),
        )];
        if model.show_clear {
            hints.push(Span::styled(
                "  |  Esc to clear",
                Style::default().fg(Color::DarkGray),
            ));
        }
        if !model.input_enabled {
            hints.push(Span::styled(
                "  |  waiting for agent",
                Style::default().fg(Color::Yellow),
            ));
        }

        let paragraph =
            Paragraph::new(vec![Line::from(""), input_display, Line::from(hints)]).block(block);
        frame.render_widget(paragraph, area);

        if model.input_enabled {
            let cursor_x = cursor_column(area, self.view.query(), self.view.cursor());
            let cursor_y = area.y + 2;
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    /// Handle keyboard input. Returns `true` if the console should exit.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return true,
            (KeyCode::Char('u'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => {
                if self.view.input_enabled() {
                    self.view.clear_query();
                }
            }
            (KeyCode::Char(c), _) => self.view.insert_char(c),
            (KeyCode::Backspace, _) => self.view.backspace(),
            (KeyCode::Delete, _) => self.view.delete(),
            (KeyCode::Left, _) => self.view.move_left(),
            (KeyCode::Right, _) => self.view.move_right(),
            (KeyCode::Home, _) => self.view.move_home(),
            (KeyCode::End, _) => self.view.move_end(),
            (KeyCode::Up, _) => self.view.history_prev(),
            (KeyCode::Down, _) => self.view.history_next(),
            (KeyCode::Enter, _) => self.process_input(),
            (KeyCode::PageUp, _) => {
                self.result_scroll = self.result_scroll.saturating_sub(5);
            }
            (KeyCode::PageDown, _) => {
                self.result_scroll = self.result_scroll.saturating_add(5);
            }
            _ => {}
        }
        false
    }
}

/// Whether `input` is one of the console's own commands.
fn is_command(input: &str) -> bool {
    input
        .split_whitespace()
        .next()
        .is_some_and(|word| COMMANDS.contains(&word))
}

/// Terminal column of the input cursor.
///
/// Measured in display cells after the `"  > "` prompt, clamped to the last
/// column inside the input box border.
fn cursor_column(area: Rect, query: &str, cursor: usize) -> u16 {
    let before: String = query.chars().take(cursor).collect();
    let width = u16::try_from(Span::raw(before).width()).unwrap_or(u16::MAX);
    let last_inner = area.x + area.width.saturating_sub(2);
    (area.x + 4).saturating_add(width).min(last_inner)
}

/// Styled lines of the result block.
fn result_lines<'a>(result: &ResultBlock<'a>, lines: &mut Vec<Line<'a>>) {
    lines.push(Line::from(vec![
        Span::styled("  Topic: ", Style::default().fg(Color::Gray)),
        Span::styled(
            result.topic,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(""));
    for text in result.summary.lines() {
        lines.push(Line::from(Span::styled(
            format!("  {text}"),
            Style::default().fg(Color::White),
        )));
    }

    if let Some(tools) = result.tools {
        lines.push(Line::from(""));
        let mut spans = vec![Span::styled("  Tools used: ", Style::default().fg(Color::Gray))];
        for tool in tools {
            spans.push(Span::styled(
                format!("[{tool}]"),
                Style::default().fg(Color::Magenta),
            ));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    if !result.sources.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Sources ({}):", result.sources.len()),
            Style::default().fg(Color::Gray),
        )));
        for link in &result.sources {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:>2}. ", link.position),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    link.url,
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                ),
            ]));
        }
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the console event loop until the user quits.
pub async fn run_console(config: &ScoutConfig) -> Result<(), anyhow::Error> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!(
            "The console requires a terminal (TTY). Use `scout ask <QUERY>` instead."
        ));
    }

    let client = config.build_client()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();
    let mut terminal = setup_terminal()?;
    let mut console = ResearchConsole::new(client, config.archive_path.clone(), outcome_tx);

    let tick_rate = Duration::from_millis(100);
    tracing::info!(endpoint = %console.client.endpoint(), "Console started");

    let result = loop {
        while let Ok((seq, outcome)) = outcome_rx.try_recv() {
            console.apply_outcome(seq, outcome);
        }
        if console.view.is_loading() {
            console.spinner_frame = console.spinner_frame.wrapping_add(1);
        }

        if let Err(e) = terminal.draw(|frame| console.render(frame)) {
            break Err(e.into());
        }

        match event::poll(tick_rate) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => break Err(e.into()),
        }
        let key_event = match event::read() {
            Ok(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => key_event,
            Ok(_) => continue,
            Err(e) => break Err(e.into()),
        };

        if key_event.code == KeyCode::Enter {
            let trimmed = console.view.query().trim();
            if trimmed == "/quit" || trimmed == "/exit" || trimmed == "/q" {
                break Ok(());
            }
        }
        if console.handle_key(key_event.code, key_event.modifiers) {
            break Ok(());
        }
    };

    restore_terminal(&mut terminal)?;
    tracing::info!("Console stopped");
    result
}
