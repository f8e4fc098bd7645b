//! # Terminal UI
//!
//! Interactive front end over a [`Session`]: chat transcript on the left, plan preview
//! (or the log panel) on the right, an input line at the bottom.
//!
//! Keys: `Enter` sends the input as an instruction, or opens a project when the input
//! is `/open <dir>`. `F5` applies the current plan, `F2` toggles offline mode, `Tab`
//! switches the right panel between preview and logs, `Ctrl+Q` quits.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use tokio::sync::mpsc;

use crate::application::fetch::FetchEvent;
use crate::application::render::render_preview;
use crate::application::session::{Session, SessionUpdate};
use crate::infrastructure::tui::LogBuffer;
use crate::strings::messages;

const OPEN_COMMAND: &str = "/open";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SidePanel {
    Preview,
    Logs,
}

pub struct TuiApp {
    session: Session,
    events: mpsc::UnboundedReceiver<FetchEvent>,
    logs: LogBuffer,
    input_buffer: String,
    status: String,
    panel: SidePanel,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(
        session: Session,
        events: mpsc::UnboundedReceiver<FetchEvent>,
        logs: LogBuffer,
    ) -> Self {
        Self {
            session,
            events,
            logs,
            input_buffer: String::new(),
            status: String::new(),
            panel: SidePanel::Preview,
            should_quit: false,
        }
    }

    /// Drive the UI until the user quits. Must run inside a tokio runtime: fetches are
    /// spawned on it while this loop keeps drawing.
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        loop {
            self.drain_events();

            terminal.draw(|f| self.draw(f))?;

            if event::poll(std::time::Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key);
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.status = match self.session.handle_event(event) {
                SessionUpdate::PlanLoaded { changes } => {
                    self.panel = SidePanel::Preview;
                    messages::plan_ready(changes, "")
                }
                SessionUpdate::FetchFailed(err) => messages::fetch_failed(&err.to_string()),
                SessionUpdate::DecodeFailed(err) => messages::decode_failed(&err.to_string()),
                SessionUpdate::Stale => continue,
            };
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.should_quit = true;
            }
            KeyCode::F(2) => {
                let offline = !self.session.offline();
                self.session.set_offline(offline);
                self.status = format!("Mode: {}", messages::mode_label(offline));
            }
            KeyCode::F(5) => self.apply(),
            KeyCode::Tab => {
                self.panel = match self.panel {
                    SidePanel::Preview => SidePanel::Logs,
                    SidePanel::Logs => SidePanel::Preview,
                };
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input_buffer.push(c)
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter => self.handle_submit(),
            _ => {}
        }
    }

    fn handle_submit(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        let input = input.trim();

        if let Some(dir) = open_target(input) {
            if dir.is_empty() {
                self.status = format!("Usage: {OPEN_COMMAND} <dir>");
                return;
            }
            self.status = match self.session.open_project(dir) {
                Ok(root) => messages::project_opened(&root.path().display().to_string()),
                Err(err) => err.to_string(),
            };
            return;
        }

        self.status = match self.session.send(input) {
            Some(_) => messages::WAITING_FOR_PLAN.to_string(),
            None => messages::EMPTY_INSTRUCTION.to_string(),
        };
    }

    fn apply(&mut self) {
        self.status = match self.session.apply() {
            Ok(Some(report)) => {
                tracing::info!("Apply finished: {}", report.summary());
                if report.all_applied() {
                    messages::CHANGES_APPLIED.to_string()
                } else {
                    format!(
                        "{} of {} change(s) failed, see transcript",
                        report.failures().count(),
                        report.entries.len()
                    )
                }
            }
            Ok(None) => messages::NO_PLAN.to_string(),
            Err(err) => messages::apply_failed(&err.to_string()),
        };
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Input
            ])
            .split(frame.area());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        self.draw_status(frame, chunks[0]);
        self.draw_transcript(frame, body[0]);
        match self.panel {
            SidePanel::Preview => self.draw_preview(frame, body[1]),
            SidePanel::Logs => self.draw_logs(frame, body[1]),
        }
        self.draw_input(frame, chunks[2]);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let project = self
            .session
            .root()
            .map(|r| r.path().display().to_string())
            .unwrap_or_else(|| "none (/open <dir>)".to_string());
        let line = Line::from(vec![
            Span::styled("Project: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(project),
            Span::raw("  |  "),
            Span::styled(
                messages::mode_label(self.session.offline()),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  |  "),
            Span::raw(self.status.as_str()),
            Span::raw(match self.session.pending_fetches() {
                0 => String::new(),
                n => format!("  ({n} pending)"),
            }),
        ]);
        let p = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).title("Plan Studio"));
        frame.render_widget(p, area);
    }

    fn draw_transcript(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for entry in self.session.transcript() {
            let color = match entry.who {
                messages::USER => Color::Yellow,
                messages::ASSISTANT => Color::Green,
                _ => Color::Magenta,
            };
            lines.push(Line::from(Span::styled(
                format!("{}:", entry.who),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            lines.extend(entry.text.lines().map(|l| Line::from(l.to_string())));
            lines.push(Line::default());
        }

        // Keep the newest lines in view.
        let visible = area.height.saturating_sub(2) as usize;
        let offset = lines.len().saturating_sub(visible);
        let offset = u16::try_from(offset).unwrap_or(u16::MAX);

        let p = Paragraph::new(lines)
            .scroll((offset, 0))
            .block(Block::default().borders(Borders::ALL).title("Chat"));
        frame.render_widget(p, area);
    }

    fn draw_preview(&self, frame: &mut Frame, area: Rect) {
        let text = match self.session.plan() {
            Some(_) => render_preview(&self.session.preview()),
            None => "No plan yet.".to_string(),
        };
        let p = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Plan preview (F5 apply)"));
        frame.render_widget(p, area);
    }

    fn draw_logs(&self, frame: &mut Frame, area: Rect) {
        if let Ok(logs) = self.logs.try_lock() {
            let skip_count = logs.len().saturating_sub(area.height as usize);
            let items: Vec<ListItem> = logs
                .iter()
                .skip(skip_count)
                .map(|entry| {
                    let style = match entry.level.as_str() {
                        "ERROR" => Style::default().fg(Color::Red),
                        "WARN" => Style::default().fg(Color::Yellow),
                        "INFO" => Style::default().fg(Color::Green),
                        _ => Style::default(),
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{} [{}] ", entry.timestamp, entry.level), style),
                        Span::raw(entry.message.as_str()),
                    ]))
                })
                .collect();

            let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Logs"));
            frame.render_widget(list, area);
        }
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let p = Paragraph::new(self.input_buffer.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Instruction (Enter send, F2 offline/online, Tab logs, Ctrl+Q quit)"),
        );
        frame.render_widget(p, area);
    }
}

/// The directory argument when `input` is the open command, `Some("")` when it has none.
fn open_target(input: &str) -> Option<&str> {
    match input.split_once(char::is_whitespace) {
        Some((OPEN_COMMAND, dir)) => Some(dir.trim()),
        None if input == OPEN_COMMAND => Some(""),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::AppConfig;
    use crate::infrastructure::tui::log_buffer;
    use tempfile::TempDir;

    fn app() -> TuiApp {
        let (session, events) = Session::new(AppConfig::default());
        TuiApp::new(session, events, log_buffer())
    }

    fn type_line(app: &mut TuiApp, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_open_send_apply_through_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = app();

        type_line(&mut app, &format!("/open {}", dir.path().display()));
        assert!(app.session.root().is_some());

        type_line(&mut app, "hello world");
        assert_eq!(app.status, messages::WAITING_FOR_PLAN);
        assert!(app.input_buffer.is_empty());

        let event = app.events.recv().await.unwrap();
        app.session.handle_event(event);
        assert!(app.session.plan().is_some());

        app.handle_key(KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE));
        assert_eq!(app.status, messages::CHANGES_APPLIED);
        assert!(dir.path().join("README.md").is_file());
    }

    /// Wait until the worker has queued an event without taking it off the channel.
    async fn until_delivered(app: &TuiApp) {
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while app.events.is_empty() {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_drain_events_loads_plan_into_status() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        type_line(&mut app, &format!("/open {}", dir.path().display()));
        app.panel = SidePanel::Logs;

        type_line(&mut app, "hello world");
        assert_eq!(app.session.pending_fetches(), 1);
        until_delivered(&app).await;
        app.drain_events();

        assert_eq!(app.status, messages::plan_ready(1, ""));
        assert_eq!(app.panel, SidePanel::Preview);
        assert!(app.session.plan().is_some());
        assert_eq!(app.session.pending_fetches(), 0);
    }

    #[tokio::test]
    async fn test_drain_events_drops_result_for_previous_project() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let mut app = app();
        type_line(&mut app, &format!("/open {}", first.path().display()));
        type_line(&mut app, "for the first project");

        type_line(&mut app, &format!("/open {}", second.path().display()));
        let status_after_open = app.status.clone();
        until_delivered(&app).await;
        app.drain_events();

        assert_eq!(app.status, status_after_open);
        assert!(app.session.plan().is_none());
        assert_eq!(app.session.pending_fetches(), 0);
    }

    #[test]
    fn test_open_requires_separator() {
        let mut app = app();
        assert_eq!(open_target("/open  site "), Some("site"));
        assert_eq!(open_target("/open"), Some(""));
        assert_eq!(open_target("/openfoo bar"), None);
        assert_eq!(open_target("please /open x"), None);

        type_line(&mut app, "/open");
        assert!(app.status.starts_with("Usage:"));
        assert!(app.session.root().is_none());
    }

    #[test]
    fn test_control_chords_are_not_typed() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT));
        assert_eq!(app.input_buffer, "xX");
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_apply_without_plan_reports_it() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE));
        assert_eq!(app.status, messages::NO_PLAN);
    }

    #[test]
    fn test_f2_toggles_mode() {
        let mut app = app();
        assert!(app.session.offline());
        app.handle_key(KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE));
        assert!(!app.session.offline());
    }

    #[test]
    fn test_ctrl_q_quits() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_blank_enter_prompts_for_instruction() {
        let mut app = app();
        type_line(&mut app, "   ");
        assert_eq!(app.status, messages::EMPTY_INSTRUCTION);
    }
}
