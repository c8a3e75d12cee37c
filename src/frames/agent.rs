//! Chat-agent frame: transcript, auto-focusing input, and the canned reply.
//!
//! The agent never computes anything; every user message is answered with
//! the same canned block after a short delay. What matters here is the
//! keyboard-ownership handshake: the shell watches `take_focus_change` and
//! acquires/releases the agent's claim on raw keydowns accordingly, and a
//! pre-collapse notification blurs the input so ownership returns before the
//! panel disappears.

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyModifiers, MouseButton, MouseEventKind};
use indoc::indoc;
use ratatui::Frame as TerminalFrame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use serde_json::{Value, json};

use crate::bus::MessageBus;
use crate::frames::Frame;
use crate::theme;
use crate::util::rect_contains;

pub const REPLY_DELAY: Duration = Duration::from_millis(200);

/// The fixed reply every prompt receives.
pub const CANNED_REPLY: &str = indoc! {"
    Lognode : v4.9.a

    Pretext: fral nexu qinor belta syn varinex loopra delt maron 78.4.

    1) Nex : 42.01 : pelq runa : trix-α7
    2) Mod : 9x4.23 / tol : 0.6f
    3) Sel : q-chan 12b : reff loop.on
    4) Val : set=Δ3.9 / port: v-12k
    5) Bind : jex-23.08 : path_4 : alt-syn off

    Endtext: korv relin datu spun varel 9.07 — fin exlo parax lum.
"};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

pub struct AgentFrame {
    transcript: Vec<ChatMessage>,
    input: String,
    input_focused: bool,
    focus_change: Option<bool>,
    reply_due: Option<Instant>,
    username: String,
    collapse_rect: Option<Rect>,
    input_rect: Option<Rect>,
}

impl Default for AgentFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentFrame {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            input: String::new(),
            input_focused: false,
            focus_change: None,
            reply_due: None,
            username: "user".to_string(),
            collapse_rect: None,
            input_rect: None,
        }
    }

    /// Derive the transcript username from the selected account email: the
    /// part before `@`, falling back to `user` when the lookup fails.
    pub fn set_username_from_email(&mut self, email: &str) {
        self.username = match email.split_once('@') {
            Some((name, _)) if !name.is_empty() => name.to_string(),
            _ => "user".to_string(),
        };
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Where the input box was drawn last frame, for callers that focus it
    /// programmatically.
    pub fn input_rect(&self) -> Option<Rect> {
        self.input_rect
    }

    pub fn focus_input(&mut self) {
        if !self.input_focused {
            self.input_focused = true;
            self.focus_change = Some(true);
        }
    }

    pub fn blur_input(&mut self) {
        if self.input_focused {
            self.input_focused = false;
            self.focus_change = Some(false);
        }
    }

    /// Focus/blur notification for the shell, consumed once.
    pub fn take_focus_change(&mut self) -> Option<bool> {
        self.focus_change.take()
    }

    fn submit(&mut self, now: Instant) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.transcript.push(ChatMessage {
            role: ChatRole::User,
            text,
        });
        self.input.clear();
        self.reply_due = Some(now + REPLY_DELAY);
    }
}

impl Frame for AgentFrame {
    fn name(&self) -> &'static str {
        "agent"
    }

    fn handle_event(
        &mut self,
        event: &Event,
        area: Rect,
        now: Instant,
        bus: &mut MessageBus,
    ) -> bool {
        match event {
            Event::Mouse(mouse) => {
                if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
                    return false;
                }
                if self
                    .collapse_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    // Warn the shell before requesting the collapse so any
                    // active panel drag is torn down first.
                    bus.post(json!({"type": "agent:pre-collapse"}));
                    bus.post(json!({"type": "agent:collapse"}));
                    return true;
                }
                if rect_contains(area, mouse.column, mouse.row) {
                    // Clicking the transcript or the input places the caret
                    // in the textarea for quick typing.
                    self.focus_input();
                    return true;
                }
                false
            }
            Event::Key(key) => {
                if !self.input_focused {
                    return false;
                }
                match key.code {
                    KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                        self.input.push('\n');
                    }
                    KeyCode::Enter => self.submit(now),
                    KeyCode::Backspace => {
                        self.input.pop();
                    }
                    KeyCode::Char(c) => self.input.push(c),
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }

    fn on_message(&mut self, value: &Value, _bus: &mut MessageBus) {
        match value.get("type").and_then(Value::as_str) {
            Some("agent:pre-collapse") => self.blur_input(),
            _ => {}
        }
    }

    fn tick(&mut self, now: Instant, _bus: &mut MessageBus) {
        if self.reply_due.is_some_and(|due| now >= due) {
            self.reply_due = None;
            self.transcript.push(ChatMessage {
                role: ChatRole::Bot,
                text: CANNED_REPLY.to_string(),
            });
        }
    }

    fn render(&mut self, frame: &mut TerminalFrame, area: Rect, _focused: bool) {
        self.collapse_rect = None;
        self.input_rect = None;
        if area.width < 6 || area.height < 6 {
            return;
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::muted_fg()))
            .title(" AGENT ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let collapse = Rect {
            x: area.x + area.width.saturating_sub(4),
            y: area.y,
            width: 3,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new("[▸]").style(Style::default().fg(theme::chrome_fg())),
            collapse,
        );
        self.collapse_rect = Some(collapse);

        let input_height = 3.min(inner.height.saturating_sub(1));
        let transcript_area = Rect {
            x: inner.x,
            y: inner.y,
            width: inner.width,
            height: inner.height.saturating_sub(input_height),
        };
        let input_area = Rect {
            x: inner.x,
            y: inner.y + transcript_area.height,
            width: inner.width,
            height: input_height,
        };

        let mut lines: Vec<Line> = Vec::new();
        for message in &self.transcript {
            match message.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        self.username.clone(),
                        Style::default()
                            .fg(theme::agent_user_fg())
                            .add_modifier(Modifier::BOLD),
                    )));
                    for text_line in message.text.lines() {
                        lines.push(Line::from(text_line.to_string()));
                    }
                }
                ChatRole::Bot => {
                    for text_line in message.text.lines() {
                        lines.push(Line::from(Span::styled(
                            text_line.to_string(),
                            Style::default().fg(theme::chrome_fg()),
                        )));
                    }
                }
            }
        }
        let overflow = lines.len().saturating_sub(transcript_area.height as usize);
        let visible: Vec<Line> = lines.into_iter().skip(overflow).collect();
        frame.render_widget(Paragraph::new(visible).wrap(Wrap { trim: false }), transcript_area);

        let input_style = if self.input_focused {
            Style::default().fg(theme::handle_active_fg())
        } else {
            Style::default().fg(theme::muted_fg())
        };
        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(input_style);
        let input_inner = input_block.inner(input_area);
        frame.render_widget(input_block, input_area);
        frame.render_widget(
            Paragraph::new(self.input.as_str()).style(Style::default().fg(theme::chrome_fg())),
            input_inner,
        );
        self.input_rect = Some(input_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, MouseEvent};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn click_inside_focuses_input() {
        let mut agent = AgentFrame::new();
        let mut bus = MessageBus::new();
        let area = Rect::new(80, 2, 36, 30);
        assert!(agent.handle_event(&click(90, 10), area, Instant::now(), &mut bus));
        assert!(agent.input_focused());
        assert_eq!(agent.take_focus_change(), Some(true));
        assert_eq!(agent.take_focus_change(), None);
    }

    #[test]
    fn submit_schedules_canned_reply() {
        let mut agent = AgentFrame::new();
        let mut bus = MessageBus::new();
        let area = Rect::new(0, 0, 40, 30);
        agent.focus_input();
        let now = Instant::now();
        for c in "hello".chars() {
            agent.handle_event(&key(KeyCode::Char(c)), area, now, &mut bus);
        }
        agent.handle_event(&key(KeyCode::Enter), area, now, &mut bus);
        assert_eq!(agent.transcript().len(), 1);
        assert_eq!(agent.transcript()[0].role, ChatRole::User);
        // Reply is not delivered before the delay elapses.
        agent.tick(now, &mut bus);
        assert_eq!(agent.transcript().len(), 1);
        agent.tick(now + REPLY_DELAY, &mut bus);
        assert_eq!(agent.transcript().len(), 2);
        assert_eq!(agent.transcript()[1].role, ChatRole::Bot);
        assert!(agent.transcript()[1].text.contains("Lognode"));
    }

    #[test]
    fn empty_submit_is_ignored() {
        let mut agent = AgentFrame::new();
        let mut bus = MessageBus::new();
        let area = Rect::new(0, 0, 40, 30);
        agent.focus_input();
        agent.handle_event(&key(KeyCode::Enter), area, Instant::now(), &mut bus);
        assert!(agent.transcript().is_empty());
    }

    #[test]
    fn keys_ignored_without_focus() {
        let mut agent = AgentFrame::new();
        let mut bus = MessageBus::new();
        let area = Rect::new(0, 0, 40, 30);
        assert!(!agent.handle_event(&key(KeyCode::Char('x')), area, Instant::now(), &mut bus));
        assert!(agent.input().is_empty());
    }

    #[test]
    fn collapse_button_posts_pre_collapse_then_collapse() {
        let mut agent = AgentFrame::new();
        agent.collapse_rect = Some(Rect::new(36, 0, 3, 1));
        let mut bus = MessageBus::new();
        let area = Rect::new(0, 0, 40, 30);
        assert!(agent.handle_event(&click(37, 0), area, Instant::now(), &mut bus));
        let drained = bus.drain();
        assert_eq!(drained[0]["type"], "agent:pre-collapse");
        assert_eq!(drained[1]["type"], "agent:collapse");
    }

    #[test]
    fn pre_collapse_message_blurs_input() {
        let mut agent = AgentFrame::new();
        let mut bus = MessageBus::new();
        agent.focus_input();
        agent.take_focus_change();
        agent.on_message(&json!({"type": "agent:pre-collapse"}), &mut bus);
        assert!(!agent.input_focused());
        assert_eq!(agent.take_focus_change(), Some(false));
    }

    #[test]
    fn username_derived_from_email() {
        let mut agent = AgentFrame::new();
        agent.set_username_from_email("valleyvarun@gmail.com");
        assert_eq!(agent.username(), "valleyvarun");
        agent.set_username_from_email("not-an-email");
        assert_eq!(agent.username(), "user");
    }
}
