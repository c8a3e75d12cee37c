//! App-launch confirmation modal: pre-populated from `showAppModal`, Open
//! closes the apps popup and opens the tab, then a loading state auto-hides
//! after a fixed delay.

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use ratatui::Frame as TerminalFrame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use serde_json::{Value, json};

use crate::bus::{AppRef, MessageBus};
use crate::frames::Frame;
use crate::theme;
use crate::util::rect_contains;

pub const LOADING_AUTO_HIDE: Duration = Duration::from_secs(5);

#[derive(Default)]
pub struct AppsModalFrame {
    app: Option<AppRef>,
    loading: bool,
    hide_deadline: Option<Instant>,
    dismiss_requested: bool,
    modal_rect: Option<Rect>,
    open_rect: Option<Rect>,
    cancel_rect: Option<Rect>,
}

impl AppsModalFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app(&self) -> Option<&AppRef> {
        self.app.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Dismiss notification for the shell, consumed once.
    pub fn take_dismiss(&mut self) -> bool {
        std::mem::take(&mut self.dismiss_requested)
    }

    fn open(&mut self, now: Instant, bus: &mut MessageBus) {
        let Some(app) = self.app.clone() else {
            return;
        };
        if self.loading {
            return;
        }
        // Close the apps popup immediately, then ask for the tab.
        bus.post(json!({"type": "closeAppsPopup"}));
        bus.post(json!({
            "type": "app:open",
            "appData": {"name": app.name, "icon": app.icon},
        }));
        self.loading = true;
        self.hide_deadline = Some(now + LOADING_AUTO_HIDE);
    }

    fn cancel(&mut self) {
        self.dismiss_requested = true;
    }
}

impl Frame for AppsModalFrame {
    fn name(&self) -> &'static str {
        "apps-modal"
    }

    fn handle_event(
        &mut self,
        event: &Event,
        _area: Rect,
        now: Instant,
        bus: &mut MessageBus,
    ) -> bool {
        match event {
            Event::Key(key) => match key.code {
                KeyCode::Enter => {
                    self.open(now, bus);
                    true
                }
                KeyCode::Esc => {
                    self.cancel();
                    true
                }
                _ => false,
            },
            Event::Mouse(mouse) => {
                if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
                    return false;
                }
                if self
                    .open_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    self.open(now, bus);
                    return true;
                }
                if self
                    .cancel_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    self.cancel();
                    return true;
                }
                // Clicking the backdrop dismisses, clicks on the modal body
                // are swallowed.
                if self
                    .modal_rect
                    .is_some_and(|rect| !rect_contains(rect, mouse.column, mouse.row))
                {
                    self.cancel();
                }
                true
            }
            _ => false,
        }
    }

    fn on_message(&mut self, value: &Value, _bus: &mut MessageBus) {
        match value.get("type").and_then(Value::as_str) {
            Some("showAppModal") | Some("showAppsModal") => {
                let Some(data) = value.get("appData") else {
                    return;
                };
                let Some(name) = data.get("name").and_then(Value::as_str) else {
                    return;
                };
                let icon = data.get("icon").and_then(Value::as_str).unwrap_or_default();
                self.app = Some(AppRef::new(name, icon));
                self.loading = false;
                self.hide_deadline = None;
            }
            _ => {}
        }
    }

    fn tick(&mut self, now: Instant, _bus: &mut MessageBus) {
        if self.hide_deadline.is_some_and(|deadline| now >= deadline) {
            self.hide_deadline = None;
            self.loading = false;
            self.dismiss_requested = true;
        }
    }

    fn render(&mut self, frame: &mut TerminalFrame, area: Rect, _focused: bool) {
        self.modal_rect = None;
        self.open_rect = None;
        self.cancel_rect = None;
        let Some(app) = self.app.clone() else {
            return;
        };
        let modal = crate::util::centered_rect(area, 36, 8);
        if modal.width < 12 || modal.height < 5 {
            return;
        }
        frame.render_widget(Clear, modal);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::dialog_fg()))
            .style(Style::default().bg(theme::dialog_bg()))
            .title(" Launch ");
        let inner = block.inner(modal);
        frame.render_widget(block, modal);
        self.modal_rect = Some(modal);

        let header = Line::from(vec![
            Span::styled(
                format!(" {} ", app.glyph()),
                Style::default()
                    .fg(theme::command_bubble_fg())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(app.name.clone(), Style::default().fg(theme::dialog_fg())),
        ]);
        frame.render_widget(
            Paragraph::new(header),
            Rect {
                x: inner.x,
                y: inner.y,
                width: inner.width,
                height: 1,
            },
        );

        let footer_y = inner.y + inner.height.saturating_sub(1);
        if self.loading {
            frame.render_widget(
                Paragraph::new("Loading...").style(Style::default().fg(theme::muted_fg())),
                Rect {
                    x: inner.x + 1,
                    y: footer_y,
                    width: inner.width.saturating_sub(2),
                    height: 1,
                },
            );
        } else {
            let open = Rect {
                x: inner.x + 1,
                y: footer_y,
                width: 8,
                height: 1,
            };
            let cancel = Rect {
                x: open.x + open.width + 2,
                y: footer_y,
                width: 10,
                height: 1,
            };
            frame.render_widget(
                Paragraph::new("[ Open ]").style(
                    Style::default()
                        .fg(theme::dialog_fg())
                        .add_modifier(Modifier::BOLD),
                ),
                open,
            );
            frame.render_widget(
                Paragraph::new("[ Cancel ]").style(Style::default().fg(theme::dialog_fg())),
                cancel,
            );
            self.open_rect = Some(open);
            self.cancel_rect = Some(cancel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn populate(modal: &mut AppsModalFrame, name: &str) {
        let mut bus = MessageBus::new();
        modal.on_message(
            &json!({"type": "showAppModal", "appData": {"name": name, "icon": "X"}}),
            &mut bus,
        );
    }

    #[test]
    fn show_message_populates_and_resets_loading() {
        let mut modal = AppsModalFrame::new();
        modal.loading = true;
        populate(&mut modal, "Revit");
        assert_eq!(modal.app().map(|a| a.name.as_str()), Some("Revit"));
        assert!(!modal.loading());
    }

    #[test]
    fn missing_app_data_is_ignored() {
        let mut modal = AppsModalFrame::new();
        let mut bus = MessageBus::new();
        modal.on_message(&json!({"type": "showAppModal"}), &mut bus);
        assert!(modal.app().is_none());
    }

    #[test]
    fn enter_posts_close_then_open_and_auto_hides() {
        let mut modal = AppsModalFrame::new();
        populate(&mut modal, "Blender");
        let mut bus = MessageBus::new();
        let now = Instant::now();
        let area = Rect::new(0, 0, 80, 24);
        let enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(modal.handle_event(&enter, area, now, &mut bus));
        let drained = bus.drain();
        assert_eq!(drained[0]["type"], "closeAppsPopup");
        assert_eq!(drained[1]["type"], "app:open");
        assert_eq!(drained[1]["appData"]["name"], "Blender");
        assert!(modal.loading());

        // A second Enter while loading posts nothing.
        assert!(modal.handle_event(&enter, area, now, &mut bus));
        assert!(bus.is_empty());

        modal.tick(now + Duration::from_secs(4), &mut bus);
        assert!(!modal.take_dismiss());
        modal.tick(now + LOADING_AUTO_HIDE, &mut bus);
        assert!(modal.take_dismiss());
        assert!(!modal.loading());
    }

    #[test]
    fn escape_requests_dismiss() {
        let mut modal = AppsModalFrame::new();
        populate(&mut modal, "Rhino");
        let mut bus = MessageBus::new();
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(modal.handle_event(&esc, Rect::new(0, 0, 80, 24), Instant::now(), &mut bus));
        assert!(modal.take_dismiss());
        assert!(!modal.take_dismiss());
    }
}
