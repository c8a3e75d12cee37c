//! Project-manager sidebar frame: a static project tree plus the collapse
//! and open-project-folder controls. Both controls act through the bus; the
//! frame never touches shell layout itself.

use std::time::Instant;

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::Frame as TerminalFrame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use serde_json::json;

use crate::bus::MessageBus;
use crate::frames::Frame;
use crate::theme;
use crate::util::rect_contains;

pub struct ProjectManagerFrame {
    entries: Vec<&'static str>,
    collapse_rect: Option<Rect>,
    open_rect: Option<Rect>,
}

impl Default for ProjectManagerFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectManagerFrame {
    pub fn new() -> Self {
        Self {
            entries: vec![
                "scenes/",
                "  courtyard.usd",
                "  tower-block.usd",
                "assets/",
                "  materials/",
                "  textures/",
                "layouts/",
                "  site-plan.usd",
            ],
            collapse_rect: None,
            open_rect: None,
        }
    }
}

impl Frame for ProjectManagerFrame {
    fn name(&self) -> &'static str {
        "project-manager"
    }

    fn handle_event(
        &mut self,
        event: &Event,
        _area: Rect,
        _now: Instant,
        bus: &mut MessageBus,
    ) -> bool {
        let Event::Mouse(mouse) = event else {
            return false;
        };
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        if self
            .collapse_rect
            .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
        {
            bus.post(json!({"type": "pm:collapse"}));
            return true;
        }
        if self
            .open_rect
            .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
        {
            bus.post(json!({"type": "popup:open", "title": "Folders"}));
            return true;
        }
        false
    }

    fn render(&mut self, frame: &mut TerminalFrame, area: Rect, focused: bool) {
        self.collapse_rect = None;
        self.open_rect = None;
        if area.width < 4 || area.height < 3 {
            return;
        }
        let border_style = if focused {
            Style::default().fg(theme::handle_active_fg())
        } else {
            Style::default().fg(theme::muted_fg())
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" EXPLORER ");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        // Collapse control in the top-right corner of the chrome.
        let collapse = Rect {
            x: area.x + area.width.saturating_sub(4),
            y: area.y,
            width: 3,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new("[◂]").style(Style::default().fg(theme::chrome_fg())),
            collapse,
        );
        self.collapse_rect = Some(collapse);

        let mut lines: Vec<Line> = self
            .entries
            .iter()
            .map(|entry| Line::from(Span::styled(*entry, Style::default().fg(theme::chrome_fg()))))
            .collect();
        lines.truncate(inner.height.saturating_sub(2) as usize);
        frame.render_widget(Paragraph::new(lines), inner);

        // "Open Project Folder" button pinned to the bottom row.
        if inner.height >= 2 {
            let button = Rect {
                x: inner.x,
                y: inner.y + inner.height - 1,
                width: inner.width.min(22),
                height: 1,
            };
            frame.render_widget(
                Paragraph::new("[ Open Project Folder ]").style(
                    Style::default()
                        .fg(theme::chrome_fg())
                        .add_modifier(Modifier::BOLD),
                ),
                button,
            );
            self.open_rect = Some(button);
        }
    }
}
