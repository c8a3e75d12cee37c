//! Rendering for the shell chrome. Hit rects for every interactive region
//! are recorded here each frame and consumed by the next event dispatch;
//! frames receive their ready signal after their first render, which is what
//! releases any queued shell-to-frame messages.

use ratatui::Frame as TerminalFrame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::{Shell, TabHit};
use crate::debug_log;
use crate::frames::Frame;
use crate::prompt::PromptMode;
use crate::theme;
use crate::util::centered_rect;

const HISTORY_ROWS: u16 = 4;
const HISTORY_ROWS_EXPANDED: u16 = 10;

impl Shell {
    pub fn render(&mut self, frame: &mut TerminalFrame) {
        let area = frame.area();
        self.viewport = area;
        // Frame-batched size writes: at most one layout write per paint,
        // and only if the drag is still active.
        self.apply_pending_resizes();
        self.hits.begin_frame();
        if area.width < 20 || area.height < 12 {
            frame.render_widget(
                Paragraph::new("terminal too small").style(Style::default().fg(theme::muted_fg())),
                area,
            );
            return;
        }

        let header = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        };
        let history_height = if self.history_expanded {
            HISTORY_ROWS_EXPANDED
        } else {
            HISTORY_ROWS
        };
        let history = Rect {
            x: area.x,
            y: header.y + 1,
            width: area.width,
            height: history_height,
        };
        let command = Rect {
            x: area.x,
            y: history.y + history.height,
            width: area.width,
            height: 1,
        };
        let body = Rect {
            x: area.x,
            y: command.y + 1,
            width: area.width,
            height: area.height.saturating_sub(2 + history_height),
        };

        self.render_header(frame, header);
        self.render_history(frame, history);
        self.render_command_line(frame, command);
        self.render_body(frame, body);

        if self.popup_visible {
            let popup_area = centered_rect(
                area,
                (area.width * 3 / 5).max(40),
                (area.height * 7 / 10).max(12),
            );
            self.hits.popup_area = popup_area;
            self.popup.frame.render(frame, popup_area, true);
            self.popup.mark_ready();
        }
        if self.app_modal_visible {
            self.app_modal.frame.render(frame, area, true);
            self.app_modal.mark_ready();
        }
        if self.debug_visible {
            self.render_debug_overlay(frame, area);
        }
    }

    fn apply_pending_resizes(&mut self) {
        if let Some(width) = self.explorer_resize.take_pending() {
            self.set_explorer_width(width);
        }
        if let Some(width) = self.agent_resize.take_pending() {
            self.set_agent_width(width);
        }
    }

    fn render_header(&mut self, frame: &mut TerminalFrame, area: Rect) {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " OMNIVERSE",
                Style::default()
                    .fg(theme::header_fg())
                    .add_modifier(Modifier::BOLD),
            )))
            .style(Style::default().bg(theme::header_bg())),
            area,
        );
        let email = self.selected_account().to_string();
        let width = (email.len() as u16).min(area.width.saturating_sub(2));
        let account = Rect {
            x: area.x + area.width.saturating_sub(width + 2),
            y: area.y,
            width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(email).style(
                Style::default()
                    .fg(theme::chrome_fg())
                    .bg(theme::header_bg()),
            ),
            account,
        );
        self.hits.account = Some(account);
    }

    fn render_history(&mut self, frame: &mut TerminalFrame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for entry in self.prompt.history() {
            if let Some(command) = &entry.command {
                lines.push(Line::from(Span::styled(
                    format!("> {command}"),
                    Style::default()
                        .fg(theme::command_bubble_fg())
                        .add_modifier(Modifier::BOLD),
                )));
            }
            for text in &entry.lines {
                lines.push(Line::from(Span::styled(
                    text.clone(),
                    Style::default().fg(theme::chrome_fg()),
                )));
            }
        }
        // Latest content stays pinned to the bottom of the strip.
        let overflow = lines.len().saturating_sub(area.height as usize);
        let visible: Vec<Line> = lines.into_iter().skip(overflow).collect();
        let pad = area.height.saturating_sub(visible.len() as u16);
        let inner = Rect {
            x: area.x + 1,
            y: area.y + pad,
            width: area.width.saturating_sub(4),
            height: area.height - pad,
        };
        frame.render_widget(
            Paragraph::new("").style(Style::default().bg(theme::chrome_bg())),
            area,
        );
        frame.render_widget(Paragraph::new(visible), inner);

        let toggle = Rect {
            x: area.x + area.width.saturating_sub(3),
            y: area.y + area.height / 2,
            width: 1,
            height: 1,
        };
        let glyph = if self.history_expanded { "▲" } else { "▼" };
        frame.render_widget(
            Paragraph::new(glyph).style(Style::default().fg(theme::muted_fg())),
            toggle,
        );
        self.hits.history_toggle = Some(toggle);
    }

    fn render_command_line(&mut self, frame: &mut TerminalFrame, area: Rect) {
        let (prefix_style, text) = match self.prompt.mode() {
            PromptMode::Input => (
                Style::default().fg(theme::command_bubble_fg()),
                self.prompt.buffer().to_string(),
            ),
            PromptMode::Confirmation => (
                Style::default().fg(theme::muted_fg()),
                "awaiting confirmation".to_string(),
            ),
        };
        let line = Line::from(vec![
            Span::styled("> ", prefix_style.add_modifier(Modifier::BOLD)),
            Span::styled(text, Style::default().fg(theme::chrome_fg())),
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(theme::chrome_bg())),
            area,
        );
        self.hits.command_line = Some(area);
    }

    fn render_body(&mut self, frame: &mut TerminalFrame, body: Rect) {
        if body.width < 8 || body.height == 0 {
            return;
        }

        // Explorer sidebar (left).
        let explorer_cols = if self.explorer.collapsed() {
            1
        } else {
            self.explorer_width.min(body.width / 2)
        };
        let explorer_region = Rect {
            x: body.x,
            y: body.y,
            width: explorer_cols,
            height: body.height,
        };
        if self.explorer.collapsed() {
            self.render_reopen_strip(frame, explorer_region, "▸");
            self.hits.explorer_reopen = Some(explorer_region);
        } else {
            let pane = Rect {
                width: explorer_region.width.saturating_sub(1),
                ..explorer_region
            };
            self.hits.explorer_area = pane;
            self.pm.frame.render(frame, pane, false);
            self.pm.mark_ready();
            let handle = Rect {
                x: explorer_region.x + explorer_region.width - 1,
                y: explorer_region.y,
                width: 1,
                height: explorer_region.height,
            };
            self.render_handle(frame, handle, self.explorer_resize.dragging());
            self.hits.explorer_handle = Some(handle);
        }

        // Agent panel (right).
        let agent_cols = if self.agent_panel.collapsed() {
            1
        } else {
            self.agent_width
                .min(body.width.saturating_sub(explorer_cols + 8))
        };
        let agent_region = Rect {
            x: body.x + body.width.saturating_sub(agent_cols),
            y: body.y,
            width: agent_cols,
            height: body.height,
        };
        if self.agent_panel.collapsed() {
            self.render_reopen_strip(frame, agent_region, "◂");
            self.hits.agent_reopen = Some(agent_region);
        } else {
            let handle = Rect {
                x: agent_region.x,
                y: agent_region.y,
                width: 1,
                height: agent_region.height,
            };
            self.render_handle(frame, handle, self.agent_resize.dragging());
            self.hits.agent_handle = Some(handle);
            let pane = Rect {
                x: agent_region.x + 1,
                width: agent_region.width.saturating_sub(1),
                ..agent_region
            };
            self.hits.agent_area = pane;
            self.agent.frame.render(frame, pane, self.owner.agent_owns());
            self.agent.mark_ready();
        }

        // Tabbed content (center).
        let center = Rect {
            x: explorer_region.x + explorer_region.width,
            y: body.y,
            width: body
                .width
                .saturating_sub(explorer_region.width + agent_region.width),
            height: body.height,
        };
        if center.width < 4 {
            return;
        }
        let tab_row = Rect { height: 1, ..center };
        self.render_tab_strip(frame, tab_row);
        let content_area = Rect {
            x: center.x,
            y: center.y + 1,
            width: center.width,
            height: center.height.saturating_sub(1),
        };
        self.hits.content_area = content_area;
        let active = self.tabs.active().cloned();
        self.content.frame.set_active_tab(active.as_ref());
        self.content.frame.render(frame, content_area, false);
        self.content.mark_ready();
    }

    fn render_tab_strip(&mut self, frame: &mut TerminalFrame, area: Rect) {
        let mut x = area.x;
        let mut push_tab = |frame: &mut TerminalFrame,
                            hits: &mut Vec<(Rect, TabHit)>,
                            label: String,
                            active: bool,
                            hit: TabHit,
                            x: &mut u16| {
            let width = label.len() as u16 + 2;
            if *x + width > area.x + area.width {
                return;
            }
            let rect = Rect {
                x: *x,
                y: area.y,
                width,
                height: 1,
            };
            let style = if active {
                Style::default()
                    .fg(theme::header_fg())
                    .bg(theme::tab_active_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::tab_inactive_fg())
            };
            frame.render_widget(Paragraph::new(format!(" {label} ")).style(style), rect);
            hits.push((rect, hit));
            *x += width;
        };

        push_tab(
            frame,
            &mut self.hits.tabs,
            "Home".to_string(),
            self.tabs.active_index().is_none(),
            TabHit::Activate(None),
            &mut x,
        );
        let labels: Vec<(String, bool)> = self
            .tabs
            .tabs()
            .iter()
            .enumerate()
            .map(|(index, tab)| (tab.title(), self.tabs.active_index() == Some(index)))
            .collect();
        for (index, (title, active)) in labels.into_iter().enumerate() {
            push_tab(
                frame,
                &mut self.hits.tabs,
                title,
                active,
                TabHit::Activate(Some(index)),
                &mut x,
            );
            // Close control immediately after the tab label; Home has none.
            push_tab(
                frame,
                &mut self.hits.tabs,
                "✕".to_string(),
                false,
                TabHit::Close(index),
                &mut x,
            );
        }
    }

    fn render_reopen_strip(&mut self, frame: &mut TerminalFrame, area: Rect, glyph: &str) {
        for y in area.y..area.y + area.height {
            frame.render_widget(
                Paragraph::new(glyph).style(Style::default().fg(theme::handle_fg())),
                Rect {
                    x: area.x,
                    y,
                    width: 1,
                    height: 1,
                },
            );
        }
    }

    fn render_handle(&mut self, frame: &mut TerminalFrame, area: Rect, dragging: bool) {
        let style = if dragging {
            Style::default().fg(theme::handle_active_fg())
        } else {
            Style::default().fg(theme::handle_fg())
        };
        for y in area.y..area.y + area.height {
            frame.render_widget(
                Paragraph::new("║").style(style),
                Rect {
                    x: area.x,
                    y,
                    width: 1,
                    height: 1,
                },
            );
        }
    }

    fn render_debug_overlay(&mut self, frame: &mut TerminalFrame, area: Rect) {
        let height = 10.min(area.height);
        let overlay = Rect {
            x: area.x,
            y: area.y + area.height - height,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, overlay);
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(theme::muted_fg()))
            .title(" debug ");
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);
        let lines: Vec<Line> = debug_log::global()
            .map(|handle| handle.tail(inner.height as usize))
            .unwrap_or_default()
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Style::default().fg(theme::debug_fg()))))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
