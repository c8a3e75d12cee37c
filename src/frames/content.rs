//! Content frame: renders the active tab's surface — the Home view or a
//! launched application placeholder. Keyboard input landing here is
//! forwarded to the shell's router once binding succeeds; the frame itself
//! only draws.

use ratatui::Frame as TerminalFrame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::frames::Frame;
use crate::tabs::Tab;
use crate::theme;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentView {
    #[default]
    Home,
    Software {
        app_name: String,
    },
}

#[derive(Default)]
pub struct ContentFrame {
    view: ContentView,
}

impl ContentFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ContentView {
        &self.view
    }

    /// Swap the rendered surface for the active tab. Absent tab data means
    /// the Home view.
    pub fn set_active_tab(&mut self, tab: Option<&Tab>) {
        self.view = match tab {
            Some(tab) => ContentView::Software {
                app_name: tab.app_name.clone(),
            },
            None => ContentView::Home,
        };
    }
}

impl Frame for ContentFrame {
    fn name(&self) -> &'static str {
        "content"
    }

    fn render(&mut self, frame: &mut TerminalFrame, area: Rect, _focused: bool) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::muted_fg()));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        match &self.view {
            ContentView::Home => {
                let lines = vec![
                    Line::from(Span::styled(
                        "OMNIVERSE",
                        Style::default()
                            .fg(theme::header_fg())
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Type a command, or `apps` to browse applications.",
                        Style::default().fg(theme::muted_fg()),
                    )),
                ];
                frame.render_widget(Paragraph::new(lines), inner);
            }
            ContentView::Software { app_name } => {
                // Photoshop gets the demo canvas treatment; everything else
                // is a plain dark surface with the app name.
                let demo = app_name.eq_ignore_ascii_case("photoshop");
                let label = if demo {
                    format!("{app_name} — demo canvas")
                } else {
                    app_name.clone()
                };
                let style = if demo {
                    Style::default()
                        .fg(theme::command_bubble_fg())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme::chrome_fg())
                };
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(label, style))),
                    inner,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_tab_means_home() {
        let mut content = ContentFrame::new();
        content.set_active_tab(None);
        assert_eq!(*content.view(), ContentView::Home);
    }

    #[test]
    fn tab_selects_software_view() {
        let mut content = ContentFrame::new();
        let tab = Tab {
            app_name: "Photoshop".to_string(),
            icon: "Ps".to_string(),
            instance: 1,
        };
        content.set_active_tab(Some(&tab));
        assert_eq!(
            *content.view(),
            ContentView::Software {
                app_name: "Photoshop".to_string()
            }
        );
    }
}
