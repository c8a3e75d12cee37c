//! Popup frame: the shared modal surface whose body is routed by the title
//! carried in `popup:init` — the Folders split view (with its own divider
//! drag), the Omniverse options, or the apps launcher list.

use std::time::Instant;

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::Frame as TerminalFrame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use serde_json::{Value, json};

use crate::bus::{AppRef, MessageBus};
use crate::frames::Frame;
use crate::panes::PaneLimits;
use crate::resize::{HandleSide, ResizeController};
use crate::theme;
use crate::util::rect_contains;

enum PopupBody {
    Empty,
    Omniverse {
        create_rect: Option<Rect>,
        open_rect: Option<Rect>,
    },
    Folders(FoldersView),
    Apps {
        item_rects: Vec<(Rect, usize)>,
    },
}

pub struct PopupFrame {
    title: String,
    body: PopupBody,
    apps: Vec<AppRef>,
    init_count: u32,
    close_rect: Option<Rect>,
    body_area: Rect,
}

impl PopupFrame {
    pub fn new(apps: Vec<AppRef>) -> Self {
        Self {
            title: String::new(),
            body: PopupBody::Empty,
            apps,
            init_count: 0,
            close_rect: None,
            body_area: Rect::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// How many `popup:init` messages have been applied.
    pub fn init_count(&self) -> u32 {
        self.init_count
    }

    /// True while the folders divider drag holds its capture overlay.
    pub fn capture_held(&self) -> bool {
        match &self.body {
            PopupBody::Folders(folders) => folders.split.capture_held(),
            _ => false,
        }
    }

    pub fn force_stop_drag(&mut self) {
        if let PopupBody::Folders(folders) = &mut self.body {
            folders.split.force_stop();
        }
    }

    pub fn expire_drag(&mut self, now: Instant) {
        if let PopupBody::Folders(folders) = &mut self.body {
            folders.split.expire_if_overdue(now);
        }
    }
}

impl Frame for PopupFrame {
    fn name(&self) -> &'static str {
        "popup"
    }

    fn handle_event(
        &mut self,
        event: &Event,
        _area: Rect,
        now: Instant,
        bus: &mut MessageBus,
    ) -> bool {
        // Route everything to an active divider drag first so pointer-ups
        // are never missed.
        if let PopupBody::Folders(folders) = &mut self.body
            && folders.split.capture_held()
        {
            folders.route_captured(event, self.body_area);
            return true;
        }

        let Event::Mouse(mouse) = event else {
            return false;
        };
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        if self
            .close_rect
            .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
        {
            bus.post(json!({"type": "popup:close"}));
            return true;
        }
        match &mut self.body {
            PopupBody::Empty => false,
            PopupBody::Omniverse {
                create_rect,
                open_rect,
            } => {
                if create_rect.is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row)) {
                    tracing::debug!("create new omniverse selected");
                    return true;
                }
                if open_rect.is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row)) {
                    tracing::debug!("open existing omniverse selected");
                    return true;
                }
                false
            }
            PopupBody::Folders(folders) => {
                if let Some(inner) = folders.handle_click(mouse.column, mouse.row, self.body_area, now)
                {
                    // The split view is embedded one level down; its close
                    // request is re-emitted upward as a popup close.
                    if inner.get("type").and_then(Value::as_str) == Some("folders:close") {
                        bus.post(json!({"type": "popup:close"}));
                    }
                    return true;
                }
                false
            }
            PopupBody::Apps { item_rects } => {
                for (rect, index) in item_rects.iter() {
                    if rect_contains(*rect, mouse.column, mouse.row) {
                        if let Some(app) = self.apps.get(*index) {
                            bus.post(json!({
                                "type": "showAppModal",
                                "appData": {"name": app.name, "icon": app.icon},
                            }));
                        }
                        return true;
                    }
                }
                false
            }
        }
    }

    fn on_message(&mut self, value: &Value, _bus: &mut MessageBus) {
        if value.get("type").and_then(Value::as_str) != Some("popup:init") {
            return;
        }
        let Some(title) = value.get("title").and_then(Value::as_str) else {
            return;
        };
        self.init_count += 1;
        self.title = title.to_string();
        self.body = match title.trim().to_ascii_lowercase().as_str() {
            "omniverse" => PopupBody::Omniverse {
                create_rect: None,
                open_rect: None,
            },
            "folders" => PopupBody::Folders(FoldersView::new()),
            "apps" => PopupBody::Apps {
                item_rects: Vec::new(),
            },
            _ => PopupBody::Empty,
        };
    }

    fn tick(&mut self, now: Instant, _bus: &mut MessageBus) {
        self.expire_drag(now);
    }

    fn render(&mut self, frame: &mut TerminalFrame, area: Rect, _focused: bool) {
        self.close_rect = None;
        self.body_area = Rect::default();
        if area.width < 10 || area.height < 6 {
            return;
        }
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::dialog_fg()))
            .style(Style::default().bg(theme::dialog_bg()))
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let close = Rect {
            x: area.x + area.width.saturating_sub(4),
            y: area.y,
            width: 3,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new("[x]").style(Style::default().fg(theme::dialog_fg())),
            close,
        );
        self.close_rect = Some(close);
        self.body_area = inner;

        match &mut self.body {
            PopupBody::Empty => {}
            PopupBody::Omniverse {
                create_rect,
                open_rect,
            } => {
                let option_style = Style::default()
                    .fg(theme::dialog_fg())
                    .add_modifier(Modifier::BOLD);
                let create = Rect {
                    x: inner.x + 2,
                    y: inner.y + 1,
                    width: inner.width.saturating_sub(4).min(28),
                    height: 1,
                };
                frame.render_widget(
                    Paragraph::new("[ Create New Omniverse ]").style(option_style),
                    create,
                );
                let open = Rect {
                    x: inner.x + 2,
                    y: inner.y + 3,
                    width: inner.width.saturating_sub(4).min(28),
                    height: 1,
                };
                frame.render_widget(
                    Paragraph::new("[ Open Existing Omniverse ]").style(option_style),
                    open,
                );
                *create_rect = Some(create);
                *open_rect = Some(open);
            }
            PopupBody::Folders(folders) => folders.render(frame, inner),
            PopupBody::Apps { item_rects } => {
                item_rects.clear();
                for (index, app) in self.apps.iter().enumerate() {
                    let y = inner.y + index as u16;
                    if y >= inner.y + inner.height {
                        break;
                    }
                    let rect = Rect {
                        x: inner.x + 1,
                        y,
                        width: inner.width.saturating_sub(2),
                        height: 1,
                    };
                    let line = Line::from(vec![
                        Span::styled(
                            format!("{} ", app.glyph()),
                            Style::default().fg(theme::command_bubble_fg()),
                        ),
                        Span::styled(app.name.clone(), Style::default().fg(theme::dialog_fg())),
                    ]);
                    frame.render_widget(Paragraph::new(line), rect);
                    item_rects.push((rect, index));
                }
            }
        }
    }
}

/// The Folders split view: a navigation column, a divider with its own drag
/// session, and a cancel control.
pub struct FoldersView {
    split: ResizeController,
    left_width: u16,
    groups: Vec<(&'static str, bool)>,
    group_rects: Vec<(Rect, usize)>,
    handle_rect: Option<Rect>,
    cancel_rect: Option<Rect>,
}

impl Default for FoldersView {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldersView {
    pub fn new() -> Self {
        Self {
            split: ResizeController::new(HandleSide::Right, PaneLimits::FOLDERS_SPLIT),
            left_width: 0,
            groups: vec![("Favorites", false), ("This PC", false), ("Network", true)],
            group_rects: Vec::new(),
            handle_rect: None,
            cancel_rect: None,
        }
    }

    pub fn left_width(&self) -> u16 {
        self.left_width
    }

    /// Pointer events while the divider drag holds capture.
    fn route_captured(&mut self, event: &Event, body: Rect) {
        let Event::Mouse(mouse) = event else {
            return;
        };
        match mouse.kind {
            MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                let local = mouse.column.saturating_sub(body.x);
                self.split.drag_to(local, body.width);
            }
            MouseEventKind::Up(_) => {
                if let Some(width) = self.split.end_drag() {
                    self.left_width = width;
                }
            }
            _ => {}
        }
    }

    /// Left-button press routing. Returns a wire value for the parent popup
    /// when the click hit the cancel control.
    fn handle_click(&mut self, column: u16, row: u16, body: Rect, now: Instant) -> Option<Value> {
        if self
            .handle_rect
            .is_some_and(|rect| rect_contains(rect, column, row))
        {
            let local = column.saturating_sub(body.x);
            self.split.begin_drag(local, self.left_width, now);
            return Some(json!({"type": "folders:drag"}));
        }
        if self
            .cancel_rect
            .is_some_and(|rect| rect_contains(rect, column, row))
        {
            return Some(json!({"type": "folders:close"}));
        }
        for (rect, index) in self.group_rects.clone() {
            if rect_contains(rect, column, row) {
                if let Some(group) = self.groups.get_mut(index) {
                    group.1 = !group.1;
                }
                return Some(json!({"type": "folders:toggle-group"}));
            }
        }
        None
    }

    fn render(&mut self, frame: &mut TerminalFrame, area: Rect) {
        self.handle_rect = None;
        self.cancel_rect = None;
        self.group_rects.clear();
        if area.width < 12 || area.height < 4 {
            return;
        }
        if self.left_width == 0 {
            self.left_width = PaneLimits::FOLDERS_SPLIT.clamp(i32::from(area.width) / 4, area.width);
        }
        if let Some(width) = self.split.take_pending() {
            self.left_width = width;
        }
        // Re-clamp against the current body width; the popup may have been
        // resized since the last frame.
        self.left_width = PaneLimits::FOLDERS_SPLIT.clamp(i32::from(self.left_width), area.width);

        let left = Rect {
            x: area.x,
            y: area.y,
            width: self.left_width,
            height: area.height.saturating_sub(1),
        };
        let handle = Rect {
            x: area.x + self.left_width,
            y: area.y,
            width: 1,
            height: area.height.saturating_sub(1),
        };
        let right = Rect {
            x: handle.x + 1,
            y: area.y,
            width: area.width.saturating_sub(self.left_width + 1),
            height: area.height.saturating_sub(1),
        };

        let mut lines: Vec<Line> = Vec::new();
        let mut row = left.y;
        for (index, (name, collapsed)) in self.groups.iter().enumerate() {
            let marker = if *collapsed { "▸" } else { "▾" };
            lines.push(Line::from(Span::styled(
                format!("{marker} {name}"),
                Style::default()
                    .fg(theme::dialog_fg())
                    .add_modifier(Modifier::BOLD),
            )));
            self.group_rects.push((
                Rect {
                    x: left.x,
                    y: row,
                    width: left.width,
                    height: 1,
                },
                index,
            ));
            row += 1;
            if !*collapsed {
                for child in ["  Documents", "  Projects"] {
                    lines.push(Line::from(Span::styled(
                        child,
                        Style::default().fg(theme::muted_fg()),
                    )));
                    row += 1;
                }
            }
        }
        frame.render_widget(Paragraph::new(lines), left);

        let handle_style = if self.split.dragging() {
            Style::default().fg(theme::handle_active_fg())
        } else {
            Style::default().fg(theme::handle_fg())
        };
        for y in handle.y..handle.y + handle.height {
            frame.render_widget(Paragraph::new("│").style(handle_style), Rect {
                x: handle.x,
                y,
                width: 1,
                height: 1,
            });
        }
        self.handle_rect = Some(handle);

        frame.render_widget(
            Paragraph::new("No folder selected").style(Style::default().fg(theme::muted_fg())),
            right,
        );

        let cancel = Rect {
            x: area.x + area.width.saturating_sub(12),
            y: area.y + area.height.saturating_sub(1),
            width: 10,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new("[ Cancel ]").style(Style::default().fg(theme::dialog_fg())),
            cancel,
        );
        self.cancel_rect = Some(cancel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEvent};

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn init(popup: &mut PopupFrame, title: &str) {
        let mut bus = MessageBus::new();
        popup.on_message(&json!({"type": "popup:init", "title": title}), &mut bus);
    }

    #[test]
    fn init_routes_body_by_title() {
        let mut popup = PopupFrame::new(Vec::new());
        init(&mut popup, "Folders");
        assert!(matches!(popup.body, PopupBody::Folders(_)));
        init(&mut popup, "Omniverse");
        assert!(matches!(popup.body, PopupBody::Omniverse { .. }));
        init(&mut popup, "Something Else");
        assert!(matches!(popup.body, PopupBody::Empty));
    }

    #[test]
    fn malformed_init_is_ignored() {
        let mut popup = PopupFrame::new(Vec::new());
        init(&mut popup, "Folders");
        let mut bus = MessageBus::new();
        popup.on_message(&json!({"type": "popup:init"}), &mut bus);
        assert!(matches!(popup.body, PopupBody::Folders(_)));
        assert_eq!(popup.title(), "Folders");
    }

    #[test]
    fn close_button_posts_popup_close() {
        let mut popup = PopupFrame::new(Vec::new());
        popup.close_rect = Some(Rect::new(50, 2, 3, 1));
        let mut bus = MessageBus::new();
        let area = Rect::new(10, 2, 44, 20);
        assert!(popup.handle_event(&click(51, 2), area, Instant::now(), &mut bus));
        assert_eq!(bus.drain()[0]["type"], "popup:close");
    }

    #[test]
    fn folders_cancel_reemits_popup_close() {
        let mut popup = PopupFrame::new(Vec::new());
        init(&mut popup, "Folders");
        popup.body_area = Rect::new(11, 3, 42, 18);
        if let PopupBody::Folders(folders) = &mut popup.body {
            folders.cancel_rect = Some(Rect::new(41, 20, 10, 1));
        }
        let mut bus = MessageBus::new();
        let area = Rect::new(10, 2, 44, 20);
        assert!(popup.handle_event(&click(42, 20), area, Instant::now(), &mut bus));
        assert_eq!(bus.drain()[0]["type"], "popup:close");
    }

    #[test]
    fn divider_drag_clamps_to_split_bounds() {
        let mut popup = PopupFrame::new(Vec::new());
        init(&mut popup, "Folders");
        let body = Rect::new(0, 0, 100, 20);
        popup.body_area = body;
        let now = Instant::now();
        if let PopupBody::Folders(folders) = &mut popup.body {
            folders.left_width = 25;
            folders.handle_rect = Some(Rect::new(25, 0, 1, 19));
        }
        let mut bus = MessageBus::new();
        assert!(popup.handle_event(&click(25, 5), body, now, &mut bus));
        assert!(popup.capture_held());

        // Drag far past the 70% bound.
        let drag = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 99,
            row: 5,
            modifiers: KeyModifiers::NONE,
        });
        assert!(popup.handle_event(&drag, body, now, &mut bus));
        let up = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 99,
            row: 5,
            modifiers: KeyModifiers::NONE,
        });
        assert!(popup.handle_event(&up, body, now, &mut bus));
        assert!(!popup.capture_held());
        if let PopupBody::Folders(folders) = &popup.body {
            assert_eq!(folders.left_width(), 70);
        } else {
            panic!("expected folders body");
        }
    }

    #[test]
    fn apps_body_posts_show_app_modal() {
        let mut popup = PopupFrame::new(vec![AppRef::new("Revit", "Rv")]);
        init(&mut popup, "Apps");
        if let PopupBody::Apps { item_rects } = &mut popup.body {
            item_rects.push((Rect::new(2, 4, 20, 1), 0));
        }
        let mut bus = MessageBus::new();
        let area = Rect::new(0, 0, 60, 20);
        assert!(popup.handle_event(&click(5, 4), area, Instant::now(), &mut bus));
        let drained = bus.drain();
        assert_eq!(drained[0]["type"], "showAppModal");
        assert_eq!(drained[0]["appData"]["name"], "Revit");
    }
}
