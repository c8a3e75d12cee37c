//! The outer shell: owns the panes, tabs, command prompt, keyboard
//! ownership, and the message bus, and dispatches input between the chrome
//! and the embedded frames.
//!
//! Dispatch order matters and mirrors the layering on screen: an active
//! drag-capture overlay routes pointer input before anything else (it sits
//! above all other UI, modals included), then the modal layers top-down,
//! then the chrome hit rects recorded during the last render.

mod ui;

use std::time::Instant;

use crossterm::event::{Event, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use serde_json::Value;

use crate::apps::AppRecord;
use crate::bus::{FrameMessage, MessageBus, ShellMessage};
use crate::config::Config;
use crate::frames::{
    AgentFrame, AppsModalFrame, ContentFrame, Frame, FrameHost, PopupFrame, ProjectManagerFrame,
};
use crate::keybindings::{Action, KeyBindings};
use crate::panes::{PaneLimits, PanelState};
use crate::prompt::{CommandPrompt, ImmediateCommand, PromptMode, SubmitOutcome};
use crate::resize::{HandleSide, ResizeController};
use crate::router::{KeyboardOwner, OwnerSurface};
use crate::tabs::TabSet;
use crate::util::rect_contains;

/// What a click in the tab strip means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabHit {
    Activate(Option<usize>),
    Close(usize),
}

/// Chrome hit rects recorded at render time and consumed by the next event
/// dispatch. Cleared every frame.
#[derive(Debug, Default)]
pub struct ChromeHits {
    pub explorer_handle: Option<Rect>,
    pub explorer_reopen: Option<Rect>,
    pub agent_handle: Option<Rect>,
    pub agent_reopen: Option<Rect>,
    pub history_toggle: Option<Rect>,
    pub account: Option<Rect>,
    pub command_line: Option<Rect>,
    pub tabs: Vec<(Rect, TabHit)>,
    pub explorer_area: Rect,
    pub content_area: Rect,
    pub agent_area: Rect,
    pub popup_area: Rect,
}

impl ChromeHits {
    fn begin_frame(&mut self) {
        self.explorer_handle = None;
        self.explorer_reopen = None;
        self.agent_handle = None;
        self.agent_reopen = None;
        self.history_toggle = None;
        self.account = None;
        self.command_line = None;
        self.tabs.clear();
        self.explorer_area = Rect::default();
        self.content_area = Rect::default();
        self.agent_area = Rect::default();
        self.popup_area = Rect::default();
    }
}

pub struct Shell {
    viewport: Rect,

    explorer: PanelState,
    explorer_width: u16,
    explorer_resize: ResizeController,

    agent_panel: PanelState,
    agent_width: u16,
    agent_resize: ResizeController,

    owner: KeyboardOwner,
    prompt: CommandPrompt,
    tabs: TabSet,
    bus: MessageBus,
    bindings: KeyBindings,

    pm: FrameHost<ProjectManagerFrame>,
    agent: FrameHost<AgentFrame>,
    content: FrameHost<ContentFrame>,
    popup: FrameHost<PopupFrame>,
    app_modal: FrameHost<AppsModalFrame>,
    popup_visible: bool,
    app_modal_visible: bool,

    accounts: Vec<String>,
    selected_account: usize,

    history_expanded: bool,
    debug_visible: bool,
    should_quit: bool,

    hits: ChromeHits,
}

impl Shell {
    pub fn new(config: &Config, catalog: &[AppRecord]) -> Self {
        let accounts = vec![
            "valleyvarun@gmail.com".to_string(),
            "vas2154@columbia.edu".to_string(),
            "2020barc020@spab.ac.in".to_string(),
        ];
        let mut agent_frame = AgentFrame::new();
        agent_frame.set_username_from_email(&accounts[0]);
        let apps = catalog.iter().map(AppRecord::app_ref).collect();
        Self {
            viewport: Rect::default(),
            explorer: PanelState::new(config.layout.explorer_width),
            explorer_width: config.layout.explorer_width,
            explorer_resize: ResizeController::new(HandleSide::Right, PaneLimits::PROJECT_MANAGER),
            agent_panel: PanelState::new(config.layout.agent_width),
            agent_width: config.layout.agent_width,
            agent_resize: ResizeController::new(HandleSide::Left, PaneLimits::AGENT_PANEL),
            owner: KeyboardOwner::new(),
            prompt: CommandPrompt::new(),
            tabs: TabSet::new(),
            bus: MessageBus::new(),
            bindings: KeyBindings::default(),
            pm: FrameHost::new(ProjectManagerFrame::new()),
            agent: FrameHost::new(agent_frame),
            content: FrameHost::new(ContentFrame::new()),
            popup: FrameHost::new(PopupFrame::new(apps)),
            app_modal: FrameHost::new(AppsModalFrame::new()),
            popup_visible: false,
            app_modal_visible: false,
            accounts,
            selected_account: 0,
            history_expanded: false,
            debug_visible: false,
            should_quit: false,
            hits: ChromeHits::default(),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn hits(&self) -> &ChromeHits {
        &self.hits
    }

    pub fn explorer_width(&self) -> u16 {
        self.explorer_width
    }

    pub fn agent_width(&self) -> u16 {
        self.agent_width
    }

    pub fn explorer_collapsed(&self) -> bool {
        self.explorer.collapsed()
    }

    pub fn agent_collapsed(&self) -> bool {
        self.agent_panel.collapsed()
    }

    pub fn explorer_last_expanded(&self) -> u16 {
        self.explorer.last_expanded_size()
    }

    pub fn explorer_dragging(&self) -> bool {
        self.explorer_resize.dragging()
    }

    pub fn agent_dragging(&self) -> bool {
        self.agent_resize.dragging()
    }

    /// True while any drag-capture overlay is held; selection and hover
    /// affordances are suppressed shell-wide for the duration.
    pub fn capture_active(&self) -> bool {
        self.explorer_resize.capture_held()
            || self.agent_resize.capture_held()
            || (self.popup_visible && self.popup.frame.capture_held())
    }

    pub fn owner(&self) -> &KeyboardOwner {
        &self.owner
    }

    pub fn prompt(&self) -> &CommandPrompt {
        &self.prompt
    }

    pub fn tabs(&self) -> &TabSet {
        &self.tabs
    }

    pub fn popup_visible(&self) -> bool {
        self.popup_visible
    }

    pub fn app_modal_visible(&self) -> bool {
        self.app_modal_visible
    }

    pub fn agent_frame(&self) -> &AgentFrame {
        &self.agent.frame
    }

    pub fn popup_frame(&self) -> &PopupFrame {
        &self.popup.frame
    }

    pub fn selected_account(&self) -> &str {
        &self.accounts[self.selected_account]
    }

    /// Inject a raw wire value, as an embedded surface would.
    pub fn post_message(&mut self, value: Value) {
        self.bus.post(value);
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Resize(width, height) => self.handle_viewport_resize(*width, *height),
            Event::Mouse(mouse) => self.handle_mouse(*mouse, now),
            Event::Key(key) => self.handle_key(*key, now),
            // Losing terminal focus is a capture loss: no pointer-up will
            // ever arrive, so every drag ends here.
            Event::FocusLost => self.force_stop_all_drags(),
            _ => {}
        }
        self.pump(now);
    }

    /// Advance deadline-driven work without an input event.
    pub fn tick(&mut self, now: Instant) {
        self.pump(now);
    }

    fn handle_viewport_resize(&mut self, width: u16, height: u16) {
        self.viewport = Rect::new(0, 0, width, height);
        // Re-clamp pane sizes against the new bounds, but never mid-drag;
        // the drag's own clamp applies on the next move.
        if !self.explorer_resize.dragging() && !self.explorer.collapsed() {
            self.set_explorer_width(
                self.explorer_resize
                    .limits()
                    .clamp(i32::from(self.explorer_width), width),
            );
        }
        if !self.agent_resize.dragging() && !self.agent_panel.collapsed() {
            self.set_agent_width(
                self.agent_resize
                    .limits()
                    .clamp(i32::from(self.agent_width), width),
            );
        }
    }

    fn set_explorer_width(&mut self, width: u16) {
        self.explorer_width = width;
        self.explorer
            .record_expanded(width, self.explorer_resize.limits(), self.viewport.width);
    }

    fn set_agent_width(&mut self, width: u16) {
        self.agent_width = width;
        self.agent_panel
            .record_expanded(width, self.agent_resize.limits(), self.viewport.width);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        // An acquired capture overlay outranks everything, modals included.
        if self.explorer_resize.capture_held() {
            match mouse.kind {
                MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                    self.explorer_resize
                        .drag_to(mouse.column, self.viewport.width);
                }
                MouseEventKind::Up(_) => {
                    if let Some(width) = self.explorer_resize.end_drag() {
                        self.set_explorer_width(width);
                    }
                }
                _ => {}
            }
            return;
        }
        if self.agent_resize.capture_held() {
            match mouse.kind {
                MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                    self.agent_resize.drag_to(mouse.column, self.viewport.width);
                }
                MouseEventKind::Up(_) => {
                    if let Some(width) = self.agent_resize.end_drag() {
                        self.set_agent_width(width);
                    }
                }
                _ => {}
            }
            return;
        }
        if self.popup_visible && self.popup.frame.capture_held() {
            let area = self.hits.popup_area;
            self.popup
                .frame
                .handle_event(&Event::Mouse(mouse), area, now, &mut self.bus);
            return;
        }

        // Modal layers, top-down.
        if self.app_modal_visible {
            self.app_modal
                .frame
                .handle_event(&Event::Mouse(mouse), self.viewport, now, &mut self.bus);
            return;
        }
        if self.popup_visible {
            let area = self.hits.popup_area;
            self.popup
                .frame
                .handle_event(&Event::Mouse(mouse), area, now, &mut self.bus);
            return;
        }

        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return;
        }
        let (column, row) = (mouse.column, mouse.row);

        if self
            .hits
            .explorer_handle
            .is_some_and(|rect| rect_contains(rect, column, row))
        {
            // A collapsed pane's handle reopens instead of dragging.
            if self.explorer.collapsed() {
                self.reopen_explorer();
            } else {
                self.explorer_resize
                    .begin_drag(column, self.explorer_width, now);
            }
            return;
        }
        if self
            .hits
            .explorer_reopen
            .is_some_and(|rect| rect_contains(rect, column, row))
        {
            self.reopen_explorer();
            return;
        }
        if self
            .hits
            .agent_handle
            .is_some_and(|rect| rect_contains(rect, column, row))
        {
            if self.agent_panel.collapsed() {
                self.reopen_agent();
            } else {
                self.agent_resize.begin_drag(column, self.agent_width, now);
            }
            return;
        }
        if self
            .hits
            .agent_reopen
            .is_some_and(|rect| rect_contains(rect, column, row))
        {
            self.reopen_agent();
            return;
        }
        if self
            .hits
            .history_toggle
            .is_some_and(|rect| rect_contains(rect, column, row))
        {
            self.history_expanded = !self.history_expanded;
            self.focus_command_line();
            return;
        }
        if self
            .hits
            .account
            .is_some_and(|rect| rect_contains(rect, column, row))
        {
            self.selected_account = (self.selected_account + 1) % self.accounts.len();
            let email = self.accounts[self.selected_account].clone();
            self.agent.frame.set_username_from_email(&email);
            return;
        }
        for (rect, hit) in self.hits.tabs.clone() {
            if rect_contains(rect, column, row) {
                match hit {
                    TabHit::Activate(index) => self.tabs.activate(index),
                    TabHit::Close(index) => self.tabs.close(index),
                }
                return;
            }
        }

        if !self.agent_panel.collapsed() && rect_contains(self.hits.agent_area, column, row) {
            let area = self.hits.agent_area;
            self.agent
                .frame
                .handle_event(&Event::Mouse(mouse), area, now, &mut self.bus);
            return;
        }

        // Any click outside the chat panel returns keyboard ownership to the
        // command line before the click is handled further.
        self.release_agent_ownership();

        if !self.explorer.collapsed() && rect_contains(self.hits.explorer_area, column, row) {
            let area = self.hits.explorer_area;
            self.pm
                .frame
                .handle_event(&Event::Mouse(mouse), area, now, &mut self.bus);
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if let Some(action) = self.bindings.action_for(&key) {
            self.run_action(action);
            return;
        }
        if self.app_modal_visible {
            self.app_modal
                .frame
                .handle_event(&Event::Key(key), self.viewport, now, &mut self.bus);
            return;
        }
        // Absolute override: while the chat agent owns keys the router does
        // no redirection and never touches the command-line buffer.
        if self.owner.agent_owns() {
            let area = self.hits.agent_area;
            self.agent
                .frame
                .handle_event(&Event::Key(key), area, now, &mut self.bus);
            return;
        }
        if self.owner.current() == OwnerSurface::FormField {
            return;
        }
        if self.popup_visible
            && key.code == crossterm::event::KeyCode::Esc
            && self.prompt.mode() == PromptMode::Input
        {
            self.close_popup();
            return;
        }
        self.route_keydown(key);
    }

    /// The router body: redirect raw keydowns into the command line or the
    /// confirmation handler. Guards above guarantee no other surface owns
    /// input by the time this runs.
    fn route_keydown(&mut self, key: KeyEvent) {
        use crossterm::event::KeyCode;
        match self.prompt.mode() {
            PromptMode::Confirmation => match key.code {
                KeyCode::Enter => self.prompt.confirm(),
                KeyCode::Esc => self.prompt.cancel(),
                // Everything else is consumed while a command is pending.
                _ => {}
            },
            PromptMode::Input => match key.code {
                KeyCode::Enter => {
                    if let SubmitOutcome::Immediate(command) = self.prompt.submit() {
                        self.execute_immediate(command);
                    }
                }
                KeyCode::Backspace => self.prompt.backspace(),
                KeyCode::Delete => self.prompt.delete_forward(),
                KeyCode::Char(c)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    self.prompt.insert_char(c);
                }
                _ => {}
            },
        }
    }

    fn run_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleExplorer => {
                if self.explorer.collapsed() {
                    self.reopen_explorer();
                } else {
                    self.collapse_explorer();
                }
            }
            Action::ToggleAgent => {
                if self.agent_panel.collapsed() {
                    self.reopen_agent();
                } else {
                    self.agent_resize.force_stop();
                    self.agent.post(ShellMessage::AgentPreCollapse);
                    self.collapse_agent();
                }
            }
            Action::ToggleHistory => self.history_expanded = !self.history_expanded,
            Action::ToggleDebugLog => self.debug_visible = !self.debug_visible,
        }
    }

    fn execute_immediate(&mut self, command: ImmediateCommand) {
        match command {
            ImmediateCommand::OpenApps => self.open_popup("Apps"),
            ImmediateCommand::OpenFolders => self.open_popup("Folders"),
            ImmediateCommand::OpenOmniverse => self.open_popup("Omniverse"),
            ImmediateCommand::ToggleExplorer => self.run_action(Action::ToggleExplorer),
            ImmediateCommand::ToggleAgent => self.run_action(Action::ToggleAgent),
        }
    }

    fn open_popup(&mut self, title: &str) {
        self.popup_visible = true;
        self.popup.post(ShellMessage::PopupInit {
            title: title.to_string(),
        });
    }

    fn close_popup(&mut self) {
        self.popup_visible = false;
        self.popup.frame.force_stop_drag();
        self.focus_command_line();
    }

    fn collapse_explorer(&mut self) {
        self.explorer.collapse(
            self.explorer_width,
            self.explorer_resize.limits(),
            self.viewport.width,
        );
        self.explorer_resize.force_stop();
    }

    fn reopen_explorer(&mut self) {
        self.explorer_width = self
            .explorer
            .reopen(self.explorer_resize.limits(), self.viewport.width);
    }

    fn collapse_agent(&mut self) {
        self.agent_resize.force_stop();
        self.agent_panel.collapse(
            self.agent_width,
            self.agent_resize.limits(),
            self.viewport.width,
        );
        self.focus_command_line();
    }

    fn reopen_agent(&mut self) {
        self.agent_width = self
            .agent_panel
            .reopen(self.agent_resize.limits(), self.viewport.width);
    }

    fn force_stop_all_drags(&mut self) {
        self.explorer_resize.force_stop();
        self.agent_resize.force_stop();
        self.popup.frame.force_stop_drag();
    }

    fn release_agent_ownership(&mut self) {
        self.agent.frame.blur_input();
        self.owner.release(OwnerSurface::AgentInput);
    }

    fn focus_command_line(&mut self) {
        self.agent.frame.blur_input();
        self.owner.acquire(OwnerSurface::CommandLine);
    }

    fn apply_frame_message(&mut self, message: FrameMessage) {
        match message {
            FrameMessage::ExplorerCollapse => self.collapse_explorer(),
            FrameMessage::AgentCollapse => self.collapse_agent(),
            FrameMessage::AgentPreCollapse => {
                self.agent_resize.force_stop();
                self.agent.post(ShellMessage::AgentPreCollapse);
            }
            FrameMessage::PopupOpen { title } => self.open_popup(&title),
            FrameMessage::PopupClose => self.close_popup(),
            FrameMessage::ShowAppModal { app } => {
                self.app_modal_visible = true;
                self.app_modal.post(ShellMessage::ShowAppModal { app });
            }
            FrameMessage::AppOpen { app } => self.tabs.open(&app),
        }
    }

    /// Loop-boundary work: exactly-once delivery into ready frames, router
    /// bind retries, deadline expiry, the ownership handshake, and one drain
    /// of the frame-to-shell bus.
    fn pump(&mut self, now: Instant) {
        self.pm.try_bind_keys();
        self.content.try_bind_keys();

        self.pm.deliver_pending(&mut self.bus);
        self.agent.deliver_pending(&mut self.bus);
        self.content.deliver_pending(&mut self.bus);
        self.popup.deliver_pending(&mut self.bus);
        self.app_modal.deliver_pending(&mut self.bus);

        self.explorer_resize.expire_if_overdue(now);
        self.agent_resize.expire_if_overdue(now);
        self.agent.frame.tick(now, &mut self.bus);
        self.popup.frame.tick(now, &mut self.bus);
        self.app_modal.frame.tick(now, &mut self.bus);

        if let Some(focused) = self.agent.frame.take_focus_change() {
            if focused {
                self.owner.acquire(OwnerSurface::AgentInput);
            } else {
                self.owner.release(OwnerSurface::AgentInput);
            }
        }
        if self.app_modal.frame.take_dismiss() {
            self.app_modal_visible = false;
        }

        for value in self.bus.drain() {
            match FrameMessage::parse(&value) {
                Some(message) => {
                    tracing::debug!(?message, "bus message");
                    self.apply_frame_message(message);
                }
                None => tracing::debug!(%value, "ignoring unrecognized frame message"),
            }
        }
    }
}
