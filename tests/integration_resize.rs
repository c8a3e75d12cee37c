//! End-to-end drag-resize behavior driven through the shell's real event
//! dispatch and render path (hit rects come from actual frames drawn into a
//! test backend).

use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use serde_json::json;

use omnishell::apps;
use omnishell::config::Config;
use omnishell::panes::PaneLimits;
use omnishell::shell::Shell;

const WIDTH: u16 = 160;
const HEIGHT: u16 = 48;

fn new_shell() -> (Shell, Terminal<TestBackend>) {
    let config = Config::default();
    let catalog = apps::builtin_catalog();
    let shell = Shell::new(&config, &catalog);
    let terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
    (shell, terminal)
}

fn draw(shell: &mut Shell, terminal: &mut Terminal<TestBackend>) {
    terminal.draw(|frame| shell.render(frame)).unwrap();
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn press(column: u16, row: u16) -> Event {
    mouse(MouseEventKind::Down(MouseButton::Left), column, row)
}

fn drag(column: u16, row: u16) -> Event {
    mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
}

fn release(column: u16, row: u16) -> Event {
    mouse(MouseEventKind::Up(MouseButton::Left), column, row)
}

#[test]
fn explorer_drag_stays_within_bounds_for_any_pointer() {
    let (mut shell, mut terminal) = new_shell();
    draw(&mut shell, &mut terminal);
    let handle = shell.hits().explorer_handle.expect("explorer handle");
    let now = Instant::now();

    shell.handle_event(&press(handle.x, handle.y + 2), now);
    assert!(shell.explorer_dragging());

    let limits = PaneLimits::PROJECT_MANAGER;
    for column in [0, 3, 40, 90, WIDTH - 1] {
        shell.handle_event(&drag(column, handle.y + 2), now);
        draw(&mut shell, &mut terminal);
        assert!(shell.explorer_width() >= limits.min_size(WIDTH));
        assert!(shell.explorer_width() <= limits.effective_max(WIDTH));
    }
    shell.handle_event(&release(WIDTH - 1, handle.y + 2), now);
    assert!(!shell.explorer_dragging());
    assert_eq!(shell.explorer_width(), limits.effective_max(WIDTH));
}

#[test]
fn agent_drag_grows_leftward_and_respects_workspace_guard() {
    let (mut shell, mut terminal) = new_shell();
    draw(&mut shell, &mut terminal);
    let handle = shell.hits().agent_handle.expect("agent handle");
    let now = Instant::now();

    shell.handle_event(&press(handle.x, handle.y + 2), now);
    shell.handle_event(&drag(0, handle.y + 2), now);
    draw(&mut shell, &mut terminal);
    let limits = PaneLimits::AGENT_PANEL;
    assert_eq!(shell.agent_width(), limits.effective_max(WIDTH));

    shell.handle_event(&drag(WIDTH - 1, handle.y + 2), now);
    draw(&mut shell, &mut terminal);
    assert_eq!(shell.agent_width(), limits.min_size(WIDTH));
    shell.handle_event(&release(WIDTH - 1, handle.y + 2), now);
    assert!(!shell.agent_dragging());
}

#[test]
fn collapse_message_terminates_active_drag_and_records_width() {
    let (mut shell, mut terminal) = new_shell();
    draw(&mut shell, &mut terminal);
    let handle = shell.hits().explorer_handle.expect("explorer handle");
    let now = Instant::now();

    shell.handle_event(&press(handle.x, handle.y + 1), now);
    shell.handle_event(&drag(handle.x + 6, handle.y + 1), now);
    draw(&mut shell, &mut terminal);
    let width_at_collapse = shell.explorer_width();

    shell.post_message(json!({"type": "pm:collapse"}));
    shell.tick(now);

    assert!(!shell.explorer_dragging());
    assert!(!shell.capture_active());
    assert!(shell.explorer_collapsed());
    assert_eq!(shell.explorer_last_expanded(), width_at_collapse);

    // The racing pointer-up arrives after the collapse: state is unchanged
    // and nothing panics.
    shell.handle_event(&release(handle.x + 6, handle.y + 1), now);
    assert!(!shell.explorer_dragging());
    assert!(shell.explorer_collapsed());
}

#[test]
fn collapse_resize_reopen_reclamps_against_new_viewport() {
    let (mut shell, mut terminal) = new_shell();
    draw(&mut shell, &mut terminal);
    let handle = shell.hits().explorer_handle.expect("explorer handle");
    let now = Instant::now();

    // Widen the sidebar to 30 columns, then collapse.
    shell.handle_event(&press(handle.x, handle.y + 1), now);
    shell.handle_event(&drag(handle.x + 6, handle.y + 1), now);
    draw(&mut shell, &mut terminal);
    shell.handle_event(&release(handle.x + 6, handle.y + 1), now);
    assert_eq!(shell.explorer_width(), 30);
    shell.post_message(json!({"type": "pm:collapse"}));
    shell.tick(now);
    assert_eq!(shell.explorer_last_expanded(), 30);

    // Shrink the terminal while collapsed, then reopen from the strip.
    shell.handle_event(&Event::Resize(100, HEIGHT), now);
    let mut small = Terminal::new(TestBackend::new(100, HEIGHT)).unwrap();
    draw(&mut shell, &mut small);
    let reopen = shell.hits().explorer_reopen.expect("reopen strip");
    shell.handle_event(&press(reopen.x, reopen.y + 3), now);

    assert!(!shell.explorer_collapsed());
    // 30 columns no longer fits: 20% of the 100-column viewport wins.
    assert_eq!(
        shell.explorer_width(),
        PaneLimits::PROJECT_MANAGER.effective_max(100)
    );
}

#[test]
fn second_pane_press_during_drag_leaves_one_session() {
    let (mut shell, mut terminal) = new_shell();
    draw(&mut shell, &mut terminal);
    let explorer_handle = shell.hits().explorer_handle.expect("explorer handle");
    let agent_handle = shell.hits().agent_handle.expect("agent handle");
    let now = Instant::now();

    shell.handle_event(&press(explorer_handle.x, explorer_handle.y + 1), now);
    assert!(shell.explorer_dragging());

    // The capture overlay swallows the press over the other pane's handle.
    shell.handle_event(&press(agent_handle.x, agent_handle.y + 1), now);
    assert!(shell.explorer_dragging());
    assert!(!shell.agent_dragging());

    shell.handle_event(&release(agent_handle.x, agent_handle.y + 1), now);
    assert!(!shell.explorer_dragging());
    assert!(!shell.agent_dragging());
}

#[test]
fn stuck_drag_recovers_via_safety_timeout() {
    let (mut shell, mut terminal) = new_shell();
    draw(&mut shell, &mut terminal);
    let handle = shell.hits().explorer_handle.expect("explorer handle");
    let start = Instant::now();

    shell.handle_event(&press(handle.x, handle.y + 1), start);
    assert!(shell.explorer_dragging());

    shell.tick(start + Duration::from_secs(9));
    assert!(shell.explorer_dragging());

    shell.tick(start + Duration::from_secs(11));
    assert!(!shell.explorer_dragging());
    assert!(!shell.capture_active());
}

#[test]
fn collapsed_handle_reopens_instead_of_dragging() {
    let (mut shell, mut terminal) = new_shell();
    draw(&mut shell, &mut terminal);
    let now = Instant::now();
    shell.post_message(json!({"type": "pm:collapse"}));
    shell.tick(now);
    draw(&mut shell, &mut terminal);

    let reopen = shell.hits().explorer_reopen.expect("reopen strip");
    shell.handle_event(&press(reopen.x, reopen.y), now);
    assert!(!shell.explorer_collapsed());
    assert!(!shell.explorer_dragging());
}
