//! Embedded surfaces ("frames") hosted by the shell.
//!
//! Frames are isolated: they receive events and shell messages, render into
//! an area the shell assigns, and request shell-level state changes only by
//! posting wire values on the [`MessageBus`]. The [`FrameHost`] wrapper
//! models the asynchronous load of each surface: messages posted before the
//! frame is ready are queued and delivered exactly once, and key-forwarding
//! binds wait for the ready signal with a bounded retry fallback.

pub mod agent;
pub mod apps_modal;
pub mod content;
pub mod popup;
pub mod project_manager;

pub use agent::AgentFrame;
pub use apps_modal::AppsModalFrame;
pub use content::ContentFrame;
pub use popup::PopupFrame;
pub use project_manager::ProjectManagerFrame;

use std::collections::VecDeque;
use std::time::Instant;

use crossterm::event::Event;
use ratatui::Frame as TerminalFrame;
use ratatui::layout::Rect;
use serde_json::Value;

use crate::bus::{MessageBus, ShellMessage};

/// Give up binding key forwarding into a frame after this many attempts.
pub const MAX_BIND_ATTEMPTS: u8 = 10;

pub trait Frame {
    fn name(&self) -> &'static str;

    /// Handle an input event landing on this frame's surface. Coordinates
    /// are absolute; the frame hit-tests against rects it recorded during
    /// the last render. Returns true when the event was consumed.
    fn handle_event(
        &mut self,
        _event: &Event,
        _area: Rect,
        _now: Instant,
        _bus: &mut MessageBus,
    ) -> bool {
        false
    }

    /// Receive a shell-to-frame wire value. Payload shape is untrusted;
    /// malformed values are ignored.
    fn on_message(&mut self, _value: &Value, _bus: &mut MessageBus) {}

    /// Advance deadline-based work.
    fn tick(&mut self, _now: Instant, _bus: &mut MessageBus) {}

    fn render(&mut self, frame: &mut TerminalFrame, area: Rect, focused: bool);
}

/// Host wrapper tracking a frame's load state.
#[derive(Debug)]
pub struct FrameHost<F> {
    pub frame: F,
    ready: bool,
    key_bound: bool,
    bind_attempts: u8,
    inbox: VecDeque<Value>,
}

impl<F: Frame> FrameHost<F> {
    pub fn new(frame: F) -> Self {
        Self {
            frame,
            ready: false,
            key_bound: false,
            bind_attempts: 0,
            inbox: VecDeque::new(),
        }
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    /// The frame's load signal; the shell fires this after the frame's
    /// first render.
    pub fn mark_ready(&mut self) {
        if !self.ready {
            self.ready = true;
            tracing::debug!(frame = self.frame.name(), "frame ready");
        }
    }

    /// Queue a shell-to-frame message. Delivery happens when the frame is
    /// ready, in post order, exactly once per message.
    pub fn post(&mut self, message: ShellMessage) {
        self.inbox.push_back(message.to_value());
    }

    pub fn deliver_pending(&mut self, bus: &mut MessageBus) {
        if !self.ready {
            return;
        }
        while let Some(value) = self.inbox.pop_front() {
            self.frame.on_message(&value, bus);
        }
    }

    /// Attempt to bind key forwarding into the frame. Succeeds once the
    /// frame is ready; gives up (and logs) after a bounded number of
    /// attempts so a frame that never loads cannot stall the router.
    pub fn try_bind_keys(&mut self) -> bool {
        if self.key_bound {
            return true;
        }
        if self.ready {
            self.key_bound = true;
            tracing::debug!(frame = self.frame.name(), "key forwarding bound");
            return true;
        }
        if self.bind_attempts < MAX_BIND_ATTEMPTS {
            self.bind_attempts += 1;
            if self.bind_attempts == MAX_BIND_ATTEMPTS {
                tracing::warn!(
                    frame = self.frame.name(),
                    "key forwarding unavailable; frame never became ready"
                );
            }
        }
        false
    }

    pub fn keys_bound(&self) -> bool {
        self.key_bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct ProbeFrame {
        received: Vec<Value>,
    }

    impl Frame for ProbeFrame {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn on_message(&mut self, value: &Value, _bus: &mut MessageBus) {
            self.received.push(value.clone());
        }

        fn render(&mut self, _frame: &mut TerminalFrame, _area: Rect, _focused: bool) {}
    }

    #[test]
    fn messages_queue_until_ready_and_deliver_once() {
        let mut host = FrameHost::new(ProbeFrame::default());
        let mut bus = MessageBus::new();
        host.post(ShellMessage::PopupInit {
            title: "Folders".to_string(),
        });
        host.deliver_pending(&mut bus);
        assert!(host.frame.received.is_empty());

        host.mark_ready();
        host.deliver_pending(&mut bus);
        assert_eq!(host.frame.received.len(), 1);
        assert_eq!(host.frame.received[0]["title"], "Folders");

        // A second delivery pass does not repeat the message.
        host.deliver_pending(&mut bus);
        assert_eq!(host.frame.received.len(), 1);
    }

    #[test]
    fn key_binding_waits_for_ready_with_bounded_retries() {
        let mut host = FrameHost::new(ProbeFrame::default());
        for _ in 0..MAX_BIND_ATTEMPTS {
            assert!(!host.try_bind_keys());
        }
        // Still unbound, but retries have stopped growing.
        assert!(!host.try_bind_keys());
        host.mark_ready();
        assert!(host.try_bind_keys());
        assert!(host.keys_bound());
    }

    #[test]
    fn probe_ignores_nothing_but_bus_unused() {
        let mut host = FrameHost::new(ProbeFrame::default());
        host.mark_ready();
        let mut bus = MessageBus::new();
        host.frame.on_message(&json!({"type": "anything"}), &mut bus);
        assert!(bus.is_empty());
    }
}
