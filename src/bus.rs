//! Cross-surface message bus.
//!
//! Embedded frames never touch shell state directly; they post raw
//! `{type, ...}` JSON values, and the shell validates them into the closed
//! [`FrameMessage`] union at the boundary. Unknown tags and malformed
//! payloads are ignored explicitly, never surfaced. Shell-to-frame traffic
//! goes the other way as [`ShellMessage`] values serialized back onto the
//! wire shape.
//!
//! Delivery is asynchronous with respect to the sender's synchronous code:
//! posts land in a queue the shell drains at loop boundaries, preserving
//! per-channel order.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The app payload carried by launch-related messages. `icon` is optional on
/// the wire; an empty icon falls back to a glyph derived from the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRef {
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

impl AppRef {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }

    /// Single-character fallback used when no icon was provided.
    pub fn glyph(&self) -> char {
        if let Some(c) = self.icon.chars().next() {
            c
        } else {
            self.name.chars().next().unwrap_or('?')
        }
    }
}

/// Frame-to-shell requests. Each variant corresponds to one or more wire
/// tags; parsing is the only place wire names appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameMessage {
    /// `pm:collapse` — collapse the explorer sidebar.
    ExplorerCollapse,
    /// `agent:collapse` — collapse the chat panel and return keyboard
    /// ownership to the command line.
    AgentCollapse,
    /// `agent:pre-collapse` — force-terminate any chat-panel drag ahead of a
    /// collapse.
    AgentPreCollapse,
    /// `popup:open` — show the popup surface with the given title.
    PopupOpen { title: String },
    /// `popup:close`, `closeAppsPopup`, or `folders:close` — hide the popup.
    PopupClose,
    /// `showAppModal` / `showAppsModal` — show the launch confirmation.
    ShowAppModal { app: AppRef },
    /// `app:open` — open a content tab for the app.
    AppOpen { app: AppRef },
}

impl FrameMessage {
    /// Validate an untrusted wire value. Returns `None` for unknown tags and
    /// for payloads missing required fields; callers treat that as a no-op.
    pub fn parse(value: &Value) -> Option<Self> {
        let tag = value.get("type")?.as_str()?;
        match tag {
            "pm:collapse" => Some(Self::ExplorerCollapse),
            "agent:collapse" => Some(Self::AgentCollapse),
            "agent:pre-collapse" => Some(Self::AgentPreCollapse),
            "popup:open" => {
                let title = value.get("title")?.as_str()?;
                Some(Self::PopupOpen {
                    title: title.to_string(),
                })
            }
            "popup:close" | "closeAppsPopup" | "folders:close" => Some(Self::PopupClose),
            "showAppModal" | "showAppsModal" => {
                let app = parse_app_ref(value.get("appData")?)?;
                Some(Self::ShowAppModal { app })
            }
            "app:open" => {
                let app = parse_app_ref(value.get("appData")?)?;
                Some(Self::AppOpen { app })
            }
            _ => None,
        }
    }
}

fn parse_app_ref(value: &Value) -> Option<AppRef> {
    let name = value.get("name")?.as_str()?;
    if name.is_empty() {
        return None;
    }
    let icon = value
        .get("icon")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(AppRef::new(name, icon))
}

/// Shell-to-frame notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMessage {
    /// Initialize the popup surface; forwarded exactly once per
    /// `popup:open` received.
    PopupInit { title: String },
    /// Sent into the agent surface ahead of a collapse.
    AgentPreCollapse,
    /// Populate the launch confirmation modal.
    ShowAppModal { app: AppRef },
}

impl ShellMessage {
    pub fn to_value(&self) -> Value {
        match self {
            Self::PopupInit { title } => json!({"type": "popup:init", "title": title}),
            Self::AgentPreCollapse => json!({"type": "agent:pre-collapse"}),
            Self::ShowAppModal { app } => json!({
                "type": "showAppModal",
                "appData": {"name": app.name, "icon": app.icon},
            }),
        }
    }
}

/// Ordered frame-to-shell queue. Frames post during event handling; the
/// shell drains at the next loop boundary.
#[derive(Debug, Default)]
pub struct MessageBus {
    queue: VecDeque<Value>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, value: Value) {
        self.queue.push_back(value);
    }

    pub fn drain(&mut self) -> Vec<Value> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_tags() {
        assert_eq!(
            FrameMessage::parse(&json!({"type": "pm:collapse"})),
            Some(FrameMessage::ExplorerCollapse)
        );
        assert_eq!(
            FrameMessage::parse(&json!({"type": "popup:open", "title": "Folders"})),
            Some(FrameMessage::PopupOpen {
                title: "Folders".to_string()
            })
        );
        assert_eq!(
            FrameMessage::parse(&json!({"type": "closeAppsPopup"})),
            Some(FrameMessage::PopupClose)
        );
        assert_eq!(
            FrameMessage::parse(&json!({"type": "folders:close"})),
            Some(FrameMessage::PopupClose)
        );
    }

    #[test]
    fn parse_app_payloads() {
        let msg = FrameMessage::parse(&json!({
            "type": "app:open",
            "appData": {"name": "Photoshop", "icon": "P"},
        }));
        assert_eq!(
            msg,
            Some(FrameMessage::AppOpen {
                app: AppRef::new("Photoshop", "P")
            })
        );
        // Icon is optional.
        let msg = FrameMessage::parse(&json!({
            "type": "showAppModal",
            "appData": {"name": "Revit"},
        }));
        assert_eq!(
            msg,
            Some(FrameMessage::ShowAppModal {
                app: AppRef::new("Revit", "")
            })
        );
    }

    #[test]
    fn malformed_payloads_are_no_ops() {
        assert_eq!(FrameMessage::parse(&json!({"type": "app:open"})), None);
        assert_eq!(
            FrameMessage::parse(&json!({"type": "app:open", "appData": {"icon": "X"}})),
            None
        );
        assert_eq!(
            FrameMessage::parse(&json!({"type": "popup:open", "title": 7})),
            None
        );
        assert_eq!(FrameMessage::parse(&json!({"type": "no-such-tag"})), None);
        assert_eq!(FrameMessage::parse(&json!({"title": "Folders"})), None);
        assert_eq!(FrameMessage::parse(&json!(42)), None);
    }

    #[test]
    fn bus_preserves_post_order() {
        let mut bus = MessageBus::new();
        bus.post(json!({"type": "agent:pre-collapse"}));
        bus.post(json!({"type": "agent:collapse"}));
        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0]["type"], "agent:pre-collapse");
        assert_eq!(drained[1]["type"], "agent:collapse");
        assert!(bus.is_empty());
    }

    #[test]
    fn shell_message_round_trips_wire_shape() {
        let value = ShellMessage::PopupInit {
            title: "Apps".to_string(),
        }
        .to_value();
        assert_eq!(value["type"], "popup:init");
        assert_eq!(value["title"], "Apps");
    }
}
