//! Drag-resize state machine: one controller per resizable pane.
//!
//! Each controller owns at most one [`DragSession`] at a time. A session is
//! created on pointer-down over the pane's handle, updated on pointer moves,
//! and torn down on pointer-up, an external force-stop (panel collapse), or
//! the safety deadline. Termination is idempotent so racing triggers
//! (pointer-up arriving next to a collapse message) cannot double-release.

use std::time::{Duration, Instant};

use crate::panes::PaneLimits;

/// Last-resort bound on a drag whose pointer-up was lost.
pub const DRAG_SAFETY_TIMEOUT: Duration = Duration::from_secs(10);

/// Which edge of the pane carries the drag handle. Determines the sign of
/// the pointer delta: a right-edge handle grows the pane as the pointer moves
/// right, a left-edge handle as it moves left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSide {
    Right,
    Left,
}

/// Transient capture surface held for the lifetime of one drag so pointer
/// events keep reaching the controller even when the pointer transits other
/// surfaces. While held, the shell suppresses selection and routes all
/// pointer input here first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOverlay {
    held: bool,
}

impl CaptureOverlay {
    /// Idempotent: acquiring an already-held overlay is a no-op.
    pub fn acquire(&mut self) {
        self.held = true;
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    pub fn held(&self) -> bool {
        self.held
    }
}

/// One active drag. Owned by the controller as `Option<DragSession>` so a
/// missing session *is* the idle state and double-termination cannot leave
/// half-cleared fields behind.
#[derive(Debug)]
pub struct DragSession {
    anchor: u16,
    base_size: u16,
    last_pointer: u16,
    pending: Option<u16>,
    overlay: CaptureOverlay,
    deadline: Instant,
}

#[derive(Debug)]
pub struct ResizeController {
    side: HandleSide,
    limits: PaneLimits,
    session: Option<DragSession>,
}

impl ResizeController {
    pub fn new(side: HandleSide, limits: PaneLimits) -> Self {
        Self {
            side,
            limits,
            session: None,
        }
    }

    pub fn limits(&self) -> &PaneLimits {
        &self.limits
    }

    pub fn dragging(&self) -> bool {
        self.session.is_some()
    }

    /// True while a session holds the capture overlay.
    pub fn capture_held(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.overlay.held())
    }

    /// Pointer column of the most recent move in the active session.
    pub fn last_pointer(&self) -> Option<u16> {
        self.session.as_ref().map(|session| session.last_pointer)
    }

    /// Begin a drag at the given pointer column. Any session still active is
    /// force-terminated first; two concurrent sessions on one pane are never
    /// allowed.
    pub fn begin_drag(&mut self, column: u16, current_size: u16, now: Instant) {
        if self.session.is_some() {
            tracing::debug!("starting drag while one is active; forcing stop");
            self.force_stop();
        }
        let mut overlay = CaptureOverlay::default();
        overlay.acquire();
        self.session = Some(DragSession {
            anchor: column,
            base_size: current_size,
            last_pointer: column,
            pending: None,
            overlay,
            deadline: now + DRAG_SAFETY_TIMEOUT,
        });
        tracing::debug!(column, base = current_size, "drag started");
    }

    /// Record a pointer move. The clamped candidate size is stored for the
    /// next paint; superseded candidates are dropped. No-op while idle.
    pub fn drag_to(&mut self, column: u16, viewport: u16) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.last_pointer = column;
        let delta = match self.side {
            HandleSide::Right => i32::from(column) - i32::from(session.anchor),
            HandleSide::Left => i32::from(session.anchor) - i32::from(column),
        };
        let candidate = i32::from(session.base_size) + delta;
        session.pending = Some(self.limits.clamp(candidate, viewport));
    }

    /// Take the batched candidate for this paint, if any. Returns `None`
    /// when the session ended between scheduling and the paint callback.
    pub fn take_pending(&mut self) -> Option<u16> {
        self.session.as_mut()?.pending.take()
    }

    /// End the drag normally, returning any not-yet-applied candidate so the
    /// caller can flush the final size. Safe to call while idle.
    pub fn end_drag(&mut self) -> Option<u16> {
        let mut session = self.session.take()?;
        session.overlay.release();
        tracing::debug!("drag ended");
        session.pending.take()
    }

    /// External force-stop (collapse, capture loss, shutdown). Drops any
    /// pending candidate. Idempotent.
    pub fn force_stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.overlay.release();
            tracing::debug!("drag force-stopped");
        }
    }

    /// Apply the safety timeout: terminates a session whose deadline has
    /// passed. Returns true when a stuck drag was recovered.
    pub fn expire_if_overdue(&mut self, now: Instant) -> bool {
        let overdue = self
            .session
            .as_ref()
            .is_some_and(|session| now > session.deadline);
        if overdue {
            tracing::warn!("drag exceeded safety timeout; forcing stop");
            self.force_stop();
        }
        overdue
    }
}
