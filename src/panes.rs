//! Pure pane-sizing math: clamp limits and collapse/reopen bookkeeping.
//!
//! All functions here are DOM-free on purpose: the drag plumbing in
//! [`crate::resize`] computes candidate sizes and the shell applies them, but
//! every bound lives in this module so the clamp behavior can be tested
//! without a terminal.

/// Size bounds for one resizable pane, in terminal columns.
///
/// The effective maximum is the smaller of the configured viewport fraction
/// and the viewport minus the reserved workspace guard. The minimum is the
/// larger of an absolute floor and a viewport fraction (the folders split has
/// no absolute floor, only fractions). When the bounds cross on a tiny
/// viewport, the floor wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLimits {
    pub min_cols: u16,
    pub min_percent: u16,
    pub max_percent: u16,
    pub workspace_guard: u16,
}

impl PaneLimits {
    /// Left project-manager sidebar: absolute floor, 20% of the viewport cap.
    pub const PROJECT_MANAGER: Self = Self {
        min_cols: 18,
        min_percent: 0,
        max_percent: 20,
        workspace_guard: 0,
    };

    /// Right chat-agent panel: wider floor, half the viewport cap, and a
    /// guard so the workspace in the middle never fully disappears.
    pub const AGENT_PANEL: Self = Self {
        min_cols: 30,
        min_percent: 0,
        max_percent: 50,
        workspace_guard: 24,
    };

    /// Divider inside the Folders popup: both bounds are fractions of the
    /// popup body, with one column reserved for the divider itself.
    pub const FOLDERS_SPLIT: Self = Self {
        min_cols: 0,
        min_percent: 10,
        max_percent: 70,
        workspace_guard: 1,
    };

    pub fn min_size(&self, viewport: u16) -> u16 {
        let fraction = (u32::from(viewport) * u32::from(self.min_percent) / 100) as u16;
        self.min_cols.max(fraction)
    }

    pub fn effective_max(&self, viewport: u16) -> u16 {
        let fraction = (u32::from(viewport) * u32::from(self.max_percent) / 100) as u16;
        fraction.min(viewport.saturating_sub(self.workspace_guard))
    }

    /// Clamp a candidate size into `[min, effective_max]` for the given
    /// viewport. The candidate is signed because drag deltas may undershoot
    /// zero. Floor wins over ceiling when the viewport is too small to honor
    /// both.
    pub fn clamp(&self, candidate: i32, viewport: u16) -> u16 {
        let candidate = candidate.clamp(0, i32::from(u16::MAX)) as u16;
        self.min_size(viewport)
            .max(candidate.min(self.effective_max(viewport)))
    }
}

/// Collapse state for one collapsible panel.
///
/// `last_expanded_size` is only recorded while the panel is expanded and is
/// re-clamped against the viewport in effect at reopen time, not the one at
/// collapse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelState {
    collapsed: bool,
    last_expanded_size: u16,
}

impl PanelState {
    pub fn new(initial_size: u16) -> Self {
        Self {
            collapsed: false,
            last_expanded_size: initial_size,
        }
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn last_expanded_size(&self) -> u16 {
        self.last_expanded_size
    }

    /// Record the current rendered size. No-op while collapsed.
    pub fn record_expanded(&mut self, size: u16, limits: &PaneLimits, viewport: u16) {
        if self.collapsed {
            return;
        }
        self.last_expanded_size = limits.clamp(i32::from(size), viewport);
    }

    /// Collapse, remembering the size the panel had at this moment.
    pub fn collapse(&mut self, current_size: u16, limits: &PaneLimits, viewport: u16) {
        if self.collapsed {
            return;
        }
        self.record_expanded(current_size, limits, viewport);
        self.collapsed = true;
        tracing::debug!(size = self.last_expanded_size, "panel collapsed");
    }

    /// Reopen and return the size to restore, clamped against the current
    /// viewport (bounds may have changed since collapse).
    pub fn reopen(&mut self, limits: &PaneLimits, viewport: u16) -> u16 {
        self.collapsed = false;
        let restored = limits.clamp(i32::from(self.last_expanded_size), viewport);
        self.last_expanded_size = restored;
        tracing::debug!(size = restored, "panel reopened");
        restored
    }
}
