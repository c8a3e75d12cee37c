//! Content tabs: the implicit Home tab plus launched app instances.

use crate::bus::AppRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub app_name: String,
    pub icon: String,
    pub instance: u32,
}

impl Tab {
    pub fn title(&self) -> String {
        if self.instance > 1 {
            format!("{} ({})", self.app_name, self.instance)
        } else {
            self.app_name.clone()
        }
    }
}

/// Ordered tab strip. The Home tab is implicit (`active == None`) and can
/// never be closed; app tabs are created per launch and destroyed by their
/// close control.
#[derive(Debug, Default)]
pub struct TabSet {
    tabs: Vec<Tab>,
    active: Option<usize>,
}

impl TabSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active.and_then(|index| self.tabs.get(index))
    }

    /// Open a new tab for the app and activate it. Repeat launches of the
    /// same app get increasing instance numbers.
    pub fn open(&mut self, app: &AppRef) {
        let instance = self
            .tabs
            .iter()
            .filter(|tab| tab.app_name == app.name)
            .count() as u32
            + 1;
        self.tabs.push(Tab {
            app_name: app.name.clone(),
            icon: app.icon.clone(),
            instance,
        });
        self.active = Some(self.tabs.len() - 1);
        tracing::debug!(app = %app.name, instance, "opened content tab");
    }

    /// Activate a tab by index; `None` activates Home. Out-of-range indexes
    /// are ignored.
    pub fn activate(&mut self, index: Option<usize>) {
        match index {
            Some(i) if i >= self.tabs.len() => {}
            other => self.active = other,
        }
    }

    /// Close the tab at `index`. Closing the active tab activates its left
    /// neighbor, falling back to Home. Home itself is not addressable here.
    pub fn close(&mut self, index: usize) {
        if index >= self.tabs.len() {
            return;
        }
        self.tabs.remove(index);
        self.active = match self.active {
            Some(active) if active == index => index.checked_sub(1),
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
    }
}
