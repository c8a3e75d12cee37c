//! Keyboard ownership: which logical surface receives routed keystrokes.
//!
//! Ownership is mutated only through [`KeyboardOwner::acquire`] and
//! [`KeyboardOwner::release`] so the at-most-one-owner invariant is enforced
//! in one place instead of by convention across every focus/blur/collapse
//! code path.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerSurface {
    /// The main command line. Default owner; raw keydowns are redirected
    /// into its buffer.
    CommandLine,
    /// The chat agent's input. While it owns keys the router performs no
    /// redirection and no buffer mutation, unconditionally.
    AgentInput,
    /// Some other focused form field; the router leaves input alone.
    FormField,
}

#[derive(Debug)]
pub struct KeyboardOwner {
    current: OwnerSurface,
}

impl Default for KeyboardOwner {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardOwner {
    pub fn new() -> Self {
        Self {
            current: OwnerSurface::CommandLine,
        }
    }

    pub fn current(&self) -> OwnerSurface {
        self.current
    }

    pub fn acquire(&mut self, surface: OwnerSurface) {
        if self.current != surface {
            tracing::debug!(?surface, "keyboard owner acquired");
        }
        self.current = surface;
    }

    /// Release ownership held by `surface`. Releasing a surface that does
    /// not currently own keys is a no-op, so stale blur notifications cannot
    /// steal ownership from a newer owner.
    pub fn release(&mut self, surface: OwnerSurface) {
        if self.current == surface {
            self.current = OwnerSurface::CommandLine;
            tracing::debug!(?surface, "keyboard owner released");
        }
    }

    pub fn agent_owns(&self) -> bool {
        self.current == OwnerSurface::AgentInput
    }

    pub fn command_line_owns(&self) -> bool {
        self.current == OwnerSurface::CommandLine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_owner_is_command_line() {
        let owner = KeyboardOwner::new();
        assert!(owner.command_line_owns());
    }

    #[test]
    fn acquire_then_release_round_trips() {
        let mut owner = KeyboardOwner::new();
        owner.acquire(OwnerSurface::AgentInput);
        assert!(owner.agent_owns());
        owner.release(OwnerSurface::AgentInput);
        assert!(owner.command_line_owns());
    }

    #[test]
    fn stale_release_does_not_steal_ownership() {
        let mut owner = KeyboardOwner::new();
        owner.acquire(OwnerSurface::AgentInput);
        // A form field blur that never owned keys must not reset the agent.
        owner.release(OwnerSurface::FormField);
        assert!(owner.agent_owns());
    }
}
