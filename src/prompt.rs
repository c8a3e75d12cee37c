//! Command-line state machine: INPUT/CONFIRMATION flow, canned function
//! synthesis, and the history strip entries.
//!
//! Commands never execute anything real. A submitted command either runs one
//! of the fixed "immediate" surface openers, or parks in CONFIRMATION until
//! Enter confirms (emit the canned function line) or Escape cancels.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Input,
    Confirmation,
}

/// Commands that execute synchronously and never enter CONFIRMATION.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmediateCommand {
    OpenApps,
    OpenFolders,
    OpenOmniverse,
    ToggleExplorer,
    ToggleAgent,
}

impl ImmediateCommand {
    fn parse(command: &str) -> Option<Self> {
        match command.to_ascii_lowercase().as_str() {
            "apps" => Some(Self::OpenApps),
            "folders" => Some(Self::OpenFolders),
            "omniverse" => Some(Self::OpenOmniverse),
            "explorer" => Some(Self::ToggleExplorer),
            "agent" => Some(Self::ToggleAgent),
            _ => None,
        }
    }

    fn function(self) -> &'static str {
        match self {
            Self::OpenApps => "open_popup(\"apps\")",
            Self::OpenFolders => "open_popup(\"folders\")",
            Self::OpenOmniverse => "open_popup(\"omniverse\")",
            Self::ToggleExplorer => "toggle_panel(\"explorer\")",
            Self::ToggleAgent => "toggle_panel(\"agent\")",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input; nothing happened.
    Ignored,
    /// Command parked, awaiting Enter/Escape.
    Confirming,
    /// One of the fixed immediate commands; the shell applies it now.
    Immediate(ImmediateCommand),
}

/// One rendered history entry: the typed command bubble (absent for system
/// notices such as the post-clear line) plus at most two result lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub command: Option<String>,
    pub lines: Vec<String>,
}

#[derive(Debug)]
struct PendingCommand {
    command: String,
    function: String,
    entry: usize,
}

#[derive(Debug, Default)]
pub struct CommandPrompt {
    buffer: String,
    cursor: usize,
    mode: PromptMode,
    pending: Option<PendingCommand>,
    history: Vec<HistoryEntry>,
}

impl Default for PromptMode {
    fn default() -> Self {
        Self::Input
    }
}

const CONFIRM_HINT: &str = "Yes: <enter>    No: <esc>";

impl CommandPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.buffer[..self.cursor]
            .chars()
            .next_back()
            .map_or(0, char::len_utf8);
        self.cursor -= prev;
        self.buffer.remove(self.cursor);
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    /// Submit the buffer. Non-empty input becomes a pending command unless it
    /// is immediate; the buffer is cleared either way.
    pub fn submit(&mut self) -> SubmitOutcome {
        let command = self.buffer.trim().to_string();
        if command.is_empty() {
            return SubmitOutcome::Ignored;
        }
        self.buffer.clear();
        self.cursor = 0;

        if let Some(immediate) = ImmediateCommand::parse(&command) {
            self.history.push(HistoryEntry {
                command: Some(command),
                lines: vec![immediate.function().to_string()],
            });
            return SubmitOutcome::Immediate(immediate);
        }

        let (function, lines) = if command.eq_ignore_ascii_case("clear") {
            (
                "clear_history()".to_string(),
                vec![
                    "Are you sure you would like to clear the Command Line History".to_string(),
                    CONFIRM_HINT.to_string(),
                ],
            )
        } else {
            (
                canned_function(&command),
                vec![
                    format!("Would you like to perform {command}?"),
                    CONFIRM_HINT.to_string(),
                ],
            )
        };
        self.history.push(HistoryEntry {
            command: Some(command.clone()),
            lines,
        });
        self.pending = Some(PendingCommand {
            command,
            function,
            entry: self.history.len() - 1,
        });
        self.mode = PromptMode::Confirmation;
        SubmitOutcome::Confirming
    }

    /// Enter in CONFIRMATION: run the pending command's canned effect.
    pub fn confirm(&mut self) {
        let Some(pending) = self.pending.take() else {
            self.mode = PromptMode::Input;
            return;
        };
        if pending.command.eq_ignore_ascii_case("clear") {
            self.history.clear();
            self.history.push(HistoryEntry {
                command: None,
                lines: vec!["Command Line History cleared".to_string()],
            });
        } else if let Some(entry) = self.history.get_mut(pending.entry) {
            entry.lines = vec![pending.command.clone(), pending.function.clone()];
        }
        self.mode = PromptMode::Input;
    }

    /// Escape in CONFIRMATION: mark the pending entry cancelled.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take()
            && let Some(entry) = self.history.get_mut(pending.entry)
        {
            entry.lines = vec![pending.command.clone(), "cancelled".to_string()];
        }
        self.mode = PromptMode::Input;
    }
}

/// Map a command onto its canned function line by keyword.
pub fn canned_function(command: &str) -> String {
    let lower = command.to_ascii_lowercase();
    let contains = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));
    if contains(&["create", "make"]) {
        format!("create_object(\"{command}\")")
    } else if contains(&["delete", "remove"]) {
        format!("delete_object(\"{command}\")")
    } else if contains(&["move", "translate"]) {
        format!("move_object(\"{command}\", x, y, z)")
    } else if contains(&["rotate"]) {
        format!("rotate_object(\"{command}\", angle)")
    } else if contains(&["scale", "resize"]) {
        format!("scale_object(\"{command}\", factor)")
    } else if contains(&["render", "display"]) {
        format!("render_scene(\"{command}\")")
    } else if contains(&["load", "import"]) {
        format!("load_asset(\"{command}\")")
    } else if contains(&["save", "export"]) {
        format!("save_project(\"{command}\")")
    } else {
        format!("execute_command(\"{command}\")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_submit_is_ignored() {
        let mut prompt = CommandPrompt::new();
        prompt.insert_char(' ');
        assert_eq!(prompt.submit(), SubmitOutcome::Ignored);
        assert_eq!(prompt.mode(), PromptMode::Input);
    }

    #[test]
    fn submit_then_confirm_records_function_line() {
        let mut prompt = CommandPrompt::new();
        for c in "rotate the cube".chars() {
            prompt.insert_char(c);
        }
        assert_eq!(prompt.submit(), SubmitOutcome::Confirming);
        assert_eq!(prompt.mode(), PromptMode::Confirmation);
        prompt.confirm();
        assert_eq!(prompt.mode(), PromptMode::Input);
        let entry = prompt.history().last().unwrap();
        assert_eq!(entry.command.as_deref(), Some("rotate the cube"));
        assert_eq!(
            entry.lines,
            vec![
                "rotate the cube".to_string(),
                "rotate_object(\"rotate the cube\", angle)".to_string()
            ]
        );
    }

    #[test]
    fn cancel_marks_entry_cancelled() {
        let mut prompt = CommandPrompt::new();
        for c in "save scene".chars() {
            prompt.insert_char(c);
        }
        prompt.submit();
        prompt.cancel();
        let entry = prompt.history().last().unwrap();
        assert_eq!(entry.lines[1], "cancelled");
        assert_eq!(prompt.mode(), PromptMode::Input);
    }

    #[test]
    fn clear_confirm_wipes_history() {
        let mut prompt = CommandPrompt::new();
        for c in "make a wall".chars() {
            prompt.insert_char(c);
        }
        prompt.submit();
        prompt.confirm();
        for c in "clear".chars() {
            prompt.insert_char(c);
        }
        prompt.submit();
        prompt.confirm();
        assert_eq!(prompt.history().len(), 1);
        let entry = &prompt.history()[0];
        assert_eq!(entry.command, None);
        assert_eq!(entry.lines, vec!["Command Line History cleared".to_string()]);
    }

    #[test]
    fn clear_cancel_keeps_history() {
        let mut prompt = CommandPrompt::new();
        for c in "make a wall".chars() {
            prompt.insert_char(c);
        }
        prompt.submit();
        prompt.confirm();
        for c in "clear".chars() {
            prompt.insert_char(c);
        }
        prompt.submit();
        prompt.cancel();
        assert_eq!(prompt.history().len(), 2);
        let entry = prompt.history().last().unwrap();
        assert_eq!(entry.command.as_deref(), Some("clear"));
        assert_eq!(entry.lines[1], "cancelled");
    }

    #[test]
    fn immediate_command_stays_in_input_mode() {
        let mut prompt = CommandPrompt::new();
        for c in "folders".chars() {
            prompt.insert_char(c);
        }
        assert_eq!(
            prompt.submit(),
            SubmitOutcome::Immediate(ImmediateCommand::OpenFolders)
        );
        assert_eq!(prompt.mode(), PromptMode::Input);
    }

    #[test]
    fn canned_function_keyword_table() {
        assert_eq!(
            canned_function("import terrain"),
            "load_asset(\"import terrain\")"
        );
        assert_eq!(canned_function("nonsense"), "execute_command(\"nonsense\")");
    }

    #[test]
    fn backspace_and_delete_edit_at_cursor() {
        let mut prompt = CommandPrompt::new();
        for c in "abc".chars() {
            prompt.insert_char(c);
        }
        prompt.backspace();
        assert_eq!(prompt.buffer(), "ab");
        prompt.delete_forward();
        assert_eq!(prompt.buffer(), "ab");
    }
}
