//! Message emission towards the chat front end.

use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::warn;
use uuid::Uuid;

/// Fire-and-forget sink for wizard output.
///
/// Calls arrive in the order messages must be rendered.
pub trait WizardUi: Send {
    /// Echo what the user typed.
    fn append_user_message(&mut self, text: &str);
    /// Show a wizard message.
    fn append_system_message(&mut self, text: &str);
    /// Reset the input fields.
    fn clear_inputs(&mut self);
    /// The family graph changed.
    fn notify_data_updated(&mut self);
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
}

/// One chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    /// Create a message with a fresh id
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
        }
    }
}

/// Records everything the wizard emits.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// Messages in emission order.
    pub messages: Vec<ChatMessage>,
    /// Number of `clear_inputs` calls.
    pub inputs_cleared: usize,
    /// Number of `notify_data_updated` calls.
    pub data_updates: usize,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of every system message, oldest first.
    pub fn system_messages(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.text.as_str())
            .collect()
    }

    /// Text of the latest system message.
    pub fn last_system_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::System)
            .map(|m| m.text.as_str())
    }
}

impl WizardUi for Transcript {
    fn append_user_message(&mut self, text: &str) {
        self.messages.push(ChatMessage::new(Role::User, text));
    }

    fn append_system_message(&mut self, text: &str) {
        self.messages.push(ChatMessage::new(Role::System, text));
    }

    fn clear_inputs(&mut self) {
        self.inputs_cleared += 1;
    }

    fn notify_data_updated(&mut self) {
        self.data_updates += 1;
    }
}

/// Terminal front end: prints wizard messages as they arrive.
///
/// User messages are not echoed since the terminal already shows them.
pub struct ConsoleUi<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsoleUi<W> {
    /// Write to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the UI and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to write chat output");
        }
    }
}

impl<W: Write + Send> WizardUi for ConsoleUi<W> {
    fn append_user_message(&mut self, _text: &str) {}

    fn append_system_message(&mut self, text: &str) {
        self.write_line(&format!("wizard> {}", text));
    }

    fn clear_inputs(&mut self) {}

    fn notify_data_updated(&mut self) {
        self.write_line("        (family tree updated)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_keeps_emission_order() {
        let mut transcript = Transcript::new();
        transcript.append_system_message("first");
        transcript.append_user_message("second");
        transcript.append_system_message("third");
        transcript.clear_inputs();
        transcript.notify_data_updated();

        let texts: Vec<&str> = transcript.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(transcript.system_messages(), vec!["first", "third"]);
        assert_eq!(transcript.last_system_message(), Some("third"));
        assert_eq!(transcript.inputs_cleared, 1);
        assert_eq!(transcript.data_updates, 1);
    }

    #[test]
    fn test_console_ui_prints_system_messages_only() {
        let mut ui = ConsoleUi::new(Vec::new());
        ui.append_user_message("Sita Rao, 1960");
        ui.append_system_message("Hello");

        let output = String::from_utf8(ui.into_inner()).unwrap();
        assert_eq!(output, "wizard> Hello\n");
    }
}
