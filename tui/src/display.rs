//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from `ChatMessage`s and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the controller tells it
//! to. Display state is the bridge between `ChatMessage`s and rendering.
//!
//! - `DisplayMessage`: A committed conversation message
//! - partial answer + typing flag: the transient typing bubble
//! - `DisplayLine`: One wrapped line of the transcript, ready to draw

use lolgpt_core::{ChatMessage, ChatState, Message, SessionId, Speaker};

/// Cursor drawn at the end of the typing bubble
pub const TYPING_CURSOR: char = '|';

/// A committed conversation message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content
    pub content: String,
}

impl From<Message> for DisplayMessage {
    fn from(message: Message) -> Self {
        Self {
            role: message.role.into(),
            content: message.content,
        }
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// lolGPT answer
    Assistant,
}

impl From<Speaker> for DisplayRole {
    fn from(role: Speaker) -> Self {
        match role {
            Speaker::User => DisplayRole::User,
            Speaker::Assistant => DisplayRole::Assistant,
        }
    }
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Assistant => "lolGPT: ",
        }
    }
}

/// What a transcript line belongs to, for styling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Part of a user message
    User,
    /// Part of a committed answer
    Assistant,
    /// Part of the typing bubble
    Typing,
    /// Gap between messages
    Spacer,
}

/// One wrapped transcript line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayLine {
    /// Text to draw
    pub text: String,
    /// Styling hint
    pub kind: LineKind,
}

/// Complete display state for rendering
#[derive(Clone, Debug)]
pub struct DisplayState {
    /// Committed conversation
    pub messages: Vec<DisplayMessage>,
    /// Revealed prefix of the answer being typed
    pub partial: Option<String>,
    /// Whether the typing bubble is shown
    pub typing: bool,
    /// Controller state
    pub chat_state: ChatState,
    /// Most recent exchange failure
    pub last_error: Option<String>,
    /// Session after the last reset, if any
    pub session_id: Option<SessionId>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            partial: None,
            typing: false,
            chat_state: ChatState::Ready,
            last_error: None,
            session_id: None,
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a `ChatMessage` to update display state
    ///
    /// Returns true if the transcript changed, so the view can follow the
    /// newest content.
    pub fn apply_message(&mut self, msg: ChatMessage) -> bool {
        match msg {
            // Conversation messages
            ChatMessage::Appended { message, .. } => {
                if message.role == Speaker::Assistant {
                    self.partial = None;
                }
                self.messages.push(message.into());
                true
            }
            ChatMessage::RevealProgress { partial, .. } => {
                self.partial = Some(partial);
                true
            }
            ChatMessage::Typing { active } => {
                self.typing = active;
                if !active {
                    self.partial = None;
                }
                true
            }

            // System messages
            ChatMessage::Error { error, .. } => {
                self.last_error = Some(error);
                self.partial = None;
                false
            }
            ChatMessage::State { state } => {
                self.chat_state = state;
                if state == ChatState::AwaitingAnswer {
                    self.last_error = None;
                }
                false
            }
            ChatMessage::SessionReset { session_id } => {
                self.messages.clear();
                self.partial = None;
                self.typing = false;
                self.last_error = None;
                self.session_id = Some(session_id);
                true
            }
        }
    }

    /// Check if an answer is being revealed
    pub fn is_revealing(&self) -> bool {
        self.partial.is_some()
    }

    /// Text of the typing bubble, if shown
    pub fn typing_bubble(&self) -> Option<String> {
        if !self.typing {
            return None;
        }
        Some(format!(
            "{}{}{}",
            DisplayRole::Assistant.prefix(),
            self.partial.as_deref().unwrap_or_default(),
            TYPING_CURSOR
        ))
    }

    /// Wrap the whole transcript, typing bubble included, to `width` columns
    pub fn transcript_lines(&self, width: usize) -> Vec<DisplayLine> {
        let width = width.max(1);
        let mut lines = Vec::new();

        for msg in &self.messages {
            let kind = match msg.role {
                DisplayRole::User => LineKind::User,
                DisplayRole::Assistant => LineKind::Assistant,
            };
            let content = format!("{}{}", msg.role.prefix(), msg.content);
            push_wrapped(&mut lines, &content, width, kind);
        }

        if let Some(bubble) = self.typing_bubble() {
            push_wrapped(&mut lines, &bubble, width, LineKind::Typing);
        }

        lines
    }
}

fn push_wrapped(lines: &mut Vec<DisplayLine>, content: &str, width: usize, kind: LineKind) {
    for line in textwrap::wrap(content, width) {
        lines.push(DisplayLine {
            text: line.into_owned(),
            kind,
        });
    }
    lines.push(DisplayLine {
        text: String::new(),
        kind: LineKind::Spacer,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use lolgpt_core::ExchangeId;
    use pretty_assertions::assert_eq;

    fn appended(index: usize, message: Message) -> ChatMessage {
        ChatMessage::Appended { index, message }
    }

    fn progress(partial: &str) -> ChatMessage {
        ChatMessage::RevealProgress {
            exchange: ExchangeId(1),
            partial: partial.to_string(),
        }
    }

    #[test]
    fn test_display_role_from_speaker() {
        assert_eq!(DisplayRole::from(Speaker::User), DisplayRole::User);
        assert_eq!(DisplayRole::from(Speaker::Assistant), DisplayRole::Assistant);
        assert_eq!(DisplayRole::User.prefix(), "You: ");
        assert_eq!(DisplayRole::Assistant.prefix(), "lolGPT: ");
    }

    #[test]
    fn test_display_state_default() {
        let state = DisplayState::new();
        assert!(state.messages.is_empty());
        assert!(!state.typing);
        assert_eq!(state.chat_state, ChatState::Ready);
        assert_eq!(state.typing_bubble(), None);
    }

    #[test]
    fn test_full_exchange() {
        let mut state = DisplayState::new();

        assert!(state.apply_message(appended(0, Message::user("Best top?"))));
        assert!(state.apply_message(ChatMessage::Typing { active: true }));
        assert!(!state.apply_message(ChatMessage::State {
            state: ChatState::AwaitingAnswer
        }));
        assert_eq!(state.typing_bubble().as_deref(), Some("lolGPT: |"));

        state.apply_message(progress("D"));
        state.apply_message(progress("Da"));
        assert!(state.is_revealing());
        assert_eq!(state.typing_bubble().as_deref(), Some("lolGPT: Da|"));

        state.apply_message(appended(1, Message::assistant("Darius")));
        state.apply_message(ChatMessage::Typing { active: false });
        state.apply_message(ChatMessage::State {
            state: ChatState::Ready,
        });

        assert!(!state.is_revealing());
        assert_eq!(state.typing_bubble(), None);
        assert_eq!(
            state.messages,
            vec![
                DisplayMessage {
                    role: DisplayRole::User,
                    content: "Best top?".to_string(),
                },
                DisplayMessage {
                    role: DisplayRole::Assistant,
                    content: "Darius".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_error_hides_bubble_and_is_remembered() {
        let mut state = DisplayState::new();
        state.apply_message(appended(0, Message::user("Q")));
        state.apply_message(ChatMessage::Typing { active: true });

        state.apply_message(ChatMessage::Error {
            exchange: ExchangeId(1),
            error: "Network error: connection refused".to_string(),
        });
        state.apply_message(ChatMessage::Typing { active: false });

        assert_eq!(
            state.last_error.as_deref(),
            Some("Network error: connection refused")
        );
        assert_eq!(state.typing_bubble(), None);
        assert_eq!(state.messages.len(), 1);

        // Cleared once the next exchange starts
        state.apply_message(ChatMessage::State {
            state: ChatState::AwaitingAnswer,
        });
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn test_session_reset_clears_transcript() {
        let mut state = DisplayState::new();
        state.apply_message(appended(0, Message::user("Q")));
        state.apply_message(ChatMessage::Typing { active: true });
        state.apply_message(progress("A"));

        let session_id = SessionId::new();
        state.apply_message(ChatMessage::SessionReset {
            session_id: session_id.clone(),
        });

        assert!(state.messages.is_empty());
        assert!(!state.typing);
        assert_eq!(state.partial, None);
        assert_eq!(state.session_id, Some(session_id));
    }

    #[test]
    fn test_transcript_lines_wrap_and_style() {
        let mut state = DisplayState::new();
        state.apply_message(appended(0, Message::user("Who wins lane, Garen or Teemo?")));
        state.apply_message(ChatMessage::Typing { active: true });
        state.apply_message(progress("Teemo"));

        let lines = state.transcript_lines(20);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "You: Who wins lane,",
                "Garen or Teemo?",
                "",
                "lolGPT: Teemo|",
                "",
            ]
        );
        assert_eq!(lines[0].kind, LineKind::User);
        assert_eq!(lines[2].kind, LineKind::Spacer);
        assert_eq!(lines[3].kind, LineKind::Typing);
    }

    #[test]
    fn test_transcript_keeps_explicit_newlines() {
        let mut state = DisplayState::new();
        state.apply_message(appended(0, Message::assistant("Runes:\n- Conqueror")));

        let lines = state.transcript_lines(80);
        assert_eq!(lines[0].text, "lolGPT: Runes:");
        assert_eq!(lines[1].text, "- Conqueror");
        assert_eq!(lines[1].kind, LineKind::Assistant);
    }
}
