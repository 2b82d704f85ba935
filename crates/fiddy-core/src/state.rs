//! Companion chat session
//!
//! UI-agnostic: the TUI and the one-shot `chat` command both drive a
//! `ChatSession` through `begin_send` / `finish`.

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::ai::TextGenerator;
use crate::error::{RemoteError, SubmitError};
use crate::forms::{CompanionForm, Mood};

pub const GREETING: &str = "Hey beautiful soul! 💕 I'm Pookie, your caring companion. \
I'm here to listen, support, and remind you how amazing you are. How are you feeling today?";

/// A chat message in the companion conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub body: String,
    pub origin: Origin,
    pub created_at: DateTime<Local>,
}

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Companion,
}

/// Canned requests offered as one-key shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Breathing,
    Music,
    Affirmation,
    Sleep,
}

impl QuickAction {
    pub fn all() -> [QuickAction; 4] {
        [
            QuickAction::Breathing,
            QuickAction::Music,
            QuickAction::Affirmation,
            QuickAction::Sleep,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::Breathing => "Breathing Exercise",
            QuickAction::Music => "Calming Music",
            QuickAction::Affirmation => "Daily Affirmation",
            QuickAction::Sleep => "Sleep Meditation",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            QuickAction::Breathing => "Can you guide me through a breathing exercise?",
            QuickAction::Music => "I could use some calming music recommendations",
            QuickAction::Affirmation => "I need some positive affirmations today",
            QuickAction::Sleep => "Help me with something relaxing for sleep",
        }
    }
}

pub struct ChatSession {
    form: CompanionForm,
    messages: Vec<ChatMessage>,
    next_id: u64,
    in_flight: bool,
    history_turns: usize,
}

impl ChatSession {
    /// `history_turns` prior messages are replayed into each prompt; 0 keeps
    /// every call single-turn
    pub fn new(history_turns: usize) -> Self {
        let mut session = Self {
            form: CompanionForm::default(),
            messages: Vec::new(),
            next_id: 1,
            in_flight: false,
            history_turns,
        };
        session.push(GREETING.to_string(), Origin::Companion);
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.form.message
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.form.message
    }

    pub fn mood(&self) -> Option<Mood> {
        self.form.mood
    }

    pub fn set_mood(&mut self, mood: Option<Mood>) {
        self.form.mood = mood;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// True when a send would pass validation
    pub fn can_send(&self) -> bool {
        !self.in_flight && self.form.validate().is_ok()
    }

    fn push(&mut self, body: String, origin: Origin) -> &ChatMessage {
        let message = ChatMessage {
            id: self.next_id,
            body,
            origin,
            created_at: Local::now(),
        };
        self.next_id += 1;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    fn history_block(&self) -> String {
        if self.history_turns == 0 {
            return String::new();
        }

        let start = self.messages.len().saturating_sub(self.history_turns);
        let mut block = String::from("Conversation so far:\n");
        for msg in &self.messages[start..] {
            let who = match msg.origin {
                Origin::User => "User",
                Origin::Companion => "Pookie",
            };
            block.push_str(&format!("{}: {}\n", who, msg.body));
        }
        block.push('\n');
        block
    }

    /// Record the user's turn and return the prompt to send.
    ///
    /// `text` overrides the draft (quick actions); the current mood is used
    /// either way. The draft is cleared once the turn is recorded.
    pub fn begin_send(&mut self, text: Option<&str>) -> Result<String, SubmitError> {
        if self.in_flight {
            debug!("begin_send: already in flight, ignoring");
            return Err(SubmitError::InFlight);
        }

        let form = match text {
            Some(t) => CompanionForm {
                message: t.to_string(),
                mood: self.form.mood,
            },
            None => self.form.clone(),
        };
        form.validate()?;

        let history = self.history_block();
        let prompt = form.build_prompt(&history);
        let turn = form.user_turn().unwrap_or_default();

        self.push(turn, Origin::User);
        self.form.message.clear();
        self.in_flight = true;

        info!(
            prompt_len = prompt.len(),
            history_turns = self.history_turns,
            "begin_send: submitting"
        );
        Ok(prompt)
    }

    /// Append the companion's reply on success. The user's turn stays in
    /// the history either way.
    pub fn finish(&mut self, result: Result<String, RemoteError>) -> Result<&ChatMessage, RemoteError> {
        self.in_flight = false;
        match result {
            Ok(text) => {
                debug!(reply_len = text.len(), "finish: reply received");
                Ok(self.push(text, Origin::Companion))
            }
            Err(e) => {
                warn!(error = %e, "finish: request failed");
                Err(e)
            }
        }
    }

    pub async fn send(
        &mut self,
        generator: &dyn TextGenerator,
        text: Option<&str>,
    ) -> Result<&ChatMessage, SubmitError> {
        let prompt = self.begin_send(text)?;
        let result = generator.generate(&prompt).await;
        Ok(self.finish(result)?)
    }
}
