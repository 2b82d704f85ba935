//! Transient user-facing notices
//!
//! The workflow only produces `Notice` values; how they're shown (a banner in
//! the TUI, a line on stderr for one-shot commands) is up to the sink.

use crate::error::{RemoteError, SubmitError, ValidationError};
use crate::module::ModuleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

pub trait NoticeSink {
    fn notify(&mut self, notice: Notice);
}

impl NoticeSink for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }

    pub fn missing_fields(module: ModuleKind, err: &ValidationError) -> Self {
        let ValidationError::MissingFields(fields) = err;
        let description = if module == ModuleKind::Companion {
            "Share a message or pick a mood first.".to_string()
        } else {
            format!(
                "Please fill in all required fields to generate your {}: {}.",
                module.artifact(),
                fields.join(", ")
            )
        };
        Self::new("Missing Information", description, Severity::Error)
    }

    pub fn success(module: ModuleKind) -> Self {
        match module {
            ModuleKind::Nutrition => Self::new(
                "Diet Plan Generated! 🥗",
                "Your personalized nutrition plan is ready!",
                Severity::Success,
            ),
            ModuleKind::Workout => Self::new(
                "Workout Plan Ready! 💪",
                "Your personalized fitness routine is here!",
                Severity::Success,
            ),
            ModuleKind::Companion => Self::new("Pookie replied 💕", "", Severity::Success),
        }
    }

    /// Remote failure. The collapsed form says only that something went
    /// wrong; `detailed` picks a description per failure kind.
    pub fn remote_failure(module: ModuleKind, err: &RemoteError, detailed: bool) -> Self {
        let (title, generic) = match module {
            ModuleKind::Companion => (
                "Connection Error",
                "I'm having trouble connecting right now. Please try again.".to_string(),
            ),
            _ => (
                "Error",
                format!("Failed to generate {}. Please try again.", module.artifact()),
            ),
        };

        if !detailed {
            return Self::new(title, generic, Severity::Error);
        }

        let description = match err {
            RemoteError::NetworkUnavailable(_) => {
                "The generation service could not be reached. Check your connection.".to_string()
            }
            RemoteError::ServiceRejected { status: 401 | 403, .. } => {
                "The service rejected the API key.".to_string()
            }
            RemoteError::ServiceRejected { status: 429, .. } => {
                "Too many requests. Wait a moment and try again.".to_string()
            }
            RemoteError::ServiceRejected { status, .. } => {
                format!("The service returned an error (HTTP {}).", status)
            }
            RemoteError::UnexpectedResponseShape(_) => {
                "The service answered with something we couldn't read.".to_string()
            }
            RemoteError::MissingCredential => {
                "No API key configured. Set GEMINI_API_KEY or api_key in config.json.".to_string()
            }
            RemoteError::TaskFailed(_) => generic,
        };
        Self::new(title, description, Severity::Error)
    }

    /// Notice for a failed submission, or `None` when the attempt was
    /// simply ignored because another one is in flight
    pub fn for_submit_error(module: ModuleKind, err: &SubmitError, detailed: bool) -> Option<Self> {
        match err {
            SubmitError::InFlight => None,
            SubmitError::Validation(v) => Some(Self::missing_fields(module, v)),
            SubmitError::Remote(r) => Some(Self::remote_failure(module, r, detailed)),
        }
    }
}
