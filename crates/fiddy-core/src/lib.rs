pub mod ai;
pub mod config;
pub mod error;
pub mod forms;
pub mod metrics;
pub mod module;
pub mod notice;
pub mod prompt;
pub mod state;
pub mod workflow;

// Re-export main types for convenience
pub use ai::{GeminiClient, TextGenerator};
pub use config::Config;
pub use error::{ConfigError, RemoteError, SubmitError, ValidationError};
pub use forms::{CompanionForm, NutritionForm, PreferenceForm, WorkoutForm};
pub use metrics::{IllustrativeMetrics, SAMPLE_METRICS};
pub use module::ModuleKind;
pub use notice::{Notice, NoticeSink, Severity};
pub use state::{ChatMessage, ChatSession, Origin, QuickAction};
pub use workflow::{GeneratedPlan, Phase, PlanRequestWorkflow};
