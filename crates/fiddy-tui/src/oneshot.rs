//! Non-interactive commands: fill one form from flags, make one request,
//! print the text to stdout. Notices go to stderr.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use fiddy_core::forms::{NutritionEdit, WorkoutEdit};
use fiddy_core::{
    ChatSession, Config, ModuleKind, Notice, NoticeSink, NutritionForm, PlanRequestWorkflow,
    PreferenceForm, Severity, TextGenerator, WorkoutForm,
};
use tracing::info;

use crate::cli::Command;

/// Writes notices to stderr, one line each
pub struct StderrSink;

impl NoticeSink for StderrSink {
    fn notify(&mut self, notice: Notice) {
        let tag = match notice.severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Error => "error",
        };
        if notice.description.is_empty() {
            eprintln!("[{}] {}", tag, notice.title);
        } else {
            eprintln!("[{}] {}: {}", tag, notice.title, notice.description);
        }
    }
}

/// Run a one-shot command. Returns false when nothing was generated.
///
/// `config_path` is the `--config` override, if any.
pub async fn run(
    command: Command,
    config: &Config,
    config_path: Option<&Path>,
    generator: &dyn TextGenerator,
    sink: &mut impl NoticeSink,
    out: &mut impl Write,
) -> Result<bool> {
    let detailed = config.detailed_errors;
    match command {
        Command::Diet {
            diet_type,
            fitness_goal,
            workout_type,
            allergies,
        } => {
            let mut form = NutritionForm::default();
            form = apply_some(form, diet_type.map(NutritionEdit::DietType));
            form = apply_some(form, fitness_goal.map(NutritionEdit::FitnessGoal));
            form = apply_some(form, workout_type.map(NutritionEdit::WorkoutType));
            for allergy in allergies {
                if !form.allergies.contains(&allergy) {
                    form = form.apply(NutritionEdit::ToggleAllergy(allergy));
                }
            }
            generate_plan(form, generator, detailed, sink, out).await
        }
        Command::Workout {
            workout_type,
            duration,
            frequency,
            equipment,
        } => {
            let mut form = WorkoutForm::default();
            form = apply_some(form, workout_type.map(WorkoutEdit::WorkoutType));
            form = apply_some(form, duration.map(WorkoutEdit::Duration));
            form = apply_some(form, frequency.map(WorkoutEdit::Frequency));
            for item in equipment {
                if !form.equipment.contains(&item) {
                    form = form.apply(WorkoutEdit::ToggleEquipment(item));
                }
            }
            generate_plan(form, generator, detailed, sink, out).await
        }
        Command::Chat { mood, message } => {
            let mut session = ChatSession::new(0);
            session.set_mood(mood);
            if let Some(message) = message {
                *session.draft_mut() = message;
            }

            match session.send(generator, None).await {
                Ok(reply) => {
                    writeln!(out, "{}", reply.body)?;
                    Ok(true)
                }
                Err(e) => {
                    if let Some(notice) = Notice::for_submit_error(ModuleKind::Companion, &e, detailed) {
                        sink.notify(notice);
                    }
                    Ok(false)
                }
            }
        }
        Command::Init { force } => {
            let path = init_config(config, config_path, force)?;
            writeln!(out, "Wrote {}", path.display())?;
            Ok(true)
        }
    }
}

/// Write `config` to `path`, or to the default location. An existing file
/// is only replaced with `force`.
pub fn init_config(config: &Config, path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => Config::get_config_path()?,
    };
    if target.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", target.display());
    }

    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    info!(path = %target.display(), "Config written");
    Ok(target)
}

fn apply_some<F: PreferenceForm>(form: F, edit: Option<F::Edit>) -> F {
    match edit {
        Some(edit) => form.apply(edit),
        None => form,
    }
}

async fn generate_plan<F: PreferenceForm>(
    form: F,
    generator: &dyn TextGenerator,
    detailed: bool,
    sink: &mut impl NoticeSink,
    out: &mut impl Write,
) -> Result<bool> {
    let mut workflow = PlanRequestWorkflow::with_form(form);
    match workflow.submit(generator).await {
        Ok(plan) => {
            writeln!(out, "{}", plan)?;
            sink.notify(Notice::success(F::MODULE));
            Ok(true)
        }
        Err(e) => {
            if let Some(notice) = Notice::for_submit_error(F::MODULE, &e, detailed) {
                sink.notify(notice);
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fiddy_core::forms::{Allergy, DietType, FitnessGoal, Mood, TrainingStyle};
    use fiddy_core::RemoteError;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records prompts and answers with a fixed outcome
    struct Fixed {
        outcome: Result<String, RemoteError>,
        prompts: Mutex<Vec<String>>,
    }

    impl Fixed {
        fn new(outcome: Result<String, RemoteError>) -> Self {
            Self {
                outcome,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn generate(&self, prompt: &str) -> Result<String, RemoteError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.outcome.clone()
        }
    }

    fn diet(allergies: Vec<Allergy>) -> Command {
        Command::Diet {
            diet_type: Some(DietType::Vegetarian),
            fitness_goal: Some(FitnessGoal::SkinGlow),
            workout_type: Some(TrainingStyle::Yoga),
            allergies,
        }
    }

    #[tokio::test]
    async fn test_diet_prints_plan_and_reports_success() {
        let generator = Fixed::new(Ok("Day 1: lentil soup".to_string()));
        let mut notices: Vec<Notice> = Vec::new();
        let mut out: Vec<u8> = Vec::new();

        let ok = run(
            diet(vec![Allergy::Nuts, Allergy::Nuts]),
            &Config::new(),
            None,
            &generator,
            &mut notices,
            &mut out,
        )
        .await
        .unwrap();

        assert!(ok);
        assert_eq!(String::from_utf8(out).unwrap(), "Day 1: lentil soup\n");
        assert_eq!(notices[0].severity, Severity::Success);

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Allergies/Restrictions: Nut allergies\n"));
    }

    #[tokio::test]
    async fn test_missing_flags_report_fields_without_calling() {
        let generator = Fixed::new(Ok("unused".to_string()));
        let mut notices: Vec<Notice> = Vec::new();
        let mut out: Vec<u8> = Vec::new();

        let command = Command::Workout {
            workout_type: None,
            duration: None,
            frequency: None,
            equipment: vec![],
        };
        let ok = run(command, &Config::new(), None, &generator, &mut notices, &mut out).await.unwrap();

        assert!(!ok);
        assert!(out.is_empty());
        assert!(notices[0].description.contains("Workout Type"));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_uses_collapsed_message() {
        let generator = Fixed::new(Err(RemoteError::ServiceRejected {
            status: 429,
            body: String::new(),
        }));
        let mut notices: Vec<Notice> = Vec::new();
        let mut out: Vec<u8> = Vec::new();

        let ok = run(diet(vec![]), &Config::new(), None, &generator, &mut notices, &mut out).await.unwrap();
        assert!(!ok);
        assert_eq!(notices[0].description, "Failed to generate diet plan. Please try again.");
    }

    #[tokio::test]
    async fn test_chat_with_mood_only() {
        let generator = Fixed::new(Ok("Rest is productive too 💤".to_string()));
        let mut notices: Vec<Notice> = Vec::new();
        let mut out: Vec<u8> = Vec::new();

        let command = Command::Chat {
            mood: Some(Mood::Tired),
            message: None,
        };
        let ok = run(command, &Config::new(), None, &generator, &mut notices, &mut out).await.unwrap();

        assert!(ok);
        assert!(notices.is_empty());
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("User's message: I'm feeling tired"));
    }

    #[tokio::test]
    async fn test_init_writes_config_and_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fiddy").join("config.json");
        let config = Config {
            model: Some("gemini-1.5-pro".to_string()),
            chat_history_turns: Some(6),
            ..Config::new()
        };
        let generator = Fixed::new(Ok("unused".to_string()));
        let mut notices: Vec<Notice> = Vec::new();
        let mut out: Vec<u8> = Vec::new();

        let command = Command::Init { force: false };
        let ok = run(command, &config, Some(&path), &generator, &mut notices, &mut out)
            .await
            .unwrap();
        assert!(ok);
        assert!(String::from_utf8(out).unwrap().starts_with("Wrote "));
        assert_eq!(Config::load_from(&path).unwrap(), config);
        assert!(generator.prompts.lock().unwrap().is_empty());

        let err = init_config(&Config::new(), Some(&path), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(Config::load_from(&path).unwrap(), config);

        init_config(&Config::new(), Some(&path), true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::new());
    }
}
