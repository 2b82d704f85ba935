//! Plan request workflow: validate a form, build its prompt, make one
//! remote call, publish the text.
//!
//! Per module instance the state is `Idle -> Submitting -> Idle`. Only one
//! submission may be outstanding at a time; a second `begin` while
//! submitting is refused rather than queued. There is no cancel.

use std::fmt;

use tracing::{debug, info, warn};

use crate::ai::TextGenerator;
use crate::error::{RemoteError, SubmitError, ValidationError};
use crate::forms::PreferenceForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
}

/// Text returned by the service, kept exactly as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPlan(String);

impl GeneratedPlan {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneratedPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanRequestWorkflow<F: PreferenceForm> {
    form: F,
    plan: Option<GeneratedPlan>,
    phase: Phase,
}

impl<F: PreferenceForm> PlanRequestWorkflow<F> {
    pub fn new() -> Self {
        Self::with_form(F::default())
    }

    pub fn with_form(form: F) -> Self {
        Self {
            form,
            plan: None,
            phase: Phase::Idle,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn edit(&mut self, edit: F::Edit) {
        let form = std::mem::take(&mut self.form);
        self.form = form.apply(edit);
    }

    pub fn plan(&self) -> Option<&GeneratedPlan> {
        self.plan.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.form.validate()
    }

    /// Enter `Submitting` and hand back the prompt to send
    pub fn begin(&mut self) -> Result<String, SubmitError> {
        if self.is_in_flight() {
            debug!(module = F::MODULE.as_str(), "begin: already in flight, ignoring");
            return Err(SubmitError::InFlight);
        }

        if let Err(e) = self.form.validate() {
            debug!(module = F::MODULE.as_str(), error = %e, "begin: validation failed");
            return Err(e.into());
        }

        let prompt = self.form.build_prompt();
        self.phase = Phase::Submitting;
        info!(module = F::MODULE.as_str(), prompt_len = prompt.len(), "begin: submitting");
        Ok(prompt)
    }

    /// Publish the outcome of the call started by `begin` and go back to
    /// `Idle`. A success replaces any previous plan; a failure leaves the
    /// previous plan as it was.
    pub fn finish(&mut self, result: Result<String, RemoteError>) -> Result<&GeneratedPlan, RemoteError> {
        if !self.is_in_flight() {
            warn!(module = F::MODULE.as_str(), "finish: called while idle");
        }
        self.phase = Phase::Idle;

        match result {
            Ok(text) => {
                info!(module = F::MODULE.as_str(), plan_len = text.len(), "finish: plan received");
                Ok(self.plan.insert(GeneratedPlan(text)))
            }
            Err(e) => {
                warn!(module = F::MODULE.as_str(), error = %e, "finish: request failed");
                Err(e)
            }
        }
    }

    pub async fn submit(&mut self, generator: &dyn TextGenerator) -> Result<&GeneratedPlan, SubmitError> {
        let prompt = self.begin()?;
        let result = generator.generate(&prompt).await;
        Ok(self.finish(result)?)
    }

    /// Back to a fresh form with no plan, as when leaving the module
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockGenerator;
    use crate::forms::{
        DietType, FitnessGoal, NutritionEdit, NutritionForm, TrainingStyle, WorkoutForm,
    };

    fn ready_nutrition() -> PlanRequestWorkflow<NutritionForm> {
        let mut wf = PlanRequestWorkflow::<NutritionForm>::new();
        wf.edit(NutritionEdit::DietType(DietType::Vegan));
        wf.edit(NutritionEdit::FitnessGoal(FitnessGoal::WeightLoss));
        wf.edit(NutritionEdit::WorkoutType(TrainingStyle::Cardio));
        wf
    }

    #[tokio::test]
    async fn test_submit_publishes_text_unmodified() {
        let text = "## Day 1\n* Oats *with* berries\n\n";
        let generator = MockGenerator::new(vec![Ok(text.to_string())]);
        let mut wf = ready_nutrition();

        let plan = wf.submit(&generator).await.unwrap();
        assert_eq!(plan.as_str(), text);
        assert_eq!(wf.phase(), Phase::Idle);
        assert_eq!(generator.call_count(), 1);

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Diet Type: Vegan"));
    }

    #[tokio::test]
    async fn test_validation_failure_never_calls_service() {
        let generator = MockGenerator::new(vec![Ok("unused".to_string())]);
        let mut wf = PlanRequestWorkflow::<WorkoutForm>::new();

        let err = wf.submit(&generator).await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(ValidationError::MissingFields(_))));
        assert_eq!(generator.call_count(), 0);
        assert_eq!(wf.phase(), Phase::Idle);
        assert!(wf.plan().is_none());
    }

    #[test]
    fn test_second_begin_while_in_flight_is_rejected() {
        let mut wf = ready_nutrition();
        assert!(wf.begin().is_ok());
        assert!(wf.is_in_flight());
        assert_eq!(wf.begin(), Err(SubmitError::InFlight));

        wf.finish(Ok("done".to_string())).unwrap();
        assert!(!wf.is_in_flight());
        assert!(wf.begin().is_ok());
    }

    #[tokio::test]
    async fn test_remote_failure_returns_to_idle_without_plan() {
        let generator = MockGenerator::new(vec![Err(RemoteError::UnexpectedResponseShape(
            "missing candidates".to_string(),
        ))]);
        let mut wf = ready_nutrition();

        let err = wf.submit(&generator).await.unwrap_err();
        assert!(matches!(err, SubmitError::Remote(RemoteError::UnexpectedResponseShape(_))));
        assert_eq!(wf.phase(), Phase::Idle);
        assert!(wf.plan().is_none());
    }

    #[tokio::test]
    async fn test_success_replaces_prior_plan_and_failure_keeps_it() {
        let generator = MockGenerator::new(vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
            Err(RemoteError::NetworkUnavailable("down".to_string())),
        ]);
        let mut wf = ready_nutrition();

        wf.submit(&generator).await.unwrap();
        wf.submit(&generator).await.unwrap();
        assert_eq!(wf.plan().map(|p| p.as_str()), Some("second"));

        assert!(wf.submit(&generator).await.is_err());
        assert_eq!(wf.plan().map(|p| p.as_str()), Some("second"));
    }

    #[test]
    fn test_reset_clears_form_and_plan() {
        let mut wf = ready_nutrition();
        wf.begin().unwrap();
        wf.finish(Ok("plan".to_string())).unwrap();

        wf.reset();
        assert!(wf.plan().is_none());
        assert_eq!(wf.form(), &NutritionForm::default());
        assert_eq!(wf.phase(), Phase::Idle);
    }
}
