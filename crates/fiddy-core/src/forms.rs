//! Typed preference forms for the three modules
//!
//! Each form is a plain value. Edits go through `apply`, which consumes the
//! form and returns the updated one, so partial input accumulates without any
//! UI binding holding mutable references into it.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::module::ModuleKind;
use crate::prompt::{self, COMPANION_TEMPLATE, MEMORY_TRAIT, NUTRITION_TEMPLATE, WORKOUT_TEMPLATE};

macro_rules! choices {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Case-insensitive lookup by display label
            pub fn from_label(s: &str) -> Option<Self> {
                let s = s.trim();
                Self::ALL.iter().copied().find(|c| c.label().eq_ignore_ascii_case(s))
            }

            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|c| c.label()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_label(s).ok_or_else(|| {
                    format!("unknown value '{}', expected one of: {}", s, Self::labels().join(", "))
                })
            }
        }
    };
}

choices!(DietType {
    Vegetarian => "Vegetarian",
    NonVegetarian => "Non-Vegetarian",
    Vegan => "Vegan",
});

choices!(Allergy {
    Lactose => "Lactose intolerant",
    Gluten => "Gluten-free",
    Nuts => "Nut allergies",
    Shellfish => "Shellfish allergy",
    Soy => "Soy allergy",
});

choices!(FitnessGoal {
    MuscleGain => "Muscle gain",
    WeightLoss => "Weight loss",
    SkinGlow => "Skin glow",
    GeneralHealth => "General health",
    EnergyBoost => "Energy boost",
});

choices!(
    /// Primary training style asked for by the nutrition form
    TrainingStyle {
        Strength => "Strength",
        Yoga => "Yoga",
        Cardio => "Cardio",
        Mixed => "Mixed",
    }
);

choices!(WorkoutType {
    Strength => "Strength",
    Yoga => "Yoga",
    Cardio => "Cardio",
    Functional => "Functional",
    Stretching => "Stretching",
});

choices!(SessionLength {
    Short => "15-30 minutes",
    Medium => "30-45 minutes",
    Long => "45-60 minutes",
    Extended => "60+ minutes",
});

choices!(Frequency {
    TwoToThree => "2-3 times/week",
    FourToFive => "4-5 times/week",
    SixToSeven => "6-7 times/week",
    Daily => "Daily",
});

choices!(Equipment {
    Dumbbells => "Dumbbells",
    ResistanceBands => "Resistance bands",
    YogaMat => "Yoga mat",
    PullUpBar => "Pull-up bar",
    Kettlebells => "Kettlebells",
    NoEquipment => "No equipment",
});

choices!(Mood {
    Happy => "Happy",
    Sad => "Sad",
    Anxious => "Anxious",
    Tired => "Tired",
    Angry => "Angry",
    Grateful => "Grateful",
});

impl Mood {
    /// Lowercase value interpolated into prompts ("anxious")
    pub fn value(&self) -> String {
        self.label().to_lowercase()
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😔",
            Mood::Anxious => "😰",
            Mood::Tired => "😴",
            Mood::Angry => "😡",
            Mood::Grateful => "🤗",
        }
    }
}

/// Add `item` if absent, remove it if present. Order of the rest is kept.
fn toggled<T: PartialEq>(mut items: Vec<T>, item: T) -> Vec<T> {
    if let Some(pos) = items.iter().position(|i| *i == item) {
        items.remove(pos);
    } else {
        items.push(item);
    }
    items
}

fn join_or<T: fmt::Display>(items: &[T], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
    }
}

/// Read-only description of one form field, for generic rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub label: &'static str,
    pub required: bool,
    pub options: Vec<&'static str>,
    pub multi: bool,
    /// Indices into `options` that are currently chosen
    pub chosen: Vec<usize>,
}

fn single_field<T: PartialEq + Copy>(
    label: &'static str,
    all: &[T],
    labels: Vec<&'static str>,
    value: Option<T>,
) -> FieldView {
    FieldView {
        label,
        required: true,
        options: labels,
        multi: false,
        chosen: value
            .and_then(|v| all.iter().position(|o| *o == v))
            .into_iter()
            .collect(),
    }
}

fn multi_field<T: PartialEq + Copy>(
    label: &'static str,
    all: &[T],
    labels: Vec<&'static str>,
    values: &[T],
) -> FieldView {
    FieldView {
        label,
        required: false,
        options: labels,
        multi: true,
        chosen: all
            .iter()
            .enumerate()
            .filter(|(_, o)| values.contains(o))
            .map(|(i, _)| i)
            .collect(),
    }
}

/// Shared shape of the plan-producing forms
pub trait PreferenceForm: Clone + Default {
    type Edit;

    const MODULE: ModuleKind;
    const TEMPLATE: &'static str;

    /// Display labels of required fields that are still empty
    fn missing_fields(&self) -> Vec<&'static str>;

    /// Values keyed by template placeholder
    fn prompt_values(&self) -> Vec<(&'static str, String)>;

    fn apply(self, edit: Self::Edit) -> Self;

    fn fields(&self) -> Vec<FieldView>;

    /// Map "choose option `option` of field `field`" onto a typed edit
    fn edit_for(field: usize, option: usize) -> Option<Self::Edit>;

    fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    fn build_prompt(&self) -> String {
        prompt::render(Self::TEMPLATE, &self.prompt_values())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NutritionForm {
    pub diet_type: Option<DietType>,
    pub allergies: Vec<Allergy>,
    pub fitness_goal: Option<FitnessGoal>,
    pub workout_type: Option<TrainingStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionEdit {
    DietType(DietType),
    ToggleAllergy(Allergy),
    FitnessGoal(FitnessGoal),
    WorkoutType(TrainingStyle),
}

impl PreferenceForm for NutritionForm {
    type Edit = NutritionEdit;

    const MODULE: ModuleKind = ModuleKind::Nutrition;
    const TEMPLATE: &'static str = NUTRITION_TEMPLATE;

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.diet_type.is_none() {
            missing.push("Diet Type");
        }
        if self.fitness_goal.is_none() {
            missing.push("Fitness Goal");
        }
        if self.workout_type.is_none() {
            missing.push("Primary Workout Type");
        }
        missing
    }

    fn prompt_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("diet_type", self.diet_type.map(|v| v.to_string()).unwrap_or_default()),
            ("allergies", join_or(&self.allergies, "None")),
            ("fitness_goal", self.fitness_goal.map(|v| v.to_string()).unwrap_or_default()),
            ("workout_type", self.workout_type.map(|v| v.to_string()).unwrap_or_default()),
        ]
    }

    fn apply(self, edit: NutritionEdit) -> Self {
        match edit {
            NutritionEdit::DietType(v) => Self { diet_type: Some(v), ..self },
            NutritionEdit::ToggleAllergy(a) => Self {
                allergies: toggled(self.allergies, a),
                ..self
            },
            NutritionEdit::FitnessGoal(v) => Self { fitness_goal: Some(v), ..self },
            NutritionEdit::WorkoutType(v) => Self { workout_type: Some(v), ..self },
        }
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            single_field("Diet Type", DietType::ALL, DietType::labels(), self.diet_type),
            multi_field(
                "Allergies & Restrictions",
                Allergy::ALL,
                Allergy::labels(),
                &self.allergies,
            ),
            single_field("Fitness Goal", FitnessGoal::ALL, FitnessGoal::labels(), self.fitness_goal),
            single_field(
                "Primary Workout Type",
                TrainingStyle::ALL,
                TrainingStyle::labels(),
                self.workout_type,
            ),
        ]
    }

    fn edit_for(field: usize, option: usize) -> Option<NutritionEdit> {
        match field {
            0 => DietType::ALL.get(option).copied().map(NutritionEdit::DietType),
            1 => Allergy::ALL.get(option).copied().map(NutritionEdit::ToggleAllergy),
            2 => FitnessGoal::ALL.get(option).copied().map(NutritionEdit::FitnessGoal),
            3 => TrainingStyle::ALL.get(option).copied().map(NutritionEdit::WorkoutType),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutForm {
    pub workout_type: Option<WorkoutType>,
    pub duration: Option<SessionLength>,
    pub frequency: Option<Frequency>,
    pub equipment: Vec<Equipment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutEdit {
    WorkoutType(WorkoutType),
    Duration(SessionLength),
    Frequency(Frequency),
    ToggleEquipment(Equipment),
}

impl PreferenceForm for WorkoutForm {
    type Edit = WorkoutEdit;

    const MODULE: ModuleKind = ModuleKind::Workout;
    const TEMPLATE: &'static str = WORKOUT_TEMPLATE;

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.workout_type.is_none() {
            missing.push("Workout Type");
        }
        if self.duration.is_none() {
            missing.push("Duration per Session");
        }
        if self.frequency.is_none() {
            missing.push("Frequency");
        }
        missing
    }

    fn prompt_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("workout_type", self.workout_type.map(|v| v.to_string()).unwrap_or_default()),
            ("duration", self.duration.map(|v| v.to_string()).unwrap_or_default()),
            ("frequency", self.frequency.map(|v| v.to_string()).unwrap_or_default()),
            ("equipment", join_or(&self.equipment, "Bodyweight only")),
        ]
    }

    fn apply(self, edit: WorkoutEdit) -> Self {
        match edit {
            WorkoutEdit::WorkoutType(v) => Self { workout_type: Some(v), ..self },
            WorkoutEdit::Duration(v) => Self { duration: Some(v), ..self },
            WorkoutEdit::Frequency(v) => Self { frequency: Some(v), ..self },
            WorkoutEdit::ToggleEquipment(e) => Self {
                equipment: toggled(self.equipment, e),
                ..self
            },
        }
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            single_field("Workout Type", WorkoutType::ALL, WorkoutType::labels(), self.workout_type),
            single_field(
                "Duration per Session",
                SessionLength::ALL,
                SessionLength::labels(),
                self.duration,
            ),
            single_field("Frequency", Frequency::ALL, Frequency::labels(), self.frequency),
            multi_field(
                "Available Equipment",
                Equipment::ALL,
                Equipment::labels(),
                &self.equipment,
            ),
        ]
    }

    fn edit_for(field: usize, option: usize) -> Option<WorkoutEdit> {
        match field {
            0 => WorkoutType::ALL.get(option).copied().map(WorkoutEdit::WorkoutType),
            1 => SessionLength::ALL.get(option).copied().map(WorkoutEdit::Duration),
            2 => Frequency::ALL.get(option).copied().map(WorkoutEdit::Frequency),
            3 => Equipment::ALL.get(option).copied().map(WorkoutEdit::ToggleEquipment),
            _ => None,
        }
    }
}

/// Companion input: a freeform message and/or a mood
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanionForm {
    pub message: String,
    pub mood: Option<Mood>,
}

impl CompanionForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.message.trim().is_empty() && self.mood.is_none() {
            Err(ValidationError::MissingFields(vec!["Message or mood"]))
        } else {
            Ok(())
        }
    }

    /// Text recorded as the user's turn: the trimmed message, or a mood
    /// statement when only the mood is set
    pub fn user_turn(&self) -> Option<String> {
        let message = self.message.trim();
        if !message.is_empty() {
            Some(message.to_string())
        } else {
            self.mood.map(|m| format!("I'm feeling {}", m.value()))
        }
    }

    /// Prompt for the current turn; `history` is the "Conversation so far"
    /// block, empty for a stateless call. The persona only claims memory
    /// when there is history to remember.
    pub fn build_prompt(&self, history: &str) -> String {
        let mood = self
            .mood
            .map(|m| m.value())
            .unwrap_or_else(|| "not specified".to_string());
        let memory = if history.is_empty() { "" } else { MEMORY_TRAIT };
        prompt::render(
            COMPANION_TEMPLATE,
            &[
                ("memory", memory.to_string()),
                ("history", history.to_string()),
                ("mood", mood),
                ("message", self.user_turn().unwrap_or_default()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vegan_form() -> NutritionForm {
        NutritionForm::default()
            .apply(NutritionEdit::DietType(DietType::Vegan))
            .apply(NutritionEdit::FitnessGoal(FitnessGoal::WeightLoss))
            .apply(NutritionEdit::WorkoutType(TrainingStyle::Cardio))
    }

    #[test]
    fn test_nutrition_prompt_scenario() {
        let prompt = vegan_form().build_prompt();
        assert!(prompt.contains("Diet Type: Vegan"));
        assert!(prompt.contains("Allergies/Restrictions: None"));
        assert!(prompt.contains("Fitness Goal: Weight loss"));
        assert!(prompt.contains("Workout Type: Cardio"));
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let form = vegan_form()
            .apply(NutritionEdit::ToggleAllergy(Allergy::Soy))
            .apply(NutritionEdit::ToggleAllergy(Allergy::Gluten));
        assert_eq!(form.build_prompt(), form.clone().build_prompt());

        let empty = WorkoutForm::default();
        assert_eq!(empty.build_prompt(), WorkoutForm::default().build_prompt());
        assert!(empty.build_prompt().contains("Available Equipment: Bodyweight only"));
    }

    #[test]
    fn test_multi_select_joins_in_check_order() {
        let form = vegan_form()
            .apply(NutritionEdit::ToggleAllergy(Allergy::Soy))
            .apply(NutritionEdit::ToggleAllergy(Allergy::Lactose));
        assert!(form
            .build_prompt()
            .contains("Allergies/Restrictions: Soy allergy, Lactose intolerant"));

        let workout = WorkoutForm::default()
            .apply(WorkoutEdit::ToggleEquipment(Equipment::Kettlebells))
            .apply(WorkoutEdit::ToggleEquipment(Equipment::YogaMat));
        assert!(workout
            .build_prompt()
            .contains("Available Equipment: Kettlebells, Yoga mat"));
    }

    #[test]
    fn test_toggle_twice_removes_option() {
        let form = vegan_form()
            .apply(NutritionEdit::ToggleAllergy(Allergy::Nuts))
            .apply(NutritionEdit::ToggleAllergy(Allergy::Nuts));
        assert!(form.allergies.is_empty());
        assert!(form.build_prompt().contains("Allergies/Restrictions: None"));
    }

    #[test]
    fn test_nutrition_validation_lists_missing_fields() {
        let form = NutritionForm::default().apply(NutritionEdit::DietType(DietType::Vegetarian));
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingFields(vec!["Fitness Goal", "Primary Workout Type"]))
        );
        assert!(vegan_form().validate().is_ok());
    }

    #[test]
    fn test_allergies_are_optional() {
        assert!(vegan_form().allergies.is_empty());
        assert!(vegan_form().validate().is_ok());
    }

    #[test]
    fn test_workout_validation() {
        let form = WorkoutForm::default()
            .apply(WorkoutEdit::WorkoutType(WorkoutType::Yoga))
            .apply(WorkoutEdit::Duration(SessionLength::Short));
        assert_eq!(form.missing_fields(), vec!["Frequency"]);

        let form = form.apply(WorkoutEdit::Frequency(Frequency::Daily));
        assert!(form.validate().is_ok());
        let prompt = form.build_prompt();
        assert!(prompt.contains("Workout Type: Yoga"));
        assert!(prompt.contains("Duration per session: 15-30 minutes"));
        assert!(prompt.contains("Frequency: Daily"));
    }

    #[test]
    fn test_companion_validation() {
        let mut form = CompanionForm::default();
        assert!(form.validate().is_err());

        form.message = "   ".to_string();
        assert!(form.validate().is_err());

        form.mood = Some(Mood::Tired);
        assert!(form.validate().is_ok());

        let form = CompanionForm {
            message: "long day".to_string(),
            mood: None,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_companion_mood_only_turn() {
        let form = CompanionForm {
            message: String::new(),
            mood: Some(Mood::Anxious),
        };
        assert_eq!(form.user_turn().as_deref(), Some("I'm feeling anxious"));

        let prompt = form.build_prompt("");
        assert!(prompt.contains("User's current mood: anxious"));
        assert!(prompt.contains("User's message: I'm feeling anxious"));
    }

    #[test]
    fn test_companion_message_wins_over_mood() {
        let form = CompanionForm {
            message: " rough morning ".to_string(),
            mood: Some(Mood::Sad),
        };
        assert_eq!(form.user_turn().as_deref(), Some("rough morning"));
        assert!(form.build_prompt("").contains("User's current mood: sad"));
    }

    #[test]
    fn test_companion_without_mood() {
        let form = CompanionForm {
            message: "hi".to_string(),
            mood: None,
        };
        assert!(form.build_prompt("").contains("User's current mood: not specified"));
    }

    #[test]
    fn test_companion_memory_trait_follows_history() {
        let form = CompanionForm {
            message: "hi".to_string(),
            mood: None,
        };

        let stateless = form.build_prompt("");
        assert!(!stateless.contains("Remembers previous conversations"));
        assert!(stateless.contains("- Shows genuine care and concern\n\nUser's current mood"));

        let remembered = form.build_prompt("Conversation so far:\nUser: hey\n\n");
        assert!(remembered.contains(
            "- Shows genuine care and concern\n- Remembers previous conversations\n\nConversation so far:"
        ));
    }

    #[test]
    fn test_fields_view_reflects_choices() {
        let form = vegan_form().apply(NutritionEdit::ToggleAllergy(Allergy::Shellfish));
        let fields = form.fields();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].chosen, vec![2]);
        assert!(fields[1].multi);
        assert_eq!(fields[1].chosen, vec![3]);
        assert!(!fields[1].required);
    }

    #[test]
    fn test_edit_for_maps_indices() {
        assert_eq!(
            WorkoutForm::edit_for(3, 0),
            Some(WorkoutEdit::ToggleEquipment(Equipment::Dumbbells))
        );
        assert_eq!(WorkoutForm::edit_for(1, 9), None);
        assert_eq!(NutritionForm::edit_for(7, 0), None);
    }

    #[test]
    fn test_from_str_accepts_labels_case_insensitively() {
        assert_eq!("non-vegetarian".parse::<DietType>(), Ok(DietType::NonVegetarian));
        assert_eq!("60+ MINUTES".parse::<SessionLength>(), Ok(SessionLength::Extended));
        assert!("keto".parse::<DietType>().is_err());
    }
}
