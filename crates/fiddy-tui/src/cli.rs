use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fiddy_core::forms::{
    Allergy, DietType, Equipment, FitnessGoal, Frequency, Mood, SessionLength, TrainingStyle,
    WorkoutType,
};
use fiddy_core::ModuleKind;

#[derive(Parser, Debug)]
#[command(name = "fiddy")]
#[command(version)]
#[command(about = "Wellness assistant: diet plans, workout routines, and a caring companion")]
#[command(after_help = "Run without a command to open the interactive TUI.\n\
Set GEMINI_API_KEY (or api_key in config.json) before generating anything.")]
pub struct Cli {
    /// Path to config file (default: <config dir>/fiddy/config.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level filter, e.g. "debug" or "fiddy_core=trace"
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Gemini model to use instead of the configured one
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Start the TUI on a module instead of the landing list (diet, workout, chat)
    #[arg(long, value_name = "MODULE")]
    pub open: Option<ModuleKind>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a weekly diet plan
    Diet {
        /// Vegetarian, Non-Vegetarian, or Vegan
        #[arg(long)]
        diet_type: Option<DietType>,

        /// e.g. "Muscle gain", "Weight loss"
        #[arg(long)]
        fitness_goal: Option<FitnessGoal>,

        /// Strength, Yoga, Cardio, or Mixed
        #[arg(long)]
        workout_type: Option<TrainingStyle>,

        /// Allergy or restriction (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<Allergy>,
    },

    /// Generate a weekly workout plan
    Workout {
        /// Strength, Yoga, Cardio, Functional, or Stretching
        #[arg(long)]
        workout_type: Option<WorkoutType>,

        /// e.g. "30-45 minutes"
        #[arg(long)]
        duration: Option<SessionLength>,

        /// e.g. "4-5 times/week" or "Daily"
        #[arg(long)]
        frequency: Option<Frequency>,

        /// Available equipment (repeatable)
        #[arg(long)]
        equipment: Vec<Equipment>,
    },

    /// Send one message to Pookie
    Chat {
        /// How you're feeling right now
        #[arg(long)]
        mood: Option<Mood>,

        /// What's on your mind
        message: Option<String>,
    },

    /// Write the current settings to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
