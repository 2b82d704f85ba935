use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Nutrition,
    Workout,
    Companion,
}

impl ModuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Nutrition => "diet",
            ModuleKind::Workout => "workout",
            ModuleKind::Companion => "companion",
        }
    }

    pub fn all() -> Vec<ModuleKind> {
        vec![ModuleKind::Nutrition, ModuleKind::Workout, ModuleKind::Companion]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleKind::Nutrition => "Diet Assistant",
            ModuleKind::Workout => "Workout Planner",
            ModuleKind::Companion => "Pookie - Mental Wellness",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModuleKind::Nutrition => "Personalized nutrition planning for your goals",
            ModuleKind::Workout => "Smart fitness routines tailored to you",
            ModuleKind::Companion => "Your caring AI companion for emotional support",
        }
    }

    /// Noun used in notices ("diet plan", "workout plan", "message").
    pub fn artifact(&self) -> &'static str {
        match self {
            ModuleKind::Nutrition => "diet plan",
            ModuleKind::Workout => "workout plan",
            ModuleKind::Companion => "message",
        }
    }
}

impl FromStr for ModuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "diet" | "nutrition" => Ok(ModuleKind::Nutrition),
            "workout" => Ok(ModuleKind::Workout),
            "companion" | "chat" => Ok(ModuleKind::Companion),
            _ => Err(format!("unknown module: {}", s)),
        }
    }
}
