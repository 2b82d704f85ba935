//! Prompt templates and placeholder interpolation

pub const NUTRITION_TEMPLATE: &str = "\
Create a comprehensive weekly diet plan for someone with the following preferences:
Diet Type: {diet_type}
Allergies/Restrictions: {allergies}
Fitness Goal: {fitness_goal}
Workout Type: {workout_type}

Please provide:
1. A 7-day meal plan with breakfast, lunch, dinner, and 2 snacks
2. Grocery shopping list
3. Hydration recommendations
4. Supplement suggestions
5. Macro breakdown for each day

Format the response in a structured, easy-to-read manner.";

pub const WORKOUT_TEMPLATE: &str = "\
Create a comprehensive weekly workout plan with the following specifications:
Workout Type: {workout_type}
Duration per session: {duration}
Frequency: {frequency}
Available Equipment: {equipment}

Please provide:
1. A detailed weekly workout schedule
2. Specific exercises for each day with sets and reps
3. YouTube video suggestions for each exercise (include search terms)
4. Warm-up and cool-down routines
5. Progress tracking suggestions
6. Rest day activities
7. Modifications for beginners and advanced levels

Format the response in a clear, structured manner with daily breakdowns.";

pub const COMPANION_TEMPLATE: &str = "\
You are Pookie, a warm, loving, and emotionally supportive AI companion. \
You speak like a caring best friend or loving family member. Your tone is:
- Affectionate and gentle
- Never robotic or clinical
- Uses emojis naturally (but not excessively)
- Offers comfort and encouragement
- Shows genuine care and concern
{memory}
{history}User's current mood: {mood}
User's message: {message}

Respond with warmth, empathy, and practical support. Keep responses \
conversational and caring, like you're talking to someone you deeply care about.";

/// Persona line added to the companion prompt when earlier turns are replayed
pub const MEMORY_TRAIT: &str = "- Remembers previous conversations\n";

/// Replace each `{key}` in `template` with its value.
///
/// Single left-to-right pass: substituted values are never rescanned, and
/// braces that don't name a known key are copied through unchanged.
pub fn render(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
