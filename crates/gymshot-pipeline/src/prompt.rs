use std::path::Path;

/// Instruction block sent with every batch. It asks for the exercise record
/// as JSON, with every value transcribed in Polish from the screenshots.
pub const EXERCISE_PROMPT: &str = include_str!("exercise_prompt.txt");

/// The prompt to use: the contents of `override_file` when given, otherwise
/// [`EXERCISE_PROMPT`].
pub fn load_prompt(override_file: Option<&Path>) -> gymshot_core::Result<String> {
    match override_file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(EXERCISE_PROMPT.to_string()),
    }
}
