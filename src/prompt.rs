//! Prompt construction for the relay.
//!
//! Two templates: rewrite a selection according to an instruction, or
//! generate from an instruction alone.

/// Instruction used when text is supplied without one.
pub const DEFAULT_INSTRUCTION: &str =
    "improve clarity and flow while keeping the original meaning";

/// Build the instruction sent to the model.
///
/// Empty strings count as absent.
pub fn build_prompt(text: Option<&str>, prompt: Option<&str>) -> String {
    let text = text.filter(|t| !t.is_empty());
    let prompt = prompt.filter(|p| !p.is_empty());

    match text {
        Some(text) => format!(
            "Replace the selected text: '{}' based on: '{}'.",
            text,
            prompt.unwrap_or(DEFAULT_INSTRUCTION)
        ),
        None => format!("Generate text based on: '{}'.", prompt.unwrap_or_default()),
    }
}
