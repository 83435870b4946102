//! Judge prompt template.

use super::JudgePayload;

/// Build the instruction sent alongside the snapshot.
///
/// Deterministic for a given payload; the round id never reaches the model.
pub fn build_prompt(payload: &JudgePayload) -> String {
    let description = payload.description.as_deref().unwrap_or("(none provided)");
    format!(
        "You judge whether a webcam snapshot matches the emoji {emoji}.\n\
         Emoji description: {description}.\n\
         Return strict JSON array with a single element like \
         [{{\"score\": number between 0 and 1 with two decimals, \
         \"explanation\": under 20 words describing match quality}}].\n\
         Do not include backticks or prose. A higher score means closer resemblance.",
        emoji = payload.emoji,
        description = description,
    )
}
