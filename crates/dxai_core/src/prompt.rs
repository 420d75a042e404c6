//! Chat prompt format shared by generation and explanation.
//!
//! The fine-tuned model was trained on single-turn conversations of the form
//!
//! ```text
//! USER: <image>
//! {instruction}
//! ASSISTANT: {narrative}
//! ```

use crate::error::NarrativeError;

/// Marker opening the user turn.
pub const USER_MARKER: &str = "USER:";
/// Marker opening the assistant turn.
pub const ASSISTANT_MARKER: &str = "ASSISTANT:";
/// Placeholder replaced by the projected image features.
pub const IMAGE_TOKEN: &str = "<image>";

fn user_turn(instruction: &str) -> String {
    format!("{USER_MARKER} {IMAGE_TOKEN}\n{instruction}")
}

/// Prompt used to ask the model for a narrative.
pub fn build_prompt(instruction: &str) -> String {
    format!("{}\n{ASSISTANT_MARKER}", user_turn(instruction))
}

/// Prompt plus the generated narrative, used as the explanation input.
pub fn build_xai_prompt(instruction: &str, narrative: &str) -> String {
    format!("{} {narrative}", build_prompt(instruction))
}

/// Text between the first assistant marker and the next one, if any marker exists.
fn assistant_segment(text: &str) -> Option<&str> {
    let start = text.find(ASSISTANT_MARKER)? + ASSISTANT_MARKER.len();
    let rest = &text[start..];
    let end = rest.find(ASSISTANT_MARKER).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Whether `full_text` carries a non-empty assistant response.
pub fn has_assistant_response(full_text: &str) -> bool {
    assistant_segment(full_text).is_some_and(|s| !s.is_empty())
}

/// Pull the assistant's answer out of decoded model output.
///
/// When the output has an assistant marker, the answer is the text after it.
/// Otherwise the user turn is stripped and whatever remains is the answer.
pub fn extract_response(decoded: &str, instruction: &str) -> Result<String, NarrativeError> {
    if let Some(segment) = assistant_segment(decoded) {
        if segment.is_empty() {
            return Err(NarrativeError::EmptyResponse);
        }
        return Ok(segment.to_string());
    }

    let user = user_turn(instruction);
    let clean = decoded.replace(user.trim(), "");
    let clean = clean.trim();
    if clean.is_empty() {
        Err(NarrativeError::Unparsable)
    } else {
        Ok(clean.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt() {
        assert_eq!(
            build_prompt("Describe."),
            "USER: <image>\nDescribe.\nASSISTANT:"
        );
    }

    #[test]
    fn test_build_xai_prompt() {
        assert_eq!(
            build_xai_prompt("Describe.", "Crown fracture."),
            "USER: <image>\nDescribe.\nASSISTANT: Crown fracture."
        );
    }

    #[test]
    fn test_extract_after_marker() {
        let decoded = "USER: \nDescribe.\nASSISTANT:  Periapical lesion on 11. ";
        assert_eq!(
            extract_response(decoded, "Describe.").unwrap(),
            "Periapical lesion on 11."
        );
    }

    #[test]
    fn test_extract_stops_at_second_marker() {
        let decoded = "ASSISTANT: first answer ASSISTANT: second";
        assert_eq!(extract_response(decoded, "x").unwrap(), "first answer");
    }

    #[test]
    fn test_extract_empty_after_marker() {
        let decoded = "USER: <image>\nDescribe.\nASSISTANT:   ";
        assert_eq!(
            extract_response(decoded, "Describe."),
            Err(NarrativeError::EmptyResponse)
        );
    }

    #[test]
    fn test_extract_without_marker_strips_prompt() {
        let decoded = "USER: <image>\nDescribe.\n normal bone level";
        assert_eq!(
            extract_response(decoded, "Describe.").unwrap(),
            "normal bone level"
        );
    }

    #[test]
    fn test_extract_prompt_only_is_unparsable() {
        let decoded = "USER: <image>\nDescribe.";
        assert_eq!(
            extract_response(decoded, "Describe."),
            Err(NarrativeError::Unparsable)
        );
    }

    #[test]
    fn test_has_assistant_response() {
        assert!(has_assistant_response("USER: x\nASSISTANT: crown"));
        assert!(!has_assistant_response("USER: x\nASSISTANT:  "));
        assert!(!has_assistant_response("USER: x"));
        assert!(!has_assistant_response(""));
    }
}
