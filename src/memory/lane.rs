//! Heuristic lane detection for a draft.
//!
//! Only the last non-empty paragraph is inspected. Checks run in order:
//! quoted speech, then thought markers, then kinetic verbs; anything else is
//! narration.

use crate::memory::types::Lane;

const QUOTE_CHARS: [char; 3] = ['"', '\u{201C}', '\u{201D}'];

const INTERIORITY_MARKERS: &[&str] = &[
    "thought",
    "wondered",
    "realized",
    "felt",
    "knew",
    "remembered",
    "understood",
    "believed",
    "hoped",
    "feared",
    "wished",
    "could see",
    "could hear",
    "could feel",
];

const ACTION_MARKERS: &[&str] = &[
    "ran", "jumped", "grabbed", "threw", "kicked", "punched", "struck", "dashed", "sprinted",
    "lunged", "dove", "rolled", "ducked", "swung", "fired", "shot", "slammed", "crashed",
    "leaped",
];

/// Classify the last paragraph of `text` into a [`Lane`].
pub fn detect_lane(text: &str) -> Lane {
    let Some(last_para) = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .last()
    else {
        return Lane::Narration;
    };

    let quote_count = last_para.chars().filter(|c| QUOTE_CHARS.contains(c)).count();
    if quote_count >= 2 {
        return Lane::Dialogue;
    }

    let lower = last_para.to_lowercase();
    if INTERIORITY_MARKERS.iter().any(|m| lower.contains(m)) {
        return Lane::Interiority;
    }

    // Substring match: "ran" also fires inside "ranch", hence two distinct markers.
    let action_hits = ACTION_MARKERS.iter().filter(|m| lower.contains(*m)).count();
    if action_hits >= 2 {
        return Lane::Action;
    }

    Lane::Narration
}
