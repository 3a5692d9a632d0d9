//! CLI `draft` command — continue or revise a draft using stored exemplars.
//!
//! The draft's lane is detected from its last paragraph, the tail of the draft
//! becomes the retrieval query, and the closest style and voice exemplars are
//! folded into the prompt sent to the configured completion provider.

use anyhow::{Context, Result};
use clap::ValueEnum;

use olivetti::config::OlivettiConfig;
use olivetti::memory::detect_lane;
use olivetti::memory::types::{BankKind, Exemplar, Lane};
use olivetti::provider;

/// What to ask the model to do with the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DraftAction {
    Write,
    Expand,
    Describe,
    Rewrite,
    Rephrase,
}

impl DraftAction {
    fn instruction(&self) -> &'static str {
        match self {
            Self::Write => "Continue this draft with 1-3 new paragraphs:",
            Self::Expand => "Add depth and detail to this text without changing its meaning:",
            Self::Describe => "Add vivid sensory description while preserving pace:",
            Self::Rewrite => "Improve the quality while preserving meaning:",
            Self::Rephrase => "Replace the final sentence with a stronger alternative. Here's the text:",
        }
    }

    /// How much of the draft's tail goes into the prompt.
    fn context_chars(&self) -> usize {
        match self {
            Self::Write => 1000,
            _ => 500,
        }
    }
}

pub struct DraftRequest {
    pub draft: String,
    pub style: Option<String>,
    pub voice: Option<String>,
    pub action: DraftAction,
    pub lane: Option<Lane>,
}

/// Exemplars retrieved for one identity.
struct ExemplarSet<'a> {
    identity: &'a str,
    exemplars: Vec<Exemplar>,
}

pub async fn draft(config: &OlivettiConfig, request: DraftRequest, dry_run: bool) -> Result<()> {
    anyhow::ensure!(!request.draft.trim().is_empty(), "draft is empty");

    let engine = super::open_engine(config)?;
    let lane = request.lane.unwrap_or_else(|| detect_lane(&request.draft));
    let query = tail_chars(&request.draft, config.retrieval.query_tail_chars);
    let k = config.retrieval.default_k;

    let style = request.style.as_deref().map(|identity| ExemplarSet {
        identity,
        exemplars: engine.retrieve_exemplars(lane, identity, BankKind::Style, query, k),
    });
    let voice = request.voice.as_deref().map(|identity| ExemplarSet {
        identity,
        exemplars: engine.retrieve_exemplars(lane, identity, BankKind::Voice, query, k),
    });

    tracing::info!(
        lane = %lane,
        style_exemplars = style.as_ref().map_or(0, |s| s.exemplars.len()),
        voice_exemplars = voice.as_ref().map_or(0, |v| v.exemplars.len()),
        "assembling draft prompt"
    );

    let prompt = build_prompt(
        &request.draft,
        request.action,
        lane,
        style.as_ref(),
        voice.as_ref(),
        config.retrieval.excerpt_chars,
    );

    if dry_run {
        println!("{prompt}");
        return Ok(());
    }

    let provider = provider::create_provider(&config.provider)
        .context("failed to create completion provider")?;
    tracing::info!(provider = provider.name(), model = provider.model(), "requesting completion");

    let text = provider
        .complete(&prompt)
        .await
        .with_context(|| format!("{} completion failed", provider.name()))?;
    println!("{}", text.trim());
    Ok(())
}

fn lane_guidance(lane: Lane) -> &'static str {
    match lane {
        Lane::Narration => "Continue the narrative flow naturally.",
        Lane::Dialogue => "Write authentic dialogue with natural speech patterns.",
        Lane::Interiority => "Explore character thoughts and emotions deeply.",
        Lane::Action => "Write kinetic, physical action with clear movement.",
    }
}

fn build_prompt(
    draft: &str,
    action: DraftAction,
    lane: Lane,
    style: Option<&ExemplarSet<'_>>,
    voice: Option<&ExemplarSet<'_>>,
    excerpt_chars: usize,
) -> String {
    let mut parts = vec!["You are the Olivetti Creative Editing Partner, an expert writing assistant.".to_string()];

    let sections = [("STYLE EXAMPLES", style), ("VOICE SAMPLES", voice)];
    for (heading, set) in sections {
        let Some(set) = set.filter(|s| !s.exemplars.is_empty()) else {
            continue;
        };
        parts.push(format!("\n{heading} ({}):", set.identity));
        for (i, exemplar) in set.exemplars.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, head_chars(&exemplar.text, excerpt_chars)));
        }
    }

    parts.push(format!("\nCONTEXT ({}): {}", lane.label(), lane_guidance(lane)));
    parts.push("\n=== Task ===".to_string());
    parts.push(format!(
        "{}\n\n{}",
        action.instruction(),
        tail_chars(draft, action.context_chars())
    ));

    parts.join("\n")
}

/// The last `n` characters of `text`.
fn tail_chars(text: &str, n: usize) -> &str {
    let count = text.chars().count();
    if count <= n {
        return text;
    }
    match text.char_indices().nth(count - n) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// The first `n` characters of `text`.
fn head_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exemplar(text: &str) -> Exemplar {
        Exemplar {
            text: text.into(),
            description: None,
            score: 0.5,
        }
    }

    #[test]
    fn tail_and_head_respect_char_boundaries() {
        assert_eq!(tail_chars("señor", 3), "ñor");
        assert_eq!(tail_chars("abc", 10), "abc");
        assert_eq!(head_chars("señor", 3), "señ");
        assert_eq!(head_chars("", 3), "");
    }

    #[test]
    fn prompt_includes_exemplars_clipped_to_excerpt_length() {
        let style = ExemplarSet {
            identity: "Noir",
            exemplars: vec![exemplar("The rain fell like it had a grudge.")],
        };
        let prompt = build_prompt(
            "She lit a cigarette.",
            DraftAction::Write,
            Lane::Narration,
            Some(&style),
            None,
            8,
        );
        assert!(prompt.contains("STYLE EXAMPLES (Noir):"));
        assert!(prompt.contains("1. The rain"));
        assert!(!prompt.contains("grudge"));
        assert!(!prompt.contains("VOICE SAMPLES"));
        assert!(prompt.ends_with("Continue this draft with 1-3 new paragraphs:\n\nShe lit a cigarette."));
    }

    #[test]
    fn empty_exemplar_sets_are_omitted() {
        let voice = ExemplarSet {
            identity: "Me",
            exemplars: Vec::new(),
        };
        let prompt = build_prompt("Run.", DraftAction::Rewrite, Lane::Action, None, Some(&voice), 200);
        assert!(!prompt.contains("VOICE SAMPLES"));
        assert!(prompt.contains("CONTEXT (Action): Write kinetic"));
    }

    #[test]
    fn non_write_actions_use_a_shorter_tail() {
        let draft = "x".repeat(800);
        let prompt = build_prompt(&draft, DraftAction::Expand, Lane::Narration, None, None, 200);
        let task = prompt.rsplit("\n\n").next().unwrap();
        assert_eq!(task.len(), 500);
    }
}
