//! Terminal rendering of conversations
//!
//! Every function here is pure: the same transcript and sources always produce the same text.

use console::style;
use finrag_core::config::DisplaySettings;
use finrag_core::models::{RetrievedFragment, Role, Transcript, Turn, DEFAULT_PREVIEW_CHARS};
use std::fmt::Write;

pub const TITLE: &str = "Financial Intelligence Unit";
pub const SOURCES_HEADING: &str = "Verified Sources";

/// Header and the static settings panel
pub fn render_header(settings: &DisplaySettings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(TITLE).bold().underlined());
    let _ = writeln!(out, "{}: {}", style("Data Source").bold(), settings.document_label);
    let _ = writeln!(out, "{}: {}", style("Fiscal Year").bold(), settings.fiscal_years.join(", "));
    let _ = writeln!(
        out,
        "{}: {}",
        style("Strict Citation Mode").bold(),
        if settings.strict_citation { "on" } else { "off" }
    );
    let _ = writeln!(out, "{}: {}", style("Status").bold(), style("System Online").green());
    let _ = writeln!(out, "{}", style("Type 'exit' or 'quit' to leave.").dim());
    out
}

pub fn render_turn(turn: &Turn) -> String {
    let speaker = match turn.role() {
        Role::User => style("You").cyan().bold(),
        Role::Assistant => style("Analyst").green().bold(),
    };
    format!("{}: {}\n", speaker, turn.content())
}

/// The sources panel shown under an answer; empty when nothing was retrieved
pub fn render_sources(fragments: &[RetrievedFragment]) -> String {
    if fragments.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", style(SOURCES_HEADING).yellow().bold());
    for fragment in fragments {
        let ellipsis = if fragment.is_truncated(DEFAULT_PREVIEW_CHARS) { "..." } else { "" };
        let _ = writeln!(
            out,
            "  {} {}",
            style(format!("Document Fragment {}", fragment.rank)).bold(),
            style(format!("(score {:.3})", fragment.score)).dim()
        );
        let _ = writeln!(out, "    {}{}", fragment.preview(DEFAULT_PREVIEW_CHARS), ellipsis);
    }
    out
}

/// A run of turns, with the latest sources under a closing answer
///
/// Pass the whole transcript to replay a conversation or its tail to show the newest answer.
pub fn render_transcript(turns: &[Turn], last_sources: &[RetrievedFragment]) -> String {
    let mut out = String::new();
    for turn in turns {
        out.push_str(&render_turn(turn));
    }
    if matches!(turns.last().map(Turn::role), Some(Role::Assistant)) {
        out.push_str(&render_sources(last_sources));
    }
    out
}

/// The newest answer of a conversation and the sources behind it
pub fn render_latest_answer(transcript: &Transcript, last_sources: &[RetrievedFragment]) -> String {
    let turns = transcript.all();
    match turns.last() {
        Some(turn) if turn.role() == Role::Assistant => {
            render_transcript(&turns[turns.len() - 1..], last_sources)
        }
        _ => String::new(),
    }
}
