use crate::cli::AskArgs;
use crate::errors;
use crate::output::OutputWriter;
use crate::progress::{create_spinner, THINKING_MESSAGE};
use crate::render;
use crate::setup;
use anyhow::Result;
use finrag_core::models::{Query, DEFAULT_PREVIEW_CHARS};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct AskOutput {
    question: String,
    answer: String,
    sources: Vec<SourceOutput>,
}

#[derive(Serialize)]
struct SourceOutput {
    rank: usize,
    score: f32,
    preview: String,
    truncated: bool,
}

pub async fn execute(args: AskArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    // Reject blank questions before touching credentials or the network
    let query = Query::parse(args.question).map_err(|e| errors::from_finrag(&e))?;

    let config = setup::resolve_config(config_file, args.overrides.into())?;
    let pipeline = setup::connect(&config)?;

    let spinner = (!output.is_json()).then(|| create_spinner(THINKING_MESSAGE));
    let result = pipeline.answer(&query).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let answer = result.map_err(|e| errors::from_finrag(&e))?;

    if output.is_json() {
        output.result(AskOutput {
            question: query.into_inner(),
            answer: answer.text,
            sources: answer
                .fragments
                .iter()
                .map(|f| SourceOutput {
                    rank: f.rank,
                    score: f.score,
                    preview: f.preview(DEFAULT_PREVIEW_CHARS),
                    truncated: f.is_truncated(DEFAULT_PREVIEW_CHARS),
                })
                .collect(),
        })?;
    } else {
        println!("{}", answer.text);
        println!();
        print!("{}", render::render_sources(&answer.fragments));
    }

    Ok(())
}
