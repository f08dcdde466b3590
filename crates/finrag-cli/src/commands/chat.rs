use crate::cli::ChatArgs;
use crate::errors;
use crate::interactive::read_question;
use crate::output::OutputWriter;
use crate::progress::{create_spinner, THINKING_MESSAGE};
use crate::render;
use crate::setup;
use anyhow::Result;
use finrag_core::FinragError;
use finrag_retrieval::ChatSession;
use std::path::Path;

pub async fn execute(args: ChatArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = setup::resolve_config(config_file, args.overrides.into())?;
    let pipeline = setup::connect(&config)?;

    print!("{}", render::render_header(&config.display_settings()));

    let mut session = ChatSession::new();

    while let Some(question) = read_question()? {
        if question.trim().is_empty() {
            continue;
        }

        let spinner = create_spinner(THINKING_MESSAGE);
        let result = session.submit(&pipeline, &question).await;
        spinner.finish_and_clear();

        match result {
            Ok(_) => {
                println!();
                print!(
                    "{}",
                    render::render_latest_answer(session.transcript(), session.last_sources())
                );
                println!();
            }
            // The failed question stays in the transcript; the loop keeps going
            Err(e) => {
                tracing::warn!(error = %e, "Turn failed");
                match &e {
                    FinragError::RetrievalUnavailable { .. } | FinragError::GenerationFailed { .. } => {
                        errors::from_finrag(&e).display()
                    }
                    _ => output.error(&e),
                }
            }
        }
    }

    output.info(format!("Session ended after {} turns", session.transcript().len()));
    Ok(())
}
