use finrag_core::error::Result;
use finrag_core::models::{Query, RetrievedFragment, Transcript, Turn};

use crate::pipeline::AnswerPipeline;

/// What a successful turn produced
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub answer: String,
    pub sources: Vec<RetrievedFragment>,
}

/// State owned by one conversation
#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
    last_sources: Vec<RetrievedFragment>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Fragments behind the most recent assistant turn
    pub fn last_sources(&self) -> &[RetrievedFragment] {
        &self.last_sources
    }

    /// Run one question through the pipeline and record the exchange
    ///
    /// Empty input is rejected before anything is recorded. When the pipeline fails the
    /// user turn stays in the transcript, no assistant turn is added, and the error is
    /// returned for display in place of an answer.
    pub async fn submit(&mut self, pipeline: &AnswerPipeline, text: &str) -> Result<TurnOutcome> {
        let query = Query::parse(text)?;
        self.transcript.append(Turn::user(query.as_str()));

        match pipeline.answer(&query).await {
            Ok(answer) => {
                self.transcript.append(Turn::assistant(answer.text.clone()));
                self.last_sources = answer.fragments.clone();
                Ok(TurnOutcome { answer: answer.text, sources: answer.fragments })
            }
            Err(err) => {
                tracing::warn!(error = %err, "Turn failed");
                self.last_sources.clear();
                Err(err)
            }
        }
    }
}
