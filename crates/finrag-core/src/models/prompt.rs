use crate::error::{FinragError, Result};
use serde::{Deserialize, Serialize};

/// Built-in analyst prompt
pub const DEFAULT_TEMPLATE: &str = "You are a senior financial analyst at Apple.
Answer the question based ONLY on the following context.
Keep answers professional, concise, and data-driven.

Context:
{context}

Question: {question}
";

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Context,
    Question,
}

/// Prompt template with the named slots `{context}` and `{question}`
///
/// The template is split into segments once at construction, so rendering is a single
/// pass and slot markers inside substituted values are never expanded again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let segments = parse_segments(&source);

        if !segments.contains(&Segment::Context) {
            return Err(FinragError::config_invalid(
                "prompt_template",
                format!("template is missing the {} slot", CONTEXT_SLOT),
            ));
        }
        if !segments.contains(&Segment::Question) {
            return Err(FinragError::config_invalid(
                "prompt_template",
                format!("template is missing the {} slot", QUESTION_SLOT),
            ));
        }

        Ok(Self { source, segments })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Fill both slots
    pub fn render(&self, context: &str, question: &str) -> RenderedPrompt {
        let mut text = String::with_capacity(self.source.len() + context.len() + question.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Context => text.push_str(context),
                Segment::Question => text.push_str(question),
            }
        }

        RenderedPrompt {
            text,
            context: context.to_string(),
            question: question.to_string(),
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
            segments: parse_segments(DEFAULT_TEMPLATE),
        }
    }
}

impl TryFrom<String> for PromptTemplate {
    type Error = FinragError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PromptTemplate> for String {
    fn from(template: PromptTemplate) -> Self {
        template.source
    }
}

fn parse_segments(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while !rest.is_empty() {
        let slot = if rest.starts_with(CONTEXT_SLOT) {
            Some((Segment::Context, CONTEXT_SLOT.len()))
        } else if rest.starts_with(QUESTION_SLOT) {
            Some((Segment::Question, QUESTION_SLOT.len()))
        } else {
            None
        };

        match slot {
            Some((segment, len)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
                rest = &rest[len..];
            }
            None => {
                // Advance one character, never splitting a UTF-8 sequence
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    literal.push(c);
                }
                rest = chars.as_str();
            }
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// A fully rendered prompt along with the values that went into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPrompt {
    pub text: String,
    pub context: String,
    pub question: String,
}
