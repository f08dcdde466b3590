//! End-to-end behaviour of the answer pipeline and chat sessions
//!
//! The hosted collaborators are replaced by in-process fakes: a keyword embedder,
//! the in-memory vector index, and a generator that records every prompt it receives.

use async_trait::async_trait;
use finrag_core::error::{FinragError, Result};
use finrag_core::models::{PipelineConfig, Query, Role};
use finrag_llm::ports::{Embedder, GenerationOptions, Generator};
use finrag_retrieval::pipeline::build_context;
use finrag_retrieval::{AnswerPipeline, ChatSession};
use finrag_store::memory::{IndexEntry, MemoryVectorIndex};
use finrag_store::ports::{IndexMatch, VectorIndex};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const VOCABULARY: &[&str] = &["revenue", "sales", "risk", "supply", "research", "cash"];

/// Bag-of-keywords embedder over a tiny fixed vocabulary
#[derive(Default)]
struct KeywordEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "keywords"
    }
}

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    VOCABULARY.iter().map(|word| lower.matches(word).count() as f32).collect()
}

/// Records prompts and answers with a fixed sentence
#[derive(Default)]
struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("  Total net sales were $383.3 billion in fiscal 2023.\n".to_string())
    }
}

struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String> {
        Err(FinragError::generation("Language model error (429): rate limited"))
    }
}

struct BlankGenerator;

#[async_trait]
impl Generator for BlankGenerator {
    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String> {
        Ok("   ".to_string())
    }
}

struct UnreachableIndex;

#[async_trait]
impl VectorIndex for UnreachableIndex {
    async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<IndexMatch>> {
        Err(FinragError::retrieval("Failed to reach Pinecone index: connection refused"))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

fn filing_index() -> MemoryVectorIndex {
    let fragments = [
        ("rev", "Total net sales were $383.3 billion, revenue down 3% year over year."),
        ("risk", "Risk factors: supply chain disruption and supply concentration."),
        ("rnd", "Research and development expense was $29.9 billion."),
        ("cash", "Cash and cash equivalents totaled $30.0 billion."),
        ("products", "iPhone sales represented 52% of net sales."),
    ];
    MemoryVectorIndex::from_entries(
        "financial-10k",
        fragments
            .iter()
            .map(|(id, text)| IndexEntry::new(*id, keyword_vector(text), *text))
            .collect(),
    )
}

struct Harness {
    embedder: Arc<KeywordEmbedder>,
    generator: Arc<RecordingGenerator>,
    pipeline: AnswerPipeline,
}

fn harness() -> Harness {
    let embedder = Arc::new(KeywordEmbedder::default());
    let generator = Arc::new(RecordingGenerator::default());
    let pipeline = AnswerPipeline::new(
        embedder.clone(),
        Arc::new(filing_index()),
        generator.clone(),
        PipelineConfig::default(),
    );
    Harness { embedder, generator, pipeline }
}

#[tokio::test]
async fn test_revenue_question_grounds_on_revenue_fragment() {
    let h = harness();
    let query = Query::parse("What was total revenue in fiscal 2023?").unwrap();

    let answer = h.pipeline.answer(&query).await.unwrap();

    assert!(answer.fragments.len() <= 3);
    assert_eq!(answer.fragments[0].rank, 1);
    assert!(answer.fragments[0].text.contains("$383.3 billion"));
    assert!(answer.prompt.context.contains("$383.3 billion"));
    assert!(answer.prompt.text.contains("Question: What was total revenue in fiscal 2023?"));
    assert_eq!(answer.text, "Total net sales were $383.3 billion in fiscal 2023.");
    assert_eq!(h.generator.prompts(), vec![answer.prompt.text.clone()]);
}

#[tokio::test]
async fn test_context_is_exactly_the_shown_fragments() {
    let h = harness();
    let query = Query::parse("What are the supply chain risk factors?").unwrap();

    let answer = h.pipeline.answer(&query).await.unwrap();

    assert_eq!(answer.prompt.context, build_context(&answer.fragments));
    let sent = &h.generator.prompts()[0];
    assert!(sent.contains(&answer.prompt.context));
    // Retrieval runs once per question
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_index_fails_turn_without_assistant_reply() {
    let generator = Arc::new(RecordingGenerator::default());
    let pipeline = AnswerPipeline::new(
        Arc::new(KeywordEmbedder::default()),
        Arc::new(UnreachableIndex),
        generator.clone(),
        PipelineConfig::default(),
    );
    let mut session = ChatSession::new();

    let err = session.submit(&pipeline, "What was total revenue?").await.unwrap_err();

    assert!(matches!(err, FinragError::RetrievalUnavailable { .. }));
    assert!(generator.prompts().is_empty());
    let turns = session.transcript().all();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role(), Role::User);
    assert!(session.last_sources().is_empty());
}

#[tokio::test]
async fn test_empty_query_rejected_before_retrieval() {
    let h = harness();
    let mut session = ChatSession::new();

    let err = session.submit(&h.pipeline, "   ").await.unwrap_err();

    assert!(matches!(err, FinragError::InvalidQuery { .. }));
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn test_second_turn_uses_only_its_own_fragments() {
    let h = harness();
    let mut session = ChatSession::new();

    let first = session.submit(&h.pipeline, "What was revenue and net sales?").await.unwrap();
    let second = session.submit(&h.pipeline, "How much was spent on research?").await.unwrap();

    let prompts = h.generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains(&build_context(&second.sources)));
    assert!(second.sources[0].text.contains("Research and development"));
    assert!(!prompts[1].contains("Question: What was revenue and net sales?"));
    // The first turn's top fragment does not leak into the second context unless retrieved again
    let second_texts: Vec<&str> = second.sources.iter().map(|f| f.text.as_str()).collect();
    for fragment in &first.sources {
        if !second_texts.contains(&fragment.text.as_str()) {
            assert!(!prompts[1].contains(&fragment.text));
        }
    }
    assert_eq!(session.last_sources(), second.sources.as_slice());
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn test_generation_failure_is_reported() {
    let pipeline = AnswerPipeline::new(
        Arc::new(KeywordEmbedder::default()),
        Arc::new(filing_index()),
        Arc::new(FailingGenerator),
        PipelineConfig::default(),
    );
    let mut session = ChatSession::new();

    let err = session.submit(&pipeline, "What was revenue?").await.unwrap_err();

    assert!(matches!(err, FinragError::GenerationFailed { .. }));
    assert!(err.to_string().contains("rate limited"));
    assert_eq!(session.transcript().len(), 1);
}

#[tokio::test]
async fn test_blank_model_output_is_generation_failure() {
    let pipeline = AnswerPipeline::new(
        Arc::new(KeywordEmbedder::default()),
        Arc::new(filing_index()),
        Arc::new(BlankGenerator),
        PipelineConfig::default(),
    );

    let err = pipeline.answer(&Query::parse("revenue?").unwrap()).await.unwrap_err();
    assert!(matches!(err, FinragError::GenerationFailed { .. }));
}

#[tokio::test]
async fn test_top_k_comes_from_config() {
    let config = PipelineConfig { top_k: 1, ..PipelineConfig::default() };
    let pipeline = AnswerPipeline::new(
        Arc::new(KeywordEmbedder::default()),
        Arc::new(filing_index()),
        Arc::new(RecordingGenerator::default()),
        config,
    );

    let answer = pipeline.answer(&Query::parse("cash and revenue").unwrap()).await.unwrap();
    assert_eq!(answer.fragments.len(), 1);
}

proptest! {
    #[test]
    fn prop_context_matches_retrieved_fragments(question in "[a-z ]{1,60}", top_k in 1usize..6) {
        prop_assume!(!question.trim().is_empty());

        let generator = Arc::new(RecordingGenerator::default());
        let pipeline = AnswerPipeline::new(
            Arc::new(KeywordEmbedder::default()),
            Arc::new(filing_index()),
            generator.clone(),
            PipelineConfig { top_k, ..PipelineConfig::default() },
        );

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let answer = runtime.block_on(pipeline.answer(&Query::parse(question.clone()).unwrap())).unwrap();

        prop_assert!(answer.fragments.len() <= top_k);
        for pair in answer.fragments.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        prop_assert_eq!(&answer.prompt.context, &build_context(&answer.fragments));
        prop_assert_eq!(&answer.prompt.question, &question);
        prop_assert_eq!(generator.prompts(), vec![answer.prompt.text.clone()]);
    }
}
