//! Shared offline test doubles for the finflow workspace
//!
//! Deterministic stand-ins for every external collaborator: embedding
//! provider, stage model, market data provider, and document feeds.
//! Nothing here touches the network.

#![allow(missing_docs)]

use finflow_pipeline::{MarketDataError, ModelError, StageModel, SubjectDataProvider, SubjectMetrics};
use finflow_retrieval::{
    DocumentFeed, Embedder, Ingestor, RawDocument, RetrievalError, RetrievalGateway,
};
use finflow_vector::MemoryVectorStore;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const TEST_EMBEDDING_DIM: usize = 32;

/// Deterministic bag-of-words embedder; similar texts land near each other.
#[derive(Debug, Default)]
pub struct HashEmbedder;

#[async_trait::async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut vector = vec![0.0f32; TEST_EMBEDDING_DIM];
        for token in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % TEST_EMBEDDING_DIM;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}

/// Stage model that replays scripted responses in call order and records
/// every prompt it saw.
pub struct ScriptedStageModel {
    responses: Mutex<Vec<Result<String, ModelError>>>,
    repeat_last: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedStageModel {
    /// Replay `responses` front to back; calls past the script fail.
    pub fn new(responses: Vec<Result<String, ModelError>>) -> Self {
        let mut script = responses;
        script.reverse();
        Self {
            responses: Mutex::new(script),
            repeat_last: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A model that answers every call with the same structured payload.
    pub fn always(response: &str) -> Self {
        Self {
            responses: Mutex::new(vec![Ok(response.to_string())]),
            repeat_last: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts observed so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait::async_trait]
impl StageModel for ScriptedStageModel {
    async fn run(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        let mut script = self.responses.lock();
        if self.repeat_last && script.len() == 1 {
            return clone_response(&script[0]);
        }
        script
            .pop()
            .unwrap_or_else(|| Err(ModelError::Call("script exhausted".to_string())))
    }
}

fn clone_response(r: &Result<String, ModelError>) -> Result<String, ModelError> {
    match r {
        Ok(s) => Ok(s.clone()),
        Err(ModelError::Call(m)) => Err(ModelError::Call(m.clone())),
        Err(ModelError::RateLimited(m)) => Err(ModelError::RateLimited(m.clone())),
    }
}

/// Market data provider returning fixed metrics for every subject except
/// `"MISSING"`, which is unknown.
#[derive(Debug, Default)]
pub struct StaticSubjectData;

#[async_trait::async_trait]
impl SubjectDataProvider for StaticSubjectData {
    async fn fetch(&self, subject: &str) -> Result<SubjectMetrics, MarketDataError> {
        if subject == "MISSING" {
            return Err(MarketDataError::NotFound(subject.to_string()));
        }
        Ok(SubjectMetrics {
            current_price: Some(187.50),
            market_cap: Some(2_950_000_000_000.0),
            pe_ratio: Some(28.4),
            volume: Some(52_164_500.0),
            beta: Some(1.29),
            ..Default::default()
        })
    }
}

/// One raw document per retrieval category for `subject`.
pub fn sample_corpus(subject: &str) -> Vec<RawDocument> {
    vec![
        RawDocument::new(
            format!("{subject} beat revenue estimates on services strength."),
            "Test Newswire",
            "20260820",
            "market_news",
        ),
        RawDocument::new(
            format!("{subject} breakouts above the 50-day average tend to persist."),
            "Test Research",
            "20260815",
            "historical_pattern",
        ),
        RawDocument::new(
            format!("{subject} liquidity supports staged order execution."),
            "Test Research",
            "20260818",
            "execution_planning",
        ),
        RawDocument::new(
            format!("{subject} faces regulatory and currency risks."),
            "Test Filings",
            "20260810",
            "risk_assessment",
        ),
    ]
}

/// Feed serving [`sample_corpus`].
#[derive(Debug, Default)]
pub struct SampleFeed;

#[async_trait::async_trait]
impl DocumentFeed for SampleFeed {
    fn name(&self) -> &str {
        "sample"
    }

    async fn fetch(&self, subject: &str) -> Result<Vec<RawDocument>, RetrievalError> {
        Ok(sample_corpus(subject))
    }
}

/// A gateway over a fresh in-memory index seeded with [`sample_corpus`].
pub async fn seeded_gateway(subject: &str) -> RetrievalGateway {
    let store = Arc::new(MemoryVectorStore::new());
    let embedder = Arc::new(HashEmbedder);
    let ingestor = Ingestor::new(embedder.clone(), store.clone());
    ingestor
        .ingest(sample_corpus(subject))
        .await
        .unwrap_or_else(|e| panic!("seeding test index failed: {e}"));
    RetrievalGateway::new(embedder, store)
}
