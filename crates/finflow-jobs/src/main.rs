//! `finflow` demo binary
//!
//! Wires the whole stack against offline collaborators: a hashing
//! embedder, a canned stage model, a static market data provider, and a
//! small built-in corpus. Useful for exercising the submit/poll flow and
//! inspecting report payloads without any upstream credentials.

use clap::{value_parser, Arg, Command};
use finflow_jobs::{
    AnalyzeRequest, AnalyzeResponse, AnalysisService, AllowAll, MemoryJobStore, Orchestrator,
    OrchestratorConfig, PipelineRunner, RequestContext,
};
use finflow_pipeline::{
    MarketDataError, ModelError, PipelineExecutor, StageModel, SubjectDataProvider, SubjectMetrics,
};
use finflow_retrieval::{
    DocumentFeed, Embedder, Ingestor, RawDocument, RetrievalError, RetrievalGateway,
};
use finflow_vector::MemoryVectorStore;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const EMBEDDING_DIM: usize = 64;

/// Deterministic bag-of-words embedder; no network, stable across runs.
struct HashEmbedder;

#[async_trait::async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut vector = vec![0.0f32; EMBEDDING_DIM];
        for token in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % EMBEDDING_DIM;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}

/// Canned model: returns a plausible structured answer for every stage.
struct CannedModel;

#[async_trait::async_trait]
impl StageModel for CannedModel {
    async fn run(&self, prompt: &str) -> Result<String, ModelError> {
        let verdict = if prompt.contains("risks") {
            "hold"
        } else {
            "accumulate"
        };
        Ok(format!(
            r#"{{"recommendation": "{verdict}", "confidence": 0.72, "notes": "offline demo output"}}"#
        ))
    }
}

struct StaticProvider;

#[async_trait::async_trait]
impl SubjectDataProvider for StaticProvider {
    async fn fetch(&self, _subject: &str) -> Result<SubjectMetrics, MarketDataError> {
        Ok(SubjectMetrics {
            current_price: Some(187.50),
            market_cap: Some(2_950_000_000_000.0),
            pe_ratio: Some(28.4),
            fifty_two_week_high: Some(199.62),
            fifty_two_week_low: Some(143.90),
            volume: Some(52_164_500.0),
            beta: Some(1.29),
            ..Default::default()
        })
    }
}

/// Built-in corpus standing in for news/filings/historical feeds.
struct DemoFeed;

#[async_trait::async_trait]
impl DocumentFeed for DemoFeed {
    fn name(&self) -> &str {
        "demo_corpus"
    }

    async fn fetch(&self, subject: &str) -> Result<Vec<RawDocument>, RetrievalError> {
        Ok(vec![
            RawDocument::new(
                format!("{subject} reported quarterly revenue above consensus, driven by services growth and stable hardware margins."),
                "Demo Newswire",
                "20260820",
                "market_news",
            ),
            RawDocument::new(
                format!("Momentum breakouts in {subject} above the 50-day moving average have historically extended for two to four weeks."),
                "Demo Research",
                "20260815",
                "historical_pattern",
            ),
            RawDocument::new(
                format!("Liquidity in {subject} supports staged order execution; average spreads remain tight through the US session."),
                "Demo Research",
                "20260818",
                "execution_planning",
            ),
            RawDocument::new(
                format!("Key risks for {subject} include regulatory scrutiny of app store terms and currency headwinds in international segments."),
                "Demo Filings",
                "20260810",
                "risk_assessment",
            ),
        ])
    }
}

fn cli() -> Command {
    Command::new("finflow")
        .version(finflow_jobs::VERSION)
        .about("Financial instrument analysis pipeline (offline demo)")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("analyze")
                .about("Submit an analysis and wait for the result")
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .required(true)
                        .help("Instrument symbol to analyze"),
                )
                .arg(
                    Arg::new("wait-secs")
                        .long("wait-secs")
                        .default_value("30")
                        .value_parser(value_parser!(u64))
                        .help("How long to poll for a terminal status"),
                ),
        )
        .subcommand(
            Command::new("ingest")
                .about("Ingest the built-in corpus and print chunk counts")
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .required(true)
                        .help("Instrument symbol to build a corpus for"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("analyze", args)) => {
            let subject = args
                .get_one::<String>("subject")
                .cloned()
                .unwrap_or_default();
            let wait = Duration::from_secs(*args.get_one::<u64>("wait-secs").unwrap_or(&30));
            analyze(&subject, wait).await
        }
        Some(("ingest", args)) => {
            let subject = args
                .get_one::<String>("subject")
                .cloned()
                .unwrap_or_default();
            ingest(&subject).await
        }
        _ => Ok(()),
    }
}

async fn ingest(subject: &str) -> anyhow::Result<()> {
    let store = Arc::new(MemoryVectorStore::new());
    let ingestor = Ingestor::new(Arc::new(HashEmbedder), store.clone());
    let feeds: Vec<Arc<dyn DocumentFeed>> = vec![Arc::new(DemoFeed)];

    let written = ingestor.populate(subject, &feeds).await?;
    println!("Ingested {written} chunks for {subject} ({} documents indexed)", store.len());
    Ok(())
}

async fn analyze(subject: &str, wait: Duration) -> anyhow::Result<()> {
    let vector_store = Arc::new(MemoryVectorStore::new());
    let embedder = Arc::new(HashEmbedder);

    let ingestor = Ingestor::new(embedder.clone(), vector_store.clone());
    let feeds: Vec<Arc<dyn DocumentFeed>> = vec![Arc::new(DemoFeed)];
    let written = ingestor.populate(subject, &feeds).await?;
    tracing::info!(subject, chunks = written, "demo corpus ready");

    let gateway = RetrievalGateway::new(embedder, vector_store);
    let executor = PipelineExecutor::new(gateway, Arc::new(CannedModel), Arc::new(StaticProvider));
    let runner = Arc::new(PipelineRunner::new(Arc::new(executor)));

    let job_store = Arc::new(MemoryJobStore::new());
    let orchestrator = Arc::new(Orchestrator::new(
        job_store.clone(),
        runner,
        OrchestratorConfig::default(),
    ));
    let service = AnalysisService::new(orchestrator, job_store, Arc::new(AllowAll));

    let context = RequestContext::default();
    let request = AnalyzeRequest {
        subject: Some(subject.to_string()),
    };

    let mut response = service.analyze(&context, request).await;
    let deadline = tokio::time::Instant::now() + wait;
    while let AnalyzeResponse::InProgress { job_id } = response {
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("no terminal status for job {job_id} within {}s", wait.as_secs());
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        response = service.poll(&context, job_id).await;
    }

    match response {
        AnalyzeResponse::Completed { job_id, result } => {
            println!("Job {job_id} completed:");
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        AnalyzeResponse::Error { error } => anyhow::bail!("analysis failed: {error}"),
        AnalyzeResponse::InProgress { .. } => unreachable!("poll loop exits on terminal status"),
    }
}
