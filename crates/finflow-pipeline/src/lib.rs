//! Finflow Pipeline - staged analysis executor
//!
//! Runs the fixed four-stage analysis chain for one subject:
//! - `DataAnalysis -> TradingStrategy -> ExecutionPlanning -> RiskAssessment`
//! - Each stage retrieves typed context, composes a prompt from its
//!   predecessor's output, and calls the injected stage model
//! - Model responses are resolved once into a tagged [`StageOutput`]
//! - The final report merges stage outputs with display-formatted
//!   financial metrics
//!
//! Content generation (the model call) and market data are seams; this
//! crate owns orchestration only.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod executor;
pub mod market;
pub mod model;
pub mod prompt;
pub mod response;
pub mod stage;
pub mod state;

// Re-exports for convenience
pub use error::PipelineError;
pub use executor::{AnalysisReport, PipelineExecutor};
pub use market::{MarketDataError, RetryPolicy, SubjectDataProvider, SubjectMetrics};
pub use model::{ModelError, StageModel};
pub use response::StageOutput;
pub use stage::Stage;
pub use state::{Exchange, PipelineState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
