//! Service boundary
//!
//! Transport-agnostic request handling: one request type accepting a
//! subject, returning a JSON-shaped body. HTTP framing, CORS, and token
//! formats live outside this crate; caller verification is a seam.
//!
//! Synchronous failures (validation, auth, store-on-dispatch) come back
//! immediately with a specific message; anything else surfaces as a
//! generic opaque failure. Asynchronous failures are visible only by
//! polling the job id.

use crate::error::OrchestratorError;
use crate::job::{JobId, JobStatus};
use crate::orchestrator::{Orchestrator, Submission};
use crate::store::JobStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Opaque request envelope the verifier inspects
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Bearer credential, if the transport supplied one
    pub bearer_token: Option<String>,
}

/// Verifies the caller behind a request
#[async_trait::async_trait]
pub trait CallerVerifier: Send + Sync {
    /// Resolve the caller identity
    ///
    /// # Errors
    /// - `OrchestratorError::Auth` when the caller cannot be verified
    async fn verify(&self, context: &RequestContext) -> Result<String, OrchestratorError>;
}

/// Analysis request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Subject identifier; absence is a validation error
    pub subject: Option<String>,
}

/// JSON-shaped response body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalyzeResponse {
    /// A result is available inline
    Completed {
        job_id: JobId,
        result: Value,
    },
    /// A run is in flight; poll this job id
    InProgress {
        job_id: JobId,
    },
    /// The request failed
    Error {
        error: String,
    },
}

/// The produced service: submit + poll over an orchestrator
pub struct AnalysisService {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn JobStore>,
    verifier: Arc<dyn CallerVerifier>,
}

impl AnalysisService {
    /// Assemble the service from its collaborators
    #[inline]
    #[must_use]
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        store: Arc<dyn JobStore>,
        verifier: Arc<dyn CallerVerifier>,
    ) -> Self {
        Self {
            orchestrator,
            store,
            verifier,
        }
    }

    /// Handle an analysis request
    ///
    /// Never panics across this boundary; every failure maps to an
    /// [`AnalyzeResponse::Error`].
    pub async fn analyze(
        &self,
        context: &RequestContext,
        request: AnalyzeRequest,
    ) -> AnalyzeResponse {
        if let Err(e) = self.verifier.verify(context).await {
            return AnalyzeResponse::Error {
                error: e.to_string(),
            };
        }

        let subject = request.subject.unwrap_or_default();
        match self.orchestrator.submit(&subject).await {
            Ok(Submission::Cached { job }) => AnalyzeResponse::Completed {
                job_id: job.id,
                result: job.result.unwrap_or(Value::Null),
            },
            Ok(Submission::Started { job_id } | Submission::AlreadyRunning { job_id }) => {
                AnalyzeResponse::InProgress { job_id }
            }
            Err(e @ (OrchestratorError::Validation(_) | OrchestratorError::Store(_))) => {
                AnalyzeResponse::Error {
                    error: e.to_string(),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "unexpected submit failure");
                AnalyzeResponse::Error {
                    error: "internal error".to_string(),
                }
            }
        }
    }

    /// Poll a previously submitted job
    pub async fn poll(&self, context: &RequestContext, job_id: JobId) -> AnalyzeResponse {
        if let Err(e) = self.verifier.verify(context).await {
            return AnalyzeResponse::Error {
                error: e.to_string(),
            };
        }

        match self.store.get(job_id).await {
            Ok(Some(job)) => match job.status {
                JobStatus::Completed => AnalyzeResponse::Completed {
                    job_id,
                    result: job.result.unwrap_or(Value::Null),
                },
                JobStatus::Error => AnalyzeResponse::Error {
                    error: job
                        .error_message
                        .unwrap_or_else(|| "analysis failed".to_string()),
                },
                JobStatus::Pending | JobStatus::InProgress => {
                    AnalyzeResponse::InProgress { job_id }
                }
            },
            Ok(None) => AnalyzeResponse::Error {
                error: format!("job not found: {job_id}"),
            },
            Err(e) => {
                tracing::error!(error = %e, %job_id, "poll failed");
                AnalyzeResponse::Error {
                    error: "internal error".to_string(),
                }
            }
        }
    }
}

impl std::fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisService").finish_non_exhaustive()
    }
}

/// Verifier that accepts any request; for tests and the demo binary
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

#[async_trait::async_trait]
impl CallerVerifier for AllowAll {
    async fn verify(&self, _context: &RequestContext) -> Result<String, OrchestratorError> {
        Ok("anonymous".to_string())
    }
}

/// Verifier that requires a non-empty bearer token
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireBearer;

#[async_trait::async_trait]
impl CallerVerifier for RequireBearer {
    async fn verify(&self, context: &RequestContext) -> Result<String, OrchestratorError> {
        match context.bearer_token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
            _ => Err(OrchestratorError::Auth("unauthorized".to_string())),
        }
    }
}
