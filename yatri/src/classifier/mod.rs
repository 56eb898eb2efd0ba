//! Temple identification through an external classification process.
//!
//! A [`Classifier`] takes an uploaded image, writes it to a request-scoped [`ScratchFile`], runs the
//! configured classifier program against it, and extracts a [`ClassificationResult`] from what the
//! program prints. The program is started from an argument vector (no shell), bounded by a timeout,
//! and killed if the request future is dropped. The scratch file is removed on every path.
//!
//! Only a missing image is a hard error. Every other failure degrades to the fixed fallback record,
//! tagged with the [`FallbackReason`] so callers can pick a status code and surface diagnostics:
//!
//! | Condition                               | Outcome                                  |
//! |-----------------------------------------|------------------------------------------|
//! | empty image                             | `Err(ClassifierError::MissingImage)`     |
//! | spawn failure, nonzero exit, timeout    | `Fallback { reason: Process(..) }` (500) |
//! | stdout holds no JSON object             | `Fallback { reason: Parse(..) }` (200)   |
//!
//! With `strict_parsing` enabled a parse fallback is reported as 502 instead.

pub mod output;
pub mod scratch;

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::config::ClassifierConfig;
pub use output::{ParseError, parse_output};
pub use scratch::ScratchFile;

const FALLBACK_LOCATION: &str = "Beluru";
const FALLBACK_DYNASTY: &str = "Hoysala";
const FALLBACK_STYLE: &str = "Hoysala architecture";
const FALLBACK_ERA: &str = "12th century CE";
const FALLBACK_CAPTION: &str =
    "A beautiful Hoysala temple sculpture from Beluru, known for its intricate carvings and artistic excellence.";
pub const FALLBACK_CAPTION_SOURCE: &str = "Fallback (Error)";

/// Longest stderr suffix kept in fallback diagnostics
const STDERR_TAIL_LEN: usize = 2000;

/// One uploaded image to classify. Never persisted beyond the request.
#[derive(Debug, Clone, Default)]
pub struct ClassificationRequest {
    pub image: Vec<u8>,
    pub original_filename: String,
    pub use_predefined: bool,
}

/// Structured description of a temple image.
///
/// Keys the classifier emits beyond the known six are kept in `extra` and serialized back at the
/// top level, so a parsed result serializes to the object the classifier printed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynasty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, alias = "captionSource", skip_serializing_if = "Option::is_none")]
    pub caption_source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClassificationResult {
    /// The fixed record returned whenever classification does not produce a result.
    pub fn fallback() -> Self {
        Self {
            location: Some(FALLBACK_LOCATION.to_string()),
            dynasty: Some(FALLBACK_DYNASTY.to_string()),
            style: Some(FALLBACK_STYLE.to_string()),
            era: Some(FALLBACK_ERA.to_string()),
            caption: Some(FALLBACK_CAPTION.to_string()),
            caption_source: Some(FALLBACK_CAPTION_SOURCE.to_string()),
            extra: Map::new(),
        }
    }
}

/// Hard failures. The request is rejected before anything is written or spawned.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("No image provided")]
    MissingImage,
}

/// Failures of the classifier process itself.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("failed to write image to scratch directory {}: {source}", dir.display())]
    Scratch {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start classifier `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("classifier failed with {status}")]
    Exit { status: ExitStatus, stderr: String },

    #[error("classifier did not finish within {limit:?}")]
    Timeout { limit: Duration },

    #[error("failed to collect classifier output: {0}")]
    Io(#[from] io::Error),
}

/// Why a request was answered with the fallback record.
#[derive(Debug, Error)]
pub enum FallbackReason {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Process(#[from] InvocationError),
}

impl FallbackReason {
    /// Short message surfaced to clients as `error`.
    pub fn message(&self) -> String {
        match self {
            FallbackReason::Parse(_) => "Failed to parse classifier output".to_string(),
            FallbackReason::Process(e) => e.to_string(),
        }
    }

    /// Optional diagnostics surfaced to clients as `details`.
    pub fn details(&self) -> Option<String> {
        match self {
            FallbackReason::Parse(e) => Some(e.to_string()),
            FallbackReason::Process(InvocationError::Exit { stderr, .. }) => {
                let stderr = stderr.trim();
                (!stderr.is_empty()).then(|| tail(stderr, STDERR_TAIL_LEN).to_string())
            }
            FallbackReason::Process(_) => None,
        }
    }

    pub fn status_code(&self, strict_parsing: bool) -> StatusCode {
        match self {
            FallbackReason::Parse(_) if strict_parsing => StatusCode::BAD_GATEWAY,
            FallbackReason::Parse(_) => StatusCode::OK,
            FallbackReason::Process(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result of a classification that got past validation.
#[derive(Debug)]
pub enum ClassificationOutcome {
    Classified(ClassificationResult),
    Fallback { result: ClassificationResult, reason: FallbackReason },
}

impl ClassificationOutcome {
    fn fallback(reason: impl Into<FallbackReason>) -> Self {
        ClassificationOutcome::Fallback {
            result: ClassificationResult::fallback(),
            reason: reason.into(),
        }
    }

    pub fn result(&self) -> &ClassificationResult {
        match self {
            ClassificationOutcome::Classified(result) | ClassificationOutcome::Fallback { result, .. } => result,
        }
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            ClassificationOutcome::Classified(_) => None,
            ClassificationOutcome::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn status_code(&self, strict_parsing: bool) -> StatusCode {
        self.reason().map_or(StatusCode::OK, |reason| reason.status_code(strict_parsing))
    }
}

/// Runs the external classifier, at most `max_concurrent` processes at a time.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassifierConfig,
    permits: Option<Arc<Semaphore>>,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let permits = (config.max_concurrent > 0).then(|| Arc::new(Semaphore::new(config.max_concurrent)));
        Self { config, permits }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    #[instrument(skip_all, fields(filename = %request.original_filename, bytes = request.image.len(), use_predefined = request.use_predefined))]
    pub async fn classify(&self, request: ClassificationRequest) -> Result<ClassificationOutcome, ClassifierError> {
        if request.image.is_empty() {
            return Err(ClassifierError::MissingImage);
        }

        // The semaphore is never closed, so acquisition only fails if that changes
        let _permit = match &self.permits {
            Some(permits) => permits.acquire().await.ok(),
            None => None,
        };

        let scratch = match ScratchFile::create(&self.config.scratch_dir, &request.original_filename, &request.image).await {
            Ok(scratch) => scratch,
            Err(source) => {
                let error = InvocationError::Scratch {
                    dir: self.config.scratch_dir.clone(),
                    source,
                };
                warn!(error = %error, "Could not persist upload for classification");
                return Ok(ClassificationOutcome::fallback(error));
            }
        };

        let invocation = self.invoke(scratch.path(), &request).await;
        scratch.release().await;

        let stdout = match invocation {
            Ok(stdout) => stdout,
            Err(error) => {
                warn!(error = %error, "Classifier invocation failed");
                return Ok(ClassificationOutcome::fallback(error));
            }
        };

        match parse_output(&stdout) {
            Ok(result) => {
                info!(location = ?result.location, caption_source = ?result.caption_source, "Classified temple image");
                Ok(ClassificationOutcome::Classified(result))
            }
            Err(error) => {
                warn!(error = %error, stdout = %tail(stdout.trim(), STDERR_TAIL_LEN), "Classifier output was not a JSON object");
                Ok(ClassificationOutcome::fallback(error))
            }
        }
    }

    /// Run the classifier against `image_path` and return its stdout.
    async fn invoke(&self, image_path: &Path, request: &ClassificationRequest) -> Result<String, InvocationError> {
        let mut command = Command::new(&self.config.program);
        if let Some(script) = &self.config.script {
            command.arg(script);
        }
        command
            .arg(image_path)
            .arg("--original_filename")
            .arg(&request.original_filename)
            .arg("--model_dir")
            .arg(&self.config.model_dir);
        if request.use_predefined {
            command.arg("--use_predefined");
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = %self.config.program, image = %image_path.display(), "Starting classifier");
        let started = Instant::now();

        let child = command.spawn().map_err(|source| InvocationError::Spawn {
            program: self.config.program.clone(),
            source,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(InvocationError::Timeout {
                    limit: self.config.timeout,
                });
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(
            status = %output.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            stderr_bytes = stderr.len(),
            "Classifier finished"
        );

        if !output.status.success() {
            return Err(InvocationError::Exit {
                status: output.status,
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            debug!(stderr = %tail(stderr.trim(), STDERR_TAIL_LEN), "Classifier wrote to stderr");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Last `max` bytes of `text`, moved forward to a char boundary.
fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
