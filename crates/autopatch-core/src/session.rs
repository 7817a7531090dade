//! Request lifecycle for an analysis attempt
//!
//! A [`Session`] is a plain value moved through
//! `load_file -> with_error_log -> submit`. Each step returns the next state,
//! so the whole flow can be driven in tests with a stub [`CodeFixer`].

use crate::diff::DiffResult;
use crate::fix::{BugReport, CodeFixer, FixError, FixResult};
use crate::source::SourceFile;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// Message shown for any failure of the analysis call
pub const ANALYSIS_FAILED: &str = "Failed to analyze code. Please check your API key and try again.";

/// Input needed for a request is missing. Raised before the fixer is called.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please upload a source code file first.")]
    MissingSource,
    #[error("Please paste the stack trace or error log.")]
    MissingErrorLog,
}

/// Why the last request did not produce a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Input(SessionError),
    /// The analysis call failed; the detail is the underlying cause
    Analysis(String),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Input(err) => write!(f, "{err}"),
            Failure::Analysis(detail) => write!(f, "{ANALYSIS_FAILED} ({detail})"),
        }
    }
}

/// State of one user interaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub file: Option<SourceFile>,
    pub error_log: String,
    /// A request is in flight
    pub loading: bool,
    /// Last successful analysis
    pub result: Option<FixResult>,
    /// Last failure, cleared when a new request starts
    pub failure: Option<Failure>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a new file. Clears the previous result and failure.
    pub fn load_file(mut self, file: SourceFile) -> Self {
        self.file = Some(file);
        self.result = None;
        self.failure = None;
        self
    }

    pub fn with_error_log(mut self, error_log: impl Into<String>) -> Self {
        self.error_log = error_log.into();
        self
    }

    /// Build the report to submit, or say which input is missing
    pub fn report(&self) -> Result<BugReport, SessionError> {
        let file = self
            .file
            .as_ref()
            .filter(|f| !f.is_empty())
            .ok_or(SessionError::MissingSource)?;
        if self.error_log.trim().is_empty() {
            return Err(SessionError::MissingErrorLog);
        }

        Ok(BugReport {
            file_name: file.name.clone(),
            original_code: file.content.clone(),
            error_log: self.error_log.clone(),
        })
    }

    /// Start a request. On missing input the session comes back with the failure recorded.
    pub fn begin(mut self) -> Result<Pending, Session> {
        match self.report() {
            Ok(report) => {
                self.loading = true;
                self.failure = None;
                Ok(Pending {
                    session: self,
                    report,
                })
            }
            Err(err) => {
                self.failure = Some(Failure::Input(err));
                Err(self)
            }
        }
    }

    /// Run a full request against `fixer`
    pub fn submit<F>(self, fixer: &F) -> Session
    where
        F: CodeFixer + ?Sized,
    {
        match self.begin() {
            Ok(pending) => {
                let outcome = fixer.fix(pending.report());
                pending.complete(outcome)
            }
            Err(session) => session,
        }
    }

    /// Diff of the loaded file against the last result
    pub fn diff(&self) -> Option<DiffResult> {
        let file = self.file.as_ref()?;
        let result = self.result.as_ref()?;
        Some(result.diff(&file.content))
    }

    /// Whether the last failure was the analysis call, which may succeed on retry
    pub fn can_retry(&self) -> bool {
        matches!(self.failure, Some(Failure::Analysis(_)))
    }
}

/// A request that has started and awaits the fixer's outcome
#[derive(Debug, Clone)]
pub struct Pending {
    session: Session,
    report: BugReport,
}

impl Pending {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn report(&self) -> &BugReport {
        &self.report
    }

    /// Finish the request with the fixer's outcome
    pub fn complete(self, outcome: Result<FixResult, FixError>) -> Session {
        let mut session = self.session;
        session.loading = false;
        match outcome {
            Ok(result) => {
                info!(
                    file = %self.report.file_name,
                    fixed_bytes = result.fixed_code.len(),
                    "Analysis complete"
                );
                session.result = Some(result);
            }
            Err(err) => {
                warn!(file = %self.report.file_name, error = %err, "Analysis failed");
                session.failure = Some(Failure::Analysis(err.to_string()));
            }
        }
        session
    }
}
