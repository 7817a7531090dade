//! Code-fix capability and its data contract
//!
//! The analysis service is modelled as a one-method trait so sessions and
//! views can run against a stub instead of the network.

use crate::diff::{compute_diff, DiffResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the user submits for analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugReport {
    pub file_name: String,
    pub original_code: String,
    pub error_log: String,
}

/// What the analysis service returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResult {
    /// The complete corrected source
    pub fixed_code: String,
    /// Short summary of the bug and the fix
    pub explanation: String,
}

impl FixResult {
    /// Parse a `{"fixedCode": .., "explanation": ..}` payload
    pub fn from_json(text: &str) -> Result<Self, FixError> {
        if text.trim().is_empty() {
            return Err(FixError::EmptyResponse);
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Diff the corrected source against `original`
    pub fn diff(&self, original: &str) -> DiffResult {
        compute_diff(original, &self.fixed_code)
    }
}

#[derive(Error, Debug)]
pub enum FixError {
    #[error("Missing API key: set {0}")]
    MissingApiKey(String),
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Analysis service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Empty response from analysis service")]
    EmptyResponse,
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Something that can turn a bug report into a corrected file
pub trait CodeFixer {
    fn fix(&self, report: &BugReport) -> Result<FixResult, FixError>;
}

impl<F> CodeFixer for F
where
    F: Fn(&BugReport) -> Result<FixResult, FixError>,
{
    fn fix(&self, report: &BugReport) -> Result<FixResult, FixError> {
        self(report)
    }
}
