use thiserror::Error;

/// Failures of the classifier pipeline.
///
/// On the submit and read paths these are absorbed into
/// [`AIAnalysis::fallback`](crate::domain::entities::AIAnalysis::fallback)
/// and never reach the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Complaint text must not be empty")]
    InvalidInput,
    #[error("Classifier unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Malformed classifier output: {0}")]
    MalformedAnalysis(String),
}

impl AnalysisError {
    /// Label used for the `outcome` metric dimension
    pub fn outcome(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput => "invalid_input",
            AnalysisError::UpstreamUnavailable(_) => "upstream_unavailable",
            AnalysisError::MalformedAnalysis(_) => "malformed",
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
