use std::time::Duration;

use strum::Display;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors of the submit / poll / fetch sequence
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Submission returned no job id ({http_status}): {body}")]
    Submission { http_status: u16, body: String },

    #[error("Unexpected job status: {status}")]
    UnexpectedStatus { status: String },

    #[error("Image generation failed, provider reported: {status}")]
    GenerationFailed { status: String },

    #[error("Job is ready but the result has no image url: {body}")]
    MalformedResult { body: String },

    #[error("Status query returned no readable status ({http_status}): {body}")]
    MalformedStatus { http_status: u16, body: String },

    #[error("Failed to download image. HTTP status code: {status}")]
    Download { status: u16 },

    #[error("Transport error")]
    Transport(#[source] BoxError),

    #[error("Job {job_id} did not finish within {timeout:?}")]
    PollTimeout { job_id: String, timeout: Duration },

    #[error("{stage} did not complete within {timeout:?}")]
    RequestTimeout {
        stage: RequestStage,
        timeout: Duration,
    },

    #[error(
        "Cancelled{}",
        .job_id.as_ref().map(|id| format!(" while working on job {id}")).unwrap_or_default()
    )]
    Cancelled { job_id: Option<String> },
}

impl JobError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }
}

impl From<reqwest::Error> for JobError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}

/// The single requests of a generation that are not part of polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RequestStage {
    Submit,
    Download,
}

/// Errors while building a request, before anything is sent
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Please enter a non-empty prompt")]
    EmptyPrompt,

    #[error("Seed {seed} is outside of the allowed range 0..=99999999")]
    SeedOutOfRange { seed: u64 },
}
