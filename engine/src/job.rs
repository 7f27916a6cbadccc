use std::{future::Future, time::Duration};

use bytes::Bytes;
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{JobError, RequestStage},
    request::GenerationRequest,
    status::JobStatus,
    transport::{RawResponse, Transport},
};

mod retry;
pub use retry::RetryPolicy;

/// Identifies one in-flight job. Only `submit` creates one and polling consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct JobHandle {
    pub(crate) id: String,
    /// Some provider deployments tell us where to poll. Without it we use `get_result`.
    pub(crate) polling_url: Option<String>,
}

impl JobHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn polling_url(&self) -> Option<&str> {
        self.polling_url.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub job_id: String,
    /// Url of the generated image, never empty
    pub locator: String,
}

/// A finished generation with the downloaded image
#[derive(Debug, Clone)]
pub struct Artifact {
    pub job_id: String,
    pub locator: String,
    pub seed: u64,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
    /// Bound on the submission and the download in `generate`
    pub request_timeout: Duration,
}

impl PollOptions {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            timeout: None,
            retry: RetryPolicy::default(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: Option<String>,
    polling_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    result: Option<StatusResult>,
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    sample: Option<String>,
}

/// Submits generation jobs, waits for them and downloads their output.
///
/// The client keeps no state between calls, clones share the transport.
#[derive(Clone)]
pub struct JobClient<T> {
    transport: T,
}

impl<T: Transport + Sync> JobClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn submit(&self, request: &GenerationRequest) -> Result<JobHandle, JobError> {
        let body = request.body();
        let resp = self.transport.submit(request.endpoint, &body).await?;

        let parsed = serde_json::from_slice::<SubmitResponse>(&resp.body).ok();
        let Some(SubmitResponse {
            id: Some(id),
            polling_url,
        }) = parsed
        else {
            return Err(JobError::Submission {
                http_status: resp.status,
                body: resp.body_text(),
            });
        };

        if id.is_empty() {
            return Err(JobError::Submission {
                http_status: resp.status,
                body: resp.body_text(),
            });
        }

        info!("Image generation request ID: {id}");
        Ok(JobHandle { id, polling_url })
    }

    /// Queries the job status until it is terminal. The first query goes out
    /// immediately, the following ones `opts.interval` apart.
    pub async fn poll_until_terminal(
        &self,
        handle: JobHandle,
        opts: &PollOptions,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, JobError> {
        let deadline = async {
            match opts.timeout {
                Some(t) => sleep(t).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(JobError::Cancelled { job_id: Some(handle.id.clone()) }),
            res = self.poll_loop(&handle, opts) => res,
            _ = deadline => Err(JobError::PollTimeout {
                job_id: handle.id.clone(),
                timeout: opts.timeout.unwrap_or_default(),
            }),
        }
    }

    async fn poll_loop(
        &self,
        handle: &JobHandle,
        opts: &PollOptions,
    ) -> Result<GenerationResult, JobError> {
        loop {
            let resp = self.query_status(handle, &opts.retry).await?;

            let Ok(poll) = serde_json::from_slice::<StatusResponse>(&resp.body) else {
                return Err(JobError::MalformedStatus {
                    http_status: resp.status,
                    body: resp.body_text(),
                });
            };

            match JobStatus::from_raw(&poll.status) {
                JobStatus::Ready => {
                    let locator = poll
                        .result
                        .and_then(|r| r.sample)
                        .filter(|s| !s.is_empty())
                        .ok_or_else(|| JobError::MalformedResult {
                            body: resp.body_text(),
                        })?;
                    info!("Job {} is ready", handle.id);
                    return Ok(GenerationResult {
                        job_id: handle.id.clone(),
                        locator,
                    });
                }
                JobStatus::Failed => {
                    return Err(JobError::GenerationFailed {
                        status: poll.status,
                    });
                }
                JobStatus::Unknown(status) => return Err(JobError::UnexpectedStatus { status }),
                JobStatus::Pending => {
                    debug!("Job {} still processing", handle.id);
                    sleep(opts.interval).await;
                }
            }
        }
    }

    async fn query_status(
        &self,
        handle: &JobHandle,
        policy: &RetryPolicy,
    ) -> Result<RawResponse, JobError> {
        let mut delay = policy.initial_delay;
        let mut attempt = 0;
        loop {
            match self.transport.status(handle).await {
                Err(JobError::Transport(err)) if attempt < policy.max_retries => {
                    attempt += 1;
                    warn!(
                        "Status query for {} failed ({err}), retry {attempt}/{} in {delay:?}",
                        handle.id, policy.max_retries
                    );
                    sleep(delay).await;
                    delay = policy.next_delay(delay);
                }
                res => return res,
            }
        }
    }

    /// Downloads the image behind `locator`. Only a 200 counts as success.
    pub async fn fetch(&self, locator: &str) -> Result<Bytes, JobError> {
        let resp = self.transport.download(locator).await?;
        if resp.status != 200 {
            return Err(JobError::Download {
                status: resp.status,
            });
        }
        debug!("Downloaded {} bytes from {locator}", resp.body.len());
        Ok(resp.body)
    }

    /// Submit, wait, download. Every step stops on `cancel`; the submission
    /// and the download are bounded by `opts.request_timeout`.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        opts: &PollOptions,
        cancel: &CancellationToken,
    ) -> Result<Artifact, JobError> {
        let handle = guarded(RequestStage::Submit, None, opts, cancel, self.submit(request)).await?;
        let GenerationResult { job_id, locator } =
            self.poll_until_terminal(handle, opts, cancel).await?;
        let data = guarded(
            RequestStage::Download,
            Some(job_id.as_str()),
            opts,
            cancel,
            self.fetch(&locator),
        )
        .await?;
        Ok(Artifact {
            job_id,
            locator,
            seed: request.seed,
            data,
        })
    }
}

async fn guarded<R>(
    stage: RequestStage,
    job_id: Option<&str>,
    opts: &PollOptions,
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<R, JobError>>,
) -> Result<R, JobError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(JobError::Cancelled { job_id: job_id.map(String::from) }),
        res = timeout(opts.request_timeout, fut) => res.unwrap_or_else(|_| {
            Err(JobError::RequestTimeout {
                stage,
                timeout: opts.request_timeout,
            })
        }),
    }
}
