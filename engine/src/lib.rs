//! Client for the hosted FLUX image generation API: submit a prompt, poll the
//! job until it is done, download the picture.

pub mod endpoint;
pub mod error;
pub mod job;
pub mod request;
pub mod status;
pub mod transport;

pub use endpoint::Endpoint;
pub use error::{JobError, RequestError, RequestStage};
pub use job::{Artifact, GenerationResult, JobClient, JobHandle, PollOptions, RetryPolicy};
pub use request::{GenerationRequest, SeedChoice};
pub use status::JobStatus;
pub use transport::{HttpTransport, Transport};
