use std::{future::Future, pin::Pin};

use bytes::Bytes;

use crate::{endpoint::Endpoint, error::JobError, job::JobHandle, request::RequestBody};

mod http;
pub use http::{DEFAULT_BASE_URL, HttpTransport};

#[cfg(test)]
pub(crate) mod scripted;

pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<RawResponse, JobError>> + Send + 'a>>;

/// Status code and body of one HTTP exchange. Interpretation is left to the caller.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The three calls the job client makes. Network failures come back as
/// `JobError::Transport`, any HTTP status is a successful exchange.
pub trait Transport {
    fn submit<'a>(&'a self, endpoint: Endpoint, body: &'a RequestBody<'a>) -> TransportFuture<'a>;
    fn status<'a>(&'a self, handle: &'a JobHandle) -> TransportFuture<'a>;
    fn download<'a>(&'a self, locator: &'a str) -> TransportFuture<'a>;
}
