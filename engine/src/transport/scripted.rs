//! A `Transport` that plays back canned responses and records every call.

use std::{collections::VecDeque, io, sync::Mutex};

use bytes::Bytes;
use tokio::time::Instant;

use crate::{
    endpoint::Endpoint,
    error::JobError,
    job::JobHandle,
    request::RequestBody,
    transport::{RawResponse, Transport, TransportFuture},
};

#[derive(Debug, Clone)]
pub(crate) enum Step {
    Reply(u16, String),
    ConnectionLost,
    /// The request never completes
    Hang,
}

impl Step {
    pub fn ok(body: &str) -> Self {
        Step::Reply(200, body.into())
    }

    async fn play(self) -> Result<RawResponse, JobError> {
        match self {
            Step::Reply(status, body) => Ok(RawResponse {
                status,
                body: Bytes::from(body),
            }),
            Step::ConnectionLost => Err(JobError::transport(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))),
            Step::Hang => std::future::pending().await,
        }
    }
}

/// Each queue hands out its steps in order, the last one repeats forever.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    submits: Mutex<VecDeque<Step>>,
    statuses: Mutex<VecDeque<Step>>,
    downloads: Mutex<VecDeque<Step>>,

    pub submitted: Mutex<Vec<(Endpoint, String)>>,
    pub status_queries: Mutex<Vec<(String, Instant)>>,
    pub downloaded: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_submit(self, step: Step) -> Self {
        self.submits.lock().unwrap().push_back(step);
        self
    }

    pub fn on_status(self, step: Step) -> Self {
        self.statuses.lock().unwrap().push_back(step);
        self
    }

    pub fn on_download(self, step: Step) -> Self {
        self.downloads.lock().unwrap().push_back(step);
        self
    }

    pub fn status_query_count(&self) -> usize {
        self.status_queries.lock().unwrap().len()
    }

    pub fn status_query_times(&self) -> Vec<Instant> {
        self.status_queries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| *t)
            .collect()
    }
}

fn next_step(queue: &Mutex<VecDeque<Step>>) -> Step {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue
            .front()
            .cloned()
            .expect("scripted transport ran out of steps")
    }
}

impl Transport for ScriptedTransport {
    fn submit<'a>(&'a self, endpoint: Endpoint, body: &'a RequestBody<'a>) -> TransportFuture<'a> {
        let body = serde_json::to_string(body).unwrap();
        self.submitted.lock().unwrap().push((endpoint, body));
        let step = next_step(&self.submits);
        Box::pin(step.play())
    }

    fn status<'a>(&'a self, handle: &'a JobHandle) -> TransportFuture<'a> {
        self.status_queries
            .lock()
            .unwrap()
            .push((handle.id.clone(), Instant::now()));
        let step = next_step(&self.statuses);
        Box::pin(step.play())
    }

    fn download<'a>(&'a self, locator: &'a str) -> TransportFuture<'a> {
        self.downloaded.lock().unwrap().push(locator.to_string());
        let step = next_step(&self.downloads);
        Box::pin(step.play())
    }
}
