/// Where a remote job stands, as reported by one status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Ready,
    Failed,
    /// Anything the provider sends that we don't know. Polling stops on it.
    Unknown(String),
}

impl JobStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "Pending" => JobStatus::Pending,
            "Ready" => JobStatus::Ready,
            "Failed" | "Error" | "Request Moderated" | "Content Moderated" => JobStatus::Failed,
            other => JobStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Failed)
    }
}
