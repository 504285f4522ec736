//! Contract with the placement REST backend.
//!
//! [`PlacementBackend`] is the seam the job-application service talks through;
//! [`HttpBackend`] is the production implementation.

mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::workflows::jobs::{ApplicationForm, FormAnswers, JobId, JobPosting};
use crate::workflows::plans::Purchase;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Remote operations the client depends on.
#[async_trait]
pub trait PlacementBackend: Send + Sync {
    async fn current_plan(&self) -> Result<CurrentPlanResponse, BackendError>;
    async fn open_jobs(&self) -> Result<Vec<JobPosting>, BackendError>;
    async fn application_form(&self, job_id: &JobId) -> Result<ApplicationForm, BackendError>;
    async fn apply(&self, job_id: &JobId, answers: &FormAnswers)
        -> Result<ApplyResponse, BackendError>;
    async fn applied_jobs(&self) -> Result<Vec<JobId>, BackendError>;
}

/// Payload of `GET current-plan`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlanResponse {
    #[serde(default, alias = "purchaseHistory")]
    pub purchases: Vec<Purchase>,
    /// Server-computed credit count, reported alongside the raw history.
    #[serde(default)]
    pub job_credits: Option<i32>,
    #[serde(default)]
    pub purchased_courses: Vec<serde_json::Value>,
}

/// Payload of a successful `POST jobs/{id}/apply`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub credits_remaining: Option<i32>,
}

/// Body sent with an application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyRequest<'a> {
    pub answers: &'a FormAnswers,
}

/// `GET jobs/applied` returns either a bare list or a wrapped one; entries are ids or
/// application objects referencing the job.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum AppliedJobsPayload {
    Bare(Vec<AppliedJobEntry>),
    Wrapped {
        #[serde(rename = "appliedJobs", alias = "jobIds", alias = "applications")]
        applied_jobs: Vec<AppliedJobEntry>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum AppliedJobEntry {
    Id(String),
    Record(AppliedJobRecord),
}

/// Application object; `jobId` may be a plain id or the populated job document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AppliedJobRecord {
    #[serde(default, rename = "jobId")]
    job: Option<JobRef>,
    #[serde(default, rename = "_id")]
    id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum JobRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl AppliedJobsPayload {
    pub(crate) fn into_ids(self) -> Vec<JobId> {
        let entries = match self {
            AppliedJobsPayload::Bare(entries) => entries,
            AppliedJobsPayload::Wrapped { applied_jobs } => applied_jobs,
        };
        entries
            .into_iter()
            .filter_map(|entry| match entry {
                AppliedJobEntry::Id(id) => Some(JobId(id)),
                AppliedJobEntry::Record(record) => match record.job {
                    Some(JobRef::Id(id)) | Some(JobRef::Populated { id }) => Some(JobId(id)),
                    None => record.id.map(JobId),
                },
            })
            .collect()
    }
}

/// Error body returned by the backend on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

/// Failure reaching or interpreting the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend rejected request with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("not authenticated; log in again")]
    Unauthorized { message: Option<String> },
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Text to show the intern: the backend's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Rejected {
                message: Some(message),
                ..
            }
            | BackendError::Unauthorized {
                message: Some(message),
            } => message.clone(),
            BackendError::Unauthorized { message: None } => {
                "Your session has expired. Please log in again.".to_string()
            }
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}
