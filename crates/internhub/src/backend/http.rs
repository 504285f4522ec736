use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{
    AppliedJobsPayload, ApplyRequest, ApplyResponse, BackendError, CurrentPlanResponse, ErrorBody,
    PlacementBackend,
};
use crate::config::ApiConfig;
use crate::workflows::jobs::{ApplicationForm, FormAnswers, JobId, JobPosting};

/// `reqwest`-backed client for the placement REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

/// `GET jobs` answers with a bare list or with `{ "jobs": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum JobsPayload {
    Bare(Vec<JobPosting>),
    Wrapped { jobs: Vec<JobPosting> },
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.auth_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| {
                BackendError::Transport(format!("invalid auth token header value: {err}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|err| BackendError::Transport(format!("failed to build HTTP client: {err}")))?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                BackendError::Transport(format!("invalid backend base URL '{}'", config.base_url))
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Append `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BackendError::Transport(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Response, BackendError> {
        debug!(%url, "GET");
        self.client
            .get(url)
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| BackendError::Decode(err.to_string()))
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message);
    debug!(status = %status, ?message, "backend returned error status");

    if status == StatusCode::UNAUTHORIZED {
        Err(BackendError::Unauthorized { message })
    } else {
        Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PlacementBackend for HttpBackend {
    async fn current_plan(&self) -> Result<CurrentPlanResponse, BackendError> {
        decode(self.get(self.endpoint(&["current-plan"])?).await?).await
    }

    async fn open_jobs(&self) -> Result<Vec<JobPosting>, BackendError> {
        let mut url = self.endpoint(&["jobs"])?;
        url.query_pairs_mut()
            .append_pair("status", "Open")
            .append_pair("isActive", "true");
        let payload: JobsPayload = decode(self.get(url).await?).await?;
        Ok(match payload {
            JobsPayload::Bare(jobs) | JobsPayload::Wrapped { jobs } => jobs,
        })
    }

    async fn application_form(&self, job_id: &JobId) -> Result<ApplicationForm, BackendError> {
        let url = self.endpoint(&["jobs", job_id.as_str(), "application-form"])?;
        let response = self.get(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%job_id, "job has no custom application form");
            return Ok(ApplicationForm::default());
        }
        decode(response).await
    }

    async fn apply(
        &self,
        job_id: &JobId,
        answers: &FormAnswers,
    ) -> Result<ApplyResponse, BackendError> {
        let url = self.endpoint(&["jobs", job_id.as_str(), "apply"])?;
        debug!(%url, fields = answers.len(), "POST");
        let response = self
            .client
            .post(url)
            .json(&ApplyRequest { answers })
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        let response = check_status(response).await?;

        // The credit is already spent once the status is a success; an odd body must not
        // turn that into a failure.
        let body = response.text().await.unwrap_or_default();
        if body.trim().is_empty() {
            return Ok(ApplyResponse::default());
        }
        match serde_json::from_str::<ApplyResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                warn!(%job_id, error = %err, "apply succeeded with an unreadable body");
                Ok(ApplyResponse::default())
            }
        }
    }

    async fn applied_jobs(&self) -> Result<Vec<JobId>, BackendError> {
        let url = self.endpoint(&["jobs", "applied"])?;
        let payload: AppliedJobsPayload = decode(self.get(url).await?).await?;
        Ok(payload.into_ids())
    }
}
