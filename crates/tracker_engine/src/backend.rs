use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracker_core::{JobKind, JobStatusSnapshot, RangeParams};
use tracker_logging::{tracker_debug, tracker_trace};

use crate::{BackendError, FailureKind};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    /// Bearer token supplied by the caller; attached to every request.
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    pub start_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            auth_token: None,
            connect_timeout: Duration::from_secs(5),
            start_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// The backend operations the tracker consumes.
///
/// `get_job_status` returns `Ok(None)` when the backend has no record of the
/// job. That is an answer, not a transport failure.
#[async_trait::async_trait]
pub trait JobBackend: Send + Sync {
    async fn start_job(
        &self,
        kind: JobKind,
        params: Option<RangeParams>,
    ) -> Result<String, BackendError>;

    async fn get_job_status(
        &self,
        kind: JobKind,
        job_id: &str,
    ) -> Result<Option<JobStatusSnapshot>, BackendError>;
}

/// REST implementation of [`JobBackend`].
///
/// - `POST {base}/api/jobs/{kind}/start` -> `{"jobId": "..."}`
/// - `GET {base}/api/jobs/{kind}/{jobId}/status` -> snapshot, `404` when unknown
#[derive(Debug, Clone)]
pub struct RestBackend {
    settings: BackendSettings,
    base_url: Url,
    client: reqwest::Client,
}

impl RestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| BackendError::new(FailureKind::InvalidRequest, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::new(
                FailureKind::InvalidRequest,
                format!("base url {base_url} cannot carry a path"),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "jobs"]).extend(segments);
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.settings.auth_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl JobBackend for RestBackend {
    async fn start_job(
        &self,
        kind: JobKind,
        params: Option<RangeParams>,
    ) -> Result<String, BackendError> {
        let url = self.endpoint(&[kind.as_str(), "start"]);
        tracker_debug!("POST {}", url);

        let mut request = self
            .authorize(self.client.post(url))
            .timeout(self.settings.start_timeout);
        if let Some(params) = params {
            let body = serde_json::to_vec(&params)
                .map_err(|err| BackendError::new(FailureKind::InvalidRequest, err.to_string()))?;
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if matches!(
            status,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
        ) {
            // A proxy may give up while the backend has already accepted the job.
            return Err(BackendError::new(
                FailureKind::Timeout {
                    job_id: extract_job_id(&body),
                },
                status.to_string(),
            ));
        }
        if !status.is_success() {
            return Err(BackendError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        extract_job_id(&body).ok_or_else(|| {
            BackendError::new(FailureKind::Decode, "start response carries no jobId")
        })
    }

    async fn get_job_status(
        &self,
        kind: JobKind,
        job_id: &str,
    ) -> Result<Option<JobStatusSnapshot>, BackendError> {
        let url = self.endpoint(&[kind.as_str(), job_id, "status"]);
        tracker_trace!("GET {}", url);

        let response = self
            .authorize(self.client.get(url))
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BackendError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        // A `null` body is the backend's other way of saying "not found".
        serde_json::from_slice::<Option<JobStatusSnapshot>>(&body)
            .map_err(|err| BackendError::new(FailureKind::Decode, err.to_string()))
    }
}

/// Reads `jobId` from a JSON body, accepting string or numeric ids.
fn extract_job_id(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("jobId")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout { job_id: None }, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::Decode, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
