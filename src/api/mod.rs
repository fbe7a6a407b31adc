//! HTTP client for the repository-service bootstrap API.
//!
//! Three endpoints: bootstrap status (GET), bootstrap submission (POST),
//! and task status (GET, polled). Transport and protocol failures map to
//! the operator-facing messages in [`crate::error::Error`]; nothing here
//! retries on its own.

pub mod types;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::ceremony::payload::BootstrapPayload;
use crate::error::{Error, Result};
use self::types::{BootstrapAccepted, BootstrapStatus, TaskState};

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one repository service, carrying auth headers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    headers: HeaderMap,
}

impl ApiClient {
    /// Build a client for `server`, attaching a bearer token if given.
    ///
    /// # Errors
    ///
    /// Fails if `server` is not a valid URL or the token is not a valid
    /// header value.
    pub fn new(server: &str, token: Option<&str>) -> Result<Self> {
        let base = Url::parse(server)?;
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Config(format!("Invalid API token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base,
            headers,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    /// Fetch the current bootstrap status.
    ///
    /// # Errors
    ///
    /// Any non-2xx status is fatal, reported as `Error <status> <detail>`.
    pub async fn bootstrap_status(&self) -> Result<BootstrapStatus> {
        let url = self.endpoint("api/v1/bootstrap/")?;
        debug!(%url, "fetching bootstrap status");
        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Server {
                status: status.as_u16(),
                detail: error_detail(response).await,
            });
        }
        Ok(response.json().await?)
    }

    /// Submit the assembled payload, returning the server task id.
    ///
    /// Short-circuits with the server's message when bootstrap is already
    /// completed, before any POST. Only HTTP 202 acknowledges submission;
    /// a 202 without both a task id and a printable message is reported
    /// with the raw response text.
    ///
    /// # Errors
    ///
    /// See above; every failure is fatal to the ceremony.
    pub async fn bootstrap(&self, payload: &BootstrapPayload) -> Result<String> {
        let status = self.bootstrap_status().await?;
        if status.bootstrap {
            return Err(Error::AlreadyBootstrapped(status.message.unwrap_or_else(
                || "Bootstrap is already completed.".to_string(),
            )));
        }

        let url = self.endpoint("api/v1/bootstrap/")?;
        debug!(%url, "submitting bootstrap payload");
        let response = self
            .http
            .post(url)
            .headers(self.headers.clone())
            .json(payload)
            .send()
            .await?;
        let code = response.status();
        if code != StatusCode::ACCEPTED {
            return Err(Error::Server {
                status: code.as_u16(),
                detail: error_detail(response).await,
            });
        }

        let text = response.text().await?;
        let accepted: BootstrapAccepted = serde_json::from_str(&text).unwrap_or_default();
        let task_id = accepted.data.and_then(|d| d.task_id);
        match (task_id, accepted.message) {
            (Some(task_id), Some(message)) => {
                debug!(%task_id, %message, "bootstrap accepted");
                Ok(task_id)
            }
            _ => Err(Error::MalformedAccept(text)),
        }
    }

    /// Poll the bootstrap task until it reaches a confirmed-success state.
    ///
    /// Issues `GET /api/v1/task/{task_id}/` up to `max_attempts` times,
    /// sleeping `interval` between polls. Returns `Ok(())` only when the
    /// task reports SUCCESS *and* `result.details.bootstrap` is truthy;
    /// task success alone does not imply the bootstrap took effect.
    ///
    /// # Errors
    ///
    /// Non-200 polls, missing `data`/`state`, FAILURE, unconfirmed SUCCESS,
    /// and exhausting the poll budget are all fatal.
    pub async fn wait_for_bootstrap(
        &self,
        task_id: &str,
        interval: Duration,
        max_attempts: u32,
    ) -> Result<()> {
        let url = self.endpoint(&format!("api/v1/task/{task_id}/"))?;
        for attempt in 1..=max_attempts {
            let response = self
                .http
                .get(url.clone())
                .headers(self.headers.clone())
                .send()
                .await?;
            if response.status() != StatusCode::OK {
                return Err(Error::UnexpectedResponse(
                    response.text().await.unwrap_or_default(),
                ));
            }

            let body: Value = response.json().await?;
            let data = match body.get("data") {
                Some(data) if !is_empty_value(data) => data,
                _ => return Err(Error::NoData),
            };
            let state = match data.get("state").and_then(Value::as_str) {
                Some(state) => state,
                None => return Err(Error::NoState),
            };

            match TaskState::from(state) {
                TaskState::Success => {
                    let result = data.get("result").cloned().unwrap_or(Value::Null);
                    let confirmed = result
                        .pointer("/details/bootstrap")
                        .is_some_and(is_truthy);
                    if confirmed {
                        debug!(task_id, attempt, "bootstrap task confirmed");
                        return Ok(());
                    }
                    return Err(Error::BootstrapIncomplete(render_result(&result)));
                }
                TaskState::Failure => {
                    let result = data.get("result").cloned().unwrap_or(Value::Null);
                    return Err(Error::TaskFailed(render_result(&result)));
                }
                TaskState::Started | TaskState::Pending(_) => {
                    debug!(task_id, state, attempt, "task still pending");
                    if attempt < max_attempts {
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        }
        Err(Error::PollTimeout {
            task_id: task_id.to_string(),
            attempts: max_attempts,
        })
    }
}

/// Pull a printable detail out of an error response: the JSON `detail` or
/// `message` member when present, otherwise the raw body text.
async fn error_detail(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            body.get("detail")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(text)
}

/// Missing, null, or `{}` - the shapes the server sends for "nothing yet".
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Truthiness of the `result.details.bootstrap` flag, matching the
/// server's loosely-typed payloads (bool, number, or non-empty string).
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a task result for an error message: bare strings stay bare,
/// anything else is compact JSON.
fn render_result(result: &Value) -> String {
    match result.as_str() {
        Some(s) => s.to_string(),
        None => result.to_string(),
    }
}
