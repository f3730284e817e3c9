//! HTTP backend client.
//!
//! Talks to the REST backend. Responses wrap their payload in an envelope
//! `{ "data": ..., "message": ..., "status": ... }`; bare payloads are
//! accepted too.

use async_trait::async_trait;
use kanban_core::{Phase, PhaseId, Project, ProjectId, StatusCode, Task, TaskId};
use reqwest::{multipart, Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{BoardService, EvidenceFile, Result, ServiceError};

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } => data,
            Payload::Bare(data) => data,
        }
    }
}

/// Acknowledgement body of a mutating call.
#[derive(Deserialize)]
struct Ack {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

// === Response handling ===

/// Map a non-success HTTP status to an error.
fn check_status(status: reqwest::StatusCode, body: &[u8]) -> Result<()> {
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ServiceError::NotFound(String::from_utf8_lossy(body).into_owned()));
    }
    if !status.is_success() {
        return Err(ServiceError::Status {
            status: status.as_u16(),
            message: String::from_utf8_lossy(body).into_owned(),
        });
    }
    Ok(())
}

/// Decode a payload, wrapped in the envelope or bare.
fn decode_data<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let payload: Payload<T> = serde_json::from_slice(body)?;
    Ok(payload.into_inner())
}

/// Decode the acknowledgement of a mutating call. An empty body is
/// success; an envelope status of 400 or above is a rejection.
fn decode_ack(body: &[u8]) -> Result<()> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    let ack: Ack = serde_json::from_slice(body)?;
    match ack.status {
        Some(code) if code >= 400 => Err(ServiceError::Rejected(
            ack.message.unwrap_or_else(|| format!("status {}", code)),
        )),
        _ => Ok(()),
    }
}

/// REST implementation of [`BoardService`].
#[derive(Clone)]
pub struct HttpBoardService {
    /// HTTP client
    client: Client,

    /// Backend root, without trailing slash
    base_url: String,

    /// Per-request timeout
    timeout: Duration,
}

impl HttpBoardService {
    /// Create a client for the backend rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_err(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else {
            ServiceError::Http(err)
        }
    }

    async fn checked(&self, response: Response) -> Result<Vec<u8>> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_err(e))?;
        check_status(status, &body)?;
        Ok(body.to_vec())
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        let body = self.checked(response).await?;
        decode_data(&body)
    }

    async fn read_ack(&self, response: Response) -> Result<()> {
        let body = self.checked(response).await?;
        decode_ack(&body)
    }
}

#[async_trait]
impl BoardService for HttpBoardService {
    async fn fetch_status_codes(&self) -> Result<Vec<StatusCode>> {
        let codes: Option<Vec<StatusCode>> = self.get_data("/tasks/statuses", &[]).await?;
        Ok(codes.unwrap_or_default())
    }

    async fn fetch_tasks_for_board(&self, project_id: ProjectId) -> Result<Vec<Task>> {
        let tasks: Option<Vec<Task>> = self
            .get_data("/tasks/kanban", &[("projectId", project_id.to_string())])
            .await?;
        Ok(tasks.unwrap_or_default())
    }

    async fn fetch_phases_with_tasks(&self, project_id: ProjectId) -> Result<Vec<Phase>> {
        let phases: Option<Vec<Phase>> = self
            .get_data(&format!("/phases/project/{}/with-tasks", project_id), &[])
            .await?;
        Ok(phases.unwrap_or_default())
    }

    async fn fetch_phase_detail(&self, phase_id: PhaseId) -> Result<Phase> {
        self.get_data(&format!("/phases/{}", phase_id), &[]).await
    }

    async fn fetch_project_detail(&self, project_id: ProjectId) -> Result<Project> {
        self.get_data(&format!("/projects/{}", project_id), &[]).await
    }

    async fn update_task_status(&self, task_id: TaskId, status: &StatusCode) -> Result<()> {
        debug!("PUT /tasks/{}/status -> {}", task_id, status);
        let response = self
            .client
            .put(self.url(&format!("/tasks/{}/status", task_id)))
            .json(&json!({ "status": status }))
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        self.read_ack(response).await
    }

    async fn persist_column_order(&self, ordered: &[TaskId]) -> Result<()> {
        debug!("PUT /tasks/kanban/order ({} tasks)", ordered.len());
        let response = self
            .client
            .put(self.url("/tasks/kanban/order"))
            .json(ordered)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        self.read_ack(response).await
    }

    async fn has_evidence(&self, task_id: TaskId) -> Result<bool> {
        let items: Option<Vec<serde_json::Value>> = self
            .get_data(&format!("/tasks/{}/evidence", task_id), &[])
            .await?;
        Ok(items.is_some_and(|items| !items.is_empty()))
    }

    async fn upload_evidence(&self, task_id: TaskId, files: &[EvidenceFile]) -> Result<()> {
        let mut form = multipart::Form::new();
        for file in files {
            let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            if let Some(mime) = &file.content_type {
                part = part.mime_str(mime)?;
            }
            form = form.part("files", part);
        }

        debug!("POST /tasks/{}/evidence ({} files)", task_id, files.len());
        let response = self
            .client
            .post(self.url(&format!("/tasks/{}/evidence", task_id)))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        self.read_ack(response).await
    }

    async fn clear_evidence(&self, task_id: TaskId) -> Result<()> {
        debug!("DELETE /tasks/{}/evidence", task_id);
        let response = self
            .client
            .delete(self.url(&format!("/tasks/{}/evidence", task_id)))
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        self.read_ack(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_accepts_envelope_and_bare() {
        let wrapped: Payload<Vec<StatusCode>> =
            serde_json::from_str(r#"{"data":["PLANNING","IN_PROGRESS"],"message":"ok","status":200}"#)
                .unwrap();
        assert_eq!(wrapped.into_inner(), vec![StatusCode::PLANNING, StatusCode::IN_PROGRESS]);

        let bare: Payload<Vec<StatusCode>> = serde_json::from_str(r#"["COMPLETED"]"#).unwrap();
        assert_eq!(bare.into_inner(), vec![StatusCode::COMPLETED]);
    }

    #[test]
    fn test_null_data_decodes_as_none() {
        let payload: Payload<Option<Vec<StatusCode>>> =
            serde_json::from_str(r#"{"data":null,"message":"empty","status":200}"#).unwrap();
        assert!(payload.into_inner().is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let service = HttpBoardService::new("http://localhost:8080/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(service.url("/tasks/statuses"), "http://localhost:8080/api/tasks/statuses");
    }

    #[test]
    fn test_check_status_maps_errors() {
        assert!(check_status(reqwest::StatusCode::OK, b"").is_ok());
        assert!(matches!(
            check_status(reqwest::StatusCode::NOT_FOUND, b"no task 9"),
            Err(ServiceError::NotFound(message)) if message == "no task 9"
        ));
        assert!(matches!(
            check_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, b"boom"),
            Err(ServiceError::Status { status: 500, .. })
        ));
        assert!(matches!(
            check_status(reqwest::StatusCode::FORBIDDEN, b""),
            Err(ServiceError::Status { status: 403, .. })
        ));
    }

    #[test]
    fn test_ack_rejection_and_success() {
        assert!(decode_ack(b"").is_ok());
        assert!(decode_ack(br#"{"status":200,"message":"Updated","data":null}"#).is_ok());
        assert!(decode_ack(br#"{"message":"ok"}"#).is_ok());

        let err = decode_ack(br#"{"status":400,"message":"Invalid status"}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(message) if message == "Invalid status"));

        let err = decode_ack(br#"{"status":409}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(message) if message == "status 409"));
    }

    #[test]
    fn test_malformed_ack_is_decode_error() {
        assert!(matches!(decode_ack(b"<html>oops</html>"), Err(ServiceError::Decode(_))));
        assert!(matches!(decode_ack(br#"{"status":"#), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn test_decodes_board_tasks_from_envelope() {
        let body = br#"{
            "status": 200,
            "message": "OK",
            "data": [
                {"id": 42, "name": "Checkout flow", "description": null, "deadline": "2025-01-31",
                 "status": "IN_PROGRESS", "phaseId": 7, "assigneeId": null, "branchCreated": null,
                 "githubBranch": null, "hidden": false, "totalSubtasks": 0, "doneSubtasks": 0},
                {"id": 43, "name": "Receipts", "status": "PLANNING", "phaseId": 7, "branchCreated": true,
                 "githubBranch": "feature/receipts"}
            ]
        }"#;
        let tasks: Option<Vec<Task>> = decode_data(body).unwrap();
        let tasks = tasks.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, TaskId::from_raw(42));
        assert_eq!(tasks[0].phase_id, PhaseId::from_raw(7));
        assert!(tasks[1].has_branch());
    }

    #[test]
    fn test_decodes_phase_detail_from_envelope() {
        let body = br#"{"status":200,"message":"OK","data":{"id":7,"name":"Build","status":"COMPLETED",
            "sequence":1,"projectId":1,"tasks":null,"progress":100}}"#;
        let phase: Phase = decode_data(body).unwrap();
        assert_eq!(phase.id, PhaseId::from_raw(7));
        assert_eq!(phase.status, kanban_core::PhaseStatus::Completed);
        assert_eq!(phase.task_count(), 0);
    }
}
