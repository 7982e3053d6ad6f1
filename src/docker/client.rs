// ABOUTME: Typed control-plane client for the four engine calls the dashboard needs

use super::transport::{EngineRequest, EngineTransport, TransportError};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Fixed engine API version. Version negotiation is out of scope; every path
/// is prefixed with this.
const API_VERSION: &str = "v1.41";

/// Compose applies this label to every container of a project.
const PROJECT_LABEL: &str = "com.docker.compose.project";

/// Bounded waits per call shape: short for read-only queries, longer for exec
/// creation, longest for the call that runs the command to completion.
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);
const EXEC_CREATE_TIMEOUT: Duration = Duration::from_secs(30);
const EXEC_START_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Body arrived but is not the JSON the call expects. Distinct from
    /// [`ClientError::Transport`] so callers can tell connectivity failures
    /// from malformed responses.
    #[error("engine returned a body that is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("engine rejected exec creation: {0}")]
    ExecCreate(String),
}

/// One raw container record as the engine lists it. Only the fields the view
/// builder consumes are mirrored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineContainer {
    #[serde(rename = "Names", default)]
    pub names: Vec<String>,
    #[serde(rename = "Image", default)]
    pub image: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Labels", default)]
    pub labels: HashMap<String, String>,
    #[serde(rename = "Ports", default)]
    pub ports: Vec<EnginePort>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnginePort {
    #[serde(rename = "PrivatePort")]
    pub private_port: u16,
    #[serde(rename = "PublicPort", default)]
    pub public_port: Option<u16>,
    #[serde(rename = "Type", default)]
    pub protocol: String,
}

#[derive(Debug, Deserialize)]
struct ExecCreated {
    #[serde(rename = "Id", default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecInspected {
    #[serde(rename = "ExitCode", default)]
    exit_code: Option<i64>,
}

/// Thin composition over the transport: builds paths and bodies, decodes
/// JSON, and nothing else.
pub struct DockerClient<T> {
    transport: T,
}

impl<T: EngineTransport> DockerClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Lists all containers belonging to the given compose project, running
    /// or not. Absence of data is not assumed: an error body decodes as a
    /// decode failure and propagates, it is never mapped to an empty list.
    pub async fn list_containers(&self, project: &str) -> Result<Vec<EngineContainer>, ClientError> {
        let filters = format!(r#"{{"label":["{PROJECT_LABEL}={project}"]}}"#);
        let encoded: String = url::form_urlencoded::byte_serialize(filters.as_bytes()).collect();
        let request =
            EngineRequest::get(format!("/{API_VERSION}/containers/json?all=true&filters={encoded}"));

        let response = self.transport.send(&request, QUERY_TIMEOUT).await?;
        let records: Vec<EngineContainer> = serde_json::from_slice(&response.body)?;
        debug!("engine listed {} containers for project {project}", records.len());
        Ok(records)
    }

    /// Registers a one-shot command execution inside the named container and
    /// returns the exec session id the engine issued for it.
    pub async fn create_exec(&self, container: &str, command: &[String]) -> Result<String, ClientError> {
        let request = EngineRequest::post(
            format!("/{API_VERSION}/containers/{container}/exec"),
            serde_json::json!({
                "Cmd": command,
                "AttachStdout": true,
                "AttachStderr": true,
            }),
        );

        let response = self.transport.send(&request, EXEC_CREATE_TIMEOUT).await?;
        let created: ExecCreated = serde_json::from_slice(&response.body)?;
        match created.id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ClientError::ExecCreate(
                String::from_utf8_lossy(&response.body).trim().to_string(),
            )),
        }
    }

    /// Starts the exec session and returns the raw multiplexed output bytes.
    /// With `Tty` off the body is the engine's framed binary stream, so this
    /// goes through the raw transport variant. The read blocks until the
    /// engine closes the connection, i.e. until the command has finished.
    pub async fn start_exec(&self, exec_id: &str) -> Result<Vec<u8>, ClientError> {
        let request = EngineRequest::post(
            format!("/{API_VERSION}/exec/{exec_id}/start"),
            serde_json::json!({ "Detach": false, "Tty": false }),
        );

        Ok(self.transport.send_raw(&request, EXEC_START_TIMEOUT).await?)
    }

    /// Fetches the exit code of a finished exec session. A still-missing
    /// `ExitCode` field decodes as the unknown sentinel.
    pub async fn inspect_exec(&self, exec_id: &str) -> Result<i64, ClientError> {
        let request = EngineRequest::get(format!("/{API_VERSION}/exec/{exec_id}/json"));

        let response = self.transport.send(&request, QUERY_TIMEOUT).await?;
        let inspected: ExecInspected = serde_json::from_slice(&response.body)?;
        Ok(inspected.exit_code.unwrap_or(super::exec::UNKNOWN_EXIT_CODE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::transport::{EngineResponse, MockEngineTransport};
    use pretty_assertions::assert_eq;

    fn json_response(body: &str) -> EngineResponse {
        EngineResponse {
            status_line: "HTTP/1.0 200 OK".to_string(),
            headers: vec!["Content-Type: application/json".to_string()],
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn list_containers_filters_by_project_label() {
        let mut transport = MockEngineTransport::new();
        transport
            .expect_send()
            .withf(|request, _| {
                request.path.starts_with("/v1.41/containers/json?all=true&filters=")
                    && request.path.contains("com.docker.compose.project%3Dwpdevbox")
            })
            .times(1)
            .returning(|_, _| {
                Ok(json_response(
                    r#"[{"Names":["/wpdevbox-db-1"],"Image":"mariadb:10.11","State":"running","Status":"Up 2 minutes","Labels":{"com.docker.compose.service":"db"},"Ports":[{"PrivatePort":3306,"PublicPort":13306,"Type":"tcp"}]}]"#,
                ))
            });

        let client = DockerClient::new(transport);
        let records = client.list_containers("wpdevbox").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].names, vec!["/wpdevbox-db-1".to_string()]);
        assert_eq!(records[0].ports[0].public_port, Some(13306));
        assert_eq!(
            records[0].labels.get("com.docker.compose.service"),
            Some(&"db".to_string())
        );
    }

    #[tokio::test]
    async fn list_containers_error_body_is_a_decode_failure() {
        let mut transport = MockEngineTransport::new();
        transport
            .expect_send()
            .returning(|_, _| Ok(json_response(r#"{"message":"server error"}"#)));

        let client = DockerClient::new(transport);
        let result = client.list_containers("wpdevbox").await;

        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[tokio::test]
    async fn create_exec_returns_the_issued_id() {
        let mut transport = MockEngineTransport::new();
        transport
            .expect_send()
            .withf(|request, _| {
                request.path == "/v1.41/containers/wpdevbox-db-1/exec"
                    && request.body.as_ref().is_some_and(|body| {
                        body["AttachStdout"] == true
                            && body["AttachStderr"] == true
                            && body["Cmd"][0] == "mysql"
                    })
            })
            .times(1)
            .returning(|_, _| Ok(json_response(r#"{"Id":"deadbeef"}"#)));

        let client = DockerClient::new(transport);
        let exec_id = client
            .create_exec("wpdevbox-db-1", &["mysql".to_string()])
            .await
            .unwrap();

        assert_eq!(exec_id, "deadbeef");
    }

    #[tokio::test]
    async fn create_exec_without_id_is_rejected() {
        let mut transport = MockEngineTransport::new();
        transport
            .expect_send()
            .returning(|_, _| Ok(json_response(r#"{"message":"No such container"}"#)));

        let client = DockerClient::new(transport);
        let result = client.create_exec("missing", &["ls".to_string()]).await;

        match result {
            Err(ClientError::ExecCreate(message)) => {
                assert!(message.contains("No such container"));
            }
            other => panic!("expected ExecCreate error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_exec_passes_the_raw_body_through() {
        let raw = vec![1u8, 0, 0, 0, 0, 0, 0, 2, b'o', b'k'];
        let expected = raw.clone();
        let mut transport = MockEngineTransport::new();
        transport
            .expect_send_raw()
            .withf(|request, _| {
                request.path == "/v1.41/exec/deadbeef/start"
                    && request.body.as_ref().is_some_and(|body| {
                        body["Detach"] == false && body["Tty"] == false
                    })
            })
            .times(1)
            .returning(move |_, _| Ok(raw.clone()));

        let client = DockerClient::new(transport);
        let body = client.start_exec("deadbeef").await.unwrap();

        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn inspect_exec_reads_the_exit_code() {
        let mut transport = MockEngineTransport::new();
        transport
            .expect_send()
            .withf(|request, _| request.path == "/v1.41/exec/deadbeef/json")
            .returning(|_, _| Ok(json_response(r#"{"ExitCode":1,"Running":false}"#)));

        let client = DockerClient::new(transport);
        assert_eq!(client.inspect_exec("deadbeef").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn inspect_exec_missing_exit_code_is_unknown() {
        let mut transport = MockEngineTransport::new();
        transport
            .expect_send()
            .returning(|_, _| Ok(json_response(r#"{"Running":true}"#)));

        let client = DockerClient::new(transport);
        assert_eq!(client.inspect_exec("deadbeef").await.unwrap(), -1);
    }
}
