// ABOUTME: Hand-built HTTP/1.0 transport over the Docker engine's unix socket

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("cannot connect to engine socket {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine socket I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine response has no header/body boundary")]
    MissingBoundary,
    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// One engine call. Constructed per request and never reused.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl EngineRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// The response split at the first blank line: status line and headers on one
/// side, the raw body bytes on the other.
#[derive(Debug, Clone)]
pub struct EngineResponse {
    pub status_line: String,
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

/// Narrow seam in front of the engine's wire format. Everything above this
/// trait deals in requests and responses, never in sockets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngineTransport: Send + Sync {
    async fn send(
        &self,
        request: &EngineRequest,
        timeout: Duration,
    ) -> Result<EngineResponse, TransportError>;

    /// Like [`EngineTransport::send`] but hands back the body bytes untouched,
    /// for responses that are a binary stream rather than JSON.
    async fn send_raw(
        &self,
        request: &EngineRequest,
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError>;
}

/// Transport that opens one connection per call to the engine's local socket,
/// writes an HTTP/1.0 request and reads until the peer closes. There is no
/// keep-alive: connection close is what signals the response is complete.
pub struct UnixTransport {
    socket_path: PathBuf,
}

impl UnixTransport {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    async fn round_trip(
        &self,
        request: &EngineRequest,
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let exchange = async {
            let mut stream =
                UnixStream::connect(&self.socket_path)
                    .await
                    .map_err(|source| TransportError::Connect {
                        path: self.socket_path.display().to_string(),
                        source,
                    })?;

            let wire = encode_request(request);
            debug!("{} {} ({} request bytes)", request.method, request.path, wire.len());
            stream.write_all(&wire).await?;

            let mut raw = Vec::new();
            stream.read_to_end(&mut raw).await?;
            debug!("{} {} ({} response bytes)", request.method, request.path, raw.len());
            Ok(raw)
        };

        // Expiry drops the future, which drops the stream and destroys the
        // connection. Callers see this exactly like connection-refused.
        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
    }
}

#[async_trait]
impl EngineTransport for UnixTransport {
    async fn send(
        &self,
        request: &EngineRequest,
        timeout: Duration,
    ) -> Result<EngineResponse, TransportError> {
        let raw = self.round_trip(request, timeout).await?;
        split_response(&raw)
    }

    async fn send_raw(
        &self,
        request: &EngineRequest,
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        Ok(self.send(request, timeout).await?.body)
    }
}

fn encode_request(request: &EngineRequest) -> Vec<u8> {
    let mut wire = format!(
        "{} {} HTTP/1.0\r\nHost: localhost\r\n",
        request.method, request.path
    )
    .into_bytes();

    match &request.body {
        Some(body) => {
            let payload = body.to_string().into_bytes();
            wire.extend_from_slice(
                format!(
                    "Content-Type: application/json\r\nContent-Length: {}\r\n\r\n",
                    payload.len()
                )
                .as_bytes(),
            );
            wire.extend_from_slice(&payload);
        }
        None => wire.extend_from_slice(b"\r\n"),
    }

    wire
}

fn split_response(raw: &[u8]) -> Result<EngineResponse, TransportError> {
    let boundary = raw
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .ok_or(TransportError::MissingBoundary)?;

    let head = String::from_utf8_lossy(&raw[..boundary]);
    let mut lines = head.lines();
    let status_line = lines.next().unwrap_or_default().to_string();
    let headers = lines.map(str::to_string).collect();

    Ok(EngineResponse {
        status_line,
        headers,
        body: raw[boundary + 4..].to_vec(),
    })
}
