// ABOUTME: Container-engine gateway: socket transport, control-plane client, exec plumbing

pub mod client;
pub mod exec;
pub mod stream;
pub mod transport;

pub use client::{ClientError, DockerClient, EngineContainer, EnginePort};
pub use exec::{CommandRunner, EngineExecRunner, ExecResult, UNKNOWN_EXIT_CODE};
pub use stream::{combined_output, frames, StreamFrame, StreamKind};
pub use transport::{
    EngineRequest, EngineResponse, EngineTransport, Method, TransportError, UnixTransport,
};
