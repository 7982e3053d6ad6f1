// ABOUTME: Builds the summarized, sorted container view the dashboard consumes

use crate::docker::EngineContainer;
use serde::Serialize;

/// Compose stamps each container with the service it was started as.
const SERVICE_LABEL: &str = "com.docker.compose.service";

const UNKNOWN_SERVICE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    pub service: String,
    pub name: String,
    pub image: String,
    pub state: String,
    pub status: String,
    /// Published port mappings as `public:private/proto`, deduplicated.
    pub ports: Vec<String>,
    /// `healthy`, `unhealthy`, or absent when no health check applies.
    pub health: Option<String>,
}

/// Summarizes raw engine records and orders them by service name,
/// case-insensitively. The sort is stable, so records for the same service
/// keep the engine's order.
pub fn build_summaries(records: Vec<EngineContainer>) -> Vec<ContainerSummary> {
    let mut summaries: Vec<ContainerSummary> = records.into_iter().map(summarize).collect();
    summaries.sort_by_key(|summary| summary.service.to_lowercase());
    summaries
}

fn summarize(record: EngineContainer) -> ContainerSummary {
    let service = record
        .labels
        .get(SERVICE_LABEL)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_SERVICE.to_string());

    let name = record
        .names
        .first()
        .map(|name| name.strip_prefix('/').unwrap_or(name).to_string())
        .unwrap_or_default();

    let mut ports = Vec::new();
    for port in &record.ports {
        let Some(public) = port.public_port else {
            continue;
        };
        let formatted = format!("{public}:{}/{}", port.private_port, port.protocol);
        if !ports.contains(&formatted) {
            ports.push(formatted);
        }
    }

    let health = derive_health(&record.state, &record.status);

    ContainerSummary {
        service,
        name,
        image: record.image,
        state: record.state,
        status: record.status,
        ports,
        health,
    }
}

/// Health is inferred from the free-text status string. The check order is a
/// contract: `healthy` is matched before `health:`, and neither applies to a
/// container that is not running.
fn derive_health(state: &str, status: &str) -> Option<String> {
    if state != "running" {
        return None;
    }
    if status.contains("healthy") {
        return Some("healthy".to_string());
    }
    if status.contains("health:") {
        return Some("unhealthy".to_string());
    }
    None
}
