//! Classification of a single pod snapshot into a [`PodAnalysis`].

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Container, ContainerStatus, Pod};

use super::format_duration;
use super::types::{ConfigIssue, ContainerAnalysis, PodAnalysis, PodStatus};
use super::AnalysisOptions;

/// Restart totals above this are flagged even when every container is ready.
const RESTART_WARNING_THRESHOLD: i32 = 10;

/// Annotation that authoritatively marks a pod as hosted on a serverless
/// container backend; its value is the backend instance id.
const INSTANCE_ID_ANNOTATION: &str = "k8s.aliyun.com/eci-instance-id";

/// Node-name substring identifying a virtual node, matched case-insensitively.
const VIRTUAL_NODE_TOKEN: &str = "virtual-kubelet";

/// Annotations whose mere presence marks a pod as backend-hosted.
const VIRTUAL_NODE_ANNOTATIONS: &[&str] = &[
    "k8s.aliyun.com/eci-use-specs",
    "k8s.aliyun.com/eci-image-cache",
    "alibabacloud.com/eci",
];

/// Derives the full analysis for one pod. Pure: the result depends only on
/// the pod snapshot, the options and the supplied clock value.
pub fn analyze_pod(pod: &Pod, opts: &AnalysisOptions, now: DateTime<Utc>) -> PodAnalysis {
    let statuses = container_statuses(pod);
    let spec_containers = pod
        .spec
        .as_ref()
        .map(|s| s.containers.as_slice())
        .unwrap_or_default();

    let mut containers = Vec::with_capacity(spec_containers.len());
    let mut config_issues = Vec::new();
    let mut ready_count = 0;
    let mut restarts = 0;

    for container in spec_containers {
        let status = statuses.iter().find(|cs| cs.name == container.name);
        let analysis = analyze_container(container, status, opts.check_config);

        if analysis.ready {
            ready_count += 1;
        }
        restarts += analysis.restart_count;

        if opts.check_config {
            if !analysis.has_requests {
                push_unique(&mut config_issues, ConfigIssue::MissingRequests);
            }
            if !analysis.has_limits {
                push_unique(&mut config_issues, ConfigIssue::MissingLimits);
            }
            if !analysis.has_probe {
                push_unique(&mut config_issues, ConfigIssue::NoProbe);
            }
        }
        containers.push(analysis);
    }

    let total = spec_containers.len();
    let (status, reason) = determine_status(pod, ready_count, total, restarts);
    let (virtual_node, instance_id) = if opts.detect_virtual {
        detect_virtual_node(pod)
    } else {
        (false, None)
    };

    PodAnalysis {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        status,
        phase: pod
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        ready: format!("{}/{}", ready_count, total),
        restarts,
        age: pod
            .metadata
            .creation_timestamp
            .as_ref()
            .map(|t| format_duration(now.signed_duration_since(t.0)))
            .unwrap_or_else(|| "-".to_string()),
        running_time: opts.detect_virtual.then(|| running_time(pod, now)),
        reason,
        config_issues,
        containers,
        virtual_node,
        instance_id,
    }
}

fn analyze_container(
    container: &Container,
    status: Option<&ContainerStatus>,
    check_config: bool,
) -> ContainerAnalysis {
    let (ready, restart_count, last_termination) = match status {
        Some(cs) => (
            cs.ready,
            cs.restart_count,
            cs.last_state
                .as_ref()
                .and_then(|state| state.terminated.as_ref())
                .map(|term| {
                    format!(
                        "{} (exit: {})",
                        term.reason.clone().unwrap_or_default(),
                        term.exit_code
                    )
                }),
        ),
        None => (false, 0, None),
    };

    let (has_requests, has_limits, has_probe) = if check_config {
        let resources = container.resources.as_ref();
        (
            resources
                .and_then(|r| r.requests.as_ref())
                .map_or(false, |m| !m.is_empty()),
            resources
                .and_then(|r| r.limits.as_ref())
                .map_or(false, |m| !m.is_empty()),
            container.liveness_probe.is_some() || container.readiness_probe.is_some(),
        )
    } else {
        (false, false, false)
    };

    ContainerAnalysis {
        name: container.name.clone(),
        ready,
        restart_count,
        last_termination,
        has_requests,
        has_limits,
        has_probe,
    }
}

/// Decision order matters: the first matching rule wins.
fn determine_status(
    pod: &Pod,
    ready_count: usize,
    total_count: usize,
    restarts: i32,
) -> (PodStatus, String) {
    let phase = pod
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown");

    match phase {
        "Pending" => return (PodStatus::Pending, pending_reason(pod)),
        "Failed" => return (PodStatus::Error, failed_reason(pod)),
        "Unknown" => return (PodStatus::Unknown, "Pod status unknown".to_string()),
        _ => {}
    }

    if ready_count < total_count {
        return (PodStatus::Warning, not_ready_reason(pod));
    }

    if restarts > RESTART_WARNING_THRESHOLD {
        return (
            PodStatus::Warning,
            format!("High restart count: {}", restarts),
        );
    }

    for cs in container_statuses(pod) {
        let waiting_reason = cs
            .state
            .as_ref()
            .and_then(|s| s.waiting.as_ref())
            .and_then(|w| w.reason.as_deref())
            .filter(|r| !r.is_empty());
        if let Some(reason) = waiting_reason {
            return (PodStatus::Warning, reason.to_string());
        }
    }

    (PodStatus::Healthy, String::new())
}

fn pending_reason(pod: &Pod) -> String {
    let status = pod.status.as_ref();

    if let Some(conditions) = status.and_then(|s| s.conditions.as_ref()) {
        for cond in conditions {
            if cond.type_ == "PodScheduled" && cond.status == "False" {
                return format!(
                    "Unschedulable: {}",
                    cond.message.clone().unwrap_or_default()
                );
            }
        }
    }

    for cs in container_statuses(pod) {
        if let Some(waiting) = cs.state.as_ref().and_then(|s| s.waiting.as_ref()) {
            return waiting.reason.clone().unwrap_or_default();
        }
    }

    for cs in init_container_statuses(pod) {
        if let Some(state) = cs.state.as_ref() {
            if let Some(waiting) = state.waiting.as_ref() {
                return format!("Init:{}", waiting.reason.clone().unwrap_or_default());
            }
            if state.running.is_some() {
                return format!("Init:{} running", cs.name);
            }
        }
    }

    "Pending".to_string()
}

fn failed_reason(pod: &Pod) -> String {
    let status_reason = pod
        .status
        .as_ref()
        .and_then(|s| s.reason.as_deref())
        .filter(|r| !r.is_empty());
    if let Some(reason) = status_reason {
        return reason.to_string();
    }

    for cs in container_statuses(pod) {
        if let Some(term) = cs.state.as_ref().and_then(|s| s.terminated.as_ref()) {
            return format!(
                "{} (exit: {})",
                term.reason.clone().unwrap_or_default(),
                term.exit_code
            );
        }
    }

    "Failed".to_string()
}

fn not_ready_reason(pod: &Pod) -> String {
    let mut reasons = Vec::new();

    for cs in container_statuses(pod) {
        if cs.ready {
            continue;
        }
        let state = cs.state.as_ref();
        let waiting_reason = state
            .and_then(|s| s.waiting.as_ref())
            .and_then(|w| w.reason.as_deref())
            .filter(|r| !r.is_empty());
        if let Some(reason) = waiting_reason {
            reasons.push(reason.to_string());
        } else if state.map_or(false, |s| s.running.is_some()) {
            reasons.push("NotReady".to_string());
        }
    }

    if reasons.is_empty() {
        "Containers not ready".to_string()
    } else {
        reasons.join(", ")
    }
}

/// Checks, in order: the instance-id annotation (must be non-empty, also
/// yields the id), the node name, then the marker annotations.
fn detect_virtual_node(pod: &Pod) -> (bool, Option<String>) {
    let annotations = pod.metadata.annotations.as_ref();

    let instance_id = annotations
        .and_then(|a| a.get(INSTANCE_ID_ANNOTATION))
        .filter(|id| !id.is_empty());
    if let Some(id) = instance_id {
        return (true, Some(id.clone()));
    }

    let node_name = pod
        .spec
        .as_ref()
        .and_then(|s| s.node_name.as_deref())
        .unwrap_or_default();
    if node_name.to_lowercase().contains(VIRTUAL_NODE_TOKEN) {
        return (true, None);
    }

    if let Some(annotations) = annotations {
        if VIRTUAL_NODE_ANNOTATIONS
            .iter()
            .any(|key| annotations.contains_key(*key))
        {
            return (true, None);
        }
    }

    (false, None)
}

/// How long the pod has been running, from the earliest container start.
/// Falls back to the Ready condition transition, then the creation time.
fn running_time(pod: &Pod, now: DateTime<Utc>) -> String {
    let status = pod.status.as_ref();
    let phase = status.and_then(|s| s.phase.as_deref()).unwrap_or_default();
    if phase != "Running" {
        return "-".to_string();
    }

    let started = container_statuses(pod)
        .iter()
        .filter_map(|cs| cs.state.as_ref())
        .filter_map(|s| s.running.as_ref())
        .filter_map(|r| r.started_at.as_ref())
        .map(|t| t.0)
        .min()
        .or_else(|| {
            status
                .and_then(|s| s.conditions.as_ref())
                .and_then(|conds| conds.iter().find(|c| c.type_ == "Ready"))
                .and_then(|c| c.last_transition_time.as_ref())
                .map(|t| t.0)
        })
        .or_else(|| pod.metadata.creation_timestamp.as_ref().map(|t| t.0));

    match started {
        Some(ts) => format_duration(now.signed_duration_since(ts)),
        None => "-".to_string(),
    }
}

fn container_statuses(pod: &Pod) -> &[ContainerStatus] {
    pod.status
        .as_ref()
        .and_then(|s| s.container_statuses.as_deref())
        .unwrap_or_default()
}

fn init_container_statuses(pod: &Pod) -> &[ContainerStatus] {
    pod.status
        .as_ref()
        .and_then(|s| s.init_container_statuses.as_deref())
        .unwrap_or_default()
}

fn push_unique(issues: &mut Vec<ConfigIssue>, issue: ConfigIssue) {
    if !issues.contains(&issue) {
        issues.push(issue);
    }
}
