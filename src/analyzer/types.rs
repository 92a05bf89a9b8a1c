use std::fmt;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Event;
use serde::Serialize;

use super::format_duration;

/// Overall health classification for a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PodStatus {
    Healthy,
    Warning,
    Error,
    Pending,
    Unknown,
}

impl PodStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PodStatus::Healthy => "Healthy",
            PodStatus::Warning => "Warning",
            PodStatus::Error => "Error",
            PodStatus::Pending => "Pending",
            PodStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resource configuration gap observed on at least one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfigIssue {
    MissingRequests,
    MissingLimits,
    NoProbe,
}

impl ConfigIssue {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigIssue::MissingRequests => "Missing resource requests",
            ConfigIssue::MissingLimits => "Missing resource limits",
            ConfigIssue::NoProbe => "Missing health probe",
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-container findings backing a [`PodAnalysis`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerAnalysis {
    pub name: String,
    pub ready: bool,
    pub restart_count: i32,
    /// `"{reason} (exit: {code})"` of the last termination, if any.
    pub last_termination: Option<String>,
    pub has_requests: bool,
    pub has_limits: bool,
    pub has_probe: bool,
}

/// Everything we derive for a single pod.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodAnalysis {
    pub name: String,
    pub namespace: String,
    pub status: PodStatus,
    pub phase: String,
    /// Ready containers over total, e.g. `"2/2"`.
    pub ready: String,
    pub restarts: i32,
    pub age: String,
    /// Time spent running; only derived when virtual-node detection is
    /// enabled, `"-"` for pods that are not in the Running phase.
    pub running_time: Option<String>,
    pub reason: String,
    /// Deduplicated, first-seen order.
    pub config_issues: Vec<ConfigIssue>,
    pub containers: Vec<ContainerAnalysis>,
    pub virtual_node: bool,
    pub instance_id: Option<String>,
}

/// Aggregated view over a list of pod analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub pods: Vec<PodAnalysis>,
    pub total_pods: usize,
    pub healthy_pods: usize,
    pub warning_pods: usize,
    pub error_pods: usize,
    pub pending_pods: usize,
    pub unknown_pods: usize,
    pub total_restarts: i32,
    pub config_issue_count: usize,
    pub virtual_pod_count: usize,
}

impl AnalysisResult {
    /// True when anything in the result deserves attention.
    pub fn has_issues(&self) -> bool {
        self.error_pods > 0 || self.warning_pods > 0 || self.config_issue_count > 0
    }

    fn push(&mut self, analysis: PodAnalysis) {
        self.total_pods += 1;
        self.total_restarts += analysis.restarts;
        match analysis.status {
            PodStatus::Healthy => self.healthy_pods += 1,
            PodStatus::Warning => self.warning_pods += 1,
            PodStatus::Error => self.error_pods += 1,
            PodStatus::Pending => self.pending_pods += 1,
            PodStatus::Unknown => self.unknown_pods += 1,
        }
        self.config_issue_count += analysis.config_issues.len();
        if analysis.virtual_node {
            self.virtual_pod_count += 1;
        }
        self.pods.push(analysis);
    }
}

impl FromIterator<PodAnalysis> for AnalysisResult {
    fn from_iter<I: IntoIterator<Item = PodAnalysis>>(iter: I) -> Self {
        let mut result = AnalysisResult::default();
        for analysis in iter {
            result.push(analysis);
        }
        result
    }
}

/// Condensed view of a pod event for the single-pod report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub event_type: String,
    pub reason: String,
    pub age: String,
    pub count: i32,
    pub message: String,
}

impl EventSummary {
    pub fn from_event(event: &Event, now: DateTime<Utc>) -> Self {
        let timestamp = event
            .last_timestamp
            .as_ref()
            .map(|t| t.0)
            .or_else(|| event.event_time.as_ref().map(|t| t.0))
            .or_else(|| event.first_timestamp.as_ref().map(|t| t.0));

        Self {
            event_type: event.type_.clone().unwrap_or_default(),
            reason: event.reason.clone().unwrap_or_default(),
            age: timestamp
                .map(|ts| format_duration(now.signed_duration_since(ts)))
                .unwrap_or_else(|| "-".to_string()),
            count: event.count.unwrap_or(1),
            message: event.message.clone().unwrap_or_default(),
        }
    }
}

/// Single-pod inspection: the analysis plus the pod's recent events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodReport {
    pub pod: PodAnalysis,
    pub events: Vec<EventSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(status: PodStatus, restarts: i32, issues: Vec<ConfigIssue>) -> PodAnalysis {
        PodAnalysis {
            name: "pod".to_string(),
            namespace: "default".to_string(),
            status,
            phase: "Running".to_string(),
            ready: "1/1".to_string(),
            restarts,
            age: "5m".to_string(),
            running_time: None,
            reason: String::new(),
            config_issues: issues,
            containers: Vec::new(),
            virtual_node: false,
            instance_id: None,
        }
    }

    #[test]
    fn test_aggregate_counts() {
        let result: AnalysisResult = vec![
            analysis(PodStatus::Healthy, 0, Vec::new()),
            analysis(PodStatus::Healthy, 2, Vec::new()),
            analysis(PodStatus::Warning, 11, Vec::new()),
            analysis(PodStatus::Pending, 0, Vec::new()),
        ]
        .into_iter()
        .collect();

        assert_eq!(result.total_pods, 4);
        assert_eq!(result.healthy_pods, 2);
        assert_eq!(result.warning_pods, 1);
        assert_eq!(result.pending_pods, 1);
        assert_eq!(result.error_pods, 0);
        assert_eq!(result.unknown_pods, 0);
        assert_eq!(result.total_restarts, 13);
        assert!(result.has_issues());
    }

    #[test]
    fn test_aggregate_preserves_order() {
        let mut first = analysis(PodStatus::Healthy, 0, Vec::new());
        first.name = "a".to_string();
        let mut second = analysis(PodStatus::Error, 0, Vec::new());
        second.name = "b".to_string();

        let result: AnalysisResult = vec![first, second].into_iter().collect();
        let names: Vec<&str> = result.pods.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_aggregate_config_issues_and_virtual_pods() {
        let mut on_virtual = analysis(PodStatus::Healthy, 0, Vec::new());
        on_virtual.virtual_node = true;
        let flagged = analysis(
            PodStatus::Healthy,
            0,
            vec![ConfigIssue::MissingRequests, ConfigIssue::NoProbe],
        );

        let result: AnalysisResult = vec![on_virtual, flagged].into_iter().collect();
        assert_eq!(result.virtual_pod_count, 1);
        assert_eq!(result.config_issue_count, 2);
        // Config issues alone count as something to look at.
        assert!(result.has_issues());
    }

    #[test]
    fn test_no_issues_when_all_healthy() {
        let result: AnalysisResult =
            vec![analysis(PodStatus::Healthy, 3, Vec::new())].into_iter().collect();
        assert!(!result.has_issues());
    }

    #[test]
    fn test_empty_result() {
        let result: AnalysisResult = Vec::new().into_iter().collect();
        assert_eq!(result.total_pods, 0);
        assert!(!result.has_issues());
    }
}
