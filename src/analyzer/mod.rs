//! Pod health analysis.
//!
//! This module turns raw `k8s-openapi` pod objects into human-oriented
//! health classifications: an overall status per pod with a reason string,
//! restart totals, resource-configuration gaps and (optionally) virtual
//! node placement. Classification is a pure function of the pod snapshot
//! and an injected `now`, so results are deterministic and directly
//! testable.

pub mod classify;
pub mod types;

pub use classify::analyze_pod;
pub use types::{
    AnalysisResult, ConfigIssue, ContainerAnalysis, EventSummary, PodAnalysis, PodReport,
    PodStatus,
};

use chrono::{DateTime, Duration, Utc};
use k8s_openapi::api::core::v1::Pod;

/// Toggles for the optional analysis passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    /// Flag missing resource requests/limits and absent health probes.
    pub check_config: bool,
    /// Detect pods scheduled onto virtual (serverless) nodes and derive
    /// their running time.
    pub detect_virtual: bool,
}

/// Classify every pod in `pods` and fold the results into totals.
///
/// The per-pod order of the input is preserved in
/// [`AnalysisResult::pods`].
pub fn analyze_pods(pods: &[Pod], opts: &AnalysisOptions, now: DateTime<Utc>) -> AnalysisResult {
    pods.iter().map(|pod| analyze_pod(pod, opts, now)).collect()
}

/// Render an elapsed duration in the compact `kubectl` style: the largest
/// unit plus one sub-unit (`2d4h`, `3h12m`), or a single unit below one
/// hour (`45m`, `30s`).
pub fn format_duration(duration: Duration) -> String {
    let days = duration.num_days();
    let hours = duration.num_hours();
    let minutes = duration.num_minutes();

    if days > 0 {
        format!("{}d{}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h{}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", duration.num_seconds().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(Duration::seconds(45)), "45s");
        assert_eq!(format_duration(Duration::seconds(0)), "0s");
        assert_eq!(format_duration(Duration::seconds(59)), "59s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(Duration::minutes(1)), "1m");
        assert_eq!(format_duration(Duration::seconds(119)), "1m");
        assert_eq!(format_duration(Duration::minutes(59)), "59m");
    }

    #[test]
    fn test_format_duration_hours() {
        assert_eq!(format_duration(Duration::minutes(90)), "1h30m");
        assert_eq!(format_duration(Duration::hours(1)), "1h0m");
        assert_eq!(format_duration(Duration::minutes(23 * 60 + 59)), "23h59m");
    }

    #[test]
    fn test_format_duration_days() {
        assert_eq!(format_duration(Duration::hours(25)), "1d1h");
        assert_eq!(format_duration(Duration::hours(24)), "1d0h");
        assert_eq!(format_duration(Duration::days(3) + Duration::hours(7)), "3d7h");
    }

    #[test]
    fn test_format_duration_negative_clamps_to_zero() {
        assert_eq!(format_duration(Duration::seconds(-5)), "0s");
    }
}
