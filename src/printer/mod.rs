//! Terminal rendering: pod table, summary block, recommendations, events.

use std::io::Write;

use crate::analyzer::{AnalysisResult, ConfigIssue, EventSummary, PodAnalysis, PodStatus};
use crate::Result;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";

const MAX_NAME_WIDTH: usize = 60;
const MAX_NAMESPACE_WIDTH: usize = 25;

pub struct Printer<W: Write> {
    out: W,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Renders the pod table. Healthy pods without config issues are hidden
    /// unless `show_all` is set. The RUNNING and VIRTUAL columns appear only
    /// when virtual-node detection produced them.
    pub fn print_pod_table(
        &mut self,
        result: &AnalysisResult,
        show_all: bool,
        show_namespace: bool,
    ) -> Result<()> {
        let pods_to_show: Vec<&PodAnalysis> = result
            .pods
            .iter()
            .filter(|pod| {
                show_all || pod.status != PodStatus::Healthy || !pod.config_issues.is_empty()
            })
            .collect();

        if pods_to_show.is_empty() {
            writeln!(self.out, "{}  ✓ All pods are healthy!{}", GREEN, RESET)?;
            writeln!(self.out)?;
            return Ok(());
        }

        let show_detect = pods_to_show
            .first()
            .map_or(false, |pod| pod.running_time.is_some());

        let name_width = pods_to_show
            .iter()
            .map(|pod| pod.name.len())
            .max()
            .unwrap_or(0)
            .max("NAME".len())
            .min(MAX_NAME_WIDTH);
        let ns_width = pods_to_show
            .iter()
            .map(|pod| pod.namespace.len())
            .max()
            .unwrap_or(0)
            .max("NAMESPACE".len())
            .min(MAX_NAMESPACE_WIDTH);

        let mut header = String::new();
        if show_namespace {
            header.push_str(&format!("{:<w$}  ", "NAMESPACE", w = ns_width));
        }
        header.push_str(&format!("{:<w$}  ", "NAME", w = name_width));
        header.push_str(&format!(
            "{:<10} {:<7} {:<10} {:<9} ",
            "STATUS", "READY", "RESTARTS", "AGE"
        ));
        if show_detect {
            header.push_str(&format!("{:<9} {:<7} ", "RUNNING", "VIRTUAL"));
        }
        header.push_str("REASON");

        writeln!(self.out, "{}{}{}", BOLD, header, RESET)?;
        writeln!(self.out, "{}", "-".repeat(header.chars().count()))?;

        for pod in &pods_to_show {
            self.print_pod_row(pod, show_namespace, show_detect, ns_width, name_width)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn print_pod_row(
        &mut self,
        pod: &PodAnalysis,
        show_namespace: bool,
        show_detect: bool,
        ns_width: usize,
        name_width: usize,
    ) -> Result<()> {
        let status_cell = format!("{} {}", status_icon(pod.status), pod.status);

        let mut row = String::new();
        if show_namespace {
            row.push_str(&format!(
                "{:<w$}  ",
                truncate(&pod.namespace, ns_width),
                w = ns_width
            ));
        }
        row.push_str(&format!(
            "{:<w$}  ",
            truncate(&pod.name, name_width),
            w = name_width
        ));
        row.push_str(&format!(
            "{}{:<10}{} {:<7} {:<10} {:<9} ",
            status_color(pod.status),
            status_cell,
            RESET,
            pod.ready,
            pod.restarts,
            pod.age
        ));
        if show_detect {
            let running = pod.running_time.as_deref().unwrap_or("-");
            let virtual_mark = if pod.virtual_node {
                format!("{}virtual{}", CYAN, RESET)
            } else {
                "-".to_string()
            };
            row.push_str(&format!("{:<9} {:<7} ", running, virtual_mark));
        }
        row.push_str(&pod.reason);
        if !pod.config_issues.is_empty() {
            row.push_str(&format!("{} ⚙{}", YELLOW, RESET));
        }
        writeln!(self.out, "{}", row)?;

        for issue in &pod.config_issues {
            writeln!(self.out, "  {}└─ {}{}", YELLOW, issue, RESET)?;
        }
        Ok(())
    }

    pub fn print_summary(&mut self, result: &AnalysisResult) -> Result<()> {
        writeln!(self.out, "{}📊 Summary{}", BOLD, RESET)?;
        writeln!(self.out, "{}", "-".repeat(40))?;

        writeln!(self.out, "Total Pods:     {}", result.total_pods)?;
        if result.healthy_pods > 0 {
            writeln!(
                self.out,
                "{}Healthy:        {}{}",
                GREEN, result.healthy_pods, RESET
            )?;
        }
        if result.pending_pods > 0 {
            writeln!(
                self.out,
                "{}Pending:        {}{}",
                BLUE, result.pending_pods, RESET
            )?;
        }
        if result.warning_pods > 0 {
            writeln!(
                self.out,
                "{}Warning:        {}{}",
                YELLOW, result.warning_pods, RESET
            )?;
        }
        if result.error_pods > 0 {
            writeln!(
                self.out,
                "{}Error:          {}{}",
                RED, result.error_pods, RESET
            )?;
        }
        if result.unknown_pods > 0 {
            writeln!(self.out, "Unknown:        {}", result.unknown_pods)?;
        }
        writeln!(self.out, "Total Restarts: {}", result.total_restarts)?;
        if result.virtual_pod_count > 0 {
            let percent = result.virtual_pod_count as f64 / result.total_pods as f64 * 100.0;
            writeln!(
                self.out,
                "{}Virtual Pods:   {}{} ({:.1}%)",
                CYAN, result.virtual_pod_count, RESET, percent
            )?;
        }
        if result.config_issue_count > 0 {
            writeln!(
                self.out,
                "{}Config Issues:  {}{}",
                YELLOW, result.config_issue_count, RESET
            )?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub fn print_recommendations(&mut self, result: &AnalysisResult) -> Result<()> {
        writeln!(self.out, "{}💡 Recommendations{}", BOLD, RESET)?;
        writeln!(self.out, "{}", "-".repeat(40))?;

        let recommendations = collect_recommendations(result);
        if recommendations.is_empty() {
            writeln!(self.out, "{}  ✓ No specific recommendations{}", GREEN, RESET)?;
        } else {
            for rec in &recommendations {
                writeln!(self.out, "  • {}", rec)?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Renders the recent-events block of the single-pod view.
    pub fn print_events(&mut self, events: &[EventSummary]) -> Result<()> {
        writeln!(self.out, "{}📋 Recent Events{}", BOLD, RESET)?;
        writeln!(self.out, "{}", "-".repeat(40))?;

        if events.is_empty() {
            writeln!(self.out, "  No recent events")?;
            writeln!(self.out)?;
            return Ok(());
        }

        writeln!(
            self.out,
            "{}{:<8} {:<20} {:<7} {:<5} MESSAGE{}",
            BOLD, "TYPE", "REASON", "AGE", "COUNT", RESET
        )?;
        for event in events {
            writeln!(
                self.out,
                "{:<8} {:<20} {:<7} {:<5} {}",
                event.event_type,
                truncate(&event.reason, 20),
                event.age,
                event.count,
                event.message
            )?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}

/// Deduplicated in first-seen order so repeated runs print identically.
fn collect_recommendations(result: &AnalysisResult) -> Vec<String> {
    let mut recommendations = Vec::new();

    for pod in &result.pods {
        match pod.status {
            PodStatus::Error => {
                push_unique(
                    &mut recommendations,
                    format!("Check pod events: kubectl describe pod {}", pod.name),
                );
            }
            PodStatus::Pending => {
                if pod.reason.contains("Unschedulable") {
                    push_unique(
                        &mut recommendations,
                        "Check node resources and taints".to_string(),
                    );
                }
                if pod.reason.contains("ImagePull") {
                    push_unique(
                        &mut recommendations,
                        "Verify image name and pull secrets".to_string(),
                    );
                }
            }
            PodStatus::Warning => {
                if pod.restarts > 10 {
                    push_unique(
                        &mut recommendations,
                        format!(
                            "Investigate high restart count - check logs: kubectl logs {} --previous",
                            pod.name
                        ),
                    );
                }
                if pod.reason.contains("CrashLoopBackOff") {
                    push_unique(
                        &mut recommendations,
                        "Container keeps crashing - check application logs and resource limits"
                            .to_string(),
                    );
                }
            }
            _ => {}
        }

        for issue in &pod.config_issues {
            let rec = match issue {
                ConfigIssue::MissingRequests => "Set resource requests to enable proper scheduling",
                ConfigIssue::MissingLimits => "Set resource limits to prevent resource exhaustion",
                ConfigIssue::NoProbe => "Add liveness/readiness probes for better health checking",
            };
            push_unique(&mut recommendations, rec.to_string());
        }
    }

    recommendations
}

fn push_unique(recommendations: &mut Vec<String>, rec: String) {
    if !recommendations.contains(&rec) {
        recommendations.push(rec);
    }
}

fn status_color(status: PodStatus) -> &'static str {
    match status {
        PodStatus::Healthy => GREEN,
        PodStatus::Warning => YELLOW,
        PodStatus::Error => RED,
        PodStatus::Pending => BLUE,
        PodStatus::Unknown => RESET,
    }
}

fn status_icon(status: PodStatus) -> &'static str {
    match status {
        PodStatus::Healthy => "✓",
        PodStatus::Warning => "⚠",
        PodStatus::Error => "✗",
        PodStatus::Pending => "◷",
        PodStatus::Unknown => "?",
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
