use chrono::{Duration, TimeZone, Utc};
use k8s_openapi::api::core::v1::{
    Container, ContainerState, ContainerStateWaiting, ContainerStatus, Pod, PodSpec,
    PodStatus as KubePodStatus,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use podview::analyzer::{analyze_pods, AnalysisOptions, PodStatus};
use podview::error::PodviewError;
use podview::printer::Printer;

#[test]
fn test_error_types() {
    let err = PodviewError::PodNotFound {
        name: "test-pod".to_string(),
        namespace: "default".to_string(),
    };

    assert!(err.to_string().contains("test-pod"));
    assert!(err.to_string().contains("default"));

    let err = PodviewError::Timeout {
        operation: "list pods".to_string(),
        seconds: 30,
    };
    assert!(err.to_string().contains("30s"));
    assert!(err.to_string().contains("list pods"));
}

#[test]
fn test_version_const() {
    assert!(!podview::VERSION.is_empty());
}

fn pod(name: &str, namespace: &str, phase: &str) -> Pod {
    let mut pod = Pod::default();
    pod.metadata.name = Some(name.to_string());
    pod.metadata.namespace = Some(namespace.to_string());
    pod.metadata.creation_timestamp = Some(Time(
        Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap(),
    ));
    pod.spec = Some(PodSpec {
        containers: vec![Container {
            name: "app".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    });
    pod.status = Some(KubePodStatus {
        phase: Some(phase.to_string()),
        ..Default::default()
    });
    pod
}

fn ready_status() -> ContainerStatus {
    ContainerStatus {
        name: "app".to_string(),
        ready: true,
        restart_count: 0,
        ..Default::default()
    }
}

#[test]
fn test_analyze_and_render_pipeline() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let mut healthy = pod("web", "default", "Running");
    if let Some(status) = healthy.status.as_mut() {
        status.container_statuses = Some(vec![ready_status()]);
    }

    let mut crashing = pod("worker", "default", "Running");
    if let Some(status) = crashing.status.as_mut() {
        status.container_statuses = Some(vec![ContainerStatus {
            name: "app".to_string(),
            ready: false,
            restart_count: 14,
            state: Some(ContainerState {
                waiting: Some(ContainerStateWaiting {
                    reason: Some("CrashLoopBackOff".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);
    }

    let pending = pod("batch", "default", "Pending");

    let result = analyze_pods(
        &[healthy, crashing, pending],
        &AnalysisOptions::default(),
        now,
    );

    assert_eq!(result.total_pods, 3);
    assert_eq!(result.healthy_pods, 1);
    assert_eq!(result.warning_pods, 1);
    assert_eq!(result.pending_pods, 1);
    assert_eq!(result.total_restarts, 14);
    assert!(result.has_issues());

    let crashing = &result.pods[1];
    assert_eq!(crashing.status, PodStatus::Warning);
    assert_eq!(crashing.reason, "CrashLoopBackOff");
    assert_eq!(crashing.age, "6h0m");

    let mut buf = Vec::new();
    let mut printer = Printer::new(&mut buf);
    printer.print_pod_table(&result, false, false).unwrap();
    printer.print_summary(&result).unwrap();
    printer.print_recommendations(&result).unwrap();
    let out = String::from_utf8(buf).unwrap();

    // Healthy pod is filtered out of the table, the rest show up.
    assert!(!out.contains("web"));
    assert!(out.contains("worker"));
    assert!(out.contains("batch"));
    assert!(out.contains("Total Pods:     3"));
    assert!(out.contains("Container keeps crashing"));
    assert!(out.contains("kubectl logs worker --previous"));
}

#[test]
fn test_detection_pass_end_to_end() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let mut on_virtual = pod("serverless", "prod", "Running");
    on_virtual.metadata.annotations = Some(
        [(
            "k8s.aliyun.com/eci-instance-id".to_string(),
            "eci-8vb7jtfxv0aqtjbbsirn".to_string(),
        )]
        .into_iter()
        .collect(),
    );
    if let Some(status) = on_virtual.status.as_mut() {
        status.container_statuses = Some(vec![ready_status()]);
        status.conditions = Some(vec![k8s_openapi::api::core::v1::PodCondition {
            type_: "Ready".to_string(),
            status: "True".to_string(),
            last_transition_time: Some(Time(now - Duration::hours(2))),
            ..Default::default()
        }]);
    }

    let opts = AnalysisOptions {
        check_config: false,
        detect_virtual: true,
    };
    let result = analyze_pods(&[on_virtual], &opts, now);

    assert_eq!(result.virtual_pod_count, 1);
    let analysis = &result.pods[0];
    assert!(analysis.virtual_node);
    assert_eq!(analysis.instance_id.as_deref(), Some("eci-8vb7jtfxv0aqtjbbsirn"));
    assert_eq!(analysis.running_time.as_deref(), Some("2h0m"));

    let mut buf = Vec::new();
    let mut printer = Printer::new(&mut buf);
    printer.print_pod_table(&result, true, true).unwrap();
    printer.print_summary(&result).unwrap();
    let out = String::from_utf8(buf).unwrap();

    assert!(out.contains("NAMESPACE"));
    assert!(out.contains("RUNNING"));
    assert!(out.contains("VIRTUAL"));
    assert!(out.contains("Virtual Pods:   1"));
    assert!(out.contains("(100.0%)"));
}
