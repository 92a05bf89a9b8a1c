//! Command execution: wires the cluster client, analyzer and printer.

use std::io;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::analyzer::{self, AnalysisOptions, AnalysisResult, EventSummary, PodReport};
use crate::cli::{Cli, OutputFormat};
use crate::k8s::K8sClient;
use crate::printer::Printer;
use crate::{PodviewError, Result};

/// Fetch timeout for a single-namespace query.
const NAMESPACE_TIMEOUT: Duration = Duration::from_secs(30);
/// Cluster-wide queries get more room.
const CLUSTER_TIMEOUT: Duration = Duration::from_secs(60);

pub async fn run(cli: &Cli) -> Result<()> {
    let format: OutputFormat = cli.output.parse()?;

    if cli.all_namespaces && cli.pod.is_some() {
        return Err(PodviewError::ConfigError(
            "a pod cannot be inspected by name across all namespaces".to_string(),
        ));
    }

    let timeout = if cli.all_namespaces {
        CLUSTER_TIMEOUT
    } else {
        NAMESPACE_TIMEOUT
    };
    debug!("Using fetch timeout of {}s", timeout.as_secs());

    // Progress chatter stays on the table path so json/yaml output remains
    // machine-parseable.
    let quiet = format != OutputFormat::Table;

    if !quiet {
        println!("🔗 Connecting to cluster...");
    }
    let client = K8sClient::connect(cli.kubeconfig.as_deref(), timeout).await?;

    let opts = AnalysisOptions {
        check_config: cli.check_config,
        detect_virtual: cli.detect_virtual,
    };

    if let Some(pod_name) = cli.pod.as_deref() {
        return inspect_pod(&client, cli, pod_name, &opts, format, quiet).await;
    }

    let namespace = if cli.all_namespaces {
        None
    } else {
        Some(cli.namespace.as_str())
    };

    if !quiet {
        match namespace {
            None => println!("📦 Fetching pods across all namespaces..."),
            Some(ns) => println!("📦 Fetching pods in namespace '{}'...", ns),
        }
    }

    let pods = client.list_pods(namespace).await?;

    if pods.is_empty() && !quiet {
        if cli.all_namespaces {
            println!("⚠️  No pods found in the cluster");
        } else {
            println!("⚠️  No pods found in namespace '{}'", cli.namespace);
        }
        return Ok(());
    }

    if !quiet {
        println!("🔍 Analyzing {} pods...\n", pods.len());
    }
    let result = analyzer::analyze_pods(&pods, &opts, Utc::now());

    match format {
        OutputFormat::Table => {
            let mut printer = Printer::new(io::stdout());
            printer.print_pod_table(&result, cli.all, cli.all_namespaces)?;
            printer.print_summary(&result)?;
            if result.has_issues() {
                printer.print_recommendations(&result)?;
            }
        }
        OutputFormat::Json => println!("{}", to_json(&result)?),
        OutputFormat::Yaml => print!("{}", to_yaml(&result)?),
    }

    Ok(())
}

/// Single-pod view: one table row (or report document) plus recent events.
async fn inspect_pod(
    client: &K8sClient,
    cli: &Cli,
    pod_name: &str,
    opts: &AnalysisOptions,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        println!(
            "📦 Fetching pod '{}' in namespace '{}'...",
            pod_name, cli.namespace
        );
    }

    let pod = client.get_pod(&cli.namespace, pod_name).await?;

    let now = Utc::now();
    let analysis = analyzer::analyze_pod(&pod, opts, now);
    let events: Vec<EventSummary> = client
        .list_events(&cli.namespace, pod_name)
        .await?
        .iter()
        .map(|event| EventSummary::from_event(event, now))
        .collect();

    match format {
        OutputFormat::Table => {
            let result: AnalysisResult = std::iter::once(analysis).collect();
            let mut printer = Printer::new(io::stdout());
            printer.print_pod_table(&result, true, false)?;
            printer.print_events(&events)?;
        }
        OutputFormat::Json => {
            let report = PodReport {
                pod: analysis,
                events,
            };
            println!("{}", to_json(&report)?);
        }
        OutputFormat::Yaml => {
            let report = PodReport {
                pod: analysis,
                events,
            };
            print!("{}", to_yaml(&report)?);
        }
    }

    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| PodviewError::SerializationError(e.to_string()))
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| PodviewError::SerializationError(e.to_string()))
}
