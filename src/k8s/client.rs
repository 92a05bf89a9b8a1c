use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use tracing::{debug, info};

use crate::{PodviewError, Result};

/// Read-only access to the cluster. Every call is bounded by the timeout
/// given at construction; a single failure surfaces immediately, nothing is
/// retried here.
pub struct K8sClient {
    client: Client,
    timeout: Duration,
}

impl K8sClient {
    /// Connects using an explicit kubeconfig path when given, otherwise the
    /// usual resolution order ($KUBECONFIG, ~/.kube/config, in-cluster).
    pub async fn connect(kubeconfig: Option<&Path>, timeout: Duration) -> Result<Self> {
        debug!("Initializing Kubernetes client");

        let client = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    PodviewError::KubeconfigError(format!(
                        "Failed to read kubeconfig {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await
                        .map_err(|e| {
                            PodviewError::KubeconfigError(format!(
                                "Failed to load kubeconfig {}: {}",
                                path.display(),
                                e
                            ))
                        })?;
                Client::try_from(config).map_err(|e| {
                    PodviewError::KubeconfigError(format!("Failed to create client: {}", e))
                })?
            }
            None => Client::try_default().await.map_err(|e| {
                PodviewError::KubeconfigError(format!("Failed to create client: {}", e))
            })?,
        };

        info!("Connected to Kubernetes cluster");
        Ok(Self { client, timeout })
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn pods_all(&self) -> Api<Pod> {
        Api::all(self.client.clone())
    }

    /// Lists pods in one namespace, or cluster-wide when `namespace` is None.
    pub async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>> {
        let api = match namespace {
            Some(ns) => self.pods(ns),
            None => self.pods_all(),
        };

        match tokio::time::timeout(self.timeout, api.list(&ListParams::default())).await {
            Ok(Ok(pod_list)) => {
                debug!("Listed {} pods", pod_list.items.len());
                Ok(pod_list.items)
            }
            Ok(Err(e)) => Err(PodviewError::KubernetesError(format!(
                "Failed to list pods: {}",
                e
            ))),
            Err(_) => Err(self.timeout_error("list pods")),
        }
    }

    pub async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        debug!("Fetching pod {}/{}", namespace, name);

        match tokio::time::timeout(self.timeout, self.pods(namespace).get(name)).await {
            Ok(Ok(pod)) => Ok(pod),
            Ok(Err(kube::Error::Api(ae))) if ae.code == 404 => Err(PodviewError::PodNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            }),
            Ok(Err(e)) => Err(PodviewError::KubernetesError(format!(
                "Failed to get pod {}/{}: {}",
                namespace, name, e
            ))),
            Err(_) => Err(self.timeout_error("get pod")),
        }
    }

    /// Events involving the named pod, most recent first.
    pub async fn list_events(&self, namespace: &str, pod_name: &str) -> Result<Vec<Event>> {
        let api: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().fields(&format!("involvedObject.name={}", pod_name));

        match tokio::time::timeout(self.timeout, api.list(&params)).await {
            Ok(Ok(event_list)) => {
                let mut events = event_list.items;
                events.sort_by(|a, b| event_time(b).cmp(&event_time(a)));
                Ok(events)
            }
            Ok(Err(e)) => Err(PodviewError::KubernetesError(format!(
                "Failed to list events for {}/{}: {}",
                namespace, pod_name, e
            ))),
            Err(_) => Err(self.timeout_error("list events")),
        }
    }

    fn timeout_error(&self, operation: &str) -> PodviewError {
        PodviewError::Timeout {
            operation: operation.to_string(),
            seconds: self.timeout.as_secs(),
        }
    }
}

fn event_time(event: &Event) -> Option<DateTime<Utc>> {
    event
        .last_timestamp
        .as_ref()
        .map(|t| t.0)
        .or_else(|| event.event_time.as_ref().map(|t| t.0))
        .or_else(|| event.first_timestamp.as_ref().map(|t| t.0))
}
