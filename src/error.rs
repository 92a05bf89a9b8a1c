use thiserror::Error;

#[derive(Error, Debug)]
pub enum PodviewError {
    #[error("Kubeconfig error: {0}")]
    KubeconfigError(String),

    #[error("Kubernetes error: {0}")]
    KubernetesError(String),

    #[error("Pod not found: {name} in namespace {namespace}")]
    PodNotFound { name: String, namespace: String },

    #[error("Timed out after {seconds}s while trying to {operation}")]
    Timeout { operation: String, seconds: u64 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid output format '{0}' (expected table, json or yaml)")]
    InvalidOutputFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PodviewError>;
