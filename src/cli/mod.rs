pub mod run;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::PodviewError;

#[derive(Parser)]
#[command(name = "kubectl-podview")]
#[command(author = "FishPie-HQ")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "View pod health, restarts and resource configuration at a glance")]
#[command(
    long_about = "kubectl-podview inspects the pods of a namespace (or the whole cluster)\n\
                  and prints a health summary: status classification with reasons,\n\
                  restart counts, resource configuration gaps and virtual (serverless)\n\
                  node placement, followed by actionable recommendations.\n\n\
                  Pass a pod name to inspect a single pod along with its recent events."
)]
pub struct Cli {
    #[arg(help = "Pod name to inspect (lists the whole namespace when omitted)")]
    pub pod: Option<String>,

    #[arg(
        short,
        long,
        default_value = "default",
        help = "Kubernetes namespace to inspect"
    )]
    pub namespace: String,

    #[arg(short = 'A', long, help = "Query all namespaces")]
    pub all_namespaces: bool,

    #[arg(short, long, help = "Show all pods, including healthy ones")]
    pub all: bool,

    #[arg(long, help = "Check and highlight resource configuration issues")]
    pub check_config: bool,

    #[arg(long, help = "Detect pods scheduled onto virtual (serverless) nodes")]
    pub detect_virtual: bool,

    #[arg(long, help = "Path to kubeconfig file (default: ~/.kube/config)")]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        short,
        long,
        default_value = "table",
        help = "Output format (table, json, yaml)"
    )]
    pub output: String,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PodviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => Err(PodviewError::InvalidOutputFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
