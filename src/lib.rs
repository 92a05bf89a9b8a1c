pub mod analyzer;
pub mod cli;
pub mod error;
pub mod k8s;
pub mod printer;

pub use error::{PodviewError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
