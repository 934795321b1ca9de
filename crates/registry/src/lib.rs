//! # Agentscan Registry
//!
//! Walks a project's agent directory and builds the immutable agent/eval registry.
//!
//! ## Pipeline
//!
//! ```text
//! Project root
//!     │
//!     ├──> Agent file scanner (.gitignore aware, src/agent by default)
//!     │      └─> Candidate source files
//!     │
//!     ├──> Per-file analysis (bounded concurrency)
//!     │      ├─> Tolerant parse + agent/eval extraction
//!     │      └─> Sibling eval file (eval.ts next to the agent)
//!     │
//!     └──> Registry (sorted by source path)
//!            └─> BuildManifest JSON
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use agentscan_registry::{discover, BuildManifest, DiscoveryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let report = discover("/path/to/project", "proj_1", "deploy_1", &DiscoveryConfig::default()).await?;
//!     for skipped in &report.skipped {
//!         eprintln!("skipped {}", skipped.path);
//!     }
//!
//!     let manifest = BuildManifest::from_registry(&report.registry);
//!     println!("{}", manifest.to_json(true)?);
//!     Ok(())
//! }
//! ```

mod config;
mod discovery;
mod error;
mod limits;
mod manifest;
mod model;
mod scanner;

pub use config::DiscoveryConfig;
pub use discovery::{discover, DiscoveryReport};
pub use error::{ConfigError, DiscoveryError, Result, SkipReason, SkippedFile};
pub use limits::{default_concurrency, CONCURRENCY_ENV};
pub use manifest::{BuildManifest, ManifestAgent, ManifestEval};
pub use model::{AgentRecord, EvalRecord, Registry};
pub use scanner::AgentFileScanner;
