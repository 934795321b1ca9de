//! # Agentscan Identity
//!
//! Content hashing and identifier derivation for discovered agents and evals.
//!
//! Two digests exist and they never share a type:
//!
//! - [`ContentHash`]: SHA-256 over file bytes. Surfaces as an entity's content version.
//! - [`IdentityDigest`]: BLAKE3 (derive-key mode) over length-prefixed string parts. Used only
//!   inside [`IdentityScope`] to mint identifiers.
//!
//! ```text
//! agent build id  = derive(project, deployment, source_path, content_version)
//! agent stable id = derive(project, declared_name)
//! eval build id   = derive(project, deployment, eval_source_path, eval_name, content_version)
//! eval stable id  = derive(project, agent_stable_id, eval_name)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use agentscan_identity::{ContentHash, IdentityScope};
//!
//! let scope = IdentityScope::new("proj_1", "deploy_7");
//! let version = ContentHash::of("export default createAgent('hello', {});");
//! let build = scope.agent_build_id("src/agent/hello/agent.ts", &version);
//! let stable = scope.agent_stable_id("hello");
//!
//! assert!(build.as_str().starts_with("agentid_"));
//! assert!(stable.as_str().starts_with("agent_"));
//! ```

mod hasher;
mod ids;

pub use hasher::{ContentHash, IdentityDigest};
pub use ids::{AgentBuildId, AgentStableId, EvalBuildId, EvalStableId, IdentityScope, ID_HEX_LEN};
