use crate::hasher::{ContentHash, IdentityDigest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex characters kept from the identity digest (128 bits).
pub const ID_HEX_LEN: usize = 32;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            fn from_digest(digest: &IdentityDigest) -> Self {
                Self(format!("{}{}", $prefix, digest.truncated_hex(ID_HEX_LEN)))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(
    /// Agent identifier for one (project, deployment, file, content) tuple.
    AgentBuildId,
    "agentid_"
);
id_type!(
    /// Agent identifier keyed by (project, declared name); survives redeploys and edits.
    AgentStableId,
    "agent_"
);
id_type!(
    /// Eval identifier for one (project, deployment, file, eval name, content) tuple.
    EvalBuildId,
    "evalid_"
);
id_type!(
    /// Eval identifier keyed by (project, owning agent stable id, eval name).
    EvalStableId,
    "eval_"
);

/// The (project, deployment) pair every identifier of one discovery run is minted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityScope {
    pub project_id: String,
    pub deployment_id: String,
}

impl IdentityScope {
    pub fn new(project_id: impl Into<String>, deployment_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            deployment_id: deployment_id.into(),
        }
    }

    #[must_use]
    pub fn agent_build_id(&self, source_path: &str, content_version: &ContentHash) -> AgentBuildId {
        AgentBuildId::from_digest(&IdentityDigest::of_parts([
            self.project_id.as_str(),
            self.deployment_id.as_str(),
            source_path,
            content_version.as_str(),
        ]))
    }

    #[must_use]
    pub fn agent_stable_id(&self, declared_name: &str) -> AgentStableId {
        AgentStableId::from_digest(&IdentityDigest::of_parts([
            self.project_id.as_str(),
            declared_name,
        ]))
    }

    #[must_use]
    pub fn eval_build_id(
        &self,
        eval_source_path: &str,
        eval_name: &str,
        content_version: &ContentHash,
    ) -> EvalBuildId {
        EvalBuildId::from_digest(&IdentityDigest::of_parts([
            self.project_id.as_str(),
            self.deployment_id.as_str(),
            eval_source_path,
            eval_name,
            content_version.as_str(),
        ]))
    }

    #[must_use]
    pub fn eval_stable_id(&self, agent: &AgentStableId, eval_name: &str) -> EvalStableId {
        EvalStableId::from_digest(&IdentityDigest::of_parts([
            self.project_id.as_str(),
            agent.as_str(),
            eval_name,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::{assert_eq, assert_ne};

    fn version(text: &str) -> ContentHash {
        ContentHash::of(text)
    }

    #[test]
    fn ids_carry_prefix_and_fixed_length() {
        let scope = IdentityScope::new("p", "d");
        let build = scope.agent_build_id("src/agent/a/agent.ts", &version("x"));
        assert!(build.as_str().starts_with(AgentBuildId::PREFIX));
        assert_eq!(build.as_str().len(), AgentBuildId::PREFIX.len() + ID_HEX_LEN);

        let stable = scope.eval_stable_id(&scope.agent_stable_id("a"), "e");
        assert!(stable.as_str().starts_with("eval_"));
        assert_eq!(stable.as_str().len(), "eval_".len() + ID_HEX_LEN);
    }

    #[test]
    fn agent_build_id_tracks_deployment_path_and_content() {
        let scope = IdentityScope::new("p", "d1");
        let base = scope.agent_build_id("src/agent/a.ts", &version("v1"));

        assert_eq!(base, scope.agent_build_id("src/agent/a.ts", &version("v1")));
        assert_ne!(base, scope.agent_build_id("src/agent/b.ts", &version("v1")));
        assert_ne!(base, scope.agent_build_id("src/agent/a.ts", &version("v2")));

        let redeployed = IdentityScope::new("p", "d2");
        assert_ne!(base, redeployed.agent_build_id("src/agent/a.ts", &version("v1")));
    }

    #[test]
    fn agent_stable_id_ignores_deployment() {
        let first = IdentityScope::new("p", "d1").agent_stable_id("support");
        let second = IdentityScope::new("p", "d2").agent_stable_id("support");
        assert_eq!(first, second);

        let other_project = IdentityScope::new("q", "d1").agent_stable_id("support");
        assert_ne!(first, other_project);
        assert_ne!(first, IdentityScope::new("p", "d1").agent_stable_id("billing"));
    }

    #[test]
    fn eval_ids_follow_their_inputs() {
        let scope = IdentityScope::new("p", "d1");
        let agent = scope.agent_stable_id("support");

        let stable = scope.eval_stable_id(&agent, "politeness");
        assert_eq!(
            stable,
            IdentityScope::new("p", "d9").eval_stable_id(&agent, "politeness")
        );
        assert_ne!(stable, scope.eval_stable_id(&agent, "accuracy"));

        let build = scope.eval_build_id("src/agent/support/eval.ts", "politeness", &version("v1"));
        assert_ne!(
            build,
            scope.eval_build_id("src/agent/support/eval.ts", "politeness", &version("v2"))
        );
        assert_ne!(
            build,
            IdentityScope::new("p", "d2").eval_build_id(
                "src/agent/support/eval.ts",
                "politeness",
                &version("v1")
            )
        );
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = IdentityScope::new("p", "d").agent_stable_id("a");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
