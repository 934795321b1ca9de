//! The `agents[]` portion of the deployment build manifest.

use crate::model::{AgentRecord, EvalRecord, Registry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub agents: Vec<ManifestAgent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestAgent {
    /// Build id
    pub id: String,
    /// Stable id
    pub agent_id: String,
    pub project_id: String,
    pub filename: String,
    pub name: String,
    pub version: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<String>,
    pub evals: Vec<ManifestEval>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEval {
    pub id: String,
    pub eval_id: String,
    pub name: String,
    pub filename: String,
    pub version: String,
    /// Grouping key of the owning agent
    pub identifier: String,
    /// Stable id of the owning agent
    pub agent_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BuildManifest {
    pub fn from_registry(registry: &Registry) -> Self {
        let agents = registry
            .iter()
            .map(|agent| ManifestAgent::from_record(registry.project_id(), agent))
            .collect();
        Self { agents }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl ManifestAgent {
    fn from_record(project_id: &str, agent: &AgentRecord) -> Self {
        Self {
            id: agent.build_id.to_string(),
            agent_id: agent.stable_id.to_string(),
            project_id: project_id.to_string(),
            filename: agent.source_path.clone(),
            name: agent.declared_name.clone(),
            version: agent.content_version.to_string(),
            identifier: agent.identifier.clone(),
            description: agent.description.clone(),
            input_schema: agent.input_schema_source.clone(),
            output_schema: agent.output_schema_source.clone(),
            evals: agent
                .evals
                .iter()
                .map(|eval| ManifestEval::from_record(agent, eval))
                .collect(),
        }
    }
}

impl ManifestEval {
    fn from_record(agent: &AgentRecord, eval: &EvalRecord) -> Self {
        Self {
            id: eval.build_id.to_string(),
            eval_id: eval.stable_id.to_string(),
            name: eval.name.clone(),
            filename: eval.source_path.clone(),
            version: eval.content_version.to_string(),
            identifier: agent.identifier.clone(),
            agent_identifier: eval.owning_agent_stable_id.to_string(),
            description: eval.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentscan_identity::{ContentHash, IdentityScope};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_registry() -> Registry {
        let scope = IdentityScope::new("proj_1", "deploy_1");
        let version = ContentHash::of(b"export default createAgent('support', {})");
        let stable_id = scope.agent_stable_id("support");
        let eval = EvalRecord {
            build_id: scope.eval_build_id("src/agent/support/index.ts", "politeness", &version),
            stable_id: scope.eval_stable_id(&stable_id, "politeness"),
            name: "politeness".to_string(),
            source_path: "src/agent/support/index.ts".to_string(),
            content_version: version.clone(),
            description: None,
            owning_agent_stable_id: stable_id.clone(),
        };
        let agent = AgentRecord {
            source_path: "src/agent/support/index.ts".to_string(),
            declared_name: "support".to_string(),
            build_id: scope.agent_build_id("src/agent/support/index.ts", &version),
            stable_id,
            content_version: version,
            identifier: "support".to_string(),
            description: Some("Answers tickets".to_string()),
            input_schema_source: None,
            output_schema_source: None,
            evals: vec![eval],
        };
        Registry::new(scope, vec![agent])
    }

    #[test]
    fn manifest_mirrors_registry() {
        let registry = sample_registry();
        let manifest = BuildManifest::from_registry(&registry);
        let agent = &registry.agents()[0];

        assert_eq!(manifest.agents.len(), 1);
        let entry = &manifest.agents[0];
        assert_eq!(entry.id, agent.build_id.as_str());
        assert_eq!(entry.agent_id, agent.stable_id.as_str());
        assert_eq!(entry.project_id, "proj_1");
        assert_eq!(entry.filename, "src/agent/support/index.ts");
        assert_eq!(entry.version, agent.content_version.as_str());

        let eval = &entry.evals[0];
        assert_eq!(eval.identifier, "support");
        assert_eq!(eval.agent_identifier, agent.stable_id.as_str());
    }

    #[test]
    fn serializes_camel_case_and_omits_empty_optionals() {
        let manifest = BuildManifest::from_registry(&sample_registry());
        let value = serde_json::to_value(&manifest).unwrap();
        let agent = &value["agents"][0];

        assert_eq!(agent["name"], json!("support"));
        assert_eq!(agent["description"], json!("Answers tickets"));
        assert!(agent.get("agentId").is_some());
        assert!(agent.get("projectId").is_some());
        assert!(agent.get("inputSchema").is_none());
        assert!(agent["evals"][0].get("evalId").is_some());
        assert!(agent["evals"][0].get("description").is_none());

        let parsed: BuildManifest = serde_json::from_str(&manifest.to_json(true).unwrap()).unwrap();
        assert_eq!(parsed, manifest);
    }
}
