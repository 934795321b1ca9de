use agentscan_identity::{
    AgentBuildId, AgentStableId, ContentHash, EvalBuildId, EvalStableId, IdentityScope,
};
use serde::{Deserialize, Serialize};

/// One discovered agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Repo-relative path of the defining file
    pub source_path: String,
    /// First argument of the `createAgent` call, verbatim; not unique across files
    pub declared_name: String,
    pub build_id: AgentBuildId,
    pub stable_id: AgentStableId,
    pub content_version: ContentHash,
    /// Deployment grouping key (agent directory under the agent root)
    pub identifier: String,
    pub description: Option<String>,
    pub input_schema_source: Option<String>,
    pub output_schema_source: Option<String>,
    /// Inline evals first, then evals from the sibling eval file
    pub evals: Vec<EvalRecord>,
}

/// One discovered eval registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRecord {
    pub build_id: EvalBuildId,
    pub stable_id: EvalStableId,
    pub name: String,
    /// File the registration appears in (the agent file or its sibling eval file)
    pub source_path: String,
    pub content_version: ContentHash,
    pub description: Option<String>,
    /// Lookup key of the agent that registered this eval
    pub owning_agent_stable_id: AgentStableId,
}

/// Immutable snapshot of one discovery run, ordered by `source_path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    scope: IdentityScope,
    agents: Vec<AgentRecord>,
}

impl Registry {
    pub(crate) fn new(scope: IdentityScope, mut agents: Vec<AgentRecord>) -> Self {
        agents.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        Self { scope, agents }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.scope.project_id
    }

    #[must_use]
    pub fn deployment_id(&self) -> &str {
        &self.scope.deployment_id
    }

    #[must_use]
    pub fn agents(&self) -> &[AgentRecord] {
        &self.agents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentRecord> {
        self.agents.iter()
    }

    /// First agent with the given stable id; duplicates across files are not rejected
    #[must_use]
    pub fn find_by_stable_id(&self, stable_id: &AgentStableId) -> Option<&AgentRecord> {
        self.agents.iter().find(|agent| &agent.stable_id == stable_id)
    }

    #[must_use]
    pub fn find_by_path(&self, source_path: &str) -> Option<&AgentRecord> {
        self.agents
            .iter()
            .find(|agent| agent.source_path == source_path)
    }

    /// All evals with their owning agent, in registry order
    pub fn evals(&self) -> impl Iterator<Item = (&AgentRecord, &EvalRecord)> {
        self.agents
            .iter()
            .flat_map(|agent| agent.evals.iter().map(move |eval| (agent, eval)))
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a AgentRecord;
    type IntoIter = std::slice::Iter<'a, AgentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}
