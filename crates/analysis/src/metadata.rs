use crate::matcher::AgentDeclaration;
use agentscan_parser::{ObjectLit, ParsedModule};
use serde::{Deserialize, Serialize};

/// Static metadata pulled from an agent declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub declared_name: String,
    pub description: Option<String>,
    /// Source text of `schema.input`, re-embeddable as-is
    pub input_schema_source: Option<String>,
    /// Source text of `schema.output`
    pub output_schema_source: Option<String>,
}

#[must_use]
pub fn extract_agent_metadata(module: &ParsedModule, declaration: &AgentDeclaration<'_>) -> AgentMetadata {
    let config = declaration.config;
    let schema = config.get_object("schema");
    let schema_source = |key: &str| {
        schema
            .and_then(|schema| schema.get(key))
            .map(|node| module.text(node.span).to_string())
    };

    AgentMetadata {
        declared_name: declaration.name.to_string(),
        description: resolve_description(config).map(str::to_string),
        input_schema_source: schema_source("input"),
        output_schema_source: schema_source("output"),
    }
}

/// `description` string on the config wins; `metadata.description` is the fallback.
#[must_use]
pub fn resolve_description(config: &ObjectLit) -> Option<&str> {
    config.get_str("description").or_else(|| {
        config
            .get_object("metadata")
            .and_then(|metadata| metadata.get_str("description"))
    })
}
