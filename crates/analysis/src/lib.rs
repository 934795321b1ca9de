//! # Agentscan Analysis
//!
//! Finds agent declarations and eval registrations in parsed modules.
//!
//! ## Pipeline
//!
//! ```text
//! ParsedModule
//!     │
//!     ├──> Call-pattern matcher (top-level statements only)
//!     │      ├─> export default createAgent("name", { ... })
//!     │      └─> const x = createAgent("name", { ... })
//!     │
//!     ├──> Metadata extractor
//!     │      └─> name, description, schema.input / schema.output source text
//!     │
//!     └──> Eval discoverer (every node of the tree)
//!            ├─> x.createEval("name", { ... })
//!            ├─> x.createEval(preset({ name: "..." }))  /  x.createEval(preset())
//!            └─> x.createEval({ name: "...", ... })
//! ```
//!
//! Nothing here fails: shapes that do not match are simply not reported.

mod evals;
mod matcher;
mod metadata;

pub use evals::{
    ConfigObjectPattern, EvalDeclaration, EvalDiscoverer, EvalFields, EvalPattern, EvalShape,
    NameAndConfigPattern, PresetCallPattern, EVAL_METHOD,
};
pub use matcher::{find_agent_declaration, AgentDeclaration, DeclarationShape, AGENT_FACTORY};
pub use metadata::{extract_agent_metadata, resolve_description, AgentMetadata};

use agentscan_identity::ContentHash;
use agentscan_parser::ParsedModule;

/// Everything one source file contributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnalysis {
    /// Content hash of the full file text
    pub content_version: ContentHash,
    /// First agent declaration, if any
    pub agent: Option<AgentMetadata>,
    /// Eval registrations in tree-walk order
    pub evals: Vec<EvalDeclaration>,
}

impl FileAnalysis {
    /// Analyze a file that may declare an agent
    #[must_use]
    pub fn of_agent_file(module: &ParsedModule) -> Self {
        let agent = find_agent_declaration(module)
            .map(|declaration| extract_agent_metadata(module, &declaration));
        Self {
            content_version: ContentHash::of(module.source()),
            agent,
            evals: EvalDiscoverer::default().discover(module),
        }
    }

    /// Analyze a sibling eval file; agent declarations in it are not looked for
    #[must_use]
    pub fn of_eval_file(module: &ParsedModule) -> Self {
        Self {
            content_version: ContentHash::of(module.source()),
            agent: None,
            evals: EvalDiscoverer::default().discover(module),
        }
    }
}
