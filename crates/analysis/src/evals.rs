use agentscan_parser::{walk_node, CallExpr, Node, ParsedModule, Span, Visitor};
use serde::{Deserialize, Serialize};

/// Method whose calls register an eval
pub const EVAL_METHOD: &str = "createEval";

/// Syntactic form an eval registration was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalShape {
    /// `x.createEval("name", { ... })`
    NameAndConfig,
    /// `x.createEval(preset(...))`
    PresetCall,
    /// `x.createEval({ name: "...", ... })`
    ConfigObject,
}

/// Name and description resolved from one registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalFields {
    pub name: String,
    pub description: Option<String>,
}

/// An eval registration found in a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalDeclaration {
    pub name: String,
    pub description: Option<String>,
    pub shape: EvalShape,
    /// Span of the `createEval(...)` call
    pub span: Span,
}

/// One recognised registration form: a shape predicate plus a field extractor.
///
/// `extract` runs only when `matches` holds; returning `None` there means the call looked
/// right but carried no usable name.
pub trait EvalPattern: Send + Sync {
    fn shape(&self) -> EvalShape;

    /// Argument shape check on a `<expr>.createEval(...)` call
    fn matches(&self, call: &CallExpr) -> bool;

    fn extract(&self, call: &CallExpr) -> Option<EvalFields>;
}

/// `x.createEval("name", { metadata: { description } })`
#[derive(Debug, Clone, Copy, Default)]
pub struct NameAndConfigPattern;

impl EvalPattern for NameAndConfigPattern {
    fn shape(&self) -> EvalShape {
        EvalShape::NameAndConfig
    }

    fn matches(&self, call: &CallExpr) -> bool {
        call.arguments.len() >= 2
            && call.arguments[0].as_string_literal().is_some()
            && call.arguments[1].as_object().is_some()
    }

    fn extract(&self, call: &CallExpr) -> Option<EvalFields> {
        let name = call.argument(0)?.as_string_literal()?;
        let description = call
            .argument(1)
            .and_then(Node::as_object)
            .and_then(|config| config.get_object("metadata"))
            .and_then(|metadata| metadata.get_str("description"));

        Some(EvalFields {
            name: name.to_string(),
            description: description.map(str::to_string),
        })
    }
}

/// `x.createEval(politeness({ name, description }))`, falling back to the preset's name
#[derive(Debug, Clone, Copy, Default)]
pub struct PresetCallPattern;

impl EvalPattern for PresetCallPattern {
    fn shape(&self) -> EvalShape {
        EvalShape::PresetCall
    }

    fn matches(&self, call: &CallExpr) -> bool {
        call.arguments.len() == 1 && call.arguments[0].as_call().is_some()
    }

    fn extract(&self, call: &CallExpr) -> Option<EvalFields> {
        let preset = call.argument(0)?.as_call()?;

        let named_override = preset
            .arguments
            .iter()
            .filter_map(Node::as_object)
            .find_map(|options| {
                options.get_str("name").map(|name| EvalFields {
                    name: name.to_string(),
                    description: options.get_str("description").map(str::to_string),
                })
            });

        named_override.or_else(|| {
            preset.callee_identifier().map(|name| EvalFields {
                name: name.to_string(),
                description: None,
            })
        })
    }
}

/// `x.createEval({ name: "...", description: "..." })`
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigObjectPattern;

impl EvalPattern for ConfigObjectPattern {
    fn shape(&self) -> EvalShape {
        EvalShape::ConfigObject
    }

    fn matches(&self, call: &CallExpr) -> bool {
        call.arguments.len() == 1 && call.arguments[0].as_object().is_some()
    }

    fn extract(&self, call: &CallExpr) -> Option<EvalFields> {
        let config = call.argument(0)?.as_object()?;
        let name = config.get_str("name")?;
        Some(EvalFields {
            name: name.to_string(),
            description: config.get_str("description").map(str::to_string),
        })
    }
}

/// Walks a whole module and collects eval registrations
pub struct EvalDiscoverer {
    patterns: Vec<Box<dyn EvalPattern>>,
}

impl Default for EvalDiscoverer {
    fn default() -> Self {
        Self::with_patterns(vec![
            Box::new(NameAndConfigPattern),
            Box::new(PresetCallPattern),
            Box::new(ConfigObjectPattern),
        ])
    }
}

impl EvalDiscoverer {
    #[must_use]
    pub fn with_patterns(patterns: Vec<Box<dyn EvalPattern>>) -> Self {
        Self { patterns }
    }

    /// Registrations in tree-walk order; calls without a resolvable name are dropped
    #[must_use]
    pub fn discover(&self, module: &ParsedModule) -> Vec<EvalDeclaration> {
        let mut collector = EvalCollector {
            discoverer: self,
            found: Vec::new(),
        };
        collector.visit_node(module.root());
        collector.found
    }

    /// Classify a single call; `None` when it is not a named eval registration
    #[must_use]
    pub fn classify(&self, call: &CallExpr, span: Span) -> Option<EvalDeclaration> {
        if call.method_name() != Some(EVAL_METHOD) {
            return None;
        }

        let Some(pattern) = self.patterns.iter().find(|pattern| pattern.matches(call)) else {
            log::debug!("Discarding {EVAL_METHOD}() call at byte {}: unrecognised arguments", span.start);
            return None;
        };

        let Some(fields) = pattern.extract(call) else {
            log::debug!(
                "Discarding {EVAL_METHOD}() call at byte {}: no resolvable name ({:?})",
                span.start,
                pattern.shape()
            );
            return None;
        };

        Some(EvalDeclaration {
            name: fields.name,
            description: fields.description,
            shape: pattern.shape(),
            span,
        })
    }
}

struct EvalCollector<'d> {
    discoverer: &'d EvalDiscoverer,
    found: Vec<EvalDeclaration>,
}

impl Visitor for EvalCollector<'_> {
    fn visit_node(&mut self, node: &Node) {
        if let Some(call) = node.as_call() {
            if let Some(declaration) = self.discoverer.classify(call, node.span) {
                self.found.push(declaration);
            }
        }
        walk_node(self, node);
    }
}
