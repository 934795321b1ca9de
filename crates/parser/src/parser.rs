use crate::ast::{Node, NodeKind, Span};
use crate::error::{ParseError, Result};
use crate::language::SourceLanguage;
use crate::lower::Lowerer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::Parser;

/// Highest accepted `max_nesting_depth`
pub const MAX_NESTING_DEPTH_LIMIT: usize = 4096;

/// Stack budget per nesting level for the recursive passes over a tree (lowering, visiting,
/// dropping), sized for unoptimised builds
const STACK_BYTES_PER_LEVEL: usize = 16 * 1024;
const BASE_STACK_BYTES: usize = 2 * 1024 * 1024;

/// Tolerance limits for best-effort parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Share of source bytes inside error nodes above which a file is unrecoverable
    pub max_error_ratio: f64,

    /// Deepest syntax nesting accepted
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_error_ratio: 0.5,
            max_nesting_depth: 1024,
        }
    }
}

impl ParserConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.max_error_ratio) {
            return Err(format!(
                "max_error_ratio ({}) must be within 0.0..=1.0",
                self.max_error_ratio
            ));
        }
        if self.max_nesting_depth == 0 {
            return Err("max_nesting_depth must be > 0".to_string());
        }
        if self.max_nesting_depth > MAX_NESTING_DEPTH_LIMIT {
            return Err(format!(
                "max_nesting_depth ({}) must be <= {MAX_NESTING_DEPTH_LIMIT}",
                self.max_nesting_depth
            ));
        }
        Ok(())
    }

    /// Thread stack size that holds a module nested `max_nesting_depth` deep through parsing,
    /// analysis and drop. Threads with the default 2 MiB stack do not.
    #[must_use]
    pub fn required_stack_bytes(&self) -> usize {
        let depth = self.max_nesting_depth.min(MAX_NESTING_DEPTH_LIMIT);
        BASE_STACK_BYTES + depth * STACK_BYTES_PER_LEVEL
    }
}

/// How much repair the parser had to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    pub has_error: bool,
    pub error_nodes: usize,
    pub missing_nodes: usize,
    pub error_bytes: usize,
}

impl ParseDiagnostics {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        !self.has_error
    }
}

/// A parsed module: owned AST plus the text it came from
#[derive(Debug, Clone)]
pub struct ParsedModule {
    source: String,
    language: SourceLanguage,
    root: Node,
    diagnostics: ParseDiagnostics,
}

impl ParsedModule {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn language(&self) -> SourceLanguage {
        self.language
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub const fn diagnostics(&self) -> ParseDiagnostics {
        self.diagnostics
    }

    /// Verbatim source text of `span`; re-parses as the construct it covers
    #[must_use]
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.range()).unwrap_or("")
    }

    /// Top-level statements in source order.
    ///
    /// Statements the parser wrapped in a top-level error node are spliced back in, so one
    /// broken statement does not hide its well-formed neighbours.
    #[must_use]
    pub fn top_level(&self) -> Vec<&Node> {
        let mut statements = Vec::new();
        if let NodeKind::Program(children) | NodeKind::Error(children) = &self.root.kind {
            for child in children {
                match &child.kind {
                    NodeKind::Error(inner) => statements.extend(inner.iter()),
                    _ => statements.push(child),
                }
            }
        }
        statements
    }
}

/// Error-tolerant JavaScript/TypeScript parser
#[derive(Debug, Clone, Default)]
pub struct SourceParser {
    config: ParserConfig,
}

impl SourceParser {
    #[must_use]
    pub const fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a file's contents, picking the grammar from its extension
    pub fn parse_path(&self, source: impl Into<String>, path: impl AsRef<Path>) -> Result<ParsedModule> {
        let language = SourceLanguage::from_path(path)?;
        self.parse(source, language)
    }

    /// Parse source text, repairing what tree-sitter can recover
    pub fn parse(&self, source: impl Into<String>, language: SourceLanguage) -> Result<ParsedModule> {
        let source = source.into();

        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| ParseError::tree_sitter(format!("Failed to set language: {e}")))?;

        let tree = parser.parse(&source, None).ok_or(ParseError::NoTree)?;

        let mut lowerer = Lowerer::new(&source, self.config.max_nesting_depth);
        let root = lowerer.lower(tree.root_node(), 0)?;
        let diagnostics = ParseDiagnostics {
            has_error: tree.root_node().has_error(),
            error_nodes: lowerer.error_nodes,
            missing_nodes: count_missing(&tree),
            error_bytes: lowerer.error_bytes,
        };

        self.check_recoverable(&source, diagnostics)?;
        if !diagnostics.is_clean() {
            log::debug!(
                "Recovered from {} error and {} missing nodes ({} bytes)",
                diagnostics.error_nodes,
                diagnostics.missing_nodes,
                diagnostics.error_bytes
            );
        }

        Ok(ParsedModule {
            source,
            language,
            root,
            diagnostics,
        })
    }

    fn check_recoverable(&self, source: &str, diagnostics: ParseDiagnostics) -> Result<()> {
        let total_bytes = source.trim().len();
        if total_bytes == 0 || diagnostics.error_bytes == 0 {
            return Ok(());
        }

        let ratio = diagnostics.error_bytes as f64 / total_bytes as f64;
        if ratio > self.config.max_error_ratio {
            return Err(ParseError::Unrecoverable {
                error_bytes: diagnostics.error_bytes,
                total_bytes,
            });
        }
        Ok(())
    }
}

/// Missing tokens are mostly anonymous, so count them over the full tree
fn count_missing(tree: &tree_sitter::Tree) -> usize {
    let mut cursor = tree.walk();
    let mut missing = 0;
    loop {
        if cursor.node().is_missing() {
            missing += 1;
        }
        if cursor.goto_first_child() || cursor.goto_next_sibling() {
            continue;
        }
        loop {
            if !cursor.goto_parent() {
                return missing;
            }
            if cursor.goto_next_sibling() {
                break;
            }
        }
    }
}
