//! # Agentscan Parser
//!
//! Error-tolerant parsing of JavaScript/TypeScript modules into a small owned AST.
//!
//! ## Architecture
//!
//! ```text
//! Source text
//!     │
//!     ├──> Language detection (from extension)
//!     │
//!     ├──> Tree-sitter parse (recovers from syntax errors)
//!     │
//!     ├──> Lowering → Node { span, kind: NodeKind }
//!     │    ├─> ERROR / MISSING nodes become NodeKind::Error placeholders
//!     │    └─> error coverage measured; too much → ParseError::Unrecoverable
//!     │
//!     └──> ParsedModule (AST + source text for span re-printing)
//! ```
//!
//! Traversals go through [`Visitor`] and [`walk_node`], which visit every node of the tree.
//!
//! ## Example
//!
//! ```rust
//! use agentscan_parser::{NodeKind, SourceLanguage, SourceParser};
//!
//! let parser = SourceParser::default();
//! let module = parser
//!     .parse("export default createAgent('hello', {});", SourceLanguage::TypeScript)
//!     .unwrap();
//!
//! assert!(matches!(module.top_level()[0].kind, NodeKind::ExportDefault(_)));
//! ```

mod ast;
mod error;
mod language;
mod literal;
mod lower;
mod parser;
mod visit;

pub use ast::{CallExpr, Declarator, Node, NodeKind, ObjectLit, ObjectMember, Span};
pub use error::{ParseError, Result};
pub use language::SourceLanguage;
pub use parser::{
    ParseDiagnostics, ParsedModule, ParserConfig, SourceParser, MAX_NESTING_DEPTH_LIMIT,
};
pub use visit::{walk_node, Visitor};
