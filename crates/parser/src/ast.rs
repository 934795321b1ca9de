use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte range into the module source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// One syntax node with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
}

/// Closed set of node kinds the analysis cares about.
///
/// Everything else is kept as [`NodeKind::Other`] so recursive walks still reach nested code.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Module root; children are the top-level statements
    Program(Vec<Node>),

    /// `export default <expr>`
    ExportDefault(Box<Node>),

    /// `const` / `let` / `var` declaration, `exported` when written as `export const ...`
    VariableDeclaration {
        exported: bool,
        declarators: Vec<Declarator>,
    },

    /// `<callee>(<arguments>)`
    Call(CallExpr),

    /// `<object>.<property>`, including optional chaining
    Member { object: Box<Node>, property: String },

    Identifier(String),

    /// Decoded value of a quoted string literal
    StringLiteral(String),

    Object(ObjectLit),

    /// Any other construct; `kind` is the grammar's node name
    Other {
        kind: &'static str,
        children: Vec<Node>,
    },

    /// Placeholder for source the parser had to skip or invent
    Error(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Node>,
    pub arguments: Vec<Node>,
}

impl CallExpr {
    /// Callee name when the callee is a bare identifier
    #[must_use]
    pub fn callee_identifier(&self) -> Option<&str> {
        self.callee.as_identifier()
    }

    /// Property name when the callee is a member access (`x.y(...)`)
    #[must_use]
    pub fn method_name(&self) -> Option<&str> {
        match &self.callee.kind {
            NodeKind::Member { property, .. } => Some(property),
            _ => None,
        }
    }

    #[must_use]
    pub fn argument(&self, index: usize) -> Option<&Node> {
        self.arguments.get(index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub span: Span,
    /// Identifier or destructuring pattern
    pub binding: Node,
    pub init: Option<Node>,
}

impl Declarator {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.binding.as_identifier()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectLit {
    pub members: Vec<ObjectMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    /// `key: value` or shorthand `key`, with a statically known key
    Property { span: Span, key: String, value: Node },
    /// Spread, method, computed key
    Other(Node),
}

impl ObjectLit {
    /// Value of the first property named `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.members.iter().find_map(|member| match member {
            ObjectMember::Property { key: k, value, .. } if k == key => Some(value),
            _ => None,
        })
    }

    /// Value of `key` when it is a string literal
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_string_literal)
    }

    /// Value of `key` when it is an object literal
    #[must_use]
    pub fn get_object(&self, key: &str) -> Option<&ObjectLit> {
        self.get(key).and_then(Node::as_object)
    }
}

impl Node {
    #[must_use]
    pub const fn new(span: Span, kind: NodeKind) -> Self {
        Self { span, kind }
    }

    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_string_literal(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::StringLiteral(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectLit> {
        match &self.kind {
            NodeKind::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_call(&self) -> Option<&CallExpr> {
        match &self.kind {
            NodeKind::Call(call) => Some(call),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NodeKind::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(value: &str) -> Node {
        Node::new(Span::default(), NodeKind::StringLiteral(value.to_string()))
    }

    fn property(key: &str, value: Node) -> ObjectMember {
        ObjectMember::Property {
            span: Span::default(),
            key: key.to_string(),
            value,
        }
    }

    #[test]
    fn object_lookup_takes_first_occurrence() {
        let object = ObjectLit {
            members: vec![
                property("name", string("first")),
                property("name", string("second")),
            ],
        };
        assert_eq!(object.get_str("name"), Some("first"));
        assert_eq!(object.get_str("missing"), None);
    }

    #[test]
    fn typed_lookups_reject_other_kinds() {
        let object = ObjectLit {
            members: vec![property(
                "description",
                Node::new(Span::default(), NodeKind::Identifier("x".into())),
            )],
        };
        assert!(object.get("description").is_some());
        assert_eq!(object.get_str("description"), None);
        assert!(object.get_object("description").is_none());
    }

    #[test]
    fn span_helpers() {
        let span = Span::new(4, 10);
        assert_eq!(span.len(), 6);
        assert_eq!(span.range(), 4..10);
        assert!(Span::new(3, 3).is_empty());
    }
}
