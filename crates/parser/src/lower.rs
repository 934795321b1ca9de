use crate::ast::{CallExpr, Declarator, Node, NodeKind, ObjectLit, ObjectMember, Span};
use crate::error::{ParseError, Result};
use crate::literal::StringDecoder;
use tree_sitter::Node as TsNode;

/// Lowers a tree-sitter concrete tree into the owned AST while measuring error coverage.
pub(crate) struct Lowerer<'src> {
    source: &'src str,
    max_depth: usize,
    /// Nesting of ERROR nodes around the current position
    error_depth: usize,
    pub(crate) error_bytes: usize,
    pub(crate) error_nodes: usize,
}

impl<'src> Lowerer<'src> {
    pub(crate) fn new(source: &'src str, max_depth: usize) -> Self {
        Self {
            source,
            max_depth,
            error_depth: 0,
            error_bytes: 0,
            error_nodes: 0,
        }
    }

    pub(crate) fn lower(&mut self, node: TsNode<'_>, depth: usize) -> Result<Node> {
        if depth > self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
            });
        }
        let span = Span::new(node.start_byte(), node.end_byte());

        if node.is_missing() {
            return Ok(Node::new(span, NodeKind::Error(Vec::new())));
        }
        if node.is_error() {
            return self.lower_error(node, span, depth);
        }

        let kind = match node.kind() {
            "program" => NodeKind::Program(self.lower_children(node, depth)?),
            "export_statement" => self.lower_export(node, depth)?,
            "lexical_declaration" | "variable_declaration" => {
                self.lower_declaration(node, false, depth)?
            }
            "call_expression" => self.lower_call(node, depth)?,
            "member_expression" => self.lower_member(node, depth)?,
            "identifier" => NodeKind::Identifier(self.text(node).to_string()),
            "string" => NodeKind::StringLiteral(self.string_value(node)),
            "object" => NodeKind::Object(self.lower_object(node, depth)?),
            kind => self.lower_other(kind, node, depth)?,
        };

        Ok(Node::new(span, kind))
    }

    fn lower_error(&mut self, node: TsNode<'_>, span: Span, depth: usize) -> Result<Node> {
        self.error_nodes += 1;
        if self.error_depth == 0 {
            self.error_bytes += span.len();
        }
        self.error_depth += 1;
        let children = self.lower_children(node, depth);
        self.error_depth -= 1;
        Ok(Node::new(span, NodeKind::Error(children?)))
    }

    fn lower_children(&mut self, node: TsNode<'_>, depth: usize) -> Result<Vec<Node>> {
        let mut cursor = node.walk();
        let children: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();

        children
            .into_iter()
            .map(|child| self.lower(child, depth + 1))
            .collect()
    }

    fn lower_other(&mut self, kind: &'static str, node: TsNode<'_>, depth: usize) -> Result<NodeKind> {
        Ok(NodeKind::Other {
            kind,
            children: self.lower_children(node, depth)?,
        })
    }

    fn lower_export(&mut self, node: TsNode<'_>, depth: usize) -> Result<NodeKind> {
        let mut cursor = node.walk();
        let is_default = node.children(&mut cursor).any(|child| child.kind() == "default");

        if is_default {
            if let Some(value) = node.child_by_field_name("value") {
                let value = self.lower(value, depth + 1)?;
                return Ok(NodeKind::ExportDefault(Box::new(value)));
            }
        } else if let Some(declaration) = node.child_by_field_name("declaration") {
            if matches!(
                declaration.kind(),
                "lexical_declaration" | "variable_declaration"
            ) {
                return self.lower_declaration(declaration, true, depth + 1);
            }
        }

        self.lower_other("export_statement", node, depth)
    }

    fn lower_declaration(
        &mut self,
        node: TsNode<'_>,
        exported: bool,
        depth: usize,
    ) -> Result<NodeKind> {
        let mut cursor = node.walk();
        let children: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();

        if children
            .iter()
            .any(|child| child.kind() != "variable_declarator")
        {
            return self.lower_other(node.kind(), node, depth);
        }

        let mut declarators = Vec::with_capacity(children.len());
        for child in children {
            let span = Span::new(child.start_byte(), child.end_byte());
            let binding = match child.child_by_field_name("name") {
                Some(name) => self.lower(name, depth + 2)?,
                None => Node::new(Span::new(span.start, span.start), NodeKind::Error(Vec::new())),
            };
            let init = child
                .child_by_field_name("value")
                .map(|value| self.lower(value, depth + 2))
                .transpose()?;
            declarators.push(Declarator {
                span,
                binding,
                init,
            });
        }

        Ok(NodeKind::VariableDeclaration {
            exported,
            declarators,
        })
    }

    fn lower_call(&mut self, node: TsNode<'_>, depth: usize) -> Result<NodeKind> {
        let function = node.child_by_field_name("function");
        let arguments = node
            .child_by_field_name("arguments")
            .filter(|args| args.kind() == "arguments");

        let (Some(function), Some(arguments)) = (function, arguments) else {
            // tagged templates and recovered fragments
            return self.lower_other("call_expression", node, depth);
        };

        let callee = self.lower(function, depth + 1)?;
        let arguments = self.lower_children(arguments, depth + 1)?;

        Ok(NodeKind::Call(CallExpr {
            callee: Box::new(callee),
            arguments,
        }))
    }

    fn lower_member(&mut self, node: TsNode<'_>, depth: usize) -> Result<NodeKind> {
        let object = node.child_by_field_name("object");
        let property = node.child_by_field_name("property");

        let (Some(object), Some(property)) = (object, property) else {
            return self.lower_other("member_expression", node, depth);
        };

        let object = self.lower(object, depth + 1)?;
        Ok(NodeKind::Member {
            object: Box::new(object),
            property: self.text(property).to_string(),
        })
    }

    fn lower_object(&mut self, node: TsNode<'_>, depth: usize) -> Result<ObjectLit> {
        let mut cursor = node.walk();
        let children: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();

        let mut members = Vec::with_capacity(children.len());
        for child in children {
            let span = Span::new(child.start_byte(), child.end_byte());
            let member = match child.kind() {
                "pair" => {
                    let key = child.child_by_field_name("key").and_then(|key| self.key_name(key));
                    let value = child.child_by_field_name("value");
                    match (key, value) {
                        (Some(key), Some(value)) => ObjectMember::Property {
                            span,
                            key,
                            value: self.lower(value, depth + 2)?,
                        },
                        _ => ObjectMember::Other(self.lower(child, depth + 1)?),
                    }
                }
                "shorthand_property_identifier" => {
                    let name = self.text(child).to_string();
                    ObjectMember::Property {
                        span,
                        key: name.clone(),
                        value: Node::new(span, NodeKind::Identifier(name)),
                    }
                }
                _ => ObjectMember::Other(self.lower(child, depth + 1)?),
            };
            members.push(member);
        }

        Ok(ObjectLit { members })
    }

    /// Statically known property key, `None` for computed keys
    fn key_name(&self, key: TsNode<'_>) -> Option<String> {
        match key.kind() {
            "property_identifier" | "private_property_identifier" | "number" | "identifier" => {
                Some(self.text(key).to_string())
            }
            "string" => Some(self.string_value(key)),
            _ => None,
        }
    }

    fn string_value(&self, node: TsNode<'_>) -> String {
        let mut decoder = StringDecoder::default();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "escape_sequence" => decoder.push_escape(self.text(child)),
                "string_fragment" | "html_character_reference" => {
                    decoder.push_fragment(self.text(child));
                }
                _ => {}
            }
        }
        decoder.finish()
    }

    fn text(&self, node: TsNode<'_>) -> &'src str {
        self.source.get(node.byte_range()).unwrap_or("")
    }
}
