use crate::ast::{Node, NodeKind, ObjectMember};

/// Tree visitor. Override [`Visitor::visit_node`] and call [`walk_node`] to keep descending.
pub trait Visitor {
    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }
}

/// Visit every direct child of `node`, in source order
pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, node: &Node) {
    match &node.kind {
        NodeKind::Program(children)
        | NodeKind::Error(children)
        | NodeKind::Other { children, .. } => {
            for child in children {
                visitor.visit_node(child);
            }
        }
        NodeKind::ExportDefault(value) => visitor.visit_node(value),
        NodeKind::VariableDeclaration { declarators, .. } => {
            for declarator in declarators {
                visitor.visit_node(&declarator.binding);
                if let Some(init) = &declarator.init {
                    visitor.visit_node(init);
                }
            }
        }
        NodeKind::Call(call) => {
            visitor.visit_node(&call.callee);
            for argument in &call.arguments {
                visitor.visit_node(argument);
            }
        }
        NodeKind::Member { object, .. } => visitor.visit_node(object),
        NodeKind::Object(object) => {
            for member in &object.members {
                match member {
                    ObjectMember::Property { value, .. } => visitor.visit_node(value),
                    ObjectMember::Other(node) => visitor.visit_node(node),
                }
            }
        }
        NodeKind::Identifier(_) | NodeKind::StringLiteral(_) => {}
    }
}
