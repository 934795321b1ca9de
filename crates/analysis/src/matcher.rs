use agentscan_parser::{CallExpr, Node, NodeKind, ObjectLit, ParsedModule, Span};

/// Factory function whose calls declare an agent
pub const AGENT_FACTORY: &str = "createAgent";

/// Which top-level form declared the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationShape {
    /// `export default createAgent(...)`
    ExportDefault,
    /// `const x = createAgent(...)`, optionally `export`ed
    Variable {
        binding: Option<String>,
        exported: bool,
    },
}

/// A matched `createAgent("name", { ... })` call
#[derive(Debug, Clone)]
pub struct AgentDeclaration<'m> {
    pub shape: DeclarationShape,
    pub call: &'m CallExpr,
    /// Span of the whole call expression
    pub span: Span,
    /// First argument, verbatim string value
    pub name: &'m str,
    /// Second argument
    pub config: &'m ObjectLit,
}

/// First agent declaration among the module's top-level statements.
///
/// Later matches in the same file are ignored.
#[must_use]
pub fn find_agent_declaration(module: &ParsedModule) -> Option<AgentDeclaration<'_>> {
    module.top_level().into_iter().find_map(match_statement)
}

fn match_statement(statement: &Node) -> Option<AgentDeclaration<'_>> {
    match &statement.kind {
        NodeKind::ExportDefault(value) => match_factory_call(value, DeclarationShape::ExportDefault),
        NodeKind::VariableDeclaration {
            exported,
            declarators,
        } => declarators.iter().find_map(|declarator| {
            let init = declarator.init.as_ref()?;
            match_factory_call(
                init,
                DeclarationShape::Variable {
                    binding: declarator.name().map(str::to_string),
                    exported: *exported,
                },
            )
        }),
        _ => None,
    }
}

fn match_factory_call(node: &Node, shape: DeclarationShape) -> Option<AgentDeclaration<'_>> {
    let call = node.as_call()?;
    if call.callee_identifier() != Some(AGENT_FACTORY) {
        return None;
    }

    let name = call.argument(0).and_then(Node::as_string_literal);
    let config = call.argument(1).and_then(Node::as_object);
    let (Some(name), Some(config)) = (name, config) else {
        log::debug!(
            "Ignoring {AGENT_FACTORY}() call at byte {} without (string, object) arguments",
            node.span.start
        );
        return None;
    };

    Some(AgentDeclaration {
        shape,
        call,
        span: node.span,
        name,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentscan_parser::{SourceLanguage, SourceParser};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParsedModule {
        SourceParser::default()
            .parse(source, SourceLanguage::TypeScript)
            .expect("parse")
    }

    #[test]
    fn matches_export_default_call() {
        let module = parse("export default createAgent('hello', { handler: async () => {} });");
        let declaration = find_agent_declaration(&module).expect("agent");
        assert_eq!(declaration.name, "hello");
        assert_eq!(declaration.shape, DeclarationShape::ExportDefault);
    }

    #[test]
    fn matches_variable_declaration_anywhere_among_statements() {
        let module = parse(
            r"
import { createAgent } from '@agentuity/runtime';

const helper = 1;
const agent = createAgent('hello', {});

export default agent;
",
        );
        let declaration = find_agent_declaration(&module).expect("agent");
        assert_eq!(declaration.name, "hello");
        assert_eq!(
            declaration.shape,
            DeclarationShape::Variable {
                binding: Some("agent".to_string()),
                exported: false
            }
        );
    }

    #[test]
    fn matches_exported_const() {
        let module = parse("export const agent = createAgent('hello', {});");
        let declaration = find_agent_declaration(&module).expect("agent");
        assert!(matches!(
            declaration.shape,
            DeclarationShape::Variable { exported: true, .. }
        ));
    }

    #[test]
    fn first_match_wins() {
        let module = parse(
            r"
const first = createAgent('first', {});
export default createAgent('second', {});
",
        );
        assert_eq!(find_agent_declaration(&module).expect("agent").name, "first");
    }

    #[test]
    fn ignores_wrong_argument_shapes() {
        for source in [
            "export default createAgent(name, {});",
            "export default createAgent('x');",
            "export default createAgent('x', config);",
            "export default makeAgent('x', {});",
            "export default lib.createAgent('x', {});",
        ] {
            assert!(
                find_agent_declaration(&parse(source)).is_none(),
                "unexpected match for {source}"
            );
        }
    }

    #[test]
    fn mismatch_does_not_hide_later_valid_declaration() {
        let module = parse(
            r"
const bad = createAgent(dynamicName, {});
const good = createAgent('good', {});
",
        );
        assert_eq!(find_agent_declaration(&module).expect("agent").name, "good");
    }

    #[test]
    fn does_not_recurse_into_nested_scopes() {
        let module = parse(
            r"
function build() {
    return createAgent('nested', {});
}
export default build();
",
        );
        assert!(find_agent_declaration(&module).is_none());
    }

    #[test]
    fn declared_name_is_verbatim() {
        let module = parse("export default createAgent('  Spaced Name ', {});");
        assert_eq!(
            find_agent_declaration(&module).expect("agent").name,
            "  Spaced Name "
        );
    }
}
