use agentscan_parser::{walk_node, Node, NodeKind, SourceLanguage, SourceParser, Visitor};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct CallNames(Vec<String>);

impl Visitor for CallNames {
    fn visit_node(&mut self, node: &Node) {
        if let NodeKind::Call(call) = &node.kind {
            if let Some(name) = call.callee_identifier().or_else(|| call.method_name()) {
                self.0.push(name.to_string());
            }
        }
        walk_node(self, node);
    }
}

fn call_names(source: &str, language: SourceLanguage) -> Vec<String> {
    let module = SourceParser::default()
        .parse(source, language)
        .expect("parse failed");
    let mut names = CallNames::default();
    names.visit_node(module.root());
    names.0
}

#[test]
fn tsx_component_with_generics() {
    let code = r#"
import { useState } from "react";

type Props<T> = { items: T[] };

export function List<T extends { id: string }>({ items }: Props<T>) {
    const [open, setOpen] = useState<boolean>(false);
    return (
        <ul onClick={() => setOpen(!open)}>
            {items.map((item) => <li key={item.id}>{render(item)}</li>)}
        </ul>
    );
}
"#;

    let module = SourceParser::default()
        .parse(code, SourceLanguage::Tsx)
        .unwrap();
    assert!(module.diagnostics().is_clean(), "{:?}", module.diagnostics());
    assert_eq!(
        call_names(code, SourceLanguage::Tsx),
        vec!["useState", "setOpen", "map", "render"]
    );
}

#[test]
fn calls_survive_a_broken_neighbour() {
    let code = r#"
const agent = createAgent("x", {});
const = ;
agent.createEval("after", {});
export default agent;
"#;

    let module = SourceParser::default()
        .parse(code, SourceLanguage::TypeScript)
        .unwrap();
    assert!(module.diagnostics().has_error);

    let names = call_names(code, SourceLanguage::TypeScript);
    assert!(names.contains(&"createAgent".to_string()), "{names:?}");
    assert!(names.contains(&"createEval".to_string()), "{names:?}");
}

#[test]
fn commonjs_and_module_extensions() {
    let parser = SourceParser::default();
    for path in ["agent.mjs", "agent.cjs", "agent.jsx", "agent.mts"] {
        let module = parser
            .parse_path("module.exports = make();", path)
            .unwrap_or_else(|e| panic!("{path}: {e}"));
        assert!(module.diagnostics().is_clean(), "{path}");
    }
    assert!(parser.parse_path("x", "agent.py").is_err());
}
