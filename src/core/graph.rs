//! Structure graph built from a single scan over the source lines.

use std::collections::HashSet;
use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use super::classifier::{LineClassifier, LineFact, GRAPH_RULES};

/// Node identifier, rendered as `N1`, `N2`, ... in discovery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NodeId(u32);

impl NodeId {
    /// The module node always takes the first id
    pub const MODULE: NodeId = NodeId(1);

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for NodeId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix('N')
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(NodeId)
            .ok_or_else(|| format!("invalid node id: {}", value))
    }
}

/// Per-type payload of a node. Only functions carry extra fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Module,
    Function { parameters: Vec<String> },
    Parameter,
    Variable,
    Call,
    Return,
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Function { .. } => "function",
            NodeKind::Parameter => "parameter",
            NodeKind::Variable => "variable",
            NodeKind::Call => "call",
            NodeKind::Return => "return",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A syntactic entity discovered in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    /// 1-based line where the entity was found
    pub line: usize,
    pub file: String,
}

impl Node {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, NodeKind::Function { .. })
    }

    /// Parameter names for function nodes, empty for everything else
    pub fn parameters(&self) -> &[String] {
        match &self.kind {
            NodeKind::Function { parameters } => parameters,
            _ => &[],
        }
    }
}

/// Directed parent -> child relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

/// Nodes and edges of one scan, in discovery order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphData {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn count_of(&self, type_name: &str) -> usize {
        self.nodes.iter().filter(|node| node.kind.type_name() == type_name).count()
    }

    pub fn function_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_function()).count()
    }

    /// Direct children of a node, in edge order
    pub fn children(&self, id: NodeId) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|edge| edge.source == id)
            .filter_map(|edge| self.node(edge.target))
            .collect()
    }

    /// The parent of a node; `None` for the module node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.edges.iter().find(|edge| edge.target == id).map(|edge| edge.source)
    }

    /// True when the graph holds nothing besides the module node
    pub fn is_module_only(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Check the module-first and single-parent invariants
    pub fn is_tree(&self) -> bool {
        let Some(first) = self.nodes.first() else {
            return false;
        };
        if first.id != NodeId::MODULE || first.kind != NodeKind::Module {
            return false;
        }

        let mut seen = HashSet::new();
        for edge in &self.edges {
            if edge.target == NodeId::MODULE || !seen.insert(edge.target) {
                return false;
            }
        }

        seen.len() == self.nodes.len() - 1
            && self.nodes.iter().skip(1).all(|node| seen.contains(&node.id))
    }
}

/// Per-run accumulator. Lives only for one `build` call.
struct GraphAccumulator<'a> {
    file: &'a str,
    next_id: u32,
    graph: GraphData,
}

impl<'a> GraphAccumulator<'a> {
    fn new(file: &'a str) -> Self {
        let mut acc = Self {
            file,
            next_id: NodeId::MODULE.0,
            graph: GraphData::default(),
        };
        acc.push(file.to_string(), NodeKind::Module, 1, None);
        acc
    }

    /// Allocate the next id, record the node and its incoming edge
    fn push(&mut self, label: String, kind: NodeKind, line: usize, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        self.graph.nodes.push(Node {
            id,
            label,
            kind,
            line,
            file: self.file.to_string(),
        });
        if let Some(source) = parent {
            self.graph.edges.push(Edge { source, target: id });
        }

        id
    }
}

/// Builds a `GraphData` from source text
pub struct GraphBuilder {
    classifier: LineClassifier,
    file_name: String,
    ignored_calls: Vec<String>,
}

impl GraphBuilder {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            classifier: LineClassifier::new(),
            file_name: config.file_name.clone(),
            ignored_calls: config.ignored_calls.clone(),
        }
    }

    /// Scan every line top to bottom. Output is fully determined by `source`.
    pub fn build(&self, source: &str) -> GraphData {
        let mut acc = GraphAccumulator::new(&self.file_name);
        let mut scope = None;

        for (index, line) in source.split('\n').enumerate() {
            scope = self.process_line(scope, index + 1, line.trim(), &mut acc);
        }

        debug!(
            "Built graph for {}: {} nodes, {} edges",
            self.file_name,
            acc.graph.nodes.len(),
            acc.graph.edges.len()
        );

        acc.graph
    }

    /// Handle one trimmed line given the currently open function scope and
    /// return the scope that is open afterwards.
    fn process_line(
        &self,
        scope: Option<NodeId>,
        line_number: usize,
        trimmed: &str,
        acc: &mut GraphAccumulator<'_>,
    ) -> Option<NodeId> {
        if LineClassifier::is_skippable(trimmed) {
            return scope;
        }

        let mut scope = scope;
        for fact in self.classifier.classify(trimmed, GRAPH_RULES) {
            match fact {
                LineFact::DefHeader { name, parameters } => {
                    let function = acc.push(
                        name,
                        NodeKind::Function { parameters: parameters.clone() },
                        line_number,
                        Some(NodeId::MODULE),
                    );
                    for parameter in parameters {
                        acc.push(parameter, NodeKind::Parameter, line_number, Some(function));
                    }
                    scope = Some(function);
                }
                // Top-level statements have nowhere to attach
                _ if scope.is_none() => {}
                LineFact::Assignment(name) => {
                    acc.push(name, NodeKind::Variable, line_number, scope);
                }
                LineFact::Call(name) => {
                    if !self.ignored_calls.contains(&name) {
                        acc.push(format!("{}()", name), NodeKind::Call, line_number, scope);
                    }
                }
                LineFact::Return => {
                    acc.push("return".to_string(), NodeKind::Return, line_number, scope);
                }
            }
        }

        scope
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(graph: &GraphData) -> Vec<(String, &'static str, usize)> {
        graph
            .nodes
            .iter()
            .map(|n| (n.id.to_string(), n.kind.type_name(), n.line))
            .collect()
    }

    #[test]
    fn test_empty_source_has_only_module() {
        let graph = GraphBuilder::default().build("");

        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes[0].id.to_string(), "N1");
        assert_eq!(graph.nodes[0].label, "main.py");
        assert_eq!(graph.nodes[0].kind, NodeKind::Module);
        assert_eq!(graph.nodes[0].line, 1);
    }

    #[test]
    fn test_function_with_parameters_variable_and_return() {
        let graph = GraphBuilder::default().build("def foo(a, b):\n    x = a + b\n    return x");

        assert_eq!(
            labels(&graph),
            vec![
                ("N1".to_string(), "module", 1),
                ("N2".to_string(), "function", 1),
                ("N3".to_string(), "parameter", 1),
                ("N4".to_string(), "parameter", 1),
                ("N5".to_string(), "variable", 2),
                ("N6".to_string(), "return", 3),
            ]
        );
        assert_eq!(graph.nodes[1].parameters().to_vec(), vec!["a".to_string(), "b".to_string()]);

        let edges: Vec<(String, String)> = graph
            .edges
            .iter()
            .map(|e| (e.source.to_string(), e.target.to_string()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("N1".to_string(), "N2".to_string()),
                ("N2".to_string(), "N3".to_string()),
                ("N2".to_string(), "N4".to_string()),
                ("N2".to_string(), "N5".to_string()),
                ("N2".to_string(), "N6".to_string()),
            ]
        );
        assert!(graph.is_tree());
    }

    #[test]
    fn test_assignment_with_call_yields_two_children() {
        let graph = GraphBuilder::default().build("def main():\n    total = compute(1)");
        let children: Vec<&str> = graph
            .children(NodeId(2))
            .iter()
            .map(|n| n.label.as_str())
            .collect();

        assert_eq!(children, vec!["total", "compute()"]);
    }

    #[test]
    fn test_print_and_top_level_statements_are_skipped() {
        let source = "x = setup()\nprint(x)\ndef run():\n    print(x)\n    # y = 2\n\n    helper()";
        let graph = GraphBuilder::default().build(source);

        let kinds: Vec<&str> = graph.nodes.iter().map(|n| n.kind.type_name()).collect();
        assert_eq!(kinds, vec!["module", "function", "call"]);
        assert_eq!(graph.nodes[2].label, "helper()");
        assert_eq!(graph.nodes[2].line, 7);
    }

    #[test]
    fn test_scope_moves_to_latest_function() {
        let source = "def a():\n    return 1\ndef b(k=3):\n    return k";
        let graph = GraphBuilder::default().build(source);

        let last = graph.nodes.last().unwrap();
        assert_eq!(last.kind, NodeKind::Return);
        assert_eq!(graph.parent(last.id), Some(NodeId(4)));
        assert_eq!(graph.node(NodeId(5)).map(|n| n.label.as_str()), Some("k"));
        assert_eq!(graph.parent(NodeId::MODULE), None);
        assert!(graph.is_tree());
    }

    #[test]
    fn test_node_serializes_with_type_tag() {
        let graph = GraphBuilder::default().build("def foo(a=1):\n    return a");
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["nodes"][1]["id"], "N2");
        assert_eq!(json["nodes"][1]["type"], "function");
        assert_eq!(json["nodes"][1]["parameters"][0], "a");
        assert!(json["nodes"][2].get("parameters").is_none());
        assert_eq!(json["edges"][0]["source"], "N1");

        let back: GraphData = serde_json::from_value(json).unwrap();
        assert_eq!(back, graph);
    }

    #[test]
    fn test_node_id_parsing() {
        assert_eq!(NodeId::try_from("N12".to_string()), Ok(NodeId(12)));
        assert!(NodeId::try_from("12".to_string()).is_err());
        assert!(NodeId::try_from("N0".to_string()).is_err());
    }
}
