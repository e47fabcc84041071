use ardebug::core::{Analyzer, FindingKind, NodeId, NodeKind};

const SAMPLES: &[&str] = &[
    "",
    "\n\n",
    "def foo(a, b):\n    x = a + b\n    return x",
    "def foo(a):\n    return y",
    "if x > 0\n    y = 1",
    "total =",
    "x = 1\nprint(x)\n# comment only",
    "def a(p=1, *rest):\n    q = helper(p)\n    return q\ndef helper(v)\n    return v\nwhile a == b\n",
    "def broken(:\n    result = (\n    return\n\tz = run(z)\r\n",
    "def f():\n    s = \"text with words\"\n    return s",
];

#[test]
fn empty_text_yields_module_only() {
    let analysis = Analyzer::default().analyze("");

    assert_eq!(analysis.graph.nodes.len(), 1);
    assert_eq!(analysis.graph.nodes[0].id.to_string(), "N1");
    assert_eq!(analysis.graph.nodes[0].kind, NodeKind::Module);
    assert!(analysis.graph.edges.is_empty());
    assert!(analysis.errors.is_empty());
    assert_eq!(analysis.health.score, 100);
    assert_eq!(analysis.health.complexity, 0);
    assert_eq!(analysis.health.functions, 0);
    assert_eq!(analysis.health.coverage, 100);
}

#[test]
fn simple_function_graph() {
    let analysis = Analyzer::default().analyze("def foo(a, b):\n    x = a + b\n    return x");
    let graph = &analysis.graph;

    let foo = graph.nodes.iter().find(|n| n.label == "foo").unwrap();
    assert_eq!(foo.parameters().to_vec(), vec!["a".to_string(), "b".to_string()]);

    let children: Vec<(&str, &str)> = graph
        .children(foo.id)
        .iter()
        .map(|n| (n.label.as_str(), n.kind.type_name()))
        .collect();
    assert_eq!(
        children,
        vec![("a", "parameter"), ("b", "parameter"), ("x", "variable"), ("return", "return")]
    );
    assert_eq!(graph.parent(foo.id), Some(NodeId::MODULE));
    assert_eq!(graph.edges.len(), 5);
    assert!(analysis.errors.is_empty());
    assert_eq!(analysis.health.functions, 1);
}

#[test]
fn undefined_return_value_scores_eighty() {
    let analysis = Analyzer::default().analyze("def foo(a):\n    return y");

    assert_eq!(analysis.errors.len(), 1);
    assert_eq!(analysis.errors.errors[0].kind, FindingKind::UndefinedVariable);
    assert_eq!(analysis.errors.errors[0].line, 2);
    assert_eq!(analysis.health.score, 80);
    assert_eq!(analysis.health.coverage, 85);
}

#[test]
fn missing_colon_on_if() {
    let analysis = Analyzer::default().analyze("if x > 0\n    y = 1");
    let syntax: Vec<&str> = analysis
        .errors
        .errors
        .iter()
        .filter(|e| e.kind == FindingKind::SyntaxError)
        .map(|e| e.message.as_str())
        .collect();

    assert_eq!(syntax, vec!["SyntaxError: expected ':'"]);
    assert!(analysis
        .errors
        .errors
        .iter()
        .any(|e| e.message == "NameError: name 'x' is not defined"));
}

#[test]
fn dangling_assignment() {
    let analysis = Analyzer::default().analyze("total =");

    assert_eq!(analysis.errors.len(), 1);
    assert_eq!(analysis.errors.errors[0].message, "SyntaxError: incomplete assignment");
    assert_eq!(analysis.errors.errors[0].kind, FindingKind::SyntaxError);
}

#[test]
fn repeated_runs_serialize_identically() {
    let analyzer = Analyzer::default();

    for sample in SAMPLES {
        let first = serde_json::to_string(&analyzer.analyze(sample)).unwrap();
        let second = serde_json::to_string(&Analyzer::default().analyze(sample)).unwrap();
        assert_eq!(first, second, "non-deterministic output for {:?}", sample);
    }
}

#[test]
fn every_graph_is_a_tree_rooted_at_the_module() {
    for sample in SAMPLES {
        let graph = Analyzer::default().analyze(sample).graph;

        assert_eq!(graph.nodes[0].id, NodeId::MODULE, "{:?}", sample);
        assert_eq!(graph.count_of("module"), 1, "{:?}", sample);
        assert!(graph.is_tree(), "not a tree for {:?}", sample);

        let ids: Vec<u32> = graph.nodes.iter().map(|n| n.id.index()).collect();
        let expected: Vec<u32> = (1..=graph.nodes.len() as u32).collect();
        assert_eq!(ids, expected, "{:?}", sample);
    }
}

#[test]
fn scores_stay_in_bounds() {
    for sample in SAMPLES {
        let health = Analyzer::default().analyze(sample).health;
        assert!(health.score <= 100);
        assert!(health.coverage <= 100);
    }
}

#[test]
fn malformed_text_never_fails() {
    let analyzer = Analyzer::default();
    let analysis = analyzer
        .analyze_bytes(SAMPLES[8].as_bytes())
        .expect("malformed source is still analysable");

    assert!(!analysis.errors.is_empty());
    assert_eq!(analysis.graph.nodes[0].kind, NodeKind::Module);
}
