//! Line classification shared by the graph builder and the error detector.
//!
//! Classification is heuristic and strictly line-local: there is no notion
//! of strings, brackets spanning lines or nested scopes. Each consumer walks
//! its own ordered rule table; the order matters because a def-header stops
//! every later rule from looking at that line.

use regex::Regex;

/// Comment marker for the scanned language
pub const COMMENT_MARKER: char = '#';

/// Statement prefixes that must end with a colon
pub const BLOCK_KEYWORDS: &[&str] = &["def ", "if ", "for ", "while "];

/// A fact extracted from one trimmed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineFact {
    /// `def name(params):`, parameters already cleaned
    DefHeader { name: String, parameters: Vec<String> },
    /// `name = ...` at the start of the line
    Assignment(String),
    /// The identifier in front of the first call parenthesis
    Call(String),
    /// `return ...`
    Return,
}

impl LineFact {
    fn short_circuits(&self) -> bool {
        matches!(self, LineFact::DefHeader { .. })
    }
}

/// One entry of an ordered rule table
pub type Rule = fn(&LineClassifier, &str) -> Option<LineFact>;

/// Graph rules in evaluation order. A def-header match ends evaluation for
/// the line; the remaining rules are independent of each other.
pub const GRAPH_RULES: &[(&str, Rule)] = &[
    ("def-header", LineClassifier::def_header),
    ("assignment", LineClassifier::assignment),
    ("call", LineClassifier::call),
    ("return", LineClassifier::return_statement),
];

/// Definition-collection rules used by the detector's first pass. These are
/// looser than `GRAPH_RULES`: a def line without its colon still defines
/// the name, and every line is checked against both rules.
pub const DEFINITION_RULES: &[(&str, Rule)] = &[
    ("def-signature", LineClassifier::def_signature),
    ("assignment", LineClassifier::assignment),
];

/// Regex-backed classifier for single source lines
pub struct LineClassifier {
    def_header_regex: Regex,
    def_name_regex: Regex,
    def_params_regex: Regex,
    assignment_regex: Regex,
    call_regex: Regex,
    word_split_regex: Regex,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self {
            def_header_regex: Regex::new(r"def\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(([^)]*)\)\s*:")
                .expect("Invalid def header regex"),
            def_name_regex: Regex::new(r"def\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(")
                .expect("Invalid def name regex"),
            def_params_regex: Regex::new(r"def\s+[a-zA-Z_][a-zA-Z0-9_]*\s*\(([^)]*)\)")
                .expect("Invalid def params regex"),
            assignment_regex: Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*=(?:[^=]|$)")
                .expect("Invalid assignment regex"),
            call_regex: Regex::new(r"([a-zA-Z_][a-zA-Z0-9_]*)\s*\(")
                .expect("Invalid call regex"),
            word_split_regex: Regex::new(r"[^a-zA-Z0-9_]+")
                .expect("Invalid word split regex"),
        }
    }

    /// Blank lines and comment lines are ignored by every consumer
    pub fn is_skippable(trimmed: &str) -> bool {
        trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER)
    }

    /// Run an ordered rule table against a trimmed line
    pub fn classify(&self, trimmed: &str, rules: &[(&str, Rule)]) -> Vec<LineFact> {
        let mut facts = Vec::new();

        for (_, rule) in rules {
            if let Some(fact) = rule(self, trimmed) {
                let stop = fact.short_circuits();
                facts.push(fact);
                if stop {
                    break;
                }
            }
        }

        facts
    }

    /// `def name(params):` with the closing colon
    pub fn def_header(&self, trimmed: &str) -> Option<LineFact> {
        if !trimmed.starts_with("def ") {
            return None;
        }

        let caps = self.def_header_regex.captures(trimmed)?;
        Some(LineFact::DefHeader {
            name: caps[1].to_string(),
            parameters: parameter_tokens(&caps[2]),
        })
    }

    /// `def name(` with or without the rest of the header. Parameters are
    /// captured when the parameter list is closed on the same line.
    pub fn def_signature(&self, trimmed: &str) -> Option<LineFact> {
        if !trimmed.starts_with("def ") {
            return None;
        }

        let name = self.def_name_regex.captures(trimmed)?[1].to_string();
        let parameters = self
            .def_params_regex
            .captures(trimmed)
            .map(|caps| parameter_tokens(&caps[1]))
            .unwrap_or_default();

        Some(LineFact::DefHeader { name, parameters })
    }

    /// Leading `name =` but not `name ==`. Never matches a line that starts
    /// with `def `.
    pub fn assignment(&self, trimmed: &str) -> Option<LineFact> {
        if !trimmed.contains('=') || trimmed.starts_with("def ") {
            return None;
        }

        self.assignment_regex
            .captures(trimmed)
            .map(|caps| LineFact::Assignment(caps[1].to_string()))
    }

    /// Any line holding both parentheses yields the first `name(` it contains
    pub fn call(&self, trimmed: &str) -> Option<LineFact> {
        if !(trimmed.contains('(') && trimmed.contains(')')) {
            return None;
        }

        self.call_regex
            .captures(trimmed)
            .map(|caps| LineFact::Call(caps[1].to_string()))
    }

    pub fn return_statement(&self, trimmed: &str) -> Option<LineFact> {
        trimmed.starts_with("return ").then_some(LineFact::Return)
    }

    /// Identifier-shaped pieces of a line, split on anything that is not
    /// an ASCII letter, digit or underscore. Empty pieces are dropped.
    pub fn words<'a>(&self, trimmed: &'a str) -> Vec<&'a str> {
        self.word_split_regex
            .split(trimmed)
            .filter(|word| !word.is_empty())
            .collect()
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// True when a trimmed line opens a block but lacks the trailing colon
pub fn missing_colon(trimmed: &str) -> bool {
    BLOCK_KEYWORDS.iter().any(|kw| trimmed.starts_with(kw)) && !trimmed.ends_with(':')
}

/// True for a dangling `name =`; comparisons never count
pub fn incomplete_assignment(trimmed: &str) -> bool {
    trimmed.ends_with('=') && !trimmed.contains("==") && !trimmed.contains("!=")
}

/// Split a raw parameter list on commas, dropping empty tokens and any
/// `=default` suffix.
pub fn parameter_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(clean_parameter)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip a default-value suffix: `b=2` becomes `b`
pub fn clean_parameter(token: &str) -> &str {
    token.split('=').next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_def_header_short_circuits_call_rule() {
        let classifier = LineClassifier::new();
        let facts = classifier.classify("def foo(a, b=2):", GRAPH_RULES);

        assert_eq!(
            facts,
            vec![LineFact::DefHeader {
                name: "foo".to_string(),
                parameters: vec!["a".to_string(), "b".to_string()],
            }]
        );
    }

    #[test]
    fn test_def_without_colon_falls_through() {
        let classifier = LineClassifier::new();
        let facts = classifier.classify("def foo(a)", GRAPH_RULES);

        // Not a header, so the call rule sees `foo(`
        assert_eq!(facts, vec![LineFact::Call("foo".to_string())]);
    }

    #[test]
    fn test_assignment_and_call_on_one_line() {
        let classifier = LineClassifier::new();
        let facts = classifier.classify("total = compute(x)", GRAPH_RULES);

        assert_eq!(
            facts,
            vec![
                LineFact::Assignment("total".to_string()),
                LineFact::Call("compute".to_string()),
            ]
        );
    }

    #[test]
    fn test_comparison_is_not_assignment() {
        let classifier = LineClassifier::new();

        assert!(classifier.assignment("x == 1").is_none());
        assert!(classifier.assignment("x != 1").is_none());
        assert_eq!(classifier.assignment("x=1"), Some(LineFact::Assignment("x".to_string())));
        assert!(classifier.assignment("if x == 1:").is_none());
        assert!(!incomplete_assignment("x =="));
        assert!(!incomplete_assignment("y !="));
        assert!(incomplete_assignment("total ="));
    }

    #[test]
    fn test_call_uses_first_named_parenthesis() {
        let classifier = LineClassifier::new();

        assert_eq!(classifier.call("x = (a + b) * scale(c)"), Some(LineFact::Call("scale".to_string())));
        assert_eq!(classifier.call("compute("), None);
    }

    #[test]
    fn test_return_needs_trailing_space() {
        let classifier = LineClassifier::new();

        assert_eq!(classifier.return_statement("return x"), Some(LineFact::Return));
        assert_eq!(classifier.return_statement("return"), None);
    }

    #[test]
    fn test_def_signature_tolerates_missing_colon() {
        let classifier = LineClassifier::new();

        assert_eq!(
            classifier.def_signature("def foo(a)"),
            Some(LineFact::DefHeader {
                name: "foo".to_string(),
                parameters: vec!["a".to_string()],
            })
        );
        assert_eq!(
            classifier.def_signature("def foo("),
            Some(LineFact::DefHeader { name: "foo".to_string(), parameters: vec![] })
        );
    }

    #[test]
    fn test_parameter_tokens() {
        assert_eq!(parameter_tokens(" a , , b = 3,c"), vec!["a", "b", "c"]);
        assert!(parameter_tokens("").is_empty());
        assert!(parameter_tokens("=1").is_empty());
    }

    #[test]
    fn test_words_and_skippable() {
        let classifier = LineClassifier::new();
        let words = classifier.words("x = foo(a_1, 'b c')");

        assert_eq!(words, vec!["x", "foo", "a_1", "b", "c"]);
        assert!(LineClassifier::is_skippable(""));
        assert!(LineClassifier::is_skippable("# note"));
        assert!(!LineClassifier::is_skippable("x = 1"));
        assert!(missing_colon("while True"));
        assert!(!missing_colon("while True:"));
    }
}
