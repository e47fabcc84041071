//! Heuristic findings: missing colons, dangling assignments and names that
//! are never defined anywhere in the file.

use std::collections::HashSet;
use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use super::classifier::{
    incomplete_assignment, missing_colon, LineClassifier, LineFact, DEFINITION_RULES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    SyntaxError,
    UndefinedVariable,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::SyntaxError => write!(f, "syntax_error"),
            FindingKind::UndefinedVariable => write!(f, "undefined_variable"),
        }
    }
}

/// One problem found in the analysed text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    pub line: usize,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: FindingKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorData {
    pub errors: Vec<Finding>,
}

impl ErrorData {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn count_of(&self, kind: FindingKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    pub fn on_line(&self, file: &str, line: usize) -> Vec<&Finding> {
        self.errors
            .iter()
            .filter(|e| e.file == file && e.line == line)
            .collect()
    }
}

/// Names defined anywhere in the file, ignoring scope
#[derive(Debug, Default)]
struct Definitions {
    functions: HashSet<String>,
    variables: HashSet<String>,
    parameters: HashSet<String>,
}

impl Definitions {
    fn contains(&self, name: &str) -> bool {
        self.functions.contains(name) || self.variables.contains(name) || self.parameters.contains(name)
    }
}

/// Two-pass detector over the raw source text
pub struct ErrorDetector {
    classifier: LineClassifier,
    file_name: String,
    allowed_names: HashSet<String>,
    min_name_length: usize,
}

impl ErrorDetector {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            classifier: LineClassifier::new(),
            file_name: config.file_name.clone(),
            allowed_names: config.allowed_names.iter().cloned().collect(),
            min_name_length: config.min_name_length.max(1),
        }
    }

    pub fn detect(&self, source: &str) -> ErrorData {
        let lines: Vec<&str> = source.split('\n').collect();
        let definitions = self.collect_definitions(&lines);

        let mut errors = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            self.check_line(index + 1, line, &definitions, &mut errors);
        }

        debug!(
            "Detected {} findings in {} ({} functions, {} variables defined)",
            errors.len(),
            self.file_name,
            definitions.functions.len(),
            definitions.variables.len()
        );

        ErrorData { errors }
    }

    /// First pass. Comment lines are not skipped here; none of the
    /// definition rules can match a line starting with `#` anyway.
    fn collect_definitions(&self, lines: &[&str]) -> Definitions {
        let mut definitions = Definitions::default();

        for line in lines {
            for fact in self.classifier.classify(line.trim(), DEFINITION_RULES) {
                match fact {
                    LineFact::DefHeader { name, parameters } => {
                        definitions.functions.insert(name);
                        definitions.parameters.extend(parameters);
                    }
                    LineFact::Assignment(name) => {
                        definitions.variables.insert(name);
                    }
                    LineFact::Call(_) | LineFact::Return => {}
                }
            }
        }

        definitions
    }

    /// Second pass. All three checks are independent.
    fn check_line(&self, line_number: usize, line: &str, definitions: &Definitions, errors: &mut Vec<Finding>) {
        let trimmed = line.trim();
        if LineClassifier::is_skippable(trimmed) {
            return;
        }

        if missing_colon(trimmed) {
            errors.push(self.finding(line_number, "SyntaxError: expected ':'".to_string(), FindingKind::SyntaxError));
        }

        if incomplete_assignment(trimmed) {
            errors.push(self.finding(
                line_number,
                "SyntaxError: incomplete assignment".to_string(),
                FindingKind::SyntaxError,
            ));
        }

        for word in self.classifier.words(trimmed) {
            if self.is_undefined(word, line, definitions) {
                errors.push(self.finding(
                    line_number,
                    format!("NameError: name '{}' is not defined", word),
                    FindingKind::UndefinedVariable,
                ));
            }
        }
    }

    /// The `def ` and `=` substring guards look at the untrimmed line
    fn is_undefined(&self, word: &str, line: &str, definitions: &Definitions) -> bool {
        let starts_like_name = word
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

        word.len() >= self.min_name_length
            && starts_like_name
            && !definitions.contains(word)
            && !self.allowed_names.contains(word)
            && !line.contains(&format!("def {}", word))
            && !line.contains(&format!("={}", word))
    }

    fn finding(&self, line: usize, message: String, kind: FindingKind) -> Finding {
        Finding {
            file: self.file_name.clone(),
            line,
            message,
            kind,
        }
    }
}

impl Default for ErrorDetector {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
