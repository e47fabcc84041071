use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{ArDebugError, Result};
use super::detector::{ErrorData, ErrorDetector, Finding};
use super::graph::{GraphBuilder, GraphData, Node, NodeId};
use super::health::{ErrorBand, HealthReport, HealthScorer};

/// Side-panel counters for one analysis
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub functions: usize,
    pub variables: usize,
    pub parameters: usize,
    pub connections: usize,
}

impl AnalysisStats {
    pub fn from_graph(graph: &GraphData) -> Self {
        Self {
            functions: graph.function_count(),
            variables: graph.count_of("variable"),
            parameters: graph.count_of("parameter"),
            connections: graph.edges.len(),
        }
    }
}

/// Everything derived from one version of the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub graph: GraphData,
    pub errors: ErrorData,
    pub health: HealthReport,
    pub stats: AnalysisStats,
}

impl Analysis {
    /// A node has an error when a finding shares its file and line
    pub fn node_has_error(&self, node: &Node) -> bool {
        self.errors
            .errors
            .iter()
            .any(|e| e.file == node.file && e.line == node.line)
    }

    /// Ids of every node flagged by `node_has_error`, in graph order
    pub fn error_node_ids(&self) -> Vec<NodeId> {
        self.graph
            .nodes
            .iter()
            .filter(|node| self.node_has_error(node))
            .map(|node| node.id)
            .collect()
    }

    pub fn errors_on_line(&self, line: usize) -> Vec<&Finding> {
        self.errors.errors.iter().filter(|e| e.line == line).collect()
    }

    pub fn error_band(&self) -> ErrorBand {
        ErrorBand::from_count(self.errors.len())
    }
}

/// Runs the graph builder, the detector and the scorer over one text.
/// Holds no per-run state, so one analyzer can serve any number of runs.
pub struct Analyzer {
    builder: GraphBuilder,
    detector: ErrorDetector,
    scorer: HealthScorer,
    max_input_size: usize,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            builder: GraphBuilder::new(config),
            detector: ErrorDetector::new(config),
            scorer: HealthScorer,
            max_input_size: config.max_input_size,
        }
    }

    /// Malformed source is the normal case and never fails
    pub fn analyze(&self, source: &str) -> Analysis {
        let graph = self.builder.build(source);
        let errors = self.detector.detect(source);
        let health = self.scorer.score(&graph, &errors);
        let stats = AnalysisStats::from_graph(&graph);

        debug!(
            "Analysis complete: score {}, {} nodes, {} findings",
            health.score,
            graph.nodes.len(),
            errors.len()
        );

        Analysis { graph, errors, health, stats }
    }

    /// Entry point for raw input. Fails fast on input the analyzer cannot
    /// accept at all, before any scanning starts.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<Analysis> {
        self.analyze_source(decode(bytes)?)
    }

    /// Analyse already decoded text, rejecting it when it exceeds the
    /// configured size limit.
    pub fn analyze_source(&self, source: &str) -> Result<Analysis> {
        if source.len() > self.max_input_size {
            return Err(ArDebugError::InputTooLarge {
                size: source.len(),
                limit: self.max_input_size,
            });
        }

        Ok(self.analyze(source))
    }
}

/// Decode raw input as UTF-8 source text
pub fn decode(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| ArDebugError::InvalidInput(format!("source is not valid UTF-8: {}", e)))
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
