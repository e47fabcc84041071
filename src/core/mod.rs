//! Analysis core: line classification, the structure graph, heuristic
//! findings and the health score, plus the session and reporting layers
//! the CLI drives them through.

mod classifier;
mod graph;
mod detector;
mod health;
mod analysis;
mod differ;
mod session;
mod report;
mod engine;

pub use classifier::{LineClassifier, LineFact, Rule, DEFINITION_RULES, GRAPH_RULES};
pub use graph::{Edge, GraphBuilder, GraphData, Node, NodeId, NodeKind};
pub use detector::{ErrorData, ErrorDetector, Finding, FindingKind};
pub use health::{ErrorBand, HealthReport, HealthScorer, ScoreBand};
pub use analysis::{Analysis, AnalysisStats, Analyzer};
pub use differ::ContentDiffer;
pub use session::{AnalysisSession, Debouncer, RunOutcome};
pub use report::{ReportFormat, Reporter};

// Export the main engine
pub use engine::{Engine, CONFIG_FILE_NAME};
