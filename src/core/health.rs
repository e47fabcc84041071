//! Composite health score and the display bands derived from it.

use serde::{Deserialize, Serialize};

use super::detector::ErrorData;
use super::graph::GraphData;

const ERROR_PENALTY: i64 = 20;
const COVERAGE_PENALTY: i64 = 15;
const MULTI_FUNCTION_BONUS: i64 = 10;
const CONNECTED_BONUS: i64 = 5;
const FUNCTION_WEIGHT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// 0..=100
    pub score: u8,
    pub complexity: usize,
    /// 0..=100
    pub coverage: u8,
    pub functions: usize,
    pub errors: usize,
}

impl HealthReport {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

impl Default for HealthReport {
    fn default() -> Self {
        Self {
            score: 100,
            complexity: 0,
            coverage: 100,
            functions: 0,
            errors: 0,
        }
    }
}

/// Colour band for the score gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Green,
    Amber,
    Red,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreBand::Green,
            60..=79 => ScoreBand::Amber,
            _ => ScoreBand::Red,
        }
    }
}

/// Severity band for the error counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorBand {
    Ok,
    Warning,
    Critical,
}

impl ErrorBand {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => ErrorBand::Ok,
            1..=2 => ErrorBand::Warning,
            _ => ErrorBand::Critical,
        }
    }
}

/// Scores a graph and its findings. Stateless; every call starts over.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthScorer;

impl HealthScorer {
    pub fn score(&self, graph: &GraphData, errors: &ErrorData) -> HealthReport {
        let error_count = errors.len();
        let function_count = graph.function_count();
        let penalty = error_count as i64;

        let mut score = 100 - ERROR_PENALTY.saturating_mul(penalty);
        if function_count >= 2 {
            score += MULTI_FUNCTION_BONUS;
        }
        if graph.edges.len() >= 5 {
            score += CONNECTED_BONUS;
        }

        // Covers empty text and files with only top-level statements; their
        // graphs are identical
        let complexity = if graph.is_module_only() {
            0
        } else {
            function_count * FUNCTION_WEIGHT + graph.nodes.len()
        };

        HealthReport {
            score: clamp_percent(score),
            complexity,
            coverage: clamp_percent(100 - COVERAGE_PENALTY.saturating_mul(penalty)),
            functions: function_count,
            errors: error_count,
        }
    }
}

fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}
