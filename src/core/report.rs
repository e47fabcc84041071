//! Renders an `Analysis` for the terminal, for machines, or as Markdown.

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::{ArDebugError, Result};
use super::analysis::{Analysis, AnalysisStats};
use super::detector::Finding;
use super::graph::{GraphData, NodeId};
use super::health::{ErrorBand, HealthReport, ScoreBand};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const MARKDOWN_TEMPLATE: &str = r#"# Analysis of `{{ file }}`

_Generated {{ generated_at }}_

## Health

| Metric | Value |
|--------|-------|
| Score | {{ health.score }} ({{ score_band }}) |
| Complexity | {{ health.complexity }} |
| Coverage | {{ health.coverage }}% |
| Functions | {{ health.functions }} |
| Errors | {{ health.errors }} ({{ error_band }}) |

## Structure

Functions: {{ stats.functions }}, variables: {{ stats.variables }}, parameters: {{ stats.parameters }}, connections: {{ stats.connections }}
{% for node in nodes %}
- `{{ node.id }}` {{ node.type }} **{{ node.label }}** (line {{ node.line }}){% if node.has_error %} - error{% endif %}
{%- endfor %}

## Findings
{% if errors | length == 0 %}
No findings.
{% else %}{% for error in errors %}
- line {{ error.line }}: {{ error.message }} (`{{ error.type }}`)
{%- endfor %}
{% endif %}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = ArDebugError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(ArDebugError::Report(format!("Unsupported report format: {}", other))),
        }
    }
}

/// Flattened node row used by the JSON and Markdown views
#[derive(Debug, Serialize)]
struct NodeRow<'a> {
    id: String,
    label: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    line: usize,
    has_error: bool,
}

#[derive(Debug, Serialize)]
struct ReportView<'a> {
    file: &'a str,
    generated_at: String,
    health: &'a HealthReport,
    score_band: ScoreBand,
    error_band: ErrorBand,
    stats: &'a AnalysisStats,
    graph: &'a GraphData,
    nodes: Vec<NodeRow<'a>>,
    errors: &'a [Finding],
}

impl<'a> ReportView<'a> {
    fn new(file: &'a str, analysis: &'a Analysis) -> Self {
        let nodes = analysis
            .graph
            .nodes
            .iter()
            .map(|node| NodeRow {
                id: node.id.to_string(),
                label: &node.label,
                kind: node.kind.type_name(),
                line: node.line,
                has_error: analysis.node_has_error(node),
            })
            .collect();

        Self {
            file,
            generated_at: chrono::Utc::now().to_rfc3339(),
            health: &analysis.health,
            score_band: analysis.health.band(),
            error_band: analysis.error_band(),
            stats: &analysis.stats,
            graph: &analysis.graph,
            nodes,
            errors: &analysis.errors.errors,
        }
    }
}

pub struct Reporter {
    tera: Tera,
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("report.md", MARKDOWN_TEMPLATE)?;
        Ok(Self { tera, color })
    }

    pub fn render(&self, format: ReportFormat, file: &str, analysis: &Analysis) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text(file, analysis)),
            ReportFormat::Json => self.render_json(file, analysis),
            ReportFormat::Markdown => self.render_markdown(file, analysis),
        }
    }

    pub fn render_json(&self, file: &str, analysis: &Analysis) -> Result<String> {
        let view = ReportView::new(file, analysis);
        let json = serde_json::json!({
            "file": view.file,
            "generated_at": view.generated_at,
            "graph": view.graph,
            "errors": view.errors,
            "health": view.health,
            "score_band": view.score_band,
            "error_band": view.error_band,
            "stats": view.stats,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }

    pub fn render_markdown(&self, file: &str, analysis: &Analysis) -> Result<String> {
        let view = ReportView::new(file, analysis);
        let context = Context::from_serialize(&view)?;
        Ok(self.tera.render("report.md", &context)?)
    }

    pub fn render_text(&self, file: &str, analysis: &Analysis) -> String {
        let health = &analysis.health;
        let error_count = analysis.errors.len();
        let mut out = String::new();

        out.push_str(&format!("\n{}{}{}\n", self.paint(BOLD), file, self.paint(RESET)));
        out.push_str(&format!(
            "{}──────────────────────────────────────{}\n",
            self.paint(DIM),
            self.paint(RESET)
        ));
        out.push_str(&format!(
            "Score: {}{}{}/100{}  Complexity: {}  Coverage: {}%  Functions: {}\n",
            self.paint(score_color(health.band())),
            self.paint(BOLD),
            health.score,
            self.paint(RESET),
            health.complexity,
            health.coverage,
            health.functions
        ));
        out.push_str(&format!(
            "{}{} Error{}{}\n\n",
            self.paint(error_color(analysis.error_band())),
            error_count,
            if error_count == 1 { "" } else { "s" },
            self.paint(RESET)
        ));

        out.push_str(&format!("{}GRAPH{}\n", self.paint(BOLD), self.paint(RESET)));
        for node in &analysis.graph.nodes {
            let depth = if analysis.graph.parent(node.id).is_some_and(|p| p != NodeId::MODULE) {
                "    "
            } else if node.id == NodeId::MODULE {
                ""
            } else {
                "  "
            };
            let marker = if analysis.node_has_error(node) { " [!]" } else { "" };
            out.push_str(&format!(
                "{}{} {} {}{}{} {}line {}{}{}\n",
                depth,
                node.id,
                node.kind,
                self.paint(BOLD),
                node.label,
                self.paint(RESET),
                self.paint(DIM),
                node.line,
                self.paint(RESET),
                marker
            ));
        }

        if !analysis.errors.is_empty() {
            out.push_str(&format!("\n{}FINDINGS{}\n", self.paint(BOLD), self.paint(RESET)));
            for error in &analysis.errors.errors {
                out.push_str(&format!("  {}:{}  {}\n", error.file, error.line, error.message));
            }
        }

        out
    }

    fn paint(&self, code: &'static str) -> &'static str {
        if self.color {
            code
        } else {
            ""
        }
    }
}

fn score_color(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Green => "\x1b[32m",
        ScoreBand::Amber => "\x1b[33m",
        ScoreBand::Red => "\x1b[31m",
    }
}

fn error_color(band: ErrorBand) -> &'static str {
    match band {
        ErrorBand::Ok => "\x1b[32m",
        ErrorBand::Warning => "\x1b[33m",
        ErrorBand::Critical => "\x1b[31m",
    }
}
