//! Keeps the last good analysis around while new input streams in.
//!
//! A run that fails leaves the previous results visible and marks them
//! stale. Runs never share state; the session only holds their outputs.

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::Result;
use super::analysis::{self, Analysis, Analyzer};
use super::differ::ContentDiffer;

/// What happened to one submitted input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// New results were published
    Updated,
    /// Content matched the last successful run
    Unchanged,
    /// The run failed; previous results are kept and marked stale
    Failed,
}

pub struct AnalysisSession {
    analyzer: Analyzer,
    differ: ContentDiffer,
    current: Option<Analysis>,
    stale: bool,
    last_failure: Option<String>,
    runs: u64,
}

impl AnalysisSession {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            differ: ContentDiffer::new(),
            current: None,
            stale: false,
            last_failure: None,
            runs: 0,
        }
    }

    /// Analyse new raw input and publish the outcome
    pub fn submit(&mut self, bytes: &[u8]) -> RunOutcome {
        match self.run(bytes) {
            Ok(Some(analysis)) => {
                self.runs += 1;
                debug!("Published analysis #{}", self.runs);
                self.current = Some(analysis);
                self.stale = false;
                self.last_failure = None;
                RunOutcome::Updated
            }
            Ok(None) => {
                debug!("Input unchanged, keeping analysis #{}", self.runs);
                RunOutcome::Unchanged
            }
            Err(e) => {
                warn!("Analysis failed, keeping previous results: {}", e);
                self.stale = self.current.is_some();
                self.last_failure = Some(e.to_string());
                // Whatever was hashed last is no longer what is shown
                self.differ.reset();
                RunOutcome::Failed
            }
        }
    }

    fn run(&mut self, bytes: &[u8]) -> Result<Option<Analysis>> {
        let text = analysis::decode(bytes)?;

        if self.current.is_some() && !self.stale && !self.differ.has_content_changed(text) {
            return Ok(None);
        }

        let analysis = self.analyzer.analyze_source(text)?;
        self.differ.mark(text);
        Ok(Some(analysis))
    }

    pub fn current(&self) -> Option<&Analysis> {
        self.current.as_ref()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Number of analyses published so far
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

/// Coalesces inputs that arrive within `window` of each other. Only the
/// newest input is kept; it becomes ready once the window passes quietly.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<(Vec<u8>, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None }
    }

    /// Replace any pending input and restart the quiet period
    pub fn push(&mut self, input: Vec<u8>, now: Instant) {
        self.pending = Some((input, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand out the pending input once the window has elapsed
    pub fn take_ready(&mut self, now: Instant) -> Option<Vec<u8>> {
        match &self.pending {
            Some((_, since)) if now.duration_since(*since) >= self.window => {
                self.pending.take().map(|(input, _)| input)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    #[test]
    fn test_debouncer_keeps_latest_input() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.push(b"x".to_vec(), start);
        debouncer.push(b"x =".to_vec(), start + Duration::from_millis(300));

        assert_eq!(debouncer.take_ready(start + Duration::from_millis(600)), None);
        assert!(debouncer.is_pending());
        assert_eq!(
            debouncer.take_ready(start + Duration::from_millis(800)),
            Some(b"x =".to_vec())
        );
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.take_ready(start + Duration::from_millis(2000)), None);
    }

    #[test]
    fn test_failure_keeps_previous_results() {
        let mut session = AnalysisSession::new(Analyzer::default());

        assert_eq!(session.submit(b"def foo(a):\n    return a"), RunOutcome::Updated);
        let before = session.current().cloned();

        assert_eq!(session.submit(&[0xff, 0xfe]), RunOutcome::Failed);
        assert!(session.is_stale());
        assert!(session.last_failure().is_some());
        assert_eq!(session.current().cloned(), before);

        assert_eq!(session.submit(b"def foo(a):\n    return a"), RunOutcome::Updated);
        assert!(!session.is_stale());
        assert_eq!(session.runs(), 2);
    }

    #[test]
    fn test_unchanged_input_is_not_republished() {
        let mut session = AnalysisSession::new(Analyzer::default());

        assert_eq!(session.submit(b"x ="), RunOutcome::Updated);
        assert_eq!(session.submit(b"x ="), RunOutcome::Unchanged);
        assert_eq!(session.submit(b"x = 1"), RunOutcome::Updated);
        assert_eq!(session.runs(), 2);
    }

    #[test]
    fn test_unchanged_input_skips_the_analyzer() {
        let mut session = AnalysisSession::new(Analyzer::default());
        assert_eq!(session.submit(b"x = 1"), RunOutcome::Updated);

        // An analyzer that rejects everything would fail if it were reached
        let config = AnalysisConfig {
            max_input_size: 1,
            ..AnalysisConfig::default()
        };
        session.analyzer = Analyzer::new(&config);

        assert_eq!(session.submit(b"x = 1"), RunOutcome::Unchanged);
        assert!(!session.is_stale());
        assert_eq!(session.runs(), 1);

        assert_eq!(session.submit(b"x = 2"), RunOutcome::Failed);
        assert!(session.is_stale());
    }

    #[test]
    fn test_failure_before_first_success_is_not_stale() {
        let config = AnalysisConfig {
            max_input_size: 2,
            ..AnalysisConfig::default()
        };
        let mut session = AnalysisSession::new(Analyzer::new(&config));

        assert_eq!(session.submit(b"long input"), RunOutcome::Failed);
        assert!(session.current().is_none());
        assert!(!session.is_stale());
    }
}
