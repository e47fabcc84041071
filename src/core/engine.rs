use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ArDebugError;
use super::{Analysis, AnalysisSession, Analyzer, Debouncer, ReportFormat, Reporter, RunOutcome};

/// Default name for a generated configuration file
pub const CONFIG_FILE_NAME: &str = "ardebug.toml";

/// Orchestrates configuration, analysis and reporting for the CLI
pub struct Engine {
    config: Config,
    analyzer: Analyzer,
    reporter: Reporter,
}

impl Engine {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let analyzer = Analyzer::new(&config.analysis);
        let reporter = Reporter::new(config.output.color)?;

        Ok(Self { config, analyzer, reporter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read and analyse one file
    pub async fn analyze_file(&self, path: &Path) -> Result<Analysis> {
        info!("Analyzing {}", path.display());
        let bytes = tokio::fs::read(path).await?;
        Ok(self.analyzer.analyze_bytes(&bytes)?)
    }

    pub fn render(&self, format: Option<&str>, analysis: &Analysis) -> Result<String> {
        let format: ReportFormat = format.unwrap_or(self.config.output.format.as_str()).parse()?;
        Ok(self.reporter.render(format, &self.config.project.file_name, analysis)?)
    }

    /// `ardebug analyze`
    pub async fn analyze(&self, path: &Path, format: Option<&str>, fail_on_errors: bool) -> Result<()> {
        let analysis = self.analyze_file(path).await?;
        println!("{}", self.render(format, &analysis)?);

        if fail_on_errors && !analysis.errors.is_empty() {
            return Err(ArDebugError::Report(format!(
                "{} finding(s) in {}",
                analysis.errors.len(),
                path.display()
            ))
            .into());
        }

        Ok(())
    }

    /// `ardebug watch`: poll the file, debounce edits and re-run the
    /// analysis until interrupted.
    pub async fn watch(&self, path: &Path, debounce_ms: Option<u64>) -> Result<()> {
        let window = Duration::from_millis(debounce_ms.unwrap_or(self.config.watch.debounce_ms));
        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.watch.poll_interval_ms.max(1)));
        let mut debouncer = Debouncer::new(window);
        let mut session = AnalysisSession::new(Analyzer::new(&self.config.analysis));
        let mut last_seen: Option<Vec<u8>> = None;

        info!("Watching {} (debounce {}ms), press Ctrl-C to stop", path.display(), window.as_millis());

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Stopping watch after {} run(s)", session.runs());
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    if last_seen.as_deref() != Some(bytes.as_slice()) {
                        // The first read is analysed straight away
                        let now = if last_seen.is_none() {
                            Instant::now().checked_sub(window).unwrap_or_else(Instant::now)
                        } else {
                            Instant::now()
                        };
                        debouncer.push(bytes.clone(), now);
                        last_seen = Some(bytes);
                    }
                }
                Err(e) => {
                    warn!("Could not read {}: {}", path.display(), e);
                    continue;
                }
            }

            let Some(input) = debouncer.take_ready(Instant::now()) else {
                continue;
            };

            match session.submit(&input) {
                RunOutcome::Updated => {
                    if let Some(analysis) = session.current() {
                        println!("{}", self.render(None, analysis)?);
                    }
                }
                RunOutcome::Unchanged => {}
                RunOutcome::Failed => {
                    warn!(
                        "Showing stale results: {}",
                        session.last_failure().unwrap_or("unknown failure")
                    );
                }
            }
        }
    }

    /// `ardebug init`: write a default configuration file
    pub async fn init(&self, path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
        let target_dir = match path {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let target = target_dir.join(CONFIG_FILE_NAME);

        if target.exists() && !force {
            return Err(ArDebugError::Config(format!(
                "{} already exists, use --force to overwrite",
                target.display()
            ))
            .into());
        }

        tokio::fs::create_dir_all(&target_dir).await?;
        Config::default().save(&target)?;
        info!("Wrote {}", target.display());

        Ok(target)
    }
}
