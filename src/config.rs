use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ArDebugError, Result};

/// Names that are never reported as undefined
pub const DEFAULT_ALLOWED_NAMES: &[&str] = &[
    "print", "return", "if", "else", "for", "while", "def", "and", "or", "not",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Scanner and detector settings
    pub analysis: AnalysisConfig,

    /// Watch mode settings
    pub watch: WatchConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Logical file identifier stamped on every node and finding
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Logical file identifier, copied from `project.file_name` on load
    #[serde(skip)]
    pub file_name: String,

    /// Maximum input size to analyse (in bytes)
    pub max_input_size: usize,

    /// Called names that never produce a call node
    pub ignored_calls: Vec<String>,

    /// Keywords and builtins that are never undefined
    pub allowed_names: Vec<String>,

    /// Shortest token checked by the undefined-name pass
    pub min_name_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period after the last edit before re-analysing
    pub debounce_ms: u64,

    /// How often the watched file is polled for changes
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (text, json, markdown)
    pub format: String,

    /// Emit ANSI colours in text output
    pub color: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            file_name: "main.py".to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            file_name: "main.py".to_string(),
            max_input_size: 1024 * 1024, // 1MB
            ignored_calls: vec!["print".to_string()],
            allowed_names: DEFAULT_ALLOWED_NAMES.iter().map(|s| s.to_string()).collect(),
            min_name_length: 1,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            poll_interval_ms: 250,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            color: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            analysis: AnalysisConfig::default(),
            watch: WatchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .map_err(|e| ArDebugError::Config(e.to_string()))?;
        config.validate()?;
        config.analysis.file_name = config.project.file_name.clone();
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ArDebugError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = ["ArDebug.toml", "ardebug.toml", ".ardebug.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.project.file_name.trim().is_empty() {
            return Err(ArDebugError::Config("project.file_name must not be empty".to_string()));
        }
        if self.analysis.min_name_length == 0 {
            return Err(ArDebugError::Config("analysis.min_name_length must be at least 1".to_string()));
        }
        match self.output.format.as_str() {
            "text" | "json" | "markdown" => Ok(()),
            other => Err(ArDebugError::Config(format!("Unsupported output format: {}", other))),
        }
    }
}
