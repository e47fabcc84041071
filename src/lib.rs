//! Heuristic structure graph, findings and health score for a single
//! script file.
//!
//! ```
//! use ardebug::core::Analyzer;
//!
//! let analysis = Analyzer::default().analyze("def foo(a):\n    return y");
//! assert_eq!(analysis.errors.len(), 1);
//! assert_eq!(analysis.health.score, 80);
//! ```

pub mod config;
pub mod core;
pub mod error;

pub use crate::config::Config;
pub use crate::core::{Analysis, Analyzer};
pub use crate::error::{ArDebugError, Result};
