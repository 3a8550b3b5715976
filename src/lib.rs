#![allow(clippy::collapsible_if)]

pub mod diagnostics;
pub mod language;
pub mod pipeline;

pub use language::errors::{ErrorKind, SemanticError, SemanticResult};
pub use pipeline::{analyze, analyze_with_options, AnalysisOptions};

#[cfg(test)]
mod tests;
