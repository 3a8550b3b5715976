use crate::language::errors::SemanticError;
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SemanticDiagnostic {
    #[source_code]
    src: NamedSource,
    #[label("{label}")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
    label: String,
}

impl SemanticDiagnostic {
    pub fn from_error(src: NamedSource, err: &SemanticError) -> Self {
        Self {
            src,
            span: err.span.into(),
            help: err.help.clone(),
            message: err.message.clone(),
            label: err.label.clone(),
        }
    }
}

/// Wraps `err` in a report that renders against `source`.
pub fn report(err: &SemanticError, source: &str) -> Report {
    let src = NamedSource::new(err.path.display().to_string(), source.to_string());
    Report::new(SemanticDiagnostic::from_error(src, err))
}

pub fn emit_semantic_error(err: &SemanticError, source: &str) {
    eprintln!("{:?}", report(err, source));
}
