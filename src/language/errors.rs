use crate::language::span::Span;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type SemanticResult<T> = Result<T, SemanticError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    #[error("unknown type")]
    UnknownType,
    #[error("cyclic type")]
    CyclicType,
    #[error("unknown variable")]
    UnknownVariable,
    #[error("unknown method")]
    UnknownMethod,
    #[error("duplicate variable")]
    DuplicateVariable,
    #[error("type mismatch")]
    TypeMismatch,
    #[error("missing field")]
    MissingField,
    #[error("duplicate field")]
    DuplicateField,
    #[error("arity mismatch")]
    ArityMismatch,
    #[error("macro recursion limit")]
    RecursionLimit,
    #[error("internal failure")]
    InternalError,
}

impl ErrorKind {
    /// Stable diagnostic code, e.g. `while_sema::type_mismatch`.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UnknownType => "while_sema::unknown_type",
            ErrorKind::CyclicType => "while_sema::cyclic_type",
            ErrorKind::UnknownVariable => "while_sema::unknown_variable",
            ErrorKind::UnknownMethod => "while_sema::unknown_method",
            ErrorKind::DuplicateVariable => "while_sema::duplicate_variable",
            ErrorKind::TypeMismatch => "while_sema::type_mismatch",
            ErrorKind::MissingField => "while_sema::missing_field",
            ErrorKind::DuplicateField => "while_sema::duplicate_field",
            ErrorKind::ArityMismatch => "while_sema::arity_mismatch",
            ErrorKind::RecursionLimit => "while_sema::recursion_limit",
            ErrorKind::InternalError => "while_sema::internal",
        }
    }
}

#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct SemanticError {
    pub kind: ErrorKind,
    pub path: PathBuf,
    pub span: Span,
    pub message: String,
    pub label: String,
    pub help: Option<String>,
}

impl SemanticError {
    pub fn new(kind: ErrorKind, path: &Path, span: Span, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            path: path.to_path_buf(),
            span,
            label: message.clone(),
            message,
            help: None,
        }
    }

    pub fn internal(path: &Path, span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, path, span, message)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn display_message(&self) -> String {
        format!("[{}] {}", self.kind.code(), self.message)
    }
}
