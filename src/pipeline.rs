use crate::language::{
    ast::Program,
    errors::SemanticResult,
    macro_expander::{expand_program_with_options, ExpandOptions},
    typecheck::{check_program_with_options, TypecheckOptions},
};
use log::debug;

#[derive(Clone, Debug, Default)]
pub struct AnalysisOptions {
    pub expand: ExpandOptions,
    pub typecheck: TypecheckOptions,
}

impl AnalysisOptions {
    pub fn from_env() -> Self {
        Self {
            expand: ExpandOptions::from_env(),
            typecheck: TypecheckOptions::default(),
        }
    }
}

pub fn analyze(program: &Program) -> SemanticResult<Program> {
    analyze_with_options(program, &AnalysisOptions::default())
}

/// Expands macros, then type checks the expanded program.
pub fn analyze_with_options(
    program: &Program,
    options: &AnalysisOptions,
) -> SemanticResult<Program> {
    debug!(
        "{}: analyzing {} declaration(s)",
        program.path.display(),
        program.decls.len()
    );
    let expanded = expand_program_with_options(program, &options.expand)?;
    check_program_with_options(&expanded, &options.typecheck)
}
