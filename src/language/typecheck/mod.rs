use crate::language::{
    ast::*,
    constants::{least_upper_bound, type_of},
    env::Environment,
    errors::{ErrorKind, SemanticError, SemanticResult},
    lattice::TypeLattice,
    span::Span,
    symbols::SymbolTables,
    types::{Type, TypeKind},
};
use std::path::Path;

#[derive(Clone, Debug)]
pub struct TypecheckOptions {
    /// Return the program with every expression annotated with its type.
    /// When off the program is validated and returned unchanged.
    pub annotate: bool,
}

impl Default for TypecheckOptions {
    fn default() -> Self {
        Self { annotate: true }
    }
}

struct Checker<'a> {
    tables: &'a SymbolTables<'a>,
    lattice: TypeLattice<'a>,
    path: &'a Path,
    /// Return type of the method being checked.
    ret: Type,
}

mod checker;

pub use checker::{check_program, check_program_with_options};
