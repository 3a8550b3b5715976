use crate::language::ast::*;
use log::{debug, warn};
use std::collections::HashMap;

/// Declarations of one compilation unit grouped by kind.
///
/// Built once and only read afterwards. Redeclaring a name within a kind
/// replaces the earlier declaration.
#[derive(Debug, Default)]
pub struct SymbolTables<'a> {
    pub methods: HashMap<String, &'a MethodDecl>,
    pub types: HashMap<String, &'a TypeDecl>,
    pub macros: HashMap<String, &'a MacroDecl>,
}

impl<'a> SymbolTables<'a> {
    pub fn build(program: &'a Program) -> Self {
        let mut tables = SymbolTables::default();
        for decl in &program.decls {
            let replaced = match decl {
                Decl::Method(def) => tables.methods.insert(def.name.clone(), def).is_some(),
                Decl::Type(def) => tables.types.insert(def.name.clone(), def).is_some(),
                Decl::Macro(def) => tables.macros.insert(def.name.clone(), def).is_some(),
            };
            if replaced {
                warn!(
                    "{}: redeclaration of `{}` replaces the earlier one",
                    program.path.display(),
                    decl.name()
                );
            }
        }
        debug!(
            "{}: {} method(s), {} type(s), {} macro(s)",
            program.path.display(),
            tables.methods.len(),
            tables.types.len(),
            tables.macros.len()
        );
        tables
    }

    pub fn method(&self, name: &str) -> Option<&'a MethodDecl> {
        self.methods.get(name).copied()
    }

    pub fn type_decl(&self, name: &str) -> Option<&'a TypeDecl> {
        self.types.get(name).copied()
    }

    pub fn macro_decl(&self, name: &str) -> Option<&'a MacroDecl> {
        self.macros.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{span::Span, types::Type};

    fn type_decl(name: &str, ty: Type) -> Decl {
        Decl::Type(TypeDecl {
            name: name.into(),
            ty,
            span: Span::default(),
        })
    }

    #[test]
    fn partitions_declarations_by_kind() {
        let program = Program::new(
            "t.while",
            vec![
                type_decl("Point", Type::record([(Type::Int, "x")])),
                Decl::Macro(MacroDecl {
                    name: "Point".into(),
                    params: Vec::new(),
                    body: Expr::constant(Value::Int(1), Span::default()),
                    span: Span::default(),
                }),
            ],
        );
        let tables = SymbolTables::build(&program);
        assert!(tables.type_decl("Point").is_some());
        assert!(tables.macro_decl("Point").is_some());
        assert!(tables.method("Point").is_none());
    }

    #[test]
    fn later_declaration_wins() {
        let program = Program::new(
            "t.while",
            vec![type_decl("T", Type::Int), type_decl("T", Type::Bool)],
        );
        let tables = SymbolTables::build(&program);
        assert_eq!(tables.type_decl("T").map(|decl| &decl.ty), Some(&Type::Bool));
    }
}
