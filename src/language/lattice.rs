use crate::language::{
    errors::{ErrorKind, SemanticError, SemanticResult},
    span::Span,
    symbols::SymbolTables,
    types::{Type, TypeKind},
};
use std::path::Path;

/// Subtype, instance-of and equivalence queries over [`Type`], resolving
/// named types through the type table of one compilation unit.
#[derive(Clone, Copy, Debug)]
pub struct TypeLattice<'a> {
    tables: &'a SymbolTables<'a>,
    path: &'a Path,
}

impl<'a> TypeLattice<'a> {
    pub fn new(tables: &'a SymbolTables<'a>, path: &'a Path) -> Self {
        Self { tables, path }
    }

    pub fn path(&self) -> &'a Path {
        self.path
    }

    /// Follows `Named` references until a structural type is reached.
    pub fn resolve(&self, ty: &Type, span: Span) -> SemanticResult<Type> {
        let mut current = ty;
        let mut visited: Vec<&str> = Vec::new();
        while let Type::Named(name) = current {
            if visited.contains(&name.as_str()) {
                return Err(SemanticError::new(
                    ErrorKind::CyclicType,
                    self.path,
                    span,
                    format!("type `{}` is defined in terms of itself", name),
                )
                .with_help(format!("alias chain: {} -> {}", visited.join(" -> "), name)));
            }
            visited.push(name);
            current = match self.tables.type_decl(name) {
                Some(decl) => &decl.ty,
                None => {
                    return Err(SemanticError::new(
                        ErrorKind::UnknownType,
                        self.path,
                        span,
                        format!("unknown type `{}`", name),
                    ))
                }
            };
        }
        Ok(current.clone())
    }

    pub fn is_subtype(&self, sup: &Type, sub: &Type, span: Span) -> SemanticResult<bool> {
        self.subtype(sup, sub, span, &mut Vec::new())
    }

    fn subtype(
        &self,
        sup: &Type,
        sub: &Type,
        span: Span,
        assumed: &mut Vec<(Type, Type)>,
    ) -> SemanticResult<bool> {
        match (sup, sub) {
            (_, Type::Void) => Ok(true),
            (Type::Bool, Type::Bool)
            | (Type::Char, Type::Char)
            | (Type::Int, Type::Int)
            | (Type::String, Type::String) => Ok(true),
            (Type::Array(sup_elem), Type::Array(sub_elem)) => {
                self.subtype(sup_elem, sub_elem, span, assumed)
            }
            (Type::Record(sup_fields), Type::Record(sub_fields)) => {
                if sup_fields.len() > sub_fields.len() {
                    return Ok(false);
                }
                // Fields are matched by position, not looked up by name.
                for (expected, actual) in sup_fields.iter().zip(sub_fields) {
                    if expected.name != actual.name
                        || !self.subtype(&expected.ty, &actual.ty, span, assumed)?
                    {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Type::Named(_), _) | (_, Type::Named(_)) => {
                let pair = (sup.clone(), sub.clone());
                if assumed.contains(&pair) {
                    return Ok(true);
                }
                let sup_resolved = self.resolve(sup, span)?;
                let sub_resolved = self.resolve(sub, span)?;
                assumed.push(pair);
                let result = self.subtype(&sup_resolved, &sub_resolved, span, assumed);
                assumed.pop();
                result
            }
            _ => Ok(false),
        }
    }

    pub fn check_subtype(&self, sup: &Type, sub: &Type, span: Span) -> SemanticResult<()> {
        if self.is_subtype(sup, sub, span)? {
            Ok(())
        } else {
            Err(SemanticError::new(
                ErrorKind::TypeMismatch,
                self.path,
                span,
                format!("expected type `{}`, found `{}`", sup, sub),
            ))
        }
    }

    /// Returns the resolved type when its kind is one of `kinds`.
    pub fn check_instance_of(
        &self,
        ty: &Type,
        span: Span,
        kinds: &[TypeKind],
    ) -> SemanticResult<Type> {
        let resolved = self.resolve(ty, span)?;
        match resolved.kind() {
            Some(kind) if kinds.contains(&kind) => Ok(resolved),
            _ => {
                let expected: Vec<&str> = kinds.iter().map(|kind| kind.name()).collect();
                Err(SemanticError::new(
                    ErrorKind::TypeMismatch,
                    self.path,
                    span,
                    format!(
                        "expected instance of {}, found `{}`",
                        expected.join(" or "),
                        ty
                    ),
                ))
            }
        }
    }

    pub fn equivalent(&self, lhs: &Type, rhs: &Type, span: Span) -> SemanticResult<bool> {
        Ok(self.is_subtype(lhs, rhs, span)? && self.is_subtype(rhs, lhs, span)?)
    }

    /// True when either type is a subtype of the other.
    pub fn comparable(&self, lhs: &Type, rhs: &Type, span: Span) -> SemanticResult<bool> {
        Ok(self.is_subtype(lhs, rhs, span)? || self.is_subtype(rhs, lhs, span)?)
    }
}
