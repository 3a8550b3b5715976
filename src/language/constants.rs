use crate::language::{
    ast::Value,
    errors::{ErrorKind, SemanticError, SemanticResult},
    lattice::TypeLattice,
    span::Span,
    types::{RecordField, Type},
};
use std::collections::HashSet;

/// Infers the type of a literal constant.
pub fn type_of(lattice: &TypeLattice<'_>, value: &Value, span: Span) -> SemanticResult<Type> {
    match value {
        Value::Bool(_) => Ok(Type::Bool),
        Value::Char(_) => Ok(Type::Char),
        Value::Int(_) => Ok(Type::Int),
        Value::String(_) => Ok(Type::String),
        Value::Array(items) => {
            let types = items
                .iter()
                .map(|item| type_of(lattice, item, span))
                .collect::<SemanticResult<Vec<_>>>()?;
            Ok(Type::array(least_upper_bound(lattice, &types, span)?))
        }
        Value::Record(fields) => {
            let mut seen = HashSet::new();
            let fields = fields
                .iter()
                .map(|(name, value)| -> SemanticResult<RecordField> {
                    if !seen.insert(name.as_str()) {
                        return Err(SemanticError::new(
                            ErrorKind::DuplicateField,
                            lattice.path(),
                            span,
                            format!("duplicate field `{}` in record literal", name),
                        ));
                    }
                    Ok(RecordField::new(type_of(lattice, value, span)?, name))
                })
                .collect::<SemanticResult<Vec<_>>>()?;
            Ok(Type::Record(fields))
        }
    }
}

/// Narrowest type that every element of `types` is a subtype of, starting
/// from `void`.
pub fn least_upper_bound(
    lattice: &TypeLattice<'_>,
    types: &[Type],
    span: Span,
) -> SemanticResult<Type> {
    let mut best = Type::Void;
    for ty in types {
        if lattice.is_subtype(ty, &best, span)? {
            best = ty.clone();
        } else if !lattice.is_subtype(&best, ty, span)? {
            return Err(SemanticError::new(
                ErrorKind::TypeMismatch,
                lattice.path(),
                span,
                format!("no common supertype for `{}` and `{}`", best, ty),
            )
            .with_label("elements of this literal have incompatible types"));
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{ast::Program, symbols::SymbolTables};

    fn infer(value: Value) -> SemanticResult<Type> {
        let program = Program::new("constants.while", Vec::new());
        let tables = SymbolTables::build(&program);
        let lattice = TypeLattice::new(&tables, &program.path);
        type_of(&lattice, &value, Span::new(0, 1))
    }

    #[test]
    fn primitives_map_to_their_types() {
        assert_eq!(infer(Value::Bool(true)).unwrap(), Type::Bool);
        assert_eq!(infer(Value::Char('c')).unwrap(), Type::Char);
        assert_eq!(infer(Value::Int(7)).unwrap(), Type::Int);
        assert_eq!(infer(Value::String("hi".into())).unwrap(), Type::String);
    }

    #[test]
    fn homogeneous_array_infers_element_type() {
        let ty = infer(Value::Array(vec![Value::Int(1), Value::Int(2)])).unwrap();
        assert_eq!(ty, Type::array(Type::Int));
    }

    #[test]
    fn empty_array_infers_void_elements() {
        assert_eq!(infer(Value::Array(Vec::new())).unwrap(), Type::array(Type::Void));
    }

    #[test]
    fn heterogeneous_array_has_no_upper_bound() {
        let err = infer(Value::Array(vec![Value::Int(1), Value::Bool(true)])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn nested_array_takes_broader_record() {
        let wide = Value::Record(vec![
            ("x".into(), Value::Int(1)),
            ("y".into(), Value::Bool(false)),
        ]);
        let narrow = Value::Record(vec![("x".into(), Value::Int(2))]);
        let ty = infer(Value::Array(vec![wide, narrow])).unwrap();
        assert_eq!(ty, Type::array(Type::record([(Type::Int, "x")])));
    }

    #[test]
    fn record_keeps_literal_field_order() {
        let ty = infer(Value::Record(vec![
            ("b".into(), Value::Char('q')),
            ("a".into(), Value::Array(vec![Value::String("s".into())])),
        ]))
        .unwrap();
        assert_eq!(
            ty,
            Type::record([(Type::Char, "b"), (Type::array(Type::String), "a")])
        );
    }

    #[test]
    fn repeated_record_field_is_rejected() {
        let err = infer(Value::Record(vec![
            ("x".into(), Value::Int(1)),
            ("x".into(), Value::Bool(true)),
        ]))
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateField);
        assert!(err.message.contains("`x`"), "{}", err.message);
    }
}
