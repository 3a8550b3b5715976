use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    Char,
    Int,
    String,
    Array(Box<Type>),
    Record(Vec<RecordField>),
    Named(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordField {
    pub ty: Type,
    pub name: String,
}

impl RecordField {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// Runtime shape of a structural type, used by instance-of checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Bool,
    Char,
    Int,
    String,
    Array,
    Record,
}

impl TypeKind {
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Void => "void",
            TypeKind::Bool => "bool",
            TypeKind::Char => "char",
            TypeKind::Int => "int",
            TypeKind::String => "string",
            TypeKind::Array => "array",
            TypeKind::Record => "record",
        }
    }
}

impl Type {
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (Type, S)>,
        S: Into<String>,
    {
        Type::Record(
            fields
                .into_iter()
                .map(|(ty, name)| RecordField::new(ty, name))
                .collect(),
        )
    }

    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    /// `None` for `Named`, which has no shape until resolved.
    pub fn kind(&self) -> Option<TypeKind> {
        match self {
            Type::Void => Some(TypeKind::Void),
            Type::Bool => Some(TypeKind::Bool),
            Type::Char => Some(TypeKind::Char),
            Type::Int => Some(TypeKind::Int),
            Type::String => Some(TypeKind::String),
            Type::Array(_) => Some(TypeKind::Array),
            Type::Record(_) => Some(TypeKind::Record),
            Type::Named(_) => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        match self {
            Type::Record(fields) => fields
                .iter()
                .find(|field| field.name == name)
                .map(|field| &field.ty),
            _ => None,
        }
    }

    pub fn canonical_name(&self) -> String {
        match self {
            Type::Void => "void".into(),
            Type::Bool => "bool".into(),
            Type::Char => "char".into(),
            Type::Int => "int".into(),
            Type::String => "string".into(),
            Type::Array(element) => format!("{}[]", element.canonical_name()),
            Type::Record(fields) => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{} {}", field.ty.canonical_name(), field.name))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Type::Named(name) => name.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}
