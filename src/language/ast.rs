use crate::language::{span::Span, types::Type};
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub path: PathBuf,
    pub decls: Vec<Decl>,
}

impl Program {
    pub fn new(path: impl Into<PathBuf>, decls: Vec<Decl>) -> Self {
        Self {
            path: path.into(),
            decls,
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Method(def) => Some(def),
            _ => None,
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods().find(|def| def.name == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Method(MethodDecl),
    Type(TypeDecl),
    Macro(MacroDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Method(def) => &def.name,
            Decl::Type(def) => &def.name,
            Decl::Macro(def) => &def.name,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub ret: Type,
    pub params: Vec<Parameter>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MacroDecl {
    pub name: String,
    pub params: Vec<Identifier>,
    pub body: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Assert(ExprStmt),
    Assign(AssignStmt),
    Print(ExprStmt),
    Return(ReturnStmt),
    Break(Span),
    Continue(Span),
    VariableDeclaration(VarDecl),
    IfElse(IfElseStmt),
    For(ForStmt),
    While(WhileStmt),
    DoWhile(WhileStmt),
    Switch(SwitchStmt),
    Invoke(InvokeStmt),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignStmt {
    pub lhs: Expr,
    pub rhs: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStmt {
    pub expr: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub ty: Type,
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfElseStmt {
    pub condition: Expr,
    pub then_branch: Vec<Stmt>,
    pub else_branch: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub decl: VarDecl,
    pub condition: Expr,
    pub increment: Box<Stmt>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Shared by `while` and `do ... while`; only evaluation order differs.
#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchStmt {
    pub expr: Expr,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    /// `None` is the `default` case.
    pub value: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InvokeStmt {
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Filled in by the type checker.
    pub ty: Option<Type>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Constant(Value),
    Variable(String),
    IndexOf {
        source: Box<Expr>,
        index: Box<Expr>,
    },
    Invoke {
        name: String,
        args: Vec<Expr>,
    },
    ArrayGenerator {
        value: Box<Expr>,
        size: Box<Expr>,
    },
    ArrayInitialiser(Vec<Expr>),
    RecordAccess {
        source: Box<Expr>,
        field: String,
    },
    RecordConstructor(Vec<(String, Expr)>),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }

    pub fn with_type(self, ty: Type) -> Self {
        Self {
            ty: Some(ty),
            ..self
        }
    }

    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Variable(name.into()), span)
    }

    pub fn constant(value: Value, span: Span) -> Self {
        Self::new(ExprKind::Constant(value), span)
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    pub fn unary(op: UnaryOp, operand: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    pub fn invoke(name: impl Into<String>, args: Vec<Expr>, span: Span) -> Self {
        Self::new(
            ExprKind::Invoke {
                name: name.into(),
                args,
            },
            span,
        )
    }

    pub fn index_of(source: Expr, index: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::IndexOf {
                source: Box::new(source),
                index: Box::new(index),
            },
            span,
        )
    }

    pub fn record_access(source: Expr, field: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExprKind::RecordAccess {
                source: Box::new(source),
                field: field.into(),
            },
            span,
        )
    }

    pub fn as_variable(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Variable(_) | ExprKind::IndexOf { .. } | ExprKind::RecordAccess { .. }
        )
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, ExprKind::Constant(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    LengthOf,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::LengthOf => "|..|",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Literal constant value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(char),
    Int(i64),
    String(String),
    Array(Vec<Value>),
    /// Fields in literal order.
    Record(Vec<(String, Value)>),
}
