use crate::language::{
    ast::*,
    env::Environment,
    errors::{ErrorKind, SemanticError, SemanticResult},
    span::Span,
    symbols::SymbolTables,
};
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::env;
use std::path::Path;

pub const DEFAULT_DEPTH_LIMIT: usize = 32;

#[derive(Clone, Debug)]
pub struct ExpandOptions {
    /// Maximum number of nested macro instantiations.
    pub depth_limit: usize,
    /// Reject invocations whose argument count differs from the macro's
    /// parameter count. When off, arguments bind positionally and surplus
    /// arguments or parameters are left unbound.
    pub validate_arity: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            validate_arity: true,
        }
    }
}

impl ExpandOptions {
    /// Defaults overridden by `WHILE_SEMA_MACRO_DEPTH` and
    /// `WHILE_SEMA_LENIENT_ARITY`.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(limit) = env::var("WHILE_SEMA_MACRO_DEPTH")
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
        {
            options.depth_limit = limit;
        }
        if let Ok(raw) = env::var("WHILE_SEMA_LENIENT_ARITY") {
            options.validate_arity = !matches!(raw.trim(), "1" | "true" | "yes");
        }
        options
    }
}

struct Context<'a> {
    tables: &'a SymbolTables<'a>,
    path: &'a Path,
    options: &'a ExpandOptions,
}

pub fn expand_program(program: &Program) -> SemanticResult<Program> {
    expand_program_with_options(program, &ExpandOptions::default())
}

/// Returns a new program in which every macro invocation reachable from a
/// method body has been replaced by the instantiated macro body.
pub fn expand_program_with_options(
    program: &Program,
    options: &ExpandOptions,
) -> SemanticResult<Program> {
    let tables = SymbolTables::build(program);
    let cx = Context {
        tables: &tables,
        path: &program.path,
        options,
    };
    let decls = program
        .decls
        .iter()
        .map(|decl| match decl {
            Decl::Method(def) => expand_method(def, &cx).map(Decl::Method),
            Decl::Type(_) | Decl::Macro(_) => Ok(decl.clone()),
        })
        .collect::<SemanticResult<Vec<_>>>()?;
    Ok(Program {
        path: program.path.clone(),
        decls,
    })
}

fn expand_method(def: &MethodDecl, cx: &Context<'_>) -> SemanticResult<MethodDecl> {
    debug!("{}: expanding method `{}`", cx.path.display(), def.name);
    let mut env = Environment::from_params(&def.params);
    let body = expand_block(&def.body, cx, &mut env)?;
    Ok(MethodDecl {
        name: def.name.clone(),
        ret: def.ret.clone(),
        params: def.params.clone(),
        body,
        span: def.span,
    })
}

fn expand_block(
    stmts: &[Stmt],
    cx: &Context<'_>,
    env: &mut Environment,
) -> SemanticResult<Vec<Stmt>> {
    stmts
        .iter()
        .map(|stmt| expand_statement(stmt, cx, env))
        .collect()
}

fn expand_scoped_block(
    stmts: &[Stmt],
    cx: &Context<'_>,
    env: &mut Environment,
) -> SemanticResult<Vec<Stmt>> {
    env.push_scope();
    let block = expand_block(stmts, cx, env);
    env.pop_scope();
    block
}

fn expand_statement(
    stmt: &Stmt,
    cx: &Context<'_>,
    env: &mut Environment,
) -> SemanticResult<Stmt> {
    let stmt = match stmt {
        Stmt::Assert(inner) => Stmt::Assert(expand_expr_stmt(inner, cx, env)?),
        Stmt::Print(inner) => Stmt::Print(expand_expr_stmt(inner, cx, env)?),
        Stmt::Assign(assign) => {
            let lhs = expand_expr(&assign.lhs, cx, env, 0)?;
            if !lhs.is_lvalue() {
                return Err(SemanticError::internal(
                    cx.path,
                    assign.lhs.span,
                    format!("assignment target is not an lvalue after expansion: {:?}", lhs.kind),
                ));
            }
            Stmt::Assign(AssignStmt {
                lhs,
                rhs: expand_expr(&assign.rhs, cx, env, 0)?,
                span: assign.span,
            })
        }
        Stmt::Return(ret) => Stmt::Return(ReturnStmt {
            expr: expand_optional(ret.expr.as_ref(), cx, env)?,
            span: ret.span,
        }),
        Stmt::Break(_) | Stmt::Continue(_) => stmt.clone(),
        Stmt::VariableDeclaration(decl) => {
            Stmt::VariableDeclaration(expand_var_decl(decl, cx, env)?)
        }
        Stmt::IfElse(if_else) => Stmt::IfElse(IfElseStmt {
            condition: expand_expr(&if_else.condition, cx, env, 0)?,
            then_branch: expand_scoped_block(&if_else.then_branch, cx, env)?,
            else_branch: expand_scoped_block(&if_else.else_branch, cx, env)?,
            span: if_else.span,
        }),
        Stmt::For(for_stmt) => {
            env.push_scope();
            let expanded = expand_for(for_stmt, cx, env);
            env.pop_scope();
            Stmt::For(expanded?)
        }
        Stmt::While(while_stmt) => Stmt::While(expand_while(while_stmt, cx, env)?),
        Stmt::DoWhile(while_stmt) => Stmt::DoWhile(expand_while(while_stmt, cx, env)?),
        Stmt::Switch(switch) => Stmt::Switch(expand_switch(switch, cx, env)?),
        Stmt::Invoke(invoke) => Stmt::Invoke(InvokeStmt {
            name: invoke.name.clone(),
            args: expand_exprs(&invoke.args, cx, env, 0)?,
            span: invoke.span,
        }),
    };
    Ok(stmt)
}

fn expand_expr_stmt(
    stmt: &ExprStmt,
    cx: &Context<'_>,
    env: &Environment,
) -> SemanticResult<ExprStmt> {
    Ok(ExprStmt {
        expr: expand_expr(&stmt.expr, cx, env, 0)?,
        span: stmt.span,
    })
}

fn expand_optional(
    expr: Option<&Expr>,
    cx: &Context<'_>,
    env: &Environment,
) -> SemanticResult<Option<Expr>> {
    expr.map(|expr| expand_expr(expr, cx, env, 0)).transpose()
}

fn expand_var_decl(
    decl: &VarDecl,
    cx: &Context<'_>,
    env: &mut Environment,
) -> SemanticResult<VarDecl> {
    let init = expand_optional(decl.init.as_ref(), cx, env)?;
    // Redeclarations are the type checker's to report.
    env.declare(&decl.name, decl.ty.clone());
    Ok(VarDecl {
        ty: decl.ty.clone(),
        name: decl.name.clone(),
        init,
        span: decl.span,
    })
}

fn expand_for(
    for_stmt: &ForStmt,
    cx: &Context<'_>,
    env: &mut Environment,
) -> SemanticResult<ForStmt> {
    let decl = expand_var_decl(&for_stmt.decl, cx, env)?;
    let condition = expand_expr(&for_stmt.condition, cx, env, 0)?;
    let increment = expand_statement(&for_stmt.increment, cx, env)?;
    let body = expand_scoped_block(&for_stmt.body, cx, env)?;
    Ok(ForStmt {
        decl,
        condition,
        increment: Box::new(increment),
        body,
        span: for_stmt.span,
    })
}

fn expand_while(
    while_stmt: &WhileStmt,
    cx: &Context<'_>,
    env: &mut Environment,
) -> SemanticResult<WhileStmt> {
    Ok(WhileStmt {
        condition: expand_expr(&while_stmt.condition, cx, env, 0)?,
        body: expand_scoped_block(&while_stmt.body, cx, env)?,
        span: while_stmt.span,
    })
}

fn expand_switch(
    switch: &SwitchStmt,
    cx: &Context<'_>,
    env: &mut Environment,
) -> SemanticResult<SwitchStmt> {
    let expr = expand_expr(&switch.expr, cx, env, 0)?;
    let mut cases = Vec::with_capacity(switch.cases.len());
    for case in &switch.cases {
        let value = expand_optional(case.value.as_ref(), cx, env)?;
        if let Some(value) = &value {
            if !value.is_constant() {
                return Err(SemanticError::internal(
                    cx.path,
                    case.span,
                    format!("switch case is not a constant after expansion: {:?}", value.kind),
                ));
            }
        }
        cases.push(SwitchCase {
            value,
            body: expand_scoped_block(&case.body, cx, env)?,
            span: case.span,
        });
    }
    Ok(SwitchStmt {
        expr,
        cases,
        span: switch.span,
    })
}

fn expand_exprs(
    exprs: &[Expr],
    cx: &Context<'_>,
    env: &Environment,
    depth: usize,
) -> SemanticResult<Vec<Expr>> {
    exprs
        .iter()
        .map(|expr| expand_expr(expr, cx, env, depth))
        .collect()
}

fn expand_boxed(
    expr: &Expr,
    cx: &Context<'_>,
    env: &Environment,
    depth: usize,
) -> SemanticResult<Box<Expr>> {
    expand_expr(expr, cx, env, depth).map(Box::new)
}

/// `depth` counts the macro instantiations enclosing `expr`.
fn expand_expr(
    expr: &Expr,
    cx: &Context<'_>,
    env: &Environment,
    depth: usize,
) -> SemanticResult<Expr> {
    let kind = match &expr.kind {
        ExprKind::Invoke { name, args } => {
            let args = expand_exprs(args, cx, env, depth)?;
            if let Some(def) = cx.tables.macro_decl(name) {
                return expand_invocation(def, args, expr, cx, env, depth);
            }
            ExprKind::Invoke {
                name: name.clone(),
                args,
            }
        }
        ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
            op: *op,
            lhs: expand_boxed(lhs, cx, env, depth)?,
            rhs: expand_boxed(rhs, cx, env, depth)?,
        },
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op: *op,
            operand: expand_boxed(operand, cx, env, depth)?,
        },
        ExprKind::IndexOf { source, index } => ExprKind::IndexOf {
            source: expand_boxed(source, cx, env, depth)?,
            index: expand_boxed(index, cx, env, depth)?,
        },
        ExprKind::ArrayGenerator { value, size } => ExprKind::ArrayGenerator {
            value: expand_boxed(value, cx, env, depth)?,
            size: expand_boxed(size, cx, env, depth)?,
        },
        ExprKind::ArrayInitialiser(items) => {
            ExprKind::ArrayInitialiser(expand_exprs(items, cx, env, depth)?)
        }
        ExprKind::RecordAccess { source, field } => ExprKind::RecordAccess {
            source: expand_boxed(source, cx, env, depth)?,
            field: field.clone(),
        },
        ExprKind::RecordConstructor(fields) => ExprKind::RecordConstructor(
            fields
                .iter()
                .map(|(name, value)| -> SemanticResult<(String, Expr)> {
                    Ok((name.clone(), expand_expr(value, cx, env, depth)?))
                })
                .collect::<SemanticResult<Vec<_>>>()?,
        ),
        ExprKind::Constant(_) | ExprKind::Variable(_) => return Ok(expr.clone()),
    };
    Ok(Expr {
        kind,
        span: expr.span,
        ty: expr.ty.clone(),
    })
}

/// Instantiates `def` at `call`.
///
/// Only the immediate operands of a binary or unary body are substituted;
/// parameter references nested deeper in the body stay as they are.
fn expand_invocation(
    def: &MacroDecl,
    args: Vec<Expr>,
    call: &Expr,
    cx: &Context<'_>,
    env: &Environment,
    depth: usize,
) -> SemanticResult<Expr> {
    if depth >= cx.options.depth_limit {
        return Err(SemanticError::new(
            ErrorKind::RecursionLimit,
            cx.path,
            call.span,
            format!(
                "expansion of macro `{}` exceeded the limit of {} nested instantiations",
                def.name, cx.options.depth_limit
            ),
        )
        .with_help("a macro body may not invoke itself, directly or indirectly"));
    }
    if cx.options.validate_arity && def.params.len() != args.len() {
        return Err(SemanticError::new(
            ErrorKind::ArityMismatch,
            cx.path,
            call.span,
            format!(
                "macro `{}` expects {} argument(s), found {}",
                def.name,
                def.params.len(),
                args.len()
            ),
        ));
    }
    trace!(
        "{}: instantiating macro `{}` at {}..{} (depth {})",
        cx.path.display(),
        def.name,
        call.span.start,
        call.span.end,
        depth
    );
    let bindings: HashMap<&str, Expr> = def
        .params
        .iter()
        .map(|param| param.name.as_str())
        .zip(args.iter().cloned())
        .collect();
    let substitution = Substitution {
        def,
        bindings: &bindings,
        env,
        call_span: call.span,
    };

    let body = expand_expr(&def.body, cx, env, depth + 1)?;
    let kind = match body.kind {
        ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
            op,
            lhs: Box::new(substitution.apply(*lhs)),
            rhs: Box::new(substitution.apply(*rhs)),
        },
        ExprKind::Constant(value) => ExprKind::Constant(value),
        ExprKind::Unary { op, operand } => {
            let operand = substitution.apply(*operand);
            ExprKind::Unary {
                op,
                operand: expand_boxed(&operand, cx, env, depth + 1)?,
            }
        }
        _ => {
            warn!(
                "{}: body of macro `{}` is not a binary, unary or constant expression; invocation left unexpanded",
                cx.path.display(),
                def.name
            );
            ExprKind::Invoke {
                name: def.name.clone(),
                args,
            }
        }
    };
    Ok(Expr {
        kind,
        span: call.span,
        ty: call.ty.clone(),
    })
}

struct Substitution<'s> {
    def: &'s MacroDecl,
    bindings: &'s HashMap<&'s str, Expr>,
    env: &'s Environment,
    call_span: Span,
}

impl Substitution<'_> {
    /// Replaces `operand` with its argument if it is a bare parameter
    /// reference.
    fn apply(&self, operand: Expr) -> Expr {
        let Some(name) = operand.as_variable() else {
            return operand;
        };
        if let Some(arg) = self.bindings.get(name) {
            return arg.clone();
        }
        if !self.env.contains(name) {
            warn!(
                "macro `{}` refers to `{}`, which is neither a parameter nor in scope at {}..{}",
                self.def.name, name, self.call_span.start, self.call_span.end
            );
        }
        operand
    }
}
