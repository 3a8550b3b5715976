use super::*;
use log::debug;
use std::collections::HashSet;

pub fn check_program(program: &Program) -> SemanticResult<Program> {
    check_program_with_options(program, &TypecheckOptions::default())
}

/// Type checks an expanded program.
///
/// The first violation is returned; there is no partial output.
pub fn check_program_with_options(
    program: &Program,
    options: &TypecheckOptions,
) -> SemanticResult<Program> {
    let tables = SymbolTables::build(program);
    let mut checker = Checker {
        tables: &tables,
        lattice: TypeLattice::new(&tables, &program.path),
        path: &program.path,
        ret: Type::Void,
    };
    let mut decls = Vec::with_capacity(program.decls.len());
    for decl in &program.decls {
        let checked = match decl {
            Decl::Method(def) => Decl::Method(checker.check_method(def)?),
            Decl::Type(def) => {
                checker.validate_type(&def.ty, def.span)?;
                checker.lattice.resolve(&Type::named(def.name.as_str()), def.span)?;
                decl.clone()
            }
            Decl::Macro(_) => decl.clone(),
        };
        decls.push(checked);
    }
    if !options.annotate {
        return Ok(program.clone());
    }
    Ok(Program {
        path: program.path.clone(),
        decls,
    })
}

impl<'a> Checker<'a> {
    fn check_method(&mut self, def: &MethodDecl) -> SemanticResult<MethodDecl> {
        debug!("{}: checking method `{}`", self.path.display(), def.name);
        self.validate_type(&def.ret, def.span)?;
        let mut env = Environment::new();
        for param in &def.params {
            self.validate_type(&param.ty, param.span)?;
            if !env.declare(&param.name, param.ty.clone()) {
                return Err(self.duplicate_variable(&param.name, param.span));
            }
        }
        self.ret = def.ret.clone();
        let body = self.check_block(&def.body, &mut env)?;
        Ok(MethodDecl {
            name: def.name.clone(),
            ret: def.ret.clone(),
            params: def.params.clone(),
            body,
            span: def.span,
        })
    }

    /// Every named type must resolve and record field names must be unique.
    fn validate_type(&self, ty: &Type, span: Span) -> SemanticResult<()> {
        match ty {
            Type::Named(_) => self.lattice.resolve(ty, span).map(|_| ()),
            Type::Array(element) => self.validate_type(element, span),
            Type::Record(fields) => {
                let mut seen = HashSet::new();
                for field in fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(SemanticError::new(
                            ErrorKind::DuplicateField,
                            self.path,
                            span,
                            format!("field `{}` is declared more than once in `{}`", field.name, ty),
                        ));
                    }
                    self.validate_type(&field.ty, span)?;
                }
                Ok(())
            }
            Type::Void | Type::Bool | Type::Char | Type::Int | Type::String => Ok(()),
        }
    }

    fn check_block(&mut self, stmts: &[Stmt], env: &mut Environment) -> SemanticResult<Vec<Stmt>> {
        stmts.iter().map(|stmt| self.check_stmt(stmt, env)).collect()
    }

    fn check_scoped_block(
        &mut self,
        stmts: &[Stmt],
        env: &mut Environment,
    ) -> SemanticResult<Vec<Stmt>> {
        env.push_scope();
        let block = self.check_block(stmts, env);
        env.pop_scope();
        block
    }

    fn check_stmt(&mut self, stmt: &Stmt, env: &mut Environment) -> SemanticResult<Stmt> {
        let checked = match stmt {
            Stmt::Assert(inner) => Stmt::Assert(ExprStmt {
                expr: self.check_condition(&inner.expr, env)?,
                span: inner.span,
            }),
            Stmt::Print(inner) => Stmt::Print(ExprStmt {
                expr: self.check_expr(&inner.expr, env)?.0,
                span: inner.span,
            }),
            Stmt::Assign(assign) => {
                if !assign.lhs.is_lvalue() {
                    return Err(SemanticError::internal(
                        self.path,
                        assign.lhs.span,
                        format!("assignment target is not an lvalue: {:?}", assign.lhs.kind),
                    ));
                }
                let (lhs, lhs_ty) = self.check_expr(&assign.lhs, env)?;
                let (rhs, rhs_ty) = self.check_expr(&assign.rhs, env)?;
                self.lattice.check_subtype(&lhs_ty, &rhs_ty, rhs.span)?;
                Stmt::Assign(AssignStmt {
                    lhs,
                    rhs,
                    span: assign.span,
                })
            }
            Stmt::Return(ret) => {
                let expr = match &ret.expr {
                    Some(expr) => {
                        let (expr, ty) = self.check_expr(expr, env)?;
                        self.lattice.check_subtype(&self.ret, &ty, expr.span)?;
                        Some(expr)
                    }
                    None => None,
                };
                Stmt::Return(ReturnStmt {
                    expr,
                    span: ret.span,
                })
            }
            Stmt::Break(_) | Stmt::Continue(_) => stmt.clone(),
            Stmt::VariableDeclaration(decl) => {
                Stmt::VariableDeclaration(self.check_var_decl(decl, env)?)
            }
            Stmt::IfElse(if_else) => Stmt::IfElse(IfElseStmt {
                condition: self.check_condition(&if_else.condition, env)?,
                then_branch: self.check_scoped_block(&if_else.then_branch, env)?,
                else_branch: self.check_scoped_block(&if_else.else_branch, env)?,
                span: if_else.span,
            }),
            Stmt::For(for_stmt) => {
                env.push_scope();
                let checked = self.check_for(for_stmt, env);
                env.pop_scope();
                Stmt::For(checked?)
            }
            Stmt::While(while_stmt) => Stmt::While(self.check_while(while_stmt, env)?),
            Stmt::DoWhile(while_stmt) => Stmt::DoWhile(self.check_while(while_stmt, env)?),
            Stmt::Switch(switch) => Stmt::Switch(self.check_switch(switch, env)?),
            Stmt::Invoke(invoke) => {
                let (args, _) = self.check_call(&invoke.name, &invoke.args, invoke.span, env)?;
                Stmt::Invoke(InvokeStmt {
                    name: invoke.name.clone(),
                    args,
                    span: invoke.span,
                })
            }
        };
        Ok(checked)
    }

    fn check_var_decl(&mut self, decl: &VarDecl, env: &mut Environment) -> SemanticResult<VarDecl> {
        self.validate_type(&decl.ty, decl.span)?;
        if env.contains(&decl.name) {
            return Err(self.duplicate_variable(&decl.name, decl.span));
        }
        let init = match &decl.init {
            Some(init) => {
                let (init, ty) = self.check_expr(init, env)?;
                self.lattice.check_subtype(&decl.ty, &ty, init.span)?;
                Some(init)
            }
            None => None,
        };
        env.declare(&decl.name, decl.ty.clone());
        Ok(VarDecl {
            ty: decl.ty.clone(),
            name: decl.name.clone(),
            init,
            span: decl.span,
        })
    }

    fn check_for(&mut self, for_stmt: &ForStmt, env: &mut Environment) -> SemanticResult<ForStmt> {
        let decl = self.check_var_decl(&for_stmt.decl, env)?;
        let condition = self.check_condition(&for_stmt.condition, env)?;
        let increment = self.check_stmt(&for_stmt.increment, env)?;
        let body = self.check_scoped_block(&for_stmt.body, env)?;
        Ok(ForStmt {
            decl,
            condition,
            increment: Box::new(increment),
            body,
            span: for_stmt.span,
        })
    }

    fn check_while(
        &mut self,
        while_stmt: &WhileStmt,
        env: &mut Environment,
    ) -> SemanticResult<WhileStmt> {
        Ok(WhileStmt {
            condition: self.check_condition(&while_stmt.condition, env)?,
            body: self.check_scoped_block(&while_stmt.body, env)?,
            span: while_stmt.span,
        })
    }

    fn check_switch(
        &mut self,
        switch: &SwitchStmt,
        env: &mut Environment,
    ) -> SemanticResult<SwitchStmt> {
        let (expr, expr_ty) = self.check_expr(&switch.expr, env)?;
        let mut cases = Vec::with_capacity(switch.cases.len());
        for case in &switch.cases {
            let value = match &case.value {
                Some(value) => {
                    let (value, ty) = self.check_expr(value, env)?;
                    self.lattice.check_subtype(&expr_ty, &ty, value.span)?;
                    Some(value)
                }
                None => None,
            };
            cases.push(SwitchCase {
                value,
                body: self.check_scoped_block(&case.body, env)?,
                span: case.span,
            });
        }
        Ok(SwitchStmt {
            expr,
            cases,
            span: switch.span,
        })
    }

    fn check_condition(&self, expr: &Expr, env: &Environment) -> SemanticResult<Expr> {
        let (expr, ty) = self.check_expr(expr, env)?;
        self.lattice
            .check_instance_of(&ty, expr.span, &[TypeKind::Bool])?;
        Ok(expr)
    }

    fn check_expr(&self, expr: &Expr, env: &Environment) -> SemanticResult<(Expr, Type)> {
        let span = expr.span;
        let (kind, ty) = match &expr.kind {
            ExprKind::Constant(value) => (expr.kind.clone(), type_of(&self.lattice, value, span)?),
            ExprKind::Variable(name) => match env.lookup(name) {
                Some(ty) => (expr.kind.clone(), ty.clone()),
                None => {
                    return Err(SemanticError::new(
                        ErrorKind::UnknownVariable,
                        self.path,
                        span,
                        format!("unknown variable `{}`", name),
                    ))
                }
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let (lhs, lhs_ty) = self.check_expr(lhs, env)?;
                let (rhs, rhs_ty) = self.check_expr(rhs, env)?;
                let ty = self.check_binary(*op, (&lhs, &lhs_ty), (&rhs, &rhs_ty), span)?;
                let kind = ExprKind::Binary {
                    op: *op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                (kind, ty)
            }
            ExprKind::Unary { op, operand } => {
                let (operand, operand_ty) = self.check_expr(operand, env)?;
                let ty = match op {
                    UnaryOp::Not => {
                        self.expect_kind(&operand, &operand_ty, TypeKind::Bool)?;
                        Type::Bool
                    }
                    UnaryOp::Neg => {
                        self.expect_kind(&operand, &operand_ty, TypeKind::Int)?;
                        Type::Int
                    }
                    UnaryOp::LengthOf => {
                        self.lattice.check_instance_of(
                            &operand_ty,
                            operand.span,
                            &[TypeKind::Array, TypeKind::String],
                        )?;
                        Type::Int
                    }
                };
                let kind = ExprKind::Unary {
                    op: *op,
                    operand: Box::new(operand),
                };
                (kind, ty)
            }
            ExprKind::IndexOf { source, index } => {
                let (source, source_ty) = self.check_expr(source, env)?;
                let (index, index_ty) = self.check_expr(index, env)?;
                self.expect_kind(&index, &index_ty, TypeKind::Int)?;
                let resolved = self.lattice.check_instance_of(
                    &source_ty,
                    source.span,
                    &[TypeKind::Array, TypeKind::String],
                )?;
                let ty = match resolved {
                    Type::Array(element) => *element,
                    _ => Type::Char,
                };
                let kind = ExprKind::IndexOf {
                    source: Box::new(source),
                    index: Box::new(index),
                };
                (kind, ty)
            }
            ExprKind::Invoke { name, args } => {
                let (args, ty) = self.check_call(name, args, span, env)?;
                let kind = ExprKind::Invoke {
                    name: name.clone(),
                    args,
                };
                (kind, ty)
            }
            ExprKind::ArrayGenerator { value, size } => {
                let (value, value_ty) = self.check_expr(value, env)?;
                let (size, size_ty) = self.check_expr(size, env)?;
                self.expect_kind(&size, &size_ty, TypeKind::Int)?;
                let kind = ExprKind::ArrayGenerator {
                    value: Box::new(value),
                    size: Box::new(size),
                };
                (kind, Type::array(value_ty))
            }
            ExprKind::ArrayInitialiser(items) => {
                let mut checked = Vec::with_capacity(items.len());
                let mut types = Vec::with_capacity(items.len());
                for item in items {
                    let (item, ty) = self.check_expr(item, env)?;
                    checked.push(item);
                    types.push(ty);
                }
                let element = least_upper_bound(&self.lattice, &types, span)?;
                (ExprKind::ArrayInitialiser(checked), Type::array(element))
            }
            ExprKind::RecordAccess { source, field } => {
                let (source, source_ty) = self.check_expr(source, env)?;
                let resolved =
                    self.lattice
                        .check_instance_of(&source_ty, source.span, &[TypeKind::Record])?;
                let ty = match resolved.field(field) {
                    Some(ty) => ty.clone(),
                    None => {
                        return Err(SemanticError::new(
                            ErrorKind::MissingField,
                            self.path,
                            span,
                            format!("expected type `{}` to contain field `{}`", source_ty, field),
                        ))
                    }
                };
                let kind = ExprKind::RecordAccess {
                    source: Box::new(source),
                    field: field.clone(),
                };
                (kind, ty)
            }
            ExprKind::RecordConstructor(fields) => {
                let mut checked = Vec::with_capacity(fields.len());
                let mut field_types = Vec::with_capacity(fields.len());
                for (name, value) in fields {
                    let (value, ty) = self.check_expr(value, env)?;
                    checked.push((name.clone(), value));
                    field_types.push((ty, name.clone()));
                }
                let ty = Type::record(field_types);
                self.validate_type(&ty, span)?;
                (ExprKind::RecordConstructor(checked), ty)
            }
        };
        Ok((Expr::new(kind, span).with_type(ty.clone()), ty))
    }

    fn check_binary(
        &self,
        op: BinaryOp,
        (lhs, lhs_ty): (&Expr, &Type),
        (rhs, rhs_ty): (&Expr, &Type),
        span: Span,
    ) -> SemanticResult<Type> {
        match op {
            BinaryOp::And | BinaryOp::Or => {
                self.expect_kind(lhs, lhs_ty, TypeKind::Bool)?;
                self.expect_kind(rhs, rhs_ty, TypeKind::Bool)?;
                Ok(Type::Bool)
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                self.expect_kind(lhs, lhs_ty, TypeKind::Int)?;
                self.expect_kind(rhs, rhs_ty, TypeKind::Int)?;
                Ok(Type::Int)
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                self.expect_kind(lhs, lhs_ty, TypeKind::Int)?;
                self.expect_kind(rhs, rhs_ty, TypeKind::Int)?;
                Ok(Type::Bool)
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                if !self.lattice.comparable(lhs_ty, rhs_ty, span)? {
                    return Err(SemanticError::new(
                        ErrorKind::TypeMismatch,
                        self.path,
                        span,
                        format!("cannot compare `{}` with `{}` using `{}`", lhs_ty, rhs_ty, op),
                    ));
                }
                Ok(Type::Bool)
            }
        }
    }

    fn check_call(
        &self,
        name: &str,
        args: &[Expr],
        span: Span,
        env: &Environment,
    ) -> SemanticResult<(Vec<Expr>, Type)> {
        let Some(def) = self.tables.method(name) else {
            if self.tables.macro_decl(name).is_some() {
                return Err(SemanticError::internal(
                    self.path,
                    span,
                    format!("macro invocation `{}` survived expansion", name),
                )
                .with_help(format!(
                    "`{}` is a macro and could not be expanded at this position",
                    name
                )));
            }
            return Err(SemanticError::new(
                ErrorKind::UnknownMethod,
                self.path,
                span,
                format!("unknown method `{}`", name),
            ));
        };
        if def.params.len() != args.len() {
            return Err(SemanticError::new(
                ErrorKind::ArityMismatch,
                self.path,
                span,
                format!(
                    "method `{}` expects {} argument(s), found {}",
                    name,
                    def.params.len(),
                    args.len()
                ),
            ));
        }
        let mut checked = Vec::with_capacity(args.len());
        for (param, arg) in def.params.iter().zip(args) {
            let (arg, ty) = self.check_expr(arg, env)?;
            self.lattice.check_subtype(&param.ty, &ty, arg.span)?;
            checked.push(arg);
        }
        Ok((checked, def.ret.clone()))
    }

    fn expect_kind(&self, expr: &Expr, ty: &Type, kind: TypeKind) -> SemanticResult<Type> {
        self.lattice.check_instance_of(ty, expr.span, &[kind])
    }

    fn duplicate_variable(&self, name: &str, span: Span) -> SemanticError {
        SemanticError::new(
            ErrorKind::DuplicateVariable,
            self.path,
            span,
            format!("variable `{}` is already declared", name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::default()
    }

    fn at(start: usize) -> Span {
        Span::new(start, start + 1)
    }

    fn var(name: &str) -> Expr {
        Expr::variable(name, sp())
    }

    fn int(value: i64) -> Expr {
        Expr::constant(Value::Int(value), sp())
    }

    fn boolean(value: bool) -> Expr {
        Expr::constant(Value::Bool(value), sp())
    }

    fn decl(ty: Type, name: &str, init: Option<Expr>) -> Stmt {
        Stmt::VariableDeclaration(VarDecl {
            ty,
            name: name.into(),
            init,
            span: sp(),
        })
    }

    fn ret(expr: Expr) -> Stmt {
        Stmt::Return(ReturnStmt {
            expr: Some(expr),
            span: sp(),
        })
    }

    fn method(name: &str, ret: Type, params: Vec<Parameter>, body: Vec<Stmt>) -> Decl {
        Decl::Method(MethodDecl {
            name: name.into(),
            ret,
            params,
            body,
            span: sp(),
        })
    }

    fn point_decl() -> Decl {
        Decl::Type(TypeDecl {
            name: "Point".into(),
            ty: Type::record([(Type::Int, "x"), (Type::Int, "y")]),
            span: sp(),
        })
    }

    fn check(decls: Vec<Decl>) -> SemanticResult<Program> {
        check_program(&Program::new("check.while", decls))
    }

    fn check_body(ret: Type, body: Vec<Stmt>) -> SemanticResult<Program> {
        check(vec![point_decl(), method("main", ret, Vec::new(), body)])
    }

    #[test]
    fn annotates_every_expression() {
        let program = check_body(
            Type::Bool,
            vec![
                decl(Type::Int, "n", Some(int(3))),
                ret(Expr::binary(BinaryOp::Lt, var("n"), int(4), sp())),
            ],
        )
        .unwrap();
        let body = &program.method("main").unwrap().body;
        match &body[1] {
            Stmt::Return(ReturnStmt {
                expr: Some(expr), ..
            }) => {
                assert_eq!(expr.ty, Some(Type::Bool));
                match &expr.kind {
                    ExprKind::Binary { lhs, rhs, .. } => {
                        assert_eq!(lhs.ty, Some(Type::Int));
                        assert_eq!(rhs.ty, Some(Type::Int));
                    }
                    other => panic!("expected binary, found {other:?}"),
                }
            }
            other => panic!("expected return, found {other:?}"),
        }
    }

    #[test]
    fn annotation_can_be_disabled() {
        let program = Program::new(
            "check.while",
            vec![method("main", Type::Int, Vec::new(), vec![ret(int(1))])],
        );
        let checked =
            check_program_with_options(&program, &TypecheckOptions { annotate: false }).unwrap();
        assert_eq!(checked, program);
    }

    #[test]
    fn unknown_variable_is_reported_at_its_span() {
        let err = check_body(Type::Int, vec![ret(Expr::variable("ghost", at(9)))]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownVariable);
        assert_eq!(err.span, at(9));
        assert_eq!(err.path, Path::new("check.while"));
    }

    #[test]
    fn redeclaration_is_rejected() {
        let err = check_body(
            Type::Void,
            vec![decl(Type::Int, "a", None), decl(Type::Bool, "a", None)],
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateVariable);
    }

    #[test]
    fn initializer_must_be_a_subtype() {
        let err = check_body(Type::Void, vec![decl(Type::Int, "a", Some(boolean(true)))])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn conditions_must_be_bool() {
        let err = check_body(
            Type::Void,
            vec![Stmt::While(WhileStmt {
                condition: int(1),
                body: Vec::new(),
                span: sp(),
            })],
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert!(err.message.contains("expected instance of bool"), "{}", err.message);
    }

    #[test]
    fn record_width_subtyping_applies_to_declarations() {
        let wide = Expr::new(
            ExprKind::RecordConstructor(vec![
                ("x".into(), int(1)),
                ("y".into(), int(2)),
                ("z".into(), boolean(false)),
            ]),
            sp(),
        );
        check_body(Type::Void, vec![decl(Type::named("Point"), "p", Some(wide))]).unwrap();

        let narrow = Expr::new(ExprKind::RecordConstructor(vec![("x".into(), int(1))]), sp());
        let err = check_body(Type::Void, vec![decl(Type::named("Point"), "p", Some(narrow))])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn record_access_resolves_named_types() {
        let program = check_body(
            Type::Int,
            vec![
                decl(Type::named("Point"), "p", None),
                ret(Expr::record_access(var("p"), "y", sp())),
            ],
        )
        .unwrap();
        let body = &program.method("main").unwrap().body;
        match &body[1] {
            Stmt::Return(ReturnStmt {
                expr: Some(expr), ..
            }) => assert_eq!(expr.ty, Some(Type::Int)),
            other => panic!("expected return, found {other:?}"),
        }

        let err = check_body(
            Type::Int,
            vec![
                decl(Type::named("Point"), "p", None),
                ret(Expr::record_access(var("p"), "z", sp())),
            ],
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingField);
    }

    #[test]
    fn indexing_strings_yields_char() {
        let program = check_body(
            Type::Char,
            vec![
                decl(
                    Type::String,
                    "s",
                    Some(Expr::constant(Value::String("abc".into()), sp())),
                ),
                ret(Expr::index_of(var("s"), int(0), sp())),
            ],
        );
        assert!(program.is_ok(), "{program:?}");

        let err = check_body(
            Type::Int,
            vec![
                decl(Type::Int, "n", None),
                ret(Expr::index_of(var("n"), int(0), sp())),
            ],
        )
        .unwrap_err();
        assert!(err.message.contains("array or string"), "{}", err.message);
    }

    #[test]
    fn array_literal_with_mixed_elements_is_rejected() {
        let mixed = Expr::new(ExprKind::ArrayInitialiser(vec![int(1), boolean(true)]), sp());
        let err = check_body(Type::Void, vec![decl(Type::array(Type::Int), "a", Some(mixed))])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn calls_check_arity_and_argument_types() {
        let callee = method(
            "inc",
            Type::Int,
            vec![Parameter::new("n", Type::Int, sp())],
            vec![ret(Expr::binary(BinaryOp::Add, var("n"), int(1), sp()))],
        );
        let ok = method(
            "main",
            Type::Int,
            Vec::new(),
            vec![ret(Expr::invoke("inc", vec![int(1)], sp()))],
        );
        check(vec![callee.clone(), ok]).unwrap();

        let wrong_type = method(
            "main",
            Type::Int,
            Vec::new(),
            vec![ret(Expr::invoke("inc", vec![boolean(true)], sp()))],
        );
        let err = check(vec![callee.clone(), wrong_type]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);

        let wrong_arity = method(
            "main",
            Type::Int,
            Vec::new(),
            vec![ret(Expr::invoke("inc", Vec::new(), sp()))],
        );
        let err = check(vec![callee, wrong_arity]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
    }

    #[test]
    fn surviving_macro_call_points_at_the_macro() {
        let id = Decl::Macro(MacroDecl {
            name: "id".into(),
            params: vec![Identifier::new("a", sp())],
            body: var("a"),
            span: sp(),
        });
        let main = method(
            "main",
            Type::Int,
            Vec::new(),
            vec![ret(Expr::invoke("id", vec![int(1)], sp()))],
        );
        let err = check(vec![id, main]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InternalError);
        assert!(err.message.contains("`id`"), "{}", err.message);
        assert!(err.help.unwrap_or_default().contains("is a macro"));
    }

    #[test]
    fn loop_variables_are_scoped_to_the_loop() {
        let for_stmt = Stmt::For(ForStmt {
            decl: VarDecl {
                ty: Type::Int,
                name: "i".into(),
                init: Some(int(0)),
                span: sp(),
            },
            condition: Expr::binary(BinaryOp::Lt, var("i"), int(10), sp()),
            increment: Box::new(Stmt::Assign(AssignStmt {
                lhs: var("i"),
                rhs: Expr::binary(BinaryOp::Add, var("i"), int(1), sp()),
                span: sp(),
            })),
            body: vec![Stmt::Print(ExprStmt {
                expr: var("i"),
                span: sp(),
            })],
            span: sp(),
        });
        check_body(Type::Void, vec![for_stmt.clone(), for_stmt.clone()]).unwrap();
        let err = check_body(Type::Int, vec![for_stmt, ret(var("i"))]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownVariable);
    }

    #[test]
    fn switch_cases_must_match_the_scrutinee() {
        let switch = |value: Expr| {
            Stmt::Switch(SwitchStmt {
                expr: int(1),
                cases: vec![
                    SwitchCase {
                        value: Some(value),
                        body: vec![Stmt::Break(sp())],
                        span: sp(),
                    },
                    SwitchCase {
                        value: None,
                        body: Vec::new(),
                        span: sp(),
                    },
                ],
                span: sp(),
            })
        };
        check_body(Type::Void, vec![switch(int(2))]).unwrap();
        let err = check_body(Type::Void, vec![switch(boolean(false))]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn equality_requires_comparable_operands() {
        let cmp = |rhs: Expr| ret(Expr::binary(BinaryOp::Eq, int(1), rhs, sp()));
        check_body(Type::Bool, vec![cmp(int(2))]).unwrap();
        let err = check_body(Type::Bool, vec![cmp(boolean(true))]).unwrap_err();
        assert!(err.message.contains("cannot compare"), "{}", err.message);
    }

    #[test]
    fn type_declarations_are_validated() {
        let cyclic = vec![
            Decl::Type(TypeDecl {
                name: "A".into(),
                ty: Type::named("B"),
                span: sp(),
            }),
            Decl::Type(TypeDecl {
                name: "B".into(),
                ty: Type::named("A"),
                span: sp(),
            }),
        ];
        assert_eq!(check(cyclic).unwrap_err().kind, ErrorKind::CyclicType);

        let dangling = vec![Decl::Type(TypeDecl {
            name: "Box".into(),
            ty: Type::array(Type::named("Missing")),
            span: sp(),
        })];
        assert_eq!(check(dangling).unwrap_err().kind, ErrorKind::UnknownType);

        let dup = vec![Decl::Type(TypeDecl {
            name: "Pair".into(),
            ty: Type::record([(Type::Int, "a"), (Type::Bool, "a")]),
            span: sp(),
        })];
        assert_eq!(check(dup).unwrap_err().kind, ErrorKind::DuplicateField);
    }
}
