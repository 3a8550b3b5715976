use crate::language::{ast::*, span::Span, types::Type};


fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sp() -> Span {
    Span::default()
}

fn var(name: &str) -> Expr {
    Expr::variable(name, sp())
}

fn int(value: i64) -> Expr {
    Expr::constant(Value::Int(value), sp())
}

fn macro_decl(name: &str, params: &[&str], body: Expr) -> Decl {
    Decl::Macro(MacroDecl {
        name: name.into(),
        params: params.iter().map(|p| Identifier::new(*p, sp())).collect(),
        body,
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

fn ret(expr: Expr) -> Stmt {
    Stmt::Return(ReturnStmt {
        expr: Some(expr),
        span: sp(),
    })
}
