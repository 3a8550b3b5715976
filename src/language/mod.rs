pub mod ast;
pub mod constants;
pub mod env;
pub mod errors;
pub mod lattice;
pub mod macro_expander;
pub mod span;
pub mod symbols;
pub mod typecheck;
pub mod types;
