use crate::language::{ast::Parameter, types::Type};
use std::collections::HashMap;

/// Variable typing for one method body.
#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<HashMap<String, Type>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn from_params(params: &[Parameter]) -> Self {
        let mut env = Self::new();
        for param in params {
            env.declare(&param.name, param.ty.clone());
        }
        env
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        if self.scopes.is_empty() {
            self.scopes.push(HashMap::new());
        }
    }

    /// Returns `false` when the name is already bound in any enclosing scope.
    pub fn declare(&mut self, name: &str, ty: Type) -> bool {
        if self.contains(name) {
            return false;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}
