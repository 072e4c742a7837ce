//! Runtime scope chain.
//!
//! An `Environment` maps names to values and optionally links to an
//! enclosing environment.  Chains are shared (`Rc<RefCell<_>>`), never
//! copied: a closure and the block that created its captured scope alias
//! the *same* environment, so a mutation through one alias is visible
//! through all of them.  `define` may shadow a name in the same scope;
//! `get`/`assign` walk the chain outward and fail only at the root.
//!
//! `get_at`/`assign_at` are the indexed counterparts driven by the
//! resolver's hop counts: they cross exactly `distance` enclosing links
//! instead of searching.

use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Environment<'a> {
    values: HashMap<String, Value<'a>>,
    enclosing: Option<Rc<RefCell<Environment<'a>>>>,
}

impl<'a> Environment<'a> {
    /// A root environment with no enclosing scope (the globals).
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A child environment chained onto `enclosing`.
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'a>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind `name` in this scope, shadowing any existing binding here.
    pub fn define(&mut self, name: &str, value: Value<'a>) {
        debug!("Defining '{}' in current scope", name);

        self.values.insert(name.to_string(), value);
    }

    /// Look up `name`, walking the chain outward.
    pub fn get(&self, name: &str) -> Result<Value<'a>, String> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(format!("Undefined variable '{}'.", name))
        }
    }

    /// Re-bind an existing `name`, walking the chain outward.
    pub fn assign(&mut self, name: &str, value: Value<'a>) -> Result<(), String> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(format!("Undefined variable '{}'.", name))
        }
    }

    /// The environment exactly `distance` hops out from `env`, or `None` if
    /// the chain is shorter (a resolver/interpreter mismatch).
    fn ancestor(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment<'a>>>> {
        let mut current = Rc::clone(env);

        for _ in 0..distance {
            let next = current.borrow().enclosing.as_ref().map(Rc::clone)?;
            current = next;
        }

        Some(current)
    }

    /// Read `name` from the scope exactly `distance` hops out.
    pub fn get_at(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &str,
    ) -> Option<Value<'a>> {
        debug!("Indexed read of '{}' at distance {}", name, distance);

        let scope = Self::ancestor(env, distance)?;
        let value = scope.borrow().values.get(name).cloned();
        value
    }

    /// Write `name` in the scope exactly `distance` hops out.  Returns
    /// `false` when the binding is missing there.
    pub fn assign_at(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &str,
        value: Value<'a>,
    ) -> bool {
        debug!("Indexed write of '{}' at distance {}", name, distance);

        match Self::ancestor(env, distance) {
            Some(scope) => {
                scope.borrow_mut().values.insert(name.to_string(), value);
                true
            }

            None => false,
        }
    }
}

impl<'a> Default for Environment<'a> {
    fn default() -> Self {
        Self::new()
    }
}
