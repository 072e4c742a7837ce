//! User-defined functions and bound methods.
//!
//! A `LoxFunction` pairs a borrowed declaration node with the environment
//! that was active when the declaration executed — its closure.  Calling it
//! builds a fresh child environment, binds parameters positionally, and runs
//! the body; a `return` unwinds to this call boundary.  `bind` produces the
//! per-access bound-method copy whose closure is extended with `this`.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::class::LoxInstance;
use crate::environment::Environment;
use crate::error::LoxError;
use crate::interpreter::{IResult, Interpreter, Unwind};
use crate::value::Value;

#[derive(Debug)]
pub struct LoxFunction<'a> {
    declaration: &'a FunctionDecl<'a>,
    closure: Rc<RefCell<Environment<'a>>>,
    is_initializer: bool,
}

impl<'a> LoxFunction<'a> {
    pub fn new(
        declaration: &'a FunctionDecl<'a>,
        closure: Rc<RefCell<Environment<'a>>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &'a str {
        self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// A copy of this method whose closure is extended with `this` bound to
    /// `instance`.  One binding is produced per property access, not cached.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance<'a>>>) -> LoxFunction<'a> {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.define("this", Value::Instance(instance));

        LoxFunction {
            declaration: self.declaration,
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }

    /// Execute the body in a fresh child of the closure.  Arity has already
    /// been checked by the call site.
    pub fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> IResult<'a, Value<'a>> {
        debug!("Calling <fn {}>", self.name());

        let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &self.closure,
        ))));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(param.lexeme, argument);
        }

        match interpreter.execute_block(&self.declaration.body, environment) {
            // An initializer always yields `this`, even on a bare `return`.
            Ok(()) | Err(Unwind::Return(_)) if self.is_initializer => self.this_binding(),

            Ok(()) => Ok(Value::Nil),

            Err(Unwind::Return(value)) => Ok(value),

            Err(unwind) => Err(unwind),
        }
    }

    /// The `this` binding installed by [`bind`](Self::bind); initializers
    /// return it unconditionally.
    fn this_binding(&self) -> IResult<'a, Value<'a>> {
        Environment::get_at(&self.closure, 0, "this").ok_or_else(|| {
            Unwind::Error(LoxError::runtime(
                self.declaration.name.line,
                "Initializer has no 'this' binding.",
            ))
        })
    }
}
