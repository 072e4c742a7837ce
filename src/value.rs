//! Runtime value representation.
//!
//! `Value` is the tagged union every expression evaluates to.  Primitives
//! (`nil`, booleans, numbers, strings) compare by value; callables and
//! instances compare by identity (`Rc::ptr_eq`), matching the language's
//! reference semantics.  `nil` and `false` are the only falsy values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::class::{LoxClass, LoxInstance};
use crate::function::LoxFunction;

#[derive(Debug, Clone)]
pub enum Value<'a> {
    Nil,

    Bool(bool),

    Number(f64),

    String(String),

    /// A host-provided function exposed to scripts (e.g. `clock`).
    NativeFunction {
        name: &'static str,
        arity: usize,
        func: fn(&[Value<'a>]) -> Result<Value<'a>, String>,
    },

    /// A user-defined function or bound method, with its closure.
    Function(Rc<LoxFunction<'a>>),

    Class(Rc<LoxClass<'a>>),

    Instance(Rc<RefCell<LoxInstance<'a>>>),
}

impl<'a> Value<'a> {
    /// `nil` and `false` are falsy; every other value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }
}

impl<'a> PartialEq for Value<'a> {
    /// Lox `==`: no implicit coercion across kinds; callables and instances
    /// are equal only when they are the *same* object.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (
                Value::NativeFunction { func: a, .. },
                Value::NativeFunction { func: b, .. },
            ) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'a> fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                // Integral numbers print without a decimal point: 7, not 7.0.
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::NativeFunction { name, .. } => write!(f, "<native fn {}>", name),

            Value::Function(fun) => write!(f, "<fn {}>", fun.name()),

            Value::Class(class) => write!(f, "{}", class.name()),

            Value::Instance(instance) => {
                write!(f, "{} instance", instance.borrow().class_name())
            }
        }
    }
}
