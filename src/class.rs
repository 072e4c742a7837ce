//! Classes and instances.
//!
//! A `LoxClass` owns its method table and *references* (never owns) its
//! superclass.  A `LoxInstance` holds a reference to its class plus its own
//! mutable field map; fields are created lazily by the first `set`, so
//! zero-argument construction is always legal and reading an unassigned
//! field is an ordinary undefined-property runtime error.
//!
//! Property lookup order: instance fields, then the declaring class's
//! methods, then superclass methods transitively.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::function::LoxFunction;
use crate::interpreter::{IResult, Interpreter};
use crate::token::Token;
use crate::value::Value;

#[derive(Debug)]
pub struct LoxClass<'a> {
    name: &'a str,
    superclass: Option<Rc<LoxClass<'a>>>,
    methods: HashMap<&'a str, Rc<LoxFunction<'a>>>,
}

impl<'a> LoxClass<'a> {
    pub fn new(
        name: &'a str,
        superclass: Option<Rc<LoxClass<'a>>>,
        methods: HashMap<&'a str, Rc<LoxFunction<'a>>>,
    ) -> Self {
        LoxClass {
            name,
            superclass,
            methods,
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    /// A class's call arity is its initializer's, or zero when it has none.
    /// There is deliberately no stricter construction-time validation.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    /// Walk this class then its superclass chain for `name`.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction<'a>>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// Calling a class constructs an instance, running `init` (bound to the
    /// new instance) when the class declares one.
    pub fn instantiate(
        class: &Rc<LoxClass<'a>>,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> IResult<'a, Value<'a>> {
        debug!("Instantiating class '{}'", class.name);

        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(class))));

        if let Some(initializer) = class.find_method("init") {
            // The initializer's value is `this`, i.e. the instance itself.
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

#[derive(Debug)]
pub struct LoxInstance<'a> {
    class: Rc<LoxClass<'a>>,
    fields: HashMap<String, Value<'a>>,
}

impl<'a> LoxInstance<'a> {
    pub fn new(class: Rc<LoxClass<'a>>) -> Self {
        LoxInstance {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class_name(&self) -> &'a str {
        self.class.name
    }

    /// Property read: own field first, then a freshly bound method.
    pub fn get(
        instance: &Rc<RefCell<LoxInstance<'a>>>,
        name: &Token<'a>,
    ) -> Option<Value<'a>> {
        let field = instance.borrow().fields.get(name.lexeme).cloned();

        if let Some(value) = field {
            return Some(value);
        }

        let method = instance.borrow().class.find_method(name.lexeme);

        method.map(|method| Value::Function(Rc::new(method.bind(Rc::clone(instance)))))
    }

    /// Property write: fields spring into existence on first assignment.
    pub fn set(&mut self, name: &Token<'a>, value: Value<'a>) {
        self.fields.insert(name.lexeme.to_string(), value);
    }
}
