//! Tree-walking evaluator.
//!
//! Two mutually-recursive operations drive execution: [`Interpreter::execute`]
//! for statements and [`Interpreter::evaluate`] for expressions.  A single
//! `environment` register tracks the active scope; [`execute_block`] swaps a
//! child environment in and restores the previous one on **every** exit path
//! (normal completion, return-unwind, or error), so an aborted block can
//! never leave siblings running in the wrong scope.
//!
//! Non-local exits travel through [`Unwind`]: `Return` carries a value to the
//! nearest call boundary and is *not* an error; `Error` aborts the program.
//! Keeping the two disjoint lets callers assert "this call returned 2" versus
//! "this call failed".
//!
//! Variable access consults the resolver's distance map (keyed by [`ExprId`])
//! for an indexed walk to the exact scope; unresolved names fall back to the
//! global environment, which is what makes forward-declared globals and
//! top-level recursion work.
//!
//! [`execute_block`]: Interpreter::execute_block

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::LoxError;
use crate::function::LoxFunction;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Non-local control transfer threaded up through statement execution.
#[derive(Debug)]
pub enum Unwind<'a> {
    /// `return` unwinding to the nearest enclosing call boundary with its
    /// value.  Not a failure.
    Return(Value<'a>),

    /// A runtime fault that halts the current `interpret` call.
    Error(LoxError),
}

impl<'a> Unwind<'a> {
    /// Shorthand for the error branch.
    pub fn error<S: Into<String>>(line: usize, msg: S) -> Self {
        Unwind::Error(LoxError::runtime(line, msg))
    }
}

impl<'a> From<Unwind<'a>> for LoxError {
    fn from(unwind: Unwind<'a>) -> Self {
        match unwind {
            Unwind::Error(e) => e,

            // Unreachable after a clean resolve pass, which rejects
            // top-level `return`.
            Unwind::Return(_) => LoxError::runtime(0, "Cannot return from top-level code."),
        }
    }
}

/// Convenient alias for evaluator results.
pub type IResult<'a, T> = std::result::Result<T, Unwind<'a>>;

pub struct Interpreter<'a> {
    globals: Rc<RefCell<Environment<'a>>>,
    environment: Rc<RefCell<Environment<'a>>>,
    locals: HashMap<ExprId, usize>,
    out: Box<dyn Write>,
}

impl<'a> Interpreter<'a> {
    /// An interpreter printing to stdout, with native functions predefined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// An interpreter printing to an arbitrary sink (used by tests).
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock",
                arity: 0,
                func: |_args: &[Value]| {
                    let timestamp: f64 = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map_err(|e: SystemTimeError| format!("Clock error: {}", e))?
                        .as_secs_f64();

                    Ok(Value::Number(timestamp))
                },
            },
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    // ───────────────────────── resolution side table ────────────────────────

    /// Record that the reference expression `id` binds `depth` scopes out.
    /// Called by the resolver; absence of an entry means "global".
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// The recorded hop count for `id`, if it resolved to a local.
    pub fn resolved_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    // ───────────────────────────── entry points ─────────────────────────────

    /// Interprets a list of statements (a "program").  Stops at the first
    /// unhandled runtime error, after which no further statements run.
    pub fn interpret(&mut self, statements: &'a [Stmt<'a>]) -> crate::error::Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for statement in statements {
            self.execute(statement).map_err(LoxError::from)?;
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &'a Stmt<'a>) -> IResult<'a, ()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                writeln!(self.out, "{}", value).map_err(|e| Unwind::Error(LoxError::Io(e)))?;

                info!("Printed value: {}", value);

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}'", name.lexeme);

                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));

                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                // The closure is the environment active at declaration time.
                let function = LoxFunction::new(declaration, Rc::clone(&self.environment), false);

                self.environment
                    .borrow_mut()
                    .define(declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Return { keyword: _, value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Err(Unwind::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Execute `statements` with `environment` as the current scope,
    /// restoring the previous scope on every exit path.
    pub(crate) fn execute_block(
        &mut self,
        statements: &'a [Stmt<'a>],
        environment: Rc<RefCell<Environment<'a>>>,
    ) -> IResult<'a, ()> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(());

        for statement in statements {
            result = self.execute(statement);

            if result.is_err() {
                break;
            }
        }

        self.environment = previous;

        result
    }

    fn execute_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        methods: &'a [FunctionDecl<'a>],
    ) -> IResult<'a, ()> {
        debug!("Defining class '{}'", name.lexeme);

        let superclass_value = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    return Err(Unwind::error(
                        superclass_line(expr, name),
                        "Superclass must be a class.",
                    ));
                }
            },

            None => None,
        };

        // Two-step definition so methods can refer to the class by name.
        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        // Methods of a subclass close over a wrapper scope holding `super`.
        let defining_env = match &superclass_value {
            Some(class) => {
                let mut wrapper = Environment::with_enclosing(Rc::clone(&self.environment));
                wrapper.define("super", Value::Class(Rc::clone(class)));

                Rc::new(RefCell::new(wrapper))
            }

            None => Rc::clone(&self.environment),
        };

        let mut method_table: HashMap<&'a str, Rc<LoxFunction<'a>>> = HashMap::new();

        for method in methods {
            let is_initializer = method.name.lexeme == "init";

            method_table.insert(
                method.name.lexeme,
                Rc::new(LoxFunction::new(
                    method,
                    Rc::clone(&defining_env),
                    is_initializer,
                )),
            );
        }

        let class = Rc::new(LoxClass::new(name.lexeme, superclass_value, method_table));

        self.environment
            .borrow_mut()
            .assign(name.lexeme, Value::Class(class))
            .map_err(|msg| Unwind::error(name.line, msg))?;

        Ok(())
    }

    // ───────────────────────────── expressions ──────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &'a Expr<'a>) -> IResult<'a, Value<'a>> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_value = self.evaluate(left)?;

                // Short-circuit: yield the left operand itself when it
                // already determines the result.
                let short_circuits = match operator.token_type {
                    TokenType::OR => left_value.is_truthy(),
                    _ => !left_value.is_truthy(),
                };

                if short_circuits {
                    Ok(left_value)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                if let Some(&distance) = self.locals.get(id) {
                    if !Environment::assign_at(
                        &self.environment,
                        distance,
                        name.lexeme,
                        value.clone(),
                    ) {
                        return Err(Unwind::error(
                            name.line,
                            format!("Undefined variable '{}'.", name.lexeme),
                        ));
                    }
                } else {
                    self.globals
                        .borrow_mut()
                        .assign(name.lexeme, value.clone())
                        .map_err(|msg| Unwind::error(name.line, msg))?;
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_value = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());

                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.call_value(callee_value, paren, args)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    LoxInstance::get(&instance, name).ok_or_else(|| {
                        Unwind::error(
                            name.line,
                            format!("Undefined property '{}'.", name.lexeme),
                        )
                    })
                }

                _ => Err(Unwind::error(name.line, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;

                    instance.borrow_mut().set(name, value.clone());

                    Ok(value)
                }

                _ => Err(Unwind::error(name.line, "Only instances have fields.")),
            },

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(
        &mut self,
        operator: &'a Token<'a>,
        right: &'a Expr<'a>,
    ) -> IResult<'a, Value<'a>> {
        let right_value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right_value {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(Unwind::error(operator.line, "Operand must be a number.")),
            },

            TokenType::BANG => Ok(Value::Bool(!right_value.is_truthy())),

            _ => Err(Unwind::error(operator.line, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &'a Expr<'a>,
        operator: &'a Token<'a>,
        right: &'a Expr<'a>,
    ) -> IResult<'a, Value<'a>> {
        let left_value = self.evaluate(left)?;
        let right_value = self.evaluate(right)?;

        match operator.token_type {
            // `+` is overloaded: numeric addition or string concatenation.
            TokenType::PLUS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(Unwind::error(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, left_value, right_value)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, left_value, right_value)?;
                Ok(Value::Number(a * b))
            }

            // Division follows IEEE-754: x / 0 is ±inf, 0 / 0 is NaN.
            TokenType::SLASH => {
                let (a, b) = number_operands(operator, left_value, right_value)?;
                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, left_value, right_value)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, left_value, right_value)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, left_value, right_value)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, left_value, right_value)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_value == right_value)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left_value != right_value)),

            _ => Err(Unwind::error(operator.line, "Invalid binary operator.")),
        }
    }

    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    ) -> IResult<'a, Value<'a>> {
        let distance = *self.locals.get(&id).ok_or_else(|| {
            Unwind::error(keyword.line, "Cannot use 'super' outside of a class.")
        })?;

        let superclass = match Environment::get_at(&self.environment, distance, "super") {
            Some(Value::Class(class)) => class,
            _ => {
                return Err(Unwind::error(
                    keyword.line,
                    "Cannot use 'super' in a class with no superclass.",
                ));
            }
        };

        // `this` lives one scope inside the `super` wrapper.
        let object = match Environment::get_at(&self.environment, distance - 1, "this") {
            Some(Value::Instance(instance)) => instance,
            _ => {
                return Err(Unwind::error(
                    keyword.line,
                    "Cannot use 'super' outside of a method body.",
                ));
            }
        };

        let resolved = superclass.find_method(method.lexeme).ok_or_else(|| {
            Unwind::error(
                method.line,
                format!("Undefined property '{}'.", method.lexeme),
            )
        })?;

        Ok(Value::Function(Rc::new(resolved.bind(object))))
    }

    /// Variable lookup: indexed walk for resolved locals, direct global
    /// lookup otherwise.
    fn look_up_variable(&self, id: ExprId, name: &'a Token<'a>) -> IResult<'a, Value<'a>> {
        if let Some(&distance) = self.locals.get(&id) {
            Environment::get_at(&self.environment, distance, name.lexeme).ok_or_else(|| {
                Unwind::error(
                    name.line,
                    format!("Undefined variable '{}'.", name.lexeme),
                )
            })
        } else {
            self.globals
                .borrow()
                .get(name.lexeme)
                .map_err(|msg| Unwind::error(name.line, msg))
        }
    }

    /// Invokes a callable value with already-evaluated arguments.
    fn call_value(
        &mut self,
        callee: Value<'a>,
        paren: &'a Token<'a>,
        arguments: Vec<Value<'a>>,
    ) -> IResult<'a, Value<'a>> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                debug!("Calling native function '{}'", name);

                check_arity(arity, arguments.len(), paren)?;

                func(&arguments).map_err(|msg| Unwind::error(paren.line, msg))
            }

            Value::Function(function) => {
                check_arity(function.arity(), arguments.len(), paren)?;

                function.call(self, arguments)
            }

            Value::Class(class) => {
                check_arity(class.arity(), arguments.len(), paren)?;

                LoxClass::instantiate(&class, self, arguments)
            }

            _ => Err(Unwind::error(
                paren.line,
                "Can only call functions and classes.",
            )),
        }
    }
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_arity<'a>(expected: usize, got: usize, paren: &Token<'a>) -> IResult<'a, ()> {
    if expected == got {
        Ok(())
    } else {
        Err(Unwind::error(
            paren.line,
            format!("Expected {} arguments but got {}.", expected, got),
        ))
    }
}

fn number_operands<'a>(
    operator: &Token<'a>,
    left: Value<'a>,
    right: Value<'a>,
) -> IResult<'a, (f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        _ => Err(Unwind::error(operator.line, "Operands must be numbers.")),
    }
}

fn superclass_line<'a>(expr: &Expr<'a>, fallback: &Token<'a>) -> usize {
    match expr {
        Expr::Variable { name, .. } => name.line,
        _ => fallback.line,
    }
}
