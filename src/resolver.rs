//! Static variable resolution pass.
//!
//! Runs between parsing and interpretation, walking the AST once to compute
//! how many environments separate each variable reference from its binding.
//! The hop count is handed to the interpreter keyed by the reference's
//! [`ExprId`](crate::ast::ExprId); references with no entry fall back to the
//! globals at runtime.
//!
//! The same pass rejects the static misuses the grammar cannot express:
//! reading a local inside its own initializer, redeclaring a local in the
//! same scope, `return` outside a function, returning a value from `init`,
//! `this` outside a class, `super` outside a subclass, and a class that
//! names itself as superclass.  The first such error aborts the pass.
//!
//! Only block scopes are tracked here.  Globals are not a scope in this
//! pass, which is why top-level references resolve to nothing and use the
//! runtime fallback — late-bound globals and mutually recursive top-level
//! functions depend on that.

use std::collections::HashMap;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;

/// What kind of function body we are currently inside, for `return` checks.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// Whether we are inside a class body, and if so whether it has a superclass.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

pub struct Resolver<'a, 'interp> {
    interpreter: &'interp mut Interpreter<'a>,

    /// Innermost scope last.  `false` marks a name declared but not yet
    /// defined (its initializer is still being resolved).
    scopes: Vec<HashMap<&'a str, bool>>,

    current_function: FunctionType,
    current_class: ClassType,
}

impl<'a, 'interp> Resolver<'a, 'interp> {
    pub fn new(interpreter: &'interp mut Interpreter<'a>) -> Self {
        Self {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// Resolve a whole program.  Stops at the first static error.
    pub fn resolve(&mut self, statements: &'a [Stmt<'a>]) -> Result<()> {
        info!("Beginning resolve phase over {} statements", statements.len());

        for statement in statements {
            self.resolve_stmt(statement)?;
        }

        Ok(())
    }

    // ───────────────────────── statements ─────────────────────────

    fn resolve_stmt(&mut self, stmt: &'a Stmt<'a>) -> Result<()> {
        match stmt {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),

            Stmt::Var { name, initializer } => {
                self.declare(name)?;

                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer)?;
                }

                self.define(name);

                Ok(())
            }

            Stmt::Block(statements) => {
                self.begin_scope();

                let result = self.resolve(statements);

                self.end_scope();

                result
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(then_branch)?;

                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch)?;
                }

                Ok(())
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(body)
            }

            Stmt::Function(declaration) => {
                // Defined eagerly so the function can recurse.
                self.declare(declaration.name)?;
                self.define(declaration.name);

                self.resolve_function(declaration, FunctionType::Function)
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(LoxError::resolve(
                        keyword.line,
                        "Cannot return from top-level code.",
                    ));
                }

                if let Some(value) = value {
                    if self.current_function == FunctionType::Initializer {
                        return Err(LoxError::resolve(
                            keyword.line,
                            "Cannot return a value from an initializer.",
                        ));
                    }

                    self.resolve_expr(value)?;
                }

                Ok(())
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        methods: &'a [FunctionDecl<'a>],
    ) -> Result<()> {
        debug!("Resolving class '{}'", name.lexeme);

        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name)?;
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = superclass
            {
                if super_name.lexeme == name.lexeme {
                    self.current_class = enclosing_class;

                    return Err(LoxError::resolve(
                        super_name.line,
                        "A class cannot inherit from itself.",
                    ));
                }
            }

            self.current_class = ClassType::Subclass;

            if let Err(e) = self.resolve_expr(superclass) {
                self.current_class = enclosing_class;
                return Err(e);
            }

            // Scope holding `super`, shared by every method closure.
            self.begin_scope();
            self.scope_insert("super");
        }

        // Scope holding `this`, inside the `super` scope when present.
        self.begin_scope();
        self.scope_insert("this");

        let mut result = Ok(());

        for method in methods {
            let function_type = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            result = self.resolve_function(method, function_type);

            if result.is_err() {
                break;
            }
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;

        result
    }

    fn resolve_function(
        &mut self,
        declaration: &'a FunctionDecl<'a>,
        function_type: FunctionType,
    ) -> Result<()> {
        let enclosing_function = self.current_function;
        self.current_function = function_type;

        self.begin_scope();

        let mut result = Ok(());

        for param in &declaration.params {
            result = self.declare(param).map(|()| self.define(param));

            if result.is_err() {
                break;
            }
        }

        if result.is_ok() {
            result = self.resolve(&declaration.body);
        }

        self.end_scope();
        self.current_function = enclosing_function;

        result
    }

    // ───────────────────────── expressions ────────────────────────

    fn resolve_expr(&mut self, expr: &'a Expr<'a>) -> Result<()> {
        match expr {
            Expr::Literal(_) => Ok(()),

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)
            }

            Expr::Variable { id, name } => {
                // A reference while the same name is mid-declaration in this
                // scope is the `var a = a;` error.
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme) == Some(&false) {
                        return Err(LoxError::resolve(
                            name.line,
                            "Cannot read local variable in its own initializer",
                        ));
                    }
                }

                self.resolve_local(*id, name);

                Ok(())
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value)?;
                self.resolve_local(*id, name);

                Ok(())
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee)?;

                for argument in arguments {
                    self.resolve_expr(argument)?;
                }

                Ok(())
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value)?;
                self.resolve_expr(object)
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    return Err(LoxError::resolve(
                        keyword.line,
                        "Cannot use 'this' outside of a class.",
                    ));
                }

                self.resolve_local(*id, keyword);

                Ok(())
            }

            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        return Err(LoxError::resolve(
                            keyword.line,
                            "Cannot use 'super' outside of a class.",
                        ));
                    }

                    ClassType::Class => {
                        return Err(LoxError::resolve(
                            keyword.line,
                            "Cannot use 'super' in a class with no superclass.",
                        ));
                    }

                    ClassType::Subclass => {}
                }

                self.resolve_local(*id, keyword);

                Ok(())
            }
        }
    }

    // ─────────────────────── scope bookkeeping ────────────────────

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Mark `name` as declared-but-not-defined in the innermost scope.
    /// No-op at top level: globals are resolved at runtime.
    fn declare(&mut self, name: &'a Token<'a>) -> Result<()> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name.lexeme) {
                return Err(LoxError::resolve(
                    name.line,
                    "Variable already declared in this scope",
                ));
            }

            scope.insert(name.lexeme, false);
        }

        Ok(())
    }

    /// Mark `name` as fully defined in the innermost scope.
    fn define(&mut self, name: &'a Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme, true);
        }
    }

    /// Insert an implicit, always-defined binding (`this` / `super`).
    fn scope_insert(&mut self, name: &'a str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, true);
        }
    }

    /// Record the hop count from the innermost scope to the one declaring
    /// `name`.  Silent when no scope declares it: the interpreter then
    /// treats the reference as global.
    fn resolve_local(&mut self, id: ExprId, name: &'a Token<'a>) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);

                self.interpreter.note_local(id, depth);

                return;
            }
        }
    }
}
