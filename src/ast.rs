//! Expression and statement node types for the Lox AST.
//!
//! Nodes are closed sum types: the resolver and interpreter match on them
//! exhaustively, so adding a variant is a compile-time-checked change at
//! every dispatch site.  Lifetime `'a` ties nodes that contain token
//! references back to the token buffer produced by the scanner.
//!
//! Variable references need an identity the resolver can key its distance
//! map on — two syntactically identical expressions at different source
//! positions must be distinct keys.  The parser therefore stamps every
//! `Variable` / `Assign` / `This` / `Super` node with a unique [`ExprId`]
//! at construction time; the map is keyed by that id, never by structural
//! equality or pointer address.

use crate::token::Token;

/// Stable identity of a variable-referencing expression node, assigned
/// sequentially by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree and do
/// **not** retain a reference to the originating [`Token`]; the parser
/// copies (or converts) the value at parse time so literals carry no
/// runtime indirection.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal — stored as IEEE-754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal (Lox's `null`).
    Nil,
}

/// **Abstract-syntax-tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub-expression: `"(" expression ")"`.
    Grouping(Box<Expr<'a>>),

    /// Prefix unary operator expression, e.g. `!isReady` or `-42`.
    Unary {
        /// The operator token (`!` or `-`).
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Infix binary operator expression, e.g. `a + b`, `x <= y`.
    Binary {
        left: Box<Expr<'a>>,
        /// Operator token such as `+`, `*`, `==`, …
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Short-circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Variable access — resolves to the identifier's binding at runtime.
    Variable { id: ExprId, name: &'a Token<'a> },

    /// Assignment expression: `identifier "=" expression`.
    Assign {
        id: ExprId,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// Function- or method-call expression, e.g. `clock()` or `add(1, 2)`.
    Call {
        /// Expression that evaluates to a callable (variable, property, …).
        callee: Box<Expr<'a>>,
        /// The closing `)` token — retained for error reporting.
        paren: &'a Token<'a>,
        /// Argument list (may be empty).
        arguments: Vec<Expr<'a>>,
    },

    /// Property read: `object.name`.
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// Property write: `object.name = value`.
    Set {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// The `this` keyword inside a method.
    This { id: ExprId, keyword: &'a Token<'a> },

    /// `super.method` inside a subclass method.
    Super {
        id: ExprId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    },
}

/// A function (or method) declaration: shared by `Stmt::Function` and the
/// method lists of `Stmt::Class`.  Runtime function values borrow this node
/// for the whole program run rather than cloning the body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'a> {
    pub name: &'a Token<'a>,

    /// Parameter name tokens (arity ≤ 8, enforced by the parser).
    pub params: Vec<&'a Token<'a>>,

    /// Body executed when the function is called.
    pub body: Vec<Stmt<'a>>,
}

/// **Abstract-syntax-tree node** for *statements* (complete executable
/// constructs).  A program is the sequence of these nodes returned by
/// [`crate::parser::Parser::parse`].  `for` loops never appear here: the
/// parser desugars them into an equivalent `while` inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    /// Stand-alone expression terminated by a semicolon.
    Expression(Expr<'a>),

    /// `print` statement used for output.
    Print(Expr<'a>),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt<'a>>),

    /// `if` / `else` conditional.
    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    /// `while` loop.
    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },

    /// Function declaration — becomes a first-class callable value.
    Function(FunctionDecl<'a>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for error locations).
        keyword: &'a Token<'a>,

        /// Optional expression to return.  Absent ⇒ `nil` is returned.
        value: Option<Expr<'a>>,
    },

    /// Class declaration with an optional `< Superclass` clause.
    Class {
        name: &'a Token<'a>,

        /// Always an `Expr::Variable` naming the superclass, when present.
        superclass: Option<Expr<'a>>,

        methods: Vec<FunctionDecl<'a>>,
    },
}
