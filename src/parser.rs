/*!
Recursive-descent parser over the scanned token slice.

Grammar (EBNF — condensed)
--------------------------

```text
program        → declaration* EOF ;
declaration    → classDecl | funDecl | varDecl | statement ;
classDecl      → "class" IDENT ( "<" IDENT )? "{" function* "}" ;
funDecl        → "fun" function ;
function       → IDENT "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | forStmt | ifStmt | printStmt
               | returnStmt | whileStmt | block ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
                 expression? ";" expression? ")" statement ;
block          → "{" declaration* "}" ;
parameters     → IDENT ( "," IDENT )* ;            // ≤ 8
expression     → assignment ;
assignment     → ( call "." )? IDENT "=" assignment | logic_or ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality  ( "and" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" ) unary )* ;
unary          → ( "!" | "-" ) unary | call ;
call           → primary ( "(" arguments? ")" | "." IDENT )* ;
arguments      → expression ( "," expression )* ;  // ≤ 8
primary        → NUMBER | STRING | "true" | "false" | "nil" | "this"
               | "super" "." IDENT | IDENT | "(" expression ")" ;
```

`for` has no AST node: it is desugared on the spot into an equivalent
`while` wrapped in a block (initializer first, condition defaulting to
`true`, increment appended to the body).

Error recovery: a malformed declaration is recorded as a diagnostic, the
parser discards tokens to the next statement boundary (`synchronize`), and
parsing resumes — so one bad statement never hides errors in the rest of
the program.  [`Parser::parse`] therefore returns the statements it could
build *and* every diagnostic it collected.

Each token is consumed once, so parsing is Θ(n) over the token stream; the
call stack grows only with syntactic nesting.
*/

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Hard cap on parameter and call-argument counts.
const MAX_ARITY: usize = 8;

/// Top-level parser over an immutable slice of tokens.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
    next_id: u32,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            next_id: 0,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program.  Returns every statement that parsed
    /// cleanly plus the diagnostics collected along the way; callers must
    /// treat a non-empty diagnostic list as "do not interpret".
    pub fn parse(&mut self) -> (Vec<Stmt<'a>>, Vec<LoxError>) {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt<'a>> = Vec::new();
        let mut errors: Vec<LoxError> = Vec::new();

        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),

                Err(e) => {
                    debug!("Parse error, synchronizing: {}", e);

                    errors.push(e);
                    self.synchronize();
                }
            }
        }

        (statements, errors)
    }

    /// Parse the input as a single expression (expression mode for the
    /// `parse`/`evaluate` subcommands).
    pub fn parse_expression(&mut self) -> Result<Expr<'a>> {
        self.expression()
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Result<Stmt<'a>> {
        if self.matches(TokenType::CLASS) {
            self.class_declaration()
        } else if self.matches(TokenType::FUN) {
            Ok(Stmt::Function(self.function("function")?))
        } else if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt<'a>> {
        let name: &Token<'_> = self.consume(TokenType::IDENTIFIER, "Expected class name")?;

        let superclass: Option<Expr<'a>> = if self.matches(TokenType::LESS) {
            let superclass_name =
                self.consume(TokenType::IDENTIFIER, "Expected superclass name")?;

            Some(Expr::Variable {
                id: self.fresh_id(),
                name: superclass_name,
            })
        } else {
            None
        };

        self.consume(TokenType::LEFT_BRACE, "Expected '{' before class body")?;

        let mut methods: Vec<FunctionDecl<'a>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after class body")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    /// Parses a function or method declaration, without the leading `fun`
    /// keyword (class bodies omit it).
    fn function(&mut self, kind: &str) -> Result<FunctionDecl<'a>> {
        let name: &Token<'_> =
            self.consume(TokenType::IDENTIFIER, &format!("Expected {} name", kind))?;

        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expected '(' after {} name", kind),
        )?;

        let mut params: Vec<&Token<'_>> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    return Err(LoxError::parse(
                        self.peek().line,
                        format!("Cannot have more than {} parameters", MAX_ARITY),
                    ));
                }

                params.push(self.consume(TokenType::IDENTIFIER, "Expected parameter name")?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters")?;

        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expected '{{' before {} body", kind),
        )?;

        let body = self.block()?;

        Ok(FunctionDecl { name, params, body })
    }

    fn var_declaration(&mut self) -> Result<Stmt<'a>> {
        let name: &Token<'_> = self.consume(TokenType::IDENTIFIER, "Expected variable name")?;

        let initializer: Option<Expr<'a>> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt<'a>> {
        if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.matches(TokenType::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else {
            self.expression_statement()
        }
    }

    /// `for` is pure sugar: desugar straight to `while` inside a block.
    fn for_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'for'")?;

        let initializer = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after loop condition")?;

        let increment = if !self.check(TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after for clauses")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or(Expr::Literal(LiteralValue::True));

        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn print_statement(&mut self) -> Result<Stmt<'a>> {
        let value: Expr<'a> = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after value")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt<'a>> {
        let expr: Expr<'a> = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after expression")?;

        Ok(Stmt::Expression(expr))
    }

    fn if_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'if'")?;
        let condition: Expr<'a> = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition")?;

        let then_branch: Box<Stmt<'a>> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt<'a>>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'while'")?;
        let condition: Expr<'a> = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition")?;
        let body: Box<Stmt<'a>> = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> Result<Stmt<'a>> {
        let keyword: &Token<'_> = self.previous();

        let value: Option<Expr<'a>> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after return value")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn block(&mut self) -> Result<Vec<Stmt<'a>>> {
        let mut statements: Vec<Stmt<'a>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after block")?;

        Ok(statements)
    }

    // ───────────────────────── expression rules ───────────────────

    fn expression(&mut self) -> Result<Expr<'a>> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr<'a>> {
        let expr: Expr<'a> = self.logical_or()?;

        if self.matches(TokenType::EQUAL) {
            let equals: &Token<'_> = self.previous();
            let value: Expr<'a> = self.assignment()?;

            // The left side must already be a valid assignment target.
            match expr {
                Expr::Variable { name, .. } => {
                    return Ok(Expr::Assign {
                        id: self.fresh_id(),
                        name,
                        value: Box::new(value),
                    });
                }

                Expr::Get { object, name } => {
                    return Ok(Expr::Set {
                        object,
                        name,
                        value: Box::new(value),
                    });
                }

                _ => {
                    return Err(LoxError::parse(equals.line, "Invalid assignment target"));
                }
            }
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<Expr<'a>> {
        let mut expr: Expr<'a> = self.logical_and()?;

        while self.matches(TokenType::OR) {
            let operator: &Token<'_> = self.previous();
            let right: Expr<'a> = self.logical_and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<Expr<'a>> {
        let mut expr: Expr<'a> = self.equality()?;

        while self.matches(TokenType::AND) {
            let operator: &Token<'_> = self.previous();
            let right: Expr<'a> = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr<'a>> {
        let mut expr: Expr<'a> = self.comparison()?;

        while self.matches(TokenType::BANG_EQUAL) || self.matches(TokenType::EQUAL_EQUAL) {
            let operator: &Token<'_> = self.previous();
            let right: Expr<'a> = self.comparison()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.term()?;

        while self.matches(TokenType::GREATER)
            || self.matches(TokenType::GREATER_EQUAL)
            || self.matches(TokenType::LESS)
            || self.matches(TokenType::LESS_EQUAL)
        {
            let operator: &Token<'_> = self.previous();
            let right: Expr<'a> = self.term()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr<'a>> {
        let mut expr: Expr<'a> = self.factor()?;

        while self.matches(TokenType::MINUS) || self.matches(TokenType::PLUS) {
            let operator: &Token<'_> = self.previous();
            let right: Expr<'a> = self.factor()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr<'a>> {
        let mut expr: Expr<'a> = self.unary()?;

        while self.matches(TokenType::STAR) || self.matches(TokenType::SLASH) {
            let operator: &Token<'_> = self.previous();
            let right: Expr<'a> = self.unary()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr<'a>> {
        if self.matches(TokenType::BANG) || self.matches(TokenType::MINUS) {
            let operator: &Token<'_> = self.previous();
            let right: Expr<'a> = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr<'a>> {
        let mut expr: Expr<'a> = self.primary()?;

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenType::DOT) {
                let name: &Token<'_> =
                    self.consume(TokenType::IDENTIFIER, "Expected property name after '.'")?;

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr<'a>) -> Result<Expr<'a>> {
        let mut arguments: Vec<Expr<'a>> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    return Err(LoxError::parse(
                        self.peek().line,
                        format!("Cannot have more than {} arguments", MAX_ARITY),
                    ));
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: &Token<'_> =
            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr<'a>> {
        if self.matches(TokenType::FALSE) {
            return Ok(Expr::Literal(LiteralValue::False));
        }

        if self.matches(TokenType::TRUE) {
            return Ok(Expr::Literal(LiteralValue::True));
        }

        if self.matches(TokenType::NIL) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        if self.matches(TokenType::NUMBER(0.0)) {
            if let TokenType::NUMBER(n) = self.previous().token_type {
                return Ok(Expr::Literal(LiteralValue::Number(n)));
            }
        }

        if let TokenType::STRING(ref s) = self.peek().token_type {
            let literal = s.clone();
            self.advance();

            return Ok(Expr::Literal(LiteralValue::Str(literal)));
        }

        if self.matches(TokenType::THIS) {
            return Ok(Expr::This {
                id: self.fresh_id(),
                keyword: self.previous(),
            });
        }

        if self.matches(TokenType::SUPER) {
            let keyword: &Token<'_> = self.previous();

            self.consume(TokenType::DOT, "Expected '.' after 'super'")?;

            let method =
                self.consume(TokenType::IDENTIFIER, "Expected superclass method name")?;

            return Ok(Expr::Super {
                id: self.fresh_id(),
                keyword,
                method,
            });
        }

        if self.matches(TokenType::IDENTIFIER) {
            return Ok(Expr::Variable {
                id: self.fresh_id(),
                name: self.previous(),
            });
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr<'a> = self.expression()?;

            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression")?;

            return Ok(Expr::Grouping(Box::new(expr)));
        }

        Err(LoxError::parse(self.peek().line, "Expected expression"))
    }

    // ────────────────────── utility helpers ───────────────────────

    /// Stamp the next reference-expression identity.  Ids are assigned in
    /// source order, so re-parsing the same input reproduces them exactly.
    #[inline(always)]
    fn fresh_id(&mut self) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;

        id
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<&'a Token<'a>> {
        if self.check(ttype) {
            return Ok(self.advance());
        }

        Err(LoxError::parse(self.peek().line, message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token<'a> {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token<'a> {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token<'a> {
        &self.tokens[self.current - 1]
    }

    /// Discards tokens until it thinks it is at a statement boundary.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN => return,
                _ => {}
            }

            self.advance();
        }
    }
}
