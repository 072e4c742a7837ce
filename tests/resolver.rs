#[cfg(test)]
mod resolver_tests {
    use rlox as lox;

    use lox::ast::{Expr, Stmt};
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;
    use lox::token::Token;

    fn scan(source: &str) -> Vec<Token<'_>> {
        Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    /// Resolve `source` and return the first static error's message.
    fn resolve_err(source: &str) -> String {
        let tokens = scan(source);
        let mut parser = Parser::new(&tokens);
        let (statements, errors) = parser.parse();

        assert!(errors.is_empty(), "parse errors: {:?}", errors);

        let mut interpreter = Interpreter::new();
        let result = Resolver::new(&mut interpreter).resolve(&statements);

        result.unwrap_err().to_string()
    }

    /// Resolve `source`, asserting the pass accepts it.
    fn resolve_ok(source: &str) {
        let tokens = scan(source);
        let mut parser = Parser::new(&tokens);
        let (statements, errors) = parser.parse();

        assert!(errors.is_empty(), "parse errors: {:?}", errors);

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .unwrap();
    }

    #[test]
    fn test_resolver_01_redeclaration_in_same_scope() {
        let err = resolve_err("{ var a = 1; var a = 2; }");

        assert!(err.contains("Variable already declared in this scope"));
    }

    #[test]
    fn test_resolver_02_shadowing_in_inner_scope_is_fine() {
        resolve_ok("{ var a = 1; { var a = 2; print a; } print a; }");
    }

    #[test]
    fn test_resolver_03_global_redeclaration_is_fine() {
        // Globals are late-bound; only block scopes reject redeclaration.
        resolve_ok("var a = 1; var a = 2;");
    }

    #[test]
    fn test_resolver_04_read_in_own_initializer() {
        let err = resolve_err("var a = 1; { var a = a; }");

        assert!(err.contains("Cannot read local variable in its own initializer"));
    }

    #[test]
    fn test_resolver_05_top_level_return() {
        let err = resolve_err("return 1;");

        assert!(err.contains("Cannot return from top-level code."));
    }

    #[test]
    fn test_resolver_06_return_value_from_initializer() {
        let err = resolve_err("class A { init() { return 1; } }");

        assert!(err.contains("Cannot return a value from an initializer."));
    }

    #[test]
    fn test_resolver_07_bare_return_in_initializer_is_fine() {
        resolve_ok("class A { init() { return; } }");
    }

    #[test]
    fn test_resolver_08_this_outside_class() {
        let err = resolve_err("print this;");

        assert!(err.contains("Cannot use 'this' outside of a class."));

        let err = resolve_err("fun f() { print this; }");

        assert!(err.contains("Cannot use 'this' outside of a class."));
    }

    #[test]
    fn test_resolver_09_super_outside_class() {
        let err = resolve_err("print super.method;");

        assert!(err.contains("Cannot use 'super' outside of a class."));
    }

    #[test]
    fn test_resolver_10_super_without_superclass() {
        let err = resolve_err("class A { m() { super.m(); } }");

        assert!(err.contains("Cannot use 'super' in a class with no superclass."));
    }

    #[test]
    fn test_resolver_11_super_in_subclass_is_fine() {
        resolve_ok("class A { m() {} } class B < A { m() { super.m(); } }");
    }

    #[test]
    fn test_resolver_12_self_inheritance() {
        let err = resolve_err("class A < A {}");

        assert!(err.contains("A class cannot inherit from itself."));
    }

    #[test]
    fn test_resolver_13_hop_count_for_enclosing_block() {
        let tokens = scan("{ var a = 1; { print a; } }");
        let mut parser = Parser::new(&tokens);
        let (statements, errors) = parser.parse();

        assert!(errors.is_empty());

        // Dig out the id of the `a` inside the print statement.
        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected block");
        };
        let Stmt::Block(inner) = &outer[1] else {
            panic!("expected inner block");
        };
        let Stmt::Print(Expr::Variable { id, .. }) = &inner[0] else {
            panic!("expected print of a variable");
        };

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .unwrap();

        // One environment separates the reference from the declaration.
        assert_eq!(interpreter.resolved_depth(*id), Some(1));
    }

    #[test]
    fn test_resolver_14_capture_from_function_body() {
        let tokens = scan("{ var a = 1; fun f() { print a; } }");
        let mut parser = Parser::new(&tokens);
        let (statements, errors) = parser.parse();

        assert!(errors.is_empty());

        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected block");
        };
        let Stmt::Function(decl) = &outer[1] else {
            panic!("expected function declaration");
        };
        let Stmt::Print(Expr::Variable { id, .. }) = &decl.body[0] else {
            panic!("expected print of a variable");
        };

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .unwrap();

        assert_eq!(interpreter.resolved_depth(*id), Some(1));
    }

    #[test]
    fn test_resolver_15_globals_have_no_entry() {
        let tokens = scan("var a = 1; print a;");
        let mut parser = Parser::new(&tokens);
        let (statements, errors) = parser.parse();

        assert!(errors.is_empty());

        let Stmt::Print(Expr::Variable { id, .. }) = &statements[1] else {
            panic!("expected print of a variable");
        };

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .unwrap();

        // Top-level references fall back to the globals at runtime.
        assert_eq!(interpreter.resolved_depth(*id), None);
    }
}
