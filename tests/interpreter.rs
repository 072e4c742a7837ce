#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    use rlox as lox;

    use lox::error::LoxError;
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;
    use lox::token::Token;

    /// A clonable in-memory sink so tests can keep a handle on the output
    /// the interpreter writes through its `Box<dyn Write>`.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn scan(source: &str) -> Vec<Token<'_>> {
        Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    /// Run `source` end to end (scan, parse, resolve, interpret) and return
    /// everything printed plus the final outcome.
    fn run(source: &str) -> (String, Result<(), LoxError>) {
        let tokens = scan(source);
        let mut parser = Parser::new(&tokens);
        let (statements, errors) = parser.parse();

        assert!(errors.is_empty(), "parse errors: {:?}", errors);

        let sink = SharedBuf::default();
        let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));

        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .unwrap();

        let result = interpreter.interpret(&statements);
        let output = String::from_utf8(sink.0.borrow().clone()).unwrap();

        (output, result)
    }

    fn run_ok(source: &str) -> String {
        let (output, result) = run(source);

        result.unwrap();
        output
    }

    fn run_err(source: &str) -> (String, String) {
        let (output, result) = run(source);

        (output, result.unwrap_err().to_string())
    }

    // ─────────────────────── expressions and printing ───────────────────────

    #[test]
    fn test_interp_01_arithmetic() {
        assert_eq!(run_ok("print 3 + 4;"), "7\n");
        assert_eq!(run_ok("print (1 + 2) * 3;"), "9\n");
        assert_eq!(run_ok("print 7 / 2;"), "3.5\n");
        assert_eq!(run_ok("print -5 + 5;"), "0\n");
    }

    #[test]
    fn test_interp_02_string_concatenation() {
        assert_eq!(run_ok("print \"foo\" + \"bar\";"), "foobar\n");
    }

    #[test]
    fn test_interp_03_truthiness() {
        assert_eq!(run_ok("print !nil;"), "true\n");
        assert_eq!(run_ok("print !0;"), "false\n");
        assert_eq!(run_ok("print !\"\";"), "false\n");
    }

    #[test]
    fn test_interp_04_equality() {
        assert_eq!(run_ok("print 1 == 1;"), "true\n");
        assert_eq!(run_ok("print 1 == \"1\";"), "false\n");
        assert_eq!(run_ok("print nil == nil;"), "true\n");
        assert_eq!(run_ok("print \"a\" != \"b\";"), "true\n");
    }

    #[test]
    fn test_interp_05_logical_operators_return_operands() {
        assert_eq!(run_ok("print \"hi\" or 2;"), "hi\n");
        assert_eq!(run_ok("print nil or \"yes\";"), "yes\n");
        assert_eq!(run_ok("print nil and 1;"), "nil\n");
        assert_eq!(run_ok("print 1 and 2;"), "2\n");
    }

    #[test]
    fn test_interp_06_logical_short_circuit_skips_right_side() {
        // The call would blow up if evaluated; `or` must not reach it.
        assert_eq!(run_ok("print true or missing();"), "true\n");
    }

    // ────────────────────────── variables and scope ─────────────────────────

    #[test]
    fn test_interp_07_shadowing() {
        let source = "var a = 1;\n{ var a = 2; print a; }\nprint a;";

        assert_eq!(run_ok(source), "2\n1\n");
    }

    #[test]
    fn test_interp_08_assignment_is_an_expression() {
        assert_eq!(run_ok("var a = 1; print a = 2; print a;"), "2\n2\n");
    }

    #[test]
    fn test_interp_09_while_loop() {
        let source = "var i = 0;\nwhile (i < 3) { print i; i = i + 1; }";

        assert_eq!(run_ok(source), "0\n1\n2\n");
    }

    #[test]
    fn test_interp_10_for_loop() {
        assert_eq!(
            run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
            "0\n1\n2\n"
        );
    }

    // ─────────────────────── functions and closures ─────────────────────────

    #[test]
    fn test_interp_11_function_return() {
        let source = "fun add(a, b) { return a + b; }\nprint add(1, 2);";

        assert_eq!(run_ok(source), "3\n");
    }

    #[test]
    fn test_interp_12_missing_return_yields_nil() {
        assert_eq!(run_ok("fun f() { return; }\nprint f();"), "nil\n");
        assert_eq!(run_ok("fun g() {}\nprint g();"), "nil\n");
    }

    #[test]
    fn test_interp_13_counter_closure() {
        let source = "\
fun makeCounter() {
  var count = 0;
  fun increment() {
    count = count + 1;
    return count;
  }
  return increment;
}
var counter = makeCounter();
print counter();
print counter();";

        assert_eq!(run_ok(source), "1\n2\n");
    }

    #[test]
    fn test_interp_14_closure_binds_declaration_scope() {
        // `show` must keep seeing the global `a`, not the later block local.
        let source = "\
var a = \"global\";
{
  fun show() { print a; }
  show();
  var a = \"block\";
  show();
}";

        assert_eq!(run_ok(source), "global\nglobal\n");
    }

    #[test]
    fn test_interp_15_recursion() {
        let source = "\
fun fib(n) {
  if (n < 2) return n;
  return fib(n - 1) + fib(n - 2);
}
print fib(10);";

        assert_eq!(run_ok(source), "55\n");
    }

    // ────────────────────────── classes and methods ─────────────────────────

    #[test]
    fn test_interp_16_fields() {
        let source = "class Box {}\nvar b = Box();\nb.value = 42;\nprint b.value;";

        assert_eq!(run_ok(source), "42\n");
    }

    #[test]
    fn test_interp_17_methods_and_this() {
        let source = "\
class Person {
  init(name) { this.name = name; }
  greet() { print \"Hello, \" + this.name; }
}
Person(\"Ada\").greet();";

        assert_eq!(run_ok(source), "Hello, Ada\n");
    }

    #[test]
    fn test_interp_18_bound_method_keeps_this() {
        let source = "\
class Counter {
  init() { this.n = 0; }
  bump() { this.n = this.n + 1; print this.n; }
}
var c = Counter();
var bump = c.bump;
bump();
bump();";

        assert_eq!(run_ok(source), "1\n2\n");
    }

    #[test]
    fn test_interp_19_initializer_returns_this() {
        let source = "class A { init() {} }\nvar a = A();\nprint a.init() == a;";

        assert_eq!(run_ok(source), "true\n");
    }

    #[test]
    fn test_interp_20_inherited_method() {
        let source = "\
class A { greet() { print \"from A\"; } }
class B < A {}
B().greet();";

        assert_eq!(run_ok(source), "from A\n");
    }

    #[test]
    fn test_interp_21_super_dispatch() {
        let source = "\
class A { method() { print \"A method\"; } }
class B < A {
  method() { print \"B method\"; }
  test() { super.method(); }
}
B().test();";

        assert_eq!(run_ok(source), "A method\n");
    }

    #[test]
    fn test_interp_22_super_through_grandchild() {
        let source = "\
class A { say() { print \"A\"; } }
class B < A { say() { super.say(); print \"B\"; } }
class C < B {}
C().say();";

        assert_eq!(run_ok(source), "A\nB\n");
    }

    #[test]
    fn test_interp_23_display_forms() {
        let source = "\
class Thing {}
fun helper() {}
print Thing;
print Thing();
print helper;
print clock == clock;";

        assert_eq!(
            run_ok(source),
            "Thing\nThing instance\n<fn helper>\ntrue\n"
        );
    }

    // ────────────────────────────── runtime errors ──────────────────────────

    #[test]
    fn test_interp_24_arity_mismatch() {
        let (_, err) = run_err("fun f(a, b) {}\nf(1);");

        assert!(err.contains("Expected 2 arguments but got 1."));
    }

    #[test]
    fn test_interp_25_calling_a_non_callable() {
        let (_, err) = run_err("\"not a function\"();");

        assert!(err.contains("Can only call functions and classes."));
    }

    #[test]
    fn test_interp_26_property_on_non_instance() {
        let (_, err) = run_err("var x = 1;\nprint x.field;");

        assert!(err.contains("Only instances have properties."));
    }

    #[test]
    fn test_interp_27_undefined_property() {
        let (_, err) = run_err("class A {}\nprint A().missing;");

        assert!(err.contains("Undefined property 'missing'."));
    }

    #[test]
    fn test_interp_28_undefined_variable() {
        let (_, err) = run_err("print missing;");

        assert!(err.contains("Undefined variable 'missing'."));
    }

    #[test]
    fn test_interp_29_operand_type_errors() {
        let (_, err) = run_err("print 1 + \"one\";");
        assert!(err.contains("Operands must be two numbers or two strings."));

        let (_, err) = run_err("print 1 < \"two\";");
        assert!(err.contains("Operands must be numbers."));

        let (_, err) = run_err("print -\"three\";");
        assert!(err.contains("Operand must be a number."));
    }

    #[test]
    fn test_interp_30_superclass_must_be_a_class() {
        let (_, err) = run_err("var NotAClass = 1;\nclass A < NotAClass {}");

        assert!(err.contains("Superclass must be a class."));
    }

    #[test]
    fn test_interp_31_error_halts_remaining_statements() {
        let (output, err) = run_err("print 1;\nmissing;\nprint 2;");

        // Output up to the fault is kept; nothing after it runs.
        assert_eq!(output, "1\n");
        assert!(err.contains("Undefined variable 'missing'."));
    }

    #[test]
    fn test_interp_32_runtime_error_reports_line() {
        let (_, err) = run_err("var a = 1;\n\n\nprint a + nil;");

        assert!(err.contains("[line 4]"), "unexpected message: {}", err);
    }
}
