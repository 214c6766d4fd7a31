#[cfg(test)]
mod interpreter_tests {
    use rox as lox;

    use std::io::{self, Write};

    use lox::parser::NodeId;
    use lox::report::Diagnostics;
    use lox::{Lox, RunStatus};

    type TestLox = Lox<Vec<u8>, Diagnostics>;

    fn new_lox() -> TestLox {
        Lox::with_sinks(Vec::new(), Diagnostics::new())
    }

    fn output(lox: &TestLox) -> String {
        String::from_utf8(lox.interpreter().output().clone()).expect("output is utf-8")
    }

    /// Run one program and return (status, stdout, diagnostics).
    fn run(source: &str) -> (RunStatus, String, Vec<String>) {
        let mut lox = new_lox();
        let status = lox.run(source);

        (status, output(&lox), lox.reporter().lines().to_vec())
    }

    fn run_ok(source: &str) -> String {
        let (status, out, diagnostics) = run(source);
        assert_eq!(status, RunStatus::Success, "diagnostics: {:?}", diagnostics);
        out
    }

    fn run_err(source: &str) -> (String, String) {
        let (status, out, diagnostics) = run(source);
        assert_eq!(status, RunStatus::RuntimeError, "output: {:?}", out);
        assert_eq!(diagnostics.len(), 1, "diagnostics: {:?}", diagnostics);
        (out, diagnostics[0].clone())
    }

    #[test]
    fn arithmetic_and_concatenation() {
        assert_eq!(
            run_ok("print 1 + 2; print \"a\" + \"b\"; print 1 / 2;"),
            "3\nab\n0.5\n"
        );
        assert_eq!(run_ok("print (1 + 2) * 3 - -1;"), "10\n");
        assert_eq!(run_ok("print 1 / 0;"), "inf\n");
    }

    #[test]
    fn comparisons_and_equality() {
        assert_eq!(
            run_ok("print 1 < 2; print 2 <= 1; print 1 == 1; print \"a\" != \"b\"; print nil == nil; print nil != nil;"),
            "true\nfalse\ntrue\ntrue\ntrue\nfalse\n"
        );
    }

    #[test]
    fn only_true_is_truthy() {
        assert_eq!(
            run_ok("print !!0; print !!\"s\"; print !!nil; print !!false; print !!true;"),
            "false\nfalse\nfalse\nfalse\ntrue\n"
        );
        assert_eq!(run_ok("if (1) print \"yes\"; else print \"no\";"), "no\n");
    }

    #[test]
    fn logical_operators_yield_an_operand() {
        assert_eq!(
            run_ok("print nil or \"x\"; print 1 and 2; print true and 2; print true or 2;"),
            "x\n1\n2\ntrue\n"
        );
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(
            run_ok("var a = 0; false and (a = 1); true or (a = 2); print a;"),
            "0\n"
        );
    }

    #[test]
    fn number_on_the_left_never_raises() {
        assert_eq!(run_ok("print 1 + \"a\"; print 1 == nil;"), "nil\nnil\n");
    }

    #[test]
    fn mismatched_operands_raise_for_other_left_types() {
        let (_, message) = run_err("print \"a\" + 1;");
        assert_eq!(message, "Operands are not of the same type.\n[line 1]");

        let (_, message) = run_err("print nil == 1;");
        assert_eq!(message, "Operands are not of the same type.\n[line 1]");

        let (_, message) = run_err("print true == 1;");
        assert_eq!(message, "Operands are not of the same type.\n[line 1]");
    }

    #[test]
    fn unsupported_operators_are_named_by_type() {
        let (_, message) = run_err("print true < false;");
        assert_eq!(message, "Operator not supported for booleans.\n[line 1]");

        let (_, message) = run_err("print \"a\" - \"b\";");
        assert_eq!(message, "Operator not supported for strings.\n[line 1]");

        let (_, message) = run_err("fun f() {} print f + 1;");
        assert_eq!(message, "Operator not supported for functions.\n[line 1]");

        let (_, message) = run_err("print nil < nil;");
        assert_eq!(message, "Operator not supported for nil.\n[line 1]");

        let (_, message) = run_err("print nil + nil;");
        assert_eq!(message, "Operator not supported for nil.\n[line 1]");
    }

    #[test]
    fn negation_requires_a_number() {
        let (_, message) = run_err("print -\"x\";");
        assert_eq!(message, "Operand must be a number.\n[line 1]");
    }

    #[test]
    fn block_scopes_shadow_and_restore() {
        assert_eq!(
            run_ok("var a = 1; { var a = 2; print a; } print a;"),
            "2\n1\n"
        );
        assert_eq!(run_ok("{ var a = 1; var a = 2; print a; }"), "2\n");
    }

    #[test]
    fn assignment_writes_through_to_the_outer_frame() {
        assert_eq!(run_ok("var a = 1; { a = 2; } print a;"), "2\n");
        assert_eq!(run_ok("var a; print a = 3;"), "3\n");
    }

    #[test]
    fn undefined_variables_are_runtime_errors() {
        let (_, message) = run_err("print y;");
        assert_eq!(message, "Undefined variable 'y'.\n[line 1]");

        let (_, message) = run_err("\n\ny = 1;");
        assert_eq!(message, "Undefined variable 'y'.\n[line 3]");
    }

    #[test]
    fn while_and_for_loops() {
        assert_eq!(
            run_ok("var i = 0; while (i < 3) { print i; i = i + 1; }"),
            "0\n1\n2\n"
        );

        let (out, message) = run_err("for (var i = 0; i < 3; i = i + 1) print i;\nprint i;");
        assert_eq!(out, "0\n1\n2\n");
        assert_eq!(message, "Undefined variable 'i'.\n[line 2]");
    }

    #[test]
    fn functions_return_values_and_default_to_nil() {
        assert_eq!(
            run_ok("fun add(a, b) { return a + b; } print add(1, 2);"),
            "3\n"
        );
        assert_eq!(run_ok("fun f() {} print f();"), "nil\n");
        assert_eq!(run_ok("fun f() { return; } print f();"), "nil\n");
    }

    #[test]
    fn return_unwinds_through_loops_and_blocks() {
        let source = "
            fun f() {
                var i = 0;
                while (true) {
                    i = i + 1;
                    if (i == 3) { { return i; } }
                }
            }
            print f();
        ";

        assert_eq!(run_ok(source), "3\n");
    }

    #[test]
    fn recursion() {
        let source = "
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
        ";

        assert_eq!(run_ok(source), "55\n");
    }

    #[test]
    fn closures_keep_independent_state() {
        let source = "
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    return i;
                }
                return count;
            }

            var c1 = makeCounter();
            var c2 = makeCounter();

            print c1();
            print c1();
            print c2();
            print c1();
        ";

        assert_eq!(run_ok(source), "1\n2\n1\n3\n");
    }

    #[test]
    fn closures_bind_lexically() {
        let source = "
            var a = \"global\";
            {
                fun show() {
                    print a;
                }

                show();
                var a = \"block\";
                show();
            }
        ";

        assert_eq!(run_ok(source), "global\nglobal\n");
    }

    #[test]
    fn arity_mismatch_is_reported_at_the_closing_paren() {
        let (_, message) = run_err("fun f(a) {}\nf(1,\n2);");
        assert_eq!(message, "Expected 1 arguments but got 2.\n[line 3]");

        let (_, message) = run_err("fun f(a, b) {}\nf(1\n);");
        assert_eq!(message, "Expected 2 arguments but got 1.\n[line 3]");
    }

    #[test]
    fn only_functions_are_callable() {
        let (_, message) = run_err("\"x\"();");

        assert_eq!(message, "Can only call functions.\n[line 1]");
    }

    #[test]
    fn printing_a_function_prints_nothing() {
        assert_eq!(run_ok("fun f() {} print f; print clock; print 1;"), "1\n");
    }

    #[test]
    fn clock_returns_seconds() {
        assert_eq!(run_ok("print clock() > 0;"), "true\n");

        let (_, message) = run_err("clock(1);");
        assert_eq!(message, "Expected 0 arguments but got 1.\n[line 1]");
    }

    #[test]
    fn runtime_error_aborts_the_rest_of_the_run() {
        let (out, message) = run_err("print 1; print -nil; print 2;");

        assert_eq!(out, "1\n");
        assert_eq!(message, "Operand must be a number.\n[line 1]");
    }

    #[test]
    fn static_errors_prevent_execution() {
        let (status, out, diagnostics) = run("print 1; print ;");
        assert_eq!(status, RunStatus::StaticError);
        assert_eq!(out, "");
        assert_eq!(diagnostics, ["[line 1] Error at ';': Expect expression."]);

        let (status, out, diagnostics) = run("print 1; return 2;");
        assert_eq!(status, RunStatus::StaticError);
        assert_eq!(out, "");
        assert_eq!(
            diagnostics,
            ["[line 1] Error at 'return': Can't return from top-level code."]
        );

        let (status, out, diagnostics) = run("print 1; $");
        assert_eq!(status, RunStatus::StaticError);
        assert_eq!(out, "");
        assert_eq!(diagnostics, ["[line 1] Error: Unexpected character: $"]);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(RunStatus::Success.exit_code(), 0);
        assert_eq!(RunStatus::StaticError.exit_code(), 65);
        assert_eq!(RunStatus::RuntimeError.exit_code(), 70);
    }

    #[test]
    fn globals_persist_across_runs() {
        let mut lox = new_lox();

        assert_eq!(lox.run("var a = 1;"), RunStatus::Success);
        assert_eq!(
            lox.run("fun inc() { a = a + 1; return a; }"),
            RunStatus::Success
        );
        assert_eq!(lox.run("print inc(); print inc();"), RunStatus::Success);

        assert_eq!(output(&lox), "2\n3\n");
    }

    #[test]
    fn resolved_locals_do_not_leak_into_later_runs() {
        let mut lox = new_lox();

        assert_eq!(lox.run("{ var x = 1; { print x; } }"), RunStatus::Success);
        assert_eq!(lox.run("var y = 5; print y;"), RunStatus::Success);

        assert_eq!(output(&lox), "1\n5\n");
        assert!(lox.reporter().is_empty());
    }

    #[test]
    fn environment_is_restored_after_a_runtime_error_in_a_block() {
        let mut lox = new_lox();

        assert_eq!(
            lox.run("{ var a = 2; print -nil; }"),
            RunStatus::RuntimeError
        );
        assert_eq!(lox.run("var z = 3; print z;"), RunStatus::Success);

        assert_eq!(output(&lox), "3\n");
        assert!(lox.reporter().contains("Operand must be a number."));
    }

    #[test]
    fn rejected_runs_record_no_distances() {
        let mut lox = new_lox();

        // `a` is NodeId(0) and would resolve to depth 0.
        assert_eq!(
            lox.run("{ var a = 1; print a; } return;"),
            RunStatus::StaticError
        );
        assert_eq!(lox.interpreter().resolved_depth(NodeId(0)), None);

        assert_eq!(lox.run("{ var b = 1; print b; }"), RunStatus::Success);
        assert_eq!(lox.interpreter().resolved_depth(NodeId(1)), Some(0));
    }

    /// Accepts writes but refuses to flush.
    #[derive(Default)]
    struct StuckSink(Vec<u8>);

    impl Write for StuckSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("sink is stuck"))
        }
    }

    #[test]
    fn runtime_error_is_reported_ahead_of_a_failed_flush() {
        let mut lox = Lox::with_sinks(StuckSink::default(), Diagnostics::new());

        assert_eq!(lox.run("print 1; print -nil;"), RunStatus::RuntimeError);
        assert_eq!(
            lox.reporter().lines(),
            ["Operand must be a number.\n[line 1]"]
        );
        assert_eq!(lox.interpreter().output().0, b"1\n");

        lox.reporter_mut().clear();
        assert_eq!(lox.run("print 2;"), RunStatus::RuntimeError);
        assert!(lox.reporter().contains("sink is stuck"));
    }

    #[test]
    fn a_failed_run_does_not_stop_the_next() {
        let mut lox = new_lox();

        assert_eq!(lox.run("print ;"), RunStatus::StaticError);
        lox.reporter_mut().clear();
        assert_eq!(lox.run("print 4;"), RunStatus::Success);

        assert_eq!(output(&lox), "4\n");
        assert!(lox.reporter().is_empty());
    }
}
