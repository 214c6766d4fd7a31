#[cfg(test)]
mod parser_tests {
    use rox as lox;

    use lox::ast_printer::AstPrinter;
    use lox::parser::*;
    use lox::scanner::Scanner;
    use lox::token::{Token, TokenType};

    fn tokens(source: &str) -> Vec<Token> {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty(), "scan errors: {:?}", errors);
        tokens
    }

    /// Parse and return (printed program, error strings).
    fn parse(source: &str) -> (String, Vec<String>) {
        let mut parser = Parser::new(tokens(source));
        let statements = parser.parse();
        let errors = parser.errors().iter().map(|e| e.to_string()).collect();

        (AstPrinter::print_program(&statements), errors)
    }

    fn parse_ok(source: &str) -> String {
        let (printed, errors) = parse(source);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        printed
    }

    #[test]
    fn arithmetic_precedence_and_associativity() {
        assert_eq!(
            parse_ok("1 + 2 * 3 - 4;"),
            "(; (- (+ 1.0 (* 2.0 3.0)) 4.0))"
        );
        assert_eq!(parse_ok("8 / 4 / 2;"), "(; (/ (/ 8.0 4.0) 2.0))");
        assert_eq!(parse_ok("-(1 + 2);"), "(; (- (group (+ 1.0 2.0))))");
    }

    #[test]
    fn comparison_binds_tighter_than_equality() {
        assert_eq!(parse_ok("1 < 2 == true;"), "(; (== (< 1.0 2.0) true))");
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(parse_ok("a or b and c;"), "(; (or a (and b c)))");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(parse_ok("a = b = 1;"), "(; (= a (= b 1.0)))");
    }

    #[test]
    fn unary_operators_nest() {
        assert_eq!(parse_ok("!-x;"), "(; (! (- x)))");
        assert_eq!(parse_ok("!!true;"), "(; (! (! true)))");
    }

    #[test]
    fn call_suffixes_chain_and_keep_closing_paren() {
        assert_eq!(
            parse_ok("f(1)(2, 3);"),
            "(; (call (call f 1.0) 2.0 3.0))"
        );

        let mut parser = Parser::new(tokens("f(\n1\n);"));
        let statements = parser.parse();

        match &statements[..] {
            [Stmt::Expression(Expr::Call { paren, arguments, .. })] => {
                assert_eq!(paren.lexeme, ")");
                assert_eq!(paren.line, 3);
                assert_eq!(arguments.len(), 1);
            }
            other => panic!("unexpected program: {:?}", other),
        }
    }

    #[test]
    fn for_loop_desugars_to_while() {
        assert_eq!(
            parse_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
        );
        assert_eq!(parse_ok("for (;;) print 1;"), "(while true (print 1.0))");
        assert_eq!(
            parse_ok("for (i = 0; i < 1;) print i;"),
            "(block (; (= i 0.0)) (while (< i 1.0) (print i)))"
        );
    }

    #[test]
    fn statements_and_declarations() {
        assert_eq!(
            parse_ok("fun add(a, b) { return a + b; }"),
            "(fun add (a b) (return (+ a b)))"
        );
        assert_eq!(
            parse_ok("if (x) print 1; else { print 2; }"),
            "(if x (print 1.0) (block (print 2.0)))"
        );
        assert_eq!(
            parse_ok("var a; var b = \"s\"; while (a) a = nil;"),
            "(var a)\n(var b s)\n(while a (; (= a nil)))"
        );
        assert_eq!(parse_ok("fun f() { return; }"), "(fun f () (return))");
    }

    #[test]
    fn invalid_assignment_target_is_reported_but_not_fatal() {
        let (printed, errors) = parse("1 = 2; print 3;");

        assert_eq!(
            errors,
            ["[line 1] Error at '=': Invalid assignment target."]
        );
        assert_eq!(printed, "(; 1.0)\n(print 3.0)");
    }

    #[test]
    fn panic_mode_skips_only_the_broken_statement() {
        let (printed, errors) = parse("var = 1; print 2;");

        assert_eq!(errors, ["[line 1] Error at '=': Expect variable name."]);
        assert_eq!(printed, "(print 2.0)");
    }

    #[test]
    fn recovery_stops_at_statement_keywords() {
        let (printed, errors) = parse("print (1 + ; var a = 1;\nprint a;");

        assert_eq!(errors, ["[line 1] Error at ';': Expect expression."]);
        assert_eq!(printed, "(var a 1.0)\n(print a)");
    }

    #[test]
    fn errors_at_end_of_input_say_so() {
        let (_, errors) = parse("print 1");

        assert_eq!(errors, ["[line 1] Error at end: Expect ';' after value."]);
    }

    #[test]
    fn classes_are_not_supported() {
        let (printed, errors) = parse("class Foo {} print 1;");

        assert_eq!(errors, ["[line 1] Error at 'class': Expect expression."]);
        assert_eq!(printed, "(print 1.0)");
    }

    #[test]
    fn errors_inside_blocks_keep_the_rest_of_the_block() {
        let (printed, errors) = parse("{ print ; print 2; }");

        assert_eq!(errors.len(), 1);
        assert_eq!(printed, "(block (print 2.0))");
    }

    fn numbered(prefix: &str, count: usize) -> String {
        (0..count)
            .map(|i| format!("{}{}", prefix, i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[test]
    fn too_many_arguments_is_reported_once_and_the_call_survives() {
        let source = format!("f({});", numbered("", 256));
        let mut parser = Parser::new(tokens(&source));
        let statements = parser.parse();

        let errors: Vec<String> = parser.errors().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            errors,
            ["[line 1] Error at '255': Can't have more than 255 arguments."]
        );

        match &statements[..] {
            [Stmt::Expression(Expr::Call { arguments, .. })] => assert_eq!(arguments.len(), 256),
            other => panic!("unexpected program: {:?}", other),
        }
    }

    #[test]
    fn too_many_parameters_is_reported_once_and_the_function_survives() {
        let source = format!("fun f({}) {{}}", numbered("p", 256));
        let mut parser = Parser::new(tokens(&source));
        let statements = parser.parse();

        let errors: Vec<String> = parser.errors().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            errors,
            ["[line 1] Error at 'p255': Can't have more than 255 parameters."]
        );

        match &statements[..] {
            [Stmt::Function(decl)] => {
                assert_eq!(decl.name.lexeme, "f");
                assert_eq!(decl.params.len(), 256);
            }
            other => panic!("unexpected program: {:?}", other),
        }
    }

    #[test]
    fn reparsing_the_same_tokens_is_deterministic() {
        let toks = tokens("var a = 1; fun f(x) { a = a + x; return a; } print f(2);");

        let first = Parser::new(toks.clone()).parse();
        let second = Parser::new(toks).parse();

        assert_eq!(first, second);
    }

    #[test]
    fn variable_nodes_are_numbered_from_the_first_id() {
        let mut parser = Parser::with_first_id(tokens("a; b = c;"), NodeId(10));
        let statements = parser.parse();

        let ids: Vec<NodeId> = statements
            .iter()
            .map(|stmt| match stmt {
                Stmt::Expression(Expr::Variable { id, .. }) => *id,
                Stmt::Expression(Expr::Assign { id, .. }) => *id,
                other => panic!("unexpected statement: {:?}", other),
            })
            .collect();

        // `b` and `c` are numbered before the assignment that wraps them.
        assert_eq!(ids, [NodeId(10), NodeId(13)]);
        assert_eq!(parser.next_id(), NodeId(14));
    }

    #[test]
    fn tokens_without_eof_still_parse() {
        let toks = vec![
            Token::new(TokenType::PRINT, "print", 1),
            Token::new(TokenType::NUMBER(7.0), "7", 1),
            Token::new(TokenType::SEMICOLON, ";", 1),
        ];

        let mut parser = Parser::new(toks);
        let statements = parser.parse();

        assert!(!parser.had_error());
        assert_eq!(AstPrinter::print_program(&statements), "(print 7.0)");
    }

    #[test]
    fn program_serializes_to_json() {
        let statements = Parser::new(tokens("print 1;")).parse();
        let json = serde_json::to_string(&statements).expect("serializable");

        assert!(json.contains("\"Print\""), "json: {}", json);
        assert!(json.contains("\"Number\":1.0"), "json: {}", json);
    }
}
