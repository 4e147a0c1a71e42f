use glox::ast_printer::Ast;
use glox::error::LoxError;
use glox::parser::Parser;
use glox::scanner::Scanner;
use glox::stmt::Stmt;

fn parse_source(source: &str) -> (Vec<Stmt>, Vec<LoxError>) {
    let scanner = Scanner::new(source);
    let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

    let mut parser = Parser::new(tokens);
    let statements = parser.parse();
    let errors = parser.errors().to_vec();

    (statements, errors)
}

fn print_program(source: &str) -> String {
    let (statements, errors) = parse_source(source);
    assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);

    let printer = Ast;
    statements
        .iter()
        .map(|s| printer.print_stmt(s))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn factor_binds_tighter_than_term() {
    assert_eq!(print_program("1 + 2 * 3;"), "(expr (+ 1.0 (* 2.0 3.0)))");
    assert_eq!(print_program("1 * 2 + 3;"), "(expr (+ (* 1.0 2.0) 3.0))");
}

#[test]
fn binary_operators_are_left_associative() {
    assert_eq!(print_program("1 - 2 - 3;"), "(expr (- (- 1.0 2.0) 3.0))");
    assert_eq!(print_program("8 / 4 / 2;"), "(expr (/ (/ 8.0 4.0) 2.0))");
}

#[test]
fn comparison_binds_tighter_than_equality() {
    assert_eq!(
        print_program("1 < 2 == 3 < 4;"),
        "(expr (== (< 1.0 2.0) (< 3.0 4.0)))"
    );
}

#[test]
fn logical_or_is_lower_than_and() {
    assert_eq!(
        print_program("a or b and c;"),
        "(expr (or a (and b c)))"
    );
}

#[test]
fn unary_is_right_associative() {
    assert_eq!(print_program("!!true;"), "(expr (! (! true)))");
    assert_eq!(print_program("--1;"), "(expr (- (- 1.0)))");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(print_program("a = b = 1;"), "(expr (= a (= b 1.0)))");
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(
        print_program("(1 + 2) * 3;"),
        "(expr (* (group (+ 1.0 2.0)) 3.0))"
    );
}

#[test]
fn call_and_get_chain() {
    assert_eq!(
        print_program("object.field.method(1, 2);"),
        "(expr (call (get (get object field) method) 1.0 2.0))"
    );
}

#[test]
fn assignment_to_get_becomes_set() {
    assert_eq!(
        print_program("point.x = 1;"),
        "(expr (set point x 1.0))"
    );
}

#[test]
fn super_and_this_parse_in_primary_position() {
    assert_eq!(
        print_program("this.x = super.method();"),
        "(expr (set this x (call (super method))))"
    );
}

#[test]
fn for_loop_desugars_to_while() {
    // for (I; C; U) B  ==  { I; while (C) { B; U; } }
    assert_eq!(
        print_program("for (var i = 0; i < 3; i = i + 1) print i;"),
        "(block (var i 0.0) (while (< i 3.0) (block (print i) (expr (= i (+ i 1.0))))))"
    );
}

#[test]
fn for_loop_with_empty_clauses() {
    // a missing condition becomes literal true
    assert_eq!(
        print_program("for (;;) print 1;"),
        "(while true (print 1.0))"
    );
}

#[test]
fn var_function_and_class_declarations() {
    assert_eq!(print_program("var x;"), "(var x)");
    assert_eq!(
        print_program("fun add(a, b) { return a + b; }"),
        "(fun add (a b) (return (+ a b)))"
    );
    assert_eq!(
        print_program("class B < A { m() { return 1; } }"),
        "(class B < A (method m () (return 1.0)))"
    );
}

#[test]
fn invalid_assignment_target_is_reported_but_kept() {
    let (statements, errors) = parse_source("1 + 2 = 3;");

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at '=': Invalid assignment target."
    );
    // the parsed left side survives
    assert_eq!(statements.len(), 1);
}

#[test]
fn parser_synchronizes_and_reports_multiple_errors() {
    let (statements, errors) = parse_source("var = 1;\nprint 2;\nvar = 3;\nprint 4;");

    // both bad declarations are reported, both prints survive
    assert_eq!(errors.len(), 2);
    for error in &errors {
        assert!(error.to_string().contains("Expect variable name."));
    }
    assert_eq!(statements.len(), 2);
}

#[test]
fn missing_expression_at_end_is_reported() {
    let (_, errors) = parse_source("1 +");

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at end: Expect expression."
    );
}

#[test]
fn leading_dot_number_fails_to_parse() {
    let (_, errors) = parse_source("var x = .5;");

    assert!(!errors.is_empty());
    assert!(errors[0].to_string().contains("Expect expression."));
}

#[test]
fn argument_list_is_capped_at_255() {
    let args = (0..256).map(|_| "1").collect::<Vec<_>>().join(", ");
    let (_, errors) = parse_source(&format!("f({});", args));

    assert!(errors
        .iter()
        .any(|e| e.to_string().contains("Can't have more than 255 arguments.")));
}

#[test]
fn parameter_list_is_capped_at_255() {
    let params = (0..256)
        .map(|i| format!("p{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let (_, errors) = parse_source(&format!("fun f({}) {{}}", params));

    assert!(errors
        .iter()
        .any(|e| e.to_string().contains("Can't have more than 255 parameters.")));
}
