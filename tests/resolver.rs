use glox::interpreter::Interpreter;
use glox::parser::Parser;
use glox::resolver::Resolver;
use glox::scanner::Scanner;

fn resolve_errors(source: &str) -> Vec<String> {
    let scanner = Scanner::new(source);
    let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

    let mut parser = Parser::new(tokens);
    let statements = parser.parse();
    assert!(
        !parser.had_error(),
        "unexpected parse errors: {:?}",
        parser.errors()
    );

    let mut interpreter = Interpreter::new();
    let mut resolver = Resolver::new(&mut interpreter);
    resolver.resolve(&statements);

    resolver.finish().iter().map(|e| e.to_string()).collect()
}

fn assert_clean(source: &str) {
    let errors = resolve_errors(source);
    assert!(errors.is_empty(), "unexpected resolve errors: {:?}", errors);
}

#[test]
fn duplicate_local_declaration_is_an_error() {
    let errors = resolve_errors("{ var a = 1; var a = 2; }");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'a': Variable already declared in this scope."]
    );
}

#[test]
fn global_redeclaration_is_allowed() {
    assert_clean("var a = 1; var a = 2;");
}

#[test]
fn reading_a_local_in_its_own_initializer_is_an_error() {
    let errors = resolve_errors("var a = 1; { var a = a; }");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'a': Can't read local variable in its own initializer"]
    );
}

#[test]
fn global_initializer_may_reference_itself() {
    // globals stay late-bound; the read resolves at runtime
    assert_clean("var a = 1; var a = a;");
}

#[test]
fn return_at_top_level_is_an_error() {
    let errors = resolve_errors("return 1;");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'return': Can't return from top-level code."]
    );
}

#[test]
fn return_inside_function_is_fine() {
    assert_clean("fun f() { return 1; }");
}

#[test]
fn returning_a_value_from_an_initializer_is_an_error() {
    let errors = resolve_errors("class Boat { init() { return 1; } }");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'return': Can't return a value from an initializer"]
    );
}

#[test]
fn bare_return_from_an_initializer_is_fine() {
    assert_clean("class Boat { init() { return; } }");
}

#[test]
fn this_outside_a_class_is_an_error() {
    let errors = resolve_errors("print this;");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'this': can't use 'this' outside of a class."]
    );
}

#[test]
fn this_inside_a_function_outside_a_class_is_an_error() {
    let errors = resolve_errors("fun f() { return this; }");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'this': can't use 'this' outside of a class."]
    );
}

#[test]
fn super_outside_a_class_is_an_error() {
    let errors = resolve_errors("print super.m;");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'super': can't use 'super' outside of a class."]
    );
}

#[test]
fn super_without_a_superclass_is_an_error() {
    let errors = resolve_errors("class A { m() { return super.m(); } }");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'super': can't use 'super' in a class with no superclass."]
    );
}

#[test]
fn super_with_a_superclass_is_fine() {
    assert_clean("class A { m() {} } class B < A { m() { return super.m(); } }");
}

#[test]
fn a_class_cannot_inherit_from_itself() {
    let errors = resolve_errors("class Bar < Bar {}");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'Bar': A class can't inherit from itself."]
    );
}

#[test]
fn resolution_continues_past_the_first_error() {
    let errors = resolve_errors("return 1;\nprint this;");

    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains("Can't return from top-level code."));
    assert!(errors[1].contains("can't use 'this' outside of a class."));
}

#[test]
fn duplicate_parameters_are_an_error() {
    let errors = resolve_errors("fun f(a, a) {}");

    assert_eq!(
        errors,
        vec!["[line 1] Error at 'a': Variable already declared in this scope."]
    );
}
