use myst::{Error, Interpreter, Value};
use pretty_assertions::assert_eq;

fn run(src: &str) -> Value {
    Interpreter::new().run(src, "<test>").unwrap()
}

fn run_on(interp: &mut Interpreter, src: &str) -> Value {
    interp.run(src, "<test>").unwrap()
}

#[test]
fn simple_match_assign_binds_and_returns_value() {
    let mut interp = Interpreter::new();
    assert_eq!(run_on(&mut interp, "a =: 1"), Value::Int(1));
    assert_eq!(run_on(&mut interp, "a"), Value::Int(1));
}

#[test]
fn list_pattern_destructures_positionally() {
    let mut interp = Interpreter::new();
    run_on(&mut interp, "[a, b] =: [1, 2]");
    assert_eq!(run_on(&mut interp, "a"), Value::Int(1));
    assert_eq!(run_on(&mut interp, "b"), Value::Int(2));
}

#[test]
fn map_pattern_destructures_nested_list() {
    let mut interp = Interpreter::new();
    run_on(&mut interp, "{a: [a, 2]} =: {a: [1, 2]}");
    assert_eq!(run_on(&mut interp, "a"), Value::Int(1));
}

#[test]
fn splat_captures_middle_slice() {
    let mut interp = Interpreter::new();
    run_on(&mut interp, "[1, *mid, 4] =: [1, 2, 3, 4]");
    assert_eq!(run_on(&mut interp, "mid"), Value::new_list(vec![Value::Int(2), Value::Int(3)]));
}

#[test]
fn interpolation_pattern_cross_numeric_match_never_rebinds() {
    let mut interp = Interpreter::new();
    run_on(&mut interp, "a = 2");
    assert_eq!(run_on(&mut interp, "<a> =: 2.0"), Value::Float(2.0));
    assert_eq!(run_on(&mut interp, "a"), Value::Int(2));
}

#[test]
fn const_type_pattern_matches_primitive() {
    assert_eq!(run("String =: \"hello\""), Value::String("hello".into()));
}

#[test]
fn interpolated_type_pattern_from_builtin_type_call() {
    let mut interp = Interpreter::new();
    run_on(&mut interp, "int_type = 1.type");
    assert_eq!(run_on(&mut interp, "<int_type> =: 5"), Value::Int(5));

    let err = interp.run("<int_type> =: 1.5", "<test>").unwrap_err();
    assert!(matches!(err, Error::Match { .. }));
}

#[test]
fn function_definition_and_call_restrict_parameter_scope() {
    let mut interp = Interpreter::new();
    run_on(&mut interp, "def f(x) x + 1 end");
    assert_eq!(run_on(&mut interp, "f(2)"), Value::Int(3));

    let err = interp.run("x", "<test>").unwrap_err();
    assert!(matches!(err, Error::UndefinedVariable { .. }));
}

#[test]
fn splat_function_parameter_collects_rest_as_list() {
    let mut interp = Interpreter::new();
    run_on(&mut interp, "def first(head, *rest) head end");
    assert_eq!(run_on(&mut interp, "first(1, 2, 3)"), Value::Int(1));
}

#[test]
fn arithmetic_follows_mathematically_correct_rules() {
    assert_eq!(run("7 - 3"), Value::Int(4));
    assert_eq!(run("7 * 3"), Value::Int(21));
    assert_eq!(run("7 / 2"), Value::Int(3));
    assert_eq!(run("7.0 / 2"), Value::Float(3.5));
}

#[test]
fn division_by_zero_is_an_error() {
    let err = Interpreter::new().run("1 / 0", "<test>").unwrap_err();
    assert!(matches!(err, Error::DivisionByZero { .. }));
}

#[test]
fn string_concatenation_stringifies_the_right_operand() {
    assert_eq!(run("\"n=\" + 3"), Value::String("n=3".into()));
}

#[test]
fn string_repetition_with_negative_count_is_empty() {
    assert_eq!(run("\"ab\" * -1"), Value::String("".into()));
    assert_eq!(run("\"ab\" * 2"), Value::String("abab".into()));
}

#[test]
fn logical_operators_follow_truthiness() {
    assert_eq!(run("false || 3"), Value::Int(3));
    assert_eq!(run("1 && 2"), Value::Int(2));
    assert_eq!(run("nil && 1"), Value::Nil);
}

#[test]
fn empty_list_and_map_patterns_match_only_themselves() {
    assert_eq!(run("[] =: []"), Value::new_list(vec![]));
    assert_eq!(run("{} =: {}"), Value::new_map(vec![]));

    let err = Interpreter::new().run("[] =: [1]", "<test>").unwrap_err();
    assert!(matches!(err, Error::Match { .. }));
}

#[test]
fn splat_capturing_zero_elements_yields_empty_list_not_nil() {
    let mut interp = Interpreter::new();
    run_on(&mut interp, "[1, *rest] =: [1]");
    assert_eq!(run_on(&mut interp, "rest"), Value::new_list(vec![]));
}

#[test]
fn splat_capturing_single_list_element_does_not_flatten() {
    let mut interp = Interpreter::new();
    let inner = Value::new_list(vec![Value::Int(2), Value::Int(3)]);
    run_on(&mut interp, "[1, *rest] =: [1, [2, 3]]");
    assert_eq!(run_on(&mut interp, "rest"), Value::new_list(vec![inner]));
}

#[test]
fn cross_type_primitive_match_fails() {
    let err = Interpreter::new().run("nil =: false", "<test>").unwrap_err();
    assert!(matches!(err, Error::Match { .. }));
}

#[test]
fn const_bound_to_non_type_value_acts_as_literal_pattern() {
    let mut interp = Interpreter::new();
    run_on(&mut interp, "A = false");
    let err = interp.run("A =: true", "<test>").unwrap_err();
    assert!(matches!(err, Error::Match { .. }));

    run_on(&mut interp, "A = 10");
    assert_eq!(run_on(&mut interp, "A =: 10"), Value::Int(10));
}

#[test]
fn capture_errors_records_diagnostic_instead_of_propagating() {
    let mut interp = myst::InterpreterBuilder::new().capture_errors(true).build();
    let result = interp.run("undefined_name", "<test>").unwrap();
    assert_eq!(result, Value::Nil);
    assert_eq!(interp.diagnostics().len(), 1);
    assert_eq!(interp.diagnostics()[0].kind, "UndefinedVariable");
}

#[test]
fn max_call_depth_is_enforced() {
    let mut interp = myst::InterpreterBuilder::new().max_call_depth(4).build();
    run_on(&mut interp, "def loop_forever(n) loop_forever(n + 1) end");
    let err = interp.run("loop_forever(0)", "<test>").unwrap_err();
    assert!(matches!(err, Error::Runtime { .. }));
}

#[test]
fn unsupported_statements_are_a_clean_parse_error() {
    let err = Interpreter::new().run("if true\n1\nend", "<test>").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}
