use std::rc::Rc;

use crate::environment::Environment;
use crate::object::{EvaluationError, Function, Object, QuickReturn};
use monkey_lang_core::ast;
use monkey_lang_core::ast::Expression;

/// Evaluates every statement in order and yields the last value. A `return`
/// at this level ends the program with its value; an error ends it with the
/// error.
#[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
pub fn eval_program(
    program: &ast::Program,
    environment: &mut Environment,
) -> Result<Rc<Object>, EvaluationError> {
    let mut output = Object::null();
    for statement in &program.statements {
        let result = eval_statement(statement, environment);

        match result {
            Err(QuickReturn::Return(value)) => return Ok(value),
            Err(QuickReturn::Error(error)) => {
                tracing::debug!(%error, "evaluation failed");
                return Err(error);
            }
            Ok(object) => output = object,
        };
    }
    Ok(output)
}

fn eval_statement(
    statement: &ast::Statement,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    match statement {
        ast::Statement::Expression(expression) => eval_expression(expression, environment),
        ast::Statement::Return(statement) => eval_return_statement(statement, environment),
        ast::Statement::Let(statement) => eval_let_statement(statement, environment),
    }
}

fn eval_let_statement(
    statement: &ast::LetStatement,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    let value = eval_expression(&statement.value, environment)?;
    environment.set(statement.identifier.name.clone(), value.clone());
    Ok(value)
}

fn eval_return_statement(
    statement: &ast::ReturnStatement,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    let value = eval_expression(&statement.value, environment)?;
    Err(QuickReturn::Return(value))
}

fn eval_expression(
    expression: &Expression,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    match expression {
        Expression::IntegerLiteral(value) => Ok(Object::integer(*value)),
        Expression::BooleanLiteral(value) => Ok(Object::boolean(*value)),
        Expression::StringLiteral(value) => Ok(Object::string(value.clone())),
        Expression::Identifier(identifier) => Ok(eval_identifier(identifier, environment)?),
        Expression::PrefixOperation(kind, right) => {
            let right = eval_expression(right, environment)?;
            Ok(eval_prefix_operation(*kind, right)?)
        }
        Expression::InfixOperation(kind, left, right) => {
            // Left first; an error on the left means the right is never evaluated
            let left = eval_expression(left, environment)?;
            let right = eval_expression(right, environment)?;
            Ok(eval_infix_operation(*kind, left, right)?)
        }
        Expression::IfExpression {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, environment)?;
            if condition.is_truthy() {
                eval_block_statement(consequence, environment)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, environment)
            } else {
                Ok(Object::null())
            }
        }
        Expression::FunctionLiteral { parameters, body } => Ok(Object::function(
            parameters.clone(),
            body.clone(),
            environment.clone(),
        )),
        Expression::CallExpression {
            function,
            arguments,
        } => {
            let function = eval_expression(function, environment)?;
            let arguments = eval_expressions(arguments, environment)?;
            match function.as_ref() {
                Object::Function(function) => Ok(apply_function(function, arguments)?),
                Object::BuiltinFunction(builtin) => {
                    tracing::trace!(name = builtin.name, "calling builtin");
                    Ok((builtin.func)(arguments)?)
                }
                _ => Err(EvaluationError::NotAFunction(function.clone()).into()),
            }
        }
    }
}

fn eval_identifier(
    identifier: &ast::Identifier,
    environment: &Environment,
) -> Result<Rc<Object>, EvaluationError> {
    environment
        .get(&identifier.name)
        .or_else(|| crate::builtins::lookup(&identifier.name))
        .ok_or_else(|| EvaluationError::IdentifierNotFound(identifier.name.clone()))
}

fn eval_expressions(
    arguments: &[Expression],
    environment: &mut Environment,
) -> Result<Vec<Rc<Object>>, QuickReturn> {
    let mut result = Vec::with_capacity(arguments.len());
    for argument in arguments {
        result.push(eval_expression(argument, environment)?);
    }
    Ok(result)
}

/// Runs the body in a fresh scope enclosed by the function's own environment,
/// not the caller's. A pending `return` stops here.
fn apply_function(
    function: &Function,
    arguments: Vec<Rc<Object>>,
) -> Result<Rc<Object>, EvaluationError> {
    tracing::trace!(
        parameters = function.parameters.len(),
        arguments = arguments.len(),
        "calling function"
    );
    let mut new_environment = Environment::new_enclosed(&function.environment);
    // Parameters without a matching argument stay unbound
    for (parameter, argument) in function.parameters.iter().zip(arguments) {
        new_environment.set(parameter.name.clone(), argument);
    }
    match eval_block_statement(&function.body, &mut new_environment) {
        Ok(object) | Err(QuickReturn::Return(object)) => Ok(object),
        Err(QuickReturn::Error(err)) => Err(err),
    }
}

/// Unlike a program, a block hands a `return` up still wrapped so the
/// enclosing call can tell it apart from an ordinary value.
fn eval_block_statement(
    block: &ast::BlockStatement,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    let mut result = Object::null();
    for statement in &block.statements {
        result = eval_statement(statement, environment)?;
    }
    Ok(result)
}

fn eval_prefix_operation(
    kind: ast::PrefixOperationKind,
    right: Rc<Object>,
) -> Result<Rc<Object>, EvaluationError> {
    match (kind, right.as_ref()) {
        (ast::PrefixOperationKind::Bang, _) => Ok(Object::boolean(!right.is_truthy())),
        (ast::PrefixOperationKind::Minus, Object::Integer(value)) => {
            Ok(Object::integer(value.wrapping_neg()))
        }
        _ => Err(EvaluationError::UnknownPrefixOperator {
            operation: kind,
            right: right.clone(),
        }),
    }
}

fn eval_infix_operation(
    kind: ast::InfixOperationKind,
    left: Rc<Object>,
    right: Rc<Object>,
) -> Result<Rc<Object>, EvaluationError> {
    use ast::InfixOperationKind;
    match (kind, left.as_ref(), right.as_ref()) {
        (_, Object::Integer(l), Object::Integer(r)) => eval_integer_infix_operation(kind, *l, *r),
        (InfixOperationKind::Plus, Object::String(l), Object::String(r)) => {
            Ok(Object::string(format!("{}{}", l, r)))
        }
        (InfixOperationKind::Equal, Object::String(l), Object::String(r)) => {
            Ok(Object::boolean(l == r))
        }
        (InfixOperationKind::NotEqual, Object::String(l), Object::String(r)) => {
            Ok(Object::boolean(l != r))
        }
        (_, Object::String(_), Object::String(_)) => Err(EvaluationError::UnknownInfixOperator {
            operation: kind,
            left: left.clone(),
            right: right.clone(),
        }),
        // Everything else compares by identity, which for booleans and null
        // means comparing the shared singletons
        (InfixOperationKind::Equal, _, _) => Ok(Object::boolean(Rc::ptr_eq(&left, &right))),
        (InfixOperationKind::NotEqual, _, _) => Ok(Object::boolean(!Rc::ptr_eq(&left, &right))),
        _ if left.type_name() != right.type_name() => Err(EvaluationError::TypeMismatch {
            operation: kind,
            left: left.clone(),
            right: right.clone(),
        }),
        _ => Err(EvaluationError::UnknownInfixOperator {
            operation: kind,
            left: left.clone(),
            right: right.clone(),
        }),
    }
}

fn eval_integer_infix_operation(
    kind: ast::InfixOperationKind,
    left: i64,
    right: i64,
) -> Result<Rc<Object>, EvaluationError> {
    use ast::InfixOperationKind;
    let result = match kind {
        InfixOperationKind::Plus => Object::integer(left.wrapping_add(right)),
        InfixOperationKind::Minus => Object::integer(left.wrapping_sub(right)),
        InfixOperationKind::Multiply => Object::integer(left.wrapping_mul(right)),
        InfixOperationKind::Divide => {
            if right == 0 {
                return Err(EvaluationError::DivisionByZero(left));
            }
            Object::integer(left.wrapping_div(right))
        }
        InfixOperationKind::LessThan => Object::boolean(left < right),
        InfixOperationKind::GreaterThan => Object::boolean(left > right),
        InfixOperationKind::Equal => Object::boolean(left == right),
        InfixOperationKind::NotEqual => Object::boolean(left != right),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::environment::Environment;
    use crate::object::{EvaluationError, Object};
    use monkey_lang_core::parser::parse;
    use pretty_assertions::assert_eq;

    fn eval(input: &str) -> Result<Rc<Object>, EvaluationError> {
        let program = parse(input).unwrap();
        super::eval_program(&program, &mut Environment::new())
    }

    fn test_evaluation(inputs: Vec<(&str, Result<Rc<Object>, EvaluationError>)>) {
        for (input, output) in inputs {
            assert_eq!(eval(input), output, "input: {}", input);
        }
    }

    fn test_errors(inputs: Vec<(&str, &str)>) {
        for (input, message) in inputs {
            let error = eval(input).expect_err(input);
            assert_eq!(error.to_string(), message, "input: {}", input);
        }
    }

    #[test]
    fn test_literal() {
        let inputs = vec![
            ("5;", Ok(Object::integer(5))),
            ("true;", Ok(Object::boolean(true))),
            ("false;", Ok(Object::boolean(false))),
            ("\"hello\";", Ok(Object::string("hello".to_owned()))),
            ("", Ok(Object::null())),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_prefix_operations() {
        let inputs = vec![
            ("--5;", Ok(Object::integer(5))),
            ("-10;", Ok(Object::integer(-10))),
            ("!false;", Ok(Object::boolean(true))),
            ("!!true;", Ok(Object::boolean(true))),
            ("!5", Ok(Object::boolean(false))),
            ("!0", Ok(Object::boolean(false))),
            ("!!5", Ok(Object::boolean(true))),
            ("!\"\"", Ok(Object::boolean(false))),
            ("!if (false) { 1 }", Ok(Object::boolean(true))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_integer_arithmetic() {
        let inputs = vec![
            ("1 + 2 * 3", Ok(Object::integer(7))),
            ("(1 + 2) * 3", Ok(Object::integer(9))),
            ("2 - 1 - 1", Ok(Object::integer(0))),
            ("5 + 5 + 5 + 5 - 10", Ok(Object::integer(10))),
            ("-50 + 100 + -50", Ok(Object::integer(0))),
            ("20 + 2 * -10", Ok(Object::integer(0))),
            ("50 / 2 * 2 + 10", Ok(Object::integer(60))),
            ("3 * (3 * 3) + 10", Ok(Object::integer(37))),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", Ok(Object::integer(50))),
            ("7 / 2", Ok(Object::integer(3))),
            ("-7 / 2", Ok(Object::integer(-3))),
            (
                "9223372036854775807 + 1",
                Ok(Object::integer(i64::MIN)),
            ),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_comparisons() {
        let inputs = vec![
            ("1 < 2", Ok(Object::boolean(true))),
            ("1 > 2", Ok(Object::boolean(false))),
            ("1 == 1", Ok(Object::boolean(true))),
            ("1 != 1", Ok(Object::boolean(false))),
            ("true == true", Ok(Object::boolean(true))),
            ("true != false", Ok(Object::boolean(true))),
            ("(1 < 2) == true", Ok(Object::boolean(true))),
            ("(1 > 2) == true", Ok(Object::boolean(false))),
            ("\"ab\" == \"ab\"", Ok(Object::boolean(true))),
            ("\"ab\" != \"ab\"", Ok(Object::boolean(false))),
            ("1 == true", Ok(Object::boolean(false))),
            ("1 != true", Ok(Object::boolean(true))),
            ("\"1\" == 1", Ok(Object::boolean(false))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_identity_equality() {
        let inputs = vec![
            ("fn(x) { x } == fn(x) { x }", Ok(Object::boolean(false))),
            ("let f = fn(x) { x }; f == f", Ok(Object::boolean(true))),
            (
                "let a = if (false) { 1 }; let b = if (false) { 2 }; a == b",
                Ok(Object::boolean(true)),
            ),
            ("len == len", Ok(Object::boolean(true))),
            ("let f = len; f == len", Ok(Object::boolean(true))),
            ("len != puts", Ok(Object::boolean(true))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_strings() {
        let inputs = vec![
            (
                "\"Hello\" + \" \" + \"World!\"",
                Ok(Object::string("Hello World!".to_owned())),
            ),
            ("len(\"four\")", Ok(Object::integer(4))),
            ("to_string(1 + 2)", Ok(Object::string("3".to_owned()))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_if_expressions() {
        let inputs = vec![
            ("if (true) { 10 }", Ok(Object::integer(10))),
            ("if (false) { 10 }", Ok(Object::null())),
            ("if (1) { 10 }", Ok(Object::integer(10))),
            ("if (0) { 10 }", Ok(Object::integer(10))),
            ("if (1 < 2) { 10 }", Ok(Object::integer(10))),
            ("if (1 > 2) { 10 } else { 20 }", Ok(Object::integer(20))),
            ("if (1 < 2) { 10 } else { 20 }", Ok(Object::integer(10))),
            ("if (1 < 2) { }", Ok(Object::null())),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_return_statements() {
        let inputs = vec![
            ("return 10;", Ok(Object::integer(10))),
            ("return 10; 9;", Ok(Object::integer(10))),
            ("return 2 * 5; 9;", Ok(Object::integer(10))),
            ("9; return 2 * 5; 9;", Ok(Object::integer(10))),
            (
                "if (10 > 1) { if (10 > 1) { return 10; } return 1; }",
                Ok(Object::integer(10)),
            ),
            (
                "let f = fn(x) { if (x > 0) { return 1; } return 2; }; f(5)",
                Ok(Object::integer(1)),
            ),
            (
                "let f = fn(x) { if (x > 0) { return 1; } return 2; }; f(-1)",
                Ok(Object::integer(2)),
            ),
            (
                // The inner return only leaves the inner function
                "let f = fn() { let g = fn() { return 1; }; g(); 2 }; f()",
                Ok(Object::integer(2)),
            ),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_let_statements() {
        let inputs = vec![
            ("let a = 5; a;", Ok(Object::integer(5))),
            ("let a = 5 * 5; a;", Ok(Object::integer(25))),
            ("let a = 5; let b = a; b;", Ok(Object::integer(5))),
            (
                "let a = 5; let b = a; let c = a + b + 5; c;",
                Ok(Object::integer(15)),
            ),
            ("let a = 1; let a = a + 1; a", Ok(Object::integer(2))),
            // Bindings hide builtins of the same name
            ("let len = 5; len", Ok(Object::integer(5))),
            ("let f = fn(len) { len }; f(3)", Ok(Object::integer(3))),
            ("let puts = fn(x) { x * 2 }; puts(4)", Ok(Object::integer(8))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_error_handling() {
        let inputs = vec![
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("let a = 5 + true; a;", "type mismatch: INTEGER + BOOLEAN"),
            ("\"a\" < 1", "type mismatch: STRING < INTEGER"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("-\"a\"", "unknown operator: -STRING"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("true < false;", "unknown operator: BOOLEAN < BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            ("if (10 > 1) { true + false; }", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("\"Hello\" - \"World\"", "unknown operator: STRING - STRING"),
            ("foobar", "identifier not found: foobar"),
            ("5(1)", "not a function: INTEGER"),
            ("true()", "not a function: BOOLEAN"),
            ("1 / 0", "division by zero: 1 / 0"),
            ("len(1)", "argument to `len` not supported, got INTEGER"),
            ("len(\"a\", \"b\")", "wrong number of arguments. got=2, want=1"),
        ];

        test_errors(inputs);
    }

    #[test]
    fn test_errors_short_circuit() {
        let inputs = vec![
            // The right operand would fail differently if it were evaluated
            ("missing + undefined", "identifier not found: missing"),
            ("f(missing, undefined)", "identifier not found: f"),
            (
                "let f = fn(a, b) { a }; f(missing, undefined)",
                "identifier not found: missing",
            ),
            ("-(1 + true)", "type mismatch: INTEGER + BOOLEAN"),
            ("if (1 + true) { undefined }", "type mismatch: INTEGER + BOOLEAN"),
            (
                "let f = fn() { 1 + true; undefined }; f()",
                "type mismatch: INTEGER + BOOLEAN",
            ),
        ];

        test_errors(inputs);
    }

    #[test]
    fn test_function_application() {
        let inputs = vec![
            (
                "let identity = fn(x) { x }; identity(5)",
                Ok(Object::integer(5)),
            ),
            (
                "let identity = fn(x) { return x; }; identity(5)",
                Ok(Object::integer(5)),
            ),
            (
                "let double = fn(x) { x * 2 }; double(5)",
                Ok(Object::integer(10)),
            ),
            (
                "let add = fn(x, y) { x + y }; add(5, 5)",
                Ok(Object::integer(10)),
            ),
            (
                "let add = fn(x, y) { x + y }; add(5 + 5, add(5, 5))",
                Ok(Object::integer(20)),
            ),
            ("fn(x) { x }(5)", Ok(Object::integer(5))),
            ("fn() { }()", Ok(Object::null())),
            (
                "
                let factorial = fn(n) {
                    if (n < 2) { 1 }
                    else { factorial(n - 1) * n }
                };
                factorial(5)",
                Ok(Object::integer(120)),
            ),
            (
                "
                let func = fn(a) {
                    fn(b) {
                        a + b
                    }
                };
                func(5)(10)",
                Ok(Object::integer(15)),
            ),
            (
                "let apply = fn(f, x) { f(x) }; apply(fn(n) { n * n }, 4)",
                Ok(Object::integer(16)),
            ),
            ("let f = fn(a) { a }; f(1, 2)", Ok(Object::integer(1))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_lexical_scoping() {
        let inputs = vec![
            (
                // `x` resolves where `f` was defined, not where it is called
                "let x = 1; let f = fn() { x }; let g = fn(x) { f() }; g(100)",
                Ok(Object::integer(1)),
            ),
            (
                // A `let` inside a call does not touch the caller's binding
                "let x = 1; let f = fn() { let x = 2; x }; f(); x",
                Ok(Object::integer(1)),
            ),
        ];

        test_evaluation(inputs);
        test_errors(vec![(
            "let f = fn(a, b) { b }; f(1)",
            "identifier not found: b",
        )]);
    }

    #[test]
    fn test_closure() {
        let inputs = vec![
            (
                r#"
            let fa = fn() {
                let x = 5;
                let fb = fn() {
                    x
                };
                fb
            };
            let temp = fa();
            temp()"#,
                Ok(Object::integer(5)),
            ),
            (
                r#"
            let fa = fn() {
                let x = 5;
                let fb = fn() {
                    fn() { x }
                };
                fb
            };
            let temp = fa();
            let temp_ = temp();
            temp_()"#,
                Ok(Object::integer(5)),
            ),
            (
                r#"
            let fa = fn() {
                let is_even = fn(x) {
                    if (x == 0) {
                        true
                    } else {
                        is_odd(x-1)
                    }
                };
                let is_odd = fn(x) {
                    if (x == 0) {
                        false
                    } else {
                        is_even(x-1)
                    }
                };
                is_even
            };
            let temp = fa();
            temp(3);"#,
                Ok(Object::boolean(false)),
            ),
            (
                // Bindings made after the closure was created are visible to it
                r#"
            let make = fn() {
                let get = fn() { y };
                let y = 7;
                get
            };
            make()()"#,
                Ok(Object::integer(7)),
            ),
            (
                // Each call of the outer function gets its own scope
                r#"
            let adder = fn(n) { fn(x) { x + n } };
            let add_one = adder(1);
            let add_ten = adder(10);
            add_one(5) * 100 + add_ten(5)"#,
                Ok(Object::integer(615)),
            ),
        ];

        test_evaluation(inputs)
    }

    #[test]
    fn test_environment_persists_between_programs() {
        let mut env = Environment::new();
        let first = parse("let a = 2; let double = fn(x) { x * a };").unwrap();
        let second = parse("double(21)").unwrap();

        super::eval_program(&first, &mut env).unwrap();
        assert_eq!(
            super::eval_program(&second, &mut env),
            Ok(Object::integer(42))
        );
    }

    #[test]
    fn test_call_scope_is_released() {
        let input = r#"
        let fa = fn() {
            let x = 5;
            fn() { x }
        };
        let closure = fa();
        fa();"#;
        let program = parse(input).unwrap();
        let mut env = Environment::new();
        super::eval_program(&program, &mut env).unwrap();

        let closure = env.get("closure").unwrap();
        match closure.as_ref() {
            Object::Function(function) => {
                // Held by the closure and nothing else
                assert_eq!(Rc::strong_count(&function.environment.environment), 1);
                assert_eq!(function.environment.get("x"), Some(Object::integer(5)));
            }
            _ => panic!("The output should be a function"),
        }
    }
}
