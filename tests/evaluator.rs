extern crate monkey_lang;

use monkey_lang::object::{self, Builtin, ObjectType};
use monkey_lang::token::Token;
use monkey_lang::{ast, evaluator, lexer, parser};

use std::convert::TryFrom;
use std::rc::Rc;

#[test]
fn evaluate_integer_expression() {
    let tests = vec![
        ("5", 5),
        ("10", 10),
        ("-5", -5),
        ("-10", -10),
        ("5 + 5 + 5 + 5 - 10", 10),
        ("2 * 2 * 2 *2 * 2", 32),
        ("-50 + 100 + -50", 0),
        ("5 + 2 * 10", 25),
        ("50 / 2 * 2 + 10", 60),
        ("2 * (5 + 10)", 30),
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
        ("7 / 2", 3),
        ("-7 / 2", -3),
        // Two's complement wraparound.
        ("9223372036854775807 + 1", i64::min_value()),
        ("-9223372036854775807 - 2", i64::max_value()),
    ];

    for (input, want) in tests {
        let got = if let object::Object::Integer(int) = eval(input) {
            int
        } else {
            panic!("not an integer object");
        };

        assert_eq!(want, got, "input: {}", input);
    }
}

#[test]
fn evaluate_boolean_expression() {
    let tests = vec![
        ("true", true),
        ("false", false),
        ("1 < 2", true),
        ("1 > 2", false),
        ("1 == 1", true),
        ("1 != 1", false),
        ("true == true", true),
        ("false == false", true),
        ("true == false", false),
        ("true != false", true),
        ("false != true", true),
        ("(1 == 1) == true", true),
        ("(1 != 2) == true", true),
        ("(1 < 2) == true", true),
        ("(1 < 2) == false", false),
        ("(1 > 2) == true", false),
        ("(1 > 2) == false", true),
        ("if (false) { 1 } == if (false) { 2 }", true),
        ("len == len", true),
        ("len == puts", false),
        ("let f = fn() { 1 }; f == f", true),
        ("fn() { 1 } == fn() { 1 }", false),
        ("[1] == [1]", false),
        ("[1] != [1]", true),
        ("let a = [1]; a == a", true),
        ("let a = [1]; let b = a; a != b", false),
        ("let h = {1: 2}; h == h", true),
        ("{1: 2} == {1: 2}", false),
        ("let a = [1]; a == push(a, 2)", false),
    ];

    for (input, want) in tests {
        let got = if let object::Object::Boolean(b) = eval(input) {
            b
        } else {
            panic!("not a boolean object");
        };

        assert_eq!(want, got, "input: {}", input);
    }
}

#[test]
fn evaluate_prefix_expression() {
    let tests = vec![
        ("!true", false),
        ("!false", true),
        ("!5", false),
        ("!0", false),
        ("!!true", true),
        ("!!false", false),
        ("!!5", true),
        (r#"!!"""#, true),
        ("!if (false) { 1 }", true),
    ];

    for (input, want) in tests {
        let got = if let object::Object::Boolean(b) = eval(input) {
            b
        } else {
            panic!("not a boolean object");
        };

        assert_eq!(want, got, "input: {}", input);
    }
}

#[test]
fn evaluate_if_expression() {
    let ten = object::Object::Integer(10);
    let twenty = object::Object::Integer(20);
    let null = object::Object::Null;

    let tests = vec![
        ("if (true) { 10 }", &ten),
        ("if (false) { 10 }", &null),
        ("if (1) { 10 }", &ten),
        ("if (0) { 10 }", &ten),
        ("if (1 < 2) { 10 }", &ten),
        ("if (1 > 2) { 10 }", &null),
        ("if (1 < 2) { 10 } else { 20 }", &ten),
        ("if (1 > 2) { 10 } else { 20 }", &twenty),
        ("if (if (false) { 1 }) { 10 } else { 20 }", &twenty),
    ];

    for (input, want) in tests {
        assert_eq!(want, &eval(input), "input: {}", input);
    }
}

#[test]
fn evaluate_return_statement() {
    let tests = vec![
        "return 10;",
        "return 10; 9;",
        "return 2 * 5; 9",
        "9; return 2 * 5; 9;",
        "if (10 > 1) { if (10 > 1) { return 10; } return 1; }",
        "if (10 > 1) {
            if (10 > 1) {
                return 10;
            }

            return 1;
        }",
        "let f = fn(x) { if (x) { return 10; } 1 }; f(true)",
        // Returns only unwind to the enclosing function.
        "let f = fn() { return 5; }; f() + 5",
    ];

    for input in tests {
        let got = if let object::Object::Integer(int) = eval(input) {
            int
        } else {
            panic!("not an integer object");
        };

        assert_eq!(10, got, "input: {}", input);
    }
}

#[test]
fn evaluate_let_statement() {
    let tests = vec![
        ("let a = 5; a;", 5),
        ("let a = 5 * 5; a;", 25),
        ("let a = 5; let b = a; b;", 5),
        ("let a = 5; let b = a; let c = a + b + 5; c", 15),
        ("let a = 1; let a = a + 1; a", 2),
    ];

    for (input, want) in tests {
        let got = if let object::Object::Integer(int) = eval(input) {
            int
        } else {
            panic!("not an integer object");
        };

        assert_eq!(want, got);
    }

    // A let statement has no value of its own.
    assert_eq!(object::Object::Null, eval("let a = 5;"));
}

#[test]
fn evaluate_let_statement_unknown_identifier() {
    let input = "foobar";

    let err = eval_result(input).expect_err("expected an error but none was found");

    if let evaluator::Error::UnboundIdentifier(id) = err {
        assert_eq!(input, id);
    } else {
        panic!("not an unbound identifier error");
    }
}

#[test]
fn evaluate_errors() {
    let tests = vec![
        (
            "5 + true;",
            evaluator::Error::TypeMismatch {
                left: ObjectType::Integer,
                op: Token::Plus,
                right: ObjectType::Boolean,
            },
        ),
        (
            "5 + true; 5;",
            evaluator::Error::TypeMismatch {
                left: ObjectType::Integer,
                op: Token::Plus,
                right: ObjectType::Boolean,
            },
        ),
        (
            r#"1 == "1""#,
            evaluator::Error::TypeMismatch {
                left: ObjectType::Integer,
                op: Token::Equal,
                right: ObjectType::String,
            },
        ),
        (
            "-true",
            evaluator::Error::BadPrefixOperator {
                op: Token::Minus,
                right: ObjectType::Boolean,
            },
        ),
        (
            r#"-"a""#,
            evaluator::Error::BadPrefixOperator {
                op: Token::Minus,
                right: ObjectType::String,
            },
        ),
        (
            "true + false;",
            evaluator::Error::BadInfixOperator {
                left: ObjectType::Boolean,
                op: Token::Plus,
                right: ObjectType::Boolean,
            },
        ),
        (
            "5; true + false; 4;",
            evaluator::Error::BadInfixOperator {
                left: ObjectType::Boolean,
                op: Token::Plus,
                right: ObjectType::Boolean,
            },
        ),
        (
            "if (10 > 1) { true + false; }",
            evaluator::Error::BadInfixOperator {
                left: ObjectType::Boolean,
                op: Token::Plus,
                right: ObjectType::Boolean,
            },
        ),
        (
            "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
            evaluator::Error::BadInfixOperator {
                left: ObjectType::Boolean,
                op: Token::Plus,
                right: ObjectType::Boolean,
            },
        ),
        (
            r#""hi" - "ho""#,
            evaluator::Error::BadInfixOperator {
                left: ObjectType::String,
                op: Token::Minus,
                right: ObjectType::String,
            },
        ),
        (
            r#""a" == "a""#,
            evaluator::Error::BadInfixOperator {
                left: ObjectType::String,
                op: Token::Equal,
                right: ObjectType::String,
            },
        ),
        (
            "true < false",
            evaluator::Error::BadInfixOperator {
                left: ObjectType::Boolean,
                op: Token::LessThan,
                right: ObjectType::Boolean,
            },
        ),
        (
            "foobar",
            evaluator::Error::UnboundIdentifier("foobar".to_string()),
        ),
        (
            "let f = fn() { let inner = 1; }; f(); inner",
            evaluator::Error::UnboundIdentifier("inner".to_string()),
        ),
        ("5()", evaluator::Error::NotAFunction(ObjectType::Integer)),
        (
            r#""f"(1)"#,
            evaluator::Error::NotAFunction(ObjectType::String),
        ),
        (
            r#"{"name": "Monkey"}[fn(x) { x }];"#,
            evaluator::Error::BadIndexOperator {
                left: ObjectType::Hash,
                index: ObjectType::Function,
            },
        ),
        (
            "[1, 2][true]",
            evaluator::Error::BadIndexOperator {
                left: ObjectType::Array,
                index: ObjectType::Boolean,
            },
        ),
        (
            "5[0]",
            evaluator::Error::BadIndexOperator {
                left: ObjectType::Integer,
                index: ObjectType::Integer,
            },
        ),
        (
            "{[1]: 2}",
            evaluator::Error::Object(object::Error::BadHashKey(ObjectType::Array)),
        ),
        (
            "let add = fn(a, b) { a + b }; add(1)",
            evaluator::Error::WrongNumberArguments { want: 2, got: 1 },
        ),
        // The first error aborts evaluation of the arguments.
        (
            "puts(nope, 1 + true)",
            evaluator::Error::UnboundIdentifier("nope".to_string()),
        ),
    ];

    for (input, want) in tests {
        let err = eval_result(input).expect_err("expected an error but none was found");

        assert_eq!(want, err, "input: {}", input);
    }
}

#[test]
fn evaluate_error_messages() {
    let tests = vec![
        ("5 + true", "type mismatch: Integer + Boolean"),
        ("-true", "bad operator: -Boolean"),
        ("true + false", "bad operation: Boolean + Boolean"),
        ("foobar", "unbound identifier: foobar"),
        ("len(1)", "built-in len does not support argument of type Integer"),
        (
            r#"len("one", "two")"#,
            "built-in len expects 1 argument(s), but got 2",
        ),
        ("{fn() {}: 1}", "bad hash key: Function is not hashable"),
    ];

    for (input, want) in tests {
        let err = eval_result(input).expect_err("expected an error but none was found");

        assert_eq!(want, err.to_string());
    }
}

#[test]
fn evaluate_function_object() {
    let input = "fn(x) { x + 2 };";

    let got = if let object::Object::Function(func) = eval(input) {
        func
    } else {
        panic!("not a function object");
    };

    assert_eq!(1, got.parameters.len());
    assert_eq!("x", got.parameters[0]);

    assert_eq!("{(x + 2)}", format!("{}", got.body));
    assert_eq!("fn (x){(x + 2)}", got.to_string());
}

#[test]
fn evaluate_function_application() {
    let tests = vec![
        ("let identity = fn(x) { x; }; identity(5);", 5),
        ("let identity = fn(x) { return x; }; identity(5);", 5),
        ("let double = fn(x) { x * 2; }; double(5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
        ("let add = fn(a, b) { a + b; }; add(3 + 3, add(4, 4));", 14),
        ("fn(x) { x; }(5)", 5),
        // Surplus arguments are ignored.
        ("fn(x) { x; }(5, 6)", 5),
        // Parameters shadow outer bindings without overwriting them.
        ("let x = 1; let f = fn(x) { x }; f(2) * 10 + x", 21),
        // Bindings inside a call never leak into the caller's scope.
        ("let x = 1; let f = fn() { let x = 2; x }; f() * 10 + x", 21),
        // Recursion through the defining scope.
        (
            "let fact = fn(n) { if (n < 2) { 1 } else { n * fact(n - 1) } }; fact(5)",
            120,
        ),
        // Closures also work!
        (
            "
let newAdder = fn(x) {
    fn(y) { x + y };
};

let addTwo = newAdder(2);
addTwo(3);
",
            5,
        ),
        // Closures see later bindings in their defining scope.
        ("let f = fn() { later }; let later = 7; f()", 7),
        // And higher-order functions!
        (
            "
let add = fn(x, y) { x + y };
let apply = fn(func, x, y) { func(x, y) };
apply(add, 2, 2);
",
            4,
        ),
    ];

    for (input, want) in tests {
        let got = if let object::Object::Integer(int) = eval(input) {
            int
        } else {
            panic!("not an integer object");
        };

        assert_eq!(want, got, "input: {}", input);
    }
}

#[test]
fn evaluate_string_expressions() {
    let tests = vec![
        (r#""Hello World!""#, "Hello World!"),
        (r#""Concatenate" + " " + "Me" + "!""#, "Concatenate Me!"),
        (r#"let greet = fn(name) { "Hi " + name }; greet("Bob")"#, "Hi Bob"),
    ];

    for (input, want) in tests {
        let got = if let object::Object::String(s) = eval(input) {
            s
        } else {
            panic!("not a string object");
        };

        assert_eq!(want, got);
    }
}

#[test]
fn evaluate_builtin_functions() {
    let int = object::Object::Integer;
    let array = |elements: Vec<i64>| {
        object::Object::Array(Rc::new(object::Array {
            elements: elements.into_iter().map(object::Object::Integer).collect(),
        }))
    };

    let tests = vec![
        (r#"len("")"#, int(0)),
        (r#"len("four")"#, int(4)),
        (r#"len("hello world")"#, int(11)),
        ("len([])", int(0)),
        ("len([1, 2])", int(2)),
        ("first([8, 7, 6])", int(8)),
        ("first([])", object::Object::Null),
        ("last([8, 7, 6])", int(6)),
        ("last([])", object::Object::Null),
        ("rest([1, 2, 3, 4])", array(vec![2, 3, 4])),
        ("rest([1])", array(vec![])),
        ("rest([])", object::Object::Null),
        ("push([], 1)", array(vec![1])),
        ("push([8, 7, 6], 5)", array(vec![8, 7, 6, 5])),
        // Built-ins never modify their arguments.
        ("let a = [1]; let b = push(a, 2); len(a) * 10 + len(b)", int(12)),
        ("let a = [1, 2]; rest(a); len(a)", int(2)),
        (r#"puts("hello", 1)"#, object::Object::Null),
        ("puts()", object::Object::Null),
        // User bindings take priority over built-ins.
        ("let len = fn(x) { 42 }; len([])", int(42)),
    ];

    for (input, want) in tests {
        assert_eq!(want, eval(input), "input: {}", input);
    }
}

#[test]
fn evaluate_builtin_errors() {
    let bad_type = |builtin, got| {
        evaluator::Error::Object(object::Error::BadArgumentType { builtin, got })
    };
    let bad_count = |builtin, want, got| {
        evaluator::Error::Object(object::Error::BadArgumentCount { builtin, want, got })
    };

    let tests = vec![
        ("len(1)", bad_type(Builtin::Len, ObjectType::Integer)),
        (r#"len("one", "two")"#, bad_count(Builtin::Len, 1, 2)),
        ("len()", bad_count(Builtin::Len, 1, 0)),
        ("first(4)", bad_type(Builtin::First, ObjectType::Integer)),
        ("first([1, 2], [3, 4])", bad_count(Builtin::First, 1, 2)),
        ("last(4)", bad_type(Builtin::Last, ObjectType::Integer)),
        ("last([1, 2], [3, 4])", bad_count(Builtin::Last, 1, 2)),
        (r#"rest("abc")"#, bad_type(Builtin::Rest, ObjectType::String)),
        ("push(4, 4)", bad_type(Builtin::Push, ObjectType::Integer)),
        ("push([1, 2])", bad_count(Builtin::Push, 2, 1)),
    ];

    for (input, want) in tests {
        let err = eval_result(input).expect_err("expected an error but none was found");

        assert_eq!(want, err, "input: {}", input);
    }
}

#[test]
fn evaluate_array_literal() {
    let got = if let object::Object::Array(a) = eval("[1, 2 * 2, 3 + 3]") {
        a
    } else {
        panic!("not an array object");
    };

    assert_eq!(
        vec![
            object::Object::Integer(1),
            object::Object::Integer(4),
            object::Object::Integer(6)
        ],
        got.elements
    );
}

#[test]
fn evaluate_array_index_expression() {
    let null = object::Object::Null;
    let int = object::Object::Integer;

    let tests = vec![
        ("[1, 2, 3][0]", int(1)),
        ("[1, 2, 3][1]", int(2)),
        ("[1, 2, 3][2]", int(3)),
        ("let i = 0; [1][i];", int(1)),
        ("[1, 2, 3][1 + 1];", int(3)),
        ("let myArray = [1, 2, 3]; myArray[2];", int(3)),
        (
            "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
            int(6),
        ),
        ("let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]", int(2)),
        ("[1, 2, 3][3]", null.clone()),
        ("[1, 2, 3][-1]", null.clone()),
        ("[][0]", null),
    ];

    for (input, want) in tests {
        assert_eq!(want, eval(input), "input: {}", input);
    }
}

#[test]
fn evaluate_hash_literal() {
    let input = r#"
let two = "two";
{
    "one": 10 - 9,
    two: 1 + 1,
    "thr" + "ee": 6 / 2,
    4: 4,
    true: 5,
    false: 6
}
"#;

    let got = if let object::Object::Hash(h) = eval(input) {
        h
    } else {
        panic!("not a hash object");
    };

    let tests = vec![
        (object::Object::String("one".to_string()), 1),
        (object::Object::String("two".to_string()), 2),
        (object::Object::String("three".to_string()), 3),
        (object::Object::Integer(4), 4),
        (object::Object::Boolean(true), 5),
        (object::Object::Boolean(false), 6),
    ];

    assert_eq!(tests.len(), got.pairs.len());

    for (key, want) in tests {
        let hash_key = object::HashKey::try_from(&key).expect("unhashable key");
        let pair = got.pairs.get(&hash_key).expect("missing key");

        assert_eq!(key, pair.key);
        assert_eq!(object::Object::Integer(want), pair.value);
    }
}

#[test]
fn evaluate_hash_index_expression() {
    let null = object::Object::Null;
    let int = object::Object::Integer;

    let tests = vec![
        (r#"{"foo": 5}["foo"]"#, int(5)),
        (r#"{"foo": 5}["bar"]"#, null.clone()),
        (r#"let key = "foo"; {"foo": 5}[key]"#, int(5)),
        (r#"{}["foo"]"#, null),
        ("{5: 5}[5]", int(5)),
        ("{true: 5}[true]", int(5)),
        ("{false: 5}[false]", int(5)),
        // Later duplicate keys win.
        (r#"{"a": 1, "a": 2}["a"]"#, int(2)),
    ];

    for (input, want) in tests {
        assert_eq!(want, eval(input), "input: {}", input);
    }
}

#[test]
fn evaluate_display() {
    let tests = vec![
        (r#""hi""#, r#""hi""#),
        ("[1, [2, true]]", "[1, [2, true]]"),
        (r#"{2: "b", 1: "a"}"#, r#"{1: "a", 2: "b"}"#),
        ("if (false) { 1 }", "null"),
        ("len", "builtin function"),
        ("fn(a, b) { a * b }", "fn (a, b){(a * b)}"),
    ];

    for (input, want) in tests {
        assert_eq!(want, eval(input).to_string(), "input: {}", input);
    }
}

#[test]
fn evaluate_nodes() {
    let env = object::Environment::new();

    let expr = ast::Node::Expression(ast::Expression::Integer(3));
    assert_eq!(
        object::Object::Integer(3),
        evaluator::eval(expr, &env).expect("failed to evaluate expression")
    );

    // A bare return statement is not unwrapped outside of a program.
    let stmt = ast::Node::Statement(ast::Statement::Return(ast::ReturnStatement {
        value: ast::Expression::Boolean(true),
    }));
    assert_eq!(
        object::Object::ReturnValue(Box::new(object::Object::Boolean(true))),
        evaluator::eval(stmt, &env).expect("failed to evaluate statement")
    );
}

#[test]
fn evaluate_shared_environment() {
    let env = object::Environment::new();

    for (input, want) in vec![
        ("let counter = 1;", object::Object::Null),
        ("let inc = fn(x) { x + counter };", object::Object::Null),
        ("inc(41)", object::Object::Integer(42)),
        ("let counter = 2; inc(41)", object::Object::Integer(43)),
    ] {
        let prog = parser::Parser::new(lexer::Lexer::new(input))
            .parse()
            .expect("failed to parse program");

        let got = evaluator::eval(ast::Node::Program(prog), &env).expect("failed to evaluate");
        assert_eq!(want, got, "input: {}", input);
    }
}

#[test]
#[should_panic]
fn evaluate_division_by_zero_panics() {
    let _ = eval_result("1 / 0");
}

fn eval(input: &str) -> object::Object {
    eval_result(input).expect("failed to evaluate program")
}

fn eval_result(input: &str) -> evaluator::Result<object::Object> {
    let l = lexer::Lexer::new(input);

    let mut p = parser::Parser::new(l);

    let prog = p.parse().expect("failed to parse program");

    evaluator::eval(ast::Node::Program(prog), &object::Environment::new())
}
