//! An AST evaluator for the Monkey programming language from
//! <https://interpreterbook.com/>.

use crate::ast;
use crate::object::{self, Environment, HashKey, Object, ObjectType};
use crate::token::Token;

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::rc::Rc;
use std::result;

use log::{debug, trace};
use thiserror::Error;

/// Evaluates an `ast::Node` within `env` and produces an `object::Object`.
///
/// # Panics
///
/// Integer division by zero is not a Monkey error: it panics, as does
/// recursion deep enough to exhaust the stack.
pub fn eval(node: ast::Node, env: &Environment) -> Result<Object> {
    match node {
        ast::Node::Program(prog) => eval_program(&prog, env),
        ast::Node::Statement(stmt) => eval_statement(&stmt, env),
        ast::Node::Expression(expr) => eval_expression(&expr, env),
    }
}

/// Evaluates a program and returns the result.
fn eval_program(prog: &ast::Program, env: &Environment) -> Result<Object> {
    let mut result = Object::Null;

    for stmt in &prog.statements {
        result = eval_statement(stmt, env)?;

        // Handle early return statements if applicable, unwrapping the inner
        // value and terminating the program.
        if let Object::ReturnValue(value) = result {
            return Ok(*value);
        }
    }

    Ok(result)
}

/// Evaluates a block statement and returns the result.
fn eval_block_statement(block: &ast::BlockStatement, env: &Environment) -> Result<Object> {
    let mut result = Object::Null;

    for stmt in &block.statements {
        result = eval_statement(stmt, env)?;

        // Handle early return statements if applicable, but do not unwrap the
        // inner value so that only this block statement terminates, and not
        // the entire program.
        if let Object::ReturnValue(_) = result {
            return Ok(result);
        }
    }

    Ok(result)
}

fn eval_statement(stmt: &ast::Statement, env: &Environment) -> Result<Object> {
    trace!("evaluating statement: {}", stmt);

    match stmt {
        ast::Statement::Block(block) => eval_block_statement(block, env),
        ast::Statement::Expression(expr) => eval_expression(expr, env),
        ast::Statement::Let(stmt) => {
            let obj = eval_expression(&stmt.value, env)?;

            // eval succeeded; capture this binding in our environment.
            env.set(&stmt.name, obj);
            Ok(Object::Null)
        }
        ast::Statement::Return(ret) => Ok(Object::ReturnValue(Box::new(eval_expression(
            &ret.value, env,
        )?))),
    }
}

fn eval_expression(expr: &ast::Expression, env: &Environment) -> Result<Object> {
    match expr {
        ast::Expression::Identifier(id) => eval_identifier(id, env),
        ast::Expression::Integer(i) => Ok(Object::Integer(*i)),
        ast::Expression::String(s) => Ok(Object::String(s.clone())),
        ast::Expression::Boolean(b) => Ok(Object::Boolean(*b)),
        ast::Expression::Array(a) => Ok(Object::Array(Rc::new(object::Array {
            elements: eval_expressions(&a.elements, env)?,
        }))),
        ast::Expression::Hash(h) => eval_hash_literal(h, env),
        ast::Expression::Prefix(p) => {
            // Evaluate the right side before applying the prefix operator.
            let right = eval_expression(&p.right, env)?;
            eval_prefix_expression(&p.operator, right)
        }
        ast::Expression::Infix(i) => {
            let left = eval_expression(&i.left, env)?;
            let right = eval_expression(&i.right, env)?;
            eval_infix_expression(&i.operator, left, right)
        }
        ast::Expression::If(stmt) => eval_if_expression(stmt, env),
        ast::Expression::Function(func) => Ok(Object::Function(Rc::new(object::Function {
            parameters: func.parameters.clone(),
            body: func.body.clone(),
            env: env.clone(),
        }))),
        ast::Expression::Call(call) => {
            let function = eval_expression(&call.function, env)?;
            let args = eval_expressions(&call.arguments, env)?;

            apply_function(function, &args)
        }
        ast::Expression::Index(i) => {
            let left = eval_expression(&i.left, env)?;
            let index = eval_expression(&i.index, env)?;

            eval_index_expression(left, index)
        }
    }
}

/// Evaluates an object bound to an identifier and returns the result.
fn eval_identifier(id: &str, env: &Environment) -> Result<Object> {
    if let Some(obj) = env.get(id) {
        return Ok(obj);
    }

    // Didn't find a user-defined identifier, look for built-ins.
    object::Builtin::lookup(id)
        .map(Object::Builtin)
        .ok_or_else(|| Error::UnboundIdentifier(id.to_string()))
}

/// Evaluates several expressions from left to right and produces objects for
/// each of them.
fn eval_expressions(expressions: &[ast::Expression], env: &Environment) -> Result<Vec<Object>> {
    let mut results = Vec::with_capacity(expressions.len());

    for expr in expressions {
        results.push(eval_expression(expr, env)?);
    }

    Ok(results)
}

/// Evaluates a hash literal, with later duplicate keys overwriting earlier
/// ones.
fn eval_hash_literal(hash: &ast::HashLiteral, env: &Environment) -> Result<Object> {
    let mut pairs = BTreeMap::new();

    for (k, v) in &hash.pairs {
        let key = eval_expression(k, env)?;
        let hash_key = HashKey::try_from(&key)?;
        let value = eval_expression(v, env)?;

        pairs.insert(hash_key, object::HashPair { key, value });
    }

    Ok(Object::Hash(Rc::new(object::Hash { pairs })))
}

/// Evaluates a prefix expression to produce an Object.
fn eval_prefix_expression(operator: &Token, right: Object) -> Result<Object> {
    match (operator, right) {
        // Logical negation.
        (Token::Bang, right) => Ok(Object::Boolean(!right.is_truthy())),
        // Negative numbers.
        (Token::Minus, Object::Integer(i)) => Ok(Object::Integer(i.wrapping_neg())),

        (op, right) => Err(Error::BadPrefixOperator {
            op: op.clone(),
            right: right.kind(),
        }),
    }
}

/// Evaluates an infix expression to produce an Object.
fn eval_infix_expression(operator: &Token, left: Object, right: Object) -> Result<Object> {
    // Left and right types must match.
    if left.kind() != right.kind() {
        return Err(Error::TypeMismatch {
            left: left.kind(),
            op: operator.clone(),
            right: right.kind(),
        });
    }

    let bad_operator = || Error::BadInfixOperator {
        left: left.kind(),
        op: operator.clone(),
        right: right.kind(),
    };

    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r).ok_or_else(bad_operator)
        }

        (Object::String(l), Object::String(r)) => match operator {
            Token::Plus => Ok(Object::String(format!("{}{}", l, r))),

            _ => Err(bad_operator()),
        },

        _ => match operator {
            Token::Equal => Ok(Object::Boolean(left.is_identical(&right))),
            Token::NotEqual => Ok(Object::Boolean(!left.is_identical(&right))),

            _ => Err(bad_operator()),
        },
    }
}

// Evaluates `l (op) r` for integers, or returns `None` if `op` does not apply
// to integers.
fn eval_integer_infix_expression(op: &Token, l: i64, r: i64) -> Option<Object> {
    let out = match op {
        Token::Plus => Object::Integer(l.wrapping_add(r)),
        Token::Minus => Object::Integer(l.wrapping_sub(r)),
        Token::Asterisk => Object::Integer(l.wrapping_mul(r)),
        Token::Slash => Object::Integer(l.wrapping_div(r)),
        Token::LessThan => Object::Boolean(l < r),
        Token::GreaterThan => Object::Boolean(l > r),
        Token::Equal => Object::Boolean(l == r),
        Token::NotEqual => Object::Boolean(l != r),

        _ => return None,
    };

    Some(out)
}

/// Evaluates an if/else expression to produce an Object.
fn eval_if_expression(expr: &ast::IfExpression, env: &Environment) -> Result<Object> {
    let condition = eval_expression(&expr.condition, env)?;

    if condition.is_truthy() {
        eval_block_statement(&expr.consequence, env)
    } else if let Some(alt) = &expr.alternative {
        eval_block_statement(alt, env)
    } else {
        Ok(Object::Null)
    }
}

/// Evaluates an index operation on an array or hash.
fn eval_index_expression(left: Object, index: Object) -> Result<Object> {
    match (&left, &index) {
        // Array with numeric index. Out of bounds indices produce null.
        (Object::Array(a), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| a.elements.get(i))
            .cloned()
            .unwrap_or(Object::Null)),

        // Hash with some type of index. Missing keys produce null.
        (Object::Hash(h), k) => match HashKey::try_from(k) {
            Ok(key) => Ok(h.get(&key).cloned().unwrap_or(Object::Null)),
            Err(_) => Err(Error::BadIndexOperator {
                left: left.kind(),
                index: index.kind(),
            }),
        },

        // Unhandled combination.
        _ => Err(Error::BadIndexOperator {
            left: left.kind(),
            index: index.kind(),
        }),
    }
}

/// Applies a function with arguments to produce a result object.
fn apply_function(function: Object, args: &[Object]) -> Result<Object> {
    let function = match function {
        Object::Function(f) => f,
        // Built-ins use their own execution logic.
        Object::Builtin(b) => return Ok(b.apply(args)?),
        other => return Err(Error::NotAFunction(other.kind())),
    };

    debug!(
        "applying fn ({}) to {} argument(s)",
        function.parameters.join(", "),
        args.len()
    );

    // Bind function arguments in an enclosed environment.
    let extended_env = extend_function_env(&function, args)?;
    let evaluated = eval_block_statement(&function.body, &extended_env)?;

    // If the function had an early return, stop evaluation.
    if let Object::ReturnValue(ret) = evaluated {
        Ok(*ret)
    } else {
        Ok(evaluated)
    }
}

// Extends a function's environment to bind its arguments. Surplus arguments
// are evaluated but never bound.
fn extend_function_env(func: &object::Function, args: &[Object]) -> Result<Environment> {
    if args.len() < func.parameters.len() {
        return Err(Error::WrongNumberArguments {
            want: func.parameters.len(),
            got: args.len(),
        });
    }

    let env = Environment::new_enclosed(&func.env);

    for (param, arg) in func.parameters.iter().zip(args) {
        env.set(param, arg.clone());
    }

    Ok(env)
}

/// A Result type specialized use with for an Error.
pub type Result<T> = result::Result<T, Error>;

/// Specifies the different classes of errors which may occur.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("type mismatch: {left} {op} {right}")]
    TypeMismatch {
        left: ObjectType,
        op: Token,
        right: ObjectType,
    },
    #[error("bad operator: {op}{right}")]
    BadPrefixOperator { op: Token, right: ObjectType },
    #[error("bad operation: {left} {op} {right}")]
    BadInfixOperator {
        left: ObjectType,
        op: Token,
        right: ObjectType,
    },
    #[error("unbound identifier: {0}")]
    UnboundIdentifier(String),
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    #[error("index operator not supported: {left}[{index}]")]
    BadIndexOperator { left: ObjectType, index: ObjectType },
    #[error("function expects {want} argument(s), but got {got}")]
    WrongNumberArguments { want: usize, got: usize },
    #[error(transparent)]
    Object(#[from] object::Error),
}
