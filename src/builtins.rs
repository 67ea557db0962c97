//! Builtin functions, registered into the global frame at startup.

use std::io::Write;
use std::rc::Rc;

use crate::error::{ErrorKind, LithError, Result};
use crate::eval::{self, expect_nargs};
use crate::interp::Interp;
use crate::number::Number;
use crate::value::{BuiltinFn, Value, ValueRef, list_iter};

/// The name/function table `Interp::new` installs.
pub const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("car", car),
    ("cdr", cdr),
    ("cons", cons),
    ("typeof", type_of),
    ("print", print),
    (":+", add),
    (":-", subtract),
    (":*", multiply),
    (":/", divide),
    (":%", modulus),
    (":<", less_than),
    (":==", num_equal),
    (":>", greater_than),
    ("eq?", is_eq),
    ("nil?", is_nil),
    ("apply", apply_list),
    ("error", raise_error),
    ("load", load),
];

fn arg_type(name: &str, index: usize, expected: &'static str, value: &ValueRef) -> LithError {
    LithError::new(ErrorKind::ArgType {
        expected,
        got: value.type_name(),
        index,
    })
    .with_name(name)
    .with_expr(value.clone())
}

fn as_pair(name: &str, index: usize, value: &ValueRef) -> Result<(ValueRef, ValueRef)> {
    match &**value {
        Value::Pair(car, cdr) => Ok((car.clone(), cdr.clone())),
        _ => Err(arg_type(name, index, "pair", value)),
    }
}

fn as_string(name: &str, index: usize, value: &ValueRef) -> Result<Vec<u8>> {
    match &**value {
        Value::Str(bytes) => Ok(bytes.clone()),
        _ => Err(arg_type(name, index, "string", value)),
    }
}

fn numeric(value: &ValueRef) -> Result<Number> {
    match &**value {
        Value::Integer(i) => Ok(Number::Int(*i)),
        Value::Number(n) => Ok(Number::Float(*n)),
        _ => Err(LithError::type_error(
            "expected numeric types (integers or numbers) as argument",
        )
        .with_expr(value.clone())),
    }
}

fn number_value(n: Number) -> ValueRef {
    match n {
        Number::Int(i) => Value::integer(i),
        Number::Float(f) => Value::number(f),
    }
}

/// Two-argument arithmetic: integral when both sides are, floating point
/// as soon as one side is.
fn arith(name: &str, args: &ValueRef, op: fn(Number, Number) -> Number) -> Result<ValueRef> {
    expect_nargs(name, 2, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    let lhs = numeric(&args[0])?;
    let rhs = numeric(&args[1])?;
    Ok(number_value(op(lhs, rhs)))
}

/// Two-argument numeric comparison after promotion.
fn rel(name: &str, args: &ValueRef, op: fn(&Number, &Number) -> bool) -> Result<ValueRef> {
    expect_nargs(name, 2, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    let lhs = numeric(&args[0])?;
    let rhs = numeric(&args[1])?;
    Ok(Value::boolean(op(&lhs, &rhs)))
}

/// `(car '(a . b))` -> `a`
fn car(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("car", 1, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    Ok(as_pair("car", 1, &args[0])?.0)
}

/// `(cdr '(a . b))` -> `b`
fn cdr(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("cdr", 1, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    Ok(as_pair("cdr", 1, &args[0])?.1)
}

/// `(cons a b)` -> `(a . b)`
fn cons(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("cons", 2, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    Ok(Value::cons(args[0].clone(), args[1].clone()))
}

/// `(typeof a)` -> symbol naming the tag
fn type_of(interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("typeof", 1, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    let sym = interp.intern(args[0].type_name());
    Ok(Value::symbol(sym))
}

/// `(print ...)` -> `()`, printing the values separated by a space with a
/// trailing newline. Strings go out as their raw bytes.
fn print(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("print", 1, args, false)?;
    let mut out = Vec::new();
    for (i, value) in list_iter(args).enumerate() {
        if i > 0 {
            out.push(b' ');
        }
        match &*value {
            Value::Str(bytes) => out.extend_from_slice(bytes),
            other => out.extend_from_slice(format!("{other}").as_bytes()),
        }
    }
    out.push(b'\n');
    std::io::stdout()
        .write_all(&out)
        .map_err(|e| LithError::custom(format!("could not write to stdout: {e}")))?;
    Ok(Value::nil())
}

fn add(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    arith(":+", args, |a, b| a + b)
}

fn subtract(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    arith(":-", args, |a, b| a - b)
}

fn multiply(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    arith(":*", args, |a, b| a * b)
}

fn divide(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs(":/", 2, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    let lhs = numeric(&args[0])?;
    let rhs = numeric(&args[1])?;
    if rhs.is_zero_int() {
        return Err(LithError::type_error("cannot divide by zero!!"));
    }
    Ok(number_value(lhs / rhs))
}

/// `(:% int int)` -> int
fn modulus(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs(":%", 2, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    let (Value::Integer(lhs), Value::Integer(rhs)) = (&*args[0], &*args[1]) else {
        return Err(LithError::type_error(
            "can calculate modulus with integral arguments only",
        ));
    };
    if *rhs == 0 {
        return Err(LithError::type_error("cannot mod by zero!!"));
    }
    Ok(Value::integer(lhs % rhs))
}

fn less_than(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    rel(":<", args, |a, b| a < b)
}

fn num_equal(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    rel(":==", args, |a, b| a == b)
}

fn greater_than(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    rel(":>", args, |a, b| a > b)
}

/// `eq?` equality: tags must match, numbers and strings compare by value,
/// everything structural compares by identity.
pub fn eq_values(a: &ValueRef, b: &ValueRef) -> bool {
    match (&**a, &**b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Pair(_, _), Value::Pair(_, _))
        | (Value::Builtin(_), Value::Builtin(_))
        | (Value::Closure(_), Value::Closure(_))
        | (Value::Macro(_), Value::Macro(_)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

fn is_eq(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("eq?", 2, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    Ok(Value::boolean(eq_values(&args[0], &args[1])))
}

fn is_nil(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("nil?", 1, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    Ok(Value::boolean(args[0].is_nil()))
}

/// `(apply f '(a b))` -> `(f a b)`
fn apply_list(interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("apply", 2, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    eval::apply(interp, &args[0], &args[1])
}

/// `(error "msg")` raises a custom error.
fn raise_error(_interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("error", 1, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    let bytes = as_string("error", 1, &args[0])?;
    Err(LithError::custom(String::from_utf8_lossy(&bytes).into_owned()))
}

/// `(load "path")` reads and evaluates the file in the global frame.
fn load(interp: &mut Interp, args: &ValueRef) -> Result<ValueRef> {
    expect_nargs("load", 1, args, true)?;
    let args: Vec<ValueRef> = list_iter(args).collect();
    let bytes = as_string("load", 1, &args[0])?;
    let path = String::from_utf8_lossy(&bytes).into_owned();
    let global = interp.global.clone();
    interp.run_file(&global, &path)?;
    Ok(Value::nil())
}
