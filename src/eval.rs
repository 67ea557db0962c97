//! The evaluator and the application machinery.

use std::rc::Rc;
use std::str::FromStr;

use crate::env::{Env, EnvRef};
use crate::error::{ErrorKind, LithError, Result};
use crate::interp::Interp;
use crate::symbol::{SpecialForm, Symbol};
use crate::value::{Closure, Value, ValueRef, list_iter, list_with_tail};

// Grow the native stack ahead of deep user recursion. See the `stacker`
// documentation for the red zone / chunk meaning.
const RED_ZONE: usize = 32 * 1024;
const STACK_CHUNK: usize = 1024 * 1024;

/// Check the argument count of `args` (a proper list) for callee `name`.
/// With `exact` the count must match; otherwise `expected` is a lower
/// bound, as for a variadic callee.
pub fn expect_nargs(name: &str, expected: usize, args: &ValueRef, exact: bool) -> Result<()> {
    let got = args.list_len();
    let bad = if exact { got != expected } else { got < expected };
    if bad {
        Err(LithError::new(ErrorKind::Arity {
            expected,
            got,
            exact,
        })
        .with_name(name)
        .with_expr(args.clone()))
    } else {
        Ok(())
    }
}

fn as_symbol(name: &str, index: usize, value: &ValueRef) -> Result<Symbol> {
    value.as_symbol().cloned().ok_or_else(|| {
        LithError::new(ErrorKind::ArgType {
            expected: "symbol",
            got: value.type_name(),
            index,
        })
        .with_name(name)
        .with_expr(value.clone())
    })
}

/// Evaluate `expr` in `env`. Symbols look themselves up, pairs are
/// special forms or applications, everything else evaluates to itself.
pub fn eval(interp: &mut Interp, env: &EnvRef, expr: &ValueRef) -> Result<ValueRef> {
    stacker::maybe_grow(RED_ZONE, STACK_CHUNK, || match &**expr {
        Value::Symbol(sym) => {
            Env::get(env, sym).ok_or_else(|| LithError::unbound(sym.name()))
        }
        Value::Pair(head, rest) => {
            if !expr.is_proper_list() {
                return Err(
                    LithError::syntax("atom or proper list expected as expression")
                        .with_expr(expr.clone()),
                );
            }
            if let Value::Symbol(sym) = &**head {
                if let Ok(form) = SpecialForm::from_str(sym.name()) {
                    return eval_form(interp, env, form, rest);
                }
            }
            eval_application(interp, env, head, rest)
        }
        _ => Ok(expr.clone()),
    })
}

/// Bind `sym` in the current frame; a frame defines each symbol once.
fn define(env: &EnvRef, sym: &Symbol, value: ValueRef) -> Result<ValueRef> {
    if env.borrow_mut().define(sym.clone(), value) {
        Ok(Value::nil())
    } else {
        Err(LithError::redefine(sym.name()))
    }
}

/// `define`/`set!` on a callable records the bound name for error
/// reports. The renamed value is a shallow copy, so other handles to the
/// same closure keep their name.
fn rename_callable(value: ValueRef, name: Symbol) -> ValueRef {
    match &*value {
        Value::Closure(c) => Rc::new(Value::Closure(c.named(name))),
        Value::Macro(c) => Rc::new(Value::Macro(c.named(name))),
        _ => value,
    }
}

/// A parameter spec is a proper or improper list of symbols, or one bare
/// symbol collecting every argument.
fn check_params(params: &ValueRef) -> Result<()> {
    let mut cur = params.clone();
    loop {
        let next = match &*cur {
            Value::Nil | Value::Symbol(_) => return Ok(()),
            Value::Pair(car, cdr) => {
                if car.as_symbol().is_none() {
                    return Err(LithError::syntax(
                        "arguments in lambda expression must be symbols",
                    )
                    .with_expr(params.clone()));
                }
                cdr.clone()
            }
            _ => {
                return Err(LithError::syntax(
                    "arguments in lambda expression must be symbols",
                )
                .with_expr(params.clone()));
            }
        };
        cur = next;
    }
}

/// Fixed parameter count, plus whether an improper tail collects the
/// remaining arguments.
fn param_spec(params: &ValueRef) -> (usize, bool) {
    let mut fixed = 0;
    let mut cur: &Value = params;
    while let Value::Pair(_, cdr) = cur {
        fixed += 1;
        cur = cdr;
    }
    (fixed, !cur.is_nil())
}

fn eval_form(
    interp: &mut Interp,
    env: &EnvRef,
    form: SpecialForm,
    rest: &ValueRef,
) -> Result<ValueRef> {
    match form {
        SpecialForm::Quote => {
            expect_nargs("quote", 1, rest, true)?;
            let args: Vec<ValueRef> = list_iter(rest).collect();
            Ok(args[0].clone())
        }
        SpecialForm::If => {
            expect_nargs("if", 3, rest, true)?;
            let args: Vec<ValueRef> = list_iter(rest).collect();
            let cond = eval(interp, env, &args[0])?;
            let branch = if cond.is_truthy() { &args[1] } else { &args[2] };
            eval(interp, env, branch)
        }
        SpecialForm::Define => {
            expect_nargs("define", 2, rest, false)?;
            let args: Vec<ValueRef> = list_iter(rest).collect();
            match &*args[0] {
                Value::Symbol(sym) => {
                    expect_nargs("define", 2, rest, true)?;
                    let value = eval(interp, env, &args[1])?;
                    let value = rename_callable(value, sym.clone());
                    define(env, sym, value)
                }
                Value::Pair(name, params) => {
                    let sym = as_symbol("define", 1, name)?;
                    check_params(params)?;
                    let body = list_with_tail(args[1..].to_vec(), Value::nil());
                    let closure = Closure {
                        name: Some(sym.clone()),
                        env: env.clone(),
                        params: params.clone(),
                        body,
                    };
                    define(env, &sym, Rc::new(Value::Closure(closure)))
                }
                _ => Err(
                    LithError::type_error("first argument must be a symbol or pair")
                        .with_name("define")
                        .with_expr(args[0].clone()),
                ),
            }
        }
        SpecialForm::Set => {
            expect_nargs("set!", 2, rest, true)?;
            let args: Vec<ValueRef> = list_iter(rest).collect();
            let sym = as_symbol("set!", 1, &args[0])?;
            let value = eval(interp, env, &args[1])?;
            let value = rename_callable(value, sym.clone());
            if Env::set(env, &sym, value) {
                Ok(Value::nil())
            } else {
                Err(LithError::unbound(sym.name()))
            }
        }
        SpecialForm::DefineMacro => {
            expect_nargs("define-macro", 2, rest, false)?;
            let args: Vec<ValueRef> = list_iter(rest).collect();
            let Value::Pair(name, params) = &*args[0] else {
                return Err(LithError::new(ErrorKind::ArgType {
                    expected: "pair",
                    got: args[0].type_name(),
                    index: 1,
                })
                .with_name("define-macro")
                .with_expr(args[0].clone()));
            };
            let sym = as_symbol("define-macro", 1, name)?;
            check_params(params)?;
            let body = list_with_tail(args[1..].to_vec(), Value::nil());
            let closure = Closure {
                name: Some(sym.clone()),
                env: env.clone(),
                params: params.clone(),
                body,
            };
            define(env, &sym, Rc::new(Value::Macro(closure)))
        }
        SpecialForm::Lambda => {
            expect_nargs("{lambda}", 2, rest, false)?;
            let args: Vec<ValueRef> = list_iter(rest).collect();
            let params = args[0].clone();
            check_params(&params)?;
            let body = list_with_tail(args[1..].to_vec(), Value::nil());
            Ok(Rc::new(Value::Closure(Closure {
                name: None,
                env: env.clone(),
                params,
                body,
            })))
        }
        SpecialForm::Eval => {
            expect_nargs("eval!", 1, rest, true)?;
            let args: Vec<ValueRef> = list_iter(rest).collect();
            let value = eval(interp, env, &args[0])?;
            eval(interp, env, &value)
        }
    }
}

fn eval_application(
    interp: &mut Interp,
    env: &EnvRef,
    head: &ValueRef,
    rest: &ValueRef,
) -> Result<ValueRef> {
    let f = eval(interp, env, head)?;
    if matches!(&*f, Value::Macro(_)) {
        // The macro sees its argument forms as data; what it returns is
        // code for the caller's environment.
        let expansion = apply(interp, &f, rest)?;
        return eval(interp, env, &expansion);
    }
    let mut evaluated = Vec::new();
    for arg in list_iter(rest) {
        evaluated.push(eval(interp, env, &arg)?);
    }
    let args = list_with_tail(evaluated, Value::nil());
    apply(interp, &f, &args)
}

/// Apply a callable to an argument list. Builtins get the list as is;
/// closures and macros evaluate their body forms in a fresh frame under
/// the captured environment and return the last result.
pub fn apply(interp: &mut Interp, f: &ValueRef, args: &ValueRef) -> Result<ValueRef> {
    stacker::maybe_grow(RED_ZONE, STACK_CHUNK, || match &**f {
        Value::Builtin(b) => (b.0)(interp, args),
        Value::Closure(c) | Value::Macro(c) => apply_closure(interp, c, args),
        _ => Err(LithError::type_error("can not call non-callable")
            .with_name("{apply}")
            .with_expr(f.clone())),
    })
}

fn apply_closure(interp: &mut Interp, closure: &Closure, args: &ValueRef) -> Result<ValueRef> {
    let callee = match &closure.name {
        Some(sym) => sym.name().to_string(),
        None => "{lambda}".to_string(),
    };
    let (fixed, variadic) = param_spec(&closure.params);
    expect_nargs(&callee, fixed, args, !variadic)?;

    let frame = Env::child(&closure.env);
    let mut param = closure.params.clone();
    let mut arg = args.clone();
    loop {
        let step = match (&*param, &*arg) {
            (Value::Pair(name, next_param), Value::Pair(value, next_arg)) => {
                let sym = as_symbol(&callee, 1, name)?;
                (sym, value.clone(), next_param.clone(), next_arg.clone())
            }
            _ => break,
        };
        let (sym, value, next_param, next_arg) = step;
        if !frame.borrow_mut().define(sym.clone(), value) {
            return Err(LithError::redefine(sym.name()).with_name(&callee));
        }
        param = next_param;
        arg = next_arg;
    }
    // An improper tail symbol takes the remaining arguments as a list,
    // possibly ().
    if let Value::Symbol(tail) = &*param {
        if !frame.borrow_mut().define(tail.clone(), arg.clone()) {
            return Err(LithError::redefine(tail.name()).with_name(&callee));
        }
    }

    let mut result = Value::nil();
    for body_form in list_iter(&closure.body) {
        result = eval(interp, &frame, &body_form)?;
    }
    Ok(result)
}
