//! The reader: recursive descent from tokens to values.

use crate::error::{LithError, Result};
use crate::interp::Interp;
use crate::lexer::{Lexer, Token};
use crate::value::{Value, ValueRef, list_with_tail};

/// End of input while a list or quote form is still open is not the
/// benign top-level EOF.
fn cut_short(err: LithError, context: &'static str) -> LithError {
    if err.is_benign_eof() {
        LithError::unexpected_eof(context)
    } else {
        err
    }
}

/// Read one expression from the cursor. The benign `Eof` error means the
/// buffer held no further form.
pub fn read_expr(interp: &mut Interp, lexer: &mut Lexer) -> Result<ValueRef> {
    match lexer.try_next()? {
        Token::LParen => read_list(interp, lexer),
        Token::RParen => Err(LithError::syntax(
            "unbalanced parenthesis, expected an expression",
        )),
        Token::Dot => Err(LithError::syntax("unexpected '.' outside a list")),
        Token::Quote => read_wrapped(interp, lexer, "quote"),
        Token::Quasiquote => read_wrapped(interp, lexer, "quasiquote"),
        Token::Unquote => read_wrapped(interp, lexer, "unquote"),
        Token::UnquoteSplicing => read_wrapped(interp, lexer, "unquote-splicing"),
        Token::Str(bytes) => Ok(Value::string(bytes)),
        Token::Atom(text) => Ok(read_atom(interp, &text)),
    }
}

/// `'E` reads as `(quote E)`; `` ` ``/`@`, `,` and `,@` wrap the same way
/// with their own head symbols.
fn read_wrapped(interp: &mut Interp, lexer: &mut Lexer, name: &str) -> Result<ValueRef> {
    let head = Value::symbol(interp.intern(name));
    let expr =
        read_expr(interp, lexer).map_err(|e| cut_short(e, "expecting an expression to quote"))?;
    Ok(list_with_tail(vec![head, expr], Value::nil()))
}

/// Read list elements after `(`. A lone `.` past the first element
/// switches to the improper tail: exactly one expression, then `)`.
fn read_list(interp: &mut Interp, lexer: &mut Lexer) -> Result<ValueRef> {
    let mut items: Vec<ValueRef> = Vec::new();
    loop {
        match lexer.peek().map_err(|e| cut_short(e, "while reading a list"))? {
            Token::RParen => {
                lexer.try_next()?;
                return Ok(list_with_tail(items, Value::nil()));
            }
            Token::Dot => {
                lexer.try_next()?;
                if items.is_empty() {
                    return Err(LithError::syntax("improper lists do not start with '.'"));
                }
                let tail = read_expr(interp, lexer)
                    .map_err(|e| cut_short(e, "while reading a list"))?;
                return match lexer
                    .try_next()
                    .map_err(|e| cut_short(e, "while reading a list"))?
                {
                    Token::RParen => Ok(list_with_tail(items, tail)),
                    _ => Err(LithError::syntax(
                        "expecting ')' at the end of this improper list",
                    )),
                };
            }
            _ => {
                items.push(
                    read_expr(interp, lexer).map_err(|e| cut_short(e, "while reading a list"))?,
                );
            }
        }
    }
}

/// Classify a bare token: boolean literal, integer, float, or symbol.
fn read_atom(interp: &mut Interp, text: &str) -> ValueRef {
    match text {
        "#t" => return Value::boolean(true),
        "#f" => return Value::boolean(false),
        _ => {}
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::integer(i);
    }
    if is_float_shaped(text) {
        if let Ok(n) = text.parse::<f64>() {
            return Value::number(n);
        }
    }
    Value::symbol(interp.intern(text))
}

/// Accept `3.`, `.5`, `+3.5`, `-0.25`: one dot among digits, and a signed
/// token needs a digit before the dot. Anything else reads as a symbol.
fn is_float_shaped(text: &str) -> bool {
    let (signed, rest) = match text.strip_prefix(['+', '-']) {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let Some((int_part, frac_part)) = rest.split_once('.') else {
        return false;
    };
    if signed && int_part.is_empty() {
        return false;
    }
    !(int_part.is_empty() && frac_part.is_empty())
        && int_part.chars().all(|c| c.is_ascii_digit())
        && frac_part.chars().all(|c| c.is_ascii_digit())
}
