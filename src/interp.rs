//! Interpreter state and the read-eval-print driver loops.

use std::fs;

use colored::Colorize;
use log::debug;

use crate::builtins::BUILTINS;
use crate::env::{Env, EnvRef};
use crate::error::{LithError, Result};
use crate::eval::eval;
use crate::lexer::Lexer;
use crate::parser::read_expr;
use crate::symbol::{Interner, Symbol};
use crate::value::{Value, ValueRef};

fn slurp(path: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|_| LithError::custom("could not open the file to be read"))
}

/// One interpreter: the symbol table, the global frame holding the
/// builtins, and the input name the error reporter blames. State is
/// per-instance; make as many interpreters as needed.
pub struct Interp {
    symbols: Interner,
    pub global: EnvRef,
    /// A path, `<<string>>` or `<<stdin>>`.
    pub filename: String,
}

impl Interp {
    pub fn new() -> Interp {
        let mut interp = Interp {
            symbols: Interner::new(),
            global: Env::global(),
            filename: "<<unspecified>>".to_string(),
        };
        for (name, function) in BUILTINS {
            let sym = interp.symbols.intern(name);
            interp
                .global
                .borrow_mut()
                .define(sym, Value::builtin(*function));
        }
        debug!("registered {} builtins", BUILTINS.len());
        interp
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    /// Print `err` the way the launcher and the REPL report failures.
    pub fn report(&self, err: &LithError) {
        eprintln!("{}", format!("lith: {}: {err}", self.filename).red());
    }

    /// One READ step; benign end of input becomes `None`.
    fn read_one(&mut self, lexer: &mut Lexer) -> Result<Option<ValueRef>> {
        match read_expr(self, lexer) {
            Ok(expr) => Ok(Some(expr)),
            Err(e) if e.is_benign_eof() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Evaluate every top-level form in `source` against `env`, printing
    /// `-> result` for each; `echo` additionally prints `>> form` first,
    /// the way string mode does. Stops at the first error.
    pub fn run_string(&mut self, env: &EnvRef, source: &str, echo: bool) -> Result<()> {
        let mut lexer = Lexer::new(source);
        while let Some(expr) = self.read_one(&mut lexer)? {
            if echo {
                println!(">> {expr}");
            }
            let result = eval(self, env, &expr)?;
            println!("-> {result}");
        }
        Ok(())
    }

    /// Evaluate every top-level form in the file at `path` against
    /// `env`, discarding results. While the file runs (and when it
    /// fails) the reporter blames `path`.
    pub fn run_file(&mut self, env: &EnvRef, path: &str) -> Result<()> {
        debug!("loading file {path}");
        let saved = std::mem::replace(&mut self.filename, path.to_string());
        let outcome = slurp(path).and_then(|source| {
            let mut lexer = Lexer::new(&source);
            while let Some(expr) = self.read_one(&mut lexer)? {
                eval(self, env, &expr).map_err(|e| match e.expr {
                    Some(_) => e,
                    None => e.with_expr(expr.clone()),
                })?;
            }
            Ok(())
        });
        if outcome.is_ok() {
            self.filename = saved;
        }
        outcome
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}
