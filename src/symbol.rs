//! Symbols, interning and special forms.

use std::{
    collections::HashMap,
    fmt::{self, Display},
    hash::{Hash, Hasher},
    rc::Rc,
    str::FromStr,
    sync::LazyLock,
};

pub static SPECIAL_FORMS: LazyLock<HashMap<&'static str, SpecialForm>> = LazyLock::new(|| {
    HashMap::from([
        ("quote", SpecialForm::Quote),
        ("if", SpecialForm::If),
        ("define", SpecialForm::Define),
        ("set!", SpecialForm::Set),
        ("define-macro", SpecialForm::DefineMacro),
        ("lambda", SpecialForm::Lambda),
        ("eval!", SpecialForm::Eval),
    ])
});

/// An interned identifier.
///
/// Every symbol reachable from user code comes out of an [`Interner`], so
/// two symbols with the same spelling share one identity and equality is a
/// pointer comparison.
#[derive(Debug, Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const u8 as usize).hash(state);
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The symbol table of one interpreter.
#[derive(Debug, Default)]
pub struct Interner {
    table: HashMap<String, Symbol>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the symbol named `name`, creating and remembering it on
    /// first use.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(sym) = self.table.get(name) {
            return sym.clone();
        }
        let sym = Symbol(Rc::from(name));
        self.table.insert(name.to_string(), sym.clone());
        sym
    }
}

/// A special form is a head symbol that does not follow the applicative
/// model: its arguments reach the evaluator unevaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    /// Special form `quote`.
    ///
    /// `(quote x)` returns `x` as is. `'x` is equivalent to `(quote x)`.
    Quote,
    /// Special form `if`.
    ///
    /// `(if p e1 e2)` evaluates `p`; every value except `#f` and `()` is
    /// true. Only the taken branch is evaluated.
    If,
    /// Special form `define`.
    ///
    /// `(define x e)` evaluates `e` and binds the result to `x` in the
    /// current frame. `(define (f args) body...)` builds a closure named
    /// `f` capturing the current environment. A symbol may be defined
    /// only once per frame; shadowing an outer frame is fine.
    Define,
    /// Special form `set!`.
    ///
    /// `(set! x e)` rebinds `x` in whichever enclosing frame already
    /// holds it. An unbound `x` is an error.
    Set,
    /// Special form `define-macro`.
    ///
    /// `(define-macro (m args) body...)` is the function shape of
    /// `define`, except the bound value is a macro: it receives its
    /// argument forms unevaluated and its result is evaluated in the
    /// caller's environment.
    DefineMacro,
    /// Special form `lambda`.
    ///
    /// `(lambda (args) body...)` builds an anonymous closure capturing
    /// the current environment. The parameter list may be improper, or a
    /// bare symbol; the tail symbol collects the remaining arguments as
    /// a list.
    Lambda,
    /// Special form `eval!`.
    ///
    /// `(eval! e)` evaluates `e`, then evaluates the result again in the
    /// current environment.
    Eval,
}

impl FromStr for SpecialForm {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SPECIAL_FORMS.get(value).copied().ok_or(())
    }
}

impl Display for SpecialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpecialForm::Quote => "quote",
            SpecialForm::If => "if",
            SpecialForm::Define => "define",
            SpecialForm::Set => "set!",
            SpecialForm::DefineMacro => "define-macro",
            SpecialForm::Lambda => "lambda",
            SpecialForm::Eval => "eval!",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_shares_identity() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        let c = interner.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn distinct_interners_do_not_share() {
        let mut one = Interner::new();
        let mut two = Interner::new();
        assert_ne!(one.intern("foo"), two.intern("foo"));
    }

    #[test]
    fn special_form_names_round_trip() {
        for (name, form) in SPECIAL_FORMS.iter() {
            assert_eq!(*name, format!("{form}"));
            assert_eq!(SpecialForm::from_str(name), Ok(*form));
        }
        assert!(SpecialForm::from_str("quotient").is_err());
    }
}
