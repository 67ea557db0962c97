//! The lexical environment chain.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::symbol::Symbol;
use crate::value::ValueRef;

pub type EnvRef = Rc<RefCell<Env>>;

/// One frame of the scope chain: an association vector of bindings plus a
/// link to the enclosing frame. The global frame has no parent.
pub struct Env {
    parent: Option<EnvRef>,
    vars: Vec<(Symbol, ValueRef)>,
}

impl Env {
    pub fn global() -> EnvRef {
        Rc::new(RefCell::new(Env {
            parent: None,
            vars: Vec::new(),
        }))
    }

    pub fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Env {
            parent: Some(parent.clone()),
            vars: Vec::new(),
        }))
    }

    fn lookup(&self, name: &Symbol) -> Option<ValueRef> {
        self.vars
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    /// Bind `name` in this frame. Returns `false` when the frame already
    /// holds the symbol; a frame binds each symbol at most once.
    pub fn define(&mut self, name: Symbol, value: ValueRef) -> bool {
        if self.vars.iter().any(|(key, _)| *key == name) {
            return false;
        }
        self.vars.push((name, value));
        true
    }

    /// Look `name` up, walking the parent chain.
    pub fn get(env: &EnvRef, name: &Symbol) -> Option<ValueRef> {
        let mut cur = env.clone();
        loop {
            let parent = {
                let frame = cur.borrow();
                if let Some(value) = frame.lookup(name) {
                    return Some(value);
                }
                frame.parent.clone()
            };
            match parent {
                Some(parent) => cur = parent,
                None => return None,
            }
        }
    }

    /// Rebind `name` in whichever frame already holds it. Returns `false`
    /// when no frame does.
    pub fn set(env: &EnvRef, name: &Symbol, value: ValueRef) -> bool {
        let mut cur = env.clone();
        loop {
            let parent = {
                let mut frame = cur.borrow_mut();
                if let Some(slot) = frame.vars.iter_mut().find(|(key, _)| key == name) {
                    slot.1 = value;
                    return true;
                }
                frame.parent.clone()
            };
            match parent {
                Some(parent) => cur = parent,
                None => return false,
            }
        }
    }

    /// Collect every bound name visible from `env`, innermost first.
    pub fn visible_names(env: &EnvRef, out: &mut Vec<String>) {
        let mut cur = Some(env.clone());
        while let Some(frame) = cur {
            let frame = frame.borrow();
            out.extend(frame.vars.iter().map(|(key, _)| key.name().to_string()));
            cur = frame.parent.clone();
        }
    }
}

// Closures close over the frame chain that binds them, so a derived Debug
// would chase reference cycles. Print one frame, shallowly.
impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.vars.iter().map(|(key, _)| key.name()).collect();
        f.debug_struct("Env")
            .field("vars", &names)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
