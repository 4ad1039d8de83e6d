//! Interned strings for binder display names.

use std::fmt;
use std::sync::RwLock;

use once_cell::sync::Lazy;

static INTERNER: Lazy<RwLock<lasso::ThreadedRodeo>> =
    Lazy::new(|| RwLock::new(lasso::ThreadedRodeo::new()));

/// An interned string.
///
/// Binder names appear in surface terms, scope arguments and tracks; interning
/// makes them `Copy` and makes equality checks trivial.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(lasso::Spur);

impl Symbol {
    pub fn intern(sym: impl AsRef<str>) -> Symbol {
        Symbol(INTERNER.write().unwrap().get_or_intern(sym))
    }

    pub fn intern_static(sym: &'static str) -> Symbol {
        Symbol(INTERNER.write().unwrap().get_or_intern_static(sym))
    }

    pub fn resolve<'a>(&'a self) -> &'a str {
        let interner = INTERNER.read().unwrap();
        let string = interner.resolve(&self.0);

        // SAFETY: The lifetime is a bit of a lie: it is really tied to the
        // lifetime of `INTERNER`. But `INTERNER` is never dropped (since it is
        // static), so it is safe to truncate the lifetime to the shorter
        // lifetime of `'a`.
        unsafe { std::mem::transmute::<&str, &'a str>(string) }
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.resolve()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolve())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let a = Symbol::intern("succ");
        let b = Symbol::intern("succ");
        assert_eq!(a, b);
        assert_eq!(a.resolve(), "succ");
    }

    #[test]
    fn distinct_strings_distinct_symbols() {
        assert_ne!(Symbol::intern("x"), Symbol::intern("y"));
    }
}
