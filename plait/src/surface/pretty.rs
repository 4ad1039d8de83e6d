//! A pretty printer for surface terms.

use pretty::RcDoc;

use crate::surface::Term;

/// Term precedences
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Top = 0,
    App,
    Atomic,
}

pub struct Context {}

impl Context {
    pub fn new() -> Context {
        Context {}
    }

    pub fn term(&self, term: &Term<'_>) -> RcDoc {
        self.term_prec(Prec::Top, term)
    }

    fn term_prec(&self, prec: Prec, term: &Term<'_>) -> RcDoc {
        match term {
            Term::Name(_, name) => RcDoc::text(name.resolve().to_owned()),
            Term::Abs(_, (_, binder), body) => self.paren(
                prec > Prec::Top,
                RcDoc::concat([
                    RcDoc::text("λ"),
                    RcDoc::text(binder.resolve().to_owned()),
                    RcDoc::text("."),
                    RcDoc::space(),
                    self.term_prec(Prec::Top, body),
                ]),
            ),
            Term::App(_, function, argument) => self.paren(
                prec > Prec::App,
                RcDoc::concat([
                    self.term_prec(Prec::App, function),
                    RcDoc::space(),
                    self.term_prec(Prec::Atomic, argument),
                ]),
            ),
        }
    }

    fn paren<'a>(&self, wrap: bool, doc: RcDoc<'a>) -> RcDoc<'a> {
        if wrap {
            RcDoc::concat([RcDoc::text("("), doc, RcDoc::text(")")])
        } else {
            doc
        }
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}
