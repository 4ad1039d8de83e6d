//! Indexing of the surface language into the core language.
//!
//! Every binder and subterm is assigned a fresh [`TermId`] and every variable
//! occurrence is resolved to the identifier of its lexical binder. Shadowing
//! is resolved here once; later stages work with identifiers only.
//!
//! Free variables are a fatal error unless they were declared as inputs up
//! front, in which case they become the input seeds of the top-level
//! timeline.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use scoped_arena::Scope;

use crate::core::{self, ScopeArg};
use crate::env::{IdSource, IdsExhausted, NameEnv, TermId};
use crate::files::FileId;
use crate::source::ByteRange;
use crate::surface::Term;
use crate::symbol::Symbol;

/// Indexing diagnostic messages.
#[derive(Debug, Clone)]
pub enum Message {
    /// The name was not previously bound in the current scope.
    UnboundName {
        range: ByteRange,
        name: Symbol,
        suggestion: Option<Symbol>,
    },
    /// The identifier counter was depleted.
    IdsExhausted { range: ByteRange },
}

impl Message {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            Message::UnboundName {
                range,
                name,
                suggestion,
            } => {
                let diagnostic = Diagnostic::error()
                    .with_message(format!("cannot find `{}` in scope", name))
                    .with_labels(vec![
                        Label::primary(range.file_id(), *range).with_message("unbound name")
                    ]);
                match suggestion {
                    Some(suggestion) => diagnostic.with_notes(vec![format!(
                        "help: a binder with a similar name is in scope: `{}`",
                        suggestion
                    )]),
                    None => diagnostic,
                }
            }
            Message::IdsExhausted { range } => Diagnostic::bug()
                .with_message("identifier space exhausted while indexing")
                .with_labels(vec![Label::primary(range.file_id(), *range)])
                .with_notes(vec![format!(
                    "please file a bug report at: {}",
                    crate::BUG_REPORT_URL
                )]),
        }
    }
}

/// Indexing context.
pub struct Context<'arena> {
    scope: &'arena Scope<'arena>,
    ids: IdSource,
    inputs: Vec<ScopeArg>,
    env: NameEnv,
}

impl<'arena> Context<'arena> {
    /// Construct a context allocating core terms into `scope`, with a counter
    /// starting from zero.
    pub fn new(scope: &'arena Scope<'arena>) -> Context<'arena> {
        Context::with_ids(scope, IdSource::new())
    }

    /// Construct a context with an explicit identifier source. Re-running a
    /// pipeline with the counter started at the same value reproduces the
    /// same identifiers.
    pub fn with_ids(scope: &'arena Scope<'arena>, ids: IdSource) -> Context<'arena> {
        Context {
            scope,
            ids,
            inputs: Vec::new(),
            env: NameEnv::new(),
        }
    }

    /// Declare a free input: the name is bound for the whole indexing run and
    /// surfaces as an argument-seed track of the top-level layout.
    pub fn declare_input(&mut self, name: Symbol) -> Result<TermId, IdsExhausted> {
        let id = self.ids.fresh()?;
        self.env = self.env.bind(name, id);
        self.inputs.push(ScopeArg { id, name });
        Ok(id)
    }

    /// The declared inputs, in declaration order.
    pub fn inputs(&self) -> &[ScopeArg] {
        &self.inputs
    }

    /// Index a surface term, resolving every name to its binder's identifier.
    pub fn index(&mut self, term: &Term<'_>) -> Result<&'arena core::Term<'arena>, Message> {
        let env = self.env.clone();
        self.index_term(&env, term)
    }

    fn index_term(
        &mut self,
        env: &NameEnv,
        term: &Term<'_>,
    ) -> Result<&'arena core::Term<'arena>, Message> {
        match term {
            Term::Name(range, name) => match env.lookup(*name) {
                Some(id) => Ok(self.scope.to_scope(core::Term::Var(id))),
                None => Err(Message::UnboundName {
                    range: *range,
                    name: *name,
                    suggestion: suggest_name(env, *name),
                }),
            },
            Term::Abs(range, (_, name), body) => {
                let binder = self.fresh(*range)?;
                let body = self.index_term(&env.bind(*name, binder), body)?;
                let id = self.fresh(*range)?;
                Ok(self.scope.to_scope(core::Term::Abs {
                    id,
                    binder,
                    name: *name,
                    body,
                }))
            }
            Term::App(range, function, argument) => {
                let id = self.fresh(*range)?;
                let function = self.index_term(env, function)?;
                let argument = self.index_term(env, argument)?;
                Ok(self.scope.to_scope(core::Term::App {
                    id,
                    function,
                    argument,
                }))
            }
        }
    }

    fn fresh(&mut self, range: ByteRange) -> Result<TermId, Message> {
        self.ids
            .fresh()
            .map_err(|_| Message::IdsExhausted { range })
    }
}

/// The closest name in scope, by edit distance, if any is close enough to be
/// a plausible typo.
fn suggest_name(env: &NameEnv, name: Symbol) -> Option<Symbol> {
    let name = name.resolve();
    env.names()
        .map(|candidate| (levenshtein::levenshtein(candidate.resolve(), name), candidate))
        .filter(|(distance, _)| *distance <= 2 && *distance < name.len())
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}
