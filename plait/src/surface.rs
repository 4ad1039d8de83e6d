//! Surface language.
//!
//! Named lambda calculus terms as written by the user: `λx. x`, `\f x. f x`,
//! application by juxtaposition. The scheduling pipeline itself mandates no
//! particular syntax — this front-end exists for the CLI and the tests, and
//! terms can equally be built programmatically and handed to
//! [`indexing`](crate::surface::indexing) directly.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use scoped_arena::Scope;

use crate::files::FileId;
use crate::source::{BytePos, ByteRange};
use crate::symbol::Symbol;

pub mod lexer;

pub mod indexing;
pub mod pretty;

/// Surface terms.
#[derive(Debug, Clone)]
pub enum Term<'arena> {
    /// Variable references.
    Name(ByteRange, Symbol),
    /// Function abstractions, with the binder's own range kept for
    /// diagnostics.
    Abs(ByteRange, (ByteRange, Symbol), &'arena Term<'arena>),
    /// Function applications.
    App(ByteRange, &'arena Term<'arena>, &'arena Term<'arena>),
}

impl<'arena> Term<'arena> {
    /// Get the source range of the term.
    pub fn range(&self) -> ByteRange {
        match self {
            Term::Name(range, _) | Term::Abs(range, _, _) | Term::App(range, _, _) => *range,
        }
    }
}

/// Messages produced while parsing the surface language.
#[derive(Debug, Clone)]
pub enum ParseMessage {
    Lexer(lexer::Error),
    UnexpectedToken {
        range: ByteRange,
        found: &'static str,
        expected: &'static str,
    },
    UnexpectedEnd {
        range: ByteRange,
        expected: &'static str,
    },
}

impl ParseMessage {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            ParseMessage::Lexer(error) => error.to_diagnostic(),
            ParseMessage::UnexpectedToken {
                range,
                found,
                expected,
            } => Diagnostic::error()
                .with_message(format!("unexpected {found}, expected {expected}"))
                .with_labels(vec![
                    Label::primary(range.file_id(), *range).with_message("unexpected token")
                ]),
            ParseMessage::UnexpectedEnd { range, expected } => Diagnostic::error()
                .with_message(format!("unexpected end of input, expected {expected}"))
                .with_labels(vec![
                    Label::primary(range.file_id(), *range).with_message("input ends here")
                ]),
        }
    }
}

/// Parse a term from `source`, allocating it into `scope`.
pub fn parse_term<'arena>(
    scope: &'arena Scope<'arena>,
    file_id: FileId,
    source: &str,
) -> Result<&'arena Term<'arena>, ParseMessage> {
    let mut parser = Parser {
        scope,
        file_id,
        eof: source.len() as BytePos,
        tokens: lexer::tokens(file_id, source).peekable(),
    };

    let term = parser.term()?;
    match parser.next()? {
        None => Ok(term),
        Some((start, token, end)) => Err(ParseMessage::UnexpectedToken {
            range: ByteRange::new(file_id, start, end),
            found: token.description(),
            expected: "end of input",
        }),
    }
}

struct Parser<'arena, Tokens>
where
    Tokens: Iterator,
{
    scope: &'arena Scope<'arena>,
    file_id: FileId,
    eof: BytePos,
    tokens: std::iter::Peekable<Tokens>,
}

type SpannedToken<'source> = lexer::Spanned<lexer::Token<'source>, BytePos>;

impl<'arena, 'source, Tokens> Parser<'arena, Tokens>
where
    Tokens: Iterator<Item = Result<SpannedToken<'source>, lexer::Error>>,
{
    fn next(&mut self) -> Result<Option<SpannedToken<'source>>, ParseMessage> {
        match self.tokens.next() {
            None => Ok(None),
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(error)) => Err(ParseMessage::Lexer(error)),
        }
    }

    fn peek(&mut self) -> Result<Option<&SpannedToken<'source>>, ParseMessage> {
        match self.tokens.peek() {
            None => Ok(None),
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(error)) => Err(ParseMessage::Lexer(error.clone())),
        }
    }

    fn end_range(&self) -> ByteRange {
        ByteRange::new(self.file_id, self.eof, self.eof)
    }

    /// term ::= abstraction | application
    fn term(&mut self) -> Result<&'arena Term<'arena>, ParseMessage> {
        match self.peek()? {
            Some((_, lexer::Token::Lambda, _)) => self.abstraction(),
            _ => self.application(),
        }
    }

    /// abstraction ::= `λ` name+ `.` term
    ///
    /// Multiple binders are sugar for a curried chain of single-binder
    /// abstractions.
    fn abstraction(&mut self) -> Result<&'arena Term<'arena>, ParseMessage> {
        let (start, _, _) = self.next()?.expect("peeked lambda");

        let mut binders = Vec::new();
        loop {
            match self.next()? {
                Some((start, lexer::Token::Name(name), end)) => {
                    let range = ByteRange::new(self.file_id, start, end);
                    binders.push((range, Symbol::intern(name)));
                }
                Some((_, lexer::Token::FullStop, _)) if !binders.is_empty() => break,
                Some((start, token, end)) => {
                    return Err(ParseMessage::UnexpectedToken {
                        range: ByteRange::new(self.file_id, start, end),
                        found: token.description(),
                        expected: if binders.is_empty() { "binder" } else { "binder or `.`" },
                    });
                }
                None => {
                    return Err(ParseMessage::UnexpectedEnd {
                        range: self.end_range(),
                        expected: "binder",
                    });
                }
            }
        }

        let body = self.term()?;
        let range = ByteRange::new(self.file_id, start, body.range().end());

        // Desugar inner binders first so the outermost abstraction covers the
        // whole source range.
        let mut term = body;
        for binder in binders.into_iter().rev() {
            term = self.scope.to_scope(Term::Abs(range, binder, term));
        }
        Ok(term)
    }

    /// application ::= atom+
    fn application(&mut self) -> Result<&'arena Term<'arena>, ParseMessage> {
        let mut term = match self.atom()? {
            Some(term) => term,
            None => match self.next()? {
                Some((start, token, end)) => {
                    return Err(ParseMessage::UnexpectedToken {
                        range: ByteRange::new(self.file_id, start, end),
                        found: token.description(),
                        expected: "term",
                    });
                }
                None => {
                    return Err(ParseMessage::UnexpectedEnd {
                        range: self.end_range(),
                        expected: "term",
                    });
                }
            },
        };

        while let Some(argument) = self.atom()? {
            let range = term.range().merge(&argument.range());
            term = self.scope.to_scope(Term::App(range, term, argument));
        }
        Ok(term)
    }

    /// atom ::= name | `(` term `)`
    fn atom(&mut self) -> Result<Option<&'arena Term<'arena>>, ParseMessage> {
        match self.peek()? {
            Some((_, lexer::Token::Name(_), _)) => {
                let (start, token, end) = self.next()?.expect("peeked name");
                let name = match token {
                    lexer::Token::Name(name) => Symbol::intern(name),
                    _ => unreachable!(),
                };
                let range = ByteRange::new(self.file_id, start, end);
                Ok(Some(self.scope.to_scope(Term::Name(range, name))))
            }
            Some((_, lexer::Token::OpenParen, _)) => {
                self.next()?;
                let term = self.term()?;
                match self.next()? {
                    Some((_, lexer::Token::CloseParen, _)) => Ok(Some(term)),
                    Some((start, token, end)) => Err(ParseMessage::UnexpectedToken {
                        range: ByteRange::new(self.file_id, start, end),
                        found: token.description(),
                        expected: "`)`",
                    }),
                    None => Err(ParseMessage::UnexpectedEnd {
                        range: self.end_range(),
                        expected: "`)`",
                    }),
                }
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<'arena>(scope: &'arena Scope<'arena>, source: &str) -> &'arena Term<'arena> {
        let mut files = crate::files::Files::new();
        let file_id = files.add("<test>".to_owned(), source.to_owned());
        parse_term(scope, file_id, source).unwrap()
    }

    fn printed(source: &str) -> String {
        let scope = Scope::new();
        let term = parse(&scope, source);
        pretty::Context::new().term(term).pretty(80).to_string()
    }

    #[test]
    fn application_is_left_associative() {
        assert_eq!(printed("f x y"), "f x y");
        assert_eq!(printed("f (x y)"), "f (x y)");
    }

    #[test]
    fn curried_binders_desugar() {
        assert_eq!(printed(r"\f x. f x"), "λf. λx. f x");
    }

    #[test]
    fn lambda_token_and_backslash_agree() {
        assert_eq!(printed("λx. x"), printed(r"\x. x"));
    }

    #[test]
    fn parenthesised_abstractions_in_call_position() {
        assert_eq!(printed(r"(\x. x) y"), "(λx. x) y");
        assert_eq!(printed(r"f (\x. x)"), "f (λx. x)");
    }

    #[test]
    fn reports_unclosed_paren() {
        let scope = Scope::new();
        let mut files = crate::files::Files::new();
        let source = "(f x";
        let file_id = files.add("<test>".to_owned(), source.to_owned());
        assert!(matches!(
            parse_term(&scope, file_id, source),
            Err(ParseMessage::UnexpectedEnd { .. })
        ));
    }
}
