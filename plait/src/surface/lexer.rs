use codespan_reporting::diagnostic::{Diagnostic, Label};
use logos::Logos;

use crate::files::FileId;
use crate::source::{BytePos, ByteRange};

#[derive(Clone, Debug, PartialEq, Logos)]
#[logos(extras = FileId)]
pub enum Token<'source> {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_']*")]
    Name(&'source str),

    #[token("λ")]
    #[token("\\")]
    Lambda,
    #[token(".")]
    FullStop,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,

    #[error]
    #[regex(r"\p{Whitespace}", logos::skip)]
    #[regex(r"//(.*)\n", logos::skip)]
    Error,
}

pub type Spanned<Tok, Loc> = (Loc, Tok, Loc);

#[derive(Clone, Debug)]
pub enum Error {
    UnexpectedCharacter { range: ByteRange },
}

impl Error {
    pub fn range(&self) -> ByteRange {
        match self {
            Error::UnexpectedCharacter { range } => *range,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            Error::UnexpectedCharacter { range } => Diagnostic::error()
                .with_message("unexpected character")
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
        }
    }
}

pub fn tokens(
    file_id: FileId,
    source: &str,
) -> impl Iterator<Item = Result<Spanned<Token<'_>, BytePos>, Error>> {
    assert!(
        source.len() <= u32::MAX as usize,
        "`source` must be less than 4GiB in length"
    );

    Token::lexer_with_extras(source, file_id)
        .spanned()
        .map(move |(token, range)| {
            let start = range.start as BytePos;
            let end = range.end as BytePos;
            match token {
                Token::Error => Err(Error::UnexpectedCharacter {
                    range: ByteRange::new(file_id, start, end),
                }),
                token => Ok((start, token, end)),
            }
        })
}

impl<'source> Token<'source> {
    pub fn description(&self) -> &'static str {
        match self {
            Token::Name(_) => "name",
            Token::Lambda => "λ",
            Token::FullStop => ".",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Error => "error",
        }
    }
}
