//! Pipeline driver: source text in, diagnostics and emitted output out.

use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::term::termcolor::{BufferedStandardStream, ColorChoice, WriteColor};
use pretty::RcDoc;
use scoped_arena::Scope;
use std::cell::RefCell;
use std::io::Read;
use std::path::Path;

use crate::core::timeline::{self, Timeline};
use crate::core::{self, layout, rate, ScopeArg};
use crate::env::TermId;
use crate::files::{FileId, Files};
use crate::surface::{self, indexing};
use crate::symbol::Symbol;

#[derive(Debug, Copy, Clone)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Error => 1,
        }
    }
}

pub struct Driver {
    files: Files,
    inputs: Vec<Symbol>,

    codespan_config: codespan_reporting::term::Config,
    diagnostic_writer: RefCell<Box<dyn WriteColor>>,

    emit_width: usize,
    emit_writer: RefCell<Box<dyn WriteColor>>,
}

impl Driver {
    pub fn new() -> Driver {
        Driver {
            files: Files::new(),
            inputs: Vec::new(),

            codespan_config: codespan_reporting::term::Config::default(),
            diagnostic_writer: RefCell::new(Box::new(BufferedStandardStream::stderr(
                if atty::is(atty::Stream::Stderr) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                },
            ))),

            emit_width: usize::MAX,
            emit_writer: RefCell::new(Box::new(BufferedStandardStream::stdout(
                if atty::is(atty::Stream::Stdout) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                },
            ))),
        }
    }

    /// Set the writer to use when rendering diagnostics
    pub fn set_diagnostic_writer(&mut self, stream: impl 'static + WriteColor) {
        self.diagnostic_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Set the width to use when emitting timelines and layouts
    pub fn set_emit_width(&mut self, emit_width: usize) {
        self.emit_width = emit_width;
    }

    /// Set the writer to use when emitting timelines and layouts
    pub fn set_emit_writer(&mut self, stream: impl 'static + WriteColor) {
        self.emit_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Declare a free variable that terms may reference; it becomes an
    /// argument-seed track of the top-level layout.
    pub fn declare_input(&mut self, name: &str) {
        self.inputs.push(Symbol::intern(name));
    }

    /// Load a source string into the file database.
    pub fn load_source_string(&mut self, name: String, source: String) -> FileId {
        self.files.add(name, source)
    }

    /// Load a source file into the file database using a reader.
    pub fn load_source(&mut self, name: String, mut reader: impl Read) -> Option<FileId> {
        let mut source = String::new();
        match reader.read_to_string(&mut source) {
            Ok(_) => Some(self.load_source_string(name, source)),
            Err(error) => {
                self.emit_read_diagnostic(name, error);
                None
            }
        }
    }

    /// Load a source file into the file database from the given path.
    pub fn load_source_path(&mut self, path: &Path) -> Option<FileId> {
        match std::fs::File::open(path) {
            Ok(file) => self.load_source(path.display().to_string(), file),
            Err(error) => {
                self.emit_read_diagnostic(path.display(), error);
                None
            }
        }
    }

    /// Linearize a term and emit its timeline.
    pub fn timeline_and_emit_term(&mut self, file_id: FileId) -> Status {
        let scope = Scope::new();
        let (timeline, _, _) = match self.lower_term(&scope, file_id) {
            Some(lowered) => lowered,
            None => return Status::Error,
        };

        self.emit_doc(core::pretty::Context::new().timeline(&timeline));
        Status::Ok
    }

    /// Run the full pipeline and emit the minimum-cost layout.
    pub fn plan_and_emit_term(&mut self, file_id: FileId) -> Status {
        let scope = Scope::new();
        let (timeline, output, inputs) = match self.lower_term(&scope, file_id) {
            Some(lowered) => lowered,
            None => return Status::Error,
        };

        let candidates = layout::candidates(&timeline, &inputs, output);
        match rate::best(candidates) {
            Ok(Some(best)) => {
                let context = core::pretty::Context::new();
                self.emit_doc(RcDoc::concat([
                    RcDoc::text(format!("cost {}", rate::cost(&best))),
                    RcDoc::hardline(),
                    context.layout(&best),
                ]));
                Status::Ok
            }
            Ok(None) => {
                self.emit_diagnostic(
                    Diagnostic::error().with_message("no layout candidates for term"),
                );
                Status::Error
            }
            Err(error) => {
                self.emit_diagnostic(synthesis_bug(error));
                Status::Error
            }
        }
    }

    /// Emit the first `limit` candidate layouts with their costs.
    pub fn candidates_and_emit_term(&mut self, file_id: FileId, limit: usize) -> Status {
        let scope = Scope::new();
        let (timeline, output, inputs) = match self.lower_term(&scope, file_id) {
            Some(lowered) => lowered,
            None => return Status::Error,
        };

        let context = core::pretty::Context::new();
        for (index, candidate) in layout::candidates(&timeline, &inputs, output)
            .take(limit)
            .enumerate()
        {
            match candidate {
                Ok(layout) => self.emit_doc(RcDoc::concat([
                    RcDoc::text(format!(
                        "candidate {index}, cost {}",
                        rate::cost(&layout)
                    )),
                    RcDoc::hardline(),
                    context.layout(&layout),
                ])),
                Err(error) => {
                    self.emit_diagnostic(synthesis_bug(error));
                    return Status::Error;
                }
            }
        }
        Status::Ok
    }

    /// Parse, index and linearize the term in `file_id`, emitting diagnostics
    /// for any failure.
    fn lower_term<'arena>(
        &self,
        scope: &'arena Scope<'arena>,
        file_id: FileId,
    ) -> Option<(Timeline, TermId, Vec<ScopeArg>)> {
        let source = self.files.source(file_id).unwrap();
        let term = match surface::parse_term(scope, file_id, source) {
            Ok(term) => term,
            Err(message) => {
                self.emit_diagnostic(message.to_diagnostic());
                return None;
            }
        };

        let mut context = indexing::Context::new(scope);
        for name in &self.inputs {
            if context.declare_input(*name).is_err() {
                self.emit_diagnostic(
                    Diagnostic::bug().with_message("identifier space exhausted"),
                );
                return None;
            }
        }

        let term = match context.index(term) {
            Ok(term) => term,
            Err(message) => {
                self.emit_diagnostic(message.to_diagnostic());
                return None;
            }
        };
        let inputs = context.inputs().to_vec();

        let (timeline, output) = timeline::linearize(term);
        Some((timeline, output, inputs))
    }

    fn emit_doc(&self, doc: RcDoc<'_>) {
        use std::io::Write;

        let mut emit_writer = self.emit_writer.borrow_mut();
        writeln!(emit_writer, "{}", doc.pretty(self.emit_width)).unwrap();
        emit_writer.flush().unwrap();
    }

    fn emit_diagnostic(&self, diagnostic: Diagnostic<FileId>) {
        let mut writer = self.diagnostic_writer.borrow_mut();
        let config = &self.codespan_config;

        codespan_reporting::term::emit(&mut *writer, config, &self.files, &diagnostic).unwrap();
        writer.flush().unwrap();
    }

    fn emit_read_diagnostic(&self, name: impl std::fmt::Display, error: std::io::Error) {
        let diagnostic =
            Diagnostic::error().with_message(format!("couldn't read `{name}`: {error}"));
        self.emit_diagnostic(diagnostic);
    }
}

impl Default for Driver {
    fn default() -> Driver {
        Driver::new()
    }
}

fn synthesis_bug(error: layout::Error) -> Diagnostic<FileId> {
    Diagnostic::bug()
        .with_message(format!("failed to synthesize layout: {error}"))
        .with_notes(vec![format!(
            "please file a bug report at: {}",
            crate::BUG_REPORT_URL
        )])
}
