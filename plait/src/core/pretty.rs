//! A pretty printer for timelines and layouts.
//!
//! This is mainly intended for debugging and for the CLI's emit output; the
//! renderer consumes the layout structurally, not through this printer.

use itertools::Itertools;
use pretty::RcDoc;

use crate::core::layout::{Column, Layout, Slot};
use crate::core::timeline::{Step, Timeline};

const INDENT: isize = 4;

pub struct Context {}

impl Context {
    pub fn new() -> Context {
        Context {}
    }

    pub fn timeline(&self, timeline: &Timeline) -> RcDoc<'static> {
        RcDoc::intersperse(
            timeline.steps().iter().map(|step| self.step(step)),
            RcDoc::hardline(),
        )
    }

    fn step(&self, step: &Step) -> RcDoc<'static> {
        match step {
            Step::Call {
                id,
                function,
                argument,
            } => RcDoc::text(format!("{id} = call {function} {argument}")),
            Step::Nested {
                id,
                args,
                output,
                body,
            } => {
                let args = args.iter().map(|arg| arg.name.resolve()).join(" ");
                let header = RcDoc::text(format!("{id} = scope ({args}) -> {output}"));
                if body.is_empty() {
                    header
                } else {
                    RcDoc::concat([
                        header,
                        RcDoc::space(),
                        RcDoc::text("{"),
                        RcDoc::hardline()
                            .append(self.timeline(body))
                            .nest(INDENT),
                        RcDoc::hardline(),
                        RcDoc::text("}"),
                    ])
                }
            }
        }
    }

    /// The layout as a grid, one line per time column, followed by the
    /// interior of each nested scope.
    pub fn layout(&self, layout: &Layout) -> RcDoc<'static> {
        let grid = RcDoc::intersperse(
            layout
                .columns
                .iter()
                .enumerate()
                .map(|(time, column)| self.column(time, column)),
            RcDoc::hardline(),
        );

        let scopes = layout
            .columns
            .iter()
            .flat_map(|column| &column.slots)
            .filter_map(|slot| match slot {
                Slot::Scope { track, inner, .. } => Some(RcDoc::concat([
                    RcDoc::hardline(),
                    RcDoc::text(format!("scope {}:", track.id)),
                    RcDoc::hardline().append(self.layout(inner)).nest(INDENT),
                ])),
                _ => None,
            });

        RcDoc::concat(std::iter::once(grid).chain(scopes))
    }

    fn column(&self, time: usize, column: &Column) -> RcDoc<'static> {
        RcDoc::concat([
            RcDoc::text(format!("t{time} │")),
            RcDoc::concat(
                column
                    .slots
                    .iter()
                    .map(|slot| RcDoc::space().append(self.slot(slot))),
            ),
        ])
    }

    fn slot(&self, slot: &Slot) -> RcDoc<'static> {
        match slot {
            Slot::Empty => RcDoc::text("·"),
            Slot::Seed(track) => match track.name {
                Some(name) => RcDoc::text(name.resolve().to_owned()),
                None => RcDoc::text(track.id.to_string()),
            },
            Slot::Capture(track) => RcDoc::text(format!("^{}", track.id)),
            Slot::Line(_) => RcDoc::text("|"),
            Slot::Call { track, .. } => RcDoc::text(track.id.to_string()),
            Slot::Scope { track, .. } => RcDoc::text(format!("[{}]", track.id)),
        }
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::linearize;
    use crate::surface::{self, indexing};
    use scoped_arena::Scope;

    fn printed_timeline(source: &str) -> String {
        let scope = Scope::new();
        let mut files = crate::files::Files::new();
        let file_id = files.add("<test>".to_owned(), source.to_owned());
        let term = surface::parse_term(&scope, file_id, source).unwrap();
        let term = indexing::Context::new(&scope).index(term).unwrap();
        let (timeline, _) = linearize(term);
        Context::new().timeline(&timeline).pretty(80).to_string()
    }

    #[test]
    fn empty_scopes_print_on_one_line() {
        assert_eq!(printed_timeline(r"\x y. x"), "%3 = scope (x y) -> %0");
    }

    #[test]
    fn nested_bodies_indent() {
        assert_eq!(
            printed_timeline(r"\f x. f x"),
            "%4 = scope (f x) -> %2 {\n    %2 = call %0 %1\n}"
        );
    }
}
