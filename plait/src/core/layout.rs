//! Exhaustive enumeration of track assignments for a timeline.
//!
//! A layout assigns every produced value to a horizontal track over a
//! discrete time axis. The synthesizer explores, step by step, every
//! structurally valid assignment: reusing a dead slot near the call's
//! function when one exists, and otherwise branching over every way of
//! widening the layout with a fresh track. Nested scopes are synthesized
//! recursively and placed as single opaque slots.
//!
//! Candidates are produced as a lazy iterator, in a deterministic order, so a
//! caller can stream them into the [rater](crate::core::rate) and stop early
//! instead of materializing a combinatorial candidate set.

use std::fmt;

use itertools::Itertools;

use crate::core::timeline::{Step, Timeline};
use crate::core::ScopeArg;
use crate::env::TermId;
use crate::symbol::Symbol;

/// Display color of a track, as read off by the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color(pub &'static str);

/// The renderer's line colors, cycled per scope. Call results inherit the
/// color of their function's track instead of consuming a palette entry.
pub const PALETTE: [Color; 5] = [
    Color("#F37878"),
    Color("#21BEE0"),
    Color("#AA59AB"),
    Color("#38F461"),
    Color("#BBB684"),
];

/// Which side of its function's track a call result spawned on, fixed by
/// whichever operand is encountered first in the column.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpawnSide {
    /// The result sits on the earlier side of the function track, away from
    /// the argument.
    Before,
    /// The result sits on the later side of the function track.
    After,
}

/// A vertical slot bound to one identifier for a contiguous span of time.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TermId,
    /// Binder display name, for argument seeds.
    pub name: Option<Symbol>,
    pub color: Color,
}

/// The occupant of one (column, track) position.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Empty,
    /// A track created to hold one of the scope's inputs.
    Seed(Track),
    /// A track standing in for an enclosing-scope identifier referenced
    /// inside this scope; the renderer joins it to the enclosing line.
    Capture(Track),
    /// Continuation of a track created in an earlier column.
    Line(Track),
    /// A call's result track, created in this column.
    Call {
        track: Track,
        function: TermId,
        argument: TermId,
        side: SpawnSide,
    },
    /// A nested scope, opaque from the outside; the interior layout has its
    /// own time axis and its tracks are invisible out here.
    Scope {
        track: Track,
        output: TermId,
        inner: Layout,
    },
}

impl Slot {
    /// The track occupying this slot, if any.
    pub fn track(&self) -> Option<&Track> {
        match self {
            Slot::Empty => None,
            Slot::Seed(track) | Slot::Capture(track) | Slot::Line(track) => Some(track),
            Slot::Call { track, .. } | Slot::Scope { track, .. } => Some(track),
        }
    }

    /// The identifier occupying this slot, if any.
    pub fn id(&self) -> Option<TermId> {
        self.track().map(|track| track.id)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// One unit of time: an ordered list of track slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    pub slots: Vec<Slot>,
}

impl Column {
    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// The position of the slot occupied by `id`, if present. Within one
    /// column an identifier occupies at most one slot.
    pub fn position_of(&self, id: TermId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id() == Some(id))
    }
}

/// An ordered sequence of time columns. All columns of a layout have the same
/// width: creating a track inserts an empty slot into every earlier column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub columns: Vec<Column>,
}

impl Layout {
    /// The number of time units the layout spans.
    pub fn duration(&self) -> usize {
        self.columns.len()
    }

    /// The number of track positions.
    pub fn width(&self) -> usize {
        self.columns.first().map_or(0, Column::width)
    }

    /// Whether `id` occupies any slot, looking inside nested scopes.
    pub fn contains(&self, id: TermId) -> bool {
        self.columns.iter().any(|column| {
            column.slots.iter().any(|slot| {
                slot.id() == Some(id)
                    || matches!(slot, Slot::Scope { inner, .. } if inner.contains(id))
            })
        })
    }
}

/// A step referenced an identifier with no track in the layout built so far.
/// This is a malformed timeline — a builder invariant violation, not a
/// recoverable user error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    MissingReference { step: TermId, reference: TermId },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingReference { step, reference } => write!(
                f,
                "step {step} references {reference}, which has no track in the layout"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// How many slots beyond the function's the reuse scan inspects.
const LOOKAHEAD: usize = 3;

/// Enumerate every structurally valid layout for `timeline`, lazily.
///
/// The initial column holds one argument-seed track per entry of `inputs`:
/// the enclosing scope's current inputs, or the declared free inputs at the
/// top level. `output` is the scope's externally visible result; its track is
/// kept live to the end. Any other identifier a step references is a
/// malformed timeline and surfaces as [`Error::MissingReference`].
pub fn candidates<'t>(
    timeline: &'t Timeline,
    inputs: &[ScopeArg],
    output: TermId,
) -> impl Iterator<Item = Result<Layout, Error>> + 't {
    let state = State::seeded(inputs, &[]);
    complete(state, timeline.steps(), output)
}

/// Synthesize the interior of a nested scope: like [`candidates`], but the
/// initial column additionally holds one capture track per enclosing
/// identifier the sub-timeline references.
fn scope_candidates<'t>(
    timeline: &'t Timeline,
    args: &'t [ScopeArg],
    captures: Vec<TermId>,
    output: TermId,
) -> Box<dyn Iterator<Item = Result<Layout, Error>> + 't> {
    let state = State::seeded(args, &captures);
    complete(state, timeline.steps(), output)
}

/// Synthesis state: the columns built so far and the scope's palette cursor.
#[derive(Clone)]
struct State {
    columns: Vec<Column>,
    palette_cursor: usize,
}

impl State {
    fn seeded(inputs: &[ScopeArg], captures: &[TermId]) -> State {
        let mut state = State {
            columns: Vec::new(),
            palette_cursor: 0,
        };

        let mut slots = Vec::new();
        for arg in inputs {
            let color = state.next_color();
            slots.push(Slot::Seed(Track {
                id: arg.id,
                name: Some(arg.name),
                color,
            }));
        }
        for id in captures {
            let color = state.next_color();
            slots.push(Slot::Capture(Track {
                id: *id,
                name: None,
                color,
            }));
        }

        if !slots.is_empty() {
            state.columns.push(Column { slots });
        }
        state
    }

    fn next_color(&mut self) -> Color {
        let color = PALETTE[self.palette_cursor % PALETTE.len()];
        self.palette_cursor += 1;
        color
    }

    /// Derive the next column from the last one: live tracks continue, closed
    /// tracks leave empty slots behind. `remaining` includes the step about
    /// to be placed, so operands stay on their tracks through the column that
    /// uses them last.
    fn carried_column(&self, remaining: &[Step], output: TermId) -> Column {
        let slots = match self.columns.last() {
            None => Vec::new(),
            Some(prev) => prev
                .slots
                .iter()
                .map(|slot| match slot.track() {
                    Some(track) if is_live(track.id, remaining, output) => {
                        Slot::Line(track.clone())
                    }
                    _ => Slot::Empty,
                })
                .collect(),
        };
        Column { slots }
    }

    /// Extend with `column` as the next time unit, leaving history untouched.
    fn with_column(&self, column: Column) -> State {
        let mut next = self.clone();
        next.columns.push(column);
        next
    }

    /// Extend with `column` after inserting a fresh slot at `position` into
    /// every column built so far.
    fn widened_with(&self, mut column: Column, position: usize, slot: Slot) -> State {
        let mut next = self.clone();
        for earlier in &mut next.columns {
            earlier.slots.insert(position, Slot::Empty);
        }
        column.slots.insert(position, slot);
        next.columns.push(column);
        next
    }
}

/// Whether a track bound to `id` may still be needed: referenced by any of
/// `steps` (looking through sub-timelines) or exposed as the scope's output.
fn is_live(id: TermId, steps: &[Step], output: TermId) -> bool {
    id == output || steps.iter().any(|step| step.mentions(id))
}

/// Lazily complete `state` through every remaining step, yielding finished
/// layouts.
fn complete<'t>(
    state: State,
    steps: &'t [Step],
    output: TermId,
) -> Box<dyn Iterator<Item = Result<Layout, Error>> + 't> {
    let (step, rest) = match steps.split_first() {
        None => {
            return Box::new(std::iter::once(Ok(Layout {
                columns: state.columns,
            })))
        }
        Some(parts) => parts,
    };

    let branches = match step {
        Step::Call {
            id,
            function,
            argument,
        } => call_branches(&state, *id, *function, *argument, steps, rest, output),
        Step::Nested {
            id,
            args,
            output: inner_output,
            body,
        } => nested_branches(&state, *id, args, *inner_output, body, steps, rest, output),
    };

    Box::new(branches.flat_map(
        move |branch| -> Box<dyn Iterator<Item = Result<Layout, Error>> + 't> {
            match branch {
                Ok(next) => complete(next, rest, output),
                Err(error) => Box::new(std::iter::once(Err(error))),
            }
        },
    ))
}

/// Place a call step's result track.
///
/// The first-encountered operand fixes the spawn side; a bounded scan away
/// from the argument looks for a reusable slot, and failing that, every
/// insertion point becomes a branch.
fn call_branches<'t>(
    state: &State,
    id: TermId,
    function: TermId,
    argument: TermId,
    remaining: &'t [Step],
    rest: &'t [Step],
    output: TermId,
) -> Box<dyn Iterator<Item = Result<State, Error>> + 't> {
    let column = state.carried_column(remaining, output);

    let function_pos = match column.position_of(function) {
        Some(position) => position,
        None => return fail(id, function),
    };
    let argument_pos = match column.position_of(argument) {
        Some(position) => position,
        None => return fail(id, argument),
    };

    let side = if function_pos <= argument_pos {
        SpawnSide::Before
    } else {
        SpawnSide::After
    };

    let track = Track {
        id,
        name: None,
        // A call result continues its function's line.
        color: column.slots[function_pos]
            .track()
            .expect("function slot is occupied")
            .color,
    };
    let placed = Slot::Call {
        track,
        function,
        argument,
        side,
    };

    // Reuse scan: up to `LOOKAHEAD` slots on the spawn side, nearest first. A
    // slot is reusable if it is empty or holds a track that is neither
    // operand and is no longer live after this step. (In practice dead tracks
    // have already closed to empty slots.)
    let mut window = match side {
        SpawnSide::Before => itertools::Either::Left((0..function_pos).rev()),
        SpawnSide::After => itertools::Either::Right(function_pos + 1..column.width()),
    }
    .take(LOOKAHEAD);
    let reuse = window.find(|&position| match column.slots[position].track() {
        None => true,
        Some(track) => {
            track.id != function && track.id != argument && !is_live(track.id, rest, output)
        }
    });

    match reuse {
        Some(position) => {
            let mut column = column;
            column.slots[position] = placed;
            Box::new(std::iter::once(Ok(state.with_column(column))))
        }
        None => Box::new(creation_branches(state, column, placed).map(Ok)),
    }
}

/// Place a nested scope: synthesize its interior recursively and branch over
/// (outer insertion point) × (inner candidate).
fn nested_branches<'t>(
    state: &State,
    id: TermId,
    args: &'t [ScopeArg],
    inner_output: TermId,
    body: &'t Timeline,
    remaining: &'t [Step],
    rest: &'t [Step],
    output: TermId,
) -> Box<dyn Iterator<Item = Result<State, Error>> + 't> {
    let column = state.carried_column(remaining, output);

    // The scope's captured lines must already have tracks out here.
    let captures = body.free_ids(args, inner_output);
    for reference in &captures {
        if column.position_of(*reference).is_none() {
            return fail(id, *reference);
        }
    }

    let mut base = state.clone();
    let color = base.next_color();
    let track = Track {
        id,
        name: None,
        color,
    };

    let inner_candidates = scope_candidates(body, args, captures, inner_output);
    Box::new(inner_candidates.flat_map(
        move |inner| -> Box<dyn Iterator<Item = Result<State, Error>>> {
            match inner {
                Err(error) => Box::new(std::iter::once(Err(error))),
                Ok(inner) => {
                    let placed = Slot::Scope {
                        track: track.clone(),
                        output: inner_output,
                        inner,
                    };
                    Box::new(creation_branches(&base, column.clone(), placed).map(Ok))
                }
            }
        },
    ))
}

/// All ways of giving `placed` a slot in `column`: each already-empty slot
/// (no widening), then insertion at every index including both extremes
/// (widening every column built so far).
fn creation_branches(
    state: &State,
    column: Column,
    placed: Slot,
) -> impl Iterator<Item = State> {
    let mut branches = Vec::new();

    for position in column.slots.iter().positions(Slot::is_empty).collect::<Vec<_>>() {
        let mut reused = column.clone();
        reused.slots[position] = placed.clone();
        branches.push(state.with_column(reused));
    }

    for position in 0..=column.width() {
        branches.push(state.widened_with(column.clone(), position, placed.clone()));
    }

    branches.into_iter()
}

fn fail<'t>(
    step: TermId,
    reference: TermId,
) -> Box<dyn Iterator<Item = Result<State, Error>> + 't> {
    Box::new(std::iter::once(Err(Error::MissingReference {
        step,
        reference,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::{self, Timeline};
    use crate::env::IdSource;
    use crate::surface::{self, indexing};
    use scoped_arena::Scope;

    fn pipeline(source: &str) -> (Timeline, TermId) {
        let scope = Scope::new();
        let mut files = crate::files::Files::new();
        let file_id = files.add("<test>".to_owned(), source.to_owned());
        let term = surface::parse_term(&scope, file_id, source).unwrap();
        let term = indexing::Context::new(&scope).index(term).unwrap();
        timeline::linearize(term)
    }

    fn all_candidates(source: &str) -> Vec<Layout> {
        let (timeline, output) = pipeline(source);
        candidates(&timeline, &[], output)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn inner_of(layout: &Layout) -> &Layout {
        layout
            .columns
            .iter()
            .flat_map(|column| &column.slots)
            .find_map(|slot| match slot {
                Slot::Scope { inner, .. } => Some(inner),
                _ => None,
            })
            .expect("layout contains a nested scope")
    }

    #[test]
    fn first_combinator_has_one_candidate_with_two_idle_tracks() {
        let layouts = all_candidates(r"\x y. x");
        assert_eq!(layouts.len(), 1);

        let inner = inner_of(&layouts[0]);
        assert_eq!(inner.duration(), 1);
        assert_eq!(inner.width(), 2);

        // Both seeds span the whole (single-column) duration; no call slots
        // anywhere.
        for slot in &inner.columns[0].slots {
            assert!(matches!(slot, Slot::Seed(_)));
        }
    }

    #[test]
    fn apply_combinator_spawns_next_to_its_function() {
        let layouts = all_candidates(r"\f x. f x");
        assert!(!layouts.is_empty());

        // The first candidate inserts the result track immediately before f,
        // on the side away from x.
        let inner = inner_of(&layouts[0]);
        assert_eq!(inner.duration(), 2);
        let column = &inner.columns[1];
        match &column.slots[0] {
            Slot::Call { side, function, .. } => {
                assert_eq!(*side, SpawnSide::Before);
                assert_eq!(column.position_of(*function), Some(1));
            }
            slot => panic!("expected call slot, got {slot:?}"),
        }

        // Seeds keep their positions in the widened first column.
        assert!(inner.columns[0].slots[0].is_empty());
        assert!(matches!(&inner.columns[0].slots[1], Slot::Seed(track) if track.name.is_some()));
    }

    #[test]
    fn call_results_inherit_the_function_color() {
        let layouts = all_candidates(r"\f x. f x");
        let inner = inner_of(&layouts[0]);

        let function_color = inner.columns[0].slots[1]
            .track()
            .expect("seed track")
            .color;
        let call_color = inner.columns[1].slots[0]
            .track()
            .expect("call track")
            .color;
        assert_eq!(call_color, function_color);
    }

    #[test]
    fn operand_tracks_close_after_their_last_use() {
        // In λf x. f x both seeds are dead once the call is placed, but they
        // still occupy their tracks in the call's own column.
        let layouts = all_candidates(r"\f x. f x");
        let inner = inner_of(&layouts[0]);
        let column = &inner.columns[1];
        assert!(matches!(&column.slots[1], Slot::Line(_)));
        assert!(matches!(&column.slots[2], Slot::Line(_)));
    }

    #[test]
    fn captured_lines_seed_the_nested_scope() {
        let layouts = all_candidates(r"\x. x (\y. x y)");
        assert!(!layouts.is_empty());

        for layout in &layouts {
            let outer_scope = inner_of(layout);
            let x = outer_scope.columns[0]
                .slots
                .iter()
                .find_map(|slot| match slot {
                    Slot::Seed(track) => Some(track.id),
                    _ => None,
                })
                .expect("outer scope has a seed");

            let inner_scope = inner_of(outer_scope);
            let first = &inner_scope.columns[0];
            assert!(first
                .slots
                .iter()
                .any(|slot| matches!(slot, Slot::Seed(track) if track.name.is_some())));
            assert!(first
                .slots
                .iter()
                .any(|slot| matches!(slot, Slot::Capture(track) if track.id == x)));
        }
    }

    #[test]
    fn every_candidate_is_distinct() {
        let layouts = all_candidates(r"\f x. f x");
        for (index, layout) in layouts.iter().enumerate() {
            for other in &layouts[index + 1..] {
                assert_ne!(layout, other);
            }
        }
    }

    #[test]
    fn malformed_timelines_are_fatal() {
        let mut ids = IdSource::new();
        let ghost_function = ids.fresh().unwrap();
        let ghost_argument = ids.fresh().unwrap();
        let result = ids.fresh().unwrap();

        let timeline: Timeline = [timeline::Step::Call {
            id: result,
            function: ghost_function,
            argument: ghost_argument,
        }]
        .into_iter()
        .collect();

        let mut stream = candidates(&timeline, &[], result);
        assert_eq!(
            stream.next(),
            Some(Err(Error::MissingReference {
                step: result,
                reference: ghost_function,
            }))
        );
    }

    #[test]
    fn candidate_enumeration_is_lazy_and_deterministic() {
        let (timeline, output) = pipeline(r"\a b c. c (a b)");

        let first: Vec<Layout> = candidates(&timeline, &[], output)
            .take(2)
            .collect::<Result<_, _>>()
            .unwrap();
        let second: Vec<Layout> = candidates(&timeline, &[], output)
            .take(2)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(first, second);
    }
}
