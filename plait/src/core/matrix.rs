//! Dense time × track projection of a layout.
//!
//! The grid answers positional queries — which placement occupies track `k`
//! at time `t` — without re-scanning columns, for the renderer and for
//! adjacency checks. Nested scopes stay opaque: a scope's interior becomes a
//! nested grid rather than being flattened into the parent.

use crate::core::layout::{Layout, Slot, Track};
use crate::env::TermId;

/// The occupant of one grid position.
#[derive(Debug, Clone)]
pub enum Cell<'layout> {
    Empty,
    /// A track position covered by a placement's span. `origin` is the slot
    /// that created the track.
    Track {
        origin: &'layout Slot,
        track: &'layout Track,
    },
    /// The column where a nested scope is placed; its interior grid nests
    /// here.
    Scope {
        origin: &'layout Slot,
        track: &'layout Track,
        inner: Matrix<'layout>,
    },
}

impl<'layout> Cell<'layout> {
    /// The identifier occupying this cell, if any.
    pub fn id(&self) -> Option<TermId> {
        match self {
            Cell::Empty => None,
            Cell::Track { track, .. } | Cell::Scope { track, .. } => Some(track.id),
        }
    }
}

/// A time-major grid: `rows[time][track]`.
#[derive(Debug, Clone)]
pub struct Matrix<'layout> {
    rows: Vec<Vec<Cell<'layout>>>,
}

impl<'layout> Matrix<'layout> {
    /// Project a layout into its grid.
    pub fn of(layout: &'layout Layout) -> Matrix<'layout> {
        let width = layout.width();
        let mut origins: Vec<Option<&'layout Slot>> = vec![None; width];
        let mut rows = Vec::with_capacity(layout.duration());

        for column in &layout.columns {
            let mut row = Vec::with_capacity(width);
            for (position, slot) in column.slots.iter().enumerate() {
                let cell = match slot {
                    Slot::Empty => {
                        origins[position] = None;
                        Cell::Empty
                    }
                    Slot::Line(track) => Cell::Track {
                        // A line continues an earlier placement at the same
                        // position.
                        origin: origins[position].unwrap_or(slot),
                        track,
                    },
                    Slot::Scope { track, inner, .. } => {
                        origins[position] = Some(slot);
                        Cell::Scope {
                            origin: slot,
                            track,
                            inner: Matrix::of(inner),
                        }
                    }
                    Slot::Seed(track) | Slot::Capture(track) => {
                        origins[position] = Some(slot);
                        Cell::Track {
                            origin: slot,
                            track,
                        }
                    }
                    Slot::Call { track, .. } => {
                        origins[position] = Some(slot);
                        Cell::Track {
                            origin: slot,
                            track,
                        }
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Matrix { rows }
    }

    /// The number of time units.
    pub fn duration(&self) -> usize {
        self.rows.len()
    }

    /// The number of track positions.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// The cell at `(time, track)`, if in range.
    pub fn cell(&self, time: usize, track: usize) -> Option<&Cell<'layout>> {
        self.rows.get(time)?.get(track)
    }

    /// Whether a track bound to `id` is live at `time` in this grid.
    pub fn is_live(&self, id: TermId, time: usize) -> bool {
        self.rows
            .get(time)
            .map_or(false, |row| row.iter().any(|cell| cell.id() == Some(id)))
    }

    /// Whether `id` occupies any cell, looking inside nested grids.
    pub fn contains(&self, id: TermId) -> bool {
        self.rows.iter().flatten().any(|cell| match cell {
            Cell::Empty => false,
            Cell::Track { track, .. } => track.id == id,
            Cell::Scope { track, inner, .. } => track.id == id || inner.contains(id),
        })
    }

    /// Iterate over the grid's rows, one per time unit.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell<'layout>]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
