//! Rating of candidate layouts.
//!
//! The rating is the layout's total concurrent-track height: per column, the
//! number of simultaneously occupied tracks, with a nested scope contributing
//! the full height of its interior; the maximum over columns is the cost.
//! Lower is better.

use crate::core::layout::{Column, Error, Layout, Slot};

/// The vertical footprint of one slot, in track units.
fn slot_height(slot: &Slot) -> usize {
    match slot {
        Slot::Empty => 0,
        // A nested scope occupies whatever its interior needs, and never less
        // than its own track.
        Slot::Scope { inner, .. } => height(inner).max(1),
        _ => 1,
    }
}

fn column_height(column: &Column) -> usize {
    column.slots.iter().map(slot_height).sum()
}

/// The number of track units the layout needs at its widest moment.
pub fn height(layout: &Layout) -> usize {
    layout.columns.iter().map(column_height).max().unwrap_or(0)
}

/// The rating of a layout. Bigger is worse.
pub fn cost(layout: &Layout) -> usize {
    height(layout)
}

/// Fold a candidate stream down to its minimum-cost layout, or `None` if the
/// stream is empty. Ties break towards the earliest candidate, so the result
/// is deterministic; the first error aborts the fold.
pub fn best(
    candidates: impl Iterator<Item = Result<Layout, Error>>,
) -> Result<Option<Layout>, Error> {
    let mut best: Option<(usize, Layout)> = None;
    for candidate in candidates {
        let layout = candidate?;
        let layout_cost = cost(&layout);
        match &best {
            Some((best_cost, _)) if *best_cost <= layout_cost => {}
            _ => best = Some((layout_cost, layout)),
        }
    }
    Ok(best.map(|(_, layout)| layout))
}
