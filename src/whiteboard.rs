//! Whiteboard entity: a board id, its committed strokes, and staleness.

#[cfg(test)]
#[path = "whiteboard_test.rs"]
mod whiteboard_test;

use serde::Serialize;

use crate::stroke::Stroke;

/// Unique, stable identifier of a whiteboard.
pub type BoardId = String;

/// A cached whiteboard.
///
/// Strokes are kept in commit order. Only the cache mutates a board: it
/// appends strokes, clears them all, or flips the stale flag when another
/// board becomes the live realtime target. Readers get clones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Whiteboard {
    id: BoardId,
    strokes: Vec<Stroke>,
    is_stale: bool,
}

impl Whiteboard {
    /// A fresh (live) board seeded with `strokes`.
    #[must_use]
    pub fn new(id: impl Into<BoardId>, strokes: Vec<Stroke>) -> Self {
        Self { id: id.into(), strokes, is_stale: false }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Strokes in commit order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// True when this board is not the current realtime target.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.is_stale
    }

    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub(crate) fn append(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub(crate) fn clear(&mut self) {
        self.strokes.clear();
    }

    pub(crate) fn set_stale(&mut self, stale: bool) {
        self.is_stale = stale;
    }
}
