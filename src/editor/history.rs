// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Undo/redo snapshots of the zone list.

use crate::models::shape::Shape;

/// Number of snapshots kept on the undo stack.
const MAX_HISTORY: usize = 50;

#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Vec<Shape>>,
    redo_stack: Vec<Vec<Shape>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save the current zone list before it changes.
    pub fn push(&mut self, shapes: Vec<Shape>) {
        self.undo_stack.push(shapes);
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        // A new edit invalidates the redo branch
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, current: Vec<Shape>) -> Option<Vec<Shape>> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: Vec<Shape>) -> Option<Vec<Shape>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::shape::{Point, ShapeTag};

    fn shapes(n: u64) -> Vec<Shape> {
        (0..n)
            .map(|id| Shape::rectangle(id, Point::new(0.0, 0.0), Point::new(1.0, 1.0), ShapeTag::default()))
            .collect()
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::new();
        assert!(!history.can_undo());

        history.push(shapes(0));
        let restored = history.undo(shapes(1)).unwrap();
        assert!(restored.is_empty());
        assert!(history.can_redo());

        let again = history.redo(restored).unwrap();
        assert_eq!(again.len(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new();
        history.push(shapes(0));
        history.undo(shapes(1));
        history.push(shapes(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        for _ in 0..(MAX_HISTORY + 10) {
            history.push(Vec::new());
        }
        let mut undone = 0;
        while history.undo(Vec::new()).is_some() {
            undone += 1;
        }
        assert_eq!(undone, MAX_HISTORY);
    }
}
