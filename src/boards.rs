//! Interactive boards for the manipulation activities: memory cards, shape slots
//! and the art canvas. Each board counts the player's moves so the session can be
//! scored by efficiency once the board is complete.

use serde::Serialize;

use crate::domain::{blank_grid, ActivityInstance, Answer, Card, Grid, Paint, Prompt, ShapePiece, ShapeSlot};
use crate::scorer::Efficiency;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipOutcome {
    /// Flip not allowed right now (pair pending, card already up or matched, bad index).
    Ignored,
    /// First card of a pair turned up.
    Revealed,
    /// Second card matched the first.
    Matched,
    /// Second card differs; both stay up until `settle`.
    Mismatched,
}

/// Memory game: find all pairs in as few moves as possible.
#[derive(Clone, Debug, Serialize)]
pub struct MemoryBoard {
    pub cards: Vec<Card>,
    #[serde(skip)]
    face_up: Vec<usize>,
    pub moves: u32,
    pub matched_pairs: u32,
}

impl MemoryBoard {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards, face_up: Vec::with_capacity(2), moves: 0, matched_pairs: 0 }
    }

    pub fn from_instance(instance: &ActivityInstance) -> Option<Self> {
        match &instance.prompt {
            Prompt::MemoryMatch { cards } => Some(Self::new(cards.clone())),
            _ => None,
        }
    }

    pub fn total_pairs(&self) -> u32 {
        (self.cards.len() / 2) as u32
    }

    pub fn is_complete(&self) -> bool {
        self.total_pairs() > 0 && self.matched_pairs == self.total_pairs()
    }

    /// Whether a mismatched pair is waiting to be turned back down.
    pub fn needs_settle(&self) -> bool {
        self.face_up.len() == 2
    }

    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if self.face_up.len() == 2 {
            return FlipOutcome::Ignored;
        }
        match self.cards.get(index) {
            Some(c) if !c.flipped && !c.matched => {}
            _ => return FlipOutcome::Ignored,
        }
        self.cards[index].flipped = true;
        self.face_up.push(index);
        if self.face_up.len() < 2 {
            return FlipOutcome::Revealed;
        }

        self.moves += 1;
        let (a, b) = (self.face_up[0], self.face_up[1]);
        if self.cards[a].face == self.cards[b].face {
            self.cards[a].matched = true;
            self.cards[b].matched = true;
            self.face_up.clear();
            self.matched_pairs += 1;
            FlipOutcome::Matched
        } else {
            FlipOutcome::Mismatched
        }
    }

    /// Turn a mismatched pair back face down.
    pub fn settle(&mut self) {
        if self.face_up.len() == 2 {
            for i in self.face_up.drain(..) {
                self.cards[i].flipped = false;
            }
        }
    }

    pub fn efficiency(&self) -> Efficiency {
        Efficiency { taken: self.moves, ideal: self.total_pairs() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropOutcome {
    Ignored,
    Placed,
    Rejected,
}

/// Shape sorter: drop every piece onto the slot of the same shape.
#[derive(Clone, Debug, Serialize)]
pub struct ShapeBoard {
    pub pieces: Vec<ShapePiece>,
    pub slots: Vec<ShapeSlot>,
    pub attempts: u32,
    pub placed: u32,
}

impl ShapeBoard {
    pub fn new(pieces: Vec<ShapePiece>, slots: Vec<ShapeSlot>) -> Self {
        Self { pieces, slots, attempts: 0, placed: 0 }
    }

    pub fn from_instance(instance: &ActivityInstance) -> Option<Self> {
        match &instance.prompt {
            Prompt::ShapeMatch { pieces, slots } => Some(Self::new(pieces.clone(), slots.clone())),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.pieces.is_empty() && self.placed as usize == self.pieces.len()
    }

    /// Every drop on an open slot counts as an attempt, right or wrong.
    pub fn drop_piece(&mut self, piece_id: &str, slot_id: &str) -> DropOutcome {
        let Some(p) = self.pieces.iter().position(|p| p.id == piece_id && !p.placed) else {
            return DropOutcome::Ignored;
        };
        let Some(s) = self.slots.iter().position(|s| s.id == slot_id && !s.filled) else {
            return DropOutcome::Ignored;
        };
        self.attempts += 1;
        if self.pieces[p].shape == self.slots[s].shape {
            self.pieces[p].placed = true;
            self.slots[s].filled = true;
            self.placed += 1;
            DropOutcome::Placed
        } else {
            DropOutcome::Rejected
        }
    }

    pub fn efficiency(&self) -> Efficiency {
        Efficiency { taken: self.attempts, ideal: self.pieces.len() as u32 }
    }
}

/// Pixel-art canvas the player paints to match a target picture.
#[derive(Clone, Debug, Serialize)]
pub struct ArtCanvas {
    pub cells: Grid,
    pub target: Grid,
    pub completed: bool,
}

impl ArtCanvas {
    pub fn new(target: Grid) -> Self {
        Self { cells: blank_grid(target.len()), target, completed: false }
    }

    pub fn from_instance(instance: &ActivityInstance) -> Option<Self> {
        match &instance.answer {
            Answer::Grid(target) => Some(Self::new(target.clone())),
            _ => None,
        }
    }

    /// Paint one cell and re-check the picture. Returns true when the canvas matches.
    pub fn paint(&mut self, row: usize, col: usize, color: Paint) -> bool {
        if self.completed {
            return true;
        }
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = color;
        }
        self.completed = self.cells == self.target;
        self.completed
    }

    pub fn reset(&mut self) {
        self.cells = blank_grid(self.target.len());
        self.completed = false;
    }
}
