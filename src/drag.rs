use crate::foundation::core::{Point, Vec2};

/// What a pointer drag started on a block does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragKind {
    /// Move the image inside its block (modifier-drag).
    Pan,
    /// Reorder: drop the block's content onto another block.
    Swap,
}

/// A drag in progress. Owned by the engine from drag start until drop or cancel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    source: usize,
    kind: DragKind,
    last: Point,
    target: Option<usize>,
}

impl DragSession {
    pub fn new(source: usize, kind: DragKind, at: Point) -> Self {
        Self {
            source,
            kind,
            last: at,
            target: None,
        }
    }

    /// Block the drag started on.
    pub fn source(&self) -> usize {
        self.source
    }

    pub fn kind(&self) -> DragKind {
        self.kind
    }

    /// Current drop target for swap drags; never the source itself.
    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// Record a pointer move and return the delta since the previous position.
    pub fn advance(&mut self, at: Point) -> Vec2 {
        let delta = at - self.last;
        self.last = at;
        delta
    }

    pub fn set_target(&mut self, target: Option<usize>) {
        self.target = target.filter(|&t| t != self.source);
    }
}
