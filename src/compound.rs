/*!

  Group state of a compound element.

  A compound references elements that already live on the board. It never
  owns or copies them, so wires attached to the children keep working after
  grouping. The board keeps the offsets and bounds in step with the children.

*/

use crate::{
    element::ElementId,
    geometry::{Point, Rect},
};

/// A grouped element and its offset from the compound origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Child {
    id: ElementId,
    offset: Point,
}

impl Child {
    /// Returns the handle of the grouped element
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Returns the child position relative to the compound origin
    pub fn offset(&self) -> Point {
        self.offset
    }
}

/// Children and cached bounds of a compound
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    children: Vec<Child>,
    /// Union of the children's bodies
    bounds: Rect,
}

impl Compound {
    /// Creates an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over the children in insertion order
    pub fn children(&self) -> impl Iterator<Item = &Child> {
        self.children.iter()
    }

    /// Returns the handles of the children in insertion order
    pub fn child_ids(&self) -> Vec<ElementId> {
        self.children.iter().map(|c| c.id).collect()
    }

    /// Returns the number of children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if nothing has been grouped yet
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if `id` is a direct child
    pub fn contains(&self, id: ElementId) -> bool {
        self.children.iter().any(|c| c.id == id)
    }

    /// Returns the stored offset of the direct child `id`
    pub fn offset_of(&self, id: ElementId) -> Option<Point> {
        self.children.iter().find(|c| c.id == id).map(|c| c.offset)
    }

    /// Returns the cached union of the children's bodies
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Collapses the bounds to a zero-sized box at `at`. Only meaningful
    /// while the group is empty.
    pub(crate) fn reset_bounds(&mut self, at: Point) {
        self.bounds = Rect::degenerate(at);
    }

    /// Appends a child with its offset from the current origin
    pub(crate) fn push(&mut self, id: ElementId, offset: Point) {
        self.children.push(Child { id, offset });
    }

    /// Refits the group around the children's current bodies.
    ///
    /// `bodies` holds the body of every child, in child order. The origin
    /// becomes the top-left corner of their union and every offset is
    /// recomputed against it. Returns the new origin, or [None] for an empty
    /// group.
    pub(crate) fn refit(&mut self, bodies: &[Rect]) -> Option<Point> {
        debug_assert_eq!(bodies.len(), self.children.len());
        let bounds = Rect::union_all(bodies)?;
        let origin = bounds.origin();
        self.bounds = bounds;
        for (child, body) in self.children.iter_mut().zip(bodies) {
            child.offset = body.origin() - origin;
        }
        Some(origin)
    }
}
