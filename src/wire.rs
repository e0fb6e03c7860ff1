/*!

  Directed connections from an output pin to an input pin.

*/

use crate::{geometry::Point, pin::PinRef};

/// A handle to a wire on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct WireId(usize);

impl WireId {
    /// Returns the arena index behind this handle
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for WireId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Default hit-test tolerance for [Wire::hit_test], in board units
pub const DEFAULT_WIRE_TOLERANCE: i32 = 5;

/// A wire connects the output pin `from` to the input pin `to`.
///
/// The endpoints are not validated here. The board checks directions and
/// occupancy before it builds and registers a wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    from: PinRef,
    to: PinRef,
    selected: bool,
}

impl Wire {
    /// Creates an unselected wire between two pins
    pub fn new(from: PinRef, to: PinRef) -> Self {
        Self {
            from,
            to,
            selected: false,
        }
    }

    /// The driving (output) pin
    pub fn from_pin(&self) -> PinRef {
        self.from
    }

    /// The driven (input) pin
    pub fn to_pin(&self) -> PinRef {
        self.to
    }

    /// Returns `true` if the wire is selected
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Sets the selection flag
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Returns `true` if either endpoint belongs to the element `id`
    pub fn touches(&self, id: crate::element::ElementId) -> bool {
        self.from.element == id || self.to.element == id
    }

    /// Hit-tests the segment between the tips `a` and `b` against the point
    /// (`px`, `py`) with the given tolerance.
    ///
    /// The wire itself does not know where its pins are; the board resolves
    /// the tips and calls this.
    pub fn hit_test(a: Point, b: Point, px: i32, py: i32, tolerance: i32) -> bool {
        let (x1, y1) = (a.x as f32, a.y as f32);
        let (x2, y2) = (b.x as f32, b.y as f32);
        let (px, py) = (px as f32, py as f32);
        let tol = tolerance as f32;

        if px < x1.min(x2) - tol
            || px > x1.max(x2) + tol
            || py < y1.min(y2) - tol
            || py > y1.max(y2) + tol
        {
            return false;
        }

        let dx = x2 - x1;
        let dy = y2 - y1;
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f32::EPSILON {
            // Both tips coincide
            let d_sq = (px - x1) * (px - x1) + (py - y1) * (py - y1);
            return d_sq <= tol * tol;
        }

        let t = (((px - x1) * dx + (py - y1) * dy) / len_sq).clamp(0.0, 1.0);
        let cx = x1 + t * dx;
        let cy = y1 + t * dy;
        let d_sq = (px - cx) * (px - cx) + (py - cy) * (py - cy);
        d_sq <= tol * tol
    }
}

impl std::fmt::Display for Wire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
